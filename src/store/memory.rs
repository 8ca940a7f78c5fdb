use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::OrderStatus;

use super::{DeliveryContact, Order, OrderStore, Product, ProductCatalog, StoreError};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Used by the test suite and for running without DATABASE_URL. The
// compare-and-swap in `update_status` happens inside the write critical
// section with no await held, so racing transitions on one order resolve to
// exactly one winner and operations on different orders never wait on each
// other for long.
//
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, product_id: i64, otp: String) -> Result<Order, StoreError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            product_id,
            status: OrderStatus::Pending,
            otp,
            qr_token: None,
            delivery_contact: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|order| status.is_none_or(|s| order.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|order| order.created_at);
        Ok(matching)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        qr_token: Option<&str>,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;

        if order.status != expected {
            return Err(StoreError::StatusConflict {
                current: order.status,
            });
        }

        order.status = next;
        if let Some(token) = qr_token {
            order.qr_token = Some(token.to_string());
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn set_delivery_contact(
        &self,
        id: Uuid,
        contact: DeliveryContact,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.delivery_contact = Some(contact);
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

// ============================================================================
// In-Memory Catalog
// ============================================================================

pub struct MemoryCatalog {
    products: HashMap<i64, Product>,
}

impl MemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Load the catalog from a JSON array of products.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        Ok(Self::new(products))
    }
}

#[async_trait]
impl ProductCatalog for MemoryCatalog {
    async fn get(&self, product_id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&product_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.products.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
