mod memory;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::OrderStatus;

pub use memory::{MemoryCatalog, MemoryStore};
pub use sqlite::{SqliteCatalog, SqliteStore};

// ============================================================================
// Order Store - Persistence Seam
// ============================================================================
//
// The store is injected into the workflow service at process start; nothing
// in the crate reaches for an ambient database handle. Every operation is
// atomic with respect to a single order record, and `update_status` is a
// compare-and-swap keyed by order id: when two participants race on the
// same order, at most one transition succeeds.
//
// ============================================================================

/// Durable record of one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub product_id: i64,
    pub status: OrderStatus,
    /// Assigned atomically with the order, never regenerated.
    pub otp: String,
    /// `None` until the Packed transition, immutable thereafter.
    pub qr_token: Option<String>,
    pub delivery_contact: Option<DeliveryContact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryContact {
    pub name: String,
    pub phone: String,
}

/// Catalog product. Read-only from the core's perspective; shelf and bin
/// drive the picker's walk through the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub shelf: String,
    pub bin: String,
    pub category: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("order not found")]
    NotFound,

    #[error("status precondition failed, current is {current:?}")]
    StatusConflict { current: OrderStatus },

    #[error("storage backend failure")]
    Backend(#[source] anyhow::Error),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create an order in `Pending` with the given OTP. The store assigns
    /// the id; it is immutable from then on.
    async fn create(&self, product_id: i64, otp: String) -> Result<Order, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// All orders, optionally restricted to one status. Backs the per-role
    /// queue views (picker: Pending, packer: Picked, delivery: Packed).
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError>;

    /// Compare-and-swap the status of one order: succeeds only while the
    /// stored status equals `expected`, and applies `next` plus the optional
    /// `qr_token` in the same atomic write. The QR write rides along with
    /// the Packed transition so the token is observable exactly from
    /// `Packed` onward.
    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        qr_token: Option<&str>,
    ) -> Result<Order, StoreError>;

    async fn set_delivery_contact(
        &self,
        id: Uuid,
        contact: DeliveryContact,
    ) -> Result<Order, StoreError>;
}

/// Read-only product catalog. The core references products by id and never
/// mutates them; catalog maintenance is an external concern.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get(&self, product_id: i64) -> Result<Option<Product>, StoreError>;

    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}
