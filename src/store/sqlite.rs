use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::order::OrderStatus;

use super::{DeliveryContact, Order, OrderStore, Product, ProductCatalog, StoreError};

// ============================================================================
// SQLite Store
// ============================================================================
//
// Durable single-writer store. The schema is a fixed, versioned constant
// applied at startup; there is no runtime column inspection. Status
// transitions are conditional UPDATEs (`WHERE id = ? AND status = ?`), so
// the database serializes the read-check-write sequence per order id and a
// racing duplicate transition affects zero rows.
//
// ============================================================================

/// Schema version 1. Bump the version and append migration statements here
/// when the layout changes.
const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id              TEXT PRIMARY KEY,
    product_id      INTEGER NOT NULL,
    status          TEXT NOT NULL,
    otp             TEXT NOT NULL,
    qr_token        TEXT,
    delivery_name   TEXT,
    delivery_phone  TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status);

CREATE TABLE IF NOT EXISTS products (
    id        INTEGER PRIMARY KEY,
    name      TEXT NOT NULL,
    price     INTEGER NOT NULL,
    quantity  INTEGER NOT NULL,
    shelf     TEXT NOT NULL,
    bin       TEXT NOT NULL,
    category  TEXT NOT NULL
);
";

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.into())
}

fn row_to_order(row: &SqliteRow) -> Result<Order, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| StoreError::Backend(anyhow::anyhow!("corrupt order id: {e}")))?;

    let status: String = row.try_get("status").map_err(backend)?;
    let status = OrderStatus::parse(&status)
        .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("unknown order status: {status}")))?;

    let delivery_name: Option<String> = row.try_get("delivery_name").map_err(backend)?;
    let delivery_phone: Option<String> = row.try_get("delivery_phone").map_err(backend)?;
    let delivery_contact = match (delivery_name, delivery_phone) {
        (Some(name), Some(phone)) => Some(DeliveryContact { name, phone }),
        _ => None,
    };

    Ok(Order {
        id,
        product_id: row.try_get("product_id").map_err(backend)?,
        status,
        otp: row.try_get("otp").map_err(backend)?,
        qr_token: row.try_get("qr_token").map_err(backend)?,
        delivery_contact,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(backend)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(backend)?,
    })
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database and apply the versioned schema. The pool is capped
    /// at a single connection: the store is a single-writer by contract.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA_V1).execute(&pool).await?;

        tracing::info!(url = %url, "SQLite order store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
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

        sqlx::query(
            "INSERT INTO orders (id, product_id, status, otp, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(order.id.to_string())
        .bind(order.product_id)
        .bind(order.status.as_str())
        .bind(&order.otp)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(order)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(row_to_order).transpose()
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM orders WHERE status = ? ORDER BY created_at")
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM orders ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(backend)?;

        rows.iter().map(row_to_order).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        qr_token: Option<&str>,
    ) -> Result<Order, StoreError> {
        // The status predicate makes this a compare-and-swap: a concurrent
        // transition that already moved the order leaves zero rows affected.
        let result = sqlx::query(
            "UPDATE orders
             SET status = ?, qr_token = COALESCE(?, qr_token), updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(next.as_str())
        .bind(qr_token)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return match self.get(id).await? {
                None => Err(StoreError::NotFound),
                Some(order) => Err(StoreError::StatusConflict {
                    current: order.status,
                }),
            };
        }

        self.get(id).await?.ok_or(StoreError::NotFound)
    }

    async fn set_delivery_contact(
        &self,
        id: Uuid,
        contact: DeliveryContact,
    ) -> Result<Order, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET delivery_name = ?, delivery_phone = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&contact.name)
        .bind(&contact.phone)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.get(id).await?.ok_or(StoreError::NotFound)
    }
}

// ============================================================================
// SQLite Catalog
// ============================================================================

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Shares the store's pool; the catalog only ever reads.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: row.try_get("id").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        price: row.try_get("price").map_err(backend)?,
        quantity: row.try_get("quantity").map_err(backend)?,
        shelf: row.try_get("shelf").map_err(backend)?,
        bin: row.try_get("bin").map_err(backend)?,
        category: row.try_get("category").map_err(backend)?,
    })
}

#[async_trait]
impl ProductCatalog for SqliteCatalog {
    async fn get(&self, product_id: i64) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter().map(row_to_product).collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
