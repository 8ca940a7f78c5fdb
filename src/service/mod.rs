use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::errors::FulfillmentError;
use crate::domain::order::status::OrderStatus;
use crate::domain::order::tokens;
use crate::domain::order::transitions::{self, StageAction};
use crate::metrics::Metrics;
use crate::store::{DeliveryContact, Order, OrderStore, Product, ProductCatalog, StoreError};

// ============================================================================
// Fulfillment Workflow Service
// ============================================================================
//
// Orchestrates: store + state machine + token issuing behind the five stage
// operations. Owns its collaborators by injection; there is no ambient
// store handle anywhere in the crate. Each stage operation is one atomic
// attempt — callers decide whether to retry after a rejection.
//
// ============================================================================

/// Result of packing: the updated order plus the reference under which the
/// boundary layer renders the scannable artifact.
#[derive(Debug, Clone, Serialize)]
pub struct PackReceipt {
    pub order: Order,
    pub artifact: String,
}

/// Queue/cart row: an order joined with its catalog product. The product is
/// `None` when the catalog no longer knows the id (external catalog churn).
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithProduct {
    pub order: Order,
    pub product: Option<Product>,
}

pub struct FulfillmentService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductCatalog>,
    metrics: Arc<Metrics>,
}

impl FulfillmentService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductCatalog>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            catalog,
            metrics,
        }
    }

    /// Place an order for an existing catalog product. The OTP is issued
    /// atomically with the order and never changes afterwards.
    pub async fn place_order(&self, product_id: i64) -> Result<Order, FulfillmentError> {
        let started = Instant::now();

        let product = self
            .catalog
            .get(product_id)
            .await
            .map_err(|e| self.fail("place_order", backend(e)))?
            .ok_or_else(|| self.fail("place_order", FulfillmentError::ProductNotFound { product_id }))?;

        let otp = tokens::issue_otp();
        let order = self
            .store
            .create(product_id, otp)
            .await
            .map_err(|e| self.fail("place_order", backend(e)))?;

        self.metrics.orders_placed.inc();
        self.metrics
            .observe_stage_duration("place_order", started.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %order.id,
            product_id,
            product = %product.name,
            "✅ Order placed"
        );

        Ok(order)
    }

    /// `Pending → Picked`.
    pub async fn mark_picked(&self, order_id: Uuid) -> Result<Order, FulfillmentError> {
        self.apply_edge(order_id, StageAction::Pick, None).await
    }

    /// `Picked → Packed`. Issues the package token, persists it in the same
    /// atomic write as the transition, and reports where the boundary layer
    /// should render the scannable artifact.
    pub async fn mark_packed(&self, order_id: Uuid) -> Result<PackReceipt, FulfillmentError> {
        let token = tokens::package_token(order_id);
        let order = self
            .apply_edge(order_id, StageAction::Pack, Some(token.as_str()))
            .await?;

        Ok(PackReceipt {
            order,
            artifact: tokens::artifact_reference(order_id),
        })
    }

    /// Record who receives the package. Allowed from `Packed` onward; never
    /// transitions status.
    pub async fn record_delivery_contact(
        &self,
        order_id: Uuid,
        name: String,
        phone: String,
    ) -> Result<Order, FulfillmentError> {
        const STAGE: &str = "record_contact";
        let started = Instant::now();

        if name.trim().is_empty() {
            return Err(self.fail(STAGE, FulfillmentError::Validation { field: "name" }));
        }
        if phone.trim().is_empty() {
            return Err(self.fail(STAGE, FulfillmentError::Validation { field: "phone" }));
        }

        let order = self
            .load(order_id)
            .await
            .map_err(|e| self.fail(STAGE, e))?;
        transitions::require_contact_stage(order.status)
            .map_err(|e| self.fail(STAGE, e))?;

        let order = self
            .store
            .set_delivery_contact(order_id, DeliveryContact { name, phone })
            .await
            .map_err(|e| self.fail(STAGE, store_err(e, order_id, StageAction::RecordContact)))?;

        self.metrics.record_transition(STAGE);
        self.metrics
            .observe_stage_duration(STAGE, started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, "Delivery contact recorded");

        Ok(order)
    }

    /// `Packed → Delivered`, gated on the recorded contact and the OTP.
    /// The status precondition is evaluated before the OTP comparison, and
    /// a rejection leaves the order unchanged.
    pub async fn confirm_delivery(
        &self,
        order_id: Uuid,
        submitted_otp: &str,
    ) -> Result<Order, FulfillmentError> {
        const STAGE: &str = "confirm_delivery";

        let order = self
            .load(order_id)
            .await
            .map_err(|e| self.fail(STAGE, e))?;

        transitions::authorize_delivery(
            order.status,
            order.delivery_contact.is_some(),
            &order.otp,
            submitted_otp,
        )
        .map_err(|e| self.fail(STAGE, e))?;

        // The CAS still guards the write: if another confirmation won the
        // race since the read above, this reports an illegal transition.
        self.apply_edge(order_id, StageAction::ConfirmDelivery, None)
            .await
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, FulfillmentError> {
        self.load(order_id).await
    }

    /// Orders joined with their products, optionally filtered by status —
    /// the picker/packer/delivery queues and the cart view.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderWithProduct>, FulfillmentError> {
        let orders = self.store.list(status).await.map_err(backend)?;

        let mut rows = Vec::with_capacity(orders.len());
        for order in orders {
            let product = self.catalog.get(order.product_id).await.map_err(backend)?;
            rows.push(OrderWithProduct { order, product });
        }
        Ok(rows)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, FulfillmentError> {
        self.catalog.list().await.map_err(backend)
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    async fn load(&self, order_id: Uuid) -> Result<Order, FulfillmentError> {
        self.store
            .get(order_id)
            .await
            .map_err(backend)?
            .ok_or(FulfillmentError::OrderNotFound { order_id })
    }

    /// Drive one transition edge through the store's compare-and-swap. The
    /// store enforces the precondition atomically, so two racing attempts
    /// on the same order resolve to one success and one rejection.
    async fn apply_edge(
        &self,
        order_id: Uuid,
        action: StageAction,
        qr_token: Option<&str>,
    ) -> Result<Order, FulfillmentError> {
        let stage = action.stage_label();
        let started = Instant::now();

        let Some((expected, next)) = action.edge() else {
            return Err(FulfillmentError::Internal(anyhow::anyhow!(
                "{action} does not transition status"
            )));
        };

        let order = self
            .store
            .update_status(order_id, expected, next, qr_token)
            .await
            .map_err(|e| self.fail(stage, store_err(e, order_id, action)))?;

        self.metrics.record_transition(stage);
        self.metrics
            .observe_stage_duration(stage, started.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %order.id,
            from = ?expected,
            to = ?next,
            "✅ Order transitioned"
        );

        Ok(order)
    }

    fn fail(&self, stage: &str, err: FulfillmentError) -> FulfillmentError {
        self.metrics.record_failure(stage, err.kind());
        tracing::warn!(stage, reason = err.kind(), "Stage operation rejected");
        err
    }
}

fn backend(err: StoreError) -> FulfillmentError {
    FulfillmentError::Internal(anyhow::Error::new(err))
}

fn store_err(err: StoreError, order_id: Uuid, action: StageAction) -> FulfillmentError {
    match err {
        StoreError::NotFound => FulfillmentError::OrderNotFound { order_id },
        StoreError::StatusConflict { current } => {
            FulfillmentError::IllegalTransition { action, current }
        }
        StoreError::Backend(e) => FulfillmentError::Internal(e),
    }
}
