use uuid::Uuid;

use super::status::OrderStatus;
use super::transitions::StageAction;

// ============================================================================
// Fulfillment Failure Taxonomy
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error("order not found: {order_id}")]
    OrderNotFound { order_id: Uuid },

    #[error("product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    #[error("cannot {action} an order in status {current:?}")]
    IllegalTransition {
        action: StageAction,
        current: OrderStatus,
    },

    #[error("submitted OTP does not match the order")]
    OtpMismatch,

    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    #[error("storage failure")]
    Internal(#[source] anyhow::Error),
}

impl FulfillmentError {
    /// Stable machine-readable kind, used as a metrics label and in the
    /// boundary-layer error body.
    pub fn kind(&self) -> &'static str {
        match self {
            FulfillmentError::OrderNotFound { .. } => "order_not_found",
            FulfillmentError::ProductNotFound { .. } => "product_not_found",
            FulfillmentError::IllegalTransition { .. } => "illegal_transition",
            FulfillmentError::OtpMismatch => "otp_mismatch",
            FulfillmentError::Validation { .. } => "validation",
            FulfillmentError::Internal(_) => "internal",
        }
    }
}
