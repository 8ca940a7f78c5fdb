use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Boundary DTOs
// ============================================================================
//
// Request and response bodies for the HTTP layer. Orders, products, and
// pack receipts serialize directly from their domain records; only shapes
// that exist purely on the wire live here.
//
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub product_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryContactRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeliveryRequest {
    pub otp: String,
}

/// `GET /orders?status=Picked` — the per-role queue filter.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPackageResponse {
    pub order_id: Uuid,
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}
