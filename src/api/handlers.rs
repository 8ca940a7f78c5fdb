use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, TextEncoder};
use uuid::Uuid;

use crate::domain::order::{FulfillmentError, OrderStatus};
use crate::models::{
    ConfirmDeliveryRequest, DeliveryContactRequest, ErrorBody, OrderListQuery, PlaceOrderRequest,
    VerifyPackageResponse,
};

use super::error::ApiError;
use super::AppState;

// ============================================================================
// Request Handlers
// ============================================================================
//
// No business logic here: each handler parses the request, delegates to the
// workflow service, and lets ApiError translate rejections.
//
// ============================================================================

pub async fn place_order(
    state: web::Data<AppState>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = state.service.place_order(body.product_id).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let order = state.service.get_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, ApiError> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match OrderStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return Ok(HttpResponse::BadRequest().json(ErrorBody {
                    error: "bad_request".to_string(),
                    detail: format!("unknown status filter: {raw}"),
                }))
            }
        },
    };

    let rows = state.service.list_orders(status).await?;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn pick(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let order = state.service.mark_picked(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn pack(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let receipt = state.service.mark_packed(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

pub async fn record_delivery_contact(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<DeliveryContactRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let order = state
        .service
        .record_delivery_contact(path.into_inner(), body.name, body.phone)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn confirm_delivery(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ConfirmDeliveryRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = state
        .service
        .confirm_delivery(path.into_inner(), &body.otp)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Verification stub: the scanned artifact is accepted on upload presence
/// alone, the payload is not decoded. The order must exist and hold a
/// package token (Packed or later) for the scan to mean anything.
pub async fn verify_package(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let order = state.service.get_order(order_id).await?;

    if payload.is_empty() {
        return Err(ApiError(FulfillmentError::Validation { field: "qrfile" }));
    }
    if order.qr_token.is_none() {
        return Ok(HttpResponse::Conflict().json(ErrorBody {
            error: "illegal_transition".to_string(),
            detail: "order has not been packed yet".to_string(),
        }));
    }

    Ok(HttpResponse::Ok().json(VerifyPackageResponse {
        order_id,
        verified: true,
    }))
}

pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let products = state.service.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

pub async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "order-fulfillment"
    }))
}
