mod error;
mod handlers;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};

use crate::metrics::Metrics;
use crate::service::FulfillmentService;

pub use error::ApiError;

// ============================================================================
// External Interface Layer - HTTP Boundary
// ============================================================================

/// Shared per-worker application state, injected once at startup.
pub struct AppState {
    pub service: Arc<FulfillmentService>,
    pub metrics: Arc<Metrics>,
}

/// Route table, shared by the real server and the test harness.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_handler))
        .route("/metrics", web::get().to(handlers::metrics_handler))
        .route("/products", web::get().to(handlers::list_products))
        .route("/orders", web::post().to(handlers::place_order))
        .route("/orders", web::get().to(handlers::list_orders))
        .route("/orders/{id}", web::get().to(handlers::get_order))
        .route("/orders/{id}/pick", web::post().to(handlers::pick))
        .route("/orders/{id}/pack", web::post().to(handlers::pack))
        .route(
            "/orders/{id}/delivery-contact",
            web::post().to(handlers::record_delivery_contact),
        )
        .route(
            "/orders/{id}/confirm-delivery",
            web::post().to(handlers::confirm_delivery),
        )
        .route(
            "/orders/{id}/verify-package",
            web::post().to(handlers::verify_package),
        );
}

/// Start the HTTP server and serve until shutdown.
pub async fn run_server(
    service: Arc<FulfillmentService>,
    metrics: Arc<Metrics>,
    bind_addr: &str,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("🚀 Serving fulfillment API on http://{}:{}", bind_addr, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                service: service.clone(),
                metrics: metrics.clone(),
            }))
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
