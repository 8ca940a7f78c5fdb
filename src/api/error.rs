use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::domain::order::FulfillmentError;
use crate::models::ErrorBody;

// ============================================================================
// Failure Translation - Taxonomy to HTTP
// ============================================================================
//
// The core returns typed failures and never formats user-facing text; this
// is the single place where the taxonomy becomes status codes and bodies.
//
// ============================================================================

#[derive(Debug)]
pub struct ApiError(pub FulfillmentError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            FulfillmentError::OrderNotFound { .. } | FulfillmentError::ProductNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            FulfillmentError::IllegalTransition { .. } => StatusCode::CONFLICT,
            FulfillmentError::OtpMismatch => StatusCode::FORBIDDEN,
            FulfillmentError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            FulfillmentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match &self.0 {
            // Backend failures stay opaque to callers.
            FulfillmentError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.0.kind().to_string(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStatus, StageAction};
    use uuid::Uuid;

    #[test]
    fn test_status_code_mapping() {
        let cases = [
            (
                FulfillmentError::OrderNotFound {
                    order_id: Uuid::new_v4(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                FulfillmentError::ProductNotFound { product_id: 9 },
                StatusCode::NOT_FOUND,
            ),
            (
                FulfillmentError::IllegalTransition {
                    action: StageAction::Pick,
                    current: OrderStatus::Packed,
                },
                StatusCode::CONFLICT,
            ),
            (FulfillmentError::OtpMismatch, StatusCode::FORBIDDEN),
            (
                FulfillmentError::Validation { field: "phone" },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }

    #[test]
    fn test_internal_detail_is_opaque() {
        let err = ApiError(FulfillmentError::Internal(anyhow::anyhow!(
            "connection refused to /var/lib/fulfillment.db"
        )));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
