use serde::{Deserialize, Serialize};

// ============================================================================
// Order Status - Closed Fulfillment Lifecycle
// ============================================================================

/// Lifecycle status of an order. The sequence is linear and forward-only:
/// `Pending → Picked → Packed → Delivered`. The derived ordering follows the
/// lifecycle, so "Packed or later" is `status >= OrderStatus::Packed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Picked,
    Packed,
    Delivered,
}

impl OrderStatus {
    /// The next status in the lifecycle, or `None` for the terminal state.
    pub fn successor(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Picked),
            OrderStatus::Picked => Some(OrderStatus::Packed),
            OrderStatus::Packed => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Stable persistence form, shared by the SQLite store and query filters.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Picked => "Picked",
            OrderStatus::Packed => "Packed",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Picked" => Some(OrderStatus::Picked),
            "Packed" => Some(OrderStatus::Packed),
            "Delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
