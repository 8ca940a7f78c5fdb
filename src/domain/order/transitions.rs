use std::fmt;

use super::errors::FulfillmentError;
use super::status::OrderStatus;

// ============================================================================
// Fulfillment State Machine - Transition Table
// ============================================================================
//
// The lifecycle is linear with no branching and no cycles. Each stage action
// names the exact status it requires; an action attempted from any other
// status is rejected without touching the order. Rejection is a typed
// failure, never a silent no-op, so callers can tell "already done" from
// "succeeded".
//
// ============================================================================

/// A workflow-participant action against an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    Pick,
    Pack,
    RecordContact,
    ConfirmDelivery,
}

impl StageAction {
    /// The `(from, to)` status edge this action drives, if it transitions
    /// status at all. Recording a delivery contact never does.
    pub fn edge(self) -> Option<(OrderStatus, OrderStatus)> {
        match self {
            StageAction::Pick => Some((OrderStatus::Pending, OrderStatus::Picked)),
            StageAction::Pack => Some((OrderStatus::Picked, OrderStatus::Packed)),
            StageAction::ConfirmDelivery => Some((OrderStatus::Packed, OrderStatus::Delivered)),
            StageAction::RecordContact => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageAction::Pick => "pick",
            StageAction::Pack => "pack",
            StageAction::RecordContact => "record delivery contact",
            StageAction::ConfirmDelivery => "confirm delivery",
        }
    }

    /// Label-safe form for metrics.
    pub fn stage_label(self) -> &'static str {
        match self {
            StageAction::Pick => "pick",
            StageAction::Pack => "pack",
            StageAction::RecordContact => "record_contact",
            StageAction::ConfirmDelivery => "confirm_delivery",
        }
    }
}

impl fmt::Display for StageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the target status for a transition-driving action, or reject it.
pub fn plan(action: StageAction, current: OrderStatus) -> Result<OrderStatus, FulfillmentError> {
    match action.edge() {
        Some((from, to)) if current == from => Ok(to),
        _ => Err(FulfillmentError::IllegalTransition { action, current }),
    }
}

/// Delivery contact may be recorded once the package exists, i.e. from
/// `Packed` onward.
pub fn require_contact_stage(current: OrderStatus) -> Result<(), FulfillmentError> {
    if current >= OrderStatus::Packed {
        Ok(())
    } else {
        Err(FulfillmentError::IllegalTransition {
            action: StageAction::RecordContact,
            current,
        })
    }
}

/// Gate for the Delivered transition. Checks run in a fixed order: status
/// precondition first, then contact presence, then the OTP comparison. A
/// correct OTP submitted too early is still an illegal transition.
pub fn authorize_delivery(
    current: OrderStatus,
    contact_recorded: bool,
    stored_otp: &str,
    submitted_otp: &str,
) -> Result<(), FulfillmentError> {
    if current != OrderStatus::Packed {
        return Err(FulfillmentError::IllegalTransition {
            action: StageAction::ConfirmDelivery,
            current,
        });
    }
    if !contact_recorded {
        return Err(FulfillmentError::Validation {
            field: "delivery_contact",
        });
    }
    if submitted_otp != stored_otp {
        return Err(FulfillmentError::OtpMismatch);
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Picked,
        OrderStatus::Packed,
        OrderStatus::Delivered,
    ];

    #[test]
    fn test_transition_table_is_exhaustive() {
        // Every (status, action) pair is either the single legal edge or a
        // typed rejection; no other edge exists.
        for action in [
            StageAction::Pick,
            StageAction::Pack,
            StageAction::ConfirmDelivery,
        ] {
            let (from, to) = action.edge().unwrap();
            for current in ALL_STATUSES {
                match plan(action, current) {
                    Ok(target) => {
                        assert_eq!(current, from);
                        assert_eq!(target, to);
                        assert_eq!(current.successor(), Some(target));
                    }
                    Err(FulfillmentError::IllegalTransition {
                        action: rejected,
                        current: at,
                    }) => {
                        assert_eq!(rejected, action);
                        assert_eq!(at, current);
                        assert_ne!(current, from);
                    }
                    Err(other) => panic!("unexpected failure: {other}"),
                }
            }
        }
    }

    #[test]
    fn test_pick_on_packed_order_is_rejected() {
        let err = plan(StageAction::Pick, OrderStatus::Packed).unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::IllegalTransition {
                action: StageAction::Pick,
                current: OrderStatus::Packed,
            }
        ));
    }

    #[test]
    fn test_pack_is_not_repeatable() {
        assert!(plan(StageAction::Pack, OrderStatus::Picked).is_ok());
        assert!(plan(StageAction::Pack, OrderStatus::Packed).is_err());
        assert!(plan(StageAction::Pack, OrderStatus::Delivered).is_err());
    }

    #[test]
    fn test_contact_stage_requires_packed_or_later() {
        assert!(require_contact_stage(OrderStatus::Pending).is_err());
        assert!(require_contact_stage(OrderStatus::Picked).is_err());
        assert!(require_contact_stage(OrderStatus::Packed).is_ok());
        assert!(require_contact_stage(OrderStatus::Delivered).is_ok());
    }

    #[test]
    fn test_delivery_authorization_order() {
        // Status precondition is evaluated before the OTP comparison: a
        // correct OTP on a not-yet-packed order is an illegal transition.
        let err = authorize_delivery(OrderStatus::Picked, true, "12345", "12345").unwrap_err();
        assert!(matches!(err, FulfillmentError::IllegalTransition { .. }));

        // Missing contact is reported before the OTP is compared.
        let err = authorize_delivery(OrderStatus::Packed, false, "12345", "99999").unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::Validation {
                field: "delivery_contact"
            }
        ));

        let err = authorize_delivery(OrderStatus::Packed, true, "12345", "54321").unwrap_err();
        assert!(matches!(err, FulfillmentError::OtpMismatch));

        assert!(authorize_delivery(OrderStatus::Packed, true, "12345", "12345").is_ok());
    }

    #[test]
    fn test_delivered_is_terminal_for_all_actions() {
        for action in [
            StageAction::Pick,
            StageAction::Pack,
            StageAction::ConfirmDelivery,
        ] {
            assert!(plan(action, OrderStatus::Delivered).is_err());
        }
    }
}
