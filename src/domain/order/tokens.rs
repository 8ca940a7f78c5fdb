use rand::Rng;
use uuid::Uuid;

// ============================================================================
// Token Issuing - OTP and Package Tokens
// ============================================================================
//
// The OTP is a short numeric code scoped to a single order; collisions
// across orders are acceptable. It is not a security-grade credential.
//
// ============================================================================

const OTP_MIN: u32 = 10_000;
const OTP_MAX: u32 = 99_999;

/// Issue a five-digit one-time password, uniform over `[10000, 99999]`.
pub fn issue_otp() -> String {
    rand::rng().random_range(OTP_MIN..=OTP_MAX).to_string()
}

/// The opaque package token bound to an order, encoded into the scannable
/// artifact at packing. Pure function of the order id.
pub fn package_token(order_id: Uuid) -> String {
    format!("ORDER:{order_id}")
}

/// Where the boundary layer renders the scannable artifact for an order.
/// Pure function of the order id; the core never touches the filesystem.
pub fn artifact_reference(order_id: Uuid) -> String {
    format!("qr/order_{order_id}.png")
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_five_digits_in_range() {
        for _ in 0..1_000 {
            let otp = issue_otp();
            assert_eq!(otp.len(), 5);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            let value: u32 = otp.parse().unwrap();
            assert!((OTP_MIN..=OTP_MAX).contains(&value));
        }
    }

    #[test]
    fn test_package_token_is_deterministic_and_encodes_id() {
        let order_id = Uuid::new_v4();
        let token = package_token(order_id);
        assert_eq!(token, package_token(order_id));
        assert!(token.starts_with("ORDER:"));
        assert!(token.contains(&order_id.to_string()));
    }

    #[test]
    fn test_artifact_reference_is_deterministic() {
        let order_id = Uuid::new_v4();
        let artifact = artifact_reference(order_id);
        assert_eq!(artifact, artifact_reference(order_id));
        assert_eq!(artifact, format!("qr/order_{order_id}.png"));
    }

    #[test]
    fn test_tokens_differ_across_orders() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(package_token(a), package_token(b));
        assert_ne!(artifact_reference(a), artifact_reference(b));
    }
}
