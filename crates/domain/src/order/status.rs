//! Order status, permitted actions, and payment charge status.

use serde::{Deserialize, Serialize};

/// Status of an order.
///
/// `Draft` and `Canceled` are explicit states set by dedicated
/// operations. The fulfillment states are derived from how much of the
/// ordered quantity is covered by active fulfillments:
///
/// ```text
/// Unfulfilled ──► PartiallyFulfilled ──► Fulfilled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order is being drafted and can still be edited freely.
    Draft,
    /// No ordered quantity is covered by a fulfillment.
    Unfulfilled,
    /// Some, but not all, ordered quantity is covered.
    PartiallyFulfilled,
    /// All ordered quantity is covered.
    Fulfilled,
    /// Order was cancelled (terminal state).
    Canceled,
}

impl OrderStatus {
    /// Returns true for the states set explicitly by dedicated
    /// operations rather than derived from fulfillments.
    pub fn is_explicit(&self) -> bool {
        matches!(self, OrderStatus::Draft | OrderStatus::Canceled)
    }

    /// Returns true if no further mutations are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Canceled)
    }

    /// Returns the status token as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Unfulfilled => "UNFULFILLED",
            OrderStatus::PartiallyFulfilled => "PARTIALLY_FULFILLED",
            OrderStatus::Fulfilled => "FULFILLED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An operation the order currently permits.
///
/// Always re-derived from status and payment totals, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAction {
    /// Capture an authorized amount.
    Capture,
    /// Mark the order as paid outside the payment flow.
    MarkAsPaid,
    /// Refund a captured amount.
    Refund,
    /// Void the remaining authorization.
    Void,
}

/// How much of the order total has been charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentChargeStatus {
    NotCharged,
    PartiallyCharged,
    FullyCharged,
    PartiallyRefunded,
    FullyRefunded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_states() {
        assert!(OrderStatus::Draft.is_explicit());
        assert!(OrderStatus::Canceled.is_explicit());
        assert!(!OrderStatus::Unfulfilled.is_explicit());
        assert!(!OrderStatus::PartiallyFulfilled.is_explicit());
        assert!(!OrderStatus::Fulfilled.is_explicit());
    }

    #[test]
    fn only_canceled_is_terminal() {
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::Fulfilled.is_terminal());
        assert!(!OrderStatus::Draft.is_terminal());
    }

    #[test]
    fn status_tokens_roundtrip() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::Unfulfilled,
            OrderStatus::PartiallyFulfilled,
            OrderStatus::Fulfilled,
            OrderStatus::Canceled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let restored: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, status);
        }
        assert_eq!(
            serde_json::to_string(&OrderStatus::PartiallyFulfilled).unwrap(),
            "\"PARTIALLY_FULFILLED\""
        );
    }

    #[test]
    fn action_tokens_are_stable() {
        assert_eq!(
            serde_json::to_string(&OrderAction::MarkAsPaid).unwrap(),
            "\"MARK_AS_PAID\""
        );
        assert_eq!(
            serde_json::to_string(&OrderAction::Capture).unwrap(),
            "\"CAPTURE\""
        );
    }

    #[test]
    fn charge_status_tokens_are_stable() {
        assert_eq!(
            serde_json::to_string(&PaymentChargeStatus::FullyCharged).unwrap(),
            "\"FULLY_CHARGED\""
        );
    }
}
