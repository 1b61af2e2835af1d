//! Fulfillments: shipment-like groupings of order-line quantities.

use serde::{Deserialize, Serialize};

use super::OrderError;
use super::value_objects::{FulfillmentId, FulfillmentLineId, LineId, Warehouse};

/// Lifecycle status of a fulfillment.
///
/// Transitions are one-directional: a fulfillment never returns to
/// `Fulfilled` once it has left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    /// Goods shipped (the initial state).
    Fulfilled,
    /// Payment for the shipped goods was returned.
    Refunded,
    /// Goods came back.
    Returned,
    /// Goods were replaced by another fulfillment.
    Replaced,
    /// The fulfillment was cancelled (terminal state).
    Canceled,
}

impl FulfillmentStatus {
    /// Returns true if this fulfillment's lines count toward the
    /// fulfilled quantity of their order lines.
    pub fn counts_toward_fulfillment(&self) -> bool {
        !matches!(self, FulfillmentStatus::Canceled)
    }

    /// Returns true if moving to `next` is a legal forward transition.
    pub fn can_transition_to(&self, next: FulfillmentStatus) -> bool {
        match self {
            FulfillmentStatus::Fulfilled => next != FulfillmentStatus::Fulfilled,
            FulfillmentStatus::Refunded
            | FulfillmentStatus::Returned
            | FulfillmentStatus::Replaced => matches!(next, FulfillmentStatus::Canceled),
            FulfillmentStatus::Canceled => false,
        }
    }

    /// Returns the status token as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Fulfilled => "FULFILLED",
            FulfillmentStatus::Refunded => "REFUNDED",
            FulfillmentStatus::Returned => "RETURNED",
            FulfillmentStatus::Replaced => "REPLACED",
            FulfillmentStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The portion of one order line allocated to a fulfillment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentLine {
    pub id: FulfillmentLineId,
    pub order_line: LineId,
    pub quantity: u32,
}

impl FulfillmentLine {
    /// Creates a fulfillment line. The quantity must be at least 1.
    pub fn new(
        id: impl Into<FulfillmentLineId>,
        order_line: impl Into<LineId>,
        quantity: u32,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        Ok(Self {
            id: id.into(),
            order_line: order_line.into(),
            quantity,
        })
    }
}

/// A named, ordered, status-bearing grouping of fulfillment lines bound
/// to a warehouse.
///
/// The tracking number is mutated only through the order aggregate's
/// tracking-update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    id: FulfillmentId,
    fulfillment_order: u32,
    status: FulfillmentStatus,
    tracking_number: String,
    warehouse: Option<Warehouse>,
    lines: Vec<FulfillmentLine>,
}

impl Fulfillment {
    /// Creates a fulfillment in the `Fulfilled` state with no tracking
    /// number. It may start empty; lines can also be allocated at
    /// creation time.
    pub fn new(
        id: impl Into<FulfillmentId>,
        fulfillment_order: u32,
        warehouse: Option<Warehouse>,
        lines: Vec<FulfillmentLine>,
    ) -> Self {
        Self {
            id: id.into(),
            fulfillment_order,
            status: FulfillmentStatus::Fulfilled,
            tracking_number: String::new(),
            warehouse,
            lines,
        }
    }

    /// Returns the fulfillment's identifier.
    pub fn id(&self) -> &FulfillmentId {
        &self.id
    }

    /// Returns the creation-order sequence index, unique per order.
    pub fn fulfillment_order(&self) -> u32 {
        self.fulfillment_order
    }

    /// Returns the current status.
    pub fn status(&self) -> FulfillmentStatus {
        self.status
    }

    /// Returns the carrier tracking number; empty when none is set.
    pub fn tracking_number(&self) -> &str {
        &self.tracking_number
    }

    /// Returns the warehouse the fulfillment ships from.
    pub fn warehouse(&self) -> Option<&Warehouse> {
        self.warehouse.as_ref()
    }

    /// Returns the allocated lines in order.
    pub fn lines(&self) -> &[FulfillmentLine] {
        &self.lines
    }

    /// Returns true if this fulfillment's allocations count toward
    /// fulfilled quantities.
    pub fn is_active(&self) -> bool {
        self.status.counts_toward_fulfillment()
    }

    /// Sums this fulfillment's quantity allocated to an order line.
    pub fn quantity_for_line(&self, line_id: &LineId) -> u32 {
        self.lines
            .iter()
            .filter(|line| &line.order_line == line_id)
            .map(|line| line.quantity)
            .sum()
    }

    pub(crate) fn set_tracking_number(&mut self, tracking_number: String) {
        self.tracking_number = tracking_number;
    }

    pub(crate) fn transition_to(&mut self, next: FulfillmentStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidFulfillmentTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fulfillment() -> Fulfillment {
        Fulfillment::new(
            "RnVsZmlsbG1lbnQ6MQ==",
            1,
            Some(Warehouse::new("V2FyZWhvdXNlOjE=", "Main warehouse")),
            vec![
                FulfillmentLine::new("RkxpbmU6MQ==", "T3JkZXJMaW5lOjE=", 2).unwrap(),
                FulfillmentLine::new("RkxpbmU6Mg==", "T3JkZXJMaW5lOjI=", 1).unwrap(),
            ],
        )
    }

    #[test]
    fn new_fulfillment_starts_fulfilled_without_tracking() {
        let fulfillment = fulfillment();
        assert_eq!(fulfillment.status(), FulfillmentStatus::Fulfilled);
        assert_eq!(fulfillment.tracking_number(), "");
        assert!(fulfillment.is_active());
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let result = FulfillmentLine::new("RkxpbmU6Mw==", "T3JkZXJMaW5lOjE=", 0);
        assert!(matches!(
            result,
            Err(OrderError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn quantity_for_line_sums_matching_lines() {
        let fulfillment = fulfillment();
        assert_eq!(
            fulfillment.quantity_for_line(&LineId::new("T3JkZXJMaW5lOjE=")),
            2
        );
        assert_eq!(
            fulfillment.quantity_for_line(&LineId::new("T3JkZXJMaW5lOjk=")),
            0
        );
    }

    #[test]
    fn status_transitions_are_one_directional() {
        assert!(FulfillmentStatus::Fulfilled.can_transition_to(FulfillmentStatus::Returned));
        assert!(FulfillmentStatus::Returned.can_transition_to(FulfillmentStatus::Canceled));
        assert!(!FulfillmentStatus::Returned.can_transition_to(FulfillmentStatus::Fulfilled));
        assert!(!FulfillmentStatus::Canceled.can_transition_to(FulfillmentStatus::Fulfilled));
    }

    #[test]
    fn cancelled_fulfillment_stops_counting() {
        let mut fulfillment = fulfillment();
        fulfillment.transition_to(FulfillmentStatus::Canceled).unwrap();
        assert!(!fulfillment.is_active());
        assert_eq!(fulfillment.status(), FulfillmentStatus::Canceled);
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut fulfillment = fulfillment();
        fulfillment.transition_to(FulfillmentStatus::Canceled).unwrap();
        let result = fulfillment.transition_to(FulfillmentStatus::Refunded);
        assert!(matches!(
            result,
            Err(OrderError::InvalidFulfillmentTransition { .. })
        ));
    }

    #[test]
    fn status_tokens_are_stable() {
        assert_eq!(
            serde_json::to_string(&FulfillmentStatus::Fulfilled).unwrap(),
            "\"FULFILLED\""
        );
        assert_eq!(
            serde_json::to_string(&FulfillmentStatus::Canceled).unwrap(),
            "\"CANCELED\""
        );
    }

    #[test]
    fn wire_shape_uses_camel_case() {
        let json = serde_json::to_value(fulfillment()).unwrap();
        assert!(json["fulfillmentOrder"].is_number());
        assert!(json["trackingNumber"].is_string());
        assert_eq!(json["lines"][0]["orderLine"], "T3JkZXJMaW5lOjE=");
    }
}
