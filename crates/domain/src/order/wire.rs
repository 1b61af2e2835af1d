//! Boundary shapes for the transport layer.
//!
//! The transport component owns network concerns; this module owns the
//! data it exchanges with the domain layer: the request input, the
//! error-code enumeration, and the full order snapshot with derived
//! fields baked in. Domain errors map onto wire codes without
//! reinterpretation.

use common::OrderId;
use ledger::Entry;
use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxedMoney};

use super::OrderError;
use super::aggregate::Order;
use super::discount::Discount;
use super::events::OrderEvent;
use super::fulfillment::Fulfillment;
use super::line::OrderLine;
use super::status::{OrderAction, OrderStatus, PaymentChargeStatus};
use super::value_objects::Channel;

/// Error codes exposed at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderErrorCode {
    /// An input value failed validation.
    Invalid,
    /// A referenced object does not exist.
    NotFound,
    /// An allocation would exceed the ordered quantity.
    InsufficientStock,
}

/// A field-addressable error at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub code: OrderErrorCode,
    pub field: Option<String>,
}

impl WireError {
    /// Creates an error with a field attribution.
    pub fn new(code: OrderErrorCode, field: impl Into<String>) -> Self {
        Self {
            code,
            field: Some(field.into()),
        }
    }

    /// Creates an error without a field attribution.
    pub fn code_only(code: OrderErrorCode) -> Self {
        Self { code, field: None }
    }
}

impl From<&OrderError> for WireError {
    fn from(error: &OrderError) -> Self {
        match error {
            OrderError::Validation { field } => WireError::new(OrderErrorCode::Invalid, *field),
            OrderError::OverAllocated { .. } => {
                WireError::code_only(OrderErrorCode::InsufficientStock)
            }
            OrderError::OrderNotFound { .. }
            | OrderError::FulfillmentNotFound { .. }
            | OrderError::LineNotFound { .. }
            | OrderError::DiscountNotFound { .. } => {
                WireError::new(OrderErrorCode::NotFound, "id")
            }
            OrderError::InvalidQuantity { .. } => {
                WireError::new(OrderErrorCode::Invalid, "quantity")
            }
            OrderError::InconsistentLinePricing { .. }
            | OrderError::InvalidFulfillmentTransition { .. }
            | OrderError::AlreadyCanceled
            | OrderError::Money(_)
            | OrderError::Discount(_) => WireError::code_only(OrderErrorCode::Invalid),
        }
    }
}

/// Input of the fulfillment tracking-update operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentUpdateTrackingInput {
    /// The new tracking number; empty clears the field.
    pub tracking_number: String,
    /// Whether to queue a notification email for the customer.
    pub notify_customer: bool,
}

/// A full order snapshot as exchanged with the transport layer.
///
/// Derived fields (status, totals, actions, payment state) are computed
/// from the aggregate at capture time; a snapshot is display data, not a
/// mutation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub number: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentChargeStatus,
    pub is_paid: bool,
    pub can_finalize: bool,
    pub actions: Vec<OrderAction>,
    pub subtotal: TaxedMoney,
    pub total: TaxedMoney,
    pub undiscounted_total: TaxedMoney,
    pub total_authorized: Money,
    pub total_captured: Money,
    pub shipping_price: TaxedMoney,
    pub channel: Channel,
    pub customer_note: String,
    pub lines: Vec<OrderLine>,
    pub fulfillments: Vec<Fulfillment>,
    pub discounts: Vec<Discount>,
    pub events: Vec<Entry<OrderEvent>>,
}

impl OrderSnapshot {
    /// Captures the aggregate's current state, deriving the computed
    /// fields.
    pub fn capture(order: &Order) -> Result<Self, OrderError> {
        Ok(Self {
            id: order.id(),
            number: order.number().map(str::to_string),
            status: order.status(),
            payment_status: order.payment_status()?,
            is_paid: order.is_paid()?,
            can_finalize: order.can_finalize(),
            actions: order.actions()?,
            subtotal: order.subtotal()?,
            total: order.total()?,
            undiscounted_total: order.undiscounted_total()?,
            total_authorized: order.total_authorized(),
            total_captured: order.total_captured(),
            shipping_price: order.shipping_price(),
            channel: order.channel(),
            customer_note: order.customer_note().to_string(),
            lines: order.lines().to_vec(),
            fulfillments: order.fulfillments().to_vec(),
            discounts: order.discounts().to_vec(),
            events: order.events().entries().to_vec(),
        })
    }
}

/// Response of the fulfillment tracking-update operation.
///
/// `order` is present exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentUpdateResponse {
    pub errors: Vec<WireError>,
    pub order: Option<OrderSnapshot>,
}

impl FulfillmentUpdateResponse {
    /// Builds a success response around a snapshot.
    pub fn success(order: OrderSnapshot) -> Self {
        Self {
            errors: Vec::new(),
            order: Some(order),
        }
    }

    /// Builds a failure response. The error list must be non-empty.
    pub fn failure(errors: Vec<WireError>) -> Self {
        debug_assert!(!errors.is_empty(), "failure response without errors");
        Self {
            errors,
            order: None,
        }
    }

    /// True when the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
