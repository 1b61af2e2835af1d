//! The order aggregate and its satellite types.

mod aggregate;
mod discount;
mod events;
mod fulfillment;
mod line;
mod narrative;
mod service;
mod status;
mod value_objects;
mod wire;

pub use aggregate::{Order, TRACKING_NUMBER_MAX_LEN};
pub use discount::{
    Discount, DiscountApplication, DiscountError, DiscountKind, DiscountOutcome,
    DiscountValueKind, apply, apply_all,
};
pub use events::{
    DiscountRemovedData, EmailKind, EmailSentData, EventDiscount, EventLine,
    InvoiceGeneratedData, LineDiscountUpdatedData, NoteAddedData, OrderEvent, OrderFulfilledData,
    PaymentCapturedData, PaymentRefundedData, ReplacementCreatedData, TrackingUpdatedData,
};
pub use fulfillment::{Fulfillment, FulfillmentLine, FulfillmentStatus};
pub use line::OrderLine;
pub use narrative::{NarrativeLine, reconstruct};
pub use service::OrderService;
pub use status::{OrderAction, OrderStatus, PaymentChargeStatus};
pub use value_objects::{
    Channel, DiscountId, FulfillmentId, FulfillmentLineId, LineId, OrderRef, UserRef, Warehouse,
    WarehouseId,
};
pub use wire::{
    FulfillmentUpdateResponse, FulfillmentUpdateTrackingInput, OrderErrorCode, OrderSnapshot,
    WireError,
};

use common::OrderId;
use thiserror::Error;

use crate::money::MoneyError;

/// Errors that can occur during order operations.
///
/// Every mutation validates before touching state, so a returned error
/// means the aggregate is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    /// No order with this ID is known.
    #[error("order not found: {id}")]
    OrderNotFound { id: OrderId },

    /// The referenced fulfillment does not belong to this order.
    #[error("fulfillment not found: {id}")]
    FulfillmentNotFound { id: FulfillmentId },

    /// The referenced order line does not exist.
    #[error("order line not found: {id}")]
    LineNotFound { id: LineId },

    /// The referenced discount does not exist.
    #[error("discount not found: {id}")]
    DiscountNotFound { id: DiscountId },

    /// Fulfillment lines would cover more than the ordered quantity.
    #[error("line {line_id} over-allocated: {requested} requested, {available} available")]
    OverAllocated {
        line_id: LineId,
        requested: u32,
        available: u32,
    },

    /// A field failed validation; the field name lets the boundary
    /// attribute the failure to a specific input.
    #[error("invalid value for field `{field}`")]
    Validation { field: &'static str },

    /// A fulfillment line quantity must be at least 1.
    #[error("invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// A line's discounted price disagrees with its discount.
    #[error("line {id} pricing is inconsistent with its unit discount")]
    InconsistentLinePricing { id: LineId },

    /// A fulfillment status may only move forward.
    #[error("fulfillment {id} cannot move from {from} to {to}")]
    InvalidFulfillmentTransition {
        id: FulfillmentId,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    },

    /// The order is cancelled and accepts no further mutations.
    #[error("order is cancelled")]
    AlreadyCanceled,

    /// Monetary arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Discount validation or application failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}
