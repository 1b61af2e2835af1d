//! Domain layer for an order-management surface.
//!
//! This crate holds the rules behind orders and their fulfillments:
//! - currency-tagged Money/TaxedMoney arithmetic with half-up rounding
//! - discounts as typed values with sequential, clamped application
//! - the order-line / fulfillment-line allocation ledger
//! - an append-only, time-ordered event trail per order
//! - the Order aggregate with derived totals, status and actions
//! - the fulfillment tracking-update operation and its wire contract
//!
//! Rendering, transport execution and routing live outside this crate;
//! only the data shapes the transport must produce are defined here.

pub mod money;
pub mod order;

pub use common::OrderId;
pub use ledger::{Entry, EventId, Ledger, LedgerEvent, Seq};
pub use money::{Currency, Money, MoneyError, TaxedMoney, reconcile_sum};
pub use order::{
    Channel, Discount, DiscountApplication, DiscountError, DiscountId, DiscountKind,
    DiscountOutcome, DiscountValueKind, EmailKind, EventDiscount, EventLine, Fulfillment,
    FulfillmentId, FulfillmentLine, FulfillmentLineId, FulfillmentStatus,
    FulfillmentUpdateResponse, FulfillmentUpdateTrackingInput, LineId, NarrativeLine, Order,
    OrderAction, OrderError, OrderErrorCode, OrderEvent, OrderLine, OrderRef, OrderService,
    OrderSnapshot, OrderStatus, PaymentChargeStatus, TRACKING_NUMBER_MAX_LEN, UserRef, Warehouse,
    WarehouseId, WireError, reconstruct,
};
