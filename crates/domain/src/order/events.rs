//! Order events.
//!
//! Each event kind is a variant carrying only the fields relevant to it,
//! replacing the flat record-with-nullable-fields shape such trails are
//! often transported as. The wire form is `{"type": TOKEN, "data": {..}}`.
//! An unrecognized token deserializes into [`OrderEvent::Unknown`], which
//! is display-only and re-serializes with its original token and payload
//! untouched.

use ledger::LedgerEvent;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

use crate::money::Money;

use super::discount::{Discount, DiscountValueKind};
use super::value_objects::{FulfillmentId, LineId, OrderRef, UserRef};

mod kind {
    pub const NOTE_ADDED: &str = "NOTE_ADDED";
    pub const EMAIL_SENT: &str = "EMAIL_SENT";
    pub const ORDER_FULFILLED: &str = "ORDER_FULFILLED";
    pub const TRACKING_UPDATED: &str = "TRACKING_UPDATED";
    pub const DISCOUNT_ADDED: &str = "DISCOUNT_ADDED";
    pub const DISCOUNT_UPDATED: &str = "DISCOUNT_UPDATED";
    pub const DISCOUNT_REMOVED: &str = "DISCOUNT_REMOVED";
    pub const LINE_DISCOUNT_UPDATED: &str = "LINE_DISCOUNT_UPDATED";
    pub const PAYMENT_CAPTURED: &str = "PAYMENT_CAPTURED";
    pub const PAYMENT_REFUNDED: &str = "PAYMENT_REFUNDED";
    pub const INVOICE_GENERATED: &str = "INVOICE_GENERATED";
    pub const REPLACEMENT_CREATED: &str = "REPLACEMENT_CREATED";
}

/// Kind of notification email recorded on the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailKind {
    OrderConfirmation,
    PaymentConfirmation,
    ShippingConfirmation,
    TrackingUpdated,
    FulfillmentConfirmation,
}

/// Discount payload carried by discount events, including the previous
/// value when the event describes a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDiscount {
    pub value_kind: DiscountValueKind,
    pub value: Decimal,
    pub reason: Option<String>,
    pub amount: Option<Money>,
    pub old_value_kind: Option<DiscountValueKind>,
    pub old_value: Option<Decimal>,
    pub old_amount: Option<Money>,
}

impl EventDiscount {
    /// Builds the payload for a newly recorded discount.
    pub fn from_discount(discount: &Discount) -> Self {
        Self {
            value_kind: discount.calculation_mode,
            value: discount.value,
            reason: discount.reason.clone(),
            amount: Some(discount.amount),
            old_value_kind: None,
            old_value: None,
            old_amount: None,
        }
    }

    /// Builds the payload for a discount change, keeping the old value.
    pub fn with_previous(old: &Discount, new: &Discount) -> Self {
        Self {
            value_kind: new.calculation_mode,
            value: new.value,
            reason: new.reason.clone(),
            amount: Some(new.amount),
            old_value_kind: Some(old.calculation_mode),
            old_value: Some(old.value),
            old_amount: Some(old.amount),
        }
    }
}

/// Line payload carried by line-level events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLine {
    pub quantity: Option<u32>,
    pub item_name: Option<String>,
    pub order_line: Option<LineId>,
}

/// Data for a NOTE_ADDED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteAddedData {
    pub message: String,
    pub user: Option<UserRef>,
}

/// Data for an EMAIL_SENT event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSentData {
    pub email_type: EmailKind,
    pub recipient: Option<String>,
}

/// Data for an ORDER_FULFILLED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFulfilledData {
    pub lines: Vec<EventLine>,
}

/// Data for a TRACKING_UPDATED event, carrying the old and new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdatedData {
    pub fulfillment_id: FulfillmentId,
    pub old_tracking_number: String,
    pub new_tracking_number: String,
}

/// Data for a DISCOUNT_REMOVED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRemovedData {
    pub user: Option<UserRef>,
}

/// Data for a LINE_DISCOUNT_UPDATED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDiscountUpdatedData {
    pub line: EventLine,
    pub discount: EventDiscount,
}

/// Data for a PAYMENT_CAPTURED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCapturedData {
    pub amount: Money,
}

/// Data for a PAYMENT_REFUNDED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRefundedData {
    pub amount: Money,
    pub shipping_costs_included: bool,
}

/// Data for an INVOICE_GENERATED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceGeneratedData {
    pub invoice_number: String,
}

/// Data for a REPLACEMENT_CREATED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementCreatedData {
    pub related_order: OrderRef,
}

/// An event on an order's trail.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// A staff note was added.
    NoteAdded(NoteAddedData),

    /// A notification email was sent (or queued).
    EmailSent(EmailSentData),

    /// Order lines were fulfilled.
    OrderFulfilled(OrderFulfilledData),

    /// A fulfillment's tracking number changed.
    TrackingUpdated(TrackingUpdatedData),

    /// An order-level discount was recorded.
    DiscountAdded(EventDiscount),

    /// An order-level discount was changed.
    DiscountUpdated(EventDiscount),

    /// An order-level discount was removed.
    DiscountRemoved(DiscountRemovedData),

    /// A line-level discount was changed.
    LineDiscountUpdated(LineDiscountUpdatedData),

    /// A payment was captured.
    PaymentCaptured(PaymentCapturedData),

    /// A payment was refunded.
    PaymentRefunded(PaymentRefundedData),

    /// An invoice was generated.
    InvoiceGenerated(InvoiceGeneratedData),

    /// A replacement order was created for this one.
    ReplacementCreated(ReplacementCreatedData),

    /// An event kind this version does not recognize. Opaque and
    /// display-only; the original token and payload are preserved.
    Unknown {
        kind: String,
        data: serde_json::Value,
    },
}

impl OrderEvent {
    /// Returns the stable kind token of this event.
    pub fn kind_token(&self) -> &str {
        match self {
            OrderEvent::NoteAdded(_) => kind::NOTE_ADDED,
            OrderEvent::EmailSent(_) => kind::EMAIL_SENT,
            OrderEvent::OrderFulfilled(_) => kind::ORDER_FULFILLED,
            OrderEvent::TrackingUpdated(_) => kind::TRACKING_UPDATED,
            OrderEvent::DiscountAdded(_) => kind::DISCOUNT_ADDED,
            OrderEvent::DiscountUpdated(_) => kind::DISCOUNT_UPDATED,
            OrderEvent::DiscountRemoved(_) => kind::DISCOUNT_REMOVED,
            OrderEvent::LineDiscountUpdated(_) => kind::LINE_DISCOUNT_UPDATED,
            OrderEvent::PaymentCaptured(_) => kind::PAYMENT_CAPTURED,
            OrderEvent::PaymentRefunded(_) => kind::PAYMENT_REFUNDED,
            OrderEvent::InvoiceGenerated(_) => kind::INVOICE_GENERATED,
            OrderEvent::ReplacementCreated(_) => kind::REPLACEMENT_CREATED,
            OrderEvent::Unknown { kind, .. } => kind,
        }
    }

    /// Creates a NOTE_ADDED event.
    pub fn note_added(message: impl Into<String>, user: Option<UserRef>) -> Self {
        OrderEvent::NoteAdded(NoteAddedData {
            message: message.into(),
            user,
        })
    }

    /// Creates an EMAIL_SENT event.
    pub fn email_sent(email_type: EmailKind, recipient: Option<String>) -> Self {
        OrderEvent::EmailSent(EmailSentData {
            email_type,
            recipient,
        })
    }

    /// Creates an ORDER_FULFILLED event.
    pub fn order_fulfilled(lines: Vec<EventLine>) -> Self {
        OrderEvent::OrderFulfilled(OrderFulfilledData { lines })
    }

    /// Creates a TRACKING_UPDATED event.
    pub fn tracking_updated(
        fulfillment_id: FulfillmentId,
        old_tracking_number: impl Into<String>,
        new_tracking_number: impl Into<String>,
    ) -> Self {
        OrderEvent::TrackingUpdated(TrackingUpdatedData {
            fulfillment_id,
            old_tracking_number: old_tracking_number.into(),
            new_tracking_number: new_tracking_number.into(),
        })
    }

    /// Creates a DISCOUNT_ADDED event.
    pub fn discount_added(discount: &Discount) -> Self {
        OrderEvent::DiscountAdded(EventDiscount::from_discount(discount))
    }

    /// Creates a DISCOUNT_UPDATED event.
    pub fn discount_updated(old: &Discount, new: &Discount) -> Self {
        OrderEvent::DiscountUpdated(EventDiscount::with_previous(old, new))
    }

    /// Creates a DISCOUNT_REMOVED event.
    pub fn discount_removed(user: Option<UserRef>) -> Self {
        OrderEvent::DiscountRemoved(DiscountRemovedData { user })
    }

    /// Creates a PAYMENT_CAPTURED event.
    pub fn payment_captured(amount: Money) -> Self {
        OrderEvent::PaymentCaptured(PaymentCapturedData { amount })
    }

    /// Creates a PAYMENT_REFUNDED event.
    pub fn payment_refunded(amount: Money, shipping_costs_included: bool) -> Self {
        OrderEvent::PaymentRefunded(PaymentRefundedData {
            amount,
            shipping_costs_included,
        })
    }

    /// Creates an INVOICE_GENERATED event.
    pub fn invoice_generated(invoice_number: impl Into<String>) -> Self {
        OrderEvent::InvoiceGenerated(InvoiceGeneratedData {
            invoice_number: invoice_number.into(),
        })
    }

    /// Creates a REPLACEMENT_CREATED event.
    pub fn replacement_created(related_order: OrderRef) -> Self {
        OrderEvent::ReplacementCreated(ReplacementCreatedData { related_order })
    }
}

impl LedgerEvent for OrderEvent {
    fn kind(&self) -> &str {
        self.kind_token()
    }
}

impl Serialize for OrderEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.kind_token())?;
        match self {
            OrderEvent::NoteAdded(data) => map.serialize_entry("data", data)?,
            OrderEvent::EmailSent(data) => map.serialize_entry("data", data)?,
            OrderEvent::OrderFulfilled(data) => map.serialize_entry("data", data)?,
            OrderEvent::TrackingUpdated(data) => map.serialize_entry("data", data)?,
            OrderEvent::DiscountAdded(data) => map.serialize_entry("data", data)?,
            OrderEvent::DiscountUpdated(data) => map.serialize_entry("data", data)?,
            OrderEvent::DiscountRemoved(data) => map.serialize_entry("data", data)?,
            OrderEvent::LineDiscountUpdated(data) => map.serialize_entry("data", data)?,
            OrderEvent::PaymentCaptured(data) => map.serialize_entry("data", data)?,
            OrderEvent::PaymentRefunded(data) => map.serialize_entry("data", data)?,
            OrderEvent::InvoiceGenerated(data) => map.serialize_entry("data", data)?,
            OrderEvent::ReplacementCreated(data) => map.serialize_entry("data", data)?,
            OrderEvent::Unknown { data, .. } => map.serialize_entry("data", data)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            data: serde_json::Value,
        }

        fn data<T, E>(value: serde_json::Value) -> Result<T, E>
        where
            T: serde::de::DeserializeOwned,
            E: serde::de::Error,
        {
            serde_json::from_value(value).map_err(E::custom)
        }

        let Repr { kind, data: value } = Repr::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            kind::NOTE_ADDED => OrderEvent::NoteAdded(data(value)?),
            kind::EMAIL_SENT => OrderEvent::EmailSent(data(value)?),
            kind::ORDER_FULFILLED => OrderEvent::OrderFulfilled(data(value)?),
            kind::TRACKING_UPDATED => OrderEvent::TrackingUpdated(data(value)?),
            kind::DISCOUNT_ADDED => OrderEvent::DiscountAdded(data(value)?),
            kind::DISCOUNT_UPDATED => OrderEvent::DiscountUpdated(data(value)?),
            kind::DISCOUNT_REMOVED => OrderEvent::DiscountRemoved(data(value)?),
            kind::LINE_DISCOUNT_UPDATED => OrderEvent::LineDiscountUpdated(data(value)?),
            kind::PAYMENT_CAPTURED => OrderEvent::PaymentCaptured(data(value)?),
            kind::PAYMENT_REFUNDED => OrderEvent::PaymentRefunded(data(value)?),
            kind::INVOICE_GENERATED => OrderEvent::InvoiceGenerated(data(value)?),
            kind::REPLACEMENT_CREATED => OrderEvent::ReplacementCreated(data(value)?),
            _ => OrderEvent::Unknown { kind, data: value },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn kind_tokens_are_stable() {
        let event = OrderEvent::note_added("call the customer", None);
        assert_eq!(event.kind_token(), "NOTE_ADDED");

        let event = OrderEvent::tracking_updated(
            FulfillmentId::new("RnVsZmlsbG1lbnQ6MQ=="),
            "",
            "1Z999",
        );
        assert_eq!(event.kind_token(), "TRACKING_UPDATED");

        let event = OrderEvent::payment_captured(Money::from_major(10, Currency::USD));
        assert_eq!(event.kind_token(), "PAYMENT_CAPTURED");
    }

    #[test]
    fn known_event_roundtrip() {
        let event = OrderEvent::tracking_updated(
            FulfillmentId::new("RnVsZmlsbG1lbnQ6MQ=="),
            "1Z000",
            "1Z999",
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TRACKING_UPDATED");
        assert_eq!(json["data"]["oldTrackingNumber"], "1Z000");
        assert_eq!(json["data"]["newTrackingNumber"], "1Z999");

        let restored: OrderEvent = serde_json::from_value(json).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn email_kind_tokens() {
        let event = OrderEvent::email_sent(EmailKind::TrackingUpdated, None);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["emailType"], "TRACKING_UPDATED");
    }

    #[test]
    fn unknown_kind_is_preserved_through_roundtrip() {
        let json = serde_json::json!({
            "type": "OVERSOLD_ITEMS_NOTIFIED",
            "data": { "lines": ["T3JkZXJMaW5lOjE="] }
        });

        let event: OrderEvent = serde_json::from_value(json.clone()).unwrap();
        match &event {
            OrderEvent::Unknown { kind, data } => {
                assert_eq!(kind, "OVERSOLD_ITEMS_NOTIFIED");
                assert_eq!(data["lines"][0], "T3JkZXJMaW5lOjE=");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
        assert_eq!(event.kind_token(), "OVERSOLD_ITEMS_NOTIFIED");

        let reserialized = serde_json::to_value(&event).unwrap();
        assert_eq!(reserialized, json);
    }

    #[test]
    fn missing_data_defaults_to_null() {
        let json = serde_json::json!({ "type": "SOMETHING_NEW" });
        let event: OrderEvent = serde_json::from_value(json).unwrap();
        assert!(matches!(event, OrderEvent::Unknown { .. }));
    }

    #[test]
    fn discount_event_carries_old_and_new() {
        let old = Discount::fixed(
            "RGlzY291bnQ6MQ==",
            super::super::discount::DiscountKind::Manual,
            rust_decimal::Decimal::new(100, 2),
            Currency::USD,
            None,
        );
        let mut new = old.clone();
        new.value = rust_decimal::Decimal::new(200, 2);
        new.amount = Money::new(rust_decimal::Decimal::new(200, 2), Currency::USD);

        let event = OrderEvent::discount_updated(&old, &new);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "DISCOUNT_UPDATED");
        assert_eq!(json["data"]["value"], "2.00");
        assert_eq!(json["data"]["oldValue"], "1.00");
    }

    #[test]
    fn ledger_event_kind_matches_token() {
        use ledger::LedgerEvent as _;
        let event = OrderEvent::invoice_generated("INV-2024-0001");
        assert_eq!(event.kind(), event.kind_token());
    }
}
