//! Human-auditable reconstruction of an order's history.

use chrono::{DateTime, Utc};
use ledger::{Entry, Seq};

use super::events::OrderEvent;

/// One line of the reconstructed history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeLine {
    /// Position of the underlying event in append order.
    pub seq: Seq,
    /// When the underlying event was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Display text for the event.
    pub summary: String,
}

/// Folds the event trail into a display-ready narrative.
///
/// Pure and infallible: unknown event kinds become opaque display-only
/// lines rather than errors, and reconstructing the same snapshot twice
/// yields identical output.
pub fn reconstruct(entries: &[Entry<OrderEvent>]) -> Vec<NarrativeLine> {
    entries
        .iter()
        .map(|entry| NarrativeLine {
            seq: entry.seq,
            recorded_at: entry.recorded_at,
            summary: summarize(&entry.event),
        })
        .collect()
}

fn summarize(event: &OrderEvent) -> String {
    match event {
        OrderEvent::NoteAdded(data) => match &data.user {
            Some(user) => format!("{} added a note: {}", user.email, data.message),
            None => format!("note added: {}", data.message),
        },
        OrderEvent::EmailSent(data) => {
            let kind = match serde_json::to_value(data.email_type) {
                Ok(serde_json::Value::String(token)) => token,
                _ => "NOTIFICATION".to_string(),
            };
            match &data.recipient {
                Some(recipient) => format!("{kind} email sent to {recipient}"),
                None => format!("{kind} email sent"),
            }
        }
        OrderEvent::OrderFulfilled(data) => {
            let quantity: u32 = data.lines.iter().filter_map(|line| line.quantity).sum();
            format!("fulfilled {quantity} item(s)")
        }
        OrderEvent::TrackingUpdated(data) => {
            if data.new_tracking_number.is_empty() {
                format!("tracking number cleared on fulfillment {}", data.fulfillment_id)
            } else if data.old_tracking_number.is_empty() {
                format!(
                    "tracking number {} set on fulfillment {}",
                    data.new_tracking_number, data.fulfillment_id
                )
            } else {
                format!(
                    "tracking number changed from {} to {} on fulfillment {}",
                    data.old_tracking_number, data.new_tracking_number, data.fulfillment_id
                )
            }
        }
        OrderEvent::DiscountAdded(data) => match data.amount {
            Some(amount) => format!("discount of {amount} added"),
            None => "discount added".to_string(),
        },
        OrderEvent::DiscountUpdated(data) => match (data.old_amount, data.amount) {
            (Some(old), Some(new)) => format!("discount changed from {old} to {new}"),
            _ => "discount updated".to_string(),
        },
        OrderEvent::DiscountRemoved(data) => match &data.user {
            Some(user) => format!("{} removed the discount", user.email),
            None => "discount removed".to_string(),
        },
        OrderEvent::LineDiscountUpdated(data) => match &data.line.item_name {
            Some(name) => format!("discount on {name} updated"),
            None => "line discount updated".to_string(),
        },
        OrderEvent::PaymentCaptured(data) => format!("payment of {} captured", data.amount),
        OrderEvent::PaymentRefunded(data) => {
            if data.shipping_costs_included {
                format!("payment of {} refunded (including shipping)", data.amount)
            } else {
                format!("payment of {} refunded", data.amount)
            }
        }
        OrderEvent::InvoiceGenerated(data) => {
            format!("invoice {} generated", data.invoice_number)
        }
        OrderEvent::ReplacementCreated(data) => match &data.related_order.number {
            Some(number) => format!("replacement order {number} created"),
            None => "replacement order created".to_string(),
        },
        OrderEvent::Unknown { kind, .. } => format!("{kind} (unrecognized event)"),
    }
}
