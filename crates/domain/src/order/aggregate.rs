//! The order aggregate root.

use common::OrderId;
use ledger::{Entry, Ledger};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money, MoneyError, TaxedMoney, reconcile_sum};

use super::OrderError;
use super::discount::{Discount, DiscountOutcome, DiscountValueKind, apply_all};
use super::events::{EmailKind, EventDiscount, EventLine, OrderEvent};
use super::fulfillment::{Fulfillment, FulfillmentLine, FulfillmentStatus};
use super::line::OrderLine;
use super::status::{OrderAction, OrderStatus, PaymentChargeStatus};
use super::value_objects::{Channel, DiscountId, FulfillmentId, LineId, OrderRef, UserRef, Warehouse};

/// Maximum accepted length of a carrier tracking number.
pub const TRACKING_NUMBER_MAX_LEN: usize = 255;

/// An order: lines, fulfillments, discounts, and the event trail.
///
/// The aggregate exclusively owns its lines, fulfillments and discounts;
/// events reference it weakly through the trail's append order. All
/// mutations validate first and fail with the state untouched. Totals,
/// status and permitted actions are derivations, recomputed rather than
/// stored wherever the aggregate validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    number: Option<String>,
    status: OrderStatus,
    channel: Channel,
    customer_note: String,
    lines: Vec<OrderLine>,
    fulfillments: Vec<Fulfillment>,
    discounts: Vec<Discount>,
    events: Ledger<OrderEvent>,
    shipping_price: TaxedMoney,
    total_authorized: Money,
    total_captured: Money,
    total_refunded: Money,
}

impl Order {
    /// Creates a confirmed, unfulfilled order on a channel.
    pub fn new(id: OrderId, number: Option<String>, channel: Channel) -> Self {
        let currency = channel.currency_code;
        Self {
            id,
            number,
            status: OrderStatus::Unfulfilled,
            channel,
            customer_note: String::new(),
            lines: Vec::new(),
            fulfillments: Vec::new(),
            discounts: Vec::new(),
            events: Ledger::new(),
            shipping_price: TaxedMoney::zero(currency),
            total_authorized: Money::zero(currency),
            total_captured: Money::zero(currency),
            total_refunded: Money::zero(currency),
        }
    }

    /// Creates a draft order on a channel.
    pub fn draft(id: OrderId, number: Option<String>, channel: Channel) -> Self {
        let mut order = Self::new(id, number, channel);
        order.status = OrderStatus::Draft;
        order
    }
}

// Queries
impl Order {
    /// Returns the order's identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the human-facing order number.
    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the order's channel.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the order currency (the channel's currency).
    pub fn currency(&self) -> Currency {
        self.channel.currency_code
    }

    /// Returns the customer-facing note.
    pub fn customer_note(&self) -> &str {
        &self.customer_note
    }

    /// Returns the order lines in order.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Returns a line by ID.
    pub fn line(&self, id: &LineId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Returns the fulfillments in creation order.
    pub fn fulfillments(&self) -> &[Fulfillment] {
        &self.fulfillments
    }

    /// Returns a fulfillment by ID.
    pub fn fulfillment(&self, id: &FulfillmentId) -> Option<&Fulfillment> {
        self.fulfillments.iter().find(|f| f.id() == id)
    }

    /// Returns the recorded discounts in application order.
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    /// Returns the event trail.
    pub fn events(&self) -> &Ledger<OrderEvent> {
        &self.events
    }

    /// Returns the shipping price.
    pub fn shipping_price(&self) -> TaxedMoney {
        self.shipping_price
    }

    /// Returns the total amount authorized by the payment provider.
    pub fn total_authorized(&self) -> Money {
        self.total_authorized
    }

    /// Returns the total amount captured so far.
    pub fn total_captured(&self) -> Money {
        self.total_captured
    }

    /// Returns the total amount refunded so far.
    pub fn total_refunded(&self) -> Money {
        self.total_refunded
    }
}

// Derivations
impl Order {
    /// Sum of line totals, rounded once to minor units.
    pub fn subtotal(&self) -> Result<TaxedMoney, MoneyError> {
        let mut sum = TaxedMoney::zero(self.currency());
        for line in &self.lines {
            sum = sum.add(&line.total())?;
        }
        Ok(sum.rounded())
    }

    /// Per-line totals rounded to minor units, with the rounding residue
    /// against [`Order::subtotal`] assigned to the first line, so the
    /// line amounts sum to the subtotal exactly.
    pub fn line_totals(&self) -> Result<Vec<TaxedMoney>, MoneyError> {
        let subtotal = self.subtotal()?;
        let mut grosses: Vec<Money> = Vec::with_capacity(self.lines.len());
        let mut nets: Vec<Money> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let total = line.total();
            grosses.push(total.gross().rounded());
            nets.push(total.net().rounded());
        }
        reconcile_sum(subtotal.gross(), &mut grosses)?;
        reconcile_sum(subtotal.net(), &mut nets)?;

        let mut totals = Vec::with_capacity(self.lines.len());
        for (gross, net) in grosses.into_iter().zip(nets) {
            let tax = gross.subtract(net)?;
            totals.push(TaxedMoney::from_net_and_tax(net, tax)?);
        }
        Ok(totals)
    }

    /// Total before any order-level discount: subtotal plus shipping.
    pub fn undiscounted_total(&self) -> Result<TaxedMoney, MoneyError> {
        let mut sum = TaxedMoney::zero(self.currency());
        for line in &self.lines {
            sum = sum.add(&line.undiscounted_total())?;
        }
        sum.add(&self.shipping_price).map(|t| t.rounded())
    }

    /// Applies the recorded discounts, in order, to subtotal plus
    /// shipping. The outcome carries the ids of any discount that
    /// clamped to zero so callers can surface the condition.
    pub fn discount_outcome(&self) -> Result<DiscountOutcome, OrderError> {
        let base = self.subtotal()?.add(&self.shipping_price)?;
        Ok(apply_all(&base, &self.discounts)?)
    }

    /// The order total: subtotal plus shipping minus discounts.
    pub fn total(&self) -> Result<TaxedMoney, OrderError> {
        Ok(self.discount_outcome()?.result)
    }

    /// True once the captured amount covers the total.
    pub fn is_paid(&self) -> Result<bool, OrderError> {
        let total = self.total()?;
        Ok(self.total_captured.amount() >= total.gross().amount())
    }

    /// Charge status derived from the captured and refunded totals.
    pub fn payment_status(&self) -> Result<PaymentChargeStatus, OrderError> {
        let total = self.total()?.gross();
        let status = if !self.total_refunded.is_zero() {
            if self.total_refunded.amount() >= self.total_captured.amount() {
                PaymentChargeStatus::FullyRefunded
            } else {
                PaymentChargeStatus::PartiallyRefunded
            }
        } else if self.total_captured.is_zero() {
            PaymentChargeStatus::NotCharged
        } else if self.total_captured.amount() >= total.amount() {
            PaymentChargeStatus::FullyCharged
        } else {
            PaymentChargeStatus::PartiallyCharged
        };
        Ok(status)
    }

    /// Quantity of a line covered by active fulfillments.
    pub fn fulfilled_quantity_for(&self, line_id: &LineId) -> u32 {
        self.fulfillments
            .iter()
            .filter(|f| f.is_active())
            .map(|f| f.quantity_for_line(line_id))
            .sum()
    }

    /// Derives the status from fulfillment coverage.
    ///
    /// Pure: explicit states (draft, cancelled) pass through; otherwise
    /// the result depends only on lines and active fulfillments.
    pub fn derived_status(&self) -> OrderStatus {
        if self.status.is_explicit() {
            return self.status;
        }
        let mut any_allocated = false;
        let mut all_covered = !self.lines.is_empty();
        for line in &self.lines {
            let fulfilled = self.fulfilled_quantity_for(&line.id);
            if fulfilled > 0 {
                any_allocated = true;
            }
            if fulfilled < line.quantity {
                all_covered = false;
            }
        }
        if !any_allocated {
            OrderStatus::Unfulfilled
        } else if all_covered {
            OrderStatus::Fulfilled
        } else {
            OrderStatus::PartiallyFulfilled
        }
    }

    /// Recomputes the permitted next operations from status and payment
    /// totals. Never stored; always a re-derivation.
    pub fn actions(&self) -> Result<Vec<OrderAction>, OrderError> {
        let mut actions = Vec::new();
        if self.status == OrderStatus::Canceled {
            return Ok(actions);
        }
        let uncaptured_authorization =
            self.total_authorized.amount() > self.total_captured.amount();
        if uncaptured_authorization {
            actions.push(OrderAction::Capture);
        }
        if !self.is_paid()? {
            actions.push(OrderAction::MarkAsPaid);
        }
        if self.total_captured.is_positive() {
            actions.push(OrderAction::Refund);
        }
        if uncaptured_authorization {
            actions.push(OrderAction::Void);
        }
        Ok(actions)
    }

    /// True when a draft is ready to be finalized (or the order already
    /// left the draft state).
    pub fn can_finalize(&self) -> bool {
        match self.status {
            OrderStatus::Draft => !self.lines.is_empty() && self.channel.is_active,
            _ => true,
        }
    }

    /// Checks that no line is covered beyond its ordered quantity by
    /// active fulfillment lines.
    pub fn validate_allocation(&self) -> Result<(), OrderError> {
        for line in &self.lines {
            let requested = self.fulfilled_quantity_for(&line.id);
            if requested > line.quantity {
                return Err(OrderError::OverAllocated {
                    line_id: line.id.clone(),
                    requested,
                    available: line.quantity,
                });
            }
        }
        Ok(())
    }
}

// Mutations. Every operation validates first, mutates, appends to the
// trail where the change is event-worthy, and re-derives dependent state.
impl Order {
    /// Appends an event to the trail. This is the only trail mutator;
    /// the trail itself never deduplicates.
    pub fn record(&mut self, event: OrderEvent) -> &Entry<OrderEvent> {
        self.events.append(event)
    }

    /// Adds a line to the order.
    pub fn add_line(&mut self, line: OrderLine) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        line.validate()?;
        self.ensure_order_currency(line.unit_price.currency())?;
        if self.lines.iter().any(|existing| existing.id == line.id) {
            return Err(OrderError::Validation { field: "lineId" });
        }
        self.lines.push(line);
        self.refresh();
        Ok(())
    }

    /// Sets the shipping price.
    pub fn set_shipping_price(&mut self, price: TaxedMoney) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.ensure_order_currency(price.currency())?;
        self.shipping_price = price;
        Ok(())
    }

    /// Sets the amount authorized by the payment provider.
    pub fn set_total_authorized(&mut self, amount: Money) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.ensure_order_currency(amount.currency())?;
        self.total_authorized = amount;
        Ok(())
    }

    /// Sets the customer note.
    pub fn set_customer_note(&mut self, note: impl Into<String>) {
        self.customer_note = note.into();
    }

    /// Records an order-level discount.
    ///
    /// The discount's carried amount is validated against a
    /// recomputation from the current (already discounted) base; a
    /// disagreeing amount is rejected.
    pub fn add_discount(&mut self, discount: Discount) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.ensure_order_currency(discount.amount.currency())?;
        let base = self.discount_outcome()?.result;
        discount.validate_against(base.gross())?;

        let event = OrderEvent::discount_added(&discount);
        self.discounts.push(discount);
        self.events.append(event);
        Ok(())
    }

    /// Replaces a recorded discount, revalidating against the base the
    /// discount applies to (everything before it in the sequence).
    pub fn update_discount(&mut self, id: &DiscountId, new: Discount) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.ensure_order_currency(new.amount.currency())?;
        let index = self
            .discounts
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| OrderError::DiscountNotFound { id: id.clone() })?;

        let base = self.subtotal()?.add(&self.shipping_price)?;
        let before = apply_all(&base, &self.discounts[..index])?;
        new.validate_against(before.result.gross())?;

        let event = OrderEvent::discount_updated(&self.discounts[index], &new);
        self.discounts[index] = new;
        self.events.append(event);
        Ok(())
    }

    /// Removes a recorded discount.
    pub fn remove_discount(
        &mut self,
        id: &DiscountId,
        user: Option<UserRef>,
    ) -> Result<Discount, OrderError> {
        self.ensure_mutable()?;
        let index = self
            .discounts
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| OrderError::DiscountNotFound { id: id.clone() })?;
        let removed = self.discounts.remove(index);
        self.events.append(OrderEvent::discount_removed(user));
        Ok(removed)
    }

    /// Applies a per-unit discount to a line, recording the old and new
    /// values on the trail.
    pub fn set_line_discount(
        &mut self,
        line_id: &LineId,
        unit_discount: Money,
        value: Decimal,
        kind: DiscountValueKind,
        reason: Option<String>,
    ) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.ensure_order_currency(unit_discount.currency())?;
        let index = self
            .lines
            .iter()
            .position(|l| &l.id == line_id)
            .ok_or_else(|| OrderError::LineNotFound { id: line_id.clone() })?;

        let old = &self.lines[index];
        let event = OrderEvent::LineDiscountUpdated(super::events::LineDiscountUpdatedData {
            line: EventLine {
                quantity: Some(old.quantity),
                item_name: Some(old.product_name.clone()),
                order_line: Some(old.id.clone()),
            },
            discount: EventDiscount {
                value_kind: kind,
                value,
                reason: reason.clone(),
                amount: Some(unit_discount),
                old_value_kind: old.unit_discount_type,
                old_value: Some(old.unit_discount_value),
                old_amount: Some(old.unit_discount),
            },
        });

        let quantity_fulfilled = old.quantity_fulfilled;
        let mut updated = old
            .clone()
            .with_unit_discount(unit_discount, value, kind, reason)?;
        updated.quantity_fulfilled = quantity_fulfilled;

        self.lines[index] = updated;
        self.events.append(event);
        self.refresh();
        Ok(())
    }

    /// Creates a fulfillment covering quantities of existing lines.
    ///
    /// The allocation check runs against the prospective state and the
    /// operation fails before any mutation when a line would be covered
    /// beyond its ordered quantity.
    pub fn add_fulfillment(
        &mut self,
        id: impl Into<FulfillmentId>,
        warehouse: Option<Warehouse>,
        lines: Vec<FulfillmentLine>,
    ) -> Result<&Fulfillment, OrderError> {
        self.ensure_mutable()?;
        for allocation in &lines {
            if self.line(&allocation.order_line).is_none() {
                return Err(OrderError::LineNotFound {
                    id: allocation.order_line.clone(),
                });
            }
        }
        for line in &self.lines {
            let current = self.fulfilled_quantity_for(&line.id);
            let added: u32 = lines
                .iter()
                .filter(|allocation| allocation.order_line == line.id)
                .map(|allocation| allocation.quantity)
                .sum();
            if current + added > line.quantity {
                return Err(OrderError::OverAllocated {
                    line_id: line.id.clone(),
                    requested: current + added,
                    available: line.quantity,
                });
            }
        }

        let event_lines = lines
            .iter()
            .map(|allocation| EventLine {
                quantity: Some(allocation.quantity),
                item_name: self
                    .line(&allocation.order_line)
                    .map(|l| l.product_name.clone()),
                order_line: Some(allocation.order_line.clone()),
            })
            .collect();
        let order_index = self
            .fulfillments
            .last()
            .map(|f| f.fulfillment_order() + 1)
            .unwrap_or(1);

        self.fulfillments
            .push(Fulfillment::new(id, order_index, warehouse, lines));
        self.events.append(OrderEvent::order_fulfilled(event_lines));
        self.refresh();
        Ok(self.fulfillments.last().expect("fulfillment was just pushed"))
    }

    /// Cancels a fulfillment, excluding its lines from allocation sums.
    /// Its creation remains on the trail.
    pub fn cancel_fulfillment(&mut self, id: &FulfillmentId) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        let fulfillment = self
            .fulfillments
            .iter_mut()
            .find(|f| f.id() == id)
            .ok_or_else(|| OrderError::FulfillmentNotFound { id: id.clone() })?;
        fulfillment.transition_to(FulfillmentStatus::Canceled)?;
        self.refresh();
        Ok(())
    }

    /// Applies a tracking-number update to a fulfillment.
    ///
    /// An empty tracking number clears the field. The update records a
    /// TRACKING_UPDATED event carrying the old and new values, plus an
    /// EMAIL_SENT event when the customer is to be notified. Quantities
    /// and money are untouched.
    pub fn update_fulfillment_tracking(
        &mut self,
        fulfillment_id: &FulfillmentId,
        tracking_number: &str,
        notify_customer: bool,
    ) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        let index = self
            .fulfillments
            .iter()
            .position(|f| f.id() == fulfillment_id)
            .ok_or_else(|| OrderError::FulfillmentNotFound {
                id: fulfillment_id.clone(),
            })?;
        if tracking_number.len() > TRACKING_NUMBER_MAX_LEN {
            return Err(OrderError::Validation {
                field: "trackingNumber",
            });
        }

        let old = self.fulfillments[index].tracking_number().to_string();
        self.fulfillments[index].set_tracking_number(tracking_number.to_string());
        self.events.append(OrderEvent::tracking_updated(
            fulfillment_id.clone(),
            old,
            tracking_number,
        ));
        if notify_customer {
            self.events
                .append(OrderEvent::email_sent(EmailKind::TrackingUpdated, None));
        }
        self.refresh();
        Ok(())
    }

    /// Records a captured payment amount.
    pub fn capture_payment(&mut self, amount: Money) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        let captured = self.total_captured.add(amount)?;
        self.total_captured = captured;
        self.events.append(OrderEvent::payment_captured(amount));
        Ok(())
    }

    /// Records a refunded amount. The refund may not exceed what has
    /// been captured and not yet refunded.
    pub fn refund_payment(
        &mut self,
        amount: Money,
        shipping_costs_included: bool,
    ) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        let refundable = self.total_captured.subtract(self.total_refunded)?;
        if amount.amount() > refundable.amount() {
            return Err(OrderError::Validation { field: "amount" });
        }
        self.total_refunded = self.total_refunded.add(amount)?;
        self.events
            .append(OrderEvent::payment_refunded(amount, shipping_costs_included));
        Ok(())
    }

    /// Adds a staff note to the trail.
    pub fn add_note(
        &mut self,
        message: impl Into<String>,
        user: Option<UserRef>,
    ) -> Result<(), OrderError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(OrderError::Validation { field: "message" });
        }
        self.events.append(OrderEvent::note_added(message, user));
        Ok(())
    }

    /// Records a generated invoice on the trail.
    pub fn record_invoice(&mut self, invoice_number: impl Into<String>) {
        self.events
            .append(OrderEvent::invoice_generated(invoice_number));
    }

    /// Records a replacement order reference on the trail.
    pub fn record_replacement(&mut self, related_order: OrderRef) {
        self.events
            .append(OrderEvent::replacement_created(related_order));
    }

    /// Cancels the order. Terminal; no further mutations are accepted.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.status = OrderStatus::Canceled;
        Ok(())
    }
}

// Internal helpers
impl Order {
    fn ensure_mutable(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::AlreadyCanceled);
        }
        Ok(())
    }

    fn ensure_order_currency(&self, currency: Currency) -> Result<(), OrderError> {
        if currency != self.currency() {
            return Err(OrderError::Money(MoneyError::CurrencyMismatch {
                left: self.currency(),
                right: currency,
            }));
        }
        Ok(())
    }

    /// Recomputes derived per-line state and the fulfillment status.
    fn refresh(&mut self) {
        let fulfilled: Vec<u32> = self
            .lines
            .iter()
            .map(|line| self.fulfilled_quantity_for(&line.id))
            .collect();
        for (line, quantity) in self.lines.iter_mut().zip(fulfilled) {
            line.quantity_fulfilled = quantity;
        }
        if !self.status.is_explicit() {
            self.status = self.derived_status();
        }
    }
}
