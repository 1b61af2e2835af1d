//! Order lines: ordered quantity, fulfilled quantity, and unit pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{Money, MoneyError, TaxedMoney};

use super::OrderError;
use super::discount::DiscountValueKind;
use super::value_objects::LineId;

/// A purchased item quantity on an order.
///
/// `quantity_fulfilled` is derived state: the aggregate recomputes it
/// from the active fulfillment lines after every mutation. A value
/// arriving from outside is only trusted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: LineId,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: u32,
    pub quantity_fulfilled: u32,
    pub unit_discount: Money,
    pub unit_discount_value: Decimal,
    pub unit_discount_reason: Option<String>,
    pub unit_discount_type: Option<DiscountValueKind>,
    pub undiscounted_unit_price: TaxedMoney,
    pub unit_price: TaxedMoney,
    pub is_shipping_required: bool,
}

impl OrderLine {
    /// Creates an undiscounted line.
    pub fn new(
        id: impl Into<LineId>,
        product_name: impl Into<String>,
        product_sku: impl Into<String>,
        quantity: u32,
        unit_price: TaxedMoney,
    ) -> Self {
        Self {
            id: id.into(),
            product_name: product_name.into(),
            product_sku: product_sku.into(),
            quantity,
            quantity_fulfilled: 0,
            unit_discount: Money::zero(unit_price.currency()),
            unit_discount_value: Decimal::ZERO,
            unit_discount_reason: None,
            unit_discount_type: None,
            undiscounted_unit_price: unit_price,
            unit_price,
            is_shipping_required: true,
        }
    }

    /// Applies a per-unit discount, deriving the discounted unit price
    /// from the undiscounted one. The net shrinks proportionally so the
    /// tax rate is unchanged.
    pub fn with_unit_discount(
        mut self,
        unit_discount: Money,
        value: Decimal,
        kind: DiscountValueKind,
        reason: Option<String>,
    ) -> Result<Self, MoneyError> {
        let (unit_price, _) = self.undiscounted_unit_price.reduce_gross(unit_discount)?;
        self.unit_discount = unit_discount;
        self.unit_discount_value = value;
        self.unit_discount_type = Some(kind);
        self.unit_discount_reason = reason;
        self.unit_price = unit_price;
        Ok(self)
    }

    /// Marks the line as not requiring shipping (e.g. digital goods).
    pub fn without_shipping(mut self) -> Self {
        self.is_shipping_required = false;
        self
    }

    /// Returns the quantity not yet covered by an active fulfillment.
    pub fn unfulfilled_quantity(&self) -> u32 {
        self.quantity.saturating_sub(self.quantity_fulfilled)
    }

    /// Total price of the line (`unit_price * quantity`). Exact.
    pub fn total(&self) -> TaxedMoney {
        self.unit_price.multiply(self.quantity)
    }

    /// Total price before the per-unit discount. Exact.
    pub fn undiscounted_total(&self) -> TaxedMoney {
        self.undiscounted_unit_price.multiply(self.quantity)
    }

    /// Validates the line's internal invariants.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity_fulfilled > self.quantity {
            return Err(OrderError::OverAllocated {
                line_id: self.id.clone(),
                requested: self.quantity_fulfilled,
                available: self.quantity,
            });
        }

        let expected_gross = self
            .undiscounted_unit_price
            .gross()
            .subtract(self.unit_discount)?;
        if self.unit_price.gross() != expected_gross {
            return Err(OrderError::InconsistentLinePricing {
                id: self.id.clone(),
            });
        }

        Ok(())
    }
}
