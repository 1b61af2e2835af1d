//! Order-level discounts and their application to taxed amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{Currency, Money, MoneyError, TaxedMoney};

use super::value_objects::DiscountId;

/// Where a discount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// Granted by a voucher code.
    Voucher,
    /// Entered by a staff member.
    Manual,
    /// Produced by a running sale.
    Sale,
}

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountValueKind {
    /// The value is a fixed amount in the order currency.
    Fixed,
    /// The value is a percentage of the base.
    Percentage,
}

/// Errors from discount validation and application.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscountError {
    /// Monetary arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The carried amount disagrees with the recomputed effect.
    #[error("discount {id} carries amount {stated} but recomputes to {computed}")]
    AmountMismatch {
        id: DiscountId,
        stated: Money,
        computed: Money,
    },
}

/// A discount recorded on an order.
///
/// `amount` is the monetary effect the discount had when it was applied.
/// It is validated against a recomputation rather than trusted; see
/// [`Discount::validate_against`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub calculation_mode: DiscountValueKind,
    pub value: Decimal,
    pub reason: Option<String>,
    pub amount: Money,
}

impl Discount {
    /// Creates a fixed-amount discount.
    pub fn fixed(
        id: impl Into<DiscountId>,
        kind: DiscountKind,
        value: Decimal,
        currency: Currency,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            calculation_mode: DiscountValueKind::Fixed,
            value,
            reason,
            amount: Money::new(value, currency),
        }
    }

    /// Creates a percentage discount, computing its amount from the
    /// given base gross.
    pub fn percentage(
        id: impl Into<DiscountId>,
        kind: DiscountKind,
        value: Decimal,
        base_gross: Money,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            calculation_mode: DiscountValueKind::Percentage,
            value,
            reason,
            amount: base_gross.apply_percentage(value),
        }
    }

    /// Recomputes the monetary effect of this discount against a base
    /// gross amount.
    pub fn expected_amount(&self, base_gross: Money) -> Money {
        match self.calculation_mode {
            DiscountValueKind::Fixed => Money::new(self.value, base_gross.currency()),
            DiscountValueKind::Percentage => base_gross.apply_percentage(self.value),
        }
    }

    /// Checks the carried amount against a recomputation from the base.
    ///
    /// The carried value is never treated as authoritative: a fixed
    /// discount must carry exactly its value, a percentage discount must
    /// carry the rounded percentage of the base.
    pub fn validate_against(&self, base_gross: Money) -> Result<(), DiscountError> {
        let computed = self.expected_amount(base_gross);
        if self.amount != computed {
            return Err(DiscountError::AmountMismatch {
                id: self.id.clone(),
                stated: self.amount,
                computed,
            });
        }
        Ok(())
    }
}

/// Result of applying one discount to a base amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountApplication {
    /// The discounted amount.
    pub result: TaxedMoney,
    /// True when the discount exceeded the base and the result was
    /// clamped to zero. Non-fatal; the clamped value is usable, but the
    /// caller must surface the condition.
    pub exceeded_base: bool,
}

/// Result of applying a sequence of discounts.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountOutcome {
    /// The amount after all discounts.
    pub result: TaxedMoney,
    /// Ids of the discounts whose application clamped to zero.
    pub exceeded: Vec<DiscountId>,
}

/// Applies a discount to a base amount.
///
/// Gross, net and tax shrink proportionally (the tax rate is
/// preserved). The gross never goes negative: an oversized discount
/// clamps to zero and flags `exceeded_base`.
pub fn apply(base: &TaxedMoney, discount: &Discount) -> Result<DiscountApplication, DiscountError> {
    let reduction = discount.expected_amount(base.gross());
    let (result, exceeded_base) = base.reduce_gross(reduction)?;
    Ok(DiscountApplication {
        result,
        exceeded_base,
    })
}

/// Applies discounts strictly in the order they were recorded.
///
/// Each discount applies to the base already reduced by its
/// predecessors; no reordering or combination takes place.
pub fn apply_all(base: &TaxedMoney, discounts: &[Discount]) -> Result<DiscountOutcome, DiscountError> {
    let mut result = *base;
    let mut exceeded = Vec::new();
    for discount in discounts {
        let application = apply(&result, discount)?;
        if application.exceeded_base {
            exceeded.push(discount.id.clone());
        }
        result = application.result;
    }
    Ok(DiscountOutcome { result, exceeded })
}
