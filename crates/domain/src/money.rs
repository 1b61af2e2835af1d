//! Currency-tagged monetary value objects.
//!
//! [`Money`] is a decimal amount in one currency; [`TaxedMoney`] is the
//! gross/net/tax triple used for every price on an order. Arithmetic
//! between different currencies never coerces; it fails with
//! [`MoneyError::CurrencyMismatch`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported ISO-4217 currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// United States Dollar
    USD,
    /// Euro
    EUR,
    /// Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
}

impl Currency {
    /// Returns the ISO-4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Returns the number of minor-unit decimal places.
    ///
    /// JPY has no minor unit; the others use 2.
    pub const fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            Currency::USD | Currency::EUR | Currency::GBP => 2,
        }
    }

    /// Returns one minor unit of this currency as a decimal.
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.minor_units())
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors from monetary arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two operands carried different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// A gross/net/tax triple did not satisfy `gross == net + tax`
    /// within one minor unit.
    #[error("taxed amount parts disagree: gross {gross}, net + tax {expected}")]
    InconsistentParts { gross: Decimal, expected: Decimal },
}

fn ensure_same_currency(left: Currency, right: Currency) -> Result<(), MoneyError> {
    if left == right {
        Ok(())
    } else {
        Err(MoneyError::CurrencyMismatch { left, right })
    }
}

/// A decimal amount in a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new amount in the given currency.
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates an amount from whole major units (e.g. dollars).
    pub fn from_major(major: i64, currency: Currency) -> Self {
        Self {
            amount: Decimal::from(major),
            currency,
        }
    }

    /// Returns zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns the amount.
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency.
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Adds two amounts of the same currency.
    pub fn add(&self, other: Money) -> Result<Money, MoneyError> {
        ensure_same_currency(self.currency, other.currency)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// Subtracts an amount of the same currency.
    pub fn subtract(&self, other: Money) -> Result<Money, MoneyError> {
        ensure_same_currency(self.currency, other.currency)?;
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    /// Negates the amount.
    pub fn negate(&self) -> Money {
        Money {
            amount: -self.amount,
            currency: self.currency,
        }
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Money {
        Money {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Multiplies by a unit count. Exact; no rounding occurs.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            amount: self.amount * Decimal::from(quantity),
            currency: self.currency,
        }
    }

    /// Multiplies by a decimal factor, rounding half-up to the
    /// currency's minor-unit precision.
    pub fn scale(&self, factor: Decimal) -> Money {
        Money {
            amount: self.amount * factor,
            currency: self.currency,
        }
        .rounded()
    }

    /// Applies a percentage (e.g. `25` for 25%), rounding half-up to the
    /// currency's minor-unit precision.
    pub fn apply_percentage(&self, percentage: Decimal) -> Money {
        self.scale(percentage / Decimal::ONE_HUNDRED)
    }

    /// Rounds half-up to the currency's minor-unit precision.
    pub fn rounded(&self) -> Money {
        Money {
            amount: self.amount.round_dp_with_strategy(
                self.currency.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

impl PartialOrd for Money {
    /// Amounts of different currencies are not comparable.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.currency == other.currency {
            self.amount.partial_cmp(&other.amount)
        } else {
            None
        }
    }
}

/// Reassigns the rounding residue between `target` and the sum of
/// `parts` onto the first part, so that the parts sum to the target
/// exactly.
///
/// The first-part convention keeps the rule deterministic. An empty
/// slice is left untouched.
pub fn reconcile_sum(target: Money, parts: &mut [Money]) -> Result<(), MoneyError> {
    let mut sum = Money::zero(target.currency());
    for part in parts.iter() {
        sum = sum.add(*part)?;
    }
    let residue = target.subtract(sum)?;
    if !residue.is_zero()
        && let Some(first) = parts.first_mut()
    {
        *first = first.add(residue)?;
    }
    Ok(())
}

/// A gross/net/tax triple in one currency.
///
/// Invariant: `gross == net + tax`, exactly for values produced by this
/// module's operations and within one minor unit for values accepted
/// from outside via [`TaxedMoney::from_parts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxedMoney {
    gross: Money,
    net: Money,
    tax: Money,
}

impl TaxedMoney {
    /// Builds a taxed amount from net and tax; gross is their sum.
    pub fn from_net_and_tax(net: Money, tax: Money) -> Result<TaxedMoney, MoneyError> {
        let gross = net.add(tax)?;
        Ok(TaxedMoney { gross, net, tax })
    }

    /// Accepts an externally supplied triple, validating the single
    /// currency and the `gross == net + tax` identity within one minor
    /// unit of rounding tolerance.
    pub fn from_parts(gross: Money, net: Money, tax: Money) -> Result<TaxedMoney, MoneyError> {
        let expected = net.add(tax)?;
        ensure_same_currency(gross.currency(), net.currency())?;
        let drift = gross.subtract(expected)?.abs();
        if drift.amount() > gross.currency().minor_unit() {
            return Err(MoneyError::InconsistentParts {
                gross: gross.amount(),
                expected: expected.amount(),
            });
        }
        Ok(TaxedMoney { gross, net, tax })
    }

    /// Returns a zero triple in the given currency.
    pub fn zero(currency: Currency) -> TaxedMoney {
        TaxedMoney {
            gross: Money::zero(currency),
            net: Money::zero(currency),
            tax: Money::zero(currency),
        }
    }

    /// Returns the gross amount.
    pub const fn gross(&self) -> Money {
        self.gross
    }

    /// Returns the net amount.
    pub const fn net(&self) -> Money {
        self.net
    }

    /// Returns the tax amount.
    pub const fn tax(&self) -> Money {
        self.tax
    }

    /// Returns the currency.
    pub const fn currency(&self) -> Currency {
        self.gross.currency()
    }

    /// Adds two taxed amounts of the same currency.
    pub fn add(&self, other: &TaxedMoney) -> Result<TaxedMoney, MoneyError> {
        let gross = self.gross.add(other.gross)?;
        let net = self.net.add(other.net)?;
        let tax = gross.subtract(net)?;
        Ok(TaxedMoney { gross, net, tax })
    }

    /// Subtracts a taxed amount of the same currency.
    pub fn subtract(&self, other: &TaxedMoney) -> Result<TaxedMoney, MoneyError> {
        let gross = self.gross.subtract(other.gross)?;
        let net = self.net.subtract(other.net)?;
        let tax = gross.subtract(net)?;
        Ok(TaxedMoney { gross, net, tax })
    }

    /// Multiplies by a unit count. Exact; no rounding occurs.
    pub fn multiply(&self, quantity: u32) -> TaxedMoney {
        let gross = self.gross.multiply(quantity);
        let net = self.net.multiply(quantity);
        let tax = Money::new(gross.amount() - net.amount(), gross.currency());
        TaxedMoney { gross, net, tax }
    }

    /// Scales gross and net by a factor, rounding each half-up to minor
    /// units; tax is recomputed as gross minus net so the identity stays
    /// exact.
    pub fn scale(&self, factor: Decimal) -> TaxedMoney {
        let gross = self.gross.scale(factor);
        let net = self.net.scale(factor);
        let tax = Money::new(gross.amount() - net.amount(), gross.currency());
        TaxedMoney { gross, net, tax }
    }

    /// Rounds gross and net to minor units; tax absorbs the identity.
    pub fn rounded(&self) -> TaxedMoney {
        let gross = self.gross.rounded();
        let net = self.net.rounded();
        let tax = Money::new(gross.amount() - net.amount(), gross.currency());
        TaxedMoney { gross, net, tax }
    }

    /// Returns the tax rate (`tax / net`), or None when net is zero.
    pub fn tax_rate(&self) -> Option<Decimal> {
        if self.net.is_zero() {
            None
        } else {
            Some(self.tax.amount() / self.net.amount())
        }
    }

    /// Reduces the gross amount, shrinking net proportionally so the tax
    /// rate is preserved. A reduction larger than the gross clamps the
    /// result to zero; the second value reports whether clamping
    /// occurred.
    pub fn reduce_gross(&self, reduction: Money) -> Result<(TaxedMoney, bool), MoneyError> {
        ensure_same_currency(self.currency(), reduction.currency())?;
        if reduction.amount() > self.gross.amount() {
            return Ok((TaxedMoney::zero(self.currency()), true));
        }
        let gross = self.gross.subtract(reduction)?;
        let net = if self.gross.is_zero() {
            self.net
        } else {
            self.net.scale(gross.amount() / self.gross.amount())
        };
        let tax = Money::new(gross.amount() - net.amount(), gross.currency());
        Ok((TaxedMoney { gross, net, tax }, false))
    }
}

impl std::fmt::Display for TaxedMoney {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} gross ({} net)", self.gross, self.net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2), Currency::USD)
    }

    #[test]
    fn currency_codes_and_minor_units() {
        assert_eq!(Currency::USD.code(), "USD");
        assert_eq!(Currency::USD.minor_units(), 2);
        assert_eq!(Currency::JPY.minor_units(), 0);
        assert_eq!(Currency::JPY.minor_unit(), Decimal::ONE);
    }

    #[test]
    fn currency_serializes_as_iso_token() {
        let json = serde_json::to_string(&Currency::EUR).unwrap();
        assert_eq!(json, "\"EUR\"");
    }

    #[test]
    fn add_same_currency() {
        let sum = usd(1000).add(usd(250)).unwrap();
        assert_eq!(sum, usd(1250));
    }

    #[test]
    fn add_different_currency_fails() {
        let result = usd(1000).add(Money::from_major(10, Currency::EUR));
        assert_eq!(
            result,
            Err(MoneyError::CurrencyMismatch {
                left: Currency::USD,
                right: Currency::EUR,
            })
        );
    }

    #[test]
    fn add_negation_yields_zero() {
        let money = usd(1234);
        let sum = money.add(money.negate()).unwrap();
        assert!(sum.is_zero());
        assert_eq!(sum.currency(), Currency::USD);
    }

    #[test]
    fn subtract_different_currency_fails() {
        let result = usd(1000).subtract(Money::from_major(3, Currency::JPY));
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch { .. })));
    }

    #[test]
    fn multiply_is_exact() {
        assert_eq!(usd(333).multiply(3), usd(999));
    }

    #[test]
    fn scale_rounds_half_up() {
        // 10.05 * 0.5 = 5.025 -> 5.03
        assert_eq!(usd(1005).scale(Decimal::new(5, 1)), usd(503));
        // Negative amounts round away from zero: -5.025 -> -5.03
        assert_eq!(usd(-1005).scale(Decimal::new(5, 1)), usd(-503));
    }

    #[test]
    fn apply_percentage_rounds_to_minor_units() {
        // 10% of 0.05 = 0.005 -> 0.01
        assert_eq!(usd(5).apply_percentage(Decimal::from(10)), usd(1));
        // JPY has no minor unit: 10% of 105 = 10.5 -> 11
        let jpy = Money::from_major(105, Currency::JPY);
        assert_eq!(
            jpy.apply_percentage(Decimal::from(10)),
            Money::from_major(11, Currency::JPY)
        );
    }

    #[test]
    fn partial_ord_across_currencies_is_none() {
        let a = usd(100);
        let b = Money::from_major(1, Currency::EUR);
        assert_eq!(a.partial_cmp(&b), None);
        assert!(usd(100) < usd(200));
    }

    #[test]
    fn reconcile_sum_assigns_residue_to_first_part() {
        let target = usd(1000);
        let mut parts = vec![usd(333), usd(333), usd(333)];
        reconcile_sum(target, &mut parts).unwrap();
        assert_eq!(parts, vec![usd(334), usd(333), usd(333)]);

        let total: Decimal = parts.iter().map(|p| p.amount()).sum();
        assert_eq!(total, target.amount());
    }

    #[test]
    fn reconcile_sum_is_noop_when_exact() {
        let target = usd(600);
        let mut parts = vec![usd(200), usd(400)];
        reconcile_sum(target, &mut parts).unwrap();
        assert_eq!(parts, vec![usd(200), usd(400)]);
    }

    #[test]
    fn reconcile_sum_rejects_foreign_parts() {
        let target = usd(100);
        let mut parts = vec![Money::from_major(1, Currency::EUR)];
        assert!(reconcile_sum(target, &mut parts).is_err());
    }

    #[test]
    fn taxed_from_net_and_tax() {
        let taxed = TaxedMoney::from_net_and_tax(usd(1000), usd(230)).unwrap();
        assert_eq!(taxed.gross(), usd(1230));
        assert_eq!(taxed.tax(), usd(230));
    }

    #[test]
    fn taxed_from_parts_accepts_one_minor_unit_of_drift() {
        let taxed = TaxedMoney::from_parts(usd(1231), usd(1000), usd(230)).unwrap();
        assert_eq!(taxed.gross(), usd(1231));
    }

    #[test]
    fn taxed_from_parts_rejects_larger_drift() {
        let result = TaxedMoney::from_parts(usd(1240), usd(1000), usd(230));
        assert!(matches!(result, Err(MoneyError::InconsistentParts { .. })));
    }

    #[test]
    fn taxed_from_parts_rejects_mixed_currencies() {
        let result = TaxedMoney::from_parts(
            usd(1230),
            Money::from_major(10, Currency::EUR),
            Money::new(Decimal::new(230, 2), Currency::EUR),
        );
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch { .. })));
    }

    #[test]
    fn taxed_arithmetic_preserves_identity() {
        let a = TaxedMoney::from_net_and_tax(usd(1000), usd(230)).unwrap();
        let b = TaxedMoney::from_net_and_tax(usd(500), usd(115)).unwrap();

        let sum = a.add(&b).unwrap();
        assert_eq!(sum.gross().amount(), sum.net().amount() + sum.tax().amount());

        let diff = a.subtract(&b).unwrap();
        assert_eq!(
            diff.gross().amount(),
            diff.net().amount() + diff.tax().amount()
        );

        let tripled = a.multiply(3);
        assert_eq!(
            tripled.gross().amount(),
            tripled.net().amount() + tripled.tax().amount()
        );
    }

    #[test]
    fn scale_preserves_identity_after_rounding() {
        let taxed = TaxedMoney::from_net_and_tax(usd(999), usd(123)).unwrap();
        let scaled = taxed.scale(Decimal::new(333, 3)); // x 0.333
        assert_eq!(
            scaled.gross().amount(),
            scaled.net().amount() + scaled.tax().amount()
        );
    }

    #[test]
    fn reduce_gross_preserves_tax_rate() {
        // 23% tax rate
        let taxed = TaxedMoney::from_net_and_tax(usd(10000), usd(2300)).unwrap();
        let (reduced, clamped) = taxed.reduce_gross(usd(1230)).unwrap();
        assert!(!clamped);
        assert_eq!(reduced.gross(), usd(11070));
        // Rate is preserved within rounding
        let rate = reduced.tax_rate().unwrap();
        assert!((rate - Decimal::new(23, 2)).abs() < Decimal::new(1, 3));
    }

    #[test]
    fn reduce_gross_clamps_to_zero() {
        let taxed = TaxedMoney::from_net_and_tax(usd(800), usd(200)).unwrap();
        let (reduced, clamped) = taxed.reduce_gross(usd(1500)).unwrap();
        assert!(clamped);
        assert!(reduced.gross().is_zero());
        assert!(reduced.net().is_zero());
        assert!(reduced.tax().is_zero());
    }

    #[test]
    fn serialization_roundtrip() {
        let taxed = TaxedMoney::from_net_and_tax(usd(1000), usd(230)).unwrap();
        let json = serde_json::to_string(&taxed).unwrap();
        let restored: TaxedMoney = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, taxed);
    }
}
