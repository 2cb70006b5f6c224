//! Order Price Calculator
//!
//! Turns a cart subtotal into the frozen price breakdown stored on an order.
//! Tax is rounded to whole currency units, halves away from zero.

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{Pricing, VendorSettings};
use thiserror::Error;

/// Tax is charged in whole currency units
const TAX_DECIMAL_PLACES: u32 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Subtotal cannot be negative: {0}")]
    NegativeSubtotal(Decimal),

    #[error("Order amount out of range")]
    AmountOutOfRange,
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::with_message(ErrorCode::ValueOutOfRange, err.to_string())
    }
}

/// Compute tax, packaging fee and total for `subtotal` under `settings`.
pub fn compute_pricing(subtotal: Decimal, settings: &VendorSettings) -> Result<Pricing, PricingError> {
    if subtotal < Decimal::ZERO {
        return Err(PricingError::NegativeSubtotal(subtotal));
    }

    let packaging_fee = settings.packaging_fee;
    let tax = subtotal
        .checked_mul(settings.tax_rate)
        .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::AmountOutOfRange)?
        .round_dp_with_strategy(TAX_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let total = subtotal
        .checked_add(tax)
        .and_then(|t| t.checked_add(packaging_fee))
        .ok_or(PricingError::AmountOutOfRange)?;

    Ok(Pricing {
        subtotal,
        tax,
        packaging_fee,
        total,
    })
}

/// Amount in minor currency units (paise) for the payment provider
pub fn to_minor_units(amount: Decimal) -> Result<i64, PricingError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or(PricingError::AmountOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(fee: i64, rate: Decimal) -> VendorSettings {
        let mut s = VendorSettings::defaults_for("v-1", "Kitchen", 0);
        s.packaging_fee = Decimal::from(fee);
        s.tax_rate = rate;
        s
    }

    #[test]
    fn test_defaults_breakdown() {
        // 10 x 2 + 5 x 1
        let p = compute_pricing(Decimal::from(25), &settings(20, Decimal::from(5))).unwrap();
        assert_eq!(p.subtotal, Decimal::from(25));
        assert_eq!(p.tax, Decimal::from(1));
        assert_eq!(p.packaging_fee, Decimal::from(20));
        assert_eq!(p.total, Decimal::from(46));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 50 * 5% = 2.5 -> 3
        let p = compute_pricing(Decimal::from(50), &settings(0, Decimal::from(5))).unwrap();
        assert_eq!(p.tax, Decimal::from(3));
        // 30 * 5% = 1.5 -> 2
        let p = compute_pricing(Decimal::from(30), &settings(0, Decimal::from(5))).unwrap();
        assert_eq!(p.tax, Decimal::from(2));
        // 29 * 5% = 1.45 -> 1
        let p = compute_pricing(Decimal::from(29), &settings(0, Decimal::from(5))).unwrap();
        assert_eq!(p.tax, Decimal::from(1));
    }

    #[test]
    fn test_fractional_rate() {
        // 200 * 2.5% = 5
        let p = compute_pricing(Decimal::from(200), &settings(10, Decimal::new(25, 1))).unwrap();
        assert_eq!(p.tax, Decimal::from(5));
        assert_eq!(p.total, Decimal::from(215));
    }

    #[test]
    fn test_zero_subtotal() {
        let p = compute_pricing(Decimal::ZERO, &settings(20, Decimal::from(5))).unwrap();
        assert_eq!(p.tax, Decimal::ZERO);
        assert_eq!(p.total, Decimal::from(20));
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        let err = compute_pricing(Decimal::from(-1), &settings(20, Decimal::from(5))).unwrap_err();
        assert_eq!(err, PricingError::NegativeSubtotal(Decimal::from(-1)));
        assert_eq!(AppError::from(err).code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_total_invariant() {
        let s = settings(15, Decimal::from(18));
        for subtotal in [0, 1, 7, 99, 1234] {
            let p = compute_pricing(Decimal::from(subtotal), &s).unwrap();
            assert_eq!(p.total, p.subtotal + p.tax + p.packaging_fee);
        }
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(Decimal::from(46)), Ok(4600));
        assert_eq!(to_minor_units(Decimal::new(12345, 2)), Ok(12345));
    }

    #[test]
    fn test_minor_units_out_of_range() {
        // fits a Decimal but not an i64 of paise
        let huge = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        assert_eq!(to_minor_units(huge), Err(PricingError::AmountOutOfRange));
        assert_eq!(to_minor_units(Decimal::MAX), Err(PricingError::AmountOutOfRange));
    }

    #[test]
    fn test_overflowing_amounts_are_errors() {
        let s = settings(20, Decimal::from(100));
        assert_eq!(
            compute_pricing(Decimal::MAX, &s),
            Err(PricingError::AmountOutOfRange)
        );
        // tax fits, adding the fee does not
        let s = settings(20, Decimal::ZERO);
        assert_eq!(
            compute_pricing(Decimal::MAX, &s),
            Err(PricingError::AmountOutOfRange)
        );
    }
}
