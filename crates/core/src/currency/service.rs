//! Currency service for conversion and rate averaging.
//!
//! Amounts converted to the base currency are rounded to 4 decimal places and
//! averaged rates to 8, both with Banker's Rounding (MidpointNearestEven).

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Currency service for conversion operations.
pub struct CurrencyService;

impl CurrencyService {
    /// Decimal places kept for amounts converted to the base currency.
    pub const AMOUNT_DECIMAL_PLACES: u32 = 4;

    /// Decimal places kept for exchange rates.
    pub const RATE_DECIMAL_PLACES: u32 = 8;

    /// Convert amount using exchange rate with Banker's Rounding.
    ///
    /// Uses `RoundingStrategy::MidpointNearestEven` (Banker's Rounding) which:
    /// - Rounds 2.5 → 2 (to nearest even)
    /// - Rounds 3.5 → 4 (to nearest even)
    ///
    /// Returns `None` when the product does not fit in a [`Decimal`].
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use apunta_core::currency::CurrencyService;
    ///
    /// let result = CurrencyService::convert(dec!(100), dec!(1.5));
    /// assert_eq!(result, Some(dec!(150.0000)));
    /// ```
    #[must_use]
    pub fn convert(amount: Decimal, rate: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(rate)
            .map(|value| Self::round(value, Self::AMOUNT_DECIMAL_PLACES))
    }

    /// Round a decimal value using Banker's Rounding.
    #[must_use]
    pub fn round(value: Decimal, decimal_places: u32) -> Decimal {
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
    }

    /// Arithmetic mean of a set of rates, rounded to [`Self::RATE_DECIMAL_PLACES`].
    ///
    /// Returns `None` for an empty set.
    #[must_use]
    pub fn average(rates: &[Decimal]) -> Option<Decimal> {
        if rates.is_empty() {
            return None;
        }
        let sum = rates
            .iter()
            .fold(Decimal::ZERO, |sum, rate| sum.saturating_add(*rate));
        let count = Decimal::from(rates.len() as u64);
        Some(Self::round(sum / count, Self::RATE_DECIMAL_PLACES))
    }
}
