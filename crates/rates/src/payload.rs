//! Historical rates payload and cross-rate derivation.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use apunta_core::CurrencyCode;
use apunta_core::currency::{CurrencyService, RateError};

/// Body of `GET /historical/{date}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalRates {
    /// Currency every quote is expressed against.
    #[serde(default)]
    pub base: Option<String>,
    /// Units of each currency per one unit of `base`.
    pub rates: HashMap<String, serde_json::Number>,
}

impl HistoricalRates {
    /// Exact decimal quote for `currency`.
    ///
    /// # Errors
    ///
    /// Returns `MissingSymbol` if the currency is not quoted and
    /// `InvalidQuote` if the quote is not a positive number.
    pub fn quote(&self, currency: &CurrencyCode) -> Result<Decimal, RateError> {
        let raw = self
            .rates
            .get(currency.as_str())
            .ok_or_else(|| RateError::MissingSymbol(currency.to_string()))?
            .to_string();
        let quote = Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| RateError::InvalidQuote(currency.to_string()))?;
        if quote <= Decimal::ZERO {
            return Err(RateError::InvalidQuote(currency.to_string()));
        }
        Ok(quote)
    }
}

/// Rate converting one `from` unit to `to`, rounded to 8 decimal places.
///
/// # Errors
///
/// Returns an error if either currency is missing or badly quoted.
pub fn rate_from_payload(
    payload: &HistoricalRates,
    from: &CurrencyCode,
    to: &CurrencyCode,
) -> Result<Decimal, RateError> {
    if from == to {
        return Ok(Decimal::ONE);
    }
    let from_quote = payload.quote(from)?;
    let to_quote = payload.quote(to)?;
    Ok(CurrencyService::round(
        to_quote / from_quote,
        CurrencyService::RATE_DECIMAL_PLACES,
    ))
}
