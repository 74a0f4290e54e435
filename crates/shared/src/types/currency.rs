//! ISO 4217 style currency codes.
//!
//! Any three-letter alphabetic code is accepted since the set of currencies
//! a group travels with is open ended. Codes are stored upper case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for malformed currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid currency code '{0}': expected three letters")]
pub struct CurrencyCodeError(pub String);

/// Three-letter currency code (e.g., "EUR", "CHF").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Euro, the default base currency.
    #[must_use]
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trimmed input is exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, CurrencyCodeError> {
        let trimmed = code.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(CurrencyCodeError(code.to_string()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("EUR", "EUR")]
    #[case("chf", "CHF")]
    #[case(" usd ", "USD")]
    #[case("Gbp", "GBP")]
    fn test_parse_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("EU")]
    #[case("EURO")]
    #[case("E1R")]
    #[case("€€€")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(CurrencyCode::parse(input).is_err());
    }

    #[test]
    fn test_display_and_compare() {
        let code = CurrencyCode::eur();
        assert_eq!(code.to_string(), "EUR");
        assert_eq!(code, "EUR");
        assert_eq!(CurrencyCode::from_str("eur").unwrap(), code);
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let code = CurrencyCode::parse("jpy").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"JPY\"");

        let back: CurrencyCode = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<CurrencyCode>("\"yen!\"").is_err());
    }
}
