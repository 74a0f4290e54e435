//! Spending entries and the raw input they are parsed from.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use apunta_shared::CurrencyCode;

use super::error::LedgerError;

/// Payer names meaning "shared by everyone, split evenly".
pub const SHARED_PAYERS: [&str; 2] = ["B", "All"];

/// Largest amount magnitude accepted from user input: one trillion.
///
/// Keeps converted amounts and monthly sums far inside the [`Decimal`] range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Date format accepted from user input.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns true if `payer` is one of the shared sentinels.
#[must_use]
pub fn is_shared_payer(payer: &str) -> bool {
    SHARED_PAYERS.contains(&payer)
}

/// A dated spending entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Day the money was spent.
    pub date: NaiveDate,
    /// Spending category.
    pub category: String,
    /// Payer name, or a shared sentinel.
    pub payer: String,
    /// Currency the amount is expressed in.
    pub currency: CurrencyCode,
    /// Rate to the base currency. Zero until resolved; one for the base currency.
    pub exch_rate: Decimal,
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
}

impl Entry {
    /// Creates an entry with an unresolved exchange rate.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        payer: impl Into<String>,
        currency: CurrencyCode,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            payer: payer.into(),
            currency,
            exch_rate: Decimal::ZERO,
            amount,
            comment: String::new(),
        }
    }

    /// Sets the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the exchange rate.
    #[must_use]
    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.exch_rate = rate;
        self
    }

    /// True if the entry is split among all payers.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        is_shared_payer(&self.payer)
    }

    /// True once a non-zero rate has been stored.
    #[must_use]
    pub fn is_rate_resolved(&self) -> bool {
        !self.exch_rate.is_zero()
    }

    /// Rate used to convert this entry to `base`.
    #[must_use]
    pub fn rate_to(&self, base: &CurrencyCode) -> Decimal {
        if self.currency == *base {
            Decimal::ONE
        } else {
            self.exch_rate
        }
    }
}

/// Raw entry fields as typed by a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryInput {
    /// Date as `YYYY-MM-DD`.
    pub date: String,
    /// Spending category.
    #[serde(default)]
    pub category: String,
    /// Payer name.
    pub payer: String,
    /// Currency code.
    pub currency: String,
    /// Decimal amount; a comma decimal separator is accepted.
    pub amount: String,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl EntryInput {
    /// Validates the raw fields and builds an [`Entry`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unparseable date, a non-numeric
    /// amount or one larger than [`MAX_AMOUNT`] in magnitude, a malformed
    /// currency code or an empty payer.
    pub fn parse(&self) -> Result<Entry, LedgerError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), INPUT_DATE_FORMAT)
            .map_err(|_| LedgerError::InvalidDate(self.date.clone()))?;

        let normalized = self.amount.trim().replace(',', ".");
        let amount = Decimal::from_str(&normalized)
            .map_err(|_| LedgerError::InvalidAmount(self.amount.clone()))?;
        if amount.abs() > MAX_AMOUNT {
            return Err(LedgerError::InvalidAmount(self.amount.clone()));
        }

        let currency = CurrencyCode::parse(&self.currency)
            .map_err(|_| LedgerError::InvalidCurrency(self.currency.clone()))?;

        let payer = self.payer.trim();
        if payer.is_empty() {
            return Err(LedgerError::EmptyPayer);
        }

        let entry = Entry::new(date, self.category.trim(), payer, currency, amount);
        Ok(match &self.comment {
            Some(comment) => entry.with_comment(comment.trim()),
            None => entry,
        })
    }
}
