//! Exchange rate types and the rate source contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use apunta_shared::CurrencyCode;

/// Average exchange rate of one currency over a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageRate {
    /// Source currency code.
    pub from_currency: CurrencyCode,
    /// Target currency code (always the base currency).
    pub to_currency: CurrencyCode,
    /// Averaged rate (1 from_currency = rate to_currency). Zero when unresolved.
    pub rate: Decimal,
}

impl AverageRate {
    /// Creates a new average rate.
    #[must_use]
    pub const fn new(from_currency: CurrencyCode, to_currency: CurrencyCode, rate: Decimal) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
        }
    }
}

/// Errors a rate source can report. They never abort a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// No provider credentials are configured.
    #[error("no exchange rate app id configured")]
    MissingAppId,

    /// The request could not be sent or its body could not be read.
    #[error("exchange rate request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("exchange rate provider returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The provider did not quote one of the requested currencies.
    #[error("exchange rate provider has no quote for {0}")]
    MissingSymbol(String),

    /// The provider quoted zero or a negative value.
    #[error("invalid quote for {0}")]
    InvalidQuote(String),

    /// The source knows no rate for this pair and date.
    #[error("no exchange rate for {from} to {to} on {date}")]
    Unavailable {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// Requested date.
        date: NaiveDate,
    },

    /// The fetch worker stopped before producing a rate.
    #[error("rate worker stopped before completion")]
    WorkerStopped,
}

/// Point-in-time exchange rate provider.
///
/// Implementations may fail or be rate limited; callers treat a failure as
/// "rate stays unresolved".
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns how many `to` units one `from` unit was worth on `date`.
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Decimal, RateError>;
}

/// In-memory rate table, keyed by source currency and date.
///
/// Counts every request so callers can observe fetch deduplication.
#[derive(Debug, Default)]
pub struct StaticRateSource {
    rates: HashMap<(CurrencyCode, NaiveDate), Decimal>,
    requests: AtomicUsize,
}

impl StaticRateSource {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate for `from` on `date`.
    #[must_use]
    pub fn with_rate(mut self, from: CurrencyCode, date: NaiveDate, rate: Decimal) -> Self {
        self.rates.insert((from, date), rate);
        self
    }

    /// Number of `fetch_rate` calls served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Decimal, RateError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(&(from.clone(), date))
            .copied()
            .ok_or_else(|| RateError::Unavailable {
                from: from.to_string(),
                to: to.to_string(),
                date,
            })
    }
}
