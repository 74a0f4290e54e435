//! Month records: one calendar month of entries with derived rates and stats.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use apunta_shared::CurrencyCode;

use super::entry::Entry;
use crate::currency::AverageRate;
use crate::settlement::{MonthStats, PayerStat};

/// One calendar month of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// First day of the month. Identity and sort key.
    pub start_date: NaiveDate,
    /// Display name, unique within a document.
    pub group_name: String,
    /// Whether this is the month new work targets.
    #[serde(default)]
    pub active: bool,
    /// One average rate per non-base currency.
    #[serde(default)]
    pub avg_rates: Vec<AverageRate>,
    /// Per-payer statistics.
    #[serde(default)]
    pub stats: MonthStats,
    /// Entries, ordered by date after [`MonthRecord::sort_entries`].
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl MonthRecord {
    /// Creates an empty month. `date` is moved to the first of its month.
    #[must_use]
    pub fn new(date: NaiveDate, group_name: impl Into<String>) -> Self {
        Self {
            start_date: first_of_month(date),
            group_name: group_name.into(),
            active: false,
            avg_rates: Vec::new(),
            stats: MonthStats::default(),
            entries: Vec::new(),
        }
    }

    /// True if `date` falls in the same calendar month and year.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date.year() == date.year() && self.start_date.month() == date.month()
    }

    /// Stable sort of entries by date.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|entry| entry.date);
    }

    /// Stored average rate for `currency`, if any.
    #[must_use]
    pub fn average_rate(&self, currency: &CurrencyCode) -> Option<&AverageRate> {
        self.avg_rates
            .iter()
            .find(|avg| avg.from_currency == *currency)
    }

    /// Replaces the average rate for its source currency, or appends it.
    pub fn set_average_rate(&mut self, rate: AverageRate) {
        match self
            .avg_rates
            .iter_mut()
            .find(|avg| avg.from_currency == rate.from_currency)
        {
            Some(existing) => *existing = rate,
            None => self.avg_rates.push(rate),
        }
    }

    /// Statistics for `payer`, if the payer appears this month.
    #[must_use]
    pub fn payer_stat(&self, payer: &str) -> Option<&PayerStat> {
        self.stats.payers.get(payer)
    }
}

/// First day of the month containing `date`.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
