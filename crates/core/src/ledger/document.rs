//! The document: every month record plus global lookup lists.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use apunta_shared::CurrencyCode;

use super::entry::{Entry, EntryInput, is_shared_payer};
use super::error::LedgerError;
use super::month::{MonthRecord, first_of_month};
use crate::currency::{RateReconciler, ReconcileReport};
use crate::settlement::{Carry, SettlementCalculator};

/// Where [`Document::add_entry`] put an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryPlacement {
    /// Appended to the named month.
    Added {
        /// Group name of the receiving month.
        group_name: String,
    },
    /// No month covers the entry date; the entry was discarded.
    Dropped {
        /// Date of the discarded entry.
        date: NaiveDate,
    },
}

impl EntryPlacement {
    /// True if the entry was stored.
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

/// All months of a shared ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Currency every statistic is expressed in.
    #[serde(default = "CurrencyCode::eur")]
    pub base_currency: CurrencyCode,
    /// Debt carried into the first month, by payer.
    #[serde(default)]
    pub prior_debt: BTreeMap<String, Decimal>,
    /// Known categories.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Known payers, most recently added first.
    #[serde(default)]
    pub payers: Vec<String>,
    /// Known currencies.
    #[serde(default)]
    pub currencies: Vec<CurrencyCode>,
    /// Month records, ascending by start date once sorted.
    #[serde(default)]
    pub months: Vec<MonthRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(CurrencyCode::eur())
    }
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            base_currency,
            prior_debt: BTreeMap::new(),
            categories: Vec::new(),
            payers: Vec::new(),
            currencies: Vec::new(),
            months: Vec::new(),
        }
    }

    /// Stable sort of months by start date.
    pub fn sort_months(&mut self) {
        self.months.sort_by_key(|month| month.start_date);
    }

    /// True if months are in ascending start date order.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.months.is_sorted_by_key(|month| month.start_date)
    }

    /// Recomputes the stats of every month in stored order.
    ///
    /// The first month carries `prior_debt`; each later month carries the
    /// debts of the month before it.
    pub fn recompute_all(&mut self) {
        if !self.is_sorted() {
            warn!("Months are not sorted by start date, carried debt may be wrong");
        }

        for index in 0..self.months.len() {
            let (before, rest) = self.months.split_at_mut(index);
            let Some(month) = rest.first_mut() else {
                break;
            };
            let carry = match before.last() {
                Some(previous) => Carry::PreviousMonth(&previous.stats),
                None => Carry::PriorDebt(&self.prior_debt),
            };
            SettlementCalculator::calc_stats(month, &self.base_currency, carry);
        }

        debug!(months = self.months.len(), "Recomputed all month stats");
    }

    /// Index of the month covering `date`.
    #[must_use]
    pub fn month_index_for(&self, date: NaiveDate) -> Option<usize> {
        self.months.iter().position(|month| month.covers(date))
    }

    /// Appends `entry` to the month covering its date.
    ///
    /// An entry with no matching month is dropped and reported, not stored.
    pub fn add_entry(&mut self, mut entry: Entry) -> EntryPlacement {
        let Some(index) = self.month_index_for(entry.date) else {
            warn!(
                date = %entry.date,
                payer = %entry.payer,
                amount = %entry.amount,
                "No month covers entry date, dropping entry"
            );
            return EntryPlacement::Dropped { date: entry.date };
        };

        if entry.currency == self.base_currency {
            entry.exch_rate = Decimal::ONE;
        }
        self.register_category(&entry.category);
        self.register_payer(&entry.payer);
        self.register_currency(&entry.currency);

        let month = &mut self.months[index];
        info!(
            month = %month.group_name,
            date = %entry.date,
            payer = %entry.payer,
            amount = %entry.amount,
            currency = %entry.currency,
            "Added entry"
        );
        month.entries.push(entry);
        month.sort_entries();

        EntryPlacement::Added {
            group_name: month.group_name.clone(),
        }
    }

    /// Validates raw input and adds the resulting entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the input cannot be parsed.
    pub fn add_entry_input(&mut self, input: &EntryInput) -> Result<EntryPlacement, LedgerError> {
        let entry = input.parse()?;
        Ok(self.add_entry(entry))
    }

    /// Creates a month starting at the first of `start`'s month.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or another month already uses
    /// the name or the calendar month.
    pub fn create_month(&mut self, start: NaiveDate, group_name: &str) -> Result<(), LedgerError> {
        let group_name = group_name.trim();
        if group_name.is_empty() {
            return Err(LedgerError::EmptyGroupName);
        }
        if self.months.iter().any(|m| m.group_name == group_name) {
            return Err(LedgerError::DuplicateMonthName(group_name.to_string()));
        }
        let start = first_of_month(start);
        if self.month_index_for(start).is_some() {
            return Err(LedgerError::DuplicatePeriod(start));
        }

        self.months.push(MonthRecord::new(start, group_name));
        self.sort_months();
        info!(month = %group_name, start = %start, "Created month");
        Ok(())
    }

    /// Marks the named month active and every other month inactive.
    ///
    /// # Errors
    ///
    /// Returns `MonthNotFound` without touching any flag if no month has
    /// that name.
    pub fn set_active_month(&mut self, group_name: &str) -> Result<(), LedgerError> {
        self.month_by_name(group_name)?;
        for month in &mut self.months {
            month.active = month.group_name == group_name;
        }
        info!(month = %group_name, "Activated month");
        Ok(())
    }

    /// The active month, if any.
    #[must_use]
    pub fn active_month(&self) -> Option<&MonthRecord> {
        self.months.iter().find(|month| month.active)
    }

    /// Mutable access to the active month.
    pub fn active_month_mut(&mut self) -> Option<&mut MonthRecord> {
        self.months.iter_mut().find(|month| month.active)
    }

    /// Looks up a month by group name.
    ///
    /// # Errors
    ///
    /// Returns `MonthNotFound` if no month has that name.
    pub fn month_by_name(&self, group_name: &str) -> Result<&MonthRecord, LedgerError> {
        self.months
            .iter()
            .find(|month| month.group_name == group_name)
            .ok_or_else(|| LedgerError::MonthNotFound(group_name.to_string()))
    }

    /// Resolves the rates of the active month.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveMonth` if no month is active.
    pub async fn reconcile_active_month(
        &mut self,
        reconciler: &RateReconciler,
    ) -> Result<ReconcileReport, LedgerError> {
        let base = self.base_currency.clone();
        let month = self.active_month_mut().ok_or(LedgerError::NoActiveMonth)?;
        Ok(reconciler.reconcile(month, &base).await)
    }

    /// Writes the rates resolved on `reconciled`, a detached copy of one of
    /// this document's months, back onto the month of the same name.
    ///
    /// Entries are matched by (currency, date), so entries added since the
    /// copy was taken pick up a rate resolved for their pair. Average rates
    /// are then recomputed from the live entries.
    ///
    /// # Errors
    ///
    /// Returns `MonthNotFound` if no month has the copy's name.
    pub fn apply_reconciled(&mut self, reconciled: &MonthRecord) -> Result<(), LedgerError> {
        let base = self.base_currency.clone();
        let month = self
            .months
            .iter_mut()
            .find(|month| month.group_name == reconciled.group_name)
            .ok_or_else(|| LedgerError::MonthNotFound(reconciled.group_name.clone()))?;

        let rates: HashMap<(&CurrencyCode, NaiveDate), Decimal> = reconciled
            .entries
            .iter()
            .filter(|entry| entry.is_rate_resolved())
            .map(|entry| ((&entry.currency, entry.date), entry.exch_rate))
            .collect();
        for entry in &mut month.entries {
            if entry.currency == base {
                entry.exch_rate = Decimal::ONE;
            } else if let Some(&rate) = rates.get(&(&entry.currency, entry.date)) {
                entry.exch_rate = rate;
            }
        }

        RateReconciler::refresh_averages(month, &base);
        debug!(month = %month.group_name, rates = rates.len(), "Applied reconciled rates");
        Ok(())
    }

    /// Resolves the rates of every month, one month at a time.
    pub async fn reconcile_all(
        &mut self,
        reconciler: &RateReconciler,
    ) -> Vec<(String, ReconcileReport)> {
        let mut reports = Vec::with_capacity(self.months.len());
        for month in &mut self.months {
            let report = reconciler.reconcile(month, &self.base_currency).await;
            reports.push((month.group_name.clone(), report));
        }
        reports
    }

    /// Remembers a category. Blank and known names are ignored.
    pub fn register_category(&mut self, category: &str) {
        if !category.is_empty() && !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }
    }

    /// Remembers a payer, newest first. Shared sentinels are ignored.
    pub fn register_payer(&mut self, payer: &str) {
        if payer.is_empty() || is_shared_payer(payer) {
            return;
        }
        if !self.payers.iter().any(|p| p == payer) {
            self.payers.insert(0, payer.to_string());
        }
    }

    /// Remembers a currency.
    pub fn register_currency(&mut self, currency: &CurrencyCode) {
        if !self.currencies.contains(currency) {
            self.currencies.push(currency.clone());
        }
    }
}
