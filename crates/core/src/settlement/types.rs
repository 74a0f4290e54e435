//! Settlement types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One payer's figures for a month, in the base currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerStat {
    /// Amount spent this month, including the payer's share of shared spending.
    pub spent: Decimal,
    /// Spent plus the negated debt carried in from the previous period.
    pub accumulated: Decimal,
    /// Shortfall relative to the top contributor. Never negative.
    pub debt: Decimal,
}

impl PayerStat {
    /// Seed value for a payer carrying `debt` into the month.
    #[must_use]
    pub fn carried(debt: Decimal) -> Self {
        Self {
            spent: Decimal::ZERO,
            accumulated: -debt,
            debt: Decimal::ZERO,
        }
    }
}

/// Computed statistics of a month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStats {
    /// Per-payer figures keyed by payer name.
    #[serde(default)]
    pub payers: BTreeMap<String, PayerStat>,
    /// Shared spending that had no payer to be split among.
    #[serde(default)]
    pub unallocated_shared: Decimal,
    /// Entries left out because their amount overflowed the decimal range.
    #[serde(default)]
    pub skipped_entries: usize,
}

impl MonthStats {
    /// Sum of `spent` across payers.
    #[must_use]
    pub fn total_spent(&self) -> Decimal {
        self.payers
            .values()
            .fold(Decimal::ZERO, |total, stat| total.saturating_add(stat.spent))
    }

    /// Debt of `payer`, zero if unknown.
    #[must_use]
    pub fn debt_of(&self, payer: &str) -> Decimal {
        self.payers
            .get(payer)
            .map_or(Decimal::ZERO, |stat| stat.debt)
    }
}

/// Where the debt carried into a month comes from.
#[derive(Debug, Clone, Copy)]
pub enum Carry<'a> {
    /// Chronologically first month: the document's prior-period debt.
    PriorDebt(&'a BTreeMap<String, Decimal>),
    /// Any later month: the previous month's computed stats.
    PreviousMonth(&'a MonthStats),
}

impl Carry<'_> {
    /// Seeded payer map for a fresh computation.
    ///
    /// Prior-period payers with zero debt are skipped; previous-month payers
    /// are always carried.
    #[must_use]
    pub fn seed(&self) -> BTreeMap<String, PayerStat> {
        match self {
            Self::PriorDebt(debts) => debts
                .iter()
                .filter(|(_, debt)| !debt.is_zero())
                .map(|(payer, debt)| (payer.clone(), PayerStat::carried(*debt)))
                .collect(),
            Self::PreviousMonth(stats) => stats
                .payers
                .iter()
                .map(|(payer, stat)| (payer.clone(), PayerStat::carried(stat.debt)))
                .collect(),
        }
    }
}
