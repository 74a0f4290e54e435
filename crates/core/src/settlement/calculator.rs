//! Per-payer settlement calculation.
//!
//! Every call rebuilds the payer map from scratch, so running the calculator
//! twice on the same inputs yields identical stats.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use apunta_shared::CurrencyCode;

use super::types::{Carry, MonthStats, PayerStat};
use crate::currency::{AllocationUtil, CurrencyService};
use crate::ledger::{Entry, MonthRecord};

/// Computes spent, accumulated and debt figures for a month.
pub struct SettlementCalculator;

impl SettlementCalculator {
    /// Recomputes `month.stats` from its entries and the carried debt.
    pub fn calc_stats(month: &mut MonthRecord, base: &CurrencyCode, carry: Carry<'_>) {
        month.stats = Self::compute(&month.entries, base, carry);
        debug!(
            month = %month.group_name,
            payers = month.stats.payers.len(),
            "Recomputed month stats"
        );
    }

    /// Computes stats for `entries` without touching any month.
    ///
    /// An entry whose converted amount or running total would overflow the
    /// decimal range is left out and counted in `skipped_entries`.
    #[must_use]
    pub fn compute(entries: &[Entry], base: &CurrencyCode, carry: Carry<'_>) -> MonthStats {
        let mut stats = MonthStats {
            payers: carry.seed(),
            ..MonthStats::default()
        };
        let shared = Self::attribute(entries, base, &mut stats);
        Self::distribute_shared(&shared, &mut stats);
        Self::accumulate(&mut stats.payers);
        Self::resolve_debts(&mut stats.payers);

        if stats.skipped_entries > 0 {
            warn!(
                skipped = stats.skipped_entries,
                "Entries left out of stats after amount overflow"
            );
        }
        stats
    }

    /// Adds each individual entry to its payer's `spent` and returns the
    /// converted shared amounts.
    fn attribute(entries: &[Entry], base: &CurrencyCode, stats: &mut MonthStats) -> Vec<Decimal> {
        let mut shared = Vec::new();
        for entry in entries {
            let Some(converted) = CurrencyService::convert(entry.amount, entry.rate_to(base)) else {
                warn!(
                    payer = %entry.payer,
                    amount = %entry.amount,
                    currency = %entry.currency,
                    "Converted amount overflows, entry skipped"
                );
                stats.skipped_entries += 1;
                continue;
            };
            if entry.is_shared() {
                shared.push(converted);
                continue;
            }

            let stat = stats.payers.entry(entry.payer.clone()).or_default();
            if let Some(spent) = stat.spent.checked_add(converted) {
                stat.spent = spent;
            } else {
                warn!(
                    payer = %entry.payer,
                    amount = %converted,
                    "Payer total overflows, entry skipped"
                );
                stats.skipped_entries += 1;
            }
        }
        shared
    }

    /// Splits every shared amount evenly across the known payers.
    ///
    /// Amounts with no payer to be split among go to `unallocated_shared`.
    fn distribute_shared(shared: &[Decimal], stats: &mut MonthStats) {
        for amount in shared {
            let parts = AllocationUtil::allocate_equal(
                *amount,
                stats.payers.len(),
                CurrencyService::AMOUNT_DECIMAL_PLACES,
            );
            if parts.is_empty() {
                warn!(amount = %amount, "Shared spending with no payers to split among");
                if let Some(total) = stats.unallocated_shared.checked_add(*amount) {
                    stats.unallocated_shared = total;
                } else {
                    warn!(amount = %amount, "Unallocated total overflows, entry skipped");
                    stats.skipped_entries += 1;
                }
                continue;
            }

            // All or nothing: a split that overflows any payer touches none.
            let updated: Option<Vec<Decimal>> = stats
                .payers
                .values()
                .zip(&parts)
                .map(|(stat, part)| stat.spent.checked_add(*part))
                .collect();
            if let Some(updated) = updated {
                for (stat, spent) in stats.payers.values_mut().zip(updated) {
                    stat.spent = spent;
                }
            } else {
                warn!(amount = %amount, "Shared split overflows a payer total, entry skipped");
                stats.skipped_entries += 1;
            }
        }
    }

    fn accumulate(payers: &mut BTreeMap<String, PayerStat>) {
        for stat in payers.values_mut() {
            stat.accumulated = stat.accumulated.saturating_add(stat.spent);
        }
    }

    /// Everyone below the top contributor owes the difference.
    fn resolve_debts(payers: &mut BTreeMap<String, PayerStat>) {
        let Some(top) = payers.values().map(|stat| stat.accumulated).max() else {
            return;
        };
        for stat in payers.values_mut() {
            stat.debt = if stat.accumulated >= top {
                Decimal::ZERO
            } else {
                top.saturating_sub(stat.accumulated)
            };
        }
    }
}
