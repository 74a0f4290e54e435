//! Property-based tests for the settlement calculator.
//!
//! - Debts are never negative and the top contributor owes nothing
//! - Spent amounts sum to the converted entry amounts
//! - Recomputing yields identical stats
//! - A month's seed is the negated debt of the month before

use std::collections::BTreeMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::SettlementCalculator;
use super::types::Carry;
use crate::CurrencyCode;
use crate::currency::CurrencyService;
use crate::ledger::Entry;

/// Strategy for payer names, shared sentinels included.
fn payer() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Alice".to_string()),
        Just("Bob".to_string()),
        Just("Carol".to_string()),
        Just("All".to_string()),
        Just("B".to_string()),
    ]
}

/// Strategy for amounts between -1,000.00 and 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (-100_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a currency with a matching rate (1 for EUR).
fn currency_and_rate() -> impl Strategy<Value = (CurrencyCode, Decimal)> {
    prop_oneof![
        Just((CurrencyCode::eur(), Decimal::ONE)),
        (1i64..500_000_000i64).prop_map(|v| (
            CurrencyCode::parse("CHF").unwrap(),
            Decimal::new(v, 8)
        )),
        (1i64..500_000_000i64).prop_map(|v| (
            CurrencyCode::parse("USD").unwrap(),
            Decimal::new(v, 8)
        )),
    ]
}

fn entry() -> impl Strategy<Value = Entry> {
    (1u32..29, payer(), currency_and_rate(), amount()).prop_map(
        |(d, payer, (currency, rate), amount)| {
            let date = NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
            Entry::new(date, "Misc", payer, currency, amount).with_rate(rate)
        },
    )
}

/// Strategy for prior-period debts of up to three payers.
fn prior_debt() -> impl Strategy<Value = BTreeMap<String, Decimal>> {
    prop::collection::btree_map(
        prop_oneof![
            Just("Alice".to_string()),
            Just("Dave".to_string()),
            Just("Erin".to_string()),
        ],
        (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        0..3,
    )
}

proptest! {
    #[test]
    fn prop_debts_non_negative_and_one_payer_square(
        entries in prop::collection::vec(entry(), 0..30),
        prior in prior_debt(),
    ) {
        let stats = SettlementCalculator::compute(
            &entries,
            &CurrencyCode::eur(),
            Carry::PriorDebt(&prior),
        );

        for stat in stats.payers.values() {
            prop_assert!(stat.debt >= Decimal::ZERO);
        }
        if !stats.payers.is_empty() {
            prop_assert!(stats.payers.values().any(|stat| stat.debt.is_zero()));
        }
    }

    #[test]
    fn prop_spent_is_conserved(entries in prop::collection::vec(entry(), 0..30)) {
        let prior = BTreeMap::new();
        let base = CurrencyCode::eur();
        let stats = SettlementCalculator::compute(&entries, &base, Carry::PriorDebt(&prior));

        let converted: Decimal = entries
            .iter()
            .map(|e| CurrencyService::convert(e.amount, e.rate_to(&base)).unwrap())
            .sum();

        prop_assert_eq!(stats.total_spent() + stats.unallocated_shared, converted);
        prop_assert_eq!(stats.skipped_entries, 0);
    }

    #[test]
    fn prop_compute_is_idempotent(
        entries in prop::collection::vec(entry(), 0..30),
        prior in prior_debt(),
    ) {
        let base = CurrencyCode::eur();
        let first = SettlementCalculator::compute(&entries, &base, Carry::PriorDebt(&prior));
        let second = SettlementCalculator::compute(&entries, &base, Carry::PriorDebt(&prior));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_next_month_seeds_from_previous_debt(
        first in prop::collection::vec(entry(), 0..20),
        prior in prior_debt(),
    ) {
        let base = CurrencyCode::eur();
        let previous = SettlementCalculator::compute(&first, &base, Carry::PriorDebt(&prior));
        let next = SettlementCalculator::compute(&[], &base, Carry::PreviousMonth(&previous));

        prop_assert_eq!(next.payers.len(), previous.payers.len());
        for (name, stat) in &next.payers {
            prop_assert_eq!(stat.spent, Decimal::ZERO);
            prop_assert_eq!(stat.accumulated, -previous.payers[name].debt);
        }
    }
}
