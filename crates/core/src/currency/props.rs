//! Property-based tests for currency operations.
//!
//! - Conversion rounds to 4 decimal places
//! - Even splits sum exactly to the shared amount
//! - Averages stay between the smallest and largest rate
//! - Reconciled entries sharing a currency and date end with equal rates

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocation::AllocationUtil;
use super::exchange::StaticRateSource;
use super::reconcile::RateReconciler;
use super::service::CurrencyService;
use crate::CurrencyCode;
use crate::ledger::{Entry, MonthRecord};

/// Strategy for signed amounts (-100,000.00 to 1,000,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for positive rates with 8 decimal places (0.00000001 to 50).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000_000i64).prop_map(|v| Decimal::new(v, 8))
}

/// Strategy for a non-base currency code.
fn foreign_currency() -> impl Strategy<Value = CurrencyCode> {
    prop_oneof![
        Just(CurrencyCode::parse("CHF").unwrap()),
        Just(CurrencyCode::parse("USD").unwrap()),
        Just(CurrencyCode::parse("GBP").unwrap()),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_convert_rounds_to_4_decimals(
        amount in signed_amount(),
        rate in positive_rate(),
    ) {
        let result = CurrencyService::convert(amount, rate).unwrap();
        prop_assert!(result.scale() <= CurrencyService::AMOUNT_DECIMAL_PLACES);
        prop_assert_eq!(result, CurrencyService::round(amount * rate, 4));
    }

    #[test]
    fn prop_allocate_equal_sums_exactly(
        total in signed_amount(),
        count in 1usize..20,
    ) {
        let parts = AllocationUtil::allocate_equal(total, count, 4);

        prop_assert_eq!(parts.len(), count);
        prop_assert_eq!(parts.iter().copied().sum::<Decimal>(), total);

        let largest = parts.iter().copied().max().unwrap();
        let smallest = parts.iter().copied().min().unwrap();
        prop_assert!(largest - smallest <= Decimal::new(1, 4));
    }

    #[test]
    fn prop_average_within_bounds(rates in prop::collection::vec(positive_rate(), 1..20)) {
        let avg = CurrencyService::average(&rates).unwrap();
        let low = rates.iter().copied().min().unwrap();
        let high = rates.iter().copied().max().unwrap();

        prop_assert!(avg >= CurrencyService::round(low, 8));
        prop_assert!(avg <= CurrencyService::round(high, 8));
    }

    #[test]
    fn prop_reconcile_shares_rates_and_averages_them(
        picks in prop::collection::vec((foreign_currency(), 1u32..6), 0..25),
        rate_seed in positive_rate(),
    ) {
        let base = CurrencyCode::eur();
        let date = |d: u32| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();

        let mut table = StaticRateSource::new();
        for currency in ["CHF", "USD", "GBP"] {
            for d in 1u32..6 {
                let rate = rate_seed + Decimal::from(d);
                table = table.with_rate(CurrencyCode::parse(currency).unwrap(), date(d), rate);
            }
        }
        let source = Arc::new(table);
        let reconciler = RateReconciler::new(source.clone()).with_concurrency(4);

        let mut month = MonthRecord::new(date(1), "July");
        month.entries = picks
            .iter()
            .map(|(currency, d)| Entry::new(date(*d), "Misc", "Alice", currency.clone(), Decimal::ONE))
            .collect();

        let report = runtime().block_on(reconciler.reconcile(&mut month, &base));

        let mut pairs: Vec<_> = picks.iter().map(|(c, d)| (c.clone(), *d)).collect();
        pairs.sort();
        pairs.dedup();
        prop_assert_eq!(source.requests(), pairs.len());
        prop_assert_eq!(report.fetched, pairs.len());
        prop_assert_eq!(report.fetched + report.reused, picks.len());

        for entry in &month.entries {
            let expected = rate_seed + Decimal::from(chrono::Datelike::day(&entry.date));
            prop_assert_eq!(entry.exch_rate, expected);
        }

        for avg in &month.avg_rates {
            let rates: Vec<Decimal> = month
                .entries
                .iter()
                .filter(|e| e.currency == avg.from_currency)
                .map(|e| e.exch_rate)
                .collect();
            prop_assert_eq!(Some(avg.rate), CurrencyService::average(&rates));
        }
    }
}
