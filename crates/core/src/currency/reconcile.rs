//! Rate reconciliation for a month.
//!
//! Each distinct (currency, date) pair is fetched at most once per pass. The
//! first entry seen for a pair is its representative; later entries with the
//! same pair copy its rate, so every entry of a pair ends with the same rate.
//! A representative without a rate takes one from an already resolved
//! follower instead of fetching. Fetches run as tokio tasks bounded by a
//! semaphore, and every task is joined before any rate is written.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use apunta_shared::CurrencyCode;

use super::exchange::{AverageRate, RateError, RateSource};
use super::service::CurrencyService;
use crate::ledger::MonthRecord;

/// A rate that could not be resolved during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateFailure {
    /// Source currency.
    pub currency: CurrencyCode,
    /// Requested date.
    pub date: NaiveDate,
    /// Why the fetch failed.
    pub reason: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Rates fetched from the source.
    pub fetched: usize,
    /// Entries that copied a representative's rate.
    pub reused: usize,
    /// Pairs left unresolved.
    pub failures: Vec<RateFailure>,
}

impl ReconcileReport {
    /// True if every pair was resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
struct FetchRequest {
    index: usize,
    currency: CurrencyCode,
    date: NaiveDate,
}

/// Resolves entry exchange rates and derives monthly averages.
#[derive(Clone)]
pub struct RateReconciler {
    source: Arc<dyn RateSource>,
    concurrency: usize,
}

impl RateReconciler {
    /// Default bound on fetches in flight.
    pub const DEFAULT_CONCURRENCY: usize = 10;

    /// Creates a reconciler with the default concurrency.
    #[must_use]
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the bound on fetches in flight. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Bound on fetches in flight.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolves every non-base entry rate in `month` and recomputes the
    /// month's average rates.
    ///
    /// Fetch failures leave the rate at zero and are listed in the report.
    pub async fn reconcile(&self, month: &mut MonthRecord, base: &CurrencyCode) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut representatives: HashMap<(CurrencyCode, NaiveDate), usize> = HashMap::new();
        let mut followers: Vec<(usize, usize)> = Vec::new();

        for (index, entry) in month.entries.iter_mut().enumerate() {
            if entry.currency == *base {
                entry.exch_rate = Decimal::ONE;
                continue;
            }
            match representatives.entry((entry.currency.clone(), entry.date)) {
                MapEntry::Occupied(rep) => followers.push((index, *rep.get())),
                MapEntry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }

        if representatives.is_empty() {
            return report;
        }

        for &(follower, representative) in &followers {
            let cached = month.entries[follower].exch_rate;
            if !month.entries[representative].is_rate_resolved() && !cached.is_zero() {
                month.entries[representative].exch_rate = cached;
            }
        }

        let mut pending: Vec<FetchRequest> = representatives
            .into_iter()
            .filter(|(_, index)| !month.entries[*index].is_rate_resolved())
            .map(|((currency, date), index)| FetchRequest {
                index,
                currency,
                date,
            })
            .collect();
        pending.sort_by_key(|request| request.index);

        debug!(
            month = %month.group_name,
            pending = pending.len(),
            followers = followers.len(),
            "Reconciling exchange rates"
        );

        for (request, outcome) in self.fetch_all(pending, base).await {
            match outcome {
                Ok(rate) => {
                    month.entries[request.index].exch_rate = rate;
                    report.fetched += 1;
                }
                Err(err) => {
                    warn!(
                        currency = %request.currency,
                        date = %request.date,
                        error = %err,
                        "Exchange rate fetch failed"
                    );
                    report.failures.push(RateFailure {
                        currency: request.currency,
                        date: request.date,
                        reason: err.to_string(),
                    });
                }
            }
        }

        for (follower, representative) in followers {
            let rate = month.entries[representative].exch_rate;
            month.entries[follower].exch_rate = rate;
            if !rate.is_zero() {
                report.reused += 1;
            }
        }

        Self::refresh_averages(month, base);
        report
    }

    /// Recomputes the average rate of every non-base currency in `month`.
    ///
    /// The average is the mean over all entries of the currency, so an
    /// unresolved entry counts as a zero rate and pulls the mean down.
    pub fn refresh_averages(month: &mut MonthRecord, base: &CurrencyCode) {
        let mut rates: Vec<(CurrencyCode, Vec<Decimal>)> = Vec::new();
        for entry in month.entries.iter().filter(|entry| entry.currency != *base) {
            match rates.iter_mut().find(|(currency, _)| *currency == entry.currency) {
                Some((_, list)) => list.push(entry.exch_rate),
                None => rates.push((entry.currency.clone(), vec![entry.exch_rate])),
            }
        }

        for (currency, list) in rates {
            let rate = CurrencyService::average(&list).unwrap_or(Decimal::ZERO);
            month.set_average_rate(AverageRate::new(currency, base.clone(), rate));
        }
    }

    /// Runs every request on its own task and waits for all of them.
    ///
    /// Results come back ordered by entry index.
    async fn fetch_all(
        &self,
        requests: Vec<FetchRequest>,
        base: &CurrencyCode,
    ) -> Vec<(FetchRequest, Result<Decimal, RateError>)> {
        if requests.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut expected: HashMap<usize, FetchRequest> = HashMap::new();
        let mut workers = JoinSet::new();

        for request in requests {
            expected.insert(request.index, request.clone());
            let semaphore = Arc::clone(&semaphore);
            let source = Arc::clone(&self.source);
            let to = base.clone();
            workers.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let rate = source.fetch_rate(&request.currency, &to, request.date).await;
                        drop(permit);
                        rate
                    }
                    Err(_) => Err(RateError::WorkerStopped),
                };
                (request, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(expected.len());
        let mut finished = HashSet::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((request, outcome)) => {
                    finished.insert(request.index);
                    outcomes.push((request, outcome));
                }
                Err(err) => error!(error = %err, "Exchange rate worker failed"),
            }
        }

        outcomes.extend(
            expected
                .into_iter()
                .filter(|(index, _)| !finished.contains(index))
                .map(|(_, request)| (request, Err(RateError::WorkerStopped))),
        );
        outcomes.sort_by_key(|(request, _)| request.index);
        outcomes
    }
}

impl std::fmt::Debug for RateReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateReconciler")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
