//! Statistics and exchange rate routes.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;
use tracing::info;

use apunta_core::currency::ReconcileReport;
use apunta_core::ledger::LedgerError;

use super::months::MonthSummary;
use crate::{ApiError, AppState};

/// Creates the stats and rates routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/recompute", post(recompute_stats))
        .route("/rates/reconcile", post(reconcile_rates))
}

/// Response for `POST /rates/reconcile`.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// Reconciled month.
    pub month: MonthSummary,
    /// Fetch outcome.
    pub report: ReconcileReport,
}

/// POST `/stats/recompute` - Sort months and recompute every month's stats.
async fn recompute_stats(State(state): State<AppState>) -> Result<Json<Vec<MonthSummary>>, ApiError> {
    let mut document = state.document.write().await;
    document.sort_months();
    document.recompute_all();
    state.persist(&document).await?;

    Ok(Json(document.months.iter().map(MonthSummary::from).collect()))
}

/// POST `/rates/reconcile` - Resolve the active month's rates, then recompute stats.
///
/// Rates are fetched on a copy of the active month with no document lock
/// held, then written back under a short write lock.
async fn reconcile_rates(State(state): State<AppState>) -> Result<Json<ReconcileResponse>, ApiError> {
    let (mut month, base) = {
        let document = state.document.read().await;
        let month = document
            .active_month()
            .cloned()
            .ok_or(LedgerError::NoActiveMonth)?;
        (month, document.base_currency.clone())
    };

    let report = state.reconciler.reconcile(&mut month, &base).await;

    let mut document = state.document.write().await;
    document.apply_reconciled(&month)?;
    document.recompute_all();
    state.persist(&document).await?;

    let month = document.month_by_name(&month.group_name)?;
    info!(
        month = %month.group_name,
        fetched = report.fetched,
        reused = report.reused,
        failures = report.failures.len(),
        "Reconciled exchange rates"
    );
    Ok(Json(ReconcileResponse {
        month: MonthSummary::from(month),
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, empty_request, state, state_with, state_with_source};
    use apunta_core::CurrencyCode;
    use apunta_core::currency::{RateError, RateSource, StaticRateSource};
    use apunta_core::ledger::Entry;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn ymd(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn app(state: AppState) -> Router {
        Router::new().merge(routes()).with_state(state)
    }

    /// Source that answers only once the gate is opened.
    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl RateSource for GatedSource {
        async fn fetch_rate(
            &self,
            _from: &CurrencyCode,
            _to: &CurrencyCode,
            _date: NaiveDate,
        ) -> Result<Decimal, RateError> {
            self.gate.notified().await;
            Ok(dec!(1.25))
        }
    }

    #[tokio::test]
    async fn test_recompute_stats() {
        let (state, _dir) = state();
        {
            let mut document = state.document.write().await;
            document.create_month(ymd(5, 1), "May").unwrap();
            document.add_entry(Entry::new(ymd(5, 2), "Food", "Alice", CurrencyCode::eur(), dec!(100)));
            document.add_entry(Entry::new(ymd(5, 3), "Food", "Bob", CurrencyCode::eur(), dec!(50)));
        }

        let response = app(state.clone())
            .oneshot(empty_request("POST", "/stats/recompute"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["stats"]["payers"]["Bob"]["debt"], "50");
        assert_eq!(body[0]["stats"]["payers"]["Alice"]["debt"], "0");

        let stored = state.store.load().await.unwrap().unwrap();
        assert_eq!(stored.months[0].stats.debt_of("Bob"), dec!(50));
    }

    #[tokio::test]
    async fn test_reconcile_without_active_month() {
        let (state, _dir) = state();

        let response = app(state)
            .oneshot(empty_request("POST", "/rates/reconcile"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "BUSINESS_RULE_VIOLATION");
    }

    #[tokio::test]
    async fn test_reconcile_active_month_and_recompute() {
        let chf = CurrencyCode::parse("CHF").unwrap();
        let usd = CurrencyCode::parse("USD").unwrap();
        let (state, _dir) =
            state_with(StaticRateSource::new().with_rate(chf.clone(), ymd(5, 4), dec!(1.1)));
        {
            let mut document = state.document.write().await;
            document.create_month(ymd(5, 1), "May").unwrap();
            document.set_active_month("May").unwrap();
            document.add_entry(Entry::new(ymd(5, 4), "Food", "Alice", chf.clone(), dec!(10)));
            document.add_entry(Entry::new(ymd(5, 4), "Food", "Bob", chf, dec!(20)));
            document.add_entry(Entry::new(ymd(5, 5), "Food", "Bob", usd, dec!(5)));
        }

        let response = app(state.clone())
            .oneshot(empty_request("POST", "/rates/reconcile"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["report"]["fetched"], 1);
        assert_eq!(body["report"]["reused"], 1);
        assert_eq!(body["report"]["failures"][0]["currency"], "USD");
        assert_eq!(body["month"]["stats"]["payers"]["Alice"]["spent"], "11.0");

        let document = state.document.read().await;
        assert_eq!(document.months[0].stats.payers["Bob"].spent, dec!(22));
        assert_eq!(document.months[0].stats.debt_of("Alice"), dec!(11));
    }

    #[tokio::test]
    async fn test_documents_stay_readable_while_rates_are_fetched() {
        let gate = Arc::new(Notify::new());
        let usd = CurrencyCode::parse("USD").unwrap();
        let (state, _dir) = state_with_source(Arc::new(GatedSource { gate: gate.clone() }));
        {
            let mut document = state.document.write().await;
            document.create_month(ymd(5, 1), "May").unwrap();
            document.set_active_month("May").unwrap();
            document.add_entry(Entry::new(ymd(5, 6), "Food", "Alice", usd.clone(), dec!(8)));
        }

        let pending = tokio::spawn(
            app(state.clone()).oneshot(empty_request("POST", "/rates/reconcile")),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Readers and writers get through while the fetch is blocked
        let read = tokio::time::timeout(Duration::from_secs(1), state.document.read()).await;
        assert!(read.is_ok());
        drop(read);
        tokio::time::timeout(Duration::from_secs(1), state.document.write())
            .await
            .unwrap()
            .add_entry(Entry::new(ymd(5, 6), "Food", "Bob", usd.clone(), dec!(4)));

        gate.notify_one();
        let response = pending.await.unwrap().unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["report"]["fetched"], 1);
        assert_eq!(body["month"]["entry_count"], 2);

        let document = state.document.read().await;
        assert!(document.months[0].entries.iter().all(|e| e.exch_rate == dec!(1.25)));
        assert_eq!(document.months[0].stats.payers["Bob"].spent, dec!(5.0));
    }
}
