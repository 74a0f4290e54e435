//! HTTP client for historical Open Exchange Rates quotes.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use apunta_core::CurrencyCode;
use apunta_core::currency::{RateError, RateSource};
use apunta_shared::RatesConfig;

use crate::payload::{HistoricalRates, rate_from_payload};

/// Rate source calling `GET {base_url}/historical/{date}.json`.
#[derive(Debug, Clone)]
pub struct OpenExchangeRatesClient {
    http: reqwest::Client,
    base_url: String,
    app_id: Option<String>,
}

impl OpenExchangeRatesClient {
    /// Creates a client. Without an app id every fetch fails with
    /// [`RateError::MissingAppId`].
    #[must_use]
    pub fn new(base_url: impl Into<String>, app_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id,
        }
    }

    /// Creates a client from the `rates` configuration section.
    #[must_use]
    pub fn from_config(config: &RatesConfig) -> Self {
        Self::new(config.base_url.clone(), config.resolved_app_id())
    }

    /// True if an app id is available.
    #[must_use]
    pub fn has_app_id(&self) -> bool {
        self.app_id.is_some()
    }

    fn historical_url(&self, date: NaiveDate) -> String {
        format!("{}/historical/{}.json", self.base_url, date.format("%Y-%m-%d"))
    }

    async fn historical(
        &self,
        date: NaiveDate,
        symbols: &str,
    ) -> Result<HistoricalRates, RateError> {
        let app_id = self.app_id.as_deref().ok_or(RateError::MissingAppId)?;

        let response = self
            .http
            .get(self.historical_url(date))
            .query(&[("app_id", app_id), ("symbols", symbols)])
            .send()
            .await
            .map_err(|e| RateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<HistoricalRates>()
            .await
            .map_err(|e| RateError::Request(e.to_string()))
    }
}

#[async_trait]
impl RateSource for OpenExchangeRatesClient {
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let symbols = format!("{from},{to}");
        let payload = self.historical(date, &symbols).await?;
        let rate = rate_from_payload(&payload, from, to)?;
        debug!(from = %from, to = %to, date = %date, rate = %rate, "Fetched exchange rate");
        Ok(rate)
    }
}
