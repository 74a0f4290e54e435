//! Exchange rate source backed by the Open Exchange Rates HTTP API.
//!
//! Historical quotes are requested per day with only the two currencies of
//! interest. The provider quotes everything against its own base (USD on the
//! free plan), so a cross rate is derived as `rates[to] / rates[from]`.

mod client;
mod payload;

pub use client::OpenExchangeRatesClient;
pub use payload::{HistoricalRates, rate_from_payload};
