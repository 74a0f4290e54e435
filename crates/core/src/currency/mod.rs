//! Multi-currency handling and exchange rates.

pub mod allocation;
pub mod exchange;
pub mod reconcile;
pub mod service;

#[cfg(test)]
mod props;

pub use allocation::AllocationUtil;
pub use exchange::{AverageRate, RateError, RateSource, StaticRateSource};
pub use reconcile::{RateFailure, RateReconciler, ReconcileReport};
pub use service::CurrencyService;
