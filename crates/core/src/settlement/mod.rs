//! Debt settlement between payers.
//!
//! A month's stats start from the debt carried in (the document's prior-period
//! debt for the first month, the previous month's debts otherwise), add every
//! entry converted to the base currency, split shared spending evenly, and
//! measure each payer against the top contributor.

pub mod calculator;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::SettlementCalculator;
pub use types::{Carry, MonthStats, PayerStat};
