//! Core business logic for Apunta.
//!
//! This crate contains the shared-expense engine with ZERO web dependencies.
//! All domain types, rate reconciliation and settlement math live here.
//!
//! # Modules
//!
//! - `currency` - Conversion, allocation, rate sources and rate reconciliation
//! - `ledger` - Entries, month records and the document that orders them
//! - `settlement` - Per-payer spent, accumulated and debt calculation
//! - `storage` - JSON document persistence

pub mod currency;
pub mod ledger;
pub mod settlement;
pub mod storage;

pub use apunta_shared::CurrencyCode;
