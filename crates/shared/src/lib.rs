//! Shared types, errors, and configuration for Apunta.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes shared by entries, rates and configuration
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LedgerConfig, RatesConfig, ServerConfig, StorageSettings};
pub use error::{AppError, AppResult};
pub use types::{CurrencyCode, CurrencyCodeError};
