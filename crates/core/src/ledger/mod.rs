//! Entries, month records and the document that orders them.
//!
//! Entries are placed in the month covering their date and never deleted.
//! The document owns every month and drives rate reconciliation and stats
//! recomputation across them in date order.

pub mod document;
pub mod entry;
pub mod error;
pub mod month;

pub use document::{Document, EntryPlacement};
pub use entry::{Entry, EntryInput, MAX_AMOUNT, SHARED_PAYERS, is_shared_payer};
pub use error::LedgerError;
pub use month::MonthRecord;
