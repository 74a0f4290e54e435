//! Document persistence using Apache OpenDAL.
//!
//! The whole document is stored as one pretty-printed JSON file. Only the
//! local filesystem service is wired; the operator keeps other backends a
//! builder away.

mod error;
mod store;

pub use error::StoreError;
pub use store::DocumentStore;
