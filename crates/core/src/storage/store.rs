//! JSON document store backed by an OpenDAL operator.

use std::path::Path;

use opendal::{ErrorKind, Operator, services};
use tracing::{debug, info};

use apunta_shared::CurrencyCode;

use super::error::StoreError;
use crate::ledger::Document;

/// Loads and saves a [`Document`] at a fixed path.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    operator: Operator,
    path: String,
}

impl DocumentStore {
    /// Wraps an existing operator.
    #[must_use]
    pub fn new(operator: Operator, path: impl Into<String>) -> Self {
        Self {
            operator,
            path: path.into(),
        }
    }

    /// Store for `root/document` on the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a usable UTF-8 path.
    pub fn local_fs(root: impl AsRef<Path>, document: &str) -> Result<Self, StoreError> {
        let root = std::path::absolute(root.as_ref())
            .map_err(|e| StoreError::configuration(e.to_string()))?;
        let root = root
            .to_str()
            .ok_or_else(|| StoreError::configuration("invalid path"))?;

        let builder = services::Fs::default().root(root);
        let operator = Operator::new(builder)
            .map_err(|e| StoreError::configuration(e.to_string()))?
            .finish();

        Ok(Self::new(operator, document))
    }

    /// Path of the document inside the operator root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the document, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Document>, StoreError> {
        let buffer = match self.operator.read(&self.path).await {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document: Document = serde_json::from_slice(&buffer.to_vec())?;
        debug!(path = %self.path, months = document.months.len(), "Loaded document");
        Ok(Some(document))
    }

    /// Reads the document, or starts an empty one in `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub async fn load_or_new(&self, base: CurrencyCode) -> Result<Document, StoreError> {
        match self.load().await? {
            Some(document) => Ok(document),
            None => {
                info!(path = %self.path, base = %base, "No stored document, starting empty");
                Ok(Document::new(base))
            }
        }
    }

    /// Writes the whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        self.operator.write(&self.path, bytes).await?;
        debug!(path = %self.path, "Saved document");
        Ok(())
    }

    /// Check if a document has been saved.
    pub async fn exists(&self) -> bool {
        self.operator.stat(&self.path).await.is_ok()
    }
}
