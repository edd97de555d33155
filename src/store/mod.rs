//! Per-user template document store
//!
//! Each user owns one collection keyed by [`TemplateKey`]. Writes are upserts that
//! replace the whole document; there is no merge.

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{AppError, AppResult};
use crate::templates::{TemplateDocument, TemplateKey};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileTemplateStore;
pub use memory::MemoryTemplateStore;

/// Store failure
///
/// `Display` is safe to show the caller: it never includes server paths. The
/// `path` fields are for logs and appear only in `Debug` output.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("user id '{0}' cannot be stored")]
    InvalidOwner(String),

    #[error("template storage I/O error: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored template document is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Backend location involved in the failure, when there is one
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InvalidOwner(_) => None,
            Self::Io { path, .. } | Self::Corrupt { path, .. } => Some(path),
        }
    }
}

/// Storage for per-user template documents
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Create or fully replace one document
    async fn put(
        &self,
        uid: &str,
        key: TemplateKey,
        document: TemplateDocument,
    ) -> Result<(), StoreError>;

    /// Read one document
    async fn get(&self, uid: &str, key: TemplateKey)
    -> Result<Option<TemplateDocument>, StoreError>;
}

/// Build the store selected in configuration
pub fn from_config(config: &StoreConfig) -> AppResult<Arc<dyn TemplateStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryTemplateStore::new())),
        StoreBackend::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                AppError::Config("store.path is required for the file backend".to_string())
            })?;
            Ok(Arc::new(FileTemplateStore::new(path)))
        }
    }
}
