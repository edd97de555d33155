//! Process-local template store

use super::{StoreError, TemplateStore};
use crate::templates::{TemplateDocument, TemplateKey};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    documents: RwLock<HashMap<(String, TemplateKey), TemplateDocument>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all users
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn put(
        &self,
        uid: &str,
        key: TemplateKey,
        document: TemplateDocument,
    ) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .insert((uid.to_string(), key), document);
        Ok(())
    }

    async fn get(
        &self,
        uid: &str,
        key: TemplateKey,
    ) -> Result<Option<TemplateDocument>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .get(&(uid.to_string(), key))
            .cloned())
    }
}
