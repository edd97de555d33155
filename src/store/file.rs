//! File-backed template store
//!
//! Layout: `<root>/<owner>/<key>.json`, one JSON document per template, where
//! `<owner>` is the percent-encoded user id. A write goes
//! to a temporary sibling first and is renamed into place, so readers never see a
//! half-written document.

use super::{StoreError, TemplateStore};
use crate::templates::{TemplateDocument, TemplateKey};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    root: PathBuf,
}

impl FileTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, uid: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(owner_segment(uid)?))
    }

    fn document_path(&self, uid: &str, key: TemplateKey) -> Result<PathBuf, StoreError> {
        Ok(self
            .collection_dir(uid)?
            .join(format!("{}.json", key.as_str())))
    }
}

/// Longest directory name most filesystems accept
const MAX_SEGMENT_BYTES: usize = 255;

/// Directory name for a user id
///
/// Percent-encoding leaves only `[A-Za-z0-9-_.~]` and `%`, so separators cannot
/// appear. `.` and `..` survive encoding and are refused.
pub fn owner_segment(uid: &str) -> Result<String, StoreError> {
    let segment = urlencoding::encode(uid);
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.len() > MAX_SEGMENT_BYTES
    {
        return Err(StoreError::InvalidOwner(uid.to_string()));
    }
    Ok(segment.into_owned())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn put(
        &self,
        uid: &str,
        key: TemplateKey,
        document: TemplateDocument,
    ) -> Result<(), StoreError> {
        let dir = self.collection_dir(uid)?;
        let path = self.document_path(uid, key)?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(io_error(&dir))?;

        let bytes = serde_json::to_vec_pretty(&document).map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;

        let tmp = dir.join(format!(".{}.json.tmp-{}", key.as_str(), uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, &bytes).await.map_err(io_error(&tmp))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path)(e));
        }

        Ok(())
    }

    async fn get(
        &self,
        uid: &str,
        key: TemplateKey,
    ) -> Result<Option<TemplateDocument>, StoreError> {
        let path = self.document_path(uid, key)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })
    }
}
