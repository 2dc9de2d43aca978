use std::{io, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::fs;

use super::ImageStore;
use crate::errors::ServiceError;

/// Flat-directory binary store for item attachments.
///
/// Files live directly under the root directory as `<item_id>_<filename>`;
/// there is no per-item nesting. Writing the same pair twice overwrites the
/// previous content silently.
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    /// Open the store rooted at `dir`, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Arc::new(Self { dir }))
    }

    fn path_for(&self, item_id: &str, filename: &str) -> PathBuf {
        self.dir.join(format!("{item_id}_{filename}"))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, item_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf, ServiceError> {
        let path = self.path_for(item_id, filename);
        fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(path)
    }

    async fn get(&self, item_id: &str, filename: &str) -> Result<Option<Vec<u8>>, ServiceError> {
        match fs::read(self.path_for(item_id, filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }

    async fn delete(&self, item_id: &str, filename: &str) -> Result<(), ServiceError> {
        match fs::remove_file(self.path_for(item_id, filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }
}
