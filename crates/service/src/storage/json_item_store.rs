use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::{errors::ModelError, Item, ItemFields};
use tokio::{fs, sync::RwLock};

use super::ItemRepository;
use crate::errors::ServiceError;

/// JSON file-backed item store.
///
/// Keeps the full record map in memory under an `RwLock` and rewrites the
/// backing file on every mutation. The file is the source of truth across
/// restarts; a corrupt or unreadable file loads as an empty map.
#[derive(Clone)]
pub struct JsonItemStore {
    inner: Arc<RwLock<HashMap<String, Item>>>,
    file_path: PathBuf,
}

impl JsonItemStore {
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<String, Item> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty: HashMap<String, Item> = HashMap::new();
                let data = serde_json::to_vec(&empty).map_err(|e| ModelError::Serde(e.to_string()))?;
                fs::write(&file_path, data)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save_file(&self) -> Result<(), ServiceError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| ModelError::Serde(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for JsonItemStore {
    async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(id).cloned())
    }

    async fn upsert(&self, id: &str, fields: ItemFields) -> Result<String, ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(id.to_string(), Item::from_fields(id, fields));
        drop(map);
        self.save_file().await?;
        Ok(id.to_string())
    }

    async fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.remove(id);
        drop(map);
        self.save_file().await?;
        Ok(())
    }
}
