use std::path::PathBuf;

use async_trait::async_trait;
use models::{Item, ItemFields};

use crate::errors::ServiceError;

pub mod fs_image_store;
pub mod json_item_store;

/// Trait abstraction for item record persistence.
/// Implementations can be file-backed, database-backed, or remote KV.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All records, in no particular order.
    async fn find_all(&self) -> Result<Vec<Item>, ServiceError>;
    /// `None` when no record matches; absence is not an error.
    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, ServiceError>;
    /// Create-or-replace keyed by id. The stored record is fully replaced
    /// by `fields`; returns the effective id.
    async fn upsert(&self, id: &str, fields: ItemFields) -> Result<String, ServiceError>;
    /// Delete by id. Removing a missing id succeeds.
    async fn remove(&self, id: &str) -> Result<(), ServiceError>;
}

/// Trait abstraction for binary attachment persistence, keyed by
/// `(item_id, filename)`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write content for the pair, overwriting silently. Returns the stored path.
    async fn put(&self, item_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf, ServiceError>;
    /// `None` when nothing is stored for the pair.
    async fn get(&self, item_id: &str, filename: &str) -> Result<Option<Vec<u8>>, ServiceError>;
    /// Remove the content if present; a missing pair is not an error.
    async fn delete(&self, item_id: &str, filename: &str) -> Result<(), ServiceError>;
}

/// Simple in-memory mocks for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockItemRepository {
        items: Mutex<HashMap<String, Item>>,
    }

    #[async_trait]
    impl ItemRepository for MockItemRepository {
        async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
            let items = self.items.lock().unwrap();
            Ok(items.values().cloned().collect())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Item>, ServiceError> {
            let items = self.items.lock().unwrap();
            Ok(items.get(id).cloned())
        }

        async fn upsert(&self, id: &str, fields: ItemFields) -> Result<String, ServiceError> {
            let mut items = self.items.lock().unwrap();
            items.insert(id.to_string(), Item::from_fields(id, fields));
            Ok(id.to_string())
        }

        async fn remove(&self, id: &str) -> Result<(), ServiceError> {
            let mut items = self.items.lock().unwrap();
            items.remove(id);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockImageStore {
        files: Mutex<HashMap<(String, String), Vec<u8>>>,
        fail_deletes: bool,
    }

    impl MockImageStore {
        /// A store whose `delete` always fails, for exercising best-effort
        /// deletion paths.
        pub fn failing_deletes() -> Self {
            Self { files: Mutex::new(HashMap::new()), fail_deletes: true }
        }

        pub fn contains(&self, item_id: &str, filename: &str) -> bool {
            let files = self.files.lock().unwrap();
            files.contains_key(&(item_id.to_string(), filename.to_string()))
        }
    }

    #[async_trait]
    impl ImageStore for MockImageStore {
        async fn put(&self, item_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf, ServiceError> {
            let mut files = self.files.lock().unwrap();
            files.insert((item_id.to_string(), filename.to_string()), bytes.to_vec());
            Ok(PathBuf::from(format!("{item_id}_{filename}")))
        }

        async fn get(&self, item_id: &str, filename: &str) -> Result<Option<Vec<u8>>, ServiceError> {
            let files = self.files.lock().unwrap();
            Ok(files.get(&(item_id.to_string(), filename.to_string())).cloned())
        }

        async fn delete(&self, item_id: &str, filename: &str) -> Result<(), ServiceError> {
            if self.fail_deletes {
                return Err(ServiceError::Storage("delete refused".into()));
            }
            let mut files = self.files.lock().unwrap();
            files.remove(&(item_id.to_string(), filename.to_string()));
            Ok(())
        }
    }
}
