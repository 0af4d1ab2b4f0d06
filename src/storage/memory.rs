use super::{FieldSet, PersistContext, Storage};
use crate::error::{PersistenceError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// 进程内存存储，重启即清空
pub struct InMemoryStorage {
    /// key → 字段
    data: RwLock<BTreeMap<String, Map<String, Value>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Map<String, Value>> {
        self.data.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.data.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_fields(&self, ctx: &PersistContext, fields: &FieldSet) -> Result<()> {
        if ctx.is_cancelled() {
            return Err(PersistenceError::Cancelled.into());
        }
        let key = ctx.key_for(fields);
        debug!(key = %key, "💾 写入内存存储");
        self.data.write().await.insert(key, fields.fields.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;
    use crate::records::{Record, RecordKind};
    use crate::testing::fixtures;

    fn profile_fields(n: u32) -> FieldSet {
        let stored = fixtures::profile(n).downgrade().unwrap();
        FieldSet::from_stored(RecordKind::Profile, &stored).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let storage = InMemoryStorage::new();
        let ctx = PersistContext::new(fixtures::config());
        let fields = profile_fields(1);

        storage.save_fields(&ctx, &fields).await.unwrap();
        assert_eq!(storage.len().await, 1);
        let saved = storage.get(&ctx.key_for(&fields)).await.unwrap();
        assert_eq!(saved, fields.fields);
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let storage = InMemoryStorage::new();
        let ctx = PersistContext::new(fixtures::config());
        storage.save_fields(&ctx, &profile_fields(1)).await.unwrap();
        storage.save_fields(&ctx, &profile_fields(1)).await.unwrap();
        assert_eq!(storage.keys().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let storage = InMemoryStorage::new();
        let ctx = PersistContext::new(fixtures::config());
        ctx.cancel_token().cancel();

        let err = storage.save_fields(&ctx, &profile_fields(1)).await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Persistence(PersistenceError::Cancelled)
        ));
        assert!(storage.is_empty().await);
    }
}
