//! 基于 JSON 文件的存储后端
//!
//! 每条记录写成 `<root>/<key>.json`，key 中的 `:` 与 `/` 替换为 `_`：
//! ```text
//! /var/lib/whisper/staging/
//!   s_profiles_0b6c...json
//!   s_clients_9f1e...json
//! ```

use super::{FieldSet, PersistContext, Storage};
use crate::error::{AdminError, ConfigError, PersistenceError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// 打开存储目录，不存在时自动创建
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| PersistenceError::WriteFailed {
            key: root.display().to_string(),
            message: format!("创建目录失败: {e}"),
        })?;
        info!(root = %root.display(), "🗂️ FileStorage 初始化");
        Ok(Self { root })
    }

    /// 从 `file:///path` 形式的地址打开
    pub fn from_url(url: &str) -> Result<Self> {
        let path = url
            .strip_prefix("file://")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "DB_URL".to_string(),
                message: format!("'{}' is not a file:// url with a path", url),
            })?;
        Self::new(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// key 对应的文件路径
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c == ':' || c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn save_fields(&self, ctx: &PersistContext, fields: &FieldSet) -> Result<()> {
        let key = ctx.key_for(fields);
        let path = self.path_for(&key);
        let json = serde_json::to_vec_pretty(&fields.fields).map_err(|e| {
            PersistenceError::Encoding {
                key: key.clone(),
                message: e.to_string(),
            }
        })?;
        tokio::select! {
            biased;
            _ = ctx.cancel_token().cancelled() => Err(AdminError::from(PersistenceError::Cancelled)),
            written = tokio::fs::write(&path, json) => {
                written.map_err(|e| PersistenceError::WriteFailed {
                    key: key.clone(),
                    message: format!("写入 {} 失败: {e}", path.display()),
                })?;
                debug!(key = %key, path = %path.display(), "💾 记录已持久化");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Record, RecordKind};
    use crate::testing::fixtures;

    fn client_fields() -> FieldSet {
        let stored = fixtures::client(1).downgrade().unwrap();
        FieldSet::from_stored(RecordKind::Client, &stored).unwrap()
    }

    #[tokio::test]
    async fn test_writes_one_file_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        let ctx = PersistContext::new(fixtures::config());
        let fields = client_fields();

        storage.save_fields(&ctx, &fields).await.unwrap();

        let path = storage.path_for(&ctx.key_for(&fields));
        assert!(path.starts_with(storage.root()));
        let raw = std::fs::read_to_string(&path).unwrap();
        let saved: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&raw).unwrap();
        assert_eq!(saved, fields.fields);
    }

    #[test]
    fn test_path_has_no_separators() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let path = storage.path_for("t:profiles:abc");
        assert_eq!(path.file_name().unwrap(), "t_profiles_abc.json");
    }

    #[test]
    fn test_from_url() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}", dir.path().display());
        assert_eq!(FileStorage::from_url(&url).unwrap().root(), dir.path());
        assert!(FileStorage::from_url("file://").is_err());
        assert!(FileStorage::from_url("memory://x").is_err());
    }

    #[tokio::test]
    async fn test_cancelled_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let ctx = PersistContext::new(fixtures::config());
        ctx.cancel_token().cancel();

        let err = storage
            .save_fields(&ctx, &client_fields())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdminError::Persistence(PersistenceError::Cancelled)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
