//! 存储能力
//!
//! 核心流程只依赖 [`Storage::save_fields`]：把一条记录的存储字段写入后端。
//! 具体后端由配置中的 `DB_URL` scheme 决定：
//!
//! | scheme | 实现 | 说明 |
//! |--------|------|------|
//! | `memory://` | [`InMemoryStorage`] | 进程内存，适合测试与演练 |
//! | `file://` | [`FileStorage`] | 每条记录一个 JSON 文件 |

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::config::Config;
use crate::error::{ConfigError, PersistenceError, Result};
use crate::records::{RecordKind, StoredRecord};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

// ── FieldSet ──────────────────────────────────────────────────────────────────

/// 一条记录展开后的存储字段
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    pub kind: RecordKind,
    pub id: String,
    pub fields: Map<String, Value>,
}

impl FieldSet {
    pub fn from_stored<S: StoredRecord>(kind: RecordKind, stored: &S) -> Result<Self> {
        let id = stored.storage_id().to_string();
        let encoding_error = |message: String| PersistenceError::Encoding {
            key: format!("{}:{}", kind.name(), id),
            message,
        };
        let fields = match serde_json::to_value(stored) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                return Err(encoding_error(format!("expected an object, got {}", other)).into());
            }
            Err(e) => return Err(encoding_error(e.to_string()).into()),
        };
        Ok(Self { kind, id, fields })
    }

    /// 带前缀的存储 key，例如 `s:profiles:<uuid>`
    pub fn key(&self, prefix: &str) -> String {
        format!("{}{}:{}", prefix, self.kind.name(), self.id)
    }
}

// ── PersistContext ────────────────────────────────────────────────────────────

/// 单次保存的执行上下文：当前配置 + 可取消令牌
#[derive(Debug, Clone)]
pub struct PersistContext {
    config: Config,
    cancel: CancellationToken,
}

impl PersistContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 记录 key（使用当前配置的前缀）
    pub fn key_for(&self, fields: &FieldSet) -> String {
        fields.key(&self.config.key_prefix)
    }
}

// ── Storage trait ─────────────────────────────────────────────────────────────

/// 存储后端接口
#[async_trait]
pub trait Storage: Send + Sync {
    /// 持久化一条记录的字段；后端应响应 `ctx` 中的取消信号
    async fn save_fields(&self, ctx: &PersistContext, fields: &FieldSet) -> Result<()>;
}

/// 按 `DB_URL` 打开存储后端
pub fn open_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.db_scheme() {
        "memory" => Arc::new(InMemoryStorage::new()),
        "file" => Arc::new(FileStorage::from_url(&config.db_url)?),
        other => {
            return Err(ConfigError::InvalidValue {
                field: "DB_URL".to_string(),
                message: format!("unsupported storage scheme '{}'", other),
            }
            .into());
        }
    };
    info!(environment = %config.environment, url = %config.db_url, "🗄️ 存储后端已打开");
    Ok(storage)
}
