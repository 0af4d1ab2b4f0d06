//! Mock 存储后端，用于在不写任何真实后端的情况下测试保存流程。
//!
//! # 示例
//!
//! ```rust
//! use whisper_admin::records::{Record, RecordKind};
//! use whisper_admin::storage::{FieldSet, PersistContext, Storage};
//! use whisper_admin::testing::{MockStorage, fixtures};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let storage = MockStorage::new().with_failure_at(1);
//! let ctx = PersistContext::new(fixtures::config());
//!
//! let stored = fixtures::profile(1).downgrade().unwrap();
//! let fields = FieldSet::from_stored(RecordKind::Profile, &stored).unwrap();
//!
//! assert!(storage.save_fields(&ctx, &fields).await.is_ok());
//! assert!(storage.save_fields(&ctx, &fields).await.is_err());
//! assert_eq!(storage.call_count(), 2);
//! # }
//! ```

use crate::error::{PersistenceError, Result};
use crate::storage::{FieldSet, PersistContext, Storage};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// 可脚本化的 Mock 存储。
///
/// 默认每次写入都成功；通过 [`with_failure_at`](MockStorage::with_failure_at)
/// 指定第几次调用（从 0 开始）返回写入错误。
pub struct MockStorage {
    failures: Arc<Mutex<HashSet<usize>>>,
    /// 每次调用时收到的 key，按顺序记录（包括失败的调用）
    calls: Arc<Mutex<Vec<String>>>,
    /// 成功写入的 key
    saved: Arc<Mutex<Vec<String>>>,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashSet::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            saved: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 第 `index` 次调用（从 0 开始）返回写入错误
    pub fn with_failure_at(self, index: usize) -> Self {
        self.failures.lock().unwrap().insert(index);
        self
    }

    /// 已发生的调用总次数
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 所有调用的 key（按时序排列）
    pub fn all_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// 成功写入的 key（按时序排列）
    pub fn saved_keys(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn save_fields(&self, ctx: &PersistContext, fields: &FieldSet) -> Result<()> {
        let key = ctx.key_for(fields);
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(key.clone());
            calls.len() - 1
        };
        if ctx.is_cancelled() {
            return Err(PersistenceError::Cancelled.into());
        }
        if self.failures.lock().unwrap().contains(&index) {
            return Err(PersistenceError::WriteFailed {
                key,
                message: "mock failure".to_string(),
            }
            .into());
        }
        self.saved.lock().unwrap().push(key);
        Ok(())
    }
}
