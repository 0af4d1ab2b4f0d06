//! 测试基础设施
//!
//! 提供在不依赖真实存储后端的情况下测试保存 / 导入导出流程的工具集。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockStorage`] | 替代真实存储，可在指定调用次序注入写入失败 |
//! | [`RecordingObserver`] | 记录保存进度事件，按次数断言而不解析终端文本 |
//! | [`fixtures`] | 确定性的记录与配置样例 |
//!
//! # 设计原则
//!
//! - **零 I/O**：所有 Mock 都完全在内存中运行
//! - **可脚本化**：通过 `with_failure_at()` 精确控制失败位置
//! - **可观测**：通过 `call_count()` / `saved_keys()` / `events()` 检查调用情况
//!
//! # 使用示例
//!
//! ```rust
//! use whisper_admin::save::save_object_map;
//! use whisper_admin::storage::PersistContext;
//! use whisper_admin::testing::{MockStorage, RecordingObserver, fixtures};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let storage = MockStorage::new();
//! let mut observer = RecordingObserver::new();
//! let ctx = PersistContext::new(fixtures::config());
//! let objects = fixtures::object_map(12, 1, 0, 0);
//!
//! let saved = save_object_map(&storage, &ctx, &objects, &mut observer).await.unwrap();
//! assert_eq!(saved, 13);
//! assert_eq!(observer.progress_counts(), vec![10]);
//! # }
//! ```

pub mod fixtures;
pub mod mock_storage;
pub mod recording_observer;

pub use mock_storage::MockStorage;
pub use recording_observer::{ObserverEvent, RecordingObserver};
