//! 对象表保存流程
//!
//! [`save_object_map`] 按类型名把每组记录分派给 [`save_typed_objects`]，
//! 后者逐条 Downgrade 后交给 [`Storage`] 持久化。
//!
//! 两级错误策略不对称：
//! - 单条记录转换或写入失败是致命的，立即中止整个保存；
//! - 未知类型名只报告并跳过，其余类型照常保存。

pub mod progress;

pub use progress::{ConsoleReporter, NullObserver, PROGRESS_INTERVAL, SaveObserver, pluralize};

use crate::error::Result;
use crate::records::{
    AnyRecord, ClientData, ConversationData, ConversationState, ObjectMap, Record, RecordKind,
    UserProfile,
};
use crate::storage::{FieldSet, PersistContext, Storage};
use tracing::{debug, info, warn};

/// 保存同一类型的一组记录，返回成功保存的条数
///
/// 任何一条失败都会立即返回错误，已写入的记录不会回滚。
pub async fn save_typed_objects<T: Record>(
    storage: &dyn Storage,
    ctx: &PersistContext,
    name: &str,
    records: &[AnyRecord],
    observer: &mut dyn SaveObserver,
) -> Result<usize> {
    let report_progress = records.len() >= PROGRESS_INTERVAL;
    if report_progress {
        observer.batch_started(name, records.len());
    }
    debug!(name = %name, kind = %T::KIND, total = records.len(), "开始保存");

    let mut saved = 0;
    for record in records {
        let typed = T::from_any(record)?;
        let stored = typed.downgrade()?;
        let fields = FieldSet::from_stored(T::KIND, &stored)?;
        storage.save_fields(ctx, &fields).await.inspect_err(|e| {
            warn!(name = %name, id = %fields.id, saved, error = %e, "💥 保存中止");
        })?;
        saved += 1;
        if saved % PROGRESS_INTERVAL == 0 {
            observer.batch_progress(name, saved);
        }
    }

    observer.batch_finished(name, saved, report_progress);
    info!(name = %name, saved, "✅ 类型保存完成");
    Ok(saved)
}

/// 保存整个对象表，返回各已知类型保存条数之和
pub async fn save_object_map(
    storage: &dyn Storage,
    ctx: &PersistContext,
    objects: &ObjectMap,
    observer: &mut dyn SaveObserver,
) -> Result<usize> {
    let mut saved = 0;
    for (name, records) in objects.iter() {
        if records.is_empty() {
            continue;
        }
        let kind = match RecordKind::from_name(name) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(name = %name, skipped = records.len(), error = %e, "⏭️ 跳过未知类型");
                observer.unknown_type(name, records.len());
                continue;
            }
        };
        saved += match kind {
            RecordKind::Profile => {
                save_typed_objects::<UserProfile>(storage, ctx, name, records, observer).await?
            }
            RecordKind::Client => {
                save_typed_objects::<ClientData>(storage, ctx, name, records, observer).await?
            }
            RecordKind::Conversation => {
                save_typed_objects::<ConversationData>(storage, ctx, name, records, observer)
                    .await?
            }
            RecordKind::State => {
                save_typed_objects::<ConversationState>(storage, ctx, name, records, observer)
                    .await?
            }
        };
    }
    observer.summary(saved);
    Ok(saved)
}
