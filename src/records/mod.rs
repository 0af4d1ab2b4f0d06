//! 领域记录
//!
//! 四种记录各有两种表示：内存中的（旧版）结构和存储层的扁平结构，
//! 通过 [`Record::downgrade`] / [`Record::upgrade`] 互相转换。
//!
//! | 类型名 | 内存结构 | 存储结构 |
//! |--------|----------|----------|
//! | `profiles` | [`UserProfile`] | [`StoredProfile`] |
//! | `clients` | [`ClientData`] | [`StoredClient`] |
//! | `conversations` | [`ConversationData`] | [`StoredConversation`] |
//! | `states` | [`ConversationState`] | [`StoredState`] |

pub mod client;
pub mod conversation;
pub mod profile;

pub use client::{ClientData, StoredClient};
pub use conversation::{ConversationData, ConversationState, StoredConversation, StoredState};
pub use profile::{StoredProfile, UserProfile};

use crate::error::{AdminError, ConversionError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;

// ── RecordKind ────────────────────────────────────────────────────────────────

/// 已知的记录种类（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Profile,
    Client,
    Conversation,
    State,
}

impl RecordKind {
    /// 规范顺序
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Profile,
        RecordKind::Client,
        RecordKind::Conversation,
        RecordKind::State,
    ];

    /// 对象表中使用的类型名
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Profile => "profiles",
            RecordKind::Client => "clients",
            RecordKind::Conversation => "conversations",
            RecordKind::State => "states",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| AdminError::UnknownType(name.to_string()))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Record traits ─────────────────────────────────────────────────────────────

/// 存储层表示
pub trait StoredRecord: Serialize + DeserializeOwned + Send + Sync {
    /// 存储层中的唯一 ID
    fn storage_id(&self) -> &str;
}

/// 内存记录与其存储表示之间的双向转换
pub trait Record: Sized + Into<AnyRecord> {
    const KIND: RecordKind;
    type Stored: StoredRecord;

    /// 内存结构 → 存储结构
    fn downgrade(&self) -> Result<Self::Stored>;

    /// 存储结构 → 内存结构
    fn upgrade(stored: Self::Stored) -> Result<Self>;

    /// 从异构记录中取出本类型；类型不符时报转换错误
    fn from_any(record: &AnyRecord) -> Result<&Self>;
}

// ── AnyRecord ─────────────────────────────────────────────────────────────────

/// 任意一种内存记录
#[derive(Debug, Clone, PartialEq)]
pub enum AnyRecord {
    Profile(UserProfile),
    Client(ClientData),
    Conversation(ConversationData),
    State(ConversationState),
}

impl AnyRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            AnyRecord::Profile(_) => RecordKind::Profile,
            AnyRecord::Client(_) => RecordKind::Client,
            AnyRecord::Conversation(_) => RecordKind::Conversation,
            AnyRecord::State(_) => RecordKind::State,
        }
    }

    /// 按自身类型降级为 JSON 形式的存储表示
    pub fn downgrade_to_value(&self) -> Result<serde_json::Value> {
        let value = match self {
            AnyRecord::Profile(r) => serde_json::to_value(r.downgrade()?)?,
            AnyRecord::Client(r) => serde_json::to_value(r.downgrade()?)?,
            AnyRecord::Conversation(r) => serde_json::to_value(r.downgrade()?)?,
            AnyRecord::State(r) => serde_json::to_value(r.downgrade()?)?,
        };
        Ok(value)
    }
}

macro_rules! impl_any_record {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for AnyRecord {
            fn from(record: $ty) -> Self {
                AnyRecord::$variant(record)
            }
        }
    };
}

impl_any_record!(UserProfile, Profile);
impl_any_record!(ClientData, Client);
impl_any_record!(ConversationData, Conversation);
impl_any_record!(ConversationState, State);

pub(crate) fn wrong_kind(expected: RecordKind, found: &AnyRecord) -> AdminError {
    ConversionError::WrongKind {
        expected: expected.name().to_string(),
        found: found.kind().name().to_string(),
    }
    .into()
}

// ── ObjectMap ─────────────────────────────────────────────────────────────────

/// 类型名 → 内存记录列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMap {
    entries: BTreeMap<String, Vec<AnyRecord>>,
}

/// 类型名 → 存储表示（JSON）列表
pub type StoredObjectMap = BTreeMap<String, Vec<serde_json::Value>>;

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录到其自身类型名下
    pub fn push(&mut self, record: impl Into<AnyRecord>) {
        let record = record.into();
        self.entries
            .entry(record.kind().name().to_string())
            .or_default()
            .push(record);
    }

    /// 以任意类型名设置整组记录（可以是未知类型名）
    pub fn insert(&mut self, name: impl Into<String>, records: Vec<AnyRecord>) {
        self.entries.insert(name.into(), records);
    }

    pub fn get(&self, name: &str) -> Option<&[AnyRecord]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AnyRecord])> {
        self.entries
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 所有类型名下的记录总数
    pub fn total_records(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }

    /// 每条记录按自身类型降级，得到可持久化的存储表
    pub fn to_stored(&self) -> Result<StoredObjectMap> {
        let mut stored = StoredObjectMap::new();
        for (name, records) in &self.entries {
            let values = records
                .iter()
                .map(AnyRecord::downgrade_to_value)
                .collect::<Result<Vec<_>>>()?;
            stored.insert(name.clone(), values);
        }
        Ok(stored)
    }

    /// 从存储表重建对象表；结果恰好包含四个已知类型名
    pub fn from_stored(stored: &StoredObjectMap) -> Result<Self> {
        for name in stored.keys() {
            if RecordKind::from_name(name).is_err() {
                tracing::debug!(name = %name, "忽略未知类型名");
            }
        }
        let mut map = ObjectMap::new();
        for kind in RecordKind::ALL {
            let values = stored.get(kind.name()).map(Vec::as_slice).unwrap_or_default();
            let records = match kind {
                RecordKind::Profile => upgrade_values::<UserProfile>(values)?,
                RecordKind::Client => upgrade_values::<ClientData>(values)?,
                RecordKind::Conversation => upgrade_values::<ConversationData>(values)?,
                RecordKind::State => upgrade_values::<ConversationState>(values)?,
            };
            map.insert(kind.name(), records);
        }
        Ok(map)
    }
}

fn upgrade_values<T: Record>(values: &[serde_json::Value]) -> Result<Vec<AnyRecord>> {
    values
        .iter()
        .map(|value| -> Result<AnyRecord> {
            let stored: T::Stored =
                serde_json::from_value(value.clone()).map_err(|e| ConversionError::BadShape {
                    kind: T::KIND.name().to_string(),
                    message: e.to_string(),
                })?;
            Ok(T::upgrade(stored)?.into())
        })
        .collect()
}

// ── 字段校验工具 ──────────────────────────────────────────────────────────────

/// 存储结构中列表字段的分隔符
pub(crate) const LIST_SEPARATOR: &str = ",";

pub(crate) fn check_uuid(kind: RecordKind, field: &str, value: &str) -> Result<()> {
    uuid::Uuid::parse_str(value).map_err(|e| ConversionError::InvalidField {
        kind: kind.name().to_string(),
        field: field.to_string(),
        message: format!("'{}' is not a UUID: {}", value, e),
    })?;
    Ok(())
}

pub(crate) fn check_not_empty(kind: RecordKind, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConversionError::InvalidField {
            kind: kind.name().to_string(),
            field: field.to_string(),
            message: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

/// 列表 → 逗号分隔字符串
pub(crate) fn join_ids(kind: RecordKind, field: &str, ids: &[String]) -> Result<String> {
    for id in ids {
        check_uuid(kind, field, id)?;
    }
    Ok(ids.join(LIST_SEPARATOR))
}

/// 逗号分隔字符串 → 列表（空串为空列表）
pub(crate) fn split_ids(kind: RecordKind, field: &str, joined: &str) -> Result<Vec<String>> {
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    joined
        .split(LIST_SEPARATOR)
        .map(|id| -> Result<String> {
            check_uuid(kind, field, id)?;
            Ok(id.to_string())
        })
        .collect()
}

/// `None` 存为空串，因此 `Some("")` 不是合法取值
pub(crate) fn optional_to_stored(
    kind: RecordKind,
    field: &str,
    value: &Option<String>,
) -> Result<String> {
    match value {
        Some(v) if v.is_empty() => Err(ConversionError::InvalidField {
            kind: kind.name().to_string(),
            field: field.to_string(),
            message: "empty string is reserved for a missing value".to_string(),
        }
        .into()),
        Some(v) => Ok(v.clone()),
        None => Ok(String::new()),
    }
}

pub(crate) fn optional_from_stored(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_kind_names() {
        let names: Vec<&str> = RecordKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["profiles", "clients", "conversations", "states"]);
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_recoverable() {
        let err = RecordKind::from_name("bogus").unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, AdminError::UnknownType(ref name) if name == "bogus"));
    }

    #[test]
    fn test_push_groups_by_kind() {
        let mut map = ObjectMap::new();
        map.push(fixtures::profile(1));
        map.push(fixtures::client(1));
        map.push(fixtures::profile(2));
        assert_eq!(map.get("profiles").map(|r| r.len()), Some(2));
        assert_eq!(map.get("clients").map(|r| r.len()), Some(1));
        assert_eq!(map.total_records(), 3);
    }

    #[test]
    fn test_stored_round_trip() {
        let map = fixtures::object_map(3, 2, 2, 1);
        let stored = map.to_stored().unwrap();
        let restored = ObjectMap::from_stored(&stored).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_from_stored_has_exactly_four_keys() {
        let mut stored = StoredObjectMap::new();
        stored.insert("bogus".to_string(), vec![serde_json::json!({"x": 1})]);
        let map = ObjectMap::from_stored(&stored).unwrap();
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["clients", "conversations", "profiles", "states"]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_from_stored_bad_shape_is_fatal() {
        let mut stored = fixtures::object_map(1, 1, 0, 0).to_stored().unwrap();
        stored.insert(
            "conversations".to_string(),
            vec![serde_json::json!({"unexpected": true})],
        );
        let err = ObjectMap::from_stored(&stored).unwrap_err();
        assert!(matches!(
            err,
            AdminError::Conversion(ConversionError::BadShape { ref kind, .. }) if kind == "conversations"
        ));
    }

    #[test]
    fn test_split_ids_rejects_garbage() {
        assert!(split_ids(RecordKind::Profile, "ids", "not-a-uuid").is_err());
        assert_eq!(split_ids(RecordKind::Profile, "ids", "").unwrap().len(), 0);
    }
}
