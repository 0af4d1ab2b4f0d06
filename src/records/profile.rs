use super::{
    AnyRecord, Record, RecordKind, StoredRecord, check_not_empty, check_uuid, join_ids,
    optional_from_stored, optional_to_stored, split_ids, wrong_kind,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 用户档案（内存结构）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    /// 密码哈希，空串表示未设置密码
    pub password_hash: String,
    /// 作为发言方的会话
    pub whisper_conversation_id: Option<String>,
    /// 作为收听方加入过的会话
    pub listen_conversation_ids: Vec<String>,
}

/// 用户档案（存储结构）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub id: String,
    pub name: String,
    pub password: String,
    pub whisper_conversation_id: String,
    pub listen_conversation_ids: String,
}

impl StoredRecord for StoredProfile {
    fn storage_id(&self) -> &str {
        &self.id
    }
}

impl Record for UserProfile {
    const KIND: RecordKind = RecordKind::Profile;
    type Stored = StoredProfile;

    fn downgrade(&self) -> Result<StoredProfile> {
        check_uuid(Self::KIND, "id", &self.id)?;
        check_not_empty(Self::KIND, "name", &self.name)?;
        if let Some(id) = &self.whisper_conversation_id {
            check_uuid(Self::KIND, "whisperConversationId", id)?;
        }
        Ok(StoredProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            password: self.password_hash.clone(),
            whisper_conversation_id: optional_to_stored(
                Self::KIND,
                "whisperConversationId",
                &self.whisper_conversation_id,
            )?,
            listen_conversation_ids: join_ids(
                Self::KIND,
                "listenConversationIds",
                &self.listen_conversation_ids,
            )?,
        })
    }

    fn upgrade(stored: StoredProfile) -> Result<Self> {
        check_uuid(Self::KIND, "id", &stored.id)?;
        check_not_empty(Self::KIND, "name", &stored.name)?;
        let whisper_conversation_id = optional_from_stored(stored.whisper_conversation_id);
        if let Some(id) = &whisper_conversation_id {
            check_uuid(Self::KIND, "whisperConversationId", id)?;
        }
        Ok(UserProfile {
            listen_conversation_ids: split_ids(
                Self::KIND,
                "listenConversationIds",
                &stored.listen_conversation_ids,
            )?,
            id: stored.id,
            name: stored.name,
            password_hash: stored.password,
            whisper_conversation_id,
        })
    }

    fn from_any(record: &AnyRecord) -> Result<&Self> {
        match record {
            AnyRecord::Profile(profile) => Ok(profile),
            other => Err(wrong_kind(Self::KIND, other)),
        }
    }
}
