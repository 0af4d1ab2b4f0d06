//! 会话与会话状态

use super::{
    AnyRecord, Record, RecordKind, StoredRecord, check_not_empty, check_uuid, join_ids,
    optional_from_stored, optional_to_stored, split_ids, wrong_kind,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

// ── Conversation ──────────────────────────────────────────────────────────────

/// 会话（内存结构）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationData {
    pub id: String,
    pub name: String,
    /// 发起会话的用户档案
    pub owner_id: String,
}

/// 会话（存储结构）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConversation {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

impl StoredRecord for StoredConversation {
    fn storage_id(&self) -> &str {
        &self.id
    }
}

impl Record for ConversationData {
    const KIND: RecordKind = RecordKind::Conversation;
    type Stored = StoredConversation;

    fn downgrade(&self) -> Result<StoredConversation> {
        check_uuid(Self::KIND, "id", &self.id)?;
        check_uuid(Self::KIND, "ownerId", &self.owner_id)?;
        check_not_empty(Self::KIND, "name", &self.name)?;
        Ok(StoredConversation {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_id: self.owner_id.clone(),
        })
    }

    fn upgrade(stored: StoredConversation) -> Result<Self> {
        check_uuid(Self::KIND, "id", &stored.id)?;
        check_uuid(Self::KIND, "ownerId", &stored.owner_id)?;
        check_not_empty(Self::KIND, "name", &stored.name)?;
        Ok(ConversationData {
            id: stored.id,
            name: stored.name,
            owner_id: stored.owner_id,
        })
    }

    fn from_any(record: &AnyRecord) -> Result<&Self> {
        match record {
            AnyRecord::Conversation(conversation) => Ok(conversation),
            other => Err(wrong_kind(Self::KIND, other)),
        }
    }
}

// ── ConversationState ─────────────────────────────────────────────────────────

/// 进行中的会话状态（内存结构）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub conversation_id: String,
    /// 转写内容通道 ID
    pub content_id: String,
    pub participant_ids: Vec<String>,
    pub transcript: Option<String>,
    /// 开始时间（Unix 毫秒）
    pub started_ms: i64,
}

/// 会话状态（存储结构），以 `conversationId` 为键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    pub conversation_id: String,
    pub content_id: String,
    pub participants: String,
    pub transcript: String,
    pub start_time: i64,
}

impl StoredRecord for StoredState {
    fn storage_id(&self) -> &str {
        &self.conversation_id
    }
}

impl Record for ConversationState {
    const KIND: RecordKind = RecordKind::State;
    type Stored = StoredState;

    fn downgrade(&self) -> Result<StoredState> {
        check_uuid(Self::KIND, "conversationId", &self.conversation_id)?;
        check_uuid(Self::KIND, "contentId", &self.content_id)?;
        Ok(StoredState {
            conversation_id: self.conversation_id.clone(),
            content_id: self.content_id.clone(),
            participants: join_ids(Self::KIND, "participants", &self.participant_ids)?,
            transcript: optional_to_stored(Self::KIND, "transcript", &self.transcript)?,
            start_time: self.started_ms,
        })
    }

    fn upgrade(stored: StoredState) -> Result<Self> {
        check_uuid(Self::KIND, "conversationId", &stored.conversation_id)?;
        check_uuid(Self::KIND, "contentId", &stored.content_id)?;
        Ok(ConversationState {
            participant_ids: split_ids(Self::KIND, "participants", &stored.participants)?,
            conversation_id: stored.conversation_id,
            content_id: stored.content_id,
            transcript: optional_from_stored(stored.transcript),
            started_ms: stored.start_time,
        })
    }

    fn from_any(record: &AnyRecord) -> Result<&Self> {
        match record {
            AnyRecord::State(state) => Ok(state),
            other => Err(wrong_kind(Self::KIND, other)),
        }
    }
}
