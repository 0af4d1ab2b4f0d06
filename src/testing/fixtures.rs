//! 确定性的测试数据
//!
//! 同一个 `n` 总是生成相同的记录，不同种类的 ID 互不重叠。

use crate::config::Config;
use crate::records::{
    AnyRecord, ClientData, ConversationData, ConversationState, ObjectMap, RecordKind,
    UserProfile,
};

fn id(space: u64, n: u32) -> String {
    format!("00000000-0000-4000-8000-{:012x}", (space << 32) | u64::from(n))
}

fn profile_id(n: u32) -> String {
    id(1, n)
}

fn conversation_id(n: u32) -> String {
    id(3, n)
}

pub fn config() -> Config {
    Config {
        environment: "test".to_string(),
        db_url: "memory://test".to_string(),
        key_prefix: "t:".to_string(),
        db_username: None,
        db_password: None,
    }
}

pub fn profile(n: u32) -> UserProfile {
    UserProfile {
        id: profile_id(n),
        name: format!("user {n}"),
        password_hash: format!("hash-{n}"),
        whisper_conversation_id: Some(conversation_id(n)),
        listen_conversation_ids: vec![conversation_id(n + 1), conversation_id(n + 2)],
    }
}

pub fn client(n: u32) -> ClientData {
    ClientData {
        id: id(2, n),
        profile_id: profile_id(n),
        user_agent: Some(format!("whisper-ios/{n}")),
        last_launch_ms: 1_700_000_000_000 + i64::from(n),
    }
}

pub fn conversation(n: u32) -> ConversationData {
    ConversationData {
        id: conversation_id(n),
        name: format!("conversation {n}"),
        owner_id: profile_id(n),
    }
}

pub fn state(n: u32) -> ConversationState {
    ConversationState {
        conversation_id: conversation_id(n),
        content_id: id(4, n),
        participant_ids: vec![profile_id(n), profile_id(n + 1)],
        transcript: Some(format!("line {n}")),
        started_ms: 1_700_000_000_000 + i64::from(n),
    }
}

/// 四个已知类型名都存在（可能为空）的对象表
pub fn object_map(profiles: u32, clients: u32, conversations: u32, states: u32) -> ObjectMap {
    let mut map = ObjectMap::new();
    map.insert(
        RecordKind::Profile.name(),
        (1..=profiles).map(|n| AnyRecord::from(profile(n))).collect(),
    );
    map.insert(
        RecordKind::Client.name(),
        (1..=clients).map(|n| AnyRecord::from(client(n))).collect(),
    );
    map.insert(
        RecordKind::Conversation.name(),
        (1..=conversations)
            .map(|n| AnyRecord::from(conversation(n)))
            .collect(),
    );
    map.insert(
        RecordKind::State.name(),
        (1..=states).map(|n| AnyRecord::from(state(n))).collect(),
    );
    map
}
