use super::{
    AnyRecord, Record, RecordKind, StoredRecord, check_uuid, optional_from_stored,
    optional_to_stored, wrong_kind,
};
use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};

/// 客户端启动记录（内存结构）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientData {
    pub id: String,
    pub profile_id: String,
    pub user_agent: Option<String>,
    /// 最近一次启动时间（Unix 毫秒）
    pub last_launch_ms: i64,
}

/// 客户端启动记录（存储结构）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredClient {
    pub id: String,
    pub profile_id: String,
    pub user_agent: String,
    pub last_launch: i64,
}

impl StoredRecord for StoredClient {
    fn storage_id(&self) -> &str {
        &self.id
    }
}

fn check_launch(value: i64) -> Result<()> {
    if value < 0 {
        return Err(ConversionError::InvalidField {
            kind: RecordKind::Client.name().to_string(),
            field: "lastLaunch".to_string(),
            message: format!("negative timestamp {}", value),
        }
        .into());
    }
    Ok(())
}

impl Record for ClientData {
    const KIND: RecordKind = RecordKind::Client;
    type Stored = StoredClient;

    fn downgrade(&self) -> Result<StoredClient> {
        check_uuid(Self::KIND, "id", &self.id)?;
        check_uuid(Self::KIND, "profileId", &self.profile_id)?;
        check_launch(self.last_launch_ms)?;
        Ok(StoredClient {
            id: self.id.clone(),
            profile_id: self.profile_id.clone(),
            user_agent: optional_to_stored(Self::KIND, "userAgent", &self.user_agent)?,
            last_launch: self.last_launch_ms,
        })
    }

    fn upgrade(stored: StoredClient) -> Result<Self> {
        check_uuid(Self::KIND, "id", &stored.id)?;
        check_uuid(Self::KIND, "profileId", &stored.profile_id)?;
        check_launch(stored.last_launch)?;
        Ok(ClientData {
            id: stored.id,
            profile_id: stored.profile_id,
            user_agent: optional_from_stored(stored.user_agent),
            last_launch_ms: stored.last_launch,
        })
    }

    fn from_any(record: &AnyRecord) -> Result<&Self> {
        match record {
            AnyRecord::Client(client) => Ok(client),
            other => Err(wrong_kind(Self::KIND, other)),
        }
    }
}
