use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    AccountRegistered,
    AccountWarmup,
    AccountAction,
    AccountStatusChange,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::AccountRegistered => "account_registered",
            ActivityType::AccountWarmup => "account_warmup",
            ActivityType::AccountAction => "account_action",
            ActivityType::AccountStatusChange => "account_status_change",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record of something that happened to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub activity_type: ActivityType,
    pub account_id: Uuid,
    #[serde(default)]
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        activity_type: ActivityType,
        account_id: Uuid,
        details: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity_type,
            account_id,
            details,
            created_at,
        }
    }
}
