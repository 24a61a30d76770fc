use crate::error::{Result, WarmupError};
use crate::types::{AccountStatus, StatusOrigin, WarmupStage};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Username validation
// ---------------------------------------------------------------------------

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_re() -> &'static Regex {
    USERNAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]{3,20}$").unwrap())
}

pub fn validate_username(username: &str) -> Result<()> {
    if !username_re().is_match(username) {
        return Err(WarmupError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One identity on the external platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    pub karma: i64,
    /// Creation time as reported by the platform.
    pub platform_created_at: DateTime<Utc>,

    /// Advanced only by the evaluator; see [`Account::reset_stage`].
    pub(crate) stage: WarmupStage,

    pub last_action_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub daily_actions_count: u32,
    #[serde(default)]
    pub daily_actions_reset_at: Option<NaiveDate>,

    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub last_verified_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        username: impl Into<String>,
        platform_created_at: DateTime<Utc>,
        karma: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            organization_id: None,
            client_id: None,
            karma,
            platform_created_at,
            stage: WarmupStage::New,
            last_action_at: None,
            daily_actions_count: 0,
            daily_actions_reset_at: None,
            status: AccountStatus::WarmingUp,
            status_reason: None,
            last_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stage(&self) -> WarmupStage {
        self.stage
    }

    /// Whole days since the platform account was created. Never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.platform_created_at).num_days().max(0)
    }

    /// Explicit operator reset. The only path that may lower the stage.
    pub fn reset_stage(&mut self, stage: WarmupStage, now: DateTime<Utc>) {
        self.stage = stage;
        self.updated_at = now;
    }

    /// Apply freshly synced platform stats.
    pub fn sync_stats(
        &mut self,
        karma: Option<i64>,
        platform_created_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        if let Some(k) = karma {
            self.karma = k;
        }
        if let Some(created) = platform_created_at {
            self.platform_created_at = created;
        }
        self.last_verified_at = Some(now);
        self.updated_at = now;
    }

    /// Change status. Automated callers cannot lift shadowbanned or suspended.
    ///
    /// Returns the previous status when it changed, `None` for a no-op.
    pub fn set_status(
        &mut self,
        status: AccountStatus,
        reason: Option<String>,
        origin: StatusOrigin,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountStatus>> {
        if self.status == status {
            return Ok(None);
        }
        if self.status.is_locked() && origin == StatusOrigin::Automated {
            return Err(WarmupError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: status.to_string(),
                reason: "only an operator may lift this status".to_string(),
            });
        }
        let previous = self.status;
        self.status = status;
        self.status_reason = reason;
        self.updated_at = now;
        Ok(Some(previous))
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Option<AccountStatus> {
        // operator origin never fails
        self.set_status(
            AccountStatus::Inactive,
            Some("deactivated".to_string()),
            StatusOrigin::Operator,
            now,
        )
        .unwrap_or(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
