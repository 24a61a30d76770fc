use crate::error::WarmupError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WarmupStage
// ---------------------------------------------------------------------------

/// Trust level 0–5. Ordering follows the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupStage {
    New,
    Browsing,
    Upvoting,
    Commenting,
    Posting,
    Ready,
}

impl WarmupStage {
    pub fn all() -> &'static [WarmupStage] {
        &[
            WarmupStage::New,
            WarmupStage::Browsing,
            WarmupStage::Upvoting,
            WarmupStage::Commenting,
            WarmupStage::Posting,
            WarmupStage::Ready,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<WarmupStage> {
        Self::all().get(i).copied()
    }

    pub fn next(self) -> Option<WarmupStage> {
        Self::from_index(self.index() + 1)
    }

    /// Stage 5: no further evaluator-driven transition.
    pub fn is_terminal(self) -> bool {
        self == WarmupStage::Ready
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WarmupStage::New => "new",
            WarmupStage::Browsing => "browsing",
            WarmupStage::Upvoting => "upvoting",
            WarmupStage::Commenting => "commenting",
            WarmupStage::Posting => "posting",
            WarmupStage::Ready => "ready",
        }
    }
}

impl fmt::Display for WarmupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WarmupStage {
    type Err = WarmupError;

    /// Accepts either the stage name or its index ("3" == "commenting").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(i) = s.parse::<usize>() {
            return Self::from_index(i).ok_or_else(|| WarmupError::InvalidStage(s.to_string()));
        }
        Self::all()
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| WarmupError::InvalidStage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Upvote,
    Save,
    Comment,
    Post,
}

impl ActionKind {
    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::Upvote,
            ActionKind::Save,
            ActionKind::Comment,
            ActionKind::Post,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Upvote => "upvote",
            ActionKind::Save => "save",
            ActionKind::Comment => "comment",
            ActionKind::Post => "post",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = WarmupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(ActionKind::Upvote),
            "save" => Ok(ActionKind::Save),
            "comment" => Ok(ActionKind::Comment),
            "post" => Ok(ActionKind::Post),
            _ => Err(WarmupError::InvalidActionKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AccountStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    WarmingUp,
    Active,
    RateLimited,
    Shadowbanned,
    Suspended,
    Inactive,
}

impl AccountStatus {
    pub fn all() -> &'static [AccountStatus] {
        &[
            AccountStatus::WarmingUp,
            AccountStatus::Active,
            AccountStatus::RateLimited,
            AccountStatus::Shadowbanned,
            AccountStatus::Suspended,
            AccountStatus::Inactive,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::WarmingUp => "warming_up",
            AccountStatus::Active => "active",
            AccountStatus::RateLimited => "rate_limited",
            AccountStatus::Shadowbanned => "shadowbanned",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Inactive => "inactive",
        }
    }

    /// Statuses under which no action may be dispatched.
    pub fn blocks_actions(self) -> bool {
        matches!(
            self,
            AccountStatus::RateLimited
                | AccountStatus::Shadowbanned
                | AccountStatus::Suspended
                | AccountStatus::Inactive
        )
    }

    /// Only an operator may move an account out of these.
    pub fn is_locked(self) -> bool {
        matches!(self, AccountStatus::Shadowbanned | AccountStatus::Suspended)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = WarmupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warming_up" | "warming-up" => Ok(AccountStatus::WarmingUp),
            "active" => Ok(AccountStatus::Active),
            "rate_limited" | "rate-limited" => Ok(AccountStatus::RateLimited),
            "shadowbanned" => Ok(AccountStatus::Shadowbanned),
            "suspended" => Ok(AccountStatus::Suspended),
            "inactive" => Ok(AccountStatus::Inactive),
            _ => Err(WarmupError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusOrigin
// ---------------------------------------------------------------------------

/// Who is changing an account's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOrigin {
    /// Sweeps, action runners, platform verification signals.
    Automated,
    /// A human operator; may lift shadowbanned/suspended.
    Operator,
}

// ---------------------------------------------------------------------------
// DenyReason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    StatusBlocked,
    StageInsufficient,
    CoolingDown,
    DailyCapReached,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::StatusBlocked => "status-blocked",
            DenyReason::StageInsufficient => "stage-insufficient",
            DenyReason::CoolingDown => "cooling-down",
            DenyReason::DailyCapReached => "daily-cap-reached",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
