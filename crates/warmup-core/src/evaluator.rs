//! Warmup stage advancement and per-action eligibility.
//!
//! Everything here is a pure, synchronous function of an already-loaded
//! [`Account`] and a caller-supplied `now`. Serializing check → dispatch →
//! record for one account is the caller's job; see [`crate::runner`].

use crate::account::Account;
use crate::config::LimitsConfig;
use crate::stage;
use crate::types::{ActionKind, DenyReason, WarmupStage};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Minimum gap between two actions by the same account.
pub const COOLDOWN_MINUTES: i64 = 10;

pub fn cooldown() -> Duration {
    Duration::minutes(COOLDOWN_MINUTES)
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Permission {
    Permitted,
    Denied(DenyReason),
}

impl Permission {
    pub fn is_permitted(self) -> bool {
        matches!(self, Permission::Permitted)
    }

    pub fn reason(self) -> Option<DenyReason> {
        match self {
            Permission::Permitted => None,
            Permission::Denied(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAdvance {
    pub from: WarmupStage,
    pub to: WarmupStage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextStage {
    pub stage: WarmupStage,
    pub days_required: i64,
    pub days_remaining: i64,
    pub karma_required: i64,
    pub karma_remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupProgress {
    pub current_stage: WarmupStage,
    pub stage_index: usize,
    pub age_days: i64,
    pub karma: i64,
    pub is_ready: bool,
    pub permitted_actions: Vec<ActionKind>,
    pub daily_cap: u32,
    pub actions_today: u32,
    pub next_stage: Option<NextStage>,
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

pub struct Evaluator {
    limits: LimitsConfig,
}

impl Evaluator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Move the account up to the highest stage its age and karma qualify
    /// for. Never lowers the stage.
    pub fn evaluate_advance(&self, account: &mut Account, now: DateTime<Utc>) -> Option<StageAdvance> {
        let candidate = stage::qualifying_stage(account.age_days(now), account.karma);
        if candidate <= account.stage {
            return None;
        }
        let advance = StageAdvance {
            from: account.stage,
            to: candidate,
        };
        account.stage = candidate;
        account.updated_at = now;
        tracing::info!(
            account = %account.username,
            from = %advance.from,
            to = %advance.to,
            karma = account.karma,
            "warmup stage advanced"
        );
        Some(advance)
    }

    /// Whether `kind` may be dispatched for `account` right now. The first
    /// failing check decides the reason.
    pub fn is_action_permitted(
        &self,
        account: &Account,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Permission {
        let verdict = self.check(account, kind, now);
        if let Permission::Denied(reason) = verdict {
            tracing::debug!(account = %account.username, action = %kind, %reason, "action denied");
        }
        verdict
    }

    fn check(&self, account: &Account, kind: ActionKind, now: DateTime<Utc>) -> Permission {
        if account.status.blocks_actions() {
            return Permission::Denied(DenyReason::StatusBlocked);
        }
        if !stage::permits(account.stage, kind) {
            return Permission::Denied(DenyReason::StageInsufficient);
        }
        if let Some(last) = account.last_action_at {
            if now - last < cooldown() {
                return Permission::Denied(DenyReason::CoolingDown);
            }
        }
        let today = now.date_naive();
        if account.daily_actions_reset_at == Some(today)
            && account.daily_actions_count >= self.limits.daily_cap(account.stage)
        {
            return Permission::Denied(DenyReason::DailyCapReached);
        }
        Permission::Permitted
    }

    /// Update rate state after an attempt. Failed attempts change nothing.
    ///
    /// Not idempotent: each call with `succeeded = true` counts one action.
    pub fn record_action_result(&self, account: &mut Account, now: DateTime<Utc>, succeeded: bool) {
        if !succeeded {
            return;
        }
        let today = now.date_naive();
        account.last_action_at = Some(now);
        if account.daily_actions_reset_at == Some(today) {
            account.daily_actions_count += 1;
        } else {
            account.daily_actions_count = 1;
            account.daily_actions_reset_at = Some(today);
        }
        account.updated_at = now;
    }

    /// How far the account is from the next stage. Read-only.
    pub fn progress(&self, account: &Account, now: DateTime<Utc>) -> WarmupProgress {
        let age_days = account.age_days(now);
        let current = account.stage;
        let next_stage = current.next().map(|next| {
            let req = stage::requirement(next);
            NextStage {
                stage: next,
                days_required: req.min_age_days,
                days_remaining: (req.min_age_days - age_days).max(0),
                karma_required: req.min_karma,
                karma_remaining: (req.min_karma - account.karma).max(0),
            }
        });
        let actions_today = if account.daily_actions_reset_at == Some(now.date_naive()) {
            account.daily_actions_count
        } else {
            0
        };
        WarmupProgress {
            current_stage: current,
            stage_index: current.index(),
            age_days,
            karma: account.karma,
            is_ready: current.is_terminal(),
            permitted_actions: stage::requirement(current).actions.to_vec(),
            daily_cap: self.limits.daily_cap(current),
            actions_today,
            next_stage,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
