//! Batch passes over every registered account.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Account;
use crate::config::SweepConfig;
use crate::error::Result;
use crate::runner::{ActionDispatcher, ActionRequest, ActionRunner, RunOutcome, SyncUpdate};
use crate::stage;
use crate::types::{AccountStatus, ActionKind, WarmupStage};

/// Relative odds of each warmup action, before stage filtering.
const ACTION_WEIGHTS: &[(ActionKind, u32)] = &[
    (ActionKind::Upvote, 60),
    (ActionKind::Comment, 30),
    (ActionKind::Save, 10),
];

/// Pick a warmup action the stage permits. `None` when it permits none of
/// the weighted kinds.
pub fn plan_warmup_action<R: Rng + ?Sized>(stage: WarmupStage, rng: &mut R) -> Option<ActionKind> {
    let candidates: Vec<(ActionKind, u32)> = ACTION_WEIGHTS
        .iter()
        .copied()
        .filter(|(kind, _)| stage::permits(stage, *kind))
        .collect();
    candidates
        .choose_weighted(rng, |(_, weight)| *weight)
        .ok()
        .map(|(kind, _)| *kind)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFailure {
    pub account_id: Uuid,
    pub username: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub processed: usize,
    pub advanced: usize,
    pub fully_warmed: usize,
    pub actions_performed: usize,
    pub actions_denied: usize,
    /// Account count per stage name after the pass.
    pub stages: BTreeMap<String, usize>,
    pub errors: Vec<SweepFailure>,
}

impl SweepReport {
    fn count_stage(&mut self, stage: WarmupStage) {
        *self.stages.entry(stage.as_str().to_string()).or_default() += 1;
    }

    fn fail(&mut self, account: &Account, error: impl ToString) {
        self.errors.push(SweepFailure {
            account_id: account.id,
            username: account.username.clone(),
            error: error.to_string(),
        });
    }
}

/// Fetches fresh stats for an account from the platform.
pub trait AccountVerifier: Send + Sync {
    fn verify(&self, account: &Account) -> Result<SyncUpdate>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyReport {
    pub verified: usize,
    pub suspended: usize,
    pub failed: usize,
    pub errors: Vec<SweepFailure>,
}

/// Locked and inactive accounts are left alone, as are accounts already at
/// the final stage.
fn eligible(account: &Account) -> bool {
    !account.stage().is_terminal()
        && !account.status.is_locked()
        && account.status != AccountStatus::Inactive
}

pub struct Sweeper<'a> {
    runner: &'a ActionRunner,
    config: &'a SweepConfig,
}

impl<'a> Sweeper<'a> {
    pub fn new(runner: &'a ActionRunner, config: &'a SweepConfig) -> Self {
        Self { runner, config }
    }

    /// Re-evaluate every eligible account's stage.
    pub fn advance_all(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        for account in self.runner.repo().list()? {
            if !eligible(&account) {
                report.count_stage(account.stage());
                continue;
            }
            report.processed += 1;
            match self.runner.advance(account.id) {
                Ok(outcome) => {
                    report.advanced += usize::from(outcome.advance.is_some());
                    report.fully_warmed += usize::from(outcome.activated);
                    report.count_stage(outcome.stage);
                }
                Err(e) => {
                    tracing::warn!(account = %account.username, error = %e, "stage evaluation failed");
                    report.count_stage(account.stage());
                    report.fail(&account, e);
                }
            }
        }
        self.runner.release_idle_locks();
        tracing::info!(
            processed = report.processed,
            advanced = report.advanced,
            fully_warmed = report.fully_warmed,
            "advance sweep finished"
        );
        Ok(report)
    }

    /// Advance every eligible account, then run one planned warmup action
    /// for each that is still warming up.
    pub fn warm_all<R: Rng + ?Sized>(
        &self,
        dispatcher: &dyn ActionDispatcher,
        rng: &mut R,
    ) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        for account in self.runner.repo().list()? {
            if !eligible(&account) {
                report.count_stage(account.stage());
                continue;
            }
            report.processed += 1;
            let outcome = match self.runner.advance(account.id) {
                Ok(outcome) => outcome,
                Err(e) => {
                    report.count_stage(account.stage());
                    report.fail(&account, e);
                    continue;
                }
            };
            report.advanced += usize::from(outcome.advance.is_some());
            report.fully_warmed += usize::from(outcome.activated);
            report.count_stage(outcome.stage);

            if outcome.activated || account.status != AccountStatus::WarmingUp {
                continue;
            }
            let Some(kind) = plan_warmup_action(outcome.stage, rng) else {
                continue;
            };
            let mut request = ActionRequest::new(kind);
            if let Some(community) = self.config.safe_communities.choose(rng) {
                request = request.with_target(community.clone());
            }

            match self.runner.run(account.id, &request, dispatcher) {
                Ok(RunOutcome::Performed { .. }) => report.actions_performed += 1,
                Ok(RunOutcome::Denied { .. }) | Ok(RunOutcome::Throttled { .. }) => {
                    report.actions_denied += 1
                }
                Ok(RunOutcome::Failed { error, .. }) => report.fail(&account, error),
                Err(e) => report.fail(&account, e),
            }
        }
        self.runner.release_idle_locks();
        tracing::info!(
            processed = report.processed,
            performed = report.actions_performed,
            errors = report.errors.len(),
            "warmup sweep finished"
        );
        Ok(report)
    }

    /// Re-sync stats for every warming-up or active account. A platform
    /// suspension report locks the account.
    pub fn verify_all(&self, verifier: &dyn AccountVerifier) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();
        let candidates = self.runner.repo().list()?.into_iter().filter(|a| {
            matches!(a.status, AccountStatus::WarmingUp | AccountStatus::Active)
        });
        for account in candidates {
            let synced = verifier
                .verify(&account)
                .and_then(|update| self.runner.sync(account.id, update));
            match synced {
                Ok(updated) if updated.status == AccountStatus::Suspended => report.suspended += 1,
                Ok(_) => report.verified += 1,
                Err(e) => {
                    tracing::warn!(account = %account.username, error = %e, "verification failed");
                    report.failed += 1;
                    report.errors.push(SweepFailure {
                        account_id: account.id,
                        username: account.username.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        self.runner.release_idle_locks();
        tracing::info!(
            verified = report.verified,
            suspended = report.suspended,
            failed = report.failed,
            "verification pass finished"
        );
        Ok(report)
    }
}
