//! Serialized check → dispatch → record for one account at a time.
//!
//! [`ActionRunner`] is the only component that mutates persisted accounts.
//! Every mutation runs under the account's entry in [`AccountLocks`], so two
//! callers can never both pass the cooldown check for the same account.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::account::{validate_username, Account};
use crate::activity::{ActivityEntry, ActivityType};
use crate::clock::Clock;
use crate::config::LimitsConfig;
use crate::error::{Result, WarmupError};
use crate::evaluator::{Evaluator, Permission, StageAdvance, WarmupProgress};
use crate::lock::AccountLocks;
use crate::rate_limit::RateLimiter;
use crate::store::AccountRepository;
use crate::types::{AccountStatus, ActionKind, DenyReason, StatusOrigin, WarmupStage};

// ---------------------------------------------------------------------------
// Dispatch seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: ActionKind,
    /// Community or item the action is aimed at, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ActionRequest {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, target: None }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Performs an action against the external platform.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, account: &Account, request: &ActionRequest) -> Result<Value>;
}

/// Map a platform error message to the status it implies, if any.
pub fn classify_failure(message: &str) -> Option<AccountStatus> {
    if message.contains("USER_REQUIRED") {
        Some(AccountStatus::Shadowbanned)
    } else if message.contains("RATELIMIT") {
        Some(AccountStatus::RateLimited)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Denied {
        reason: DenyReason,
    },
    /// The per-minute API budget is spent; nothing was dispatched.
    Throttled {
        retry_at: Option<DateTime<Utc>>,
    },
    Performed {
        kind: ActionKind,
        details: Value,
    },
    Failed {
        kind: ActionKind,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_change: Option<AccountStatus>,
    },
}

impl RunOutcome {
    pub fn performed(&self) -> bool {
        matches!(self, RunOutcome::Performed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub stage: WarmupStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance: Option<StageAdvance>,
    /// Reached `ready` and was moved from warming_up to active.
    pub activated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SyncUpdate {
    pub karma: Option<i64>,
    pub platform_created_at: Option<DateTime<Utc>>,
    /// Platform reports the account suspended.
    pub suspended: bool,
}

// ---------------------------------------------------------------------------
// ActionRunner
// ---------------------------------------------------------------------------

pub struct ActionRunner {
    repo: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
    evaluator: Evaluator,
    locks: AccountLocks,
    limiter: RateLimiter,
}

impl ActionRunner {
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
        limits: LimitsConfig,
    ) -> Self {
        let limiter = RateLimiter::new(limits.requests_per_minute);
        Self {
            repo,
            clock,
            evaluator: Evaluator::new(limits),
            locks: AccountLocks::new(),
            limiter,
        }
    }

    pub fn repo(&self) -> &dyn AccountRepository {
        self.repo.as_ref()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Look up by UUID, falling back to a case-insensitive username match.
    pub fn resolve(&self, key: &str) -> Result<Account> {
        if let Ok(id) = Uuid::parse_str(key) {
            return self.repo.read(id);
        }
        self.repo
            .find_by_username(key)?
            .ok_or_else(|| WarmupError::AccountNotFound(key.to_string()))
    }

    fn log(&self, kind: ActivityType, id: Uuid, details: Value, at: DateTime<Utc>) -> Result<()> {
        self.repo
            .append_activity(&ActivityEntry::new(kind, id, details, at))
    }

    fn log_advance(&self, id: Uuid, adv: StageAdvance, at: DateTime<Utc>) -> Result<()> {
        self.log(
            ActivityType::AccountWarmup,
            id,
            json!({ "from": adv.from, "to": adv.to }),
            at,
        )
    }

    fn log_status(
        &self,
        id: Uuid,
        from: AccountStatus,
        to: AccountStatus,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.log(
            ActivityType::AccountStatusChange,
            id,
            json!({ "from": from, "to": to, "reason": reason }),
            at,
        )
    }

    // -----------------------------------------------------------------------
    // Registration and operator edits
    // -----------------------------------------------------------------------

    pub fn register(&self, account: Account) -> Result<Account> {
        validate_username(&account.username)?;
        self.repo.insert(&account)?;
        self.log(
            ActivityType::AccountRegistered,
            account.id,
            json!({ "username": account.username, "karma": account.karma }),
            account.created_at,
        )?;
        tracing::info!(account = %account.username, id = %account.id, "account registered");
        Ok(account)
    }

    /// Apply a mutation to one account under its lock and persist it.
    fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Account, DateTime<Utc>) -> Result<R>,
    ) -> Result<(Account, R)> {
        self.locks.with(id, || {
            let now = self.clock.now();
            let mut account = self.repo.read(id)?;
            let out = f(&mut account, now)?;
            self.repo.write(&account)?;
            Ok((account, out))
        })
    }

    pub fn set_status(
        &self,
        id: Uuid,
        status: AccountStatus,
        reason: Option<String>,
        origin: StatusOrigin,
    ) -> Result<Account> {
        let (account, _) = self.update(id, |account, now| {
            if let Some(previous) = account.set_status(status, reason.clone(), origin, now)? {
                self.log_status(account.id, previous, status, reason.as_deref(), now)?;
                tracing::info!(account = %account.username, from = %previous, to = %status, "status changed");
            }
            Ok(())
        })?;
        Ok(account)
    }

    pub fn deactivate(&self, id: Uuid) -> Result<Account> {
        let (account, _) = self.update(id, |account, now| {
            if let Some(previous) = account.deactivate(now) {
                self.log_status(account.id, previous, AccountStatus::Inactive, Some("deactivated"), now)?;
            }
            Ok(())
        })?;
        Ok(account)
    }

    pub fn reset_stage(&self, id: Uuid, stage: WarmupStage) -> Result<Account> {
        let (account, _) = self.update(id, |account, now| {
            let from = account.stage();
            account.reset_stage(stage, now);
            if from != stage {
                self.log(
                    ActivityType::AccountWarmup,
                    account.id,
                    json!({ "from": from, "to": stage, "reset": true }),
                    now,
                )?;
            }
            Ok(())
        })?;
        Ok(account)
    }

    /// Apply platform stats. A suspension report locks the account.
    pub fn sync(&self, id: Uuid, update: SyncUpdate) -> Result<Account> {
        let (account, _) = self.update(id, |account, now| {
            account.sync_stats(update.karma, update.platform_created_at, now);
            if update.suspended {
                let reason = "suspended by platform";
                if let Some(previous) = account.set_status(
                    AccountStatus::Suspended,
                    Some(reason.to_string()),
                    StatusOrigin::Automated,
                    now,
                )? {
                    self.log_status(account.id, previous, AccountStatus::Suspended, Some(reason), now)?;
                    tracing::warn!(account = %account.username, "platform reports account suspended");
                }
            }
            Ok(())
        })?;
        Ok(account)
    }

    /// Drop lock slots for accounts no caller currently holds.
    pub fn release_idle_locks(&self) {
        self.locks.prune();
    }

    pub fn lock_slots(&self) -> usize {
        self.locks.len()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// First fully warmed, active account of `client_id` that may perform
    /// `kind` right now, in registration order.
    pub fn available_for_client(&self, client_id: &str, kind: ActionKind) -> Result<Option<Account>> {
        let now = self.clock.now();
        let found = self
            .repo
            .list_for_client(client_id)?
            .into_iter()
            .filter(|a| a.status == AccountStatus::Active && a.stage().is_terminal())
            .find(|a| self.evaluator.is_action_permitted(a, kind, now).is_permitted());
        if found.is_none() {
            tracing::debug!(client = client_id, action = %kind, "no account available");
        }
        Ok(found)
    }

    // -----------------------------------------------------------------------
    // Warmup
    // -----------------------------------------------------------------------

    /// Advance the account's stage; a warming-up account reaching `ready`
    /// becomes active.
    pub fn advance(&self, id: Uuid) -> Result<AdvanceOutcome> {
        let (_, outcome) = self.update(id, |account, now| {
            let advance = self.evaluator.evaluate_advance(account, now);
            if let Some(adv) = advance {
                self.log_advance(account.id, adv, now)?;
            }
            let mut activated = false;
            if account.stage().is_terminal() && account.status == AccountStatus::WarmingUp {
                let reason = "warmup complete";
                account.set_status(
                    AccountStatus::Active,
                    Some(reason.to_string()),
                    StatusOrigin::Automated,
                    now,
                )?;
                self.log_status(
                    account.id,
                    AccountStatus::WarmingUp,
                    AccountStatus::Active,
                    Some(reason),
                    now,
                )?;
                activated = true;
            }
            Ok(AdvanceOutcome {
                stage: account.stage(),
                advance,
                activated,
            })
        })?;
        Ok(outcome)
    }

    /// Read-only permission check. A pending stage advance is taken into
    /// account but not persisted.
    pub fn check(&self, id: Uuid, kind: ActionKind) -> Result<Permission> {
        let now = self.clock.now();
        let mut account = self.repo.read(id)?;
        self.evaluator.evaluate_advance(&mut account, now);
        Ok(self.evaluator.is_action_permitted(&account, kind, now))
    }

    pub fn progress(&self, id: Uuid) -> Result<(Account, WarmupProgress)> {
        let now = self.clock.now();
        let account = self.repo.read(id)?;
        let progress = self.evaluator.progress(&account, now);
        Ok((account, progress))
    }

    /// Record an action performed outside the runner.
    pub fn record_external(
        &self,
        id: Uuid,
        kind: Option<ActionKind>,
        succeeded: bool,
    ) -> Result<Account> {
        let (account, _) = self.update(id, |account, now| {
            self.evaluator.record_action_result(account, now, succeeded);
            self.log(
                ActivityType::AccountAction,
                account.id,
                json!({ "action": kind, "success": succeeded, "external": true }),
                now,
            )
        })?;
        Ok(account)
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Check, dispatch and record one action for `id`.
    ///
    /// Denials and dispatch failures are outcomes; `Err` means the store or
    /// activity log failed.
    pub fn run(
        &self,
        id: Uuid,
        request: &ActionRequest,
        dispatcher: &dyn ActionDispatcher,
    ) -> Result<RunOutcome> {
        self.locks
            .with(id, || self.run_locked(id, request, dispatcher))
    }

    fn run_locked(
        &self,
        id: Uuid,
        request: &ActionRequest,
        dispatcher: &dyn ActionDispatcher,
    ) -> Result<RunOutcome> {
        let now = self.clock.now();
        let mut account = self.repo.read(id)?;

        if let Some(adv) = self.evaluator.evaluate_advance(&mut account, now) {
            self.repo.write(&account)?;
            self.log_advance(id, adv, now)?;
        }

        if let Permission::Denied(reason) =
            self.evaluator
                .is_action_permitted(&account, request.kind, now)
        {
            return Ok(RunOutcome::Denied { reason });
        }

        let key = id.to_string();
        if !self.limiter.try_acquire(&key, now) {
            let retry_at = self.limiter.reset_time(&key, now);
            tracing::debug!(account = %account.username, "api budget spent for this minute");
            return Ok(RunOutcome::Throttled { retry_at });
        }

        let result = dispatcher.dispatch(&account, request);
        let done = self.clock.now();

        match result {
            Ok(details) => {
                self.evaluator.record_action_result(&mut account, done, true);
                self.repo.write(&account)?;
                self.log(
                    ActivityType::AccountAction,
                    id,
                    json!({
                        "action": request.kind,
                        "target": request.target,
                        "success": true,
                        "details": details,
                    }),
                    done,
                )?;
                tracing::info!(account = %account.username, action = %request.kind, "action performed");
                Ok(RunOutcome::Performed {
                    kind: request.kind,
                    details,
                })
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(account = %account.username, action = %request.kind, %error, "action dispatch failed");
                self.evaluator.record_action_result(&mut account, done, false);

                let mut status_change = None;
                if let Some(status) = classify_failure(&error) {
                    if let Some(previous) =
                        account.set_status(status, Some(error.clone()), StatusOrigin::Automated, done)?
                    {
                        self.repo.write(&account)?;
                        self.log_status(id, previous, status, Some(&error), done)?;
                        status_change = Some(status);
                    }
                }

                self.log(
                    ActivityType::AccountAction,
                    id,
                    json!({
                        "action": request.kind,
                        "target": request.target,
                        "success": false,
                        "error": error,
                    }),
                    done,
                )?;
                Ok(RunOutcome::Failed {
                    kind: request.kind,
                    error,
                    status_change,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct CountingDispatcher {
        calls: AtomicUsize,
        fail_with: Option<&'static str>,
    }

    impl CountingDispatcher {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(msg: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(msg),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ActionDispatcher for CountingDispatcher {
        fn dispatch(&self, _account: &Account, request: &ActionRequest) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(2));
            match self.fail_with {
                Some(msg) => Err(WarmupError::Dispatch(msg.to_string())),
                None => Ok(json!({ "target": request.target })),
            }
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 14, 10, 0, 0).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
        runner: ActionRunner,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(t0()));
        let runner = ActionRunner::new(store.clone(), clock.clone(), LimitsConfig::default());
        Fixture {
            store,
            clock,
            runner,
        }
    }

    /// Five days and 10 karma: qualifies for commenting.
    fn seasoned(f: &Fixture, name: &str) -> Uuid {
        let acct = Account::new(name, t0() - Duration::days(5), 10, t0());
        f.runner.register(acct).unwrap().id
    }

    #[test]
    fn register_rejects_bad_username() {
        let f = fixture();
        let err = f
            .runner
            .register(Account::new("no spaces", t0(), 0, t0()))
            .unwrap_err();
        assert!(matches!(err, WarmupError::InvalidUsername(_)));
    }

    #[test]
    fn register_logs_activity() {
        let f = fixture();
        let id = seasoned(&f, "fresh_face");
        let log = f.store.list_activity(Some(id), 10).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].activity_type, ActivityType::AccountRegistered);
    }

    #[test]
    fn run_advances_then_performs() {
        let f = fixture();
        let id = seasoned(&f, "runner_one");
        let dispatcher = CountingDispatcher::ok();

        let outcome = f
            .runner
            .run(id, &ActionRequest::new(ActionKind::Comment).with_target("books"), &dispatcher)
            .unwrap();
        assert!(outcome.performed());
        assert_eq!(dispatcher.calls(), 1);

        let acct = f.store.read(id).unwrap();
        assert_eq!(acct.stage(), WarmupStage::Commenting);
        assert_eq!(acct.last_action_at, Some(t0()));
        assert_eq!(acct.daily_actions_count, 1);

        let kinds: Vec<ActivityType> = f
            .store
            .list_activity(Some(id), 10)
            .unwrap()
            .into_iter()
            .map(|e| e.activity_type)
            .collect();
        assert!(kinds.contains(&ActivityType::AccountWarmup));
        assert!(kinds.contains(&ActivityType::AccountAction));
    }

    #[test]
    fn denied_run_does_not_dispatch() {
        let f = fixture();
        let acct = Account::new("brand_new", t0(), 0, t0());
        let id = f.runner.register(acct).unwrap().id;
        let dispatcher = CountingDispatcher::ok();

        let outcome = f
            .runner
            .run(id, &ActionRequest::new(ActionKind::Upvote), &dispatcher)
            .unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Denied {
                reason: DenyReason::StageInsufficient
            }
        );
        assert_eq!(dispatcher.calls(), 0);
    }

    #[test]
    fn second_run_within_cooldown_is_denied() {
        let f = fixture();
        let id = seasoned(&f, "cooling");
        let dispatcher = CountingDispatcher::ok();
        let req = ActionRequest::new(ActionKind::Upvote);

        assert!(f.runner.run(id, &req, &dispatcher).unwrap().performed());
        f.clock.advance(Duration::minutes(9));
        assert_eq!(
            f.runner.run(id, &req, &dispatcher).unwrap(),
            RunOutcome::Denied {
                reason: DenyReason::CoolingDown
            }
        );
        f.clock.advance(Duration::minutes(1));
        assert!(f.runner.run(id, &req, &dispatcher).unwrap().performed());
        assert_eq!(dispatcher.calls(), 2);
    }

    #[test]
    fn concurrent_runs_dispatch_once() {
        let f = fixture();
        let id = seasoned(&f, "contended");
        let dispatcher = CountingDispatcher::ok();
        let req = ActionRequest::new(ActionKind::Upvote);

        let outcomes: Vec<RunOutcome> = thread::scope(|s| {
            let handles: Vec<_> = (0..6)
                .map(|_| s.spawn(|| f.runner.run(id, &req, &dispatcher).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(dispatcher.calls(), 1);
        assert_eq!(outcomes.iter().filter(|o| o.performed()).count(), 1);
        assert!(outcomes.iter().filter(|o| !o.performed()).all(|o| *o
            == RunOutcome::Denied {
                reason: DenyReason::CoolingDown
            }));
        assert_eq!(f.store.read(id).unwrap().daily_actions_count, 1);
    }

    #[test]
    fn failure_leaves_rate_state_untouched() {
        let f = fixture();
        let id = seasoned(&f, "flaky");
        let dispatcher = CountingDispatcher::failing("connection reset");

        let outcome = f
            .runner
            .run(id, &ActionRequest::new(ActionKind::Save), &dispatcher)
            .unwrap();
        match outcome {
            RunOutcome::Failed { status_change, .. } => assert!(status_change.is_none()),
            other => panic!("expected failure, got {other:?}"),
        }
        let acct = f.store.read(id).unwrap();
        assert!(acct.last_action_at.is_none());
        assert_eq!(acct.daily_actions_count, 0);
        assert_eq!(acct.status, AccountStatus::WarmingUp);
    }

    #[test]
    fn user_required_failure_shadowbans() {
        let f = fixture();
        let id = seasoned(&f, "ghosted");
        let dispatcher = CountingDispatcher::failing("USER_REQUIRED: please login");

        let outcome = f
            .runner
            .run(id, &ActionRequest::new(ActionKind::Upvote), &dispatcher)
            .unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Failed {
                status_change: Some(AccountStatus::Shadowbanned),
                ..
            }
        ));
        assert_eq!(f.store.read(id).unwrap().status, AccountStatus::Shadowbanned);

        f.clock.advance(Duration::hours(1));
        assert_eq!(
            f.runner.check(id, ActionKind::Upvote).unwrap(),
            Permission::Denied(DenyReason::StatusBlocked)
        );
    }

    #[test]
    fn classify_failure_messages() {
        assert_eq!(
            classify_failure("RATELIMIT: try again in 9 minutes"),
            Some(AccountStatus::RateLimited)
        );
        assert_eq!(
            classify_failure("USER_REQUIRED"),
            Some(AccountStatus::Shadowbanned)
        );
        assert_eq!(classify_failure("503 service unavailable"), None);
    }

    #[test]
    fn throttled_when_api_budget_spent() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(t0()));
        let limits = LimitsConfig {
            requests_per_minute: 1,
            ..LimitsConfig::default()
        };
        let runner = ActionRunner::new(store.clone(), clock.clone(), limits);
        let id = runner
            .register(Account::new("budgeted", t0() - Duration::days(5), 10, t0()))
            .unwrap()
            .id;
        let failing = CountingDispatcher::failing("timeout");
        let req = ActionRequest::new(ActionKind::Upvote);

        // a failed attempt leaves no cooldown but still spends the budget
        assert!(matches!(
            runner.run(id, &req, &failing).unwrap(),
            RunOutcome::Failed { .. }
        ));
        assert!(matches!(
            runner.run(id, &req, &failing).unwrap(),
            RunOutcome::Throttled { retry_at: Some(_) }
        ));
        assert_eq!(failing.calls(), 1);
    }

    #[test]
    fn check_does_not_persist_advance() {
        let f = fixture();
        let id = seasoned(&f, "peek_only");
        assert!(f.runner.check(id, ActionKind::Comment).unwrap().is_permitted());
        assert_eq!(f.store.read(id).unwrap().stage(), WarmupStage::New);
    }

    #[test]
    fn advance_to_ready_activates() {
        let f = fixture();
        let acct = Account::new("veteran", t0() - Duration::days(60), 500, t0());
        let id = f.runner.register(acct).unwrap().id;

        let outcome = f.runner.advance(id).unwrap();
        assert_eq!(outcome.stage, WarmupStage::Ready);
        assert!(outcome.activated);
        assert_eq!(f.store.read(id).unwrap().status, AccountStatus::Active);

        let again = f.runner.advance(id).unwrap();
        assert!(again.advance.is_none());
        assert!(!again.activated);
    }

    #[test]
    fn sync_suspension_locks_account() {
        let f = fixture();
        let id = seasoned(&f, "banned_soon");
        let acct = f
            .runner
            .sync(
                id,
                SyncUpdate {
                    karma: Some(42),
                    suspended: true,
                    ..SyncUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(acct.karma, 42);
        assert_eq!(acct.status, AccountStatus::Suspended);
        assert!(acct.last_verified_at.is_some());

        let err = f
            .runner
            .set_status(id, AccountStatus::Active, None, StatusOrigin::Automated)
            .unwrap_err();
        assert!(matches!(err, WarmupError::InvalidStatusTransition { .. }));
        let lifted = f
            .runner
            .set_status(id, AccountStatus::Active, Some("appeal".into()), StatusOrigin::Operator)
            .unwrap();
        assert_eq!(lifted.status, AccountStatus::Active);
    }

    #[test]
    fn record_external_counts_success_only() {
        let f = fixture();
        let id = seasoned(&f, "manual_ops");
        f.runner.record_external(id, Some(ActionKind::Upvote), false).unwrap();
        assert_eq!(f.store.read(id).unwrap().daily_actions_count, 0);
        f.runner.record_external(id, None, true).unwrap();
        let acct = f.store.read(id).unwrap();
        assert_eq!(acct.daily_actions_count, 1);
        assert_eq!(acct.last_action_at, Some(t0()));
    }

    #[test]
    fn resolve_by_id_or_username() {
        let f = fixture();
        let id = seasoned(&f, "Findable");
        assert_eq!(f.runner.resolve(&id.to_string()).unwrap().id, id);
        assert_eq!(f.runner.resolve("findable").unwrap().id, id);
        assert!(matches!(
            f.runner.resolve("ghost"),
            Err(WarmupError::AccountNotFound(_))
        ));
    }

    fn warmed_for(f: &Fixture, name: &str, client: &str) -> Uuid {
        let mut acct = Account::new(name, t0() - Duration::days(30), 500, t0());
        acct.client_id = Some(client.to_string());
        let id = f.runner.register(acct).unwrap().id;
        assert!(f.runner.advance(id).unwrap().activated);
        id
    }

    #[test]
    fn available_for_client_skips_cooling_and_foreign_accounts() {
        let f = fixture();
        let other = warmed_for(&f, "other_tenant", "globex");
        let first = warmed_for(&f, "acme_first", "acme");
        let second = warmed_for(&f, "acme_second", "acme");
        let dispatcher = CountingDispatcher::ok();

        let pick = f.runner.available_for_client("acme", ActionKind::Post).unwrap();
        assert_eq!(pick.map(|a| a.id), Some(first));

        assert!(f
            .runner
            .run(first, &ActionRequest::new(ActionKind::Post), &dispatcher)
            .unwrap()
            .performed());
        let pick = f.runner.available_for_client("acme", ActionKind::Post).unwrap();
        assert_eq!(pick.map(|a| a.id), Some(second));

        assert!(f
            .runner
            .run(second, &ActionRequest::new(ActionKind::Post), &dispatcher)
            .unwrap()
            .performed());
        assert!(f
            .runner
            .available_for_client("acme", ActionKind::Post)
            .unwrap()
            .is_none());

        f.clock.advance(Duration::minutes(10));
        let pick = f.runner.available_for_client("acme", ActionKind::Post).unwrap();
        assert_eq!(pick.map(|a| a.id), Some(first));

        let foreign = f.runner.available_for_client("globex", ActionKind::Upvote).unwrap();
        assert_eq!(foreign.map(|a| a.id), Some(other));
    }

    #[test]
    fn available_for_client_requires_active_ready() {
        let f = fixture();
        // warming up, not yet at the final stage
        let mut young = Account::new("acme_young", t0() - Duration::days(5), 10, t0());
        young.client_id = Some("acme".into());
        f.runner.register(young).unwrap();
        let banned = warmed_for(&f, "acme_banned", "acme");
        f.runner
            .set_status(banned, AccountStatus::Shadowbanned, None, StatusOrigin::Operator)
            .unwrap();

        assert!(f
            .runner
            .available_for_client("acme", ActionKind::Upvote)
            .unwrap()
            .is_none());
    }

    #[test]
    fn idle_lock_slots_are_released() {
        let f = fixture();
        let id = seasoned(&f, "slot_holder");
        f.runner.advance(id).unwrap();
        assert_eq!(f.runner.lock_slots(), 1);
        f.runner.release_idle_locks();
        assert_eq!(f.runner.lock_slots(), 0);
    }

    #[test]
    fn reset_stage_can_lower() {
        let f = fixture();
        let id = seasoned(&f, "demoted");
        f.runner.advance(id).unwrap();
        let acct = f.runner.reset_stage(id, WarmupStage::Browsing).unwrap();
        assert_eq!(acct.stage(), WarmupStage::Browsing);
    }
}
