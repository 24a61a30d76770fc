//! Account repository: the read/write seam between the evaluator and
//! whatever actually holds account records.
//!
//! `AccountDb` persists to a redb file; `MemoryStore` keeps everything in
//! process for tests and embedding.

pub mod db;

pub use db::AccountDb;

use crate::account::Account;
use crate::activity::ActivityEntry;
use crate::error::{Result, WarmupError};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

pub trait AccountRepository: Send + Sync {
    fn read(&self, id: Uuid) -> Result<Account>;

    /// Insert or replace the record keyed by `account.id`.
    fn write(&self, account: &Account) -> Result<()>;

    /// All accounts in registration order.
    fn list(&self) -> Result<Vec<Account>>;

    fn append_activity(&self, entry: &ActivityEntry) -> Result<()>;

    /// Newest first, optionally restricted to one account.
    fn list_activity(&self, account: Option<Uuid>, limit: usize) -> Result<Vec<ActivityEntry>>;

    fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|a| a.username.eq_ignore_ascii_case(username)))
    }

    /// Write a new account, rejecting duplicate ids and usernames. The
    /// duplicate check and the write are one atomic step.
    fn insert(&self, account: &Account) -> Result<()>;

    /// Accounts owned by `client_id`, in registration order.
    fn list_for_client(&self, client_id: &str) -> Result<Vec<Account>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|a| a.client_id.as_deref() == Some(client_id))
            .collect())
    }
}

/// Reject `candidate` if it collides with `existing` by id or username.
fn check_unique<'a>(
    existing: impl IntoIterator<Item = &'a Account>,
    candidate: &Account,
) -> Result<()> {
    for other in existing {
        if other.id == candidate.id {
            return Err(WarmupError::AccountExists(candidate.id.to_string()));
        }
        if other.username.eq_ignore_ascii_case(&candidate.username) {
            return Err(WarmupError::AccountExists(candidate.username.clone()));
        }
    }
    Ok(())
}

fn sort_accounts(accounts: &mut [Account]) {
    accounts.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.username.cmp(&b.username))
    });
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    accounts: HashMap<Uuid, Account>,
    activity: Vec<ActivityEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AccountRepository for MemoryStore {
    fn read(&self, id: Uuid) -> Result<Account> {
        self.lock()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| WarmupError::AccountNotFound(id.to_string()))
    }

    fn write(&self, account: &Account) -> Result<()> {
        self.lock().accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn insert(&self, account: &Account) -> Result<()> {
        let mut inner = self.lock();
        check_unique(inner.accounts.values(), account)?;
        inner.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Account>> {
        let mut all: Vec<Account> = self.lock().accounts.values().cloned().collect();
        sort_accounts(&mut all);
        Ok(all)
    }

    fn append_activity(&self, entry: &ActivityEntry) -> Result<()> {
        self.lock().activity.push(entry.clone());
        Ok(())
    }

    fn list_activity(&self, account: Option<Uuid>, limit: usize) -> Result<Vec<ActivityEntry>> {
        let inner = self.lock();
        let mut entries: Vec<ActivityEntry> = inner
            .activity
            .iter()
            .filter(|e| account.map_or(true, |id| e.account_id == id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
