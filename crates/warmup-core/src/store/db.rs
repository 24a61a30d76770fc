//! Persistent account storage using redb.
//!
//! # Table design
//!
//! `ACCOUNTS` is keyed by the 16 raw bytes of the account UUID.
//!
//! `ACTIVITY` uses a 24-byte composite key:
//! ```text
//! [ timestamp_ms: u64 big-endian (8 bytes) | uuid: 16 bytes ]
//! ```
//! so byte order equals time order and a reverse scan yields newest first.
//!
//! Values in both tables are JSON.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::account::Account;
use crate::activity::ActivityEntry;
use crate::error::{Result, WarmupError};

use super::{check_unique, sort_accounts, AccountRepository};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const ACCOUNTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("accounts");
const ACTIVITY: TableDefinition<&[u8], &[u8]> = TableDefinition::new("activity");

fn store_err(e: impl std::fmt::Display) -> WarmupError {
    WarmupError::Store(e.to_string())
}

fn activity_key(ts: DateTime<Utc>, id: Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    let ms = ts.timestamp_millis().max(0) as u64;
    key[..8].copy_from_slice(&ms.to_be_bytes());
    key[8..].copy_from_slice(id.as_bytes());
    key
}

// ---------------------------------------------------------------------------
// AccountDb
// ---------------------------------------------------------------------------

pub struct AccountDb {
    db: Database,
}

impl AccountDb {
    /// Open or create the database at `path`, creating both tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(ACCOUNTS).map_err(store_err)?;
        wt.open_table(ACTIVITY).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    /// Open the store under a project root; fails if `init` never ran.
    pub fn open_root(root: &Path) -> Result<Self> {
        if !crate::paths::warmup_dir(root).is_dir() {
            return Err(WarmupError::NotInitialized);
        }
        Self::open(&crate::paths::db_path(root))
    }
}

impl AccountRepository for AccountDb {
    fn read(&self, id: Uuid) -> Result<Account> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ACCOUNTS).map_err(store_err)?;
        let guard = table
            .get(id.as_bytes().as_slice())
            .map_err(store_err)?
            .ok_or_else(|| WarmupError::AccountNotFound(id.to_string()))?;
        let account: Account = serde_json::from_slice(guard.value())?;
        Ok(account)
    }

    fn write(&self, account: &Account) -> Result<()> {
        let value = serde_json::to_vec(account)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(ACCOUNTS).map_err(store_err)?;
            table
                .insert(account.id.as_bytes().as_slice(), value.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    fn insert(&self, account: &Account) -> Result<()> {
        let value = serde_json::to_vec(account)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(ACCOUNTS).map_err(store_err)?;
            let mut existing = Vec::new();
            for entry in table.iter().map_err(store_err)? {
                let (_, v) = entry.map_err(store_err)?;
                existing.push(serde_json::from_slice::<Account>(v.value())?);
            }
            // an error here drops `wt` uncommitted
            check_unique(&existing, account)?;
            table
                .insert(account.id.as_bytes().as_slice(), value.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Account>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ACCOUNTS).map_err(store_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            let account: Account = serde_json::from_slice(v.value())?;
            result.push(account);
        }
        sort_accounts(&mut result);
        Ok(result)
    }

    fn append_activity(&self, entry: &ActivityEntry) -> Result<()> {
        let key = activity_key(entry.created_at, entry.id);
        let value = serde_json::to_vec(entry)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(ACTIVITY).map_err(store_err)?;
            table
                .insert(key.as_slice(), value.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    fn list_activity(&self, account: Option<Uuid>, limit: usize) -> Result<Vec<ActivityEntry>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ACTIVITY).map_err(store_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)?.rev() {
            if result.len() >= limit {
                break;
            }
            let (_, v) = entry.map_err(store_err)?;
            let activity: ActivityEntry = serde_json::from_slice(v.value())?;
            if account.map_or(true, |id| activity.account_id == id) {
                result.push(activity);
            }
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
