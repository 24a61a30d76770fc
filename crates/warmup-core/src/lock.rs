//! Keyed mutual exclusion: one lock per account id.
//!
//! Everything that reads an account's rate state, dispatches an action and
//! writes the result back must run inside [`AccountLocks::with`] for that
//! account. Different accounts never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
pub struct AccountLocks {
    slots: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(id).or_default().clone()
    }

    /// Run `f` while holding the account's lock.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce() -> R) -> R {
        let slot = self.slot(id);
        let _guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }

    /// Drop slots nobody is holding or waiting on.
    pub fn prune(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
