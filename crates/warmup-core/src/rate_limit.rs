//! Sliding one-minute window limiter for platform API calls, keyed per
//! account.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

fn window() -> Duration {
    Duration::minutes(1)
}

pub struct RateLimiter {
    calls_per_minute: u32,
    calls: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(calls_per_minute: u32) -> Self {
        Self {
            calls_per_minute,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls_per_minute(&self) -> u32 {
        self.calls_per_minute
    }

    fn with_window<R>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut VecDeque<DateTime<Utc>>) -> R,
    ) -> R {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        let window_calls = calls.entry(key.to_string()).or_default();
        let cutoff = now - window();
        while window_calls.front().is_some_and(|t| *t <= cutoff) {
            window_calls.pop_front();
        }
        f(window_calls)
    }

    pub fn can_call(&self, key: &str, now: DateTime<Utc>) -> bool {
        let limit = self.calls_per_minute as usize;
        self.with_window(key, now, |w| w.len() < limit)
    }

    pub fn record_call(&self, key: &str, now: DateTime<Utc>) {
        self.with_window(key, now, |w| w.push_back(now));
    }

    /// Check and record in one step. Returns false without recording when
    /// the window is full.
    pub fn try_acquire(&self, key: &str, now: DateTime<Utc>) -> bool {
        let limit = self.calls_per_minute as usize;
        self.with_window(key, now, |w| {
            if w.len() < limit {
                w.push_back(now);
                true
            } else {
                false
            }
        })
    }

    pub fn remaining(&self, key: &str, now: DateTime<Utc>) -> u32 {
        let limit = self.calls_per_minute as usize;
        self.with_window(key, now, |w| limit.saturating_sub(w.len()) as u32)
    }

    /// When a slot frees up, or `None` if one is free now.
    pub fn reset_time(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let limit = self.calls_per_minute as usize;
        self.with_window(key, now, |w| {
            if w.len() < limit {
                None
            } else {
                w.front().map(|oldest| *oldest + window())
            }
        })
    }
}
