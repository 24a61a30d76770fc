pub mod account;
pub mod action;
pub mod activity;
pub mod config;
pub mod init;
pub mod status;
pub mod sweep;

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use warmup_core::{
    clock::SystemClock, config::Config, runner::ActionRunner, store::AccountDb,
};

/// Load config and open the account store under `root`.
pub fn open_runner(root: &Path) -> anyhow::Result<(Config, ActionRunner)> {
    let config = Config::load(root).context("failed to load config")?;
    let db = AccountDb::open_root(root).context("failed to open account store")?;
    let runner = ActionRunner::new(Arc::new(db), Arc::new(SystemClock), config.limits.clone());
    Ok((config, runner))
}
