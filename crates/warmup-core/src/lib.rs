pub mod account;
pub mod activity;
pub mod clock;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod lock;
pub mod paths;
pub mod rate_limit;
pub mod runner;
pub mod stage;
pub mod store;
pub mod sweep;
pub mod types;

pub use error::{Result, WarmupError};
