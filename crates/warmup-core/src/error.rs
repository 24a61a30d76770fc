use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarmupError {
    #[error("not initialized: run 'warmup init'")]
    NotInitialized,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("account already exists: {0}")]
    AccountExists(String),

    #[error("invalid username '{0}': 3-20 characters of letters, digits, '_' or '-'")]
    InvalidUsername(String),

    #[error("invalid warmup stage: {0}")]
    InvalidStage(String),

    #[error("invalid account status: {0}")]
    InvalidStatus(String),

    #[error("invalid action kind: {0}")]
    InvalidActionKind(String),

    #[error("invalid status transition from {from} to {to}: {reason}")]
    InvalidStatusTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("account store error: {0}")]
    Store(String),

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WarmupError>;
