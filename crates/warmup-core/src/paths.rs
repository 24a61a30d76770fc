use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const WARMUP_DIR: &str = ".warmup";
pub const CONFIG_FILE: &str = ".warmup/config.yaml";
pub const DB_FILE: &str = ".warmup/accounts.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn warmup_dir(root: &Path) -> PathBuf {
    root.join(WARMUP_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}
