//! Crash-safe file writes for `.warmup/`.

use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `data` so readers only ever see the old or the new
/// contents. The temp file lives next to the target so the rename stays on
/// one filesystem.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".warmup-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `data` unless `path` already exists. Returns whether it wrote.
pub fn create_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
