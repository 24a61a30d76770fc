use std::path::{Path, PathBuf};

/// Resolve the directory holding `.warmup/`.
///
/// `--root` / `WARMUP_ROOT` wins; otherwise walk upward from the cwd and
/// fall back to the cwd itself so `init` has somewhere to write.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(warmup_core::paths::WARMUP_DIR).is_dir())
        .map(Path::to_path_buf)
}
