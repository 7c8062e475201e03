use anyhow::Result;
use std::path::{Path, PathBuf};

/// Resolve the state home directory.
///
/// Priority:
/// 1. `--home` flag / `OPENCLAW_HOME` env var (passed in as `explicit`)
/// 2. `~/.openclaw`
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(cc_core::paths::default_home()?),
    }
}
