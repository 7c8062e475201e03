use crate::error::{CcError, Result};
use crate::types::RunMode;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Layout constants (relative to the state home, default ~/.openclaw)
// ---------------------------------------------------------------------------

pub const DEFAULT_HOME_DIR: &str = ".openclaw";
pub const WORKSPACE_DIR: &str = "workspace";
pub const DASHBOARD_DIR: &str = "dashboard";
pub const PROJECTS_FILE: &str = "dashboard/projects.json";
pub const CONFIG_FILE: &str = "dashboard/config.yaml";
pub const VAULT_FILE: &str = ".env";

/// Per-project directory holding run logs.
pub const RUN_LOG_DIR: &str = ".command-center";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `~/.openclaw`, or [`CcError::HomeNotFound`] when no home directory is known.
pub fn default_home() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(DEFAULT_HOME_DIR))
        .ok_or(CcError::HomeNotFound)
}

pub fn workspace_dir(home: &Path) -> PathBuf {
    home.join(WORKSPACE_DIR)
}

pub fn dashboard_dir(home: &Path) -> PathBuf {
    home.join(DASHBOARD_DIR)
}

pub fn projects_path(home: &Path) -> PathBuf {
    home.join(PROJECTS_FILE)
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

pub fn vault_path(home: &Path) -> PathBuf {
    home.join(VAULT_FILE)
}

/// `<project>/.command-center/run-<mode>.log`
pub fn run_log_path(project_dir: &Path, mode: RunMode) -> PathBuf {
    project_dir
        .join(RUN_LOG_DIR)
        .join(format!("run-{}.log", mode.as_str()))
}

/// Create the workspace and dashboard directories under `home`.
pub fn ensure_layout(home: &Path) -> Result<()> {
    std::fs::create_dir_all(workspace_dir(home))?;
    std::fs::create_dir_all(dashboard_dir(home))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Workspace containment
// ---------------------------------------------------------------------------

/// Join `relative` onto `workspace`, rejecting anything that could land
/// outside it: empty paths, absolute paths, and `..` components.
pub fn resolve_in_workspace(workspace: &Path, relative: &str) -> Result<PathBuf> {
    let trimmed = relative.trim();
    if trimmed.is_empty() || trimmed.contains('\0') {
        return Err(CcError::InvalidPath(relative.to_string()));
    }
    let mut normal = 0;
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(CcError::InvalidPath(relative.to_string()));
            }
        }
    }
    if normal == 0 {
        return Err(CcError::InvalidPath(relative.to_string()));
    }
    Ok(workspace.join(trimmed))
}

/// Directory name a repository clones into: the last URL segment without
/// `.git`. Handles `https://host/owner/repo.git` and `git@host:owner/repo`.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(|c: char| c == '/' || c == ':').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
