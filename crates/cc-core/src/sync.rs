use crate::error::{CcError, Result};
use crate::io;
use crate::lock::ProjectLocks;
use crate::paths;
use crate::runner::{CommandSpec, ProcessOutput, ProcessRunner};
use crate::types::SyncAction;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_COMMIT_MESSAGE: &str = "publish";

const GIT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResult {
    pub action: SyncAction,
    pub project_dir: PathBuf,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub project_dir: PathBuf,
    pub branch: String,
    /// False when the tree was clean and no commit was made.
    pub committed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub name: String,
    pub action: SyncAction,
    pub project_dir: PathBuf,
    pub branch: String,
}

/// Reconciles workspace directories with remote git repositories through the
/// git CLI.
pub struct Synchronizer {
    workspace: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    locks: ProjectLocks,
    env: Vec<(String, String)>,
}

impl Synchronizer {
    pub fn new(workspace: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>, locks: ProjectLocks) -> Self {
        Self {
            workspace: workspace.into(),
            runner,
            locks,
            env: vec![("GIT_TERMINAL_PROMPT".into(), "0".into())],
        }
    }

    /// Extra environment for every git command (e.g. author identity).
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Clone into `path_relative` when it is not a repository yet, otherwise
    /// fetch, switch to `branch` and pull.
    pub async fn pull(&self, path_relative: &str, repo_url: &str, branch: &str) -> Result<PullResult> {
        let repo_url = require_url(repo_url)?;
        let branch = branch_or_default(branch);
        let dir = self.project_dir(path_relative)?;
        let _guard = self.locks.lock(&dir).await;
        tracing::info!(dir = %dir.display(), %branch, "git pull started");

        let action = if dir.join(".git").exists() {
            self.update(&dir, repo_url, &branch).await?;
            SyncAction::Pulled
        } else {
            io::ensure_dir(&dir)?;
            let removed = io::clear_dir(&dir)?;
            if removed > 0 {
                tracing::warn!(dir = %dir.display(), removed, "cleared non-repository directory before clone");
            }
            let target = dir.to_string_lossy().into_owned();
            self.git(
                &self.workspace,
                &["clone", "--branch", &branch, repo_url, &target],
            )
            .await?;
            SyncAction::Cloned
        };

        tracing::info!(dir = %dir.display(), %action, "git pull finished");
        Ok(PullResult {
            action,
            project_dir: dir,
            branch,
        })
    }

    /// Commit local changes (if any) and push `branch` to `origin`.
    pub async fn publish(
        &self,
        path_relative: &str,
        repo_url: &str,
        branch: &str,
        message: &str,
    ) -> Result<PublishResult> {
        let repo_url = require_url(repo_url)?;
        let branch = branch_or_default(branch);
        let message = match message.trim() {
            "" => DEFAULT_COMMIT_MESSAGE,
            m => m,
        };
        let dir = self.project_dir(path_relative)?;
        let _guard = self.locks.lock(&dir).await;
        tracing::info!(dir = %dir.display(), %branch, "git publish started");

        io::ensure_dir(&dir)?;
        if !dir.join(".git").exists() {
            self.git(&dir, &["init"]).await?;
        }
        self.ensure_origin(&dir, repo_url).await?;

        self.git(&dir, &["add", "."]).await?;
        let status = self.git(&dir, &["status", "--porcelain"]).await?;
        let committed = !status.stdout.trim().is_empty();
        if committed {
            self.git(&dir, &["commit", "-m", message]).await?;
        } else {
            tracing::debug!(dir = %dir.display(), "nothing to commit");
        }

        self.switch_branch(&dir, &branch, None).await?;

        let upstream = format!("{branch}@{{upstream}}");
        let tracked = self
            .try_git(&dir, &["rev-parse", "--abbrev-ref", "--symbolic-full-name", &upstream])
            .await?
            .success();
        if tracked {
            self.git(&dir, &["push", "origin", &branch]).await?;
        } else {
            self.git(&dir, &["push", "--set-upstream", "origin", &branch]).await?;
        }

        tracing::info!(dir = %dir.display(), committed, "git publish finished");
        Ok(PublishResult {
            project_dir: dir,
            branch,
            committed,
        })
    }

    /// Pull a repository into a workspace directory named after it.
    pub async fn import(&self, repo_url: &str, branch: &str) -> Result<ImportResult> {
        let repo_url = require_url(repo_url)?;
        let name = paths::repo_name_from_url(repo_url).ok_or_else(|| {
            CcError::Validation(format!("cannot derive a directory name from '{repo_url}'"))
        })?;
        let pulled = self.pull(&name, repo_url, branch).await?;
        Ok(ImportResult {
            name,
            action: pulled.action,
            project_dir: pulled.project_dir,
            branch: pulled.branch,
        })
    }

    // -- internals ----------------------------------------------------------

    fn project_dir(&self, path_relative: &str) -> Result<PathBuf> {
        if path_relative.trim().is_empty() {
            return Err(CcError::Validation(
                "projectPathRelative and repoUrl required".into(),
            ));
        }
        paths::resolve_in_workspace(&self.workspace, path_relative)
    }

    async fn update(&self, dir: &Path, repo_url: &str, branch: &str) -> Result<()> {
        self.ensure_origin(dir, repo_url).await?;
        self.git(dir, &["fetch", "origin", branch]).await?;
        let track = format!("origin/{branch}");
        self.switch_branch(dir, branch, Some(&track)).await?;
        self.git(dir, &["pull", "origin", branch]).await?;
        Ok(())
    }

    /// Add `origin` when missing. An existing origin pointing elsewhere is
    /// left alone.
    async fn ensure_origin(&self, dir: &Path, repo_url: &str) -> Result<()> {
        let remotes = self.git(dir, &["remote"]).await?;
        if !remotes.stdout.lines().any(|r| r.trim() == "origin") {
            self.git(dir, &["remote", "add", "origin", repo_url]).await?;
            return Ok(());
        }
        let current = self.git(dir, &["remote", "get-url", "origin"]).await?;
        let current = current.stdout.trim();
        if current != repo_url {
            tracing::warn!(
                dir = %dir.display(),
                origin = %current,
                requested = %repo_url,
                "origin points at a different remote; leaving it unchanged"
            );
        }
        Ok(())
    }

    /// Check out `branch`, creating it when it does not exist locally. When
    /// `track` is given the new branch tracks that remote ref.
    async fn switch_branch(&self, dir: &Path, branch: &str, track: Option<&str>) -> Result<()> {
        let head = self.try_git(dir, &["symbolic-ref", "--short", "HEAD"]).await?;
        if head.success() && head.stdout.trim() == branch {
            return Ok(());
        }
        if self.try_git(dir, &["checkout", branch]).await?.success() {
            return Ok(());
        }
        match track {
            Some(track) => self.git(dir, &["checkout", "-b", branch, "--track", track]).await?,
            None => self.git(dir, &["checkout", "-b", branch]).await?,
        };
        Ok(())
    }

    fn spec(&self, dir: &Path, args: &[&str]) -> CommandSpec {
        let mut spec = CommandSpec::new("git", dir)
            .args(args.iter().copied())
            .timeout(GIT_TIMEOUT);
        for (k, v) in &self.env {
            spec = spec.env(k.clone(), v.clone());
        }
        spec
    }

    /// Run git and hand back the output whatever the exit code.
    async fn try_git(&self, dir: &Path, args: &[&str]) -> Result<ProcessOutput> {
        let spec = self.spec(dir, args);
        tracing::debug!(command = %spec.display(), "git");
        self.runner.run(&spec).await
    }

    /// Run git; a non-zero exit aborts with [`CcError::Git`].
    async fn git(&self, dir: &Path, args: &[&str]) -> Result<ProcessOutput> {
        let out = self.try_git(dir, args).await?;
        if out.success() {
            return Ok(out);
        }
        let command = format!("git {}", args.join(" "));
        let text = out.failure_text().trim();
        let message = if text.is_empty() {
            match out.exit_code {
                Some(code) => format!("{command} exited with code {code}"),
                None => format!("{command} was terminated"),
            }
        } else {
            text.to_string()
        };
        Err(CcError::Git { command, message })
    }
}

fn require_url(repo_url: &str) -> Result<&str> {
    match repo_url.trim() {
        "" => Err(CcError::Validation(
            "projectPathRelative and repoUrl required".into(),
        )),
        url => Ok(url),
    }
}

fn branch_or_default(branch: &str) -> String {
    match branch.trim() {
        "" => DEFAULT_BRANCH.to_string(),
        b => b.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
