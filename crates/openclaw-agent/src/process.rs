use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::types::AgentOptions;
use crate::{AgentError, Result};

/// Extra time granted past the CLI's own `--timeout` before the process is
/// killed from this side.
pub(crate) const KILL_GRACE: Duration = Duration::from_secs(10);

// ─── AgentProcess ─────────────────────────────────────────────────────────

/// A running `openclaw agent` subprocess.
///
/// Stdout is read to completion by [`AgentProcess::finish`]; stderr is
/// drained by a background task and surfaced when the process exits non-zero.
pub(crate) struct AgentProcess {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
}

impl AgentProcess {
    /// Spawn the real agent CLI with the prompt passed as `--message`.
    pub(crate) fn spawn(prompt: &str, opts: &AgentOptions) -> Result<Self> {
        Self::from_command(build_command(prompt, opts))
    }

    /// Spawn an arbitrary command in place of the agent CLI.
    #[cfg(test)]
    pub(crate) fn spawn_command(cmd: Command) -> Result<Self> {
        Self::from_command(cmd)
    }

    fn from_command(mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| AgentError::Spawn(e.to_string()))?;

        let stdout = child.stdout.take();
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut stderr = stderr;
                let _ = stderr.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).trim_end().to_string()
            })
        });

        Ok(Self {
            child,
            stdout,
            stderr_task,
        })
    }

    /// Read stdout to EOF and wait for exit, bounded by `timeout`.
    ///
    /// On expiry the child is killed and [`AgentError::Timeout`] returned.
    pub(crate) async fn finish(mut self, timeout: Duration) -> Result<String> {
        match tokio::time::timeout(timeout, self.collect()).await {
            Ok(result) => result,
            Err(_) => {
                self.kill().await;
                Err(AgentError::Timeout(timeout))
            }
        }
    }

    async fn collect(&mut self) -> Result<String> {
        let mut raw = Vec::new();
        if let Some(mut stdout) = self.stdout.take() {
            stdout.read_to_end(&mut raw).await?;
        }
        let out = String::from_utf8_lossy(&raw).into_owned();

        let status = self.child.wait().await?;
        let err = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return Ok(out);
        }

        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let output = if err.trim().is_empty() { out } else { err };
        Err(AgentError::Exit { code, output })
    }

    /// Kill the subprocess (best-effort; errors are ignored).
    pub(crate) async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}

// ─── Command builder ──────────────────────────────────────────────────────

pub(crate) fn build_command(prompt: &str, opts: &AgentOptions) -> Command {
    let exe = opts.path_to_executable.as_deref().unwrap_or("openclaw");
    let mut cmd = Command::new(exe);

    cmd.arg("agent")
        .arg("--agent")
        .arg(&opts.agent_id)
        .arg("--message")
        .arg(prompt)
        .arg("--json")
        .arg("--timeout")
        .arg(opts.timeout.as_secs().to_string())
        .arg("--thinking")
        .arg(&opts.thinking);

    // The CLI reads its gateway token from the environment; make sure the
    // variable exists even when unset so the CLI does not prompt.
    cmd.env(
        "OPENCLAW_GATEWAY_TOKEN",
        std::env::var("OPENCLAW_GATEWAY_TOKEN").unwrap_or_default(),
    );
    for (k, v) in &opts.env {
        cmd.env(k, v);
    }

    if let Some(cwd) = &opts.cwd {
        cmd.current_dir(cwd);
    }

    cmd
}
