use crate::error::{CcError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;

/// Used when a caller does not set a timeout of its own.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// A single child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            env: Vec::new(),
        }
    }

    /// Build from an argv whose first element is the program.
    pub fn from_argv(argv: &[String], cwd: &Path) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CcError::Validation("empty command".into()))?;
        Ok(Self::new(program.clone(), cwd).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// `program arg1 arg2 …`, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// ProcessOutput
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed (signal or timeout).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self {
            exit_code: None,
            stderr: format!("timed out after {}s", after.as_secs()),
            timed_out: true,
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// stderr when it has content, stdout otherwise.
    pub fn failure_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessRunner
// ---------------------------------------------------------------------------

/// Runs child processes to completion. A non-zero exit is a normal
/// [`ProcessOutput`]; only a failure to start the process is an `Err`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput>;
}

/// Spawns real processes with tokio. On unix each command leads its own
/// process group, and the whole group is killed when the timeout expires so
/// servers started under `npm run dev` do not outlive it.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        tracing::debug!(command = %spec.display(), cwd = %spec.cwd.display(), "spawning");
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        for (k, v) in &spec.env {
            cmd.env(k, v);
        }
        let child = cmd.spawn().map_err(|e| CcError::Spawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        let pid = child.id();

        // Dropping the future drops the child, which kills it.
        match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(ProcessOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    timed_out: false,
                })
            }
            Err(_) => {
                tracing::warn!(command = %spec.display(), "command timed out");
                if let Some(pgid) = pid {
                    kill_process_group(pgid);
                }
                Ok(ProcessOutput::timed_out(spec.timeout))
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    // SAFETY: killpg takes plain integers and touches no memory.
    let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        tracing::debug!(pgid, error = %err, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

enum Scripted {
    Output(ProcessOutput),
    SpawnError(String),
}

struct Rule {
    needle: String,
    replies: VecDeque<Scripted>,
}

/// In-memory [`ProcessRunner`] that records every call and answers from a
/// script instead of spawning anything.
///
/// Each rule matches commands whose `display()` contains its needle; the first
/// matching rule wins. A rule's replies are consumed in order and the last one
/// repeats. Commands that match no rule succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, needle: &str, output: ProcessOutput) -> Self {
        self.push(needle, Scripted::Output(output));
        self
    }

    pub fn on_spawn_error(self, needle: &str, reason: &str) -> Self {
        self.push(needle, Scripted::SpawnError(reason.to_string()));
        self
    }

    fn push(&self, needle: &str, reply: Scripted) {
        let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        match rules.iter_mut().find(|r| r.needle == needle) {
            Some(rule) => rule.replies.push_back(reply),
            None => rules.push(Rule {
                needle: needle.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every recorded command as `program arg…`.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::display).collect()
    }

    /// Number of recorded commands containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(spec.clone());
        let line = spec.display();
        let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        let Some(rule) = rules.iter_mut().find(|r| line.contains(&r.needle)) else {
            return Ok(ProcessOutput::ok(""));
        };
        let popped = if rule.replies.len() > 1 {
            rule.replies.pop_front()
        } else {
            None
        };
        let reply = popped.as_ref().or(rule.replies.front());
        match reply {
            Some(Scripted::Output(out)) => Ok(out.clone()),
            Some(Scripted::SpawnError(reason)) => Err(CcError::Spawn {
                program: spec.program.clone(),
                reason: reason.clone(),
            }),
            None => Ok(ProcessOutput::ok("")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
