use crate::config::{CommandsConfig, TimeoutsConfig};
use crate::error::Result;
use crate::io;
use crate::runner::{CommandSpec, ProcessOutput, ProcessRunner};
use crate::types::RunMode;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of one executor step (install or the mode command).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub name: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl StepReport {
    fn from_output(name: &str, command: String, out: ProcessOutput) -> Self {
        Self {
            name: name.to_string(),
            command,
            exit_code: out.exit_code,
            stdout: out.stdout,
            stderr: out.stderr,
            timed_out: out.timed_out,
        }
    }

    /// A step whose process never started.
    fn not_started(name: &str, command: String, reason: String) -> Self {
        Self {
            name: name.to_string(),
            command,
            exit_code: None,
            stdout: String::new(),
            stderr: reason,
            timed_out: false,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    pub fn failure_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }

    fn transcript(&self) -> String {
        format!("== {} ==\n{}\n{}\n", self.command, self.stdout, self.stderr)
    }
}

/// Both steps of one build attempt. `run` is `None` when install failed.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub mode: RunMode,
    pub install: StepReport,
    pub run: Option<StepReport>,
}

impl ExecutionReport {
    pub fn success(&self) -> bool {
        self.install.success() && self.run.as_ref().is_some_and(StepReport::success)
    }

    /// The step the failure is attributed to: `"install"` or the mode name.
    pub fn failed_stage(&self) -> Option<&str> {
        if !self.install.success() {
            Some("install")
        } else if self.success() {
            None
        } else {
            Some(self.mode.as_str())
        }
    }

    fn failed_step(&self) -> Option<&StepReport> {
        if !self.install.success() {
            Some(&self.install)
        } else {
            self.run.as_ref().filter(|r| !r.success())
        }
    }

    /// stderr (or stdout) of the failing step; empty on success.
    pub fn failure_text(&self) -> &str {
        self.failed_step().map_or("", StepReport::failure_text)
    }

    /// stdout of the mode command.
    pub fn output(&self) -> &str {
        self.run.as_ref().map_or("", |r| r.stdout.as_str())
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs the install command followed by the mode command in a project
/// directory and records the transcript to a log file.
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn ProcessRunner>,
    commands: CommandsConfig,
    timeouts: TimeoutsConfig,
}

impl Executor {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        commands: CommandsConfig,
        timeouts: TimeoutsConfig,
    ) -> Self {
        Self {
            runner,
            commands,
            timeouts,
        }
    }

    /// Run one attempt. The log at `log_path` is overwritten by the install
    /// step and appended to by the mode step. Only log I/O produces an `Err`;
    /// failing commands are reported in the [`ExecutionReport`].
    pub async fn execute(
        &self,
        project_dir: &Path,
        mode: RunMode,
        log_path: &Path,
    ) -> Result<ExecutionReport> {
        let install = self
            .step(
                "install",
                &self.commands.install,
                project_dir,
                self.timeouts.install(),
            )
            .await?;
        io::write_text(log_path, &install.transcript())?;

        if !install.success() {
            tracing::info!(dir = %project_dir.display(), "install failed, skipping {mode}");
            return Ok(ExecutionReport {
                mode,
                install,
                run: None,
            });
        }

        let run = self
            .step(
                mode.as_str(),
                self.commands.for_mode(mode),
                project_dir,
                self.timeouts.for_mode(mode),
            )
            .await?;
        io::append_text(log_path, &run.transcript())?;

        Ok(ExecutionReport {
            mode,
            install,
            run: Some(run),
        })
    }

    async fn step(
        &self,
        name: &str,
        argv: &[String],
        dir: &Path,
        timeout: std::time::Duration,
    ) -> Result<StepReport> {
        let spec = CommandSpec::from_argv(argv, dir)?.timeout(timeout);
        let command = spec.display();
        tracing::debug!(step = name, command = %command, "executor step");
        Ok(match self.runner.run(&spec).await {
            Ok(out) => StepReport::from_output(name, command, out),
            Err(e) => StepReport::not_started(name, command, e.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;
    use tempfile::TempDir;

    fn executor(runner: Arc<ScriptedRunner>) -> Executor {
        Executor::new(runner, CommandsConfig::default(), TimeoutsConfig::default())
    }

    #[tokio::test]
    async fn success_runs_both_steps_and_writes_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join(".command-center/run-build.log");
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("npm install", ProcessOutput::ok("added 3 packages"))
                .on("npm run build", ProcessOutput::ok("built in 2s")),
        );
        let report = executor(runner.clone())
            .execute(dir.path(), RunMode::Build, &log)
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(report.failed_stage(), None);
        assert_eq!(report.output(), "built in 2s");
        assert_eq!(runner.command_lines(), vec!["npm install", "npm run build"]);
        assert_eq!(
            std::fs::read_to_string(&log).unwrap(),
            "== npm install ==\nadded 3 packages\n\n== npm run build ==\nbuilt in 2s\n\n"
        );
    }

    #[tokio::test]
    async fn install_failure_skips_run() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        let runner =
            Arc::new(ScriptedRunner::new().on("npm install", ProcessOutput::failed(1, "ERESOLVE")));
        let report = executor(runner.clone())
            .execute(dir.path(), RunMode::Preview, &log)
            .await
            .unwrap();

        assert!(!report.success());
        assert!(report.run.is_none());
        assert_eq!(report.failed_stage(), Some("install"));
        assert_eq!(report.failure_text(), "ERESOLVE");
        assert_eq!(runner.count("npm run dev"), 0);
    }

    #[tokio::test]
    async fn run_failure_is_attributed_to_mode() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        let runner = Arc::new(
            ScriptedRunner::new().on("npm run dev", ProcessOutput::failed(2, "SyntaxError")),
        );
        let report = executor(runner)
            .execute(dir.path(), RunMode::Preview, &log)
            .await
            .unwrap();
        assert_eq!(report.failed_stage(), Some("preview"));
        assert_eq!(report.failure_text(), "SyntaxError");
    }

    #[tokio::test]
    async fn log_is_overwritten_per_attempt() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        std::fs::write(&log, "stale attempt\n").unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        executor(runner)
            .execute(dir.path(), RunMode::Build, &log)
            .await
            .unwrap();
        let text = std::fs::read_to_string(&log).unwrap();
        assert!(!text.contains("stale attempt"));
        assert!(text.starts_with("== npm install =="));
    }

    #[tokio::test]
    async fn timeout_and_spawn_failure_are_failed_steps() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        let runner = Arc::new(ScriptedRunner::new().on(
            "npm run build",
            ProcessOutput::timed_out(std::time::Duration::from_secs(900)),
        ));
        let report = executor(runner)
            .execute(dir.path(), RunMode::Build, &log)
            .await
            .unwrap();
        assert!(!report.success());
        assert!(report.failure_text().contains("timed out"));

        let runner = Arc::new(ScriptedRunner::new().on_spawn_error("npm", "No such file"));
        let report = executor(runner)
            .execute(dir.path(), RunMode::Build, &log)
            .await
            .unwrap();
        assert_eq!(report.failed_stage(), Some("install"));
        assert!(report.failure_text().contains("No such file"));
    }
}
