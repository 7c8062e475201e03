use crate::config::{Config, PreviewConfig};
use crate::error::Result;
use crate::executor::{ExecutionReport, Executor};
use crate::io;
use crate::lock::ProjectLocks;
use crate::paths;
use crate::registry::ProjectRegistry;
use crate::repair::{truncate_chars, RepairInvoker, RepairOutcome, RepairRequest};
use crate::runner::ProcessRunner;
use crate::types::RunMode;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Upper bound on repair-then-retry cycles per run. A failing retry is final.
pub const MAX_REPAIR_CYCLES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Success,
    Error,
}

/// Final state of one orchestrated run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutcome {
    pub status: BuildStatus,
    pub mode: RunMode,
    pub log_path: PathBuf,
    pub output: String,
    /// The repair/retry path ran, whatever its result.
    pub healed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair: Option<serde_json::Value>,
    #[serde(skip)]
    pub attempts: u32,
}

impl BuildOutcome {
    pub fn success(&self) -> bool {
        self.status == BuildStatus::Success
    }
}

/// Executor + repair agent in a bounded self-healing pipeline.
pub struct Orchestrator {
    registry: Arc<ProjectRegistry>,
    executor: Executor,
    repairer: Arc<dyn RepairInvoker>,
    locks: ProjectLocks,
    preview: PreviewConfig,
    transcript_limit: usize,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ProjectRegistry>,
        runner: Arc<dyn ProcessRunner>,
        repairer: Arc<dyn RepairInvoker>,
        locks: ProjectLocks,
        config: &Config,
    ) -> Self {
        Self {
            registry,
            executor: Executor::new(runner, config.commands.clone(), config.timeouts.clone()),
            repairer,
            locks,
            preview: config.preview.clone(),
            transcript_limit: config.repair.transcript_limit,
        }
    }

    /// Build or preview project `id`. A missing project directory is
    /// `ProjectNotFound` and nothing runs. A failed build is an `Ok` outcome
    /// with `status: error`.
    pub async fn run(&self, id: &str, mode: RunMode) -> Result<BuildOutcome> {
        let (relative, dir) = self.registry.resolve_dir(id)?;
        let _guard = self.locks.lock(&dir).await;
        tracing::info!(project = %relative, %mode, "run started");

        if mode == RunMode::Preview {
            self.scaffold_preview(&dir)?;
        }

        let log_path = paths::run_log_path(&dir, mode);
        let mut attempts = 1;
        let mut report = self.executor.execute(&dir, mode, &log_path).await?;
        let mut healed = false;
        let mut repair = None;

        for _ in 0..MAX_REPAIR_CYCLES {
            if report.success() {
                break;
            }
            healed = true;
            tracing::info!(
                project = %relative,
                stage = report.failed_stage().unwrap_or("unknown"),
                "attempt failed, invoking repair"
            );
            let request = RepairRequest {
                project: relative.clone(),
                project_dir: dir.clone(),
                mode,
                transcript: truncate_chars(report.failure_text(), self.transcript_limit)
                    .to_string(),
            };
            let outcome = self.repairer.repair(&request).await;
            match &outcome {
                RepairOutcome::Completed(reply) => {
                    tracing::info!(project = %relative, reply = %reply.summary(), "repair completed")
                }
                RepairOutcome::Unavailable(reason) => {
                    tracing::warn!(project = %relative, %reason, "repair unavailable, retrying anyway")
                }
            }
            repair = Some(outcome.to_json());
            report = self.executor.execute(&dir, mode, &log_path).await?;
            attempts += 1;
        }

        let outcome = self.finish(mode, log_path, report, healed, repair, attempts);
        tracing::info!(
            project = %relative,
            %mode,
            success = outcome.success(),
            healed,
            "run finished"
        );
        Ok(outcome)
    }

    fn scaffold_preview(&self, dir: &Path) -> Result<()> {
        let entry = dir.join(&self.preview.entry_file);
        if io::write_if_missing(&entry, self.preview.placeholder.as_bytes())? {
            tracing::info!(file = %entry.display(), "wrote preview placeholder");
        }
        Ok(())
    }

    fn finish(
        &self,
        mode: RunMode,
        log_path: PathBuf,
        report: ExecutionReport,
        healed: bool,
        repair: Option<serde_json::Value>,
        attempts: u32,
    ) -> BuildOutcome {
        if report.success() {
            return BuildOutcome {
                status: BuildStatus::Success,
                mode,
                log_path,
                output: report.output().to_string(),
                healed,
                message: None,
                repair,
                attempts,
            };
        }
        let text = truncate_chars(report.failure_text(), self.transcript_limit);
        let message = if text.trim().is_empty() {
            "runner failed".to_string()
        } else {
            text.to_string()
        };
        BuildOutcome {
            status: BuildStatus::Error,
            mode,
            log_path,
            output: report.output().to_string(),
            healed,
            message: Some(message),
            repair,
            attempts,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CcError;
    use crate::runner::{ProcessOutput, ScriptedRunner};
    use async_trait::async_trait;
    use openclaw_agent::AgentReply;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every request and answers with a fixed outcome.
    struct RecordingRepair {
        outcome: RepairOutcome,
        requests: Mutex<Vec<RepairRequest>>,
    }

    impl RecordingRepair {
        fn new(outcome: RepairOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<RepairRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepairInvoker for RecordingRepair {
        async fn repair(&self, request: &RepairRequest) -> RepairOutcome {
            self.requests.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    struct Fixture {
        home: TempDir,
        registry: Arc<ProjectRegistry>,
        project_id: String,
    }

    fn fixture() -> Fixture {
        let home = TempDir::new().unwrap();
        let registry = Arc::new(ProjectRegistry::new(home.path()));
        let project_id = registry.create("Site", "site").unwrap().id;
        Fixture {
            home,
            registry,
            project_id,
        }
    }

    fn orchestrator(
        fx: &Fixture,
        runner: Arc<ScriptedRunner>,
        repair: Arc<RecordingRepair>,
    ) -> Orchestrator {
        Orchestrator::new(
            fx.registry.clone(),
            runner,
            repair,
            ProjectLocks::new(),
            &Config::default(),
        )
    }

    fn completed() -> RepairOutcome {
        RepairOutcome::Completed(AgentReply::Raw("rewrote package.json".into()))
    }

    #[tokio::test]
    async fn passing_build_is_not_healed() {
        let fx = fixture();
        let runner = Arc::new(ScriptedRunner::new().on("npm run build", ProcessOutput::ok("ok")));
        let repair = RecordingRepair::new(completed());
        let outcome = orchestrator(&fx, runner.clone(), repair.clone())
            .run(&fx.project_id, RunMode::Build)
            .await
            .unwrap();

        assert!(outcome.success());
        assert!(!outcome.healed);
        assert_eq!(outcome.output, "ok");
        assert_eq!(outcome.attempts, 1);
        assert!(repair.requests().is_empty());
        assert_eq!(runner.count("npm run build"), 1);
        assert_eq!(
            outcome.log_path,
            fx.home.path().join("workspace/site/.command-center/run-build.log")
        );
    }

    #[tokio::test]
    async fn always_failing_build_repairs_once_and_retries_once() {
        let fx = fixture();
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("npm run build", ProcessOutput::failed(1, "first failure"))
                .on("npm run build", ProcessOutput::failed(1, "second failure")),
        );
        let repair = RecordingRepair::new(completed());
        let outcome = orchestrator(&fx, runner.clone(), repair.clone())
            .run(&fx.project_id, RunMode::Build)
            .await
            .unwrap();

        assert!(!outcome.success());
        assert!(outcome.healed);
        assert_eq!(outcome.message.as_deref(), Some("second failure"));
        assert_eq!(runner.count("npm run build"), 2);
        assert_eq!(runner.count("npm install"), 2);
        let requests = repair.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].transcript, "first failure");
        assert_eq!(requests[0].project, "site");
        assert_eq!(outcome.repair.as_ref().unwrap()["status"], "completed");
    }

    #[tokio::test]
    async fn fail_then_pass_is_healed_success() {
        let fx = fixture();
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("npm run build", ProcessOutput::failed(1, "broken"))
                .on("npm run build", ProcessOutput::ok("fixed")),
        );
        let repair = RecordingRepair::new(completed());
        let outcome = orchestrator(&fx, runner, repair.clone())
            .run(&fx.project_id, RunMode::Build)
            .await
            .unwrap();

        assert!(outcome.success());
        assert!(outcome.healed);
        assert_eq!(outcome.output, "fixed");
        assert_eq!(outcome.attempts, 2);
        assert_eq!(repair.requests().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_repair_still_retries() {
        let fx = fixture();
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("npm run build", ProcessOutput::failed(1, "broken"))
                .on("npm run build", ProcessOutput::ok("flaky but fine")),
        );
        let repair = RecordingRepair::new(RepairOutcome::Unavailable("gateway down".into()));
        let outcome = orchestrator(&fx, runner.clone(), repair)
            .run(&fx.project_id, RunMode::Build)
            .await
            .unwrap();
        assert!(outcome.success());
        assert!(outcome.healed);
        assert_eq!(runner.count("npm run build"), 2);
        assert_eq!(outcome.repair.unwrap()["reason"], "gateway down");
    }

    #[tokio::test]
    async fn missing_project_never_executes() {
        let fx = fixture();
        let runner = Arc::new(ScriptedRunner::new());
        let repair = RecordingRepair::new(completed());
        let err = orchestrator(&fx, runner.clone(), repair)
            .run("does-not-exist", RunMode::Build)
            .await
            .unwrap_err();
        assert!(matches!(err, CcError::ProjectNotFound(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn preview_scaffolds_entry_file() {
        let fx = fixture();
        let runner = Arc::new(ScriptedRunner::new());
        let repair = RecordingRepair::new(completed());
        let outcome = orchestrator(&fx, runner.clone(), repair)
            .run(&fx.project_id, RunMode::Preview)
            .await
            .unwrap();
        assert!(outcome.success());
        assert_eq!(runner.count("npm run dev"), 1);
        let entry = fx.home.path().join("workspace/site/index.js");
        assert_eq!(
            std::fs::read_to_string(entry).unwrap(),
            "console.log(\"Preview successful\");"
        );
    }

    #[tokio::test]
    async fn failure_text_is_truncated_for_repair_and_message() {
        let fx = fixture();
        let huge = "e".repeat(10_000);
        let runner =
            Arc::new(ScriptedRunner::new().on("npm install", ProcessOutput::failed(1, huge)));
        let repair = RecordingRepair::new(completed());
        let outcome = orchestrator(&fx, runner, repair.clone())
            .run(&fx.project_id, RunMode::Build)
            .await
            .unwrap();
        assert_eq!(repair.requests()[0].transcript.len(), 6000);
        assert_eq!(outcome.message.unwrap().len(), 6000);
    }

    #[tokio::test]
    async fn silent_failure_reports_runner_failed() {
        let fx = fixture();
        let runner = Arc::new(ScriptedRunner::new().on("npm run build", ProcessOutput::failed(1, "")));
        let repair = RecordingRepair::new(completed());
        let outcome = orchestrator(&fx, runner, repair)
            .run(&fx.project_id, RunMode::Build)
            .await
            .unwrap();
        assert_eq!(outcome.message.as_deref(), Some("runner failed"));
    }

    #[test]
    fn outcome_serializes_like_the_api() {
        let outcome = BuildOutcome {
            status: BuildStatus::Error,
            mode: RunMode::Preview,
            log_path: PathBuf::from("/w/site/.command-center/run-preview.log"),
            output: String::new(),
            healed: true,
            message: Some("boom".into()),
            repair: None,
            attempts: 2,
        };
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["mode"], "preview");
        assert_eq!(v["healed"], true);
        assert_eq!(v["logPath"], "/w/site/.command-center/run-preview.log");
        assert!(v.get("repair").is_none());
        assert!(v.get("attempts").is_none());
    }
}
