use crate::types::RunMode;
use async_trait::async_trait;
use openclaw_agent::{agent_run, AgentOptions, AgentReply, RunConfig};
use std::path::PathBuf;

/// A request to repair one project after a failed attempt.
#[derive(Debug, Clone)]
pub struct RepairRequest {
    /// Registered `pathRelative` (or directory name) of the project.
    pub project: String,
    pub project_dir: PathBuf,
    pub mode: RunMode,
    /// Failure transcript, already truncated.
    pub transcript: String,
}

/// What the repair agent did. Never an error: an unreachable or failing agent
/// is [`RepairOutcome::Unavailable`] and the caller proceeds to its retry.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    Completed(AgentReply),
    Unavailable(String),
}

impl RepairOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RepairOutcome::Completed(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RepairOutcome::Completed(reply) => {
                serde_json::json!({ "status": "completed", "reply": reply.to_json() })
            }
            RepairOutcome::Unavailable(reason) => {
                serde_json::json!({ "status": "unavailable", "reason": reason })
            }
        }
    }
}

#[async_trait]
pub trait RepairInvoker: Send + Sync {
    async fn repair(&self, request: &RepairRequest) -> RepairOutcome;
}

/// Forwards repair prompts to the `openclaw agent` CLI.
#[derive(Debug, Clone)]
pub struct AgentRepairInvoker {
    options: AgentOptions,
}

impl AgentRepairInvoker {
    pub fn new(options: AgentOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl RepairInvoker for AgentRepairInvoker {
    async fn repair(&self, request: &RepairRequest) -> RepairOutcome {
        let mut opts = self.options.clone();
        opts.cwd = Some(request.project_dir.clone());
        let prompt = build_repair_prompt(&request.project, request.mode, &request.transcript);
        match agent_run(RunConfig { prompt, opts }).await {
            Ok(result) => {
                tracing::info!(
                    project = %request.project,
                    duration_ms = result.duration.as_millis() as u64,
                    "repair agent finished"
                );
                RepairOutcome::Completed(result.reply)
            }
            Err(e) => RepairOutcome::Unavailable(e.to_string()),
        }
    }
}

/// The instruction sent to the repair agent.
pub fn build_repair_prompt(project: &str, mode: RunMode, transcript: &str) -> String {
    [
        "Fix the project so the runner succeeds.".to_string(),
        format!("Project: {project}"),
        format!("Target: {mode} (npm run {})", mode.script()),
        "Rules:".to_string(),
        "- Do NOT provide terminal instructions.".to_string(),
        "- Make changes by rewriting FULL FILES (no partial edits).".to_string(),
        "- If editing JSON, ensure it parses (JSON.parse).".to_string(),
        "Failure observed:".to_string(),
        transcript.to_string(),
    ]
    .join("\n")
}

/// The first `max` characters of `s`, cut on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
