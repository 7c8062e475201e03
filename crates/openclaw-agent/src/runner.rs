use std::time::{Duration, Instant};

use crate::process::{AgentProcess, KILL_GRACE};
use crate::types::{parse_reply, AgentOptions, AgentReply};
use crate::{AgentError, Result};

// ─── RunConfig ────────────────────────────────────────────────────────────

/// Configuration for a single agent run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The prompt the agent acts on.
    pub prompt: String,
    /// Agent id, thinking level, timeout, working directory, env.
    pub opts: AgentOptions,
}

// ─── RunResult ────────────────────────────────────────────────────────────

/// The result of an agent run that exited successfully.
#[derive(Debug)]
pub struct RunResult {
    pub reply: AgentReply,
    pub duration: Duration,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Drive one `openclaw agent` invocation to completion.
///
/// Returns `Err` when the prompt is blank, the CLI cannot be spawned, exits
/// non-zero, or outlives `opts.timeout` (plus a short grace period).
pub async fn run(config: RunConfig) -> Result<RunResult> {
    if config.prompt.trim().is_empty() {
        return Err(AgentError::EmptyPrompt);
    }
    tracing::debug!(
        agent = %config.opts.agent_id,
        prompt_chars = config.prompt.len(),
        "spawning openclaw agent"
    );
    let process = AgentProcess::spawn(&config.prompt, &config.opts)?;
    collect(process, config.opts.timeout + KILL_GRACE).await
}

// ─── Internal ─────────────────────────────────────────────────────────────

/// Wait for a spawned process and parse its stdout into a [`RunResult`].
pub(crate) async fn collect(process: AgentProcess, timeout: Duration) -> Result<RunResult> {
    let start = Instant::now();
    let stdout = process.finish(timeout).await?;
    Ok(RunResult {
        reply: parse_reply(&stdout),
        duration: start.elapsed(),
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────
