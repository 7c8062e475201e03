use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// ─── AgentOptions ─────────────────────────────────────────────────────────

pub const DEFAULT_AGENT_ID: &str = "main";
pub const DEFAULT_THINKING: &str = "minimal";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Options for a single `openclaw agent` invocation.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Executable to spawn. Defaults to `openclaw` on `PATH`.
    pub path_to_executable: Option<String>,
    /// `--agent <id>`
    pub agent_id: String,
    /// `--thinking <level>`
    pub thinking: String,
    /// Passed to the CLI as `--timeout` and used as the wall-clock bound.
    pub timeout: Duration,
    /// Working directory for the subprocess.
    pub cwd: Option<PathBuf>,
    /// Additional environment variables for the subprocess.
    pub env: HashMap<String, String>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            path_to_executable: None,
            agent_id: DEFAULT_AGENT_ID.to_string(),
            thinking: DEFAULT_THINKING.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cwd: None,
            env: HashMap::new(),
        }
    }
}

impl AgentOptions {
    /// Defaults overridden by `OPENCLAW_AGENT_ID`, `OPENCLAW_THINKING` and
    /// `OPENCLAW_AGENT_TIMEOUT` (seconds).
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(id) = non_empty_env("OPENCLAW_AGENT_ID") {
            self.agent_id = id;
        }
        if let Some(level) = non_empty_env("OPENCLAW_THINKING") {
            self.thinking = level;
        }
        if let Some(secs) = non_empty_env("OPENCLAW_AGENT_TIMEOUT") {
            match secs.parse::<u64>() {
                Ok(s) => self.timeout = Duration::from_secs(s),
                Err(_) => tracing::warn!("ignoring invalid OPENCLAW_AGENT_TIMEOUT={secs}"),
            }
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ─── AgentReply ───────────────────────────────────────────────────────────

/// What the agent printed on stdout.
///
/// The CLI is asked for `--json`, but older agents print plain text; both are
/// valid replies.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Json(serde_json::Value),
    Raw(String),
}

impl AgentReply {
    /// JSON view of the reply. Raw text is wrapped as `{"ok": true, "raw": …}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AgentReply::Json(v) => v.clone(),
            AgentReply::Raw(text) => serde_json::json!({ "ok": true, "raw": text }),
        }
    }

    /// A short human-readable line for logs.
    pub fn summary(&self) -> String {
        match self {
            AgentReply::Raw(text) => text.clone(),
            AgentReply::Json(v) => ["summary", "result", "text", "message", "output"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|s| s.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string()),
        }
    }
}

impl Serialize for AgentReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Parse the agent's stdout: JSON when it parses, raw text otherwise.
pub fn parse_reply(stdout: &str) -> AgentReply {
    let text = stdout.trim();
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(v) => AgentReply::Json(v),
        Err(_) => AgentReply::Raw(text.to_string()),
    }
}
