use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("openclaw spawn failed: {0}")]
    Spawn(String),

    #[error("openclaw agent failed (code {code}): {output}")]
    Exit { code: String, output: String },

    #[error("openclaw agent timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("prompt required")]
    EmptyPrompt,
}
