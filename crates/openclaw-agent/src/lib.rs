//! `openclaw-agent` — Rust driver for the `openclaw agent` CLI subprocess.
//!
//! The command center hands build failures to an external repair agent. The
//! agent is a CLI (`openclaw agent --message … --json`) that edits the
//! project in place and prints a JSON summary (or plain text) on stdout.
//!
//! # Architecture
//!
//! ```text
//! AgentOptions
//!     │
//!     ▼
//! AgentProcess   ← spawns `openclaw agent --agent <id> --message <prompt> --json …`
//!     │             drains stdout/stderr, enforces a wall-clock timeout
//!     ▼
//! AgentReply     ← JSON payload, or raw text when stdout is not JSON
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use openclaw_agent::{agent_run, AgentOptions, RunConfig};
//!
//! let result = agent_run(RunConfig {
//!     prompt: "Fix the build.".into(),
//!     opts: AgentOptions::from_env(),
//! })
//! .await?;
//! println!("{}", result.reply.summary());
//! ```

pub mod error;
pub mod runner;
pub mod types;

pub(crate) mod process;


pub use error::AgentError;
pub use runner::{run as agent_run, RunConfig, RunResult};
pub use types::{parse_reply, AgentOptions, AgentReply};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AgentError>;
