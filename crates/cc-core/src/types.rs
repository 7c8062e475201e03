use crate::error::{CcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// RunMode
// ---------------------------------------------------------------------------

/// What the orchestrator runs after the install step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Production build (`npm run build`).
    #[default]
    Build,
    /// Development server (`npm run dev`). `dev` is accepted as an alias.
    #[serde(alias = "dev")]
    Preview,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Build => "build",
            RunMode::Preview => "preview",
        }
    }

    /// The package script this mode runs.
    pub fn script(&self) -> &'static str {
        match self {
            RunMode::Build => "build",
            RunMode::Preview => "dev",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = CcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "build" => Ok(RunMode::Build),
            "preview" | "dev" => Ok(RunMode::Preview),
            other => Err(CcError::Validation(format!(
                "unknown mode '{other}': expected build or preview"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncAction
// ---------------------------------------------------------------------------

/// What a pull actually did to the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Cloned,
    Pulled,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Cloned => "cloned",
            SyncAction::Pulled => "pulled",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
