use thiserror::Error;

#[derive(Debug, Error)]
pub enum CcError {
    #[error("Project not found")]
    ProjectNotFound(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("invalid path '{0}': must be relative to the workspace root")]
    InvalidPath(String),

    #[error("invalid vault key '{0}': use letters, digits, '_', '.' or '-'")]
    InvalidVaultKey(String),

    #[error("{message}")]
    Git { command: String, message: String },

    #[error("agent error: {0}")]
    Agent(String),

    #[error("failed to spawn '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("home directory not found: set HOME or OPENCLAW_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CcError>;
