use crate::error::{CcError, Result};
use crate::io;
use crate::paths;
use crate::types::RunMode;
use openclaw_agent::AgentOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8788
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandsConfig
// ---------------------------------------------------------------------------

/// argv for each executor step. The first element is the program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_install")]
    pub install: Vec<String>,
    #[serde(default = "default_build")]
    pub build: Vec<String>,
    #[serde(default = "default_dev")]
    pub dev: Vec<String>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn default_install() -> Vec<String> {
    argv(&["npm", "install"])
}

fn default_build() -> Vec<String> {
    argv(&["npm", "run", "build"])
}

fn default_dev() -> Vec<String> {
    argv(&["npm", "run", "dev"])
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            install: default_install(),
            build: default_build(),
            dev: default_dev(),
        }
    }
}

impl CommandsConfig {
    pub fn for_mode(&self, mode: RunMode) -> &[String] {
        match mode {
            RunMode::Build => &self.build,
            RunMode::Preview => &self.dev,
        }
    }
}

// ---------------------------------------------------------------------------
// TimeoutsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_install_secs")]
    pub install_secs: u64,
    #[serde(default = "default_build_secs")]
    pub build_secs: u64,
    /// Dev servers rarely exit on their own; this bounds how long one may run.
    #[serde(default = "default_preview_secs")]
    pub preview_secs: u64,
}

fn default_install_secs() -> u64 {
    900
}

fn default_build_secs() -> u64 {
    900
}

fn default_preview_secs() -> u64 {
    120
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            install_secs: default_install_secs(),
            build_secs: default_build_secs(),
            preview_secs: default_preview_secs(),
        }
    }
}

impl TimeoutsConfig {
    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    pub fn for_mode(&self, mode: RunMode) -> Duration {
        match mode {
            RunMode::Build => Duration::from_secs(self.build_secs),
            RunMode::Preview => Duration::from_secs(self.preview_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// PreviewConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// File the dev command expects; scaffolded when missing.
    #[serde(default = "default_entry_file")]
    pub entry_file: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_entry_file() -> String {
    "index.js".to_string()
}

fn default_placeholder() -> String {
    "console.log(\"Preview successful\");".to_string()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            entry_file: default_entry_file(),
            placeholder: default_placeholder(),
        }
    }
}

// ---------------------------------------------------------------------------
// RepairConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Character budget for the failure transcript sent to the agent and for
    /// error messages returned to callers.
    #[serde(default = "default_transcript_limit")]
    pub transcript_limit: usize,
}

fn default_transcript_limit() -> usize {
    6000
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            transcript_limit: default_transcript_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default = "default_thinking")]
    pub thinking: String,
    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,
}

fn default_agent_id() -> String {
    openclaw_agent::types::DEFAULT_AGENT_ID.to_string()
}

fn default_thinking() -> String {
    openclaw_agent::types::DEFAULT_THINKING.to_string()
}

fn default_agent_timeout() -> u64 {
    openclaw_agent::types::DEFAULT_TIMEOUT_SECS
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            executable: None,
            agent_id: default_agent_id(),
            thinking: default_thinking(),
            timeout_secs: default_agent_timeout(),
        }
    }
}

impl AgentConfig {
    /// Agent options from this config, with `OPENCLAW_*` env vars taking
    /// precedence.
    pub fn options(&self) -> AgentOptions {
        AgentOptions {
            path_to_executable: self.executable.clone(),
            agent_id: self.agent_id.clone(),
            thinking: self.thinking.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
        .with_env_overrides()
    }
}

// ---------------------------------------------------------------------------
// CacheConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_prompt_ttl")]
    pub prompt_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_prompt_ttl() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    64
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prompt_ttl_secs: default_prompt_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// `dashboard/config.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load the config under `home`, falling back to defaults when the file
    /// does not exist.
    pub fn load(home: &Path) -> Result<Self> {
        let path = paths::config_path(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(home), data.as_bytes())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, argv) in [
            ("install", &self.commands.install),
            ("build", &self.commands.build),
            ("dev", &self.commands.dev),
        ] {
            if argv.first().map_or(true, |p| p.trim().is_empty()) {
                return Err(CcError::Validation(format!(
                    "config: commands.{name} must name a program"
                )));
            }
        }
        if self.repair.transcript_limit == 0 {
            return Err(CcError::Validation(
                "config: repair.transcript_limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.server.port, 8788);
        assert_eq!(config.commands.install, vec!["npm", "install"]);
        assert_eq!(config.commands.for_mode(RunMode::Preview), ["npm", "run", "dev"]);
        assert_eq!(config.repair.transcript_limit, 6000);
        assert_eq!(config.preview.entry_file, "index.js");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dashboard")).unwrap();
        std::fs::write(
            dir.path().join("dashboard/config.yaml"),
            "commands:\n  build: [pnpm, build]\ntimeouts:\n  preview_secs: 5\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.commands.build, vec!["pnpm", "build"]);
        assert_eq!(config.commands.install, vec!["npm", "install"]);
        assert_eq!(
            config.timeouts.for_mode(RunMode::Preview),
            Duration::from_secs(5)
        );
        assert_eq!(config.timeouts.build_secs, 900);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.server.port = 9000;
        config.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().server.port, 9000);
    }

    #[test]
    fn empty_command_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dashboard")).unwrap();
        std::fs::write(
            dir.path().join("dashboard/config.yaml"),
            "commands:\n  install: []\n",
        )
        .unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(CcError::Validation(_))
        ));
    }
}
