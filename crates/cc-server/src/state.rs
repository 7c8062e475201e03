use cc_core::agent::{OpenclawAgent, PromptAgent};
use cc_core::cache::ResponseCache;
use cc_core::config::Config;
use cc_core::lock::ProjectLocks;
use cc_core::orchestrator::Orchestrator;
use cc_core::registry::ProjectRegistry;
use cc_core::repair::{AgentRepairInvoker, RepairInvoker};
use cc_core::runner::{ProcessRunner, TokioProcessRunner};
use cc_core::sync::Synchronizer;
use cc_core::vault::Vault;
use cc_core::paths;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub home: PathBuf,
    pub config: Arc<Config>,
    pub registry: Arc<ProjectRegistry>,
    pub vault: Vault,
    pub orchestrator: Arc<Orchestrator>,
    pub sync: Arc<Synchronizer>,
    pub agent: Arc<dyn PromptAgent>,
    /// Identical prompts within the TTL share one agent call.
    pub prompt_cache: Arc<ResponseCache<serde_json::Value>>,
}

impl AppState {
    /// State backed by real processes and the `openclaw` CLI.
    pub fn new(home: PathBuf, config: Config) -> Self {
        let options = config.agent.options();
        Self::with_services(
            home,
            config,
            Arc::new(TokioProcessRunner),
            Arc::new(AgentRepairInvoker::new(options.clone())),
            Arc::new(OpenclawAgent::new(options)),
        )
    }

    /// State with injected process runner and agents.
    pub fn with_services(
        home: PathBuf,
        config: Config,
        runner: Arc<dyn ProcessRunner>,
        repairer: Arc<dyn RepairInvoker>,
        agent: Arc<dyn PromptAgent>,
    ) -> Self {
        let locks = ProjectLocks::new();
        let registry = Arc::new(ProjectRegistry::new(home.clone()));
        let orchestrator = Arc::new(Orchestrator::new(
            registry.clone(),
            runner.clone(),
            repairer,
            locks.clone(),
            &config,
        ));
        let sync = Arc::new(Synchronizer::new(
            paths::workspace_dir(&home),
            runner,
            locks,
        ));
        let prompt_cache = Arc::new(ResponseCache::new(
            Duration::from_secs(config.cache.prompt_ttl_secs),
            config.cache.capacity,
        ));
        Self {
            vault: Vault::new(&home),
            home,
            config: Arc::new(config),
            registry,
            orchestrator,
            sync,
            agent,
            prompt_cache,
        }
    }

    pub fn workspace(&self) -> PathBuf {
        paths::workspace_dir(&self.home)
    }
}
