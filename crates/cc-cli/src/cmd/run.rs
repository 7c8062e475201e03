use crate::output::print_json;
use anyhow::{bail, Result};
use cc_core::lock::ProjectLocks;
use cc_core::orchestrator::Orchestrator;
use cc_core::registry::ProjectRegistry;
use cc_core::repair::AgentRepairInvoker;
use cc_core::runner::TokioProcessRunner;
use cc_core::types::RunMode;
use std::path::Path;
use std::sync::Arc;

pub fn run(home: &Path, id: &str, mode: &str, json: bool) -> Result<()> {
    let config = super::load_config(home)?;
    let mode: RunMode = mode.parse()?;
    let orchestrator = Orchestrator::new(
        Arc::new(ProjectRegistry::new(home)),
        Arc::new(TokioProcessRunner),
        Arc::new(AgentRepairInvoker::new(config.agent.options())),
        ProjectLocks::new(),
        &config,
    );

    let rt = super::runtime()?;
    let outcome = rt.block_on(orchestrator.run(id, mode))?;

    if json {
        print_json(&outcome)?;
    } else if outcome.success() {
        let healed = if outcome.healed { " after repair" } else { "" };
        println!("{mode} succeeded{healed}");
        println!("log: {}", outcome.log_path.display());
    } else {
        println!("log: {}", outcome.log_path.display());
    }

    if !outcome.success() {
        let message = outcome.message.as_deref().unwrap_or("runner failed");
        bail!("{mode} failed after repair attempt: {message}");
    }
    Ok(())
}
