use anyhow::Result;
use cc_core::vault::Vault;
use std::path::Path;

pub fn run(home: &Path, host: Option<String>, port: Option<u16>, open: bool) -> Result<()> {
    let mut config = super::load_config(home)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    // Mutating the environment is only sound while this is the only thread.
    export_vault(home)?;
    let rt = super::runtime()?;
    rt.block_on(cc_server::serve(home.to_path_buf(), config, open))
}

/// Make vault entries visible to spawned builds and agents, without
/// overriding variables that are already set.
fn export_vault(home: &Path) -> Result<usize> {
    let exported = Vault::new(home).export_missing_to_env()?;
    if exported > 0 {
        tracing::info!(exported, "vault entries exported to environment");
    }
    Ok(exported)
}
