use crate::output::print_json;
use anyhow::{anyhow, Result};
use cc_core::vault::Vault;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum VaultSubcommand {
    /// List key names (values are never printed)
    Keys,
    /// Insert or replace entries
    Set {
        /// KEY=VALUE pairs; the value may itself contain '='
        #[arg(required = true)]
        entries: Vec<String>,
    },
}

pub fn run(home: &Path, subcommand: VaultSubcommand, json: bool) -> Result<()> {
    super::load_config(home)?;
    let vault = Vault::new(home);
    let keys = match subcommand {
        VaultSubcommand::Keys => vault.keys()?,
        VaultSubcommand::Set { entries } => {
            let pairs = entries
                .iter()
                .map(|e| parse_pair(e))
                .collect::<Result<Vec<_>>>()?;
            vault.upsert(pairs)?
        }
    };
    if json {
        return print_json(&serde_json::json!({ "keys": keys }));
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

fn parse_pair(entry: &str) -> Result<(String, String)> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{entry}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}
