pub mod git;
pub mod project;
pub mod prompt;
pub mod run;
pub mod serve;
pub mod vault;

use anyhow::Result;
use cc_core::config::Config;
use std::path::Path;

/// Config for `home`, with the layout created.
pub(crate) fn load_config(home: &Path) -> Result<Config> {
    cc_core::paths::ensure_layout(home)?;
    Ok(Config::load(home)?)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}
