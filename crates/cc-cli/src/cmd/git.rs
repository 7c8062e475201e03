use crate::output::print_json;
use anyhow::Result;
use cc_core::lock::ProjectLocks;
use cc_core::paths;
use cc_core::runner::TokioProcessRunner;
use cc_core::sync::{Synchronizer, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE};
use clap::Subcommand;
use std::path::Path;
use std::sync::Arc;

#[derive(Subcommand, Debug)]
pub enum GitSubcommand {
    /// Clone a project directory, or fetch and pull if it is already a repository
    Pull {
        /// Directory relative to the workspace root
        path: String,
        #[arg(long)]
        repo: String,
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    /// Commit local changes (if any) and push
    Publish {
        /// Directory relative to the workspace root
        path: String,
        #[arg(long)]
        repo: String,
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
        #[arg(long, short = 'm', default_value = DEFAULT_COMMIT_MESSAGE)]
        message: String,
    },
    /// Pull a repository into a workspace directory named after it
    Import {
        repo: String,
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
}

pub fn run(home: &Path, subcommand: GitSubcommand, json: bool) -> Result<()> {
    super::load_config(home)?;
    let sync = Synchronizer::new(
        paths::workspace_dir(home),
        Arc::new(TokioProcessRunner),
        ProjectLocks::new(),
    );
    let rt = super::runtime()?;

    match subcommand {
        GitSubcommand::Pull { path, repo, branch } => {
            let result = rt.block_on(sync.pull(&path, &repo, &branch))?;
            if json {
                return print_json(&result);
            }
            println!(
                "{} {} ({})",
                result.action,
                result.project_dir.display(),
                result.branch
            );
        }
        GitSubcommand::Publish {
            path,
            repo,
            branch,
            message,
        } => {
            let result = rt.block_on(sync.publish(&path, &repo, &branch, &message))?;
            if json {
                return print_json(&result);
            }
            let what = if result.committed {
                "committed and pushed"
            } else {
                "pushed (nothing to commit)"
            };
            println!("{what} {} ({})", result.project_dir.display(), result.branch);
        }
        GitSubcommand::Import { repo, branch } => {
            let result = rt.block_on(sync.import(&repo, &branch))?;
            if json {
                return print_json(&result);
            }
            println!(
                "{} '{}' into {} ({})",
                result.action,
                result.name,
                result.project_dir.display(),
                result.branch
            );
        }
    }
    Ok(())
}
