mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{git::GitSubcommand, project::ProjectSubcommand, vault::VaultSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "command-center",
    about = "Local backend for the OpenClaw dashboard: projects, self-healing builds, git sync and the vault",
    version,
    propagate_version = true
)]
struct Cli {
    /// State home (default: ~/.openclaw)
    #[arg(long, global = true, env = "OPENCLAW_HOME")]
    home: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Bind address (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default from config: 8788)
        #[arg(long)]
        port: Option<u16>,
        /// Open the API root in a browser once listening
        #[arg(long)]
        open: bool,
    },

    /// Register and list projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Install and build (or preview) a project, repairing once on failure
    Run {
        /// Project id, or a directory name under the workspace
        id: String,
        /// build | preview (alias: dev)
        #[arg(long, default_value = "build")]
        mode: String,
    },

    /// Pull, publish or import project repositories
    Git {
        #[command(subcommand)]
        subcommand: GitSubcommand,
    },

    /// Manage vault entries
    Vault {
        #[command(subcommand)]
        subcommand: VaultSubcommand,
    },

    /// Send a prompt to the openclaw agent
    Prompt {
        /// Prompt text (may be omitted with --mode preview --project <id>)
        text: Option<String>,
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = root::resolve_home(cli.home.as_deref()).and_then(|home| match cli.command {
        Commands::Serve { host, port, open } => cmd::serve::run(&home, host, port, open),
        Commands::Project { subcommand } => cmd::project::run(&home, subcommand, cli.json),
        Commands::Run { id, mode } => cmd::run::run(&home, &id, &mode, cli.json),
        Commands::Git { subcommand } => cmd::git::run(&home, subcommand, cli.json),
        Commands::Vault { subcommand } => cmd::vault::run(&home, subcommand, cli.json),
        Commands::Prompt {
            text,
            mode,
            project,
        } => cmd::prompt::run(
            &home,
            text.as_deref(),
            mode.as_deref(),
            project.as_deref(),
            cli.json,
        ),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
