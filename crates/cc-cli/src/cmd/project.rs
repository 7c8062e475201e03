use crate::output::{print_json, print_table};
use anyhow::Result;
use cc_core::registry::ProjectRegistry;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects, newest first
    List,
    /// Register a project and create its workspace directory
    Create {
        /// Display name
        name: String,
        /// Directory relative to the workspace root
        path: String,
    },
}

pub fn run(home: &Path, subcommand: ProjectSubcommand, json: bool) -> Result<()> {
    super::load_config(home)?;
    let registry = ProjectRegistry::new(home);
    match subcommand {
        ProjectSubcommand::List => list(&registry, json),
        ProjectSubcommand::Create { name, path } => create(&registry, &name, &path, json),
    }
}

fn list(registry: &ProjectRegistry, json: bool) -> Result<()> {
    let projects = registry.list()?;
    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.path_relative.clone(),
                p.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "PATH", "CREATED"], rows);
    Ok(())
}

fn create(registry: &ProjectRegistry, name: &str, path: &str, json: bool) -> Result<()> {
    let project = registry.create(name, path)?;
    if json {
        return print_json(&project);
    }
    println!("Created project '{}' ({}) at {}", project.name, project.id, project.path_relative);
    Ok(())
}
