use crate::error::{CcError, Result};
use crate::io;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A registered project. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Milliseconds since the epoch at creation, as a string.
    pub id: String,
    pub name: String,
    pub path_relative: String,
    pub created_at: DateTime<Utc>,
}

/// Durable list of projects in `dashboard/projects.json`, newest first.
pub struct ProjectRegistry {
    home: PathBuf,
    write_lock: Mutex<()>,
}

impl ProjectRegistry {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn workspace(&self) -> PathBuf {
        paths::workspace_dir(&self.home)
    }

    /// All projects, newest first. A missing file is an empty list; a file
    /// that does not parse is an error.
    pub fn list(&self) -> Result<Vec<Project>> {
        let path = paths::projects_path(&self.home);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    pub fn find(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.list()?.into_iter().find(|p| p.id == id))
    }

    /// Register a project and create its workspace directory.
    pub fn create(&self, name: &str, path_relative: &str) -> Result<Project> {
        let name = name.trim();
        let path_relative = path_relative.trim();
        if name.is_empty() || path_relative.is_empty() {
            return Err(CcError::Validation(
                "name and pathRelative required".into(),
            ));
        }
        let dir = paths::resolve_in_workspace(&self.workspace(), path_relative)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut projects = self.list()?;
        let now = Utc::now();
        let id = next_id(now.timestamp_millis(), &projects);

        io::ensure_dir(&dir)?;
        let project = Project {
            id,
            name: name.to_string(),
            path_relative: path_relative.to_string(),
            created_at: now,
        };
        projects.insert(0, project.clone());
        self.save(&projects)?;
        tracing::info!(id = %project.id, path = %project.path_relative, "project created");
        Ok(project)
    }

    /// Directory for a project id. Unregistered ids are treated as a
    /// directory name under the workspace. The directory must exist.
    pub fn resolve_dir(&self, id: &str) -> Result<(String, PathBuf)> {
        let relative = match self.find(id)? {
            Some(project) => project.path_relative,
            None => id.to_string(),
        };
        let dir = paths::resolve_in_workspace(&self.workspace(), &relative)
            .map_err(|_| CcError::ProjectNotFound(id.to_string()))?;
        if !dir.is_dir() {
            return Err(CcError::ProjectNotFound(id.to_string()));
        }
        Ok((relative, dir))
    }

    fn save(&self, projects: &[Project]) -> Result<()> {
        let data = serde_json::to_string_pretty(projects)?;
        io::atomic_write(&paths::projects_path(&self.home), data.as_bytes())
    }
}

/// `now_ms`, bumped past the newest numeric id already in use.
fn next_id(now_ms: i64, projects: &[Project]) -> String {
    let max = projects
        .iter()
        .filter_map(|p| p.id.parse::<i64>().ok())
        .max();
    match max {
        Some(max) if max >= now_ms => (max + 1).to_string(),
        _ => now_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn create_prepends_and_creates_dir() {
        let home = TempDir::new().unwrap();
        let reg = ProjectRegistry::new(home.path());
        let a = reg.create("Alpha", "alpha").unwrap();
        let b = reg.create("Beta", "clients/beta").unwrap();

        let list = reg.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], b);
        assert_eq!(list[1], a);
        assert!(home.path().join("workspace/clients/beta").is_dir());
    }

    #[test]
    fn ids_are_unique_across_rapid_creates() {
        let home = TempDir::new().unwrap();
        let reg = ProjectRegistry::new(home.path());
        let ids: HashSet<String> = (0..20)
            .map(|i| reg.create("p", &format!("p{i}")).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn next_id_bumps_past_existing() {
        let existing = vec![Project {
            id: "5000".into(),
            name: "x".into(),
            path_relative: "x".into(),
            created_at: Utc::now(),
        }];
        assert_eq!(next_id(4000, &existing), "5001");
        assert_eq!(next_id(5000, &existing), "5001");
        assert_eq!(next_id(6000, &existing), "6000");
        assert_eq!(next_id(10, &[]), "10");
    }

    #[test]
    fn missing_fields_do_not_mutate() {
        let home = TempDir::new().unwrap();
        let reg = ProjectRegistry::new(home.path());
        reg.create("Alpha", "alpha").unwrap();
        assert!(matches!(reg.create("", "beta"), Err(CcError::Validation(_))));
        assert!(matches!(reg.create("Beta", "  "), Err(CcError::Validation(_))));
        assert!(matches!(
            reg.create("Evil", "../escape"),
            Err(CcError::InvalidPath(_))
        ));
        assert_eq!(reg.list().unwrap().len(), 1);
        assert!(!home.path().join("escape").exists());
    }

    #[test]
    fn serializes_camel_case() {
        let home = TempDir::new().unwrap();
        let reg = ProjectRegistry::new(home.path());
        reg.create("Alpha", "alpha").unwrap();
        let raw = std::fs::read_to_string(paths::projects_path(home.path())).unwrap();
        assert!(raw.contains("\"pathRelative\": \"alpha\""));
        assert!(raw.contains("\"createdAt\""));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let home = TempDir::new().unwrap();
        let path = paths::projects_path(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let reg = ProjectRegistry::new(home.path());
        assert!(matches!(reg.list(), Err(CcError::Json(_))));
        assert!(reg.create("a", "a").is_err());
    }

    #[test]
    fn resolve_dir_registered_and_fallback() {
        let home = TempDir::new().unwrap();
        let reg = ProjectRegistry::new(home.path());
        let p = reg.create("Alpha", "clients/alpha").unwrap();
        let (rel, dir) = reg.resolve_dir(&p.id).unwrap();
        assert_eq!(rel, "clients/alpha");
        assert_eq!(dir, home.path().join("workspace/clients/alpha"));

        std::fs::create_dir_all(home.path().join("workspace/loose")).unwrap();
        let (rel, _) = reg.resolve_dir("loose").unwrap();
        assert_eq!(rel, "loose");

        assert!(matches!(
            reg.resolve_dir("nope"),
            Err(CcError::ProjectNotFound(_))
        ));
        assert!(matches!(
            reg.resolve_dir("../etc"),
            Err(CcError::ProjectNotFound(_))
        ));
    }
}
