//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Directory holding one YAML file per manufacturing process
pub const PROCESS_DIR: &str = "manufacturing/processes";

/// File suffix for stored processes
pub const PROCESS_FILE_SUFFIX: &str = ".shop.yaml";

/// Represents a shop project (a directory containing `.shop/`)
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .shop/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(".shop").is_dir() {
                tracing::debug!(root = %current.display(), "discovered project");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(".shop").exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Initialize even if .shop/ exists, rewriting the default config
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        let project = Self { root };

        std::fs::create_dir_all(project.shop_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::create_dir_all(project.process_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        tracing::info!(root = %project.root.display(), "initialized shop project");
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Shop floor project configuration

# Default author for new processes and sign-offs (overrides global config)
# author: ""

# Editor to use for `shop proc edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Days ahead of a target date that `shop status` starts warning
# deadline_warning_days: 3
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .shop configuration directory
    pub fn shop_dir(&self) -> PathBuf {
        self.root.join(".shop")
    }

    pub fn config_path(&self) -> PathBuf {
        self.shop_dir().join("config.yaml")
    }

    pub fn process_dir(&self) -> PathBuf {
        self.root.join(PROCESS_DIR)
    }

    /// Get the file path for a process
    pub fn process_path(&self, id: &EntityId) -> PathBuf {
        self.process_dir()
            .join(format!("{}{}", id, PROCESS_FILE_SUFFIX))
    }

    /// Iterate all stored process files
    pub fn iter_process_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.process_dir())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy();
                name.ends_with(PROCESS_FILE_SUFFIX)
                    && EntityPrefix::from_filename(&name) == Some(EntityPrefix::Proc)
            })
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a shop project (searched from {searched_from:?}). Run 'shop init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("shop project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.shop_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.root().join("manufacturing/processes").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));

        assert!(Project::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_project_discover_finds_shop_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("cad/drivetrain");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_shop_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_process_path() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Proc);

        let path = project.process_path(&id);
        assert!(path.starts_with(project.process_dir()));
        assert!(path.to_string_lossy().ends_with(".shop.yaml"));
    }
}
