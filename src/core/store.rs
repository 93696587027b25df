//! Process persistence
//!
//! A `ProcessStore` owns whole process aggregates (steps and checkpoints are
//! embedded). Every update bumps `entity_revision`; saving a copy whose
//! revision no longer matches the stored one is rejected as a conflict.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::entities::process::ManufacturingProcess;

/// Errors raised at the persistence boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no process matches '{0}'")]
    NotFound(String),

    #[error("'{reference}' matches {count} processes; use a longer ID")]
    Ambiguous { reference: String, count: usize },

    #[error("{id} was modified by someone else (stored revision {stored}, yours {found})")]
    Conflict { id: String, stored: u32, found: u32 },

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize process: {0}")]
    Serialize(String),
}

/// Storage for manufacturing processes
pub trait ProcessStore {
    /// Persist a process, bumping its revision if it already exists
    fn save(&mut self, process: &mut ManufacturingProcess) -> Result<(), StoreError>;

    fn load(&self, id: &EntityId) -> Result<ManufacturingProcess, StoreError>;

    fn list(&self) -> Result<Vec<ManufacturingProcess>, StoreError>;

    fn delete(&mut self, id: &EntityId) -> Result<(), StoreError>;

    /// Find a single process by full or partial ID (case-insensitive)
    fn find(&self, reference: &str) -> Result<ManufacturingProcess, StoreError> {
        if let Ok(id) = EntityId::parse(reference) {
            return self.load(&id);
        }

        let needle = reference.to_uppercase();
        let mut matches: Vec<ManufacturingProcess> = self
            .list()?
            .into_iter()
            .filter(|p| p.id.to_string().contains(&needle))
            .collect();

        match matches.len() {
            0 => Err(StoreError::NotFound(reference.to_string())),
            1 => Ok(matches.remove(0)),
            count => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                count,
            }),
        }
    }
}

fn check_revision(
    stored: Option<u32>,
    process: &mut ManufacturingProcess,
) -> Result<(), StoreError> {
    if let Some(stored) = stored {
        if stored != process.entity_revision {
            return Err(StoreError::Conflict {
                id: process.id.to_string(),
                stored,
                found: process.entity_revision,
            });
        }
        process.entity_revision += 1;
    }
    Ok(())
}

/// One `PROC-*.shop.yaml` file per process under the project
#[derive(Debug, Clone)]
pub struct YamlStore {
    project: Project,
}

impl YamlStore {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn path_for(&self, id: &EntityId) -> PathBuf {
        self.project.process_path(id)
    }

    fn read(&self, path: &PathBuf) -> Result<ManufacturingProcess, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        serde_yml::from_str(&content).map_err(|e| StoreError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })
    }
}

impl ProcessStore for YamlStore {
    fn save(&mut self, process: &mut ManufacturingProcess) -> Result<(), StoreError> {
        let path = self.path_for(&process.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let stored = if path.exists() {
            Some(self.read(&path)?.entity_revision)
        } else {
            None
        };
        let previous = process.entity_revision;
        check_revision(stored, process)?;

        let yaml = match serde_yml::to_string(process) {
            Ok(yaml) => yaml,
            Err(e) => {
                process.entity_revision = previous;
                return Err(StoreError::Serialize(e.to_string()));
            }
        };

        if let Err(source) = fs::write(&path, yaml) {
            process.entity_revision = previous;
            return Err(StoreError::Io { path, source });
        }

        tracing::info!(
            process = %process.id,
            revision = process.entity_revision,
            status = %process.status,
            "saved process"
        );
        Ok(())
    }

    fn load(&self, id: &EntityId) -> Result<ManufacturingProcess, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.read(&path)
    }

    fn list(&self) -> Result<Vec<ManufacturingProcess>, StoreError> {
        let mut processes = Vec::new();
        for path in self.project.iter_process_files() {
            match self.read(&path) {
                Ok(process) => processes.push(process),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable process file"),
            }
        }
        Ok(processes)
    }

    fn delete(&mut self, id: &EntityId) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(&path).map_err(|source| StoreError::Io { path, source })?;
        tracing::info!(process = %id, "deleted process");
        Ok(())
    }
}

/// Keeps processes in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    processes: BTreeMap<String, ManufacturingProcess>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl ProcessStore for MemoryStore {
    fn save(&mut self, process: &mut ManufacturingProcess) -> Result<(), StoreError> {
        let key = process.id.to_string();
        let stored = self.processes.get(&key).map(|p| p.entity_revision);
        check_revision(stored, process)?;
        self.processes.insert(key, process.clone());
        Ok(())
    }

    fn load(&self, id: &EntityId) -> Result<ManufacturingProcess, StoreError> {
        self.processes
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<ManufacturingProcess>, StoreError> {
        Ok(self.processes.values().cloned().collect())
    }

    fn delete(&mut self, id: &EntityId) -> Result<(), StoreError> {
        self.processes
            .remove(&id.to_string())
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
