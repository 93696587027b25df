//! Short ID aliases (`@1`, `@2`, ...) for the most recent process listing
//!
//! The index is rewritten every time `shop proc list` runs and persisted to
//! `.shop/shortids.json` so the next command can refer to `@N`.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::project::Project;

const INDEX_FILE: &str = "shortids.json";

/// Ordered list of full IDs; `@N` is the N-th entry
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ShortIdIndex {
    ids: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, u32>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn path(project: &Project) -> PathBuf {
        project.shop_dir().join(INDEX_FILE)
    }

    /// Load the index from a project, or start empty if missing or unreadable
    pub fn load(project: &Project) -> Self {
        let path = Self::path(project);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };

        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reindex();
                index
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding corrupt short ID index");
                Self::new()
            }
        }
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(project), content)
    }

    fn reindex(&mut self) {
        self.positions = self
            .ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as u32 + 1))
            .collect();
    }

    /// Replace the index contents, numbering from `@1`
    pub fn rebuild(&mut self, ids: impl IntoIterator<Item = String>) {
        self.ids.clear();
        self.positions.clear();
        for id in ids {
            self.add(id);
        }
    }

    /// Add an ID (if not already present) and return its short number
    pub fn add(&mut self, id: String) -> u32 {
        if let Some(&n) = self.positions.get(&id) {
            return n;
        }
        self.ids.push(id.clone());
        let n = self.ids.len() as u32;
        self.positions.insert(id, n);
        n
    }

    /// Resolve `@N` or `N` to a full ID; anything else passes through unchanged
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let digits = reference.strip_prefix('@').unwrap_or(reference);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(reference.to_string());
        }

        let n: usize = digits.parse().ok()?;
        n.checked_sub(1).and_then(|i| self.ids.get(i)).cloned()
    }

    pub fn get_short_id(&self, id: &str) -> Option<u32> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_and_resolve() {
        let mut index = ShortIdIndex::new();
        assert_eq!(index.add("PROC-01A".to_string()), 1);
        assert_eq!(index.add("PROC-01B".to_string()), 2);
        assert_eq!(index.add("PROC-01A".to_string()), 1);

        assert_eq!(index.resolve("@2"), Some("PROC-01B".to_string()));
        assert_eq!(index.resolve("1"), Some("PROC-01A".to_string()));
        assert_eq!(index.resolve("@0"), None);
        assert_eq!(index.resolve("@9"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_non_numeric_passes_through() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("PROC-01A"), Some("PROC-01A".to_string()));
        assert_eq!(index.resolve("@"), Some("@".to_string()));
    }

    #[test]
    fn test_rebuild_renumbers() {
        let mut index = ShortIdIndex::new();
        index.add("PROC-OLD".to_string());
        index.rebuild(vec!["PROC-X".to_string(), "PROC-Y".to_string()]);

        assert_eq!(index.get_short_id("PROC-OLD"), None);
        assert_eq!(index.get_short_id("PROC-Y"), Some(2));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let mut index = ShortIdIndex::new();
        index.rebuild(vec!["PROC-A".to_string(), "PROC-B".to_string()]);
        index.save(&project).unwrap();

        let loaded = ShortIdIndex::load(&project);
        assert_eq!(loaded.resolve("@2"), Some("PROC-B".to_string()));
        assert_eq!(loaded.get_short_id("PROC-A"), Some(1));
    }

    #[test]
    fn test_load_corrupt_index_is_empty() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        fs::write(project.shop_dir().join(INDEX_FILE), "not json").unwrap();

        assert!(ShortIdIndex::load(&project).is_empty());
    }
}
