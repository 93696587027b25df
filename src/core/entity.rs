//! Entity trait - common interface for stored entity types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for top-level shop entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "PROC")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity's display name
    fn title(&self) -> &str;

    /// Get the entity's status
    fn status(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}

/// Priority values shared by processes and checkpoints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Lower sorts first
    pub fn sort_order(&self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Priority::Critical => "🔴",
            Priority::High => "🟠",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Append a labelled line to a free-form notes log
pub(crate) fn append_note(notes: &mut Option<String>, label: &str, text: &str) {
    let line = format!("{}: {}", label, text);
    match notes {
        Some(existing) if !existing.is_empty() => {
            existing.push('\n');
            existing.push_str(&line);
        }
        _ => *notes = Some(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        let mut priorities = vec![Priority::Low, Priority::Critical, Priority::Medium];
        priorities.sort_by_key(|p| p.sort_order());
        assert_eq!(
            priorities,
            vec![Priority::Critical, Priority::Medium, Priority::Low]
        );
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_append_note() {
        let mut notes = None;
        append_note(&mut notes, "Paused", "waiting on stock");
        assert_eq!(notes.as_deref(), Some("Paused: waiting on stock"));

        append_note(&mut notes, "Cancelled", "design change");
        assert_eq!(
            notes.as_deref(),
            Some("Paused: waiting on stock\nCancelled: design change")
        );
    }
}
