//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Manufacturing process
    Proc,
    /// Step within a manufacturing process
    Step,
    /// Quality checkpoint
    Qc,
    /// Build-season task (external reference)
    Task,
    /// Project (external reference)
    Prj,
    /// Part (external reference)
    Part,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Proc => "PROC",
            EntityPrefix::Step => "STEP",
            EntityPrefix::Qc => "QC",
            EntityPrefix::Task => "TASK",
            EntityPrefix::Prj => "PRJ",
            EntityPrefix::Part => "PART",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Proc,
            EntityPrefix::Step,
            EntityPrefix::Qc,
            EntityPrefix::Task,
            EntityPrefix::Prj,
            EntityPrefix::Part,
        ]
    }

    /// Try to determine entity prefix from a filename like "PROC-xxx.shop.yaml"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        Self::all()
            .iter()
            .find(|prefix| upper.starts_with(&format!("{}-", prefix.as_str())))
            .copied()
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PROC" => Ok(EntityPrefix::Proc),
            "STEP" => Ok(EntityPrefix::Step),
            "QC" => Ok(EntityPrefix::Qc),
            "TASK" => Ok(EntityPrefix::Task),
            "PRJ" => Ok(EntityPrefix::Prj),
            "PART" => Ok(EntityPrefix::Part),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Create an EntityId from a prefix and existing ULID
    pub fn from_parts(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    /// Get the entity prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    /// Parse an ID and require a specific prefix
    pub fn parse_with_prefix(s: &str, expected: EntityPrefix) -> Result<Self, IdParseError> {
        let id: EntityId = s.parse()?;
        if id.prefix != expected {
            return Err(IdParseError::WrongPrefix {
                expected,
                found: id.prefix,
            });
        }
        Ok(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: PROC, STEP, QC, TASK, PRJ, PART)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),

    #[error("expected a {expected} ID but got a {found} ID")]
    WrongPrefix {
        expected: EntityPrefix,
        found: EntityPrefix,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Proc);
        assert!(id.to_string().starts_with("PROC-"));
        assert_eq!(id.to_string().len(), 31); // PROC- (5) + ULID (26)
    }

    #[test]
    fn test_entity_id_parsing() {
        let original = EntityId::new(EntityPrefix::Qc);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Qc);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0VWXYZ0").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("PROC01HQ3K4N5M6P7R8S9T0VWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("PROC-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_parse_with_prefix() {
        let task = EntityId::new(EntityPrefix::Task);
        assert!(EntityId::parse_with_prefix(&task.to_string(), EntityPrefix::Task).is_ok());

        let err = EntityId::parse_with_prefix(&task.to_string(), EntityPrefix::Prj).unwrap_err();
        assert!(matches!(
            err,
            IdParseError::WrongPrefix {
                expected: EntityPrefix::Prj,
                found: EntityPrefix::Task
            }
        ));
    }

    #[test]
    fn test_prefix_from_filename() {
        assert_eq!(
            EntityPrefix::from_filename("PROC-01HC2JB7SMQX7RS1Y0GFKBHPTD.shop.yaml"),
            Some(EntityPrefix::Proc)
        );
        assert_eq!(EntityPrefix::from_filename("config.yaml"), None);
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }
}
