//! Core module - fundamental types and utilities

pub mod clock;
pub mod config;
pub mod entity;
pub mod identity;
pub mod project;
pub mod shortid;
pub mod store;
pub mod workflow;
pub mod workshop;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use entity::{Entity, Priority};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use shortid::ShortIdIndex;
pub use store::{MemoryStore, ProcessStore, StoreError, YamlStore};
pub use workflow::WorkflowError;
pub use workshop::{ProcessMetrics, Workshop, WorkshopError, WorkshopResult};
