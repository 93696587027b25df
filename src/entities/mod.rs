//! Entity type definitions
//!
//! - [`ManufacturingProcess`] - a unit of shop work with its lifecycle
//! - [`ManufacturingStep`] - ordered steps embedded in a process
//! - [`QualityCheckpoint`] - inspections that gate process completion

pub mod checkpoint;
pub mod process;
pub mod step;

pub use checkpoint::{CheckpointResult, CheckpointStatus, CheckpointType, QualityCheckpoint};
pub use process::{ManufacturingProcess, ProcessLinks, ProcessStatus, ProcessType, SkillLevel};
pub use step::{ManufacturingStep, StepStatus};
