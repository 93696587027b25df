//! Manufacturing step - one ordered unit of work inside a process

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::clock::Clock;
use crate::core::entity::append_note;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{require_status, WorkflowError};

/// Step execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
    Failed,
    Blocked,
}

impl StepStatus {
    pub fn is_completed(&self) -> bool {
        *self == StepStatus::Completed
    }

    pub fn is_active(&self) -> bool {
        *self == StepStatus::InProgress
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StepStatus::Pending => "Pending",
            StepStatus::InProgress => "In Progress",
            StepStatus::Completed => "Completed",
            StepStatus::Skipped => "Skipped",
            StepStatus::Failed => "Failed",
            StepStatus::Blocked => "Blocked",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StepStatus::Pending => "⏳",
            StepStatus::InProgress => "🔄",
            StepStatus::Completed => "✅",
            StepStatus::Skipped => "⏭️",
            StepStatus::Failed => "❌",
            StepStatus::Blocked => "🚫",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::InProgress => write!(f, "in_progress"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Skipped => write!(f, "skipped"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Blocked => write!(f, "blocked"),
        }
    }
}

impl std::str::FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepStatus::Pending),
            "in_progress" | "inprogress" => Ok(StepStatus::InProgress),
            "completed" => Ok(StepStatus::Completed),
            "skipped" => Ok(StepStatus::Skipped),
            "failed" => Ok(StepStatus::Failed),
            "blocked" => Ok(StepStatus::Blocked),
            _ => Err(format!(
                "Invalid step status: {}. Use pending, in_progress, completed, skipped, failed, or blocked",
                s
            )),
        }
    }
}

/// A single ordered step of a manufacturing process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingStep {
    /// Unique identifier (STEP-xxx)
    pub id: EntityId,

    /// Position in the process (1-based)
    pub sequence: u32,

    /// Step name
    pub name: String,

    /// Operator instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(default)]
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,

    /// Minutes between start and completion
    #[serde(default)]
    pub actual_minutes: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Team member who performed the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub requires_verification: bool,

    #[serde(default)]
    pub verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ManufacturingStep {
    /// Create a new pending step
    pub fn new(sequence: u32, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Step),
            sequence,
            name: name.into(),
            instructions: None,
            status: StepStatus::default(),
            estimated_minutes: None,
            actual_minutes: 0,
            started_at: None,
            completed_at: None,
            performed_by: None,
            notes: None,
            requires_verification: false,
            verified: false,
            verified_by: None,
            verified_at: None,
            active: true,
        }
    }

    pub fn start_step(&mut self, performer: &str, clock: &dyn Clock) -> Result<(), WorkflowError> {
        require_status("step", "start", self.status, &[StepStatus::Pending])?;

        self.status = StepStatus::InProgress;
        self.started_at = Some(clock.now());
        self.performed_by = Some(performer.to_string());
        tracing::debug!(step = %self.id, performer, "step started");
        Ok(())
    }

    pub fn complete_step(&mut self, clock: &dyn Clock) -> Result<(), WorkflowError> {
        require_status("step", "complete", self.status, &[StepStatus::InProgress])?;

        let now = clock.now();
        self.status = StepStatus::Completed;
        self.completed_at = Some(now);
        if let Some(started) = self.started_at {
            let minutes = (now - started).num_minutes().max(0);
            self.actual_minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
        }
        tracing::debug!(step = %self.id, minutes = self.actual_minutes, "step completed");
        Ok(())
    }

    pub fn verify_step(&mut self, verifier: &str, clock: &dyn Clock) -> Result<(), WorkflowError> {
        require_status("step", "verify", self.status, &[StepStatus::Completed])?;

        self.verified = true;
        self.verified_by = Some(verifier.to_string());
        self.verified_at = Some(clock.now());
        Ok(())
    }

    pub fn skip_step(&mut self, reason: Option<&str>, clock: &dyn Clock) {
        self.status = StepStatus::Skipped;
        self.completed_at = Some(clock.now());
        if let Some(reason) = reason {
            append_note(&mut self.notes, "Skipped", reason);
        }
    }

    pub fn fail_step(&mut self, reason: Option<&str>) {
        self.status = StepStatus::Failed;
        if let Some(reason) = reason {
            append_note(&mut self.notes, "Failed", reason);
        }
    }

    pub fn can_start(&self) -> bool {
        self.status == StepStatus::Pending && self.active
    }

    pub fn needs_verification(&self) -> bool {
        self.requires_verification && self.status == StepStatus::Completed && !self.verified
    }
}
