//! Quality checkpoint - an inspection gate within a manufacturing process

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::clock::Clock;
use crate::core::entity::{append_note, Priority};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{require_status, WorkflowError};

/// Kind of inspection performed at a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum CheckpointType {
    Dimensional,
    #[default]
    Visual,
    Functional,
    Material,
    Assembly,
    Safety,
    Finish,
    Calibration,
    Documentation,
    Performance,
    Other,
}

impl CheckpointType {
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckpointType::Dimensional => "Dimensional",
            CheckpointType::Visual => "Visual",
            CheckpointType::Functional => "Functional",
            CheckpointType::Material => "Material",
            CheckpointType::Assembly => "Assembly",
            CheckpointType::Safety => "Safety",
            CheckpointType::Finish => "Finish",
            CheckpointType::Calibration => "Calibration",
            CheckpointType::Documentation => "Documentation",
            CheckpointType::Performance => "Performance",
            CheckpointType::Other => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckpointType::Dimensional => "Size and dimension verification",
            CheckpointType::Visual => "Visual inspection for defects",
            CheckpointType::Functional => "Functional testing and operation",
            CheckpointType::Material => "Material quality and properties",
            CheckpointType::Assembly => "Assembly and fit verification",
            CheckpointType::Safety => "Safety compliance check",
            CheckpointType::Finish => "Surface finish and appearance",
            CheckpointType::Calibration => "Calibration and accuracy check",
            CheckpointType::Documentation => "Documentation completeness",
            CheckpointType::Performance => "Performance and specification test",
            CheckpointType::Other => "Other quality checks",
        }
    }
}

impl std::fmt::Display for CheckpointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckpointType::Dimensional => "dimensional",
            CheckpointType::Visual => "visual",
            CheckpointType::Functional => "functional",
            CheckpointType::Material => "material",
            CheckpointType::Assembly => "assembly",
            CheckpointType::Safety => "safety",
            CheckpointType::Finish => "finish",
            CheckpointType::Calibration => "calibration",
            CheckpointType::Documentation => "documentation",
            CheckpointType::Performance => "performance",
            CheckpointType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for CheckpointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dimensional" => Ok(CheckpointType::Dimensional),
            "visual" => Ok(CheckpointType::Visual),
            "functional" => Ok(CheckpointType::Functional),
            "material" => Ok(CheckpointType::Material),
            "assembly" => Ok(CheckpointType::Assembly),
            "safety" => Ok(CheckpointType::Safety),
            "finish" => Ok(CheckpointType::Finish),
            "calibration" => Ok(CheckpointType::Calibration),
            "documentation" => Ok(CheckpointType::Documentation),
            "performance" => Ok(CheckpointType::Performance),
            "other" => Ok(CheckpointType::Other),
            _ => Err(format!("Invalid checkpoint type: {}", s)),
        }
    }
}

/// Checkpoint inspection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum CheckpointStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
    Deferred,
}

impl CheckpointStatus {
    pub fn is_completed(&self) -> bool {
        *self == CheckpointStatus::Completed
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckpointStatus::Pending => "Pending",
            CheckpointStatus::InProgress => "In Progress",
            CheckpointStatus::Completed => "Completed",
            CheckpointStatus::Skipped => "Skipped",
            CheckpointStatus::Deferred => "Deferred",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CheckpointStatus::Pending => "⏳",
            CheckpointStatus::InProgress => "🔄",
            CheckpointStatus::Completed => "✅",
            CheckpointStatus::Skipped => "⏭️",
            CheckpointStatus::Deferred => "📅",
        }
    }
}

impl std::fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointStatus::Pending => write!(f, "pending"),
            CheckpointStatus::InProgress => write!(f, "in_progress"),
            CheckpointStatus::Completed => write!(f, "completed"),
            CheckpointStatus::Skipped => write!(f, "skipped"),
            CheckpointStatus::Deferred => write!(f, "deferred"),
        }
    }
}

/// Outcome of an inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointResult {
    Pass,
    Fail,
    ConditionalPass,
    NeedsRework,
    Inconclusive,
}

impl CheckpointResult {
    pub fn is_passing(&self) -> bool {
        matches!(self, CheckpointResult::Pass | CheckpointResult::ConditionalPass)
    }

    /// Results that leave work outstanding
    pub fn requires_action(&self) -> bool {
        matches!(
            self,
            CheckpointResult::Fail | CheckpointResult::NeedsRework | CheckpointResult::Inconclusive
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckpointResult::Pass => "Pass",
            CheckpointResult::Fail => "Fail",
            CheckpointResult::ConditionalPass => "Conditional Pass",
            CheckpointResult::NeedsRework => "Needs Rework",
            CheckpointResult::Inconclusive => "Inconclusive",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CheckpointResult::Pass => "✅",
            CheckpointResult::Fail => "❌",
            CheckpointResult::ConditionalPass => "⚠️",
            CheckpointResult::NeedsRework => "🔄",
            CheckpointResult::Inconclusive => "❓",
        }
    }
}

impl std::fmt::Display for CheckpointResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointResult::Pass => write!(f, "pass"),
            CheckpointResult::Fail => write!(f, "fail"),
            CheckpointResult::ConditionalPass => write!(f, "conditional_pass"),
            CheckpointResult::NeedsRework => write!(f, "needs_rework"),
            CheckpointResult::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

impl std::str::FromStr for CheckpointResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(CheckpointResult::Pass),
            "fail" => Ok(CheckpointResult::Fail),
            "conditional_pass" | "conditional" => Ok(CheckpointResult::ConditionalPass),
            "needs_rework" | "rework" => Ok(CheckpointResult::NeedsRework),
            "inconclusive" => Ok(CheckpointResult::Inconclusive),
            _ => Err(format!(
                "Invalid checkpoint result: {}. Use pass, fail, conditional_pass, needs_rework, or inconclusive",
                s
            )),
        }
    }
}

/// A quality inspection gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityCheckpoint {
    /// Unique identifier (QC-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default)]
    pub checkpoint_type: CheckpointType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,

    #[serde(default)]
    pub status: CheckpointStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CheckpointResult>,

    #[serde(default)]
    pub priority: Priority,

    /// Team member performing the inspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspected_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_found: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrective_actions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tools: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_specs: Option<String>,

    #[serde(default = "default_true")]
    pub mandatory: bool,

    /// Whether a non-passing state holds up process completion
    #[serde(default = "default_true")]
    pub blocking: bool,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl QualityCheckpoint {
    /// Create a new mandatory, blocking checkpoint
    pub fn new(name: impl Into<String>, checkpoint_type: CheckpointType) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Qc),
            name: name.into(),
            checkpoint_type,
            description: None,
            acceptance_criteria: None,
            status: CheckpointStatus::default(),
            result: None,
            priority: Priority::default(),
            inspector: None,
            inspected_at: None,
            inspection_notes: None,
            issues_found: None,
            corrective_actions: None,
            required_tools: None,
            tolerance_specs: None,
            mandatory: true,
            blocking: true,
            active: true,
        }
    }

    pub fn start_inspection(&mut self, inspector: &str) -> Result<(), WorkflowError> {
        require_status(
            "checkpoint",
            "start inspection of",
            self.status,
            &[CheckpointStatus::Pending],
        )?;

        self.status = CheckpointStatus::InProgress;
        self.inspector = Some(inspector.to_string());
        tracing::debug!(checkpoint = %self.id, inspector, "inspection started");
        Ok(())
    }

    pub fn complete_inspection(
        &mut self,
        result: CheckpointResult,
        notes: Option<&str>,
        clock: &dyn Clock,
    ) -> Result<(), WorkflowError> {
        require_status(
            "checkpoint",
            "complete inspection of",
            self.status,
            &[CheckpointStatus::InProgress],
        )?;

        self.status = CheckpointStatus::Completed;
        self.result = Some(result);
        self.inspected_at = Some(clock.now());
        self.inspection_notes = notes.map(String::from);
        tracing::debug!(checkpoint = %self.id, %result, "inspection completed");
        Ok(())
    }

    /// Record findings; an unset result becomes `NeedsRework`
    pub fn record_issues(&mut self, issues: &str, corrective_actions: Option<&str>) {
        self.issues_found = Some(issues.to_string());
        self.corrective_actions = corrective_actions.map(String::from);

        if self.result.is_none() {
            self.result = Some(CheckpointResult::NeedsRework);
        }
    }

    pub fn skip_checkpoint(&mut self, reason: Option<&str>) {
        self.status = CheckpointStatus::Skipped;
        if let Some(reason) = reason {
            append_note(&mut self.inspection_notes, "Skipped", reason);
        }
    }

    pub fn defer_checkpoint(&mut self, reason: Option<&str>) {
        self.status = CheckpointStatus::Deferred;
        if let Some(reason) = reason {
            append_note(&mut self.inspection_notes, "Deferred", reason);
        }
    }

    /// Whether this checkpoint prevents its process from completing
    pub fn blocks_completion(&self) -> bool {
        if !self.blocking {
            return false;
        }

        if self.mandatory && self.status != CheckpointStatus::Completed {
            return true;
        }

        self.status == CheckpointStatus::Completed
            && self.result.is_some_and(|r| r.requires_action())
    }

    pub fn is_ready_for_inspection(&self) -> bool {
        self.status == CheckpointStatus::Pending && self.active
    }
}
