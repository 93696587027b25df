//! Manufacturing process - a tracked unit of shop work with steps and quality gates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::clock::Clock;
use crate::core::entity::{append_note, Entity, Priority};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{require_status, WorkflowError};
use crate::entities::checkpoint::QualityCheckpoint;
use crate::entities::step::{ManufacturingStep, StepStatus};

/// Process type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ProcessType {
    #[default]
    Machining,
    Cutting,
    Drilling,
    Welding,
    Assembly,
    Bending,
    Forming,
    Finishing,
    Painting,
    Wiring,
    Soldering,
    Programming,
    Inspection,
    Testing,
    Calibration,
    Prototyping,
    Documentation,
    Other,
}

impl ProcessType {
    pub fn all() -> &'static [ProcessType] {
        &[
            ProcessType::Machining,
            ProcessType::Cutting,
            ProcessType::Drilling,
            ProcessType::Welding,
            ProcessType::Assembly,
            ProcessType::Bending,
            ProcessType::Forming,
            ProcessType::Finishing,
            ProcessType::Painting,
            ProcessType::Wiring,
            ProcessType::Soldering,
            ProcessType::Programming,
            ProcessType::Inspection,
            ProcessType::Testing,
            ProcessType::Calibration,
            ProcessType::Prototyping,
            ProcessType::Documentation,
            ProcessType::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Machining => "machining",
            ProcessType::Cutting => "cutting",
            ProcessType::Drilling => "drilling",
            ProcessType::Welding => "welding",
            ProcessType::Assembly => "assembly",
            ProcessType::Bending => "bending",
            ProcessType::Forming => "forming",
            ProcessType::Finishing => "finishing",
            ProcessType::Painting => "painting",
            ProcessType::Wiring => "wiring",
            ProcessType::Soldering => "soldering",
            ProcessType::Programming => "programming",
            ProcessType::Inspection => "inspection",
            ProcessType::Testing => "testing",
            ProcessType::Calibration => "calibration",
            ProcessType::Prototyping => "prototyping",
            ProcessType::Documentation => "documentation",
            ProcessType::Other => "other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProcessType::Machining => "CNC, lathe, mill operations",
            ProcessType::Cutting => "Saw, plasma, laser cutting",
            ProcessType::Drilling => "Hole drilling and tapping",
            ProcessType::Welding => "MIG, TIG, stick welding",
            ProcessType::Assembly => "Mechanical assembly and fastening",
            ProcessType::Bending => "Sheet metal and tube bending",
            ProcessType::Forming => "Metal forming and shaping",
            ProcessType::Finishing => "Sanding, grinding, polishing",
            ProcessType::Painting => "Coating and surface treatment",
            ProcessType::Wiring => "Electrical connections and harnesses",
            ProcessType::Soldering => "Electronic component soldering",
            ProcessType::Programming => "Robot code and configuration",
            ProcessType::Inspection => "Quality control and verification",
            ProcessType::Testing => "Functional and performance testing",
            ProcessType::Calibration => "Sensor and system calibration",
            ProcessType::Prototyping => "Rapid prototyping and iteration",
            ProcessType::Documentation => "Process and design documentation",
            ProcessType::Other => "Custom or specialized processes",
        }
    }
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ProcessType::all()
            .iter()
            .find(|t| t.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("Invalid process type: {}", s))
    }
}

/// Lifecycle status of a manufacturing process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ProcessStatus {
    #[default]
    Planned,
    Ready,
    InProgress,
    Paused,
    Blocked,
    Review,
    Rework,
    Failed,
    OnHold,
    Completed,
    Cancelled,
}

impl ProcessStatus {
    pub fn all() -> &'static [ProcessStatus] {
        &[
            ProcessStatus::Planned,
            ProcessStatus::Ready,
            ProcessStatus::InProgress,
            ProcessStatus::Paused,
            ProcessStatus::Blocked,
            ProcessStatus::Review,
            ProcessStatus::Rework,
            ProcessStatus::Failed,
            ProcessStatus::OnHold,
            ProcessStatus::Completed,
            ProcessStatus::Cancelled,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Planned => "planned",
            ProcessStatus::Ready => "ready",
            ProcessStatus::InProgress => "in_progress",
            ProcessStatus::Paused => "paused",
            ProcessStatus::Blocked => "blocked",
            ProcessStatus::Review => "review",
            ProcessStatus::Rework => "rework",
            ProcessStatus::Failed => "failed",
            ProcessStatus::OnHold => "on_hold",
            ProcessStatus::Completed => "completed",
            ProcessStatus::Cancelled => "cancelled",
        }
    }

    /// Being worked or awaiting sign-off
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ProcessStatus::InProgress | ProcessStatus::Paused | ProcessStatus::Review
        )
    }

    pub fn is_completed(&self) -> bool {
        *self == ProcessStatus::Completed
    }

    pub fn is_blocked(&self) -> bool {
        *self == ProcessStatus::Blocked
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessStatus::Completed | ProcessStatus::Cancelled | ProcessStatus::Failed
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProcessStatus::Planned => "Planned",
            ProcessStatus::Ready => "Ready",
            ProcessStatus::InProgress => "In Progress",
            ProcessStatus::Paused => "Paused",
            ProcessStatus::Blocked => "Blocked",
            ProcessStatus::Review => "Under Review",
            ProcessStatus::Rework => "Rework Required",
            ProcessStatus::Failed => "Failed",
            ProcessStatus::OnHold => "On Hold",
            ProcessStatus::Completed => "Completed",
            ProcessStatus::Cancelled => "Cancelled",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ProcessStatus::Planned => "📅",
            ProcessStatus::Ready => "✅",
            ProcessStatus::InProgress => "🔄",
            ProcessStatus::Paused => "⏸️",
            ProcessStatus::Blocked => "🚫",
            ProcessStatus::Review => "👀",
            ProcessStatus::Rework => "🔄",
            ProcessStatus::Failed => "❌",
            ProcessStatus::OnHold => "⏸️",
            ProcessStatus::Completed => "✅",
            ProcessStatus::Cancelled => "❌",
        }
    }

    pub fn sort_order(&self) -> u8 {
        match self {
            ProcessStatus::Planned => 0,
            ProcessStatus::Ready => 1,
            ProcessStatus::InProgress => 2,
            ProcessStatus::Paused => 3,
            ProcessStatus::Blocked => 4,
            ProcessStatus::Review => 5,
            ProcessStatus::Rework => 6,
            ProcessStatus::Failed => 7,
            ProcessStatus::OnHold => 8,
            ProcessStatus::Completed => 9,
            ProcessStatus::Cancelled => 10,
        }
    }

    /// Statuses reachable from this one through a lifecycle operation
    pub fn next_statuses(&self) -> Vec<ProcessStatus> {
        use ProcessStatus::*;
        match self {
            Planned => vec![Ready, InProgress, OnHold, Blocked, Cancelled, Failed],
            Ready => vec![InProgress, OnHold, Blocked, Cancelled, Failed],
            InProgress => vec![Paused, Review, Completed, OnHold, Blocked, Cancelled, Failed],
            Paused => vec![InProgress, OnHold, Blocked, Cancelled, Failed],
            Blocked => vec![Ready, OnHold, Cancelled, Failed],
            Review => vec![Completed, Rework, OnHold, Blocked, Cancelled, Failed],
            Rework => vec![Ready, OnHold, Blocked, Cancelled, Failed],
            OnHold => vec![Ready, Blocked, Cancelled, Failed],
            Completed | Cancelled | Failed => vec![],
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProcessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase().replace('-', "_");
        match lower.as_str() {
            "inprogress" => return Ok(ProcessStatus::InProgress),
            "onhold" => return Ok(ProcessStatus::OnHold),
            _ => {}
        }
        ProcessStatus::all()
            .iter()
            .find(|st| st.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("Invalid process status: {}", s))
    }
}

/// Skill level required to run a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn description(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Basic skills, suitable for new members",
            SkillLevel::Intermediate => "Some experience required",
            SkillLevel::Advanced => "Significant experience required",
            SkillLevel::Expert => "Mentor-level skills required",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "beginner"),
            SkillLevel::Intermediate => write!(f, "intermediate"),
            SkillLevel::Advanced => write!(f, "advanced"),
            SkillLevel::Expert => write!(f, "expert"),
        }
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            "expert" => Ok(SkillLevel::Expert),
            _ => Err(format!(
                "Invalid skill level: {}. Use beginner, intermediate, advanced, or expert",
                s
            )),
        }
    }
}

/// Links to entities owned by other parts of the team app
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessLinks {
    /// Build-season task this process belongs to (TASK-xxx)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<EntityId>,

    /// Project the task belongs to (PRJ-xxx)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<EntityId>,

    /// Parts consumed by this process (PART-xxx)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<EntityId>,
}

/// A ManufacturingProcess entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingProcess {
    /// Unique identifier (PROC-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub process_type: ProcessType,

    #[serde(default)]
    pub status: ProcessStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    #[serde(default)]
    pub actual_hours: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_completion: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end: Option<DateTime<Utc>>,

    /// Team member doing the work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,

    #[serde(default)]
    pub required_skill: SkillLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tools: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_notes: Option<String>,

    /// 0..=100, derived from completed steps
    #[serde(default)]
    pub progress: u8,

    #[serde(default)]
    pub requires_quality_inspection: bool,

    #[serde(default)]
    pub has_quality_issues: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_issues: Option<String>,

    #[serde(default)]
    pub requires_approval: bool,

    #[serde(default)]
    pub approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,

    /// Approval or rejection commentary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_notes: Option<String>,

    #[serde(default)]
    pub blocked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,

    /// Free-form log of pause/hold/cancel reasons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,

    /// Ordered by `sequence`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ManufacturingStep>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkpoints: Vec<QualityCheckpoint>,

    #[serde(default)]
    pub links: ProcessLinks,

    #[serde(default = "default_active")]
    pub active: bool,

    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,

    /// Incremented by the store on every save
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_active() -> bool {
    true
}

fn default_revision() -> u32 {
    1
}

impl Entity for ManufacturingProcess {
    const PREFIX: &'static str = "PROC";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &str {
        self.status.as_str()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl ManufacturingProcess {
    /// Create a new process in `Planned` status
    pub fn new(
        name: impl Into<String>,
        process_type: ProcessType,
        author: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Proc),
            name: name.into(),
            description: None,
            process_type,
            status: ProcessStatus::Planned,
            priority: Priority::default(),
            estimated_hours: None,
            actual_hours: 0.0,
            planned_start: None,
            planned_end: None,
            target_completion: None,
            actual_start: None,
            actual_end: None,
            assigned_to: None,
            supervisor: None,
            required_skill: SkillLevel::default(),
            required_tools: None,
            materials: None,
            safety_notes: None,
            progress: 0,
            requires_quality_inspection: false,
            has_quality_issues: false,
            quality_issues: None,
            requires_approval: false,
            approved: false,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            approval_notes: None,
            blocked: false,
            blocked_reason: None,
            notes: None,
            completion_notes: None,
            steps: Vec::new(),
            checkpoints: Vec::new(),
            links: ProcessLinks::default(),
            active: true,
            created: clock.now(),
            updated: None,
            author: author.into(),
            entity_revision: 1,
        }
    }

    fn transition(&mut self, to: ProcessStatus) {
        if self.status != to {
            tracing::debug!(process = %self.id, from = %self.status, to = %to, "process transition");
        }
        self.status = to;
    }

    /// Planned (or rework) work whose prerequisites are in place
    pub fn mark_ready(&mut self) -> Result<(), WorkflowError> {
        require_status(
            "process",
            "mark ready",
            self.status,
            &[ProcessStatus::Planned, ProcessStatus::Rework],
        )?;
        self.transition(ProcessStatus::Ready);
        Ok(())
    }

    pub fn start_process(&mut self, assignee: &str, clock: &dyn Clock) -> Result<(), WorkflowError> {
        require_status(
            "process",
            "start",
            self.status,
            &[ProcessStatus::Planned, ProcessStatus::Ready],
        )?;

        self.transition(ProcessStatus::InProgress);
        self.actual_start = Some(clock.now());
        self.assigned_to = Some(assignee.to_string());
        Ok(())
    }

    pub fn complete_process(&mut self, clock: &dyn Clock) -> Result<(), WorkflowError> {
        require_status(
            "process",
            "complete",
            self.status,
            &[ProcessStatus::InProgress, ProcessStatus::Review],
        )?;

        self.transition(ProcessStatus::Completed);
        self.actual_end = Some(clock.now());
        self.progress = 100;
        Ok(())
    }

    pub fn pause_process(&mut self, reason: Option<&str>) -> Result<(), WorkflowError> {
        require_status("process", "pause", self.status, &[ProcessStatus::InProgress])?;

        self.transition(ProcessStatus::Paused);
        if let Some(reason) = reason {
            append_note(&mut self.notes, "Paused", reason);
        }
        Ok(())
    }

    pub fn resume_process(&mut self) -> Result<(), WorkflowError> {
        require_status("process", "resume", self.status, &[ProcessStatus::Paused])?;
        self.transition(ProcessStatus::InProgress);
        Ok(())
    }

    pub fn block_process(&mut self, reason: &str) {
        self.transition(ProcessStatus::Blocked);
        self.blocked = true;
        self.blocked_reason = Some(reason.to_string());
    }

    /// Clears the blocked flag; only a `Blocked` status moves back to `Ready`
    pub fn unblock_process(&mut self) {
        if self.status == ProcessStatus::Blocked {
            self.transition(ProcessStatus::Ready);
        }
        self.blocked = false;
        self.blocked_reason = None;
    }

    pub fn completed_steps_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    /// Recompute progress from step completion; promotes to review at 100%
    pub fn update_progress_from_steps(&mut self) {
        if self.steps.is_empty() {
            return;
        }

        let completed = self.completed_steps_count();
        let percent = completed * 100 / self.steps.len();
        self.progress = u8::try_from(percent).unwrap_or(100);

        if self.progress == 100 && self.status == ProcessStatus::InProgress {
            self.transition(ProcessStatus::Review);
        }
    }

    pub fn cancel_process(&mut self, reason: Option<&str>) {
        self.transition(ProcessStatus::Cancelled);
        if let Some(reason) = reason {
            append_note(&mut self.notes, "Cancelled", reason);
        }
    }

    pub fn fail_process(&mut self, reason: Option<&str>) -> Result<(), WorkflowError> {
        let open: Vec<ProcessStatus> = ProcessStatus::all()
            .iter()
            .copied()
            .filter(|s| !s.is_terminal())
            .collect();
        require_status("process", "fail", self.status, &open)?;

        self.transition(ProcessStatus::Failed);
        if let Some(reason) = reason {
            append_note(&mut self.notes, "Failed", reason);
        }
        Ok(())
    }

    pub fn hold_process(&mut self, reason: Option<&str>) {
        self.transition(ProcessStatus::OnHold);
        if let Some(reason) = reason {
            append_note(&mut self.notes, "On Hold", reason);
        }
    }

    pub fn release_from_hold(&mut self) {
        if self.status == ProcessStatus::OnHold {
            self.transition(ProcessStatus::Ready);
        }
    }

    pub fn record_quality_issues(&mut self, issues: &str, corrective_actions: Option<&str>) {
        self.has_quality_issues = true;
        self.quality_issues = Some(issues.to_string());
        if let Some(actions) = corrective_actions {
            append_note(&mut self.notes, "Corrective Actions", actions);
        }
    }

    pub fn resolve_quality_issues(&mut self, resolution_notes: Option<&str>) {
        self.has_quality_issues = false;
        self.quality_issues = None;
        if let Some(resolution) = resolution_notes {
            append_note(&mut self.notes, "Quality Issues Resolved", resolution);
        }
    }

    /// Record sign-off; a process under review becomes completed
    pub fn approve_process(&mut self, approver: &str, notes: Option<&str>, clock: &dyn Clock) {
        self.approved_by = Some(approver.to_string());
        self.approval_notes = notes.map(String::from);

        if self.status == ProcessStatus::Review {
            let now = clock.now();
            self.transition(ProcessStatus::Completed);
            self.approved = true;
            self.approved_at = Some(now);
            self.actual_end.get_or_insert(now);
            self.progress = 100;
        }
    }

    /// Send a reviewed process back for rework
    pub fn reject_process(&mut self, rejecter: &str, reason: &str) -> Result<(), WorkflowError> {
        require_status("process", "reject", self.status, &[ProcessStatus::Review])?;

        self.rejected_by = Some(rejecter.to_string());
        self.approval_notes = Some(reason.to_string());
        self.approved = false;
        self.transition(ProcessStatus::Rework);
        Ok(())
    }

    /// Wall-clock hours between actual start and end
    pub fn actual_duration_hours(&self) -> Option<f64> {
        match (self.actual_start, self.actual_end) {
            (Some(start), Some(end)) => Some((end - start).num_minutes() as f64 / 60.0),
            _ => None,
        }
    }

    /// Logged hours, or the start-to-end span when nothing was logged
    pub fn worked_hours(&self) -> Option<f64> {
        if self.actual_hours > 0.0 {
            Some(self.actual_hours)
        } else {
            self.actual_duration_hours()
        }
    }

    /// Target completion date, falling back to the planned end
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.target_completion.or(self.planned_end)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.deadline().is_some_and(|deadline| now > deadline)
    }

    /// Append a step at the end of the sequence
    pub fn add_step(&mut self, name: impl Into<String>) -> &mut ManufacturingStep {
        let sequence = self.steps.iter().map(|s| s.sequence).max().unwrap_or(0) + 1;
        self.steps.push(ManufacturingStep::new(sequence, name));
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    pub fn add_checkpoint(&mut self, checkpoint: QualityCheckpoint) -> &mut QualityCheckpoint {
        self.checkpoints.push(checkpoint);
        let last = self.checkpoints.len() - 1;
        &mut self.checkpoints[last]
    }

    /// Find a step by sequence number or (partial) ID
    pub fn step_mut(&mut self, reference: &str) -> Option<&mut ManufacturingStep> {
        if let Ok(sequence) = reference.parse::<u32>() {
            return self.steps.iter_mut().find(|s| s.sequence == sequence);
        }
        let needle = reference.to_uppercase();
        self.steps
            .iter_mut()
            .find(|s| s.id.to_string().contains(&needle))
    }

    /// Find a checkpoint by 1-based position, name, or (partial) ID
    pub fn checkpoint_mut(&mut self, reference: &str) -> Option<&mut QualityCheckpoint> {
        if let Ok(position) = reference.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|idx| self.checkpoints.get_mut(idx));
        }
        let needle = reference.to_uppercase();
        self.checkpoints.iter_mut().find(|c| {
            c.name.eq_ignore_ascii_case(reference) || c.id.to_string().contains(&needle)
        })
    }

    pub fn blocking_checkpoints(&self) -> impl Iterator<Item = &QualityCheckpoint> {
        self.checkpoints.iter().filter(|c| c.blocks_completion())
    }

    pub fn is_completion_blocked(&self) -> bool {
        self.blocking_checkpoints().next().is_some()
    }

    pub fn touch(&mut self, clock: &dyn Clock) {
        self.updated = Some(clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::entities::checkpoint::{CheckpointResult, CheckpointType};
    use chrono::{Duration, TimeZone};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 18, 9, 0, 0).unwrap())
    }

    fn process(clock: &FixedClock) -> ManufacturingProcess {
        ManufacturingProcess::new("Swerve module plates", ProcessType::Machining, "sam", clock)
    }

    fn with_status(status: ProcessStatus) -> ManufacturingProcess {
        let clock = clock();
        let mut p = process(&clock);
        p.status = status;
        p
    }

    #[test]
    fn test_process_creation() {
        let clock = clock();
        let p = process(&clock);
        assert!(p.id.to_string().starts_with("PROC-"));
        assert_eq!(p.status, ProcessStatus::Planned);
        assert_eq!(p.created, clock.now());
        assert_eq!(p.progress, 0);
        assert_eq!(ManufacturingProcess::PREFIX, "PROC");
        assert_eq!(p.title(), "Swerve module plates");
        assert_eq!(Entity::status(&p), "planned");
    }

    #[test]
    fn test_start_allowed_only_from_planned_or_ready() {
        for status in ProcessStatus::all() {
            let clock = clock();
            let mut p = with_status(*status);
            let result = p.start_process("alex", &clock);

            if matches!(status, ProcessStatus::Planned | ProcessStatus::Ready) {
                assert!(result.is_ok(), "start from {}", status);
                assert_eq!(p.status, ProcessStatus::InProgress);
                assert_eq!(p.actual_start, Some(clock.now()));
                assert_eq!(p.assigned_to.as_deref(), Some("alex"));
            } else {
                assert!(result.is_err(), "start from {}", status);
                assert_eq!(p.status, *status);
                assert!(p.actual_start.is_none());
                assert!(p.assigned_to.is_none());
            }
        }
    }

    #[test]
    fn test_complete_allowed_only_from_in_progress_or_review() {
        for status in ProcessStatus::all() {
            let clock = clock();
            let mut p = with_status(*status);
            p.progress = 40;
            let result = p.complete_process(&clock);

            if matches!(status, ProcessStatus::InProgress | ProcessStatus::Review) {
                assert!(result.is_ok(), "complete from {}", status);
                assert_eq!(p.status, ProcessStatus::Completed);
                assert_eq!(p.progress, 100);
                assert_eq!(p.actual_end, Some(clock.now()));
            } else {
                assert!(result.is_err(), "complete from {}", status);
                assert_eq!(p.status, *status);
                assert_eq!(p.progress, 40);
            }
        }
    }

    #[test]
    fn test_pause_and_resume() {
        let clock = clock();
        let mut p = process(&clock);

        assert!(p.pause_process(Some("too early")).is_err());
        assert!(p.notes.is_none());

        p.start_process("alex", &clock).unwrap();
        p.pause_process(Some("waiting on end mill")).unwrap();
        assert_eq!(p.status, ProcessStatus::Paused);
        assert_eq!(p.notes.as_deref(), Some("Paused: waiting on end mill"));

        p.resume_process().unwrap();
        assert_eq!(p.status, ProcessStatus::InProgress);
        assert!(p.resume_process().is_err());
    }

    #[test]
    fn test_unblock_from_blocked_returns_to_ready() {
        let clock = clock();
        let mut p = process(&clock);
        p.start_process("alex", &clock).unwrap();

        p.block_process("out of 1/4\" plate");
        assert_eq!(p.status, ProcessStatus::Blocked);
        assert!(p.blocked);

        p.unblock_process();
        assert_eq!(p.status, ProcessStatus::Ready);
        assert!(!p.blocked);
        assert!(p.blocked_reason.is_none());
    }

    #[test]
    fn test_unblock_elsewhere_only_clears_flag() {
        for status in ProcessStatus::all() {
            if *status == ProcessStatus::Blocked {
                continue;
            }
            let mut p = with_status(*status);
            p.blocked = true;
            p.blocked_reason = Some("stale".to_string());

            p.unblock_process();
            assert_eq!(p.status, *status);
            assert!(!p.blocked);
            assert!(p.blocked_reason.is_none());
        }
    }

    #[test]
    fn test_progress_no_steps_is_noop() {
        let mut p = with_status(ProcessStatus::InProgress);
        p.progress = 35;
        p.update_progress_from_steps();
        assert_eq!(p.progress, 35);
        assert_eq!(p.status, ProcessStatus::InProgress);
    }

    #[test]
    fn test_progress_floors_percentage() {
        let clock = clock();
        let mut p = with_status(ProcessStatus::InProgress);
        for name in ["Cut", "Drill", "Tap"] {
            p.add_step(name);
        }
        p.steps[0].start_step("alex", &clock).unwrap();
        p.steps[0].complete_step(&clock).unwrap();

        p.update_progress_from_steps();
        assert_eq!(p.progress, 33);
        assert_eq!(p.status, ProcessStatus::InProgress);
    }

    #[test]
    fn test_full_progress_only_promotes_in_progress() {
        let clock = clock();
        let mut p = with_status(ProcessStatus::Paused);
        let step = p.add_step("Only step");
        step.start_step("alex", &clock).unwrap();
        step.complete_step(&clock).unwrap();

        p.update_progress_from_steps();
        assert_eq!(p.progress, 100);
        assert_eq!(p.status, ProcessStatus::Paused);
    }

    #[test]
    fn test_hold_and_release() {
        let clock = clock();
        let mut p = process(&clock);
        p.release_from_hold();
        assert_eq!(p.status, ProcessStatus::Planned);

        p.hold_process(Some("drive base redesign"));
        assert_eq!(p.status, ProcessStatus::OnHold);
        assert_eq!(p.notes.as_deref(), Some("On Hold: drive base redesign"));

        p.release_from_hold();
        assert_eq!(p.status, ProcessStatus::Ready);
    }

    #[test]
    fn test_cancel_appends_reason() {
        let mut p = with_status(ProcessStatus::Paused);
        p.notes = Some("Paused: lunch".to_string());
        p.cancel_process(Some("part sourced from vendor"));
        assert_eq!(p.status, ProcessStatus::Cancelled);
        assert_eq!(
            p.notes.as_deref(),
            Some("Paused: lunch\nCancelled: part sourced from vendor")
        );
    }

    #[test]
    fn test_fail_rejected_once_terminal() {
        let mut p = with_status(ProcessStatus::InProgress);
        p.fail_process(Some("cracked weld")).unwrap();
        assert_eq!(p.status, ProcessStatus::Failed);
        assert_eq!(p.notes.as_deref(), Some("Failed: cracked weld"));

        let mut done = with_status(ProcessStatus::Completed);
        assert!(done.fail_process(None).is_err());
        assert_eq!(done.status, ProcessStatus::Completed);
    }

    #[test]
    fn test_approve_outside_review_records_only() {
        let clock = clock();
        let mut p = with_status(ProcessStatus::InProgress);
        p.approve_process("mentor", Some("looks good so far"), &clock);
        assert_eq!(p.status, ProcessStatus::InProgress);
        assert_eq!(p.approved_by.as_deref(), Some("mentor"));
        assert!(!p.approved);
        assert!(p.approved_at.is_none());
    }

    #[test]
    fn test_approve_from_review_completes() {
        let clock = clock();
        let mut p = with_status(ProcessStatus::Review);
        p.approve_process("mentor", Some("ok"), &clock);
        assert_eq!(p.status, ProcessStatus::Completed);
        assert!(p.approved);
        assert_eq!(p.approved_at, Some(clock.now()));
        assert_eq!(p.approval_notes.as_deref(), Some("ok"));
    }

    #[test]
    fn test_reject_requires_review() {
        let mut p = with_status(ProcessStatus::InProgress);
        assert!(p.reject_process("mentor", "not yet").is_err());
        assert_eq!(p.status, ProcessStatus::InProgress);
        assert!(p.rejected_by.is_none());

        let mut p = with_status(ProcessStatus::Review);
        p.reject_process("mentor", "holes out of position").unwrap();
        assert_eq!(p.status, ProcessStatus::Rework);
        assert_eq!(p.rejected_by.as_deref(), Some("mentor"));
        assert_eq!(p.approval_notes.as_deref(), Some("holes out of position"));

        p.mark_ready().unwrap();
        assert_eq!(p.status, ProcessStatus::Ready);
    }

    #[test]
    fn test_quality_issue_lifecycle() {
        let mut p = with_status(ProcessStatus::InProgress);
        p.record_quality_issues("burrs on edges", Some("deburr all edges"));
        assert!(p.has_quality_issues);
        assert_eq!(p.quality_issues.as_deref(), Some("burrs on edges"));

        p.resolve_quality_issues(Some("deburred"));
        assert!(!p.has_quality_issues);
        assert!(p.quality_issues.is_none());
        assert_eq!(
            p.notes.as_deref(),
            Some("Corrective Actions: deburr all edges\nQuality Issues Resolved: deburred")
        );
    }

    #[test]
    fn test_duration_and_overdue() {
        let clock = clock();
        let mut p = process(&clock);
        p.target_completion = Some(clock.now() + Duration::hours(2));
        assert!(!p.is_overdue(clock.now()));

        p.start_process("alex", &clock).unwrap();
        clock.advance(Duration::minutes(150));
        assert!(p.is_overdue(clock.now()));

        p.complete_process(&clock).unwrap();
        assert!(!p.is_overdue(clock.now()));
        assert_eq!(p.actual_duration_hours(), Some(2.5));
    }

    #[test]
    fn test_completion_blocked_by_checkpoints() {
        let clock = clock();
        let mut p = process(&clock);
        assert!(!p.is_completion_blocked());

        p.add_checkpoint(QualityCheckpoint::new("Flatness", CheckpointType::Dimensional));
        let mut optional = QualityCheckpoint::new("Cosmetic", CheckpointType::Finish);
        optional.mandatory = false;
        p.add_checkpoint(optional);
        assert_eq!(p.blocking_checkpoints().count(), 1);

        let qc = p.checkpoint_mut("flatness").unwrap();
        qc.start_inspection("jordan").unwrap();
        qc.complete_inspection(CheckpointResult::Pass, None, &clock)
            .unwrap();
        assert!(!p.is_completion_blocked());
    }

    #[test]
    fn test_step_lookup() {
        let mut p = with_status(ProcessStatus::Planned);
        p.add_step("Cut");
        p.add_step("Drill");
        assert_eq!(p.step_mut("2").map(|s| s.name.clone()), Some("Drill".to_string()));
        let id = p.steps[0].id.to_string();
        assert_eq!(p.step_mut(&id).map(|s| s.sequence), Some(1));
        let tail = id[id.len() - 8..].to_lowercase();
        assert_eq!(p.step_mut(&tail).map(|s| s.sequence), Some(1));
        assert!(p.step_mut("9").is_none());
        assert!(p.checkpoint_mut("0").is_none());
    }

    #[test]
    fn test_process_roundtrip() {
        let clock = clock();
        let mut p = process(&clock);
        p.add_step("Cut");
        p.add_checkpoint(QualityCheckpoint::new("Flatness", CheckpointType::Dimensional));

        let yaml = serde_yml::to_string(&p).unwrap();
        assert!(yaml.contains("status: planned"));
        assert!(yaml.contains("process_type: machining"));

        let parsed: ManufacturingProcess = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, p.id);
        assert_eq!(parsed.steps.len(), 1);
        assert_eq!(parsed.checkpoints.len(), 1);
        assert!(parsed.checkpoints[0].blocking);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "in_progress".parse::<ProcessStatus>().unwrap(),
            ProcessStatus::InProgress
        );
        assert_eq!("on-hold".parse::<ProcessStatus>().unwrap(), ProcessStatus::OnHold);
        assert!("done".parse::<ProcessStatus>().is_err());
        assert_eq!("Welding".parse::<ProcessType>().unwrap(), ProcessType::Welding);
    }

    #[test]
    fn test_terminal_statuses_have_no_successors() {
        for status in ProcessStatus::all() {
            assert_eq!(status.is_terminal(), status.next_statuses().is_empty());
        }
    }
}
