//! Workshop service - runs lifecycle operations against a process store
//!
//! Each operation loads a process by (partial) ID, applies one transition and
//! saves it back. Completion and approval are refused while a quality
//! checkpoint still blocks the process.

use chrono::Duration;
use thiserror::Error;

use crate::core::clock::Clock;
use crate::core::entity::Priority;
use crate::core::identity::EntityId;
use crate::core::store::{ProcessStore, StoreError};
use crate::core::workflow::WorkflowError;
use crate::entities::checkpoint::{CheckpointResult, QualityCheckpoint};
use crate::entities::process::{ManufacturingProcess, ProcessStatus, ProcessType};
use crate::entities::step::ManufacturingStep;

#[derive(Debug, Error)]
pub enum WorkshopError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{process} has no step '{reference}'")]
    StepNotFound { process: String, reference: String },

    #[error("{process} has no checkpoint '{reference}'")]
    CheckpointNotFound { process: String, reference: String },

    #[error("cannot complete {process}: blocked by checkpoint(s) {}", .checkpoints.join(", "))]
    CompletionBlocked {
        process: String,
        checkpoints: Vec<String>,
    },
}

pub type WorkshopResult<T> = Result<T, WorkshopError>;

/// Aggregate figures across all stored processes
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ProcessMetrics {
    pub total: usize,
    pub completed: usize,
    pub with_quality_issues: usize,
    pub average_estimated_hours: Option<f64>,
    pub average_actual_hours: Option<f64>,
    /// Non-zero counts in status sort order
    pub by_status: Vec<(ProcessStatus, usize)>,
    /// Non-zero counts, most common first
    pub by_type: Vec<(ProcessType, usize)>,
}

impl ProcessMetrics {
    /// Percentage of processes that are completed
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn sort_processes(processes: &mut [ManufacturingProcess]) {
    processes.sort_by(|a, b| {
        a.priority
            .sort_order()
            .cmp(&b.priority.sort_order())
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn step_in<'a>(
    process: &'a mut ManufacturingProcess,
    reference: &str,
) -> WorkshopResult<&'a mut ManufacturingStep> {
    let id = process.id.to_string();
    process
        .step_mut(reference)
        .ok_or_else(|| WorkshopError::StepNotFound {
            process: id,
            reference: reference.to_string(),
        })
}

fn checkpoint_in<'a>(
    process: &'a mut ManufacturingProcess,
    reference: &str,
) -> WorkshopResult<&'a mut QualityCheckpoint> {
    let id = process.id.to_string();
    process
        .checkpoint_mut(reference)
        .ok_or_else(|| WorkshopError::CheckpointNotFound {
            process: id,
            reference: reference.to_string(),
        })
}

fn ensure_not_blocked(process: &ManufacturingProcess) -> WorkshopResult<()> {
    let blocking: Vec<String> = process
        .blocking_checkpoints()
        .map(|c| c.name.clone())
        .collect();
    if blocking.is_empty() {
        return Ok(());
    }
    Err(WorkshopError::CompletionBlocked {
        process: process.id.to_string(),
        checkpoints: blocking,
    })
}

pub struct Workshop<S: ProcessStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: ProcessStore, C: Clock> Workshop<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Build an unsaved process stamped with this workshop's clock
    pub fn draft(
        &self,
        name: &str,
        process_type: ProcessType,
        author: &str,
    ) -> ManufacturingProcess {
        ManufacturingProcess::new(name, process_type, author, &self.clock)
    }

    pub fn create(&mut self, mut process: ManufacturingProcess) -> WorkshopResult<ManufacturingProcess> {
        self.store.save(&mut process)?;
        tracing::info!(process = %process.id, name = %process.name, "created process");
        Ok(process)
    }

    pub fn get(&self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        Ok(self.store.find(reference)?)
    }

    pub fn delete(&mut self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        let process = self.store.find(reference)?;
        self.store.delete(&process.id)?;
        Ok(process)
    }

    /// Load, mutate and save a process; nothing is written if `change` fails
    pub fn modify<F>(&mut self, reference: &str, change: F) -> WorkshopResult<ManufacturingProcess>
    where
        F: FnOnce(&mut ManufacturingProcess, &C) -> WorkshopResult<()>,
    {
        let mut process = self.store.find(reference)?;
        change(&mut process, &self.clock)?;
        process.touch(&self.clock);
        self.store.save(&mut process)?;
        Ok(process)
    }

    // ---- process lifecycle ----

    pub fn mark_ready(&mut self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| Ok(p.mark_ready()?))
    }

    pub fn start(&mut self, reference: &str, assignee: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| Ok(p.start_process(assignee, clock)?))
    }

    pub fn pause(&mut self, reference: &str, reason: Option<&str>) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| Ok(p.pause_process(reason)?))
    }

    pub fn resume(&mut self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| Ok(p.resume_process()?))
    }

    pub fn block(&mut self, reference: &str, reason: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.block_process(reason);
            Ok(())
        })
    }

    pub fn unblock(&mut self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.unblock_process();
            Ok(())
        })
    }

    pub fn hold(&mut self, reference: &str, reason: Option<&str>) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.hold_process(reason);
            Ok(())
        })
    }

    pub fn release(&mut self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.release_from_hold();
            Ok(())
        })
    }

    pub fn cancel(&mut self, reference: &str, reason: Option<&str>) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.cancel_process(reason);
            Ok(())
        })
    }

    pub fn fail(&mut self, reference: &str, reason: Option<&str>) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| Ok(p.fail_process(reason)?))
    }

    pub fn complete(
        &mut self,
        reference: &str,
        completion_notes: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            ensure_not_blocked(p)?;
            p.complete_process(clock)?;
            if let Some(notes) = completion_notes {
                p.completion_notes = Some(notes.to_string());
            }
            Ok(())
        })
    }

    pub fn approve(
        &mut self,
        reference: &str,
        approver: &str,
        notes: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            if p.status == ProcessStatus::Review {
                ensure_not_blocked(p)?;
            }
            p.approve_process(approver, notes, clock);
            Ok(())
        })
    }

    pub fn reject(&mut self, reference: &str, rejecter: &str, reason: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| Ok(p.reject_process(rejecter, reason)?))
    }

    pub fn record_quality_issues(
        &mut self,
        reference: &str,
        issues: &str,
        corrective_actions: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.record_quality_issues(issues, corrective_actions);
            Ok(())
        })
    }

    pub fn resolve_quality_issues(
        &mut self,
        reference: &str,
        resolution: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.resolve_quality_issues(resolution);
            Ok(())
        })
    }

    pub fn refresh_progress(&mut self, reference: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.update_progress_from_steps();
            Ok(())
        })
    }

    // ---- steps ----

    /// Append a step after the current last sequence number
    pub fn add_step(
        &mut self,
        reference: &str,
        name: &str,
        instructions: Option<&str>,
        estimated_minutes: Option<u32>,
        requires_verification: bool,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            let step = p.add_step(name);
            step.instructions = instructions.map(String::from);
            step.estimated_minutes = estimated_minutes;
            step.requires_verification = requires_verification;
            p.update_progress_from_steps();
            Ok(())
        })
    }

    pub fn start_step(
        &mut self,
        reference: &str,
        step: &str,
        performer: &str,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            Ok(step_in(p, step)?.start_step(performer, clock)?)
        })
    }

    /// Complete a step, log its minutes against the process, and refresh progress
    pub fn complete_step(&mut self, reference: &str, step: &str) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            let minutes = {
                let s = step_in(p, step)?;
                s.complete_step(clock)?;
                s.actual_minutes
            };
            p.actual_hours += f64::from(minutes) / 60.0;
            p.update_progress_from_steps();
            Ok(())
        })
    }

    pub fn verify_step(
        &mut self,
        reference: &str,
        step: &str,
        verifier: &str,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            Ok(step_in(p, step)?.verify_step(verifier, clock)?)
        })
    }

    pub fn skip_step(
        &mut self,
        reference: &str,
        step: &str,
        reason: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            step_in(p, step)?.skip_step(reason, clock);
            Ok(())
        })
    }

    pub fn fail_step(
        &mut self,
        reference: &str,
        step: &str,
        reason: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            step_in(p, step)?.fail_step(reason);
            Ok(())
        })
    }

    // ---- checkpoints ----

    pub fn add_checkpoint(
        &mut self,
        reference: &str,
        checkpoint: QualityCheckpoint,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            p.add_checkpoint(checkpoint);
            Ok(())
        })
    }

    pub fn start_inspection(
        &mut self,
        reference: &str,
        checkpoint: &str,
        inspector: &str,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            Ok(checkpoint_in(p, checkpoint)?.start_inspection(inspector)?)
        })
    }

    pub fn complete_inspection(
        &mut self,
        reference: &str,
        checkpoint: &str,
        result: CheckpointResult,
        notes: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, clock| {
            Ok(checkpoint_in(p, checkpoint)?.complete_inspection(result, notes, clock)?)
        })
    }

    pub fn record_checkpoint_issues(
        &mut self,
        reference: &str,
        checkpoint: &str,
        issues: &str,
        corrective_actions: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            checkpoint_in(p, checkpoint)?.record_issues(issues, corrective_actions);
            Ok(())
        })
    }

    pub fn skip_checkpoint(
        &mut self,
        reference: &str,
        checkpoint: &str,
        reason: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            checkpoint_in(p, checkpoint)?.skip_checkpoint(reason);
            Ok(())
        })
    }

    pub fn defer_checkpoint(
        &mut self,
        reference: &str,
        checkpoint: &str,
        reason: Option<&str>,
    ) -> WorkshopResult<ManufacturingProcess> {
        self.modify(reference, |p, _| {
            checkpoint_in(p, checkpoint)?.defer_checkpoint(reason);
            Ok(())
        })
    }

    // ---- queries ----

    /// All processes, sorted by priority then name
    pub fn all(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|_| true)
    }

    fn query<F>(&self, keep: F) -> WorkshopResult<Vec<ManufacturingProcess>>
    where
        F: Fn(&ManufacturingProcess) -> bool,
    {
        let mut processes: Vec<_> = self.store.list()?.into_iter().filter(|p| keep(p)).collect();
        sort_processes(&mut processes);
        Ok(processes)
    }

    pub fn find_by_status(&self, status: ProcessStatus) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.status == status)
    }

    pub fn find_by_type(&self, process_type: ProcessType) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.process_type == process_type)
    }

    pub fn find_by_priority(&self, priority: Priority) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.priority == priority)
    }

    pub fn find_by_task(&self, task: &EntityId) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.links.task.as_ref() == Some(task))
    }

    pub fn find_by_project(&self, project: &EntityId) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.links.project.as_ref() == Some(project))
    }

    pub fn find_by_assignee(&self, member: &str) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| {
            p.assigned_to
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(member))
        })
    }

    /// Planned or ready work that can be picked up
    pub fn find_ready(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| matches!(p.status, ProcessStatus::Planned | ProcessStatus::Ready))
    }

    pub fn find_active(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.find_by_status(ProcessStatus::InProgress)
    }

    pub fn find_blocked(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.status.is_blocked() || p.blocked)
    }

    pub fn find_needing_attention(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| {
            matches!(
                p.status,
                ProcessStatus::Failed | ProcessStatus::OnHold | ProcessStatus::Blocked
            )
        })
    }

    pub fn find_completed(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.find_by_status(ProcessStatus::Completed)
    }

    pub fn find_overdue(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        let now = self.clock.now();
        self.query(|p| p.is_overdue(now))
    }

    /// Open processes whose deadline falls within the next `days` days
    ///
    /// A window too large to represent has no upper bound.
    pub fn find_approaching_deadline(&self, days: i64) -> WorkshopResult<Vec<ManufacturingProcess>> {
        let now = self.clock.now();
        let horizon = Duration::try_days(days).and_then(|window| now.checked_add_signed(window));
        self.query(|p| {
            !p.status.is_terminal()
                && p.deadline().is_some_and(|deadline| {
                    deadline >= now && horizon.map_or(true, |horizon| deadline <= horizon)
                })
        })
    }

    pub fn find_with_quality_issues(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.has_quality_issues)
    }

    pub fn find_awaiting_approval(&self) -> WorkshopResult<Vec<ManufacturingProcess>> {
        self.query(|p| p.requires_approval && !p.approved)
    }

    pub fn search_by_name(&self, text: &str) -> WorkshopResult<Vec<ManufacturingProcess>> {
        let needle = text.to_lowercase();
        self.query(|p| p.name.to_lowercase().contains(&needle))
    }

    pub fn metrics(&self) -> WorkshopResult<ProcessMetrics> {
        let processes = self.store.list()?;

        let by_status = ProcessStatus::all()
            .iter()
            .map(|s| (*s, processes.iter().filter(|p| p.status == *s).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        let mut by_type: Vec<(ProcessType, usize)> = ProcessType::all()
            .iter()
            .map(|t| (*t, processes.iter().filter(|p| p.process_type == *t).count()))
            .filter(|(_, n)| *n > 0)
            .collect();
        by_type.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(ProcessMetrics {
            total: processes.len(),
            completed: processes.iter().filter(|p| p.status.is_completed()).count(),
            with_quality_issues: processes.iter().filter(|p| p.has_quality_issues).count(),
            average_estimated_hours: average(processes.iter().filter_map(|p| p.estimated_hours)),
            average_actual_hours: average(
                processes
                    .iter()
                    .filter(|p| p.status.is_completed())
                    .filter_map(|p| p.worked_hours()),
            ),
            by_status,
            by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::store::MemoryStore;
    use crate::entities::checkpoint::CheckpointType;
    use chrono::{TimeZone, Utc};

    fn workshop() -> Workshop<MemoryStore, FixedClock> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap());
        Workshop::new(MemoryStore::new(), clock)
    }

    fn create(ws: &mut Workshop<MemoryStore, FixedClock>, name: &str) -> String {
        let draft = ws.draft(name, ProcessType::Machining, "sam");
        ws.create(draft).unwrap().id.to_string()
    }

    #[test]
    fn test_three_step_scenario_through_approval() {
        let mut ws = workshop();
        let id = create(&mut ws, "Gearbox plates");
        for name in ["Face", "Drill", "Chamfer"] {
            ws.add_step(&id, name, None, None, false).unwrap();
        }

        ws.start(&id, "alex").unwrap();
        for seq in ["1", "2"] {
            ws.start_step(&id, seq, "alex").unwrap();
            ws.complete_step(&id, seq).unwrap();
        }
        let p = ws.get(&id).unwrap();
        assert_eq!(p.progress, 66);
        assert_eq!(p.status, ProcessStatus::InProgress);

        ws.start_step(&id, "3", "alex").unwrap();
        let p = ws.complete_step(&id, "3").unwrap();
        assert_eq!(p.progress, 100);
        assert_eq!(p.status, ProcessStatus::Review);

        let p = ws.approve(&id, "mentor", Some("clean work")).unwrap();
        assert_eq!(p.status, ProcessStatus::Completed);
        assert!(p.approved);
        assert_eq!(p.approved_by.as_deref(), Some("mentor"));
    }

    #[test]
    fn test_complete_refused_while_checkpoint_blocks() {
        let mut ws = workshop();
        let id = create(&mut ws, "Weld frame");
        ws.add_checkpoint(&id, QualityCheckpoint::new("Weld penetration", CheckpointType::Visual))
            .unwrap();
        ws.start(&id, "alex").unwrap();

        let err = ws.complete(&id, None).unwrap_err();
        match err {
            WorkshopError::CompletionBlocked { checkpoints, .. } => {
                assert_eq!(checkpoints, vec!["Weld penetration".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ws.get(&id).unwrap().status, ProcessStatus::InProgress);

        ws.start_inspection(&id, "1", "jordan").unwrap();
        ws.complete_inspection(&id, "1", CheckpointResult::Pass, Some("good"))
            .unwrap();
        let p = ws.complete(&id, Some("frame done")).unwrap();
        assert_eq!(p.status, ProcessStatus::Completed);
        assert_eq!(p.completion_notes.as_deref(), Some("frame done"));
    }

    #[test]
    fn test_failed_inspection_blocks_approval() {
        let mut ws = workshop();
        let id = create(&mut ws, "Intake rollers");
        ws.add_checkpoint(&id, QualityCheckpoint::new("Roller spacing", CheckpointType::Dimensional))
            .unwrap();
        ws.add_step(&id, "Assemble", None, None, false).unwrap();
        ws.start(&id, "alex").unwrap();
        ws.start_step(&id, "1", "alex").unwrap();
        ws.complete_step(&id, "1").unwrap();
        ws.start_inspection(&id, "roller spacing", "jordan").unwrap();
        ws.complete_inspection(&id, "roller spacing", CheckpointResult::NeedsRework, None)
            .unwrap();

        assert!(matches!(
            ws.approve(&id, "mentor", None),
            Err(WorkshopError::CompletionBlocked { .. })
        ));

        let p = ws.reject(&id, "mentor", "spacing off by 2mm").unwrap();
        assert_eq!(p.status, ProcessStatus::Rework);
    }

    #[test]
    fn test_invalid_transition_leaves_store_untouched() {
        let mut ws = workshop();
        let id = create(&mut ws, "Paint bumpers");

        assert!(matches!(ws.resume(&id), Err(WorkshopError::Workflow(_))));
        let p = ws.get(&id).unwrap();
        assert_eq!(p.status, ProcessStatus::Planned);
        assert_eq!(p.entity_revision, 1);
        assert!(p.updated.is_none());
    }

    #[test]
    fn test_unknown_step_and_checkpoint() {
        let mut ws = workshop();
        let id = create(&mut ws, "Wire PDH");
        assert!(matches!(
            ws.start_step(&id, "4", "alex"),
            Err(WorkshopError::StepNotFound { .. })
        ));
        assert!(matches!(
            ws.skip_checkpoint(&id, "label check", None),
            Err(WorkshopError::CheckpointNotFound { .. })
        ));
        assert!(matches!(
            ws.get("PROC-NOPE"),
            Err(WorkshopError::Store(StoreError::NotFound(_)))
        ));
    }

    #[test]
    fn test_complete_step_logs_hours() {
        let mut ws = workshop();
        let id = create(&mut ws, "Cut polycarb");
        ws.add_step(&id, "Cut", None, Some(30), false).unwrap();
        ws.add_step(&id, "Sand", Some("120 then 220 grit"), None, true).unwrap();
        ws.start(&id, "alex").unwrap();

        ws.start_step(&id, "1", "alex").unwrap();
        ws.clock().advance(Duration::minutes(90));
        let p = ws.complete_step(&id, "1").unwrap();
        assert_eq!(p.actual_hours, 1.5);
        assert_eq!(p.progress, 50);
    }

    #[test]
    fn test_queries_sorted_by_priority_then_name() {
        let mut ws = workshop();
        for (name, priority) in [
            ("Zip ties", Priority::Low),
            ("Bumper", Priority::Critical),
            ("Arm", Priority::Critical),
        ] {
            let mut draft = ws.draft(name, ProcessType::Assembly, "sam");
            draft.priority = priority;
            ws.create(draft).unwrap();
        }

        let names: Vec<String> = ws.find_ready().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Arm", "Bumper", "Zip ties"]);
        assert_eq!(ws.find_by_priority(Priority::Critical).unwrap().len(), 2);
        assert_eq!(ws.search_by_name("BUM").unwrap().len(), 1);
    }

    #[test]
    fn test_deadline_queries() {
        let mut ws = workshop();
        let now = ws.clock().now();

        let mut late = ws.draft("Late", ProcessType::Welding, "sam");
        late.target_completion = Some(now - Duration::days(1));
        ws.create(late).unwrap();

        let mut soon = ws.draft("Soon", ProcessType::Welding, "sam");
        soon.target_completion = Some(now + Duration::days(2));
        ws.create(soon).unwrap();

        let mut later = ws.draft("Later", ProcessType::Welding, "sam");
        later.planned_end = Some(now + Duration::days(10));
        ws.create(later).unwrap();

        let overdue: Vec<String> = ws.find_overdue().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(overdue, vec!["Late"]);

        let approaching: Vec<String> = ws
            .find_approaching_deadline(3)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(approaching, vec!["Soon"]);
    }

    #[test]
    fn test_approaching_deadline_with_huge_window() {
        let mut ws = workshop();
        let now = ws.clock().now();

        let mut far = ws.draft("Next season", ProcessType::Assembly, "sam");
        far.target_completion = Some(now + Duration::days(4000));
        ws.create(far).unwrap();

        let mut late = ws.draft("Late", ProcessType::Welding, "sam");
        late.target_completion = Some(now - Duration::days(1));
        ws.create(late).unwrap();

        for days in [10_000_000_000_000, i64::MAX] {
            let names: Vec<String> = ws
                .find_approaching_deadline(days)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect();
            assert_eq!(names, vec!["Next season"]);
        }
        assert!(ws.find_approaching_deadline(-5).unwrap().is_empty());
    }

    #[test]
    fn test_add_step_details() {
        let mut ws = workshop();
        let id = create(&mut ws, "Torque wheels");
        let p = ws
            .add_step(&id, "Torque lug nuts", Some("35 ft-lb, star pattern"), Some(15), true)
            .unwrap();

        let step = &p.steps[0];
        assert_eq!(step.sequence, 1);
        assert_eq!(step.instructions.as_deref(), Some("35 ft-lb, star pattern"));
        assert_eq!(step.estimated_minutes, Some(15));
        assert!(step.requires_verification);
    }

    #[test]
    fn test_attention_and_links() {
        let mut ws = workshop();
        let task = EntityId::new(crate::core::identity::EntityPrefix::Task);

        let mut linked = ws.draft("Linked", ProcessType::Wiring, "sam");
        linked.links.task = Some(task.clone());
        let linked = ws.create(linked).unwrap().id.to_string();
        let other = create(&mut ws, "Other");

        ws.hold(&linked, Some("waiting on parts")).unwrap();
        ws.block(&other, "no stock").unwrap();
        ws.record_quality_issues(&other, "scratches", None).unwrap();

        assert_eq!(ws.find_by_task(&task).unwrap().len(), 1);
        assert_eq!(ws.find_needing_attention().unwrap().len(), 2);
        assert_eq!(ws.find_blocked().unwrap().len(), 1);
        assert_eq!(ws.find_with_quality_issues().unwrap().len(), 1);
    }

    #[test]
    fn test_metrics() {
        let mut ws = workshop();
        let a = create(&mut ws, "A");
        let mut b = ws.draft("B", ProcessType::Welding, "sam");
        b.estimated_hours = Some(4.0);
        ws.create(b).unwrap();

        ws.start(&a, "alex").unwrap();
        ws.clock().advance(Duration::hours(2));
        ws.complete(&a, None).unwrap();

        let metrics = ws.metrics().unwrap();
        assert_eq!(metrics.total, 2);
        assert_eq!(metrics.completed, 1);
        assert_eq!(metrics.completion_rate(), 50.0);
        assert_eq!(metrics.average_estimated_hours, Some(4.0));
        assert_eq!(metrics.average_actual_hours, Some(2.0));
        assert_eq!(
            metrics.by_status,
            vec![(ProcessStatus::Planned, 1), (ProcessStatus::Completed, 1)]
        );
        assert_eq!(metrics.by_type.len(), 2);
    }
}
