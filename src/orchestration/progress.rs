//! Per-run stage state and log, threaded explicitly through the coordinator.

use crate::error::CancellationReport;
use crate::events::{ProgressEvent, ProgressSink};
use crate::logging::log_stage_operation;
use crate::state_machine::{
    PipelineStage, PipelineStageState, StageEvent, StageStateMachine, StageStatus,
    StateMachineError, StateMachineResult,
};
use uuid::Uuid;

/// Stage machines, run log and progress sink for one run
///
/// Every transition and progress update emits a [`ProgressEvent`] carrying a
/// snapshot of the log. Log lines appended between events show up in the
/// next snapshot.
pub struct RunProgress<'a> {
    run_id: Uuid,
    machines: Vec<StageStateMachine>,
    log: Vec<String>,
    sink: &'a dyn ProgressSink,
}

impl<'a> RunProgress<'a> {
    pub fn new(run_id: Uuid, sink: &'a dyn ProgressSink) -> Self {
        Self {
            run_id,
            machines: PipelineStage::ALL
                .iter()
                .map(|stage| StageStateMachine::new(*stage))
                .collect(),
            log: Vec::new(),
            sink,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Append a line to the run log
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn status(&self, stage: PipelineStage) -> StageStatus {
        self.machines[stage.index()].current_status()
    }

    pub fn start(&mut self, stage: PipelineStage) -> StateMachineResult<()> {
        self.ensure_predecessors_complete(stage)?;
        self.apply(stage, StageEvent::Start)
    }

    /// Report intra-stage progress; repeated identical values are not re-emitted
    pub fn progress(&mut self, stage: PipelineStage, percent: u8) -> StateMachineResult<()> {
        if self.machines[stage.index()].state().progress == Some(percent) {
            return Ok(());
        }
        self.apply(stage, StageEvent::Progress(percent))
    }

    pub fn complete(&mut self, stage: PipelineStage) -> StateMachineResult<()> {
        self.apply(stage, StageEvent::Complete)
    }

    /// Mark a stage that has nothing to do as complete without running it
    pub fn skip(&mut self, stage: PipelineStage) -> StateMachineResult<()> {
        self.ensure_predecessors_complete(stage)?;
        self.apply(stage, StageEvent::Skip)
    }

    pub fn fail(&mut self, stage: PipelineStage, message: impl Into<String>) -> StateMachineResult<()> {
        self.apply(stage, StageEvent::fail_with_error(message))
    }

    /// Weighted overall progress (0-100)
    pub fn overall_percent(&self) -> u8 {
        let total: f64 = self
            .machines
            .iter()
            .map(|machine| machine.state().weighted_progress())
            .sum();
        total.round().clamp(0.0, 100.0) as u8
    }

    pub fn snapshot(&self) -> Vec<PipelineStageState> {
        self.machines
            .iter()
            .map(|machine| machine.state().clone())
            .collect()
    }

    pub fn cancellation_report(&self, stage: PipelineStage) -> CancellationReport {
        CancellationReport {
            stage,
            stages: self.snapshot(),
            log: self.log.clone(),
        }
    }

    /// Stage states and log, consumed when the run result is assembled
    pub fn into_parts(self) -> (Vec<PipelineStageState>, Vec<String>) {
        let stages = self.snapshot();
        (stages, self.log)
    }

    fn ensure_predecessors_complete(&self, stage: PipelineStage) -> StateMachineResult<()> {
        if let Some(blocking) = self.machines[..stage.index()]
            .iter()
            .find(|machine| machine.current_status() != StageStatus::Complete)
        {
            return Err(StateMachineError::StageOrderViolation {
                stage,
                blocking: blocking.stage(),
            });
        }
        Ok(())
    }

    fn apply(&mut self, stage: PipelineStage, event: StageEvent) -> StateMachineResult<()> {
        let machine = &mut self.machines[stage.index()];
        machine.transition(event)?;

        let state = machine.state().clone();
        log_stage_operation(stage, state.status, state.progress, state.error.as_deref());

        self.sink.emit(ProgressEvent {
            run_id: self.run_id,
            stage_state: state,
            overall_percent: self.overall_percent(),
            log: self.log.clone(),
        });
        Ok(())
    }
}
