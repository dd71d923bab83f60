use super::{
    errors::{StateMachineError, StateMachineResult},
    events::StageEvent,
    states::{PipelineStage, PipelineStageState, StageStatus},
};
use tracing::debug;

/// In-memory state machine for a single pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStateMachine {
    state: PipelineStageState,
}

impl StageStateMachine {
    /// Create a new state machine in the pending state
    pub fn new(stage: PipelineStage) -> Self {
        Self {
            state: PipelineStageState::pending(stage),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.state.stage
    }

    pub fn current_status(&self) -> StageStatus {
        self.state.status
    }

    /// Snapshot of the externally visible stage state
    pub fn state(&self) -> &PipelineStageState {
        &self.state
    }

    /// Apply an event, returning the resulting status
    pub fn transition(&mut self, event: StageEvent) -> StateMachineResult<StageStatus> {
        let current = self.state.status;
        let target = self.determine_target_state(current, &event)?;

        self.check_guards(&event)?;

        debug!(
            stage = %self.state.stage,
            from = %current,
            to = %target,
            event = event.event_type(),
            "Stage transition"
        );

        self.state.status = target;
        match event {
            StageEvent::Start => {
                self.state.progress = Some(0);
            }
            StageEvent::Progress(percent) => {
                self.state.progress = Some(percent);
            }
            StageEvent::Complete | StageEvent::Skip => {
                self.state.progress = None;
            }
            StageEvent::Fail(message) => {
                self.state.progress = None;
                self.state.error = Some(message);
            }
        }

        Ok(target)
    }

    /// Determine the target status for an event without applying it
    pub fn determine_target_state(
        &self,
        current: StageStatus,
        event: &StageEvent,
    ) -> StateMachineResult<StageStatus> {
        let target = match (current, event) {
            (StageStatus::Pending, StageEvent::Start) => StageStatus::Running,
            (StageStatus::Running, StageEvent::Progress(_)) => StageStatus::Running,
            (StageStatus::Running, StageEvent::Complete) => StageStatus::Complete,
            (StageStatus::Pending, StageEvent::Skip) => StageStatus::Complete,
            (StageStatus::Pending | StageStatus::Running, StageEvent::Fail(_)) => {
                StageStatus::Error
            }
            (from, event) => {
                return Err(StateMachineError::InvalidTransition {
                    stage: self.state.stage,
                    from,
                    event: event.event_type().to_string(),
                });
            }
        };
        Ok(target)
    }

    fn check_guards(&self, event: &StageEvent) -> StateMachineResult<()> {
        if let StageEvent::Progress(percent) = event {
            if *percent > 100 {
                return Err(StateMachineError::GuardFailed {
                    stage: self.state.stage,
                    reason: format!("progress {percent} exceeds 100"),
                });
            }
            let reported = self.state.progress.unwrap_or(0);
            if *percent < reported {
                return Err(StateMachineError::GuardFailed {
                    stage: self.state.stage,
                    reason: format!("progress cannot move backwards ({reported} -> {percent})"),
                });
            }
        }
        Ok(())
    }
}
