use super::states::{PipelineStage, StageStatus};
use thiserror::Error;

/// Errors raised by stage state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Invalid transition for {stage} stage: {event} from {from}")]
    InvalidTransition {
        stage: PipelineStage,
        from: StageStatus,
        event: String,
    },

    #[error("Guard condition failed for {stage} stage: {reason}")]
    GuardFailed {
        stage: PipelineStage,
        reason: String,
    },

    #[error("{stage} stage cannot start before {blocking} completes")]
    StageOrderViolation {
        stage: PipelineStage,
        blocking: PipelineStage,
    },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
