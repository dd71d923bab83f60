// Stage state machine for the matching pipeline
//
// Each stage advances monotonically pending -> running -> (complete | error)
// and never reverts. Ordering across stages is enforced by the coordinator's
// progress tracker.

pub mod errors;
pub mod events;
pub mod stage_state_machine;
pub mod states;

// Re-export main types for convenient access
pub use errors::{StateMachineError, StateMachineResult};
pub use events::StageEvent;
pub use stage_state_machine::StageStateMachine;
pub use states::{PipelineStage, PipelineStageState, StageStatus};
