use serde::{Deserialize, Serialize};

/// Events that drive stage state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StageEvent {
    /// Begin executing the stage
    Start,
    /// Report intra-stage progress (0-100)
    Progress(u8),
    /// Stage produced its output
    Complete,
    /// Mark a stage that never ran as complete (empty-discovery short circuit)
    Skip,
    /// Stage failed with an explanatory message
    Fail(String),
}

impl StageEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Progress(_) => "progress",
            Self::Complete => "complete",
            Self::Skip => "skip",
            Self::Fail(_) => "fail",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    /// Check if this event represents a terminal transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Skip | Self::Fail(_))
    }

    /// Create a failure event with the given error message
    pub fn fail_with_error(error: impl Into<String>) -> Self {
        Self::Fail(error.into())
    }
}
