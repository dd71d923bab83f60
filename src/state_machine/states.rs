use crate::constants::stage_weights;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four fixed stages of a matching run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Find candidate studies for the profile's condition and location
    Discovery,
    /// Pull structured eligibility criteria for each candidate
    Extraction,
    /// Score each candidate against the profile
    Matching,
    /// Produce the plain-language summary of the ranked outcomes
    Summarization,
}

impl PipelineStage {
    /// All stages in the order they run
    pub const ALL: [PipelineStage; 4] = [
        Self::Discovery,
        Self::Extraction,
        Self::Matching,
        Self::Summarization,
    ];

    /// Share of overall run progress this stage accounts for
    pub fn weight(&self) -> u32 {
        match self {
            Self::Discovery => stage_weights::DISCOVERY,
            Self::Extraction => stage_weights::EXTRACTION,
            Self::Matching => stage_weights::MATCHING,
            Self::Summarization => stage_weights::SUMMARIZATION,
        }
    }

    /// Position of the stage in the run (0-based)
    pub fn index(&self) -> usize {
        match self {
            Self::Discovery => 0,
            Self::Extraction => 1,
            Self::Matching => 2,
            Self::Summarization => 3,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Extraction => write!(f, "extraction"),
            Self::Matching => write!(f, "matching"),
            Self::Summarization => write!(f, "summarization"),
        }
    }
}

impl std::str::FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(Self::Discovery),
            "extraction" => Ok(Self::Extraction),
            "matching" => Ok(Self::Matching),
            "summarization" => Ok(Self::Summarization),
            _ => Err(format!("Invalid pipeline stage: {s}")),
        }
    }
}

/// Lifecycle status of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage has not started
    #[default]
    Pending,
    /// Stage is executing
    Running,
    /// Stage finished (possibly with non-critical failures logged)
    Complete,
    /// Stage could not produce usable output
    Error,
}

impl StageStatus {
    /// Check if this is a terminal status (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid stage status: {s}")),
        }
    }
}

/// Externally visible state of one stage within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStageState {
    pub stage: PipelineStage,
    pub status: StageStatus,
    /// Intra-stage progress (0-100), only meaningful while running
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl PipelineStageState {
    pub fn pending(stage: PipelineStage) -> Self {
        Self {
            stage,
            status: StageStatus::Pending,
            progress: None,
            error: None,
        }
    }

    /// Contribution of this stage to overall progress, in percentage points
    pub fn weighted_progress(&self) -> f64 {
        let weight = f64::from(self.stage.weight());
        match self.status {
            StageStatus::Complete => weight,
            StageStatus::Running => weight * f64::from(self.progress.unwrap_or(0)) / 100.0,
            StageStatus::Pending | StageStatus::Error => 0.0,
        }
    }
}
