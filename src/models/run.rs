use super::{CandidateRecord, MatchOutcome};
use crate::state_machine::{PipelineStage, PipelineStageState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Output of the Summarization stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryArtifact {
    /// Script intended to be read aloud
    pub text: String,
    #[serde(default)]
    pub audio_artifact_ref: Option<String>,
    pub estimated_duration_seconds: u32,
}

/// A candidate removed from the run, with the stage that dropped it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedCandidate {
    pub candidate_id: String,
    pub stage: PipelineStage,
    pub reason: String,
}

/// Aggregate result of one matching run
///
/// Built only by the coordinator and immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Total reported by Discovery before selection
    pub total_found: usize,
    /// Candidates that survived to the end of the run
    pub candidates: Vec<CandidateRecord>,
    /// Sorted by score descending, ties in discovery order
    pub outcomes: Vec<MatchOutcome>,
    pub summary: Option<SummaryArtifact>,
    pub stages: Vec<PipelineStageState>,
    pub dropped: Vec<DroppedCandidate>,
    pub log: Vec<String>,
    pub elapsed: Duration,
}

impl PipelineRun {
    pub fn stage(&self, stage: PipelineStage) -> Option<&PipelineStageState> {
        self.stages.iter().find(|state| state.stage == stage)
    }

    pub fn outcome_for(&self, candidate_id: &str) -> Option<&MatchOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.candidate_id == candidate_id)
    }

    /// Voice script from the summary, if Summarization produced one
    pub fn voice_script(&self) -> Option<&str> {
        self.summary.as_ref().map(|summary| summary.text.as_str())
    }
}
