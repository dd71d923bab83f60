//! # Matching Domain Models
//!
//! Plain data carried between pipeline stages. None of these types perform
//! I/O; the profile is immutable for the duration of a run and candidate
//! records are read-only once Discovery produces them.

pub mod candidate;
pub mod criteria;
pub mod outcome;
pub mod profile;
pub mod run;

// Re-export core models for easy access
pub use candidate::{normalize_status, CandidateRecord, Location};
pub use criteria::{AgeRange, CriteriaSet, Criterion, CriterionCategory};
pub use outcome::{BlockingFactor, MatchCategory, MatchOutcome, MatchingFactor};
pub use profile::{DiseaseStage, EvidenceProfile};
pub use run::{DroppedCandidate, PipelineRun, SummaryArtifact};
