#![allow(clippy::doc_markdown)] // Allow technical terms like ECOG, NCT ids in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Trial Match Core
//!
//! Pipeline coordinator and deterministic scoring engine for matching a
//! patient's evidence profile to candidate clinical studies.
//!
//! ## Overview
//!
//! A matching run moves through four stages in a fixed order: Discovery finds
//! candidate studies, Extraction turns each study's free-text eligibility into
//! structured criteria, Matching scores every candidate against the profile,
//! and Summarization produces a short voice script. The external stages sit
//! behind async adapter traits; scoring is pure and always local.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Pipeline coordinator, adapter contracts, candidate selection
//! - [`scoring`] - Weighted, rule-based scoring engine and criteria text parsers
//! - [`execution`] - Bounded batch runner and cancellation token
//! - [`resilience`] - Retry with exponential backoff for classified failures
//! - [`state_machine`] - Per-stage lifecycle (pending, running, complete, error)
//! - [`events`] - Progress events delivered to a caller-supplied sink
//! - [`models`] - Profile, candidate, criteria, outcome and run records
//! - [`adapters`] - Fixture-backed adapters for local runs
//! - [`config`] - Layered YAML and environment configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Adapter and pipeline error types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trial_match_core::models::{CriteriaSet, CriterionCategory, EvidenceProfile};
//! use trial_match_core::scoring::ScoringEngine;
//!
//! let profile = EvidenceProfile::new("Non-small cell lung cancer", "94110")
//!     .with_biomarker("EGFR");
//! let criteria = CriteriaSet::new("NCT00000001")
//!     .include("Non-small cell lung cancer", CriterionCategory::Diagnosis)
//!     .include("EGFR mutation", CriterionCategory::Biomarker);
//!
//! let outcome = ScoringEngine::new().score(&profile, &criteria);
//! println!("{} -> {} ({})", outcome.candidate_id, outcome.score, outcome.category);
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, scenario and property tests
//! ```

pub mod adapters;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod execution;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod resilience;
pub mod scoring;
pub mod state_machine;

pub use config::{ConfigManager, ConfigurationError, MatcherConfig};
pub use error::{AdapterError, ErrorKind, PipelineError, Result};
pub use events::{ProgressEvent, ProgressSink};
pub use execution::{BatchRunner, CancellationToken};
pub use models::{
    CandidateRecord, CriteriaSet, EvidenceProfile, MatchCategory, MatchOutcome, PipelineRun,
};
pub use orchestration::{PipelineCoordinator, RunOptions};
pub use resilience::{RetryExecutor, RetryPolicy};
pub use scoring::ScoringEngine;
pub use state_machine::{PipelineStage, PipelineStageState, StageStatus};
