//! # Orchestration
//!
//! The [`PipelineCoordinator`] and everything it needs to sequence a matching
//! run: adapter contracts for the external stages, candidate selection
//! between Discovery and Extraction, the per-run progress tracker, and the
//! injectable criteria cache.

pub mod adapters;
pub mod cache;
pub mod candidate_selection;
pub mod coordinator;
pub mod progress;

pub use adapters::{
    DiscoveryAdapter, DiscoveryRequest, DiscoveryResponse, ExtractionAdapter,
    SummarizationAdapter,
};
pub use cache::{CriteriaCache, InMemoryCriteriaCache, NoopCriteriaCache};
pub use candidate_selection::{CandidateSelector, Rejection, RejectionReason, Selection};
pub use coordinator::{PipelineCoordinator, PipelineCoordinatorBuilder, RunOptions};
pub use progress::RunProgress;
