//! Narrow request/response contracts for the external stage collaborators.
//!
//! Implementations attach an [`ErrorKind`](crate::error::ErrorKind) to every
//! failure through [`AdapterError`]; the coordinator never inspects message
//! text to decide whether to retry.

use crate::error::AdapterError;
use crate::models::{CandidateRecord, CriteriaSet, EvidenceProfile, MatchOutcome, SummaryArtifact};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Discovery input derived from the evidence profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    pub condition: String,
    pub location_code: String,
    pub radius_miles: u32,
}

impl DiscoveryRequest {
    pub fn from_profile(profile: &EvidenceProfile) -> Self {
        Self {
            condition: profile.condition.clone(),
            location_code: profile.location_code.clone(),
            radius_miles: profile.max_travel_miles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    /// Nearest or most relevant first
    pub candidates: Vec<CandidateRecord>,
    /// Matches reported by the registry, which may exceed `candidates.len()`
    pub total_found: usize,
}

impl DiscoveryResponse {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        let total_found = candidates.len();
        Self {
            candidates,
            total_found,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Finds candidate studies for a condition near a location
#[async_trait]
pub trait DiscoveryAdapter: Send + Sync {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse, AdapterError>;
}

/// Produces the structured eligibility criteria of one candidate
///
/// Unknown candidates must fail with [`AdapterError::NotFound`]; rate limits
/// and timeouts with their retryable variants.
#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    async fn extract(&self, candidate_id: &str) -> Result<CriteriaSet, AdapterError>;
}

/// Turns ranked outcomes into a plain-language script
#[async_trait]
pub trait SummarizationAdapter: Send + Sync {
    async fn summarize(
        &self,
        outcomes: &[MatchOutcome],
        language: &str,
    ) -> Result<SummaryArtifact, AdapterError>;
}
