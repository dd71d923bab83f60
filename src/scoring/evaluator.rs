use super::engine::ScoringEngine;
use crate::constants::services;
use crate::error::AdapterError;
use crate::models::{CandidateRecord, CriteriaSet, EvidenceProfile, MatchOutcome};
use async_trait::async_trait;

/// Produces a [`MatchOutcome`] for one extracted candidate
///
/// The coordinator only talks to this trait, so an external reasoning service
/// can replace the local engine without touching pipeline control flow.
#[async_trait]
pub trait MatchEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        profile: &EvidenceProfile,
        candidate: &CandidateRecord,
        criteria: &CriteriaSet,
    ) -> Result<MatchOutcome, AdapterError>;

    fn name(&self) -> &str;
}

/// Evaluator backed by the in-process [`ScoringEngine`]
#[derive(Debug, Clone, Default)]
pub struct LocalMatchEvaluator {
    engine: ScoringEngine,
}

impl LocalMatchEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: ScoringEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl MatchEvaluator for LocalMatchEvaluator {
    async fn evaluate(
        &self,
        profile: &EvidenceProfile,
        candidate: &CandidateRecord,
        criteria: &CriteriaSet,
    ) -> Result<MatchOutcome, AdapterError> {
        if criteria.candidate_id != candidate.id {
            return Err(AdapterError::malformed(
                services::MATCHING,
                format!(
                    "criteria for {} supplied for candidate {}",
                    criteria.candidate_id, candidate.id
                ),
            ));
        }
        Ok(self.engine.score(profile, criteria))
    }

    fn name(&self) -> &str {
        "local"
    }
}
