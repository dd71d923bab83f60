//! File-backed adapters for local runs and tests.

use crate::constants::services;
use crate::error::AdapterError;
use crate::models::{
    CandidateRecord, CriteriaSet, EvidenceProfile, MatchCategory, MatchOutcome, SummaryArtifact,
};
use crate::orchestration::{
    DiscoveryAdapter, DiscoveryRequest, DiscoveryResponse, ExtractionAdapter,
    SummarizationAdapter,
};
use crate::scoring::overlaps;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Speaking rate used to estimate summary duration
pub const WORDS_PER_MINUTE: u32 = 150;

/// Serves a fixed candidate list
#[derive(Debug, Clone, Default)]
pub struct FixtureDiscovery {
    candidates: Vec<CandidateRecord>,
    filter_by_condition: bool,
}

impl FixtureDiscovery {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self {
            candidates,
            filter_by_condition: false,
        }
    }

    /// Only return candidates whose title or conditions overlap the request
    pub fn filter_by_condition(mut self, enabled: bool) -> Self {
        self.filter_by_condition = enabled;
        self
    }

    fn relevant(&self, candidate: &CandidateRecord, condition: &str) -> bool {
        !self.filter_by_condition
            || overlaps(&candidate.title, condition)
            || candidate
                .conditions
                .iter()
                .any(|label| overlaps(label, condition))
    }
}

#[async_trait]
impl DiscoveryAdapter for FixtureDiscovery {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse, AdapterError> {
        let candidates: Vec<CandidateRecord> = self
            .candidates
            .iter()
            .filter(|candidate| self.relevant(candidate, &request.condition))
            .cloned()
            .collect();
        debug!(
            condition = %request.condition,
            returned = candidates.len(),
            "Fixture discovery served candidates"
        );
        Ok(DiscoveryResponse::new(candidates))
    }
}

/// Serves criteria sets by candidate id
#[derive(Debug, Clone, Default)]
pub struct FixtureExtraction {
    criteria: HashMap<String, CriteriaSet>,
}

impl FixtureExtraction {
    pub fn new(criteria: Vec<CriteriaSet>) -> Self {
        Self {
            criteria: criteria
                .into_iter()
                .map(|set| (set.candidate_id.clone(), set))
                .collect(),
        }
    }
}

#[async_trait]
impl ExtractionAdapter for FixtureExtraction {
    async fn extract(&self, candidate_id: &str) -> Result<CriteriaSet, AdapterError> {
        self.criteria
            .get(candidate_id)
            .cloned()
            .ok_or_else(|| AdapterError::not_found(format!("criteria for {candidate_id}")))
    }
}

/// Builds an English script from the ranked outcomes
#[derive(Debug, Clone)]
pub struct TemplateSummarizer {
    /// Outcomes described individually, best first
    highlight_limit: usize,
    supported_languages: Vec<String>,
}

impl Default for TemplateSummarizer {
    fn default() -> Self {
        Self {
            highlight_limit: 3,
            supported_languages: vec!["en".to_string()],
        }
    }
}

impl TemplateSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_highlight_limit(mut self, limit: usize) -> Self {
        self.highlight_limit = limit;
        self
    }

    fn supports(&self, language: &str) -> bool {
        let primary = language.split(['-', '_']).next().unwrap_or(language);
        self.supported_languages
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(primary))
    }

    fn script(&self, outcomes: &[MatchOutcome]) -> String {
        let strong = outcomes
            .iter()
            .filter(|o| o.category == MatchCategory::Strong)
            .count();
        let possible = outcomes
            .iter()
            .filter(|o| o.category == MatchCategory::Possible)
            .count();

        let mut parts = vec![format!(
            "We reviewed {} {} against your profile. {strong} looked like strong matches and {possible} like possible matches.",
            outcomes.len(),
            if outcomes.len() == 1 { "study" } else { "studies" }
        )];
        for (rank, outcome) in outcomes.iter().take(self.highlight_limit).enumerate() {
            parts.push(format!(
                "Number {}: study {}, scored {} out of 100. {}",
                rank + 1,
                outcome.candidate_id,
                outcome.score,
                outcome.summary
            ));
        }
        parts.join(" ")
    }
}

/// Seconds needed to read `text` aloud, rounded up
pub fn estimate_duration_seconds(text: &str) -> u32 {
    let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
    words.saturating_mul(60).div_ceil(WORDS_PER_MINUTE)
}

#[async_trait]
impl SummarizationAdapter for TemplateSummarizer {
    async fn summarize(
        &self,
        outcomes: &[MatchOutcome],
        language: &str,
    ) -> Result<SummaryArtifact, AdapterError> {
        if !self.supports(language) {
            return Err(AdapterError::upstream(
                services::SUMMARIZATION,
                format!("language '{language}' is not supported"),
            ));
        }
        let text = self.script(outcomes);
        let estimated_duration_seconds = estimate_duration_seconds(&text);
        Ok(SummaryArtifact {
            text,
            audio_artifact_ref: None,
            estimated_duration_seconds,
        })
    }
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON fixture holding everything a local run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFixture {
    pub profile: EvidenceProfile,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
    #[serde(default)]
    pub criteria: Vec<CriteriaSet>,
}

impl MatchFixture {
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn discovery(&self) -> FixtureDiscovery {
        FixtureDiscovery::new(self.candidates.clone())
    }

    pub fn extraction(&self) -> FixtureExtraction {
        FixtureExtraction::new(self.criteria.clone())
    }
}
