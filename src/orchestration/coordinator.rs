//! # Pipeline Coordinator
//!
//! Drives the four stages of a matching run strictly in order:
//!
//! 1. **Discovery**: one retried call to the discovery adapter, then candidate
//!    selection. Zero candidates short-circuits the run as a success.
//! 2. **Extraction**: chunked, bounded-concurrency extraction with retry and
//!    an optional criteria cache. Failed candidates are dropped; if every
//!    candidate fails, Matching is marked `error` and partial results return.
//! 3. **Matching**: chunked evaluation through a [`MatchEvaluator`], then a
//!    stable sort by score.
//! 4. **Summarization**: one call; failure is logged and never fails the run.
//!
//! Concurrency exists only within Extraction and Matching. Cancellation is
//! checked before each stage and before each chunk.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trial_match_core::adapters::{FixtureDiscovery, FixtureExtraction, TemplateSummarizer};
//! use trial_match_core::events::NoopProgressSink;
//! use trial_match_core::models::EvidenceProfile;
//! use trial_match_core::orchestration::{PipelineCoordinator, RunOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = PipelineCoordinator::builder(
//!     Arc::new(FixtureDiscovery::new(Vec::new())),
//!     Arc::new(FixtureExtraction::new(Vec::new())),
//!     Arc::new(TemplateSummarizer::new()),
//! )
//! .build();
//!
//! let profile = EvidenceProfile::new("Melanoma", "10001");
//! let run = coordinator
//!     .run(&profile, &NoopProgressSink, RunOptions::default())
//!     .await?;
//! println!("{} outcomes", run.outcomes.len());
//! # Ok(())
//! # }
//! ```

use super::adapters::{DiscoveryAdapter, DiscoveryRequest, ExtractionAdapter, SummarizationAdapter};
use super::cache::{CriteriaCache, NoopCriteriaCache};
use super::candidate_selection::CandidateSelector;
use super::progress::RunProgress;
use crate::config::{DiscoveryConfig, MatcherConfig};
use crate::constants::services;
use crate::error::{AdapterError, PipelineError, Result};
use crate::events::ProgressSink;
use crate::execution::{BatchError, BatchItem, BatchRunner, CancellationToken};
use crate::logging::{log_candidate_operation, log_error};
use crate::models::{
    CandidateRecord, CriteriaSet, DroppedCandidate, EvidenceProfile, MatchCategory, MatchOutcome,
    PipelineRun, SummaryArtifact,
};
use crate::resilience::{RetryExecutor, RetryPolicy};
use crate::scoring::{LocalMatchEvaluator, MatchEvaluator};
use crate::state_machine::{PipelineStage, StateMachineError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Per-run caps, concurrency ceilings and cancellation signal
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_candidates: usize,
    pub extraction_concurrency: usize,
    pub matching_concurrency: usize,
    pub cancellation: CancellationToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&MatcherConfig::default())
    }
}

impl RunOptions {
    pub fn from_config(config: &MatcherConfig) -> Self {
        Self {
            max_candidates: config.pipeline.max_candidates,
            extraction_concurrency: config.pipeline.extraction_concurrency,
            matching_concurrency: config.pipeline.matching_concurrency,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Same ceiling for Extraction and Matching
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.extraction_concurrency = concurrency;
        self.matching_concurrency = concurrency;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(PipelineError::InvalidOptions {
                reason: reason.to_string(),
            })
        };
        if self.max_candidates == 0 {
            return invalid("max_candidates must be at least 1");
        }
        if self.extraction_concurrency == 0 {
            return invalid("extraction_concurrency must be at least 1");
        }
        if self.matching_concurrency == 0 {
            return invalid("matching_concurrency must be at least 1");
        }
        Ok(())
    }
}

/// A candidate paired with its extracted criteria, ready for matching
#[derive(Debug, Clone)]
struct MatchItem {
    candidate: CandidateRecord,
    criteria: CriteriaSet,
}

impl BatchItem for MatchItem {
    fn batch_key(&self) -> &str {
        &self.candidate.id
    }
}

/// Identity and start time shared by every stage of one run
struct RunContext<'p> {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    clock: Instant,
    profile: &'p EvidenceProfile,
    options: RunOptions,
}

/// Data accumulated by the stages and turned into a [`PipelineRun`]
#[derive(Default)]
struct RunData {
    total_found: usize,
    candidates: Vec<CandidateRecord>,
    outcomes: Vec<MatchOutcome>,
    summary: Option<SummaryArtifact>,
    dropped: Vec<DroppedCandidate>,
}

/// Sequences Discovery, Extraction, Matching and Summarization for a profile
pub struct PipelineCoordinator {
    discovery: Arc<dyn DiscoveryAdapter>,
    extraction: Arc<dyn ExtractionAdapter>,
    summarization: Arc<dyn SummarizationAdapter>,
    evaluator: Arc<dyn MatchEvaluator>,
    cache: Arc<dyn CriteriaCache>,
    retry: RetryExecutor,
    discovery_config: DiscoveryConfig,
}

impl std::fmt::Debug for PipelineCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCoordinator")
            .field("evaluator", &self.evaluator.name())
            .field("retry", &self.retry)
            .field("discovery_config", &self.discovery_config)
            .finish()
    }
}

/// Builder for [`PipelineCoordinator`]; adapters are required, the rest defaults
pub struct PipelineCoordinatorBuilder {
    discovery: Arc<dyn DiscoveryAdapter>,
    extraction: Arc<dyn ExtractionAdapter>,
    summarization: Arc<dyn SummarizationAdapter>,
    evaluator: Arc<dyn MatchEvaluator>,
    cache: Arc<dyn CriteriaCache>,
    retry_policy: RetryPolicy,
    discovery_config: DiscoveryConfig,
}

impl PipelineCoordinatorBuilder {
    pub fn evaluator(mut self, evaluator: Arc<dyn MatchEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CriteriaCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn discovery_config(mut self, config: DiscoveryConfig) -> Self {
        self.discovery_config = config;
        self
    }

    /// Apply retry and discovery settings from loaded configuration
    pub fn with_config(self, config: &MatcherConfig) -> Self {
        self.retry_policy(RetryPolicy::from_config(&config.retry))
            .discovery_config(config.discovery.clone())
    }

    pub fn build(self) -> PipelineCoordinator {
        PipelineCoordinator {
            discovery: self.discovery,
            extraction: self.extraction,
            summarization: self.summarization,
            evaluator: self.evaluator,
            cache: self.cache,
            retry: RetryExecutor::new(self.retry_policy),
            discovery_config: self.discovery_config,
        }
    }
}

impl PipelineCoordinator {
    pub fn builder(
        discovery: Arc<dyn DiscoveryAdapter>,
        extraction: Arc<dyn ExtractionAdapter>,
        summarization: Arc<dyn SummarizationAdapter>,
    ) -> PipelineCoordinatorBuilder {
        PipelineCoordinatorBuilder {
            discovery,
            extraction,
            summarization,
            evaluator: Arc::new(LocalMatchEvaluator::new()),
            cache: Arc::new(NoopCriteriaCache),
            retry_policy: RetryPolicy::default(),
            discovery_config: DiscoveryConfig::default(),
        }
    }

    /// Run the full pipeline for `profile`
    ///
    /// Returns a [`PipelineRun`] on success, on zero discovered candidates and
    /// when every extraction failed. Returns an error only for invalid input,
    /// Discovery's own failure, or cancellation.
    #[instrument(skip_all, fields(condition = %profile.condition))]
    pub async fn run(
        &self,
        profile: &EvidenceProfile,
        sink: &dyn ProgressSink,
        options: RunOptions,
    ) -> Result<PipelineRun> {
        profile
            .validate()
            .map_err(|reason| PipelineError::InvalidProfile { reason })?;
        options.validate()?;

        let ctx = RunContext {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            clock: Instant::now(),
            profile,
            options,
        };
        let mut progress = RunProgress::new(ctx.run_id, sink);
        let mut data = RunData::default();

        info!(
            run_id = %ctx.run_id,
            max_candidates = ctx.options.max_candidates,
            extraction_concurrency = ctx.options.extraction_concurrency,
            matching_concurrency = ctx.options.matching_concurrency,
            "🚀 PIPELINE: Starting matching run"
        );

        let selected = self.run_discovery(&ctx, &mut progress, &mut data).await?;
        if selected.is_empty() {
            for stage in [
                PipelineStage::Extraction,
                PipelineStage::Matching,
                PipelineStage::Summarization,
            ] {
                progress.skip(stage)?;
            }
            return Ok(Self::finish(&ctx, progress, data));
        }

        let extracted = self
            .run_extraction(&ctx, &mut progress, &mut data, selected.clone())
            .await?;
        if extracted.is_empty() {
            Self::check_cancelled(&ctx, &progress, PipelineStage::Matching)?;
            let message = "Criteria could not be extracted for any candidate";
            progress.log(format!("{message}; returning discovered candidates only"));
            progress.start(PipelineStage::Matching)?;
            progress.fail(PipelineStage::Matching, message)?;
            warn!(run_id = %ctx.run_id, candidates = selected.len(), "{message}");
            data.candidates = selected;
            return Ok(Self::finish(&ctx, progress, data));
        }

        data.candidates = extracted
            .iter()
            .map(|item| item.candidate.clone())
            .collect();
        self.run_matching(&ctx, &mut progress, &mut data, extracted)
            .await?;
        self.run_summarization(&ctx, &mut progress, &mut data)
            .await?;

        Ok(Self::finish(&ctx, progress, data))
    }

    #[instrument(skip_all, fields(run_id = %ctx.run_id))]
    async fn run_discovery(
        &self,
        ctx: &RunContext<'_>,
        progress: &mut RunProgress<'_>,
        data: &mut RunData,
    ) -> Result<Vec<CandidateRecord>> {
        let stage = PipelineStage::Discovery;
        Self::check_cancelled(ctx, progress, stage)?;

        let request = DiscoveryRequest::from_profile(ctx.profile);
        progress.log(format!(
            "Searching for {} studies within {} miles of {}",
            request.condition, request.radius_miles, request.location_code
        ));
        progress.start(stage)?;

        let response = match self
            .retry
            .execute(services::DISCOVERY, |_| self.discovery.discover(&request))
            .await
        {
            Ok(response) => response,
            Err(error) => {
                let message = error.to_string();
                progress.log(format!("Discovery failed: {message}"));
                progress.fail(stage, message.clone())?;
                log_error("coordinator", "discovery", &message, None);
                return Err(PipelineError::Discovery(error));
            }
        };

        data.total_found = response.total_found;
        let returned = response.candidates.len();
        progress.log(format!(
            "Found {} studies ({returned} returned)",
            response.total_found
        ));

        if response.candidates.is_empty() {
            progress.log("No studies found for this profile");
            progress.complete(stage)?;
            return Ok(Vec::new());
        }

        let selector = CandidateSelector::new(&self.discovery_config, ctx.options.max_candidates);
        let selection = selector.select(response.candidates, ctx.profile.max_travel_miles);
        for rejection in &selection.rejected {
            progress.log(format!(
                "Skipping {}: {}",
                rejection.candidate_id, rejection.reason
            ));
        }
        if selection.truncated > 0 {
            progress.log(format!(
                "Keeping the first {} eligible studies ({} more not processed)",
                selection.selected.len(),
                selection.truncated
            ));
        }
        if selection.selected.is_empty() {
            progress.log("No discovered study passed selection");
        }

        debug!(
            returned,
            selected = selection.selected.len(),
            rejected = selection.rejected.len(),
            truncated = selection.truncated,
            "Candidate selection finished"
        );

        progress.complete(stage)?;
        Ok(selection.selected)
    }

    #[instrument(skip_all, fields(run_id = %ctx.run_id, candidates = candidates.len()))]
    async fn run_extraction(
        &self,
        ctx: &RunContext<'_>,
        progress: &mut RunProgress<'_>,
        data: &mut RunData,
        candidates: Vec<CandidateRecord>,
    ) -> Result<Vec<MatchItem>> {
        let stage = PipelineStage::Extraction;
        Self::check_cancelled(ctx, progress, stage)?;

        progress.log(format!(
            "Reading eligibility criteria for {} studies",
            candidates.len()
        ));
        progress.start(stage)?;

        let runner = BatchRunner::new(ctx.options.extraction_concurrency);
        let mut transition_error: Option<StateMachineError> = None;
        let batch = runner
            .run(
                candidates,
                &ctx.options.cancellation,
                |candidate| self.extract_candidate(candidate),
                |batch_progress| {
                    if let Err(e) = progress.progress(stage, batch_progress.percent()) {
                        transition_error.get_or_insert(e);
                    }
                },
            )
            .await;
        if let Some(error) = transition_error {
            return Err(error.into());
        }

        let batch = match batch {
            Ok(batch) => batch,
            Err(BatchError::Cancelled { completed, total }) => {
                progress.log(format!(
                    "Cancelled during extraction after {completed} of {total} studies"
                ));
                return Err(Self::cancelled(progress, stage));
            }
        };

        let (succeeded, failures) = batch.into_parts();
        for failure in failures {
            let reason = failure.error.to_string();
            progress.log(format!(
                "Could not read criteria for {}: {reason}",
                failure.item_id
            ));
            log_candidate_operation("extract", &failure.item_id, "failed", Some(&reason));
            data.dropped.push(DroppedCandidate {
                candidate_id: failure.item_id,
                stage,
                reason,
            });
        }

        let extracted: Vec<MatchItem> = succeeded.into_iter().map(|(_, item)| item).collect();
        progress.log(format!("Criteria ready for {} studies", extracted.len()));
        progress.complete(stage)?;
        Ok(extracted)
    }

    async fn extract_candidate(
        &self,
        candidate: CandidateRecord,
    ) -> std::result::Result<MatchItem, AdapterError> {
        if let Some(criteria) = self.cache.get(&candidate.id) {
            debug!(candidate_id = %candidate.id, "Criteria cache hit");
            return Ok(MatchItem {
                candidate,
                criteria,
            });
        }

        let criteria = self
            .retry
            .execute(services::EXTRACTION, |_| self.extraction.extract(&candidate.id))
            .await?;

        if criteria.candidate_id != candidate.id {
            return Err(AdapterError::malformed(
                services::EXTRACTION,
                format!(
                    "criteria returned for {} instead of {}",
                    criteria.candidate_id, candidate.id
                ),
            ));
        }

        self.cache.set(&candidate.id, criteria.clone());
        Ok(MatchItem {
            candidate,
            criteria,
        })
    }

    #[instrument(skip_all, fields(run_id = %ctx.run_id, candidates = items.len()))]
    async fn run_matching(
        &self,
        ctx: &RunContext<'_>,
        progress: &mut RunProgress<'_>,
        data: &mut RunData,
        items: Vec<MatchItem>,
    ) -> Result<()> {
        let stage = PipelineStage::Matching;
        Self::check_cancelled(ctx, progress, stage)?;

        progress.log(format!("Comparing {} studies to your profile", items.len()));
        progress.start(stage)?;

        let runner = BatchRunner::new(ctx.options.matching_concurrency);
        let profile = ctx.profile;
        let mut transition_error: Option<StateMachineError> = None;
        let batch = runner
            .run(
                items,
                &ctx.options.cancellation,
                |item| async move {
                    self.retry
                        .execute(services::MATCHING, |_| {
                            self.evaluator
                                .evaluate(profile, &item.candidate, &item.criteria)
                        })
                        .await
                },
                |batch_progress| {
                    if let Err(e) = progress.progress(stage, batch_progress.percent()) {
                        transition_error.get_or_insert(e);
                    }
                },
            )
            .await;
        if let Some(error) = transition_error {
            return Err(error.into());
        }

        let batch = match batch {
            Ok(batch) => batch,
            Err(BatchError::Cancelled { completed, total }) => {
                progress.log(format!(
                    "Cancelled during matching after {completed} of {total} studies"
                ));
                return Err(Self::cancelled(progress, stage));
            }
        };

        let (succeeded, failures) = batch.into_parts();
        for failure in failures {
            let reason = failure.error.to_string();
            progress.log(format!("Could not score {}: {reason}", failure.item_id));
            log_candidate_operation("match", &failure.item_id, "failed", Some(&reason));
            data.dropped.push(DroppedCandidate {
                candidate_id: failure.item_id,
                stage,
                reason,
            });
        }

        let mut outcomes: Vec<MatchOutcome> =
            succeeded.into_iter().map(|(_, outcome)| outcome).collect();
        // Stable: equal scores keep discovery order
        outcomes.sort_by(|a, b| b.score.cmp(&a.score));

        let count = |category: MatchCategory| {
            outcomes
                .iter()
                .filter(|outcome| outcome.category == category)
                .count()
        };
        progress.log(format!(
            "Scored {} studies: {} strong, {} possible, {} future potential, {} not eligible",
            outcomes.len(),
            count(MatchCategory::Strong),
            count(MatchCategory::Possible),
            count(MatchCategory::FuturePotential),
            count(MatchCategory::NotEligible)
        ));
        data.outcomes = outcomes;
        progress.complete(stage)?;
        Ok(())
    }

    #[instrument(skip_all, fields(run_id = %ctx.run_id, outcomes = data.outcomes.len()))]
    async fn run_summarization(
        &self,
        ctx: &RunContext<'_>,
        progress: &mut RunProgress<'_>,
        data: &mut RunData,
    ) -> Result<()> {
        let stage = PipelineStage::Summarization;
        Self::check_cancelled(ctx, progress, stage)?;

        if data.outcomes.is_empty() {
            progress.log("No scored studies to summarise");
            progress.skip(stage)?;
            return Ok(());
        }

        progress.log("Preparing your summary");
        progress.start(stage)?;

        match self
            .summarization
            .summarize(&data.outcomes, &ctx.profile.language)
            .await
        {
            Ok(artifact) => {
                progress.log(format!(
                    "Summary ready (about {} seconds)",
                    artifact.estimated_duration_seconds
                ));
                data.summary = Some(artifact);
            }
            Err(error) => {
                let message = error.to_string();
                progress.log(format!("Summary unavailable: {message}"));
                log_error(
                    "coordinator",
                    "summarization",
                    &message,
                    Some("continuing without summary"),
                );
            }
        }

        progress.complete(stage)?;
        Ok(())
    }

    fn check_cancelled(
        ctx: &RunContext<'_>,
        progress: &RunProgress<'_>,
        stage: PipelineStage,
    ) -> Result<()> {
        if ctx.options.cancellation.is_cancelled() {
            let mut report = progress.cancellation_report(stage);
            report.log.push(format!("Cancelled before {stage} stage"));
            info!(run_id = %ctx.run_id, stage = %stage, "🛑 PIPELINE: Run cancelled");
            return Err(PipelineError::Cancelled(Box::new(report)));
        }
        Ok(())
    }

    fn cancelled(progress: &RunProgress<'_>, stage: PipelineStage) -> PipelineError {
        info!(run_id = %progress.run_id(), stage = %stage, "🛑 PIPELINE: Run cancelled mid-stage");
        PipelineError::Cancelled(Box::new(progress.cancellation_report(stage)))
    }

    fn finish(ctx: &RunContext<'_>, progress: RunProgress<'_>, data: RunData) -> PipelineRun {
        let (stages, log) = progress.into_parts();
        let run = PipelineRun {
            run_id: ctx.run_id,
            started_at: ctx.started_at,
            total_found: data.total_found,
            candidates: data.candidates,
            outcomes: data.outcomes,
            summary: data.summary,
            stages,
            dropped: data.dropped,
            log,
            elapsed: ctx.clock.elapsed(),
        };

        info!(
            run_id = %run.run_id,
            candidates = run.candidates.len(),
            outcomes = run.outcomes.len(),
            dropped = run.dropped.len(),
            has_summary = run.summary.is_some(),
            elapsed_ms = run.elapsed.as_millis() as u64,
            "✅ PIPELINE: Matching run finished"
        );
        run
    }
}
