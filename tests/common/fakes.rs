//! Scripted adapter doubles and a recording progress sink.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use trial_match_core::error::AdapterError;
use trial_match_core::events::{ProgressEvent, ProgressSink};
use trial_match_core::execution::CancellationToken;
use trial_match_core::models::{
    CandidateRecord, CriteriaSet, EvidenceProfile, MatchOutcome, SummaryArtifact,
};
use trial_match_core::orchestration::{
    DiscoveryAdapter, DiscoveryRequest, DiscoveryResponse, ExtractionAdapter,
    SummarizationAdapter,
};
use trial_match_core::scoring::{LocalMatchEvaluator, MatchEvaluator};

/// Discovery that replays scripted failures, then serves its candidates
pub struct ScriptedDiscovery {
    candidates: Vec<CandidateRecord>,
    total_found: Option<usize>,
    failures: Mutex<VecDeque<AdapterError>>,
    cancel_on_call: Option<CancellationToken>,
    calls: AtomicUsize,
}

impl ScriptedDiscovery {
    pub fn returning(candidates: Vec<CandidateRecord>) -> Self {
        Self {
            candidates,
            total_found: None,
            failures: Mutex::new(VecDeque::new()),
            cancel_on_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    /// Fail with `error` on every call
    pub fn failing(error: AdapterError) -> Self {
        let discovery = Self::empty();
        discovery.failures.lock().extend(std::iter::repeat(error).take(64));
        discovery
    }

    /// Fail with each error in turn before succeeding
    pub fn failing_first(self, errors: Vec<AdapterError>) -> Self {
        self.failures.lock().extend(errors);
        self
    }

    pub fn with_total_found(mut self, total_found: usize) -> Self {
        self.total_found = Some(total_found);
        self
    }

    /// Signal `token` while serving the response
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryAdapter for ScriptedDiscovery {
    async fn discover(&self, _request: &DiscoveryRequest) -> Result<DiscoveryResponse, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        let mut response = DiscoveryResponse::new(self.candidates.clone());
        if let Some(total_found) = self.total_found {
            response.total_found = total_found;
        }
        Ok(response)
    }
}

/// Extraction with per-candidate scripted failures and concurrency tracking
pub struct ScriptedExtraction {
    criteria: HashMap<String, CriteriaSet>,
    failures: Mutex<HashMap<String, VecDeque<AdapterError>>>,
    permanent_failures: HashMap<String, AdapterError>,
    delay: Duration,
    cancel_on_call: Option<CancellationToken>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExtraction {
    pub fn new(criteria: Vec<CriteriaSet>) -> Self {
        Self {
            criteria: criteria
                .into_iter()
                .map(|set| (set.candidate_id.clone(), set))
                .collect(),
            failures: Mutex::new(HashMap::new()),
            permanent_failures: HashMap::new(),
            delay: Duration::ZERO,
            cancel_on_call: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail every call for `candidate_id`
    pub fn fail_always(mut self, candidate_id: &str, error: AdapterError) -> Self {
        self.permanent_failures
            .insert(candidate_id.to_string(), error);
        self
    }

    /// Fail the first calls for `candidate_id` with `errors`, then succeed
    pub fn fail_first(self, candidate_id: &str, errors: Vec<AdapterError>) -> Self {
        self.failures
            .lock()
            .insert(candidate_id.to_string(), errors.into());
        self
    }

    /// Time each call holds its slot
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, candidate_id: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|id| id.as_str() == candidate_id)
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionAdapter for ScriptedExtraction {
    async fn extract(&self, candidate_id: &str) -> Result<CriteriaSet, AdapterError> {
        self.calls.lock().push(candidate_id.to_string());
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.permanent_failures.get(candidate_id) {
            return Err(error.clone());
        }
        let scripted = self
            .failures
            .lock()
            .get_mut(candidate_id)
            .and_then(|errors| errors.pop_front());
        if let Some(error) = scripted {
            return Err(error);
        }

        self.criteria
            .get(candidate_id)
            .cloned()
            .ok_or_else(|| AdapterError::not_found(format!("criteria for {candidate_id}")))
    }
}

/// Summarizer that always fails
pub struct FailingSummarizer;

#[async_trait]
impl SummarizationAdapter for FailingSummarizer {
    async fn summarize(
        &self,
        _outcomes: &[MatchOutcome],
        _language: &str,
    ) -> Result<SummaryArtifact, AdapterError> {
        Err(AdapterError::upstream("summarization", "voice service unavailable"))
    }
}

/// Local scoring, except for candidates listed as failing
pub struct SelectiveEvaluator {
    inner: LocalMatchEvaluator,
    failing: HashSet<String>,
}

impl SelectiveEvaluator {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            inner: LocalMatchEvaluator::new(),
            failing: ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[async_trait]
impl MatchEvaluator for SelectiveEvaluator {
    async fn evaluate(
        &self,
        profile: &EvidenceProfile,
        candidate: &CandidateRecord,
        criteria: &CriteriaSet,
    ) -> Result<MatchOutcome, AdapterError> {
        if self.failing.contains(&candidate.id) {
            return Err(AdapterError::upstream("matching", "evaluator rejected input"));
        }
        self.inner.evaluate(profile, candidate, criteria).await
    }

    fn name(&self) -> &str {
        "selective"
    }
}

/// Keeps every progress event for later inspection
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events
            .lock()
            .iter()
            .map(|event| event.overall_percent)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().push(event);
    }
}
