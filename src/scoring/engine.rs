use super::factors::FactorKind;
use super::parsers::{parse_performance_status, parse_stages};
use super::summary;
use super::text::{first_overlap, overlaps};
use crate::constants::{scoring, weights};
use crate::models::{
    BlockingFactor, CriteriaSet, Criterion, CriterionCategory, EvidenceProfile, MatchCategory,
    MatchOutcome, MatchingFactor,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Deterministic scorer turning a profile and a criteria set into a ranked,
/// explained outcome
///
/// Holds no state; the same inputs always produce the same [`MatchOutcome`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, profile: &EvidenceProfile, criteria: &CriteriaSet) -> MatchOutcome {
        let blocking_factors = self.blocking_factors(profile, criteria);

        if !blocking_factors.is_empty() {
            let count = i32::try_from(blocking_factors.len()).unwrap_or(i32::MAX);
            let score = scoring::BLOCKED_SCORE_CEILING
                .saturating_sub(scoring::BLOCKING_PENALTY.saturating_mul(count))
                .max(0);
            let category = MatchCategory::NotEligible;
            let summary = summary::render(category, None, blocking_factors.first(), 0);

            debug!(
                candidate_id = %criteria.candidate_id,
                blocking = blocking_factors.len(),
                score,
                "Candidate hard-excluded"
            );

            return MatchOutcome {
                candidate_id: criteria.candidate_id.clone(),
                score: clamp_score(score),
                category,
                matching_factors: Vec::new(),
                blocking_factors,
                uncertain_factors: Vec::new(),
                summary,
            };
        }

        let mut matched_kinds = BTreeSet::new();
        let mut matching_factors = Vec::new();
        let mut uncertain_factors: Vec<String> = Vec::new();

        for criterion in &criteria.inclusion {
            let kind = FactorKind::of(criterion);
            if self.inclusion_matches(profile, criterion, kind) {
                matched_kinds.insert(kind);
                matching_factors.push(MatchingFactor {
                    label: criterion.text.clone(),
                    weight: kind.weight(),
                });
            } else if !uncertain_factors.contains(&criterion.text) {
                uncertain_factors.push(criterion.text.clone());
            }
        }

        let matched_weight: u32 = matched_kinds.iter().map(|k| u32::from(k.weight())).sum();
        let weighted = (100.0 * f64::from(matched_weight) / f64::from(weights::TOTAL)).round();
        let penalty = i32::try_from(uncertain_factors.len())
            .unwrap_or(i32::MAX)
            .saturating_mul(scoring::UNCERTAIN_PENALTY);
        // weighted is within 0..=100 so the cast is lossless
        let score = clamp_score((weighted as i32).saturating_sub(penalty));
        let category = MatchCategory::from_score(score);

        let mut outcome = MatchOutcome {
            candidate_id: criteria.candidate_id.clone(),
            score,
            category,
            matching_factors,
            blocking_factors,
            uncertain_factors,
            summary: String::new(),
        };
        outcome.summary = summary::render(
            category,
            outcome.top_matching_factor(),
            None,
            outcome.uncertain_factors.len(),
        );

        debug!(
            candidate_id = %outcome.candidate_id,
            score = outcome.score,
            category = %outcome.category,
            matched = outcome.matching_factors.len(),
            uncertain = outcome.uncertain_factors.len(),
            "Candidate scored"
        );

        outcome
    }

    /// Hard exclusions, evaluated before any weighted scoring
    pub fn blocking_factors(
        &self,
        profile: &EvidenceProfile,
        criteria: &CriteriaSet,
    ) -> Vec<BlockingFactor> {
        let mut blocking = Vec::new();

        for criterion in &criteria.exclusion {
            if let Some(reason) = self.exclusion_hit(profile, criterion) {
                blocking.push(BlockingFactor {
                    label: criterion.text.clone(),
                    reason,
                });
            }
        }

        for criterion in &criteria.inclusion {
            if FactorKind::of(criterion) != FactorKind::PerformanceStatus {
                continue;
            }
            if let Some(range) = parse_performance_status(&criterion.text) {
                if !range.contains(profile.performance_status) {
                    blocking.push(BlockingFactor {
                        label: criterion.text.clone(),
                        reason: format!(
                            "performance status {} is outside the required range {range}",
                            profile.performance_status
                        ),
                    });
                }
            }
        }

        blocking
    }

    fn exclusion_hit(&self, profile: &EvidenceProfile, criterion: &Criterion) -> Option<String> {
        if matches!(
            criterion.category,
            CriterionCategory::Biomarker | CriterionCategory::Treatment
        ) {
            if let Some(biomarker) = first_overlap(&profile.biomarkers, &criterion.text) {
                return Some(format!("reported biomarker {biomarker}"));
            }
            if let Some(treatment) = first_overlap(&profile.prior_treatments, &criterion.text) {
                return Some(format!("reported prior treatment {treatment}"));
            }
        }

        if FactorKind::of(criterion) == FactorKind::PerformanceStatus {
            let range = parse_performance_status(&criterion.text)?;
            if range.contains(profile.performance_status) {
                return Some(format!(
                    "performance status {} is within the excluded range {range}",
                    profile.performance_status
                ));
            }
        }

        None
    }

    fn inclusion_matches(
        &self,
        profile: &EvidenceProfile,
        criterion: &Criterion,
        kind: FactorKind,
    ) -> bool {
        let text = criterion.text.as_str();
        match kind {
            FactorKind::Diagnosis => overlaps(&profile.condition, text),
            FactorKind::Biomarker => first_overlap(&profile.biomarkers, text).is_some(),
            FactorKind::Treatment => first_overlap(&profile.prior_treatments, text).is_some(),
            // Out-of-range inclusions were already turned into blocking factors
            FactorKind::PerformanceStatus => parse_performance_status(text)
                .map_or(true, |range| range.contains(profile.performance_status)),
            FactorKind::Stage => {
                profile.stage.is_known() && parse_stages(text).contains(&profile.stage)
            }
            FactorKind::Demographics | FactorKind::Other => {
                overlaps(&profile.condition, text)
                    || first_overlap(&profile.biomarkers, text).is_some()
                    || first_overlap(&profile.prior_treatments, text).is_some()
            }
        }
    }
}

fn clamp_score(score: i32) -> u8 {
    u8::try_from(score.clamp(0, i32::from(scoring::MAX_SCORE))).unwrap_or(scoring::MAX_SCORE)
}
