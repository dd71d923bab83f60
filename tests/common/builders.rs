//! Test data builders for profiles, candidates and criteria.

use trial_match_core::models::{
    CandidateRecord, CriteriaSet, CriterionCategory, DiseaseStage, EvidenceProfile, Location,
};

pub const CONDITION: &str = "Non-small cell lung cancer";
pub const BIOMARKER: &str = "EGFR exon 19 deletion";

/// Stage IV NSCLC, EGFR positive, ECOG 1, carboplatin pre-treated
pub fn lung_profile() -> EvidenceProfile {
    EvidenceProfile::new(CONDITION, "94110")
        .with_stage(DiseaseStage::IV)
        .with_biomarker(BIOMARKER)
        .with_prior_treatment("carboplatin")
        .with_performance_status(1)
        .with_max_travel_miles(100)
}

pub fn candidate_id(index: usize) -> String {
    format!("NCT{:08}", index + 1)
}

pub fn candidate(id: &str) -> CandidateRecord {
    CandidateRecord::new(id, format!("Study {id}")).with_condition(CONDITION)
}

/// `count` recruiting candidates with sequential ids
pub fn candidates(count: usize) -> Vec<CandidateRecord> {
    (0..count).map(|i| candidate(&candidate_id(i))).collect()
}

pub fn site(facility: &str, distance_miles: f64) -> Location {
    Location {
        facility: facility.to_string(),
        city: String::new(),
        state: String::new(),
        postal_code: String::new(),
        distance_miles: Some(distance_miles),
    }
}

/// Criteria matching the diagnosis and biomarker of [`lung_profile`]
pub fn strong_criteria(id: &str) -> CriteriaSet {
    CriteriaSet::new(id)
        .include("Histologically confirmed non-small cell lung cancer", CriterionCategory::Diagnosis)
        .include("Documented EGFR exon 19 deletion", CriterionCategory::Biomarker)
        .include("Stage IIIB-IV disease", CriterionCategory::Other)
        .include("ECOG performance status 0-1", CriterionCategory::Other)
        .include("Progression after carboplatin", CriterionCategory::Treatment)
}

/// Criteria that only match the diagnosis
pub fn diagnosis_only_criteria(id: &str) -> CriteriaSet {
    CriteriaSet::new(id).include(CONDITION, CriterionCategory::Diagnosis)
}

/// Criteria with an exclusion naming the profile's biomarker
pub fn excluding_biomarker_criteria(id: &str) -> CriteriaSet {
    diagnosis_only_criteria(id).exclude(
        format!("Known {BIOMARKER}"),
        CriterionCategory::Biomarker,
    )
}

pub fn criteria_for(candidates: &[CandidateRecord]) -> Vec<CriteriaSet> {
    candidates
        .iter()
        .map(|candidate| strong_criteria(&candidate.id))
        .collect()
}
