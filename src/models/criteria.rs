use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of criterion category tags assigned by Extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionCategory {
    Diagnosis,
    Biomarker,
    Treatment,
    Demographics,
    #[default]
    Other,
}

impl fmt::Display for CriterionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagnosis => write!(f, "diagnosis"),
            Self::Biomarker => write!(f, "biomarker"),
            Self::Treatment => write!(f, "treatment"),
            Self::Demographics => write!(f, "demographics"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One eligibility criterion: free text plus category tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub text: String,
    #[serde(default)]
    pub category: CriterionCategory,
}

impl Criterion {
    pub fn new(text: impl Into<String>, category: CriterionCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Inclusive age bounds in years; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgeRange {
    pub min_years: Option<u32>,
    pub max_years: Option<u32>,
}

impl AgeRange {
    pub fn contains(&self, age: u32) -> bool {
        self.min_years.map_or(true, |min| age >= min) && self.max_years.map_or(true, |max| age <= max)
    }
}

/// Structured eligibility data for one candidate, produced by Extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaSet {
    pub candidate_id: String,
    #[serde(default)]
    pub inclusion: Vec<Criterion>,
    #[serde(default)]
    pub exclusion: Vec<Criterion>,
    #[serde(default)]
    pub age_range: AgeRange,
    #[serde(default)]
    pub accepts_healthy_volunteers: bool,
}

impl CriteriaSet {
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            inclusion: Vec::new(),
            exclusion: Vec::new(),
            age_range: AgeRange::default(),
            accepts_healthy_volunteers: false,
        }
    }

    pub fn include(mut self, text: impl Into<String>, category: CriterionCategory) -> Self {
        self.inclusion.push(Criterion::new(text, category));
        self
    }

    pub fn exclude(mut self, text: impl Into<String>, category: CriterionCategory) -> Self {
        self.exclusion.push(Criterion::new(text, category));
        self
    }

    pub fn with_age_range(mut self, min_years: Option<u32>, max_years: Option<u32>) -> Self {
        self.age_range = AgeRange {
            min_years,
            max_years,
        };
        self
    }

    pub fn criteria_count(&self) -> usize {
        self.inclusion.len() + self.exclusion.len()
    }
}
