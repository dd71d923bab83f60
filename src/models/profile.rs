use crate::constants::scoring::MAX_PERFORMANCE_STATUS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Ordinal disease stage as reported by the patient
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseStage {
    #[default]
    Unknown,
    I,
    II,
    III,
    IV,
}

impl DiseaseStage {
    /// Numeric ordinal (1-4), `None` when unknown
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::I => Some(1),
            Self::II => Some(2),
            Self::III => Some(3),
            Self::IV => Some(4),
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            1 => Self::I,
            2 => Self::II,
            3 => Self::III,
            4 => Self::IV,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for DiseaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::I => write!(f, "stage I"),
            Self::II => write!(f, "stage II"),
            Self::III => write!(f, "stage III"),
            Self::IV => write!(f, "stage IV"),
        }
    }
}

/// Patient's self-reported medical profile
///
/// Sets are ordered so that scoring iterates them deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceProfile {
    pub condition: String,
    #[serde(default)]
    pub stage: DiseaseStage,
    #[serde(default)]
    pub biomarkers: BTreeSet<String>,
    /// ECOG performance status (0-4)
    pub performance_status: u8,
    #[serde(default)]
    pub prior_treatments: BTreeSet<String>,
    pub location_code: String,
    pub max_travel_miles: u32,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl EvidenceProfile {
    pub fn new(condition: impl Into<String>, location_code: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            stage: DiseaseStage::Unknown,
            biomarkers: BTreeSet::new(),
            performance_status: 0,
            prior_treatments: BTreeSet::new(),
            location_code: location_code.into(),
            max_travel_miles: 100,
            language: default_language(),
        }
    }

    pub fn with_stage(mut self, stage: DiseaseStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_biomarker(mut self, biomarker: impl Into<String>) -> Self {
        self.biomarkers.insert(biomarker.into());
        self
    }

    pub fn with_prior_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.prior_treatments.insert(treatment.into());
        self
    }

    pub fn with_performance_status(mut self, performance_status: u8) -> Self {
        self.performance_status = performance_status;
        self
    }

    pub fn with_max_travel_miles(mut self, miles: u32) -> Self {
        self.max_travel_miles = miles;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Check the profile is usable for a run
    pub fn validate(&self) -> Result<(), String> {
        if self.condition.trim().is_empty() {
            return Err("condition must not be empty".to_string());
        }
        if self.performance_status > MAX_PERFORMANCE_STATUS {
            return Err(format!(
                "performance status {} is outside 0-{MAX_PERFORMANCE_STATUS}",
                self.performance_status
            ));
        }
        Ok(())
    }
}
