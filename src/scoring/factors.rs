use super::parsers::{mentions_performance_status, mentions_stage};
use crate::constants::weights;
use crate::models::{Criterion, CriterionCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weighted evidence dimension a criterion is scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Diagnosis,
    Biomarker,
    Stage,
    PerformanceStatus,
    Treatment,
    Demographics,
    Other,
}

impl FactorKind {
    pub const ALL: [FactorKind; 7] = [
        FactorKind::Diagnosis,
        FactorKind::Biomarker,
        FactorKind::Stage,
        FactorKind::PerformanceStatus,
        FactorKind::Treatment,
        FactorKind::Demographics,
        FactorKind::Other,
    ];

    pub fn weight(&self) -> u8 {
        match self {
            Self::Diagnosis => weights::DIAGNOSIS,
            Self::Biomarker => weights::BIOMARKER,
            Self::Stage => weights::STAGE,
            Self::PerformanceStatus => weights::PERFORMANCE_STATUS,
            Self::Treatment => weights::TREATMENT,
            Self::Demographics => weights::DEMOGRAPHICS,
            Self::Other => weights::OTHER,
        }
    }

    /// Resolve the kind a criterion is scored as
    ///
    /// Performance-scale mentions win over stage mentions, which win over the
    /// category tag.
    pub fn of(criterion: &Criterion) -> Self {
        if mentions_performance_status(&criterion.text) {
            Self::PerformanceStatus
        } else if mentions_stage(&criterion.text) {
            Self::Stage
        } else {
            Self::from(criterion.category)
        }
    }
}

impl From<CriterionCategory> for FactorKind {
    fn from(category: CriterionCategory) -> Self {
        match category {
            CriterionCategory::Diagnosis => Self::Diagnosis,
            CriterionCategory::Biomarker => Self::Biomarker,
            CriterionCategory::Treatment => Self::Treatment,
            CriterionCategory::Demographics => Self::Demographics,
            CriterionCategory::Other => Self::Other,
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagnosis => write!(f, "diagnosis"),
            Self::Biomarker => write!(f, "biomarker"),
            Self::Stage => write!(f, "stage"),
            Self::PerformanceStatus => write!(f, "performance_status"),
            Self::Treatment => write!(f, "treatment"),
            Self::Demographics => write!(f, "demographics"),
            Self::Other => write!(f, "other"),
        }
    }
}
