use crate::constants::thresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mutually exclusive outcome bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    Strong,
    Possible,
    FuturePotential,
    NotEligible,
}

impl MatchCategory {
    /// Map a final score onto its band; thresholds are inclusive lower bounds
    pub fn from_score(score: u8) -> Self {
        if score >= thresholds::STRONG {
            Self::Strong
        } else if score >= thresholds::POSSIBLE {
            Self::Possible
        } else if score >= thresholds::FUTURE_POTENTIAL {
            Self::FuturePotential
        } else {
            Self::NotEligible
        }
    }

    /// Rank used for ordering bands, strongest first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Strong => 0,
            Self::Possible => 1,
            Self::FuturePotential => 2,
            Self::NotEligible => 3,
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Possible => write!(f, "possible"),
            Self::FuturePotential => write!(f, "future_potential"),
            Self::NotEligible => write!(f, "not_eligible"),
        }
    }
}

/// Evidence supporting eligibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingFactor {
    pub label: String,
    /// 1-10
    pub weight: u8,
}

/// Evidence that hard-excludes the candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingFactor {
    pub label: String,
    pub reason: String,
}

/// Scored, categorised and explained result for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub candidate_id: String,
    /// 0-100
    pub score: u8,
    pub category: MatchCategory,
    pub matching_factors: Vec<MatchingFactor>,
    pub blocking_factors: Vec<BlockingFactor>,
    pub uncertain_factors: Vec<String>,
    pub summary: String,
}

impl MatchOutcome {
    pub fn is_blocked(&self) -> bool {
        !self.blocking_factors.is_empty()
    }

    /// Highest-weight matching factor, first in list on ties
    pub fn top_matching_factor(&self) -> Option<&MatchingFactor> {
        self.matching_factors
            .iter()
            .fold(None, |best: Option<&MatchingFactor>, factor| match best {
                Some(current) if current.weight >= factor.weight => Some(current),
                _ => Some(factor),
            })
    }
}
