//! Filtering of Discovery output before Extraction.

use crate::config::DiscoveryConfig;
use crate::models::{normalize_status, CandidateRecord};
use std::collections::HashSet;
use std::fmt;

/// Why a discovered candidate was not carried into Extraction
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Same id already seen earlier in discovery order
    Duplicate,
    /// Recruiting status not in the accepted list
    Status(String),
    /// Nearest known site is beyond the profile's travel radius
    OutOfRange {
        distance_miles: f64,
        max_travel_miles: u32,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate listing"),
            Self::Status(status) => write!(f, "not enrolling (status {status})"),
            Self::OutOfRange {
                distance_miles,
                max_travel_miles,
            } => write!(
                f,
                "nearest site is {distance_miles:.0} miles away (limit {max_travel_miles})"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub candidate_id: String,
    pub reason: RejectionReason,
}

/// Result of selection; `selected` keeps discovery order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub selected: Vec<CandidateRecord>,
    pub rejected: Vec<Rejection>,
    /// Eligible candidates cut by the candidate cap
    pub truncated: usize,
}

/// Applies dedupe, status, distance and cap filters in that order
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    eligible_statuses: HashSet<String>,
    enforce_travel_radius: bool,
    max_candidates: usize,
}

impl CandidateSelector {
    pub fn new(config: &DiscoveryConfig, max_candidates: usize) -> Self {
        Self {
            eligible_statuses: config
                .eligible_statuses
                .iter()
                .map(|status| normalize_status(status))
                .filter(|status| !status.is_empty())
                .collect(),
            enforce_travel_radius: config.enforce_travel_radius,
            max_candidates,
        }
    }

    pub fn select(&self, candidates: Vec<CandidateRecord>, max_travel_miles: u32) -> Selection {
        let mut seen = HashSet::new();
        let mut selection = Selection::default();

        for candidate in candidates {
            if let Some(reason) = self.rejection_for(&candidate, &mut seen, max_travel_miles) {
                selection.rejected.push(Rejection {
                    candidate_id: candidate.id,
                    reason,
                });
                continue;
            }

            if selection.selected.len() < self.max_candidates {
                selection.selected.push(candidate);
            } else {
                selection.truncated += 1;
            }
        }

        selection
    }

    fn rejection_for(
        &self,
        candidate: &CandidateRecord,
        seen: &mut HashSet<String>,
        max_travel_miles: u32,
    ) -> Option<RejectionReason> {
        if !seen.insert(candidate.id.clone()) {
            return Some(RejectionReason::Duplicate);
        }

        let status = candidate.normalized_status();
        if !self.eligible_statuses.contains(&status) {
            return Some(RejectionReason::Status(status));
        }

        if self.enforce_travel_radius {
            if let Some(distance) = candidate.nearest_distance() {
                if distance > f64::from(max_travel_miles) {
                    return Some(RejectionReason::OutOfRange {
                        distance_miles: distance,
                        max_travel_miles,
                    });
                }
            }
        }

        None
    }
}
