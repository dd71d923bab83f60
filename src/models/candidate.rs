use crate::execution::BatchItem;
use serde::{Deserialize, Serialize};

/// A study site with its distance from the profile's location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub facility: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    /// Distance from the profile's postal code, when it could be computed
    #[serde(default)]
    pub distance_miles: Option<f64>,
}

/// A clinical study produced by Discovery; read-only afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub phase: String,
    pub status: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub interventions: Vec<String>,
    /// Nearest first
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            phase: String::new(),
            status: "RECRUITING".to_string(),
            sponsor: String::new(),
            conditions: Vec::new(),
            interventions: Vec::new(),
            locations: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Smallest known site distance
    pub fn nearest_distance(&self) -> Option<f64> {
        self.locations
            .iter()
            .filter_map(|location| location.distance_miles)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Status normalised to the upper snake case registry form
    pub fn normalized_status(&self) -> String {
        normalize_status(&self.status)
    }
}

impl BatchItem for CandidateRecord {
    fn batch_key(&self) -> &str {
        &self.id
    }
}

/// Upper-case a recruiting status and fold spaces/hyphens into underscores
pub fn normalize_status(status: &str) -> String {
    status
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
