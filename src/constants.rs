//! # System Constants
//!
//! Fixed weights and thresholds that define the scoring contract and the
//! progress model of a matching run. These are part of the contract, not
//! configuration: changing any of them changes every outcome.

// Re-export state types for convenience
pub use crate::state_machine::{PipelineStage, StageStatus};

/// Per-factor weights used by the scoring engine (1-10 scale)
pub mod weights {
    pub const DIAGNOSIS: u8 = 10;
    pub const BIOMARKER: u8 = 9;
    pub const STAGE: u8 = 8;
    pub const PERFORMANCE_STATUS: u8 = 7;
    pub const TREATMENT: u8 = 6;
    pub const DEMOGRAPHICS: u8 = 5;
    pub const OTHER: u8 = 3;

    /// Sum of every factor weight; denominator of the weighted score
    pub const TOTAL: u32 = DIAGNOSIS as u32
        + BIOMARKER as u32
        + STAGE as u32
        + PERFORMANCE_STATUS as u32
        + TREATMENT as u32
        + DEMOGRAPHICS as u32
        + OTHER as u32;
}

/// Score bands, inclusive on the lower bound
pub mod thresholds {
    pub const STRONG: u8 = 75;
    pub const POSSIBLE: u8 = 50;
    pub const FUTURE_POTENTIAL: u8 = 25;
}

/// Scoring penalties and caps
pub mod scoring {
    /// Score ceiling for a candidate with at least one blocking factor
    pub const BLOCKED_SCORE_CEILING: i32 = 20;
    /// Points removed per blocking factor from the ceiling
    pub const BLOCKING_PENALTY: i32 = 10;
    /// Points removed per uncertain inclusion factor
    pub const UNCERTAIN_PENALTY: i32 = 5;
    pub const MAX_SCORE: u8 = 100;
    /// Highest value on the ECOG performance-status scale
    pub const MAX_PERFORMANCE_STATUS: u8 = 4;
}

/// Contribution of each stage to overall run progress (sums to 100)
pub mod stage_weights {
    pub const DISCOVERY: u32 = 15;
    pub const EXTRACTION: u32 = 35;
    pub const MATCHING: u32 = 35;
    pub const SUMMARIZATION: u32 = 15;
}

/// Run defaults used when no configuration is supplied
pub mod defaults {
    pub const MAX_CANDIDATES: usize = 20;
    pub const EXTRACTION_CONCURRENCY: usize = 5;
    pub const MATCHING_CONCURRENCY: usize = 5;
    pub const RETRY_MAX_ATTEMPTS: u32 = 3;
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;
    pub const ELIGIBLE_STATUSES: &[&str] =
        &["RECRUITING", "NOT_YET_RECRUITING", "ENROLLING_BY_INVITATION"];
}

/// Service names used when adapters report failures
pub mod services {
    pub const DISCOVERY: &str = "discovery";
    pub const EXTRACTION: &str = "extraction";
    pub const MATCHING: &str = "matching";
    pub const SUMMARIZATION: &str = "summarization";
}
