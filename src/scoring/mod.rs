//! # Scoring
//!
//! Deterministic eligibility scoring. [`ScoringEngine`] evaluates hard
//! exclusions first, then accumulates weighted matching factors, then maps
//! the score onto a [`MatchCategory`](crate::models::MatchCategory) and a
//! templated summary. Criterion matching is a normalised text-overlap
//! heuristic plus small parsers for performance-status ranges and disease
//! stages.

pub mod engine;
pub mod evaluator;
pub mod factors;
pub mod parsers;
pub mod summary;
pub mod text;

pub use engine::ScoringEngine;
pub use evaluator::{LocalMatchEvaluator, MatchEvaluator};
pub use factors::FactorKind;
pub use parsers::{parse_performance_status, parse_stages, PerformanceStatusRange};
pub use text::{normalize, overlaps};
