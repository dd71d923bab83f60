//! In-process implementations of the stage adapter traits, backed by JSON
//! fixtures. Used by the `match-runner` binary and by tests.

pub mod fixture;

pub use fixture::{
    estimate_duration_seconds, FixtureDiscovery, FixtureError, FixtureExtraction, MatchFixture,
    TemplateSummarizer, WORDS_PER_MINUTE,
};
