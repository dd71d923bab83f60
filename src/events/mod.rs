//! # Progress Events
//!
//! Per-run progress reporting. The coordinator pushes a [`ProgressEvent`] to a
//! caller-supplied [`ProgressSink`] at every stage transition and every
//! intra-stage progress update; nothing is kept in global state.

pub mod progress;

pub use progress::{ChannelProgressSink, NoopProgressSink, ProgressEvent, ProgressSink};
