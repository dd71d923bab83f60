//! Shared fixtures for the integration test suites.

#![allow(dead_code)] // Each test binary uses a different subset

pub mod builders;
pub mod fakes;
pub mod strategies;

pub use builders::*;
pub use fakes::*;
