//! Shared fixtures for the engine test suites.

pub(crate) mod engine;
pub(crate) mod harness;
pub(crate) mod host;
pub(crate) mod reporter;
