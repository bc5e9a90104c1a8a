//! Helpers for tests: throw-away databases, catalog fixtures and a scripted payment provider.
pub mod fixtures;
pub mod prepare_env;
pub mod scripted_verifier;
