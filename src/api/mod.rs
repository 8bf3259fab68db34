//! Remote data source client.
//!
//! This module provides the HTTP client for the outbreak feed and the
//! local-fixture loader used in its place for offline runs.

pub mod client;

pub use client::{load_fixture, ApiConfig, ApiError, OutbreakClient};
