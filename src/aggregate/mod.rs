//! Aggregation pipeline for outbreak records.
//!
//! Raw records come in flat and redundant; everything the dashboard
//! renders is derived here.

pub mod outbreaks;

pub use outbreaks::*;
