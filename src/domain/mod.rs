//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw observations and calendar-month keys (`Observation`, `Month`)
//! - the four fixed input series and their aggregation policy (`SeriesRole`)
//! - derived outputs (`RateFrame`, `ReductionEstimate`)

pub mod types;

pub use types::*;
