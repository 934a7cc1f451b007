//! Input/output helpers.
//!
//! - rate frame CSV export (`export`)

pub mod export;

pub use export::*;
