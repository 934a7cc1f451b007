//! Reporting utilities: formatted terminal output for the batch report.

pub mod format;

pub use format::*;
