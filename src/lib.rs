//! `exante` library crate.
//!
//! The binary (`exante`) is a thin wrapper around this library so that:
//!
//! - the alignment/merge logic is testable without network access
//! - the batch report and the TUI dashboard share one pipeline
//! - series sources can be swapped (live API vs. recorded fixtures)

pub mod app;
pub mod calc;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
