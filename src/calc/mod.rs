//! Monthly alignment and the two derived quantities.
//!
//! Responsibilities:
//!
//! - bucket raw observations onto calendar months (mean or one-month shift)
//! - merge overnight rate with inflation expectations into the ex-ante real rate
//! - estimate the average policy-rate reduction per remaining meeting

pub mod align;
pub mod merge;
pub mod reduction;

pub use align::*;
pub use merge::*;
pub use reduction::*;
