//! Leadership scoring rubrics.
//!
//! Two rubrics are derived from the same `SignalSet` and must not be
//! conflated: the 6-point leadership score for single-symbol analysis and
//! the 7-point CANSLIM score used to rank across markets.

pub mod canslim;
pub mod leadership;

pub use canslim::{CanslimScore, NEW_PRODUCTS_PLACEHOLDER};
pub use leadership::{Grade, LeadershipScore};

/// Strength ratio at or above which the up moves are considered dominant.
pub const STRENGTH_RATIO_THRESHOLD: f64 = 1.2;
