//! Domain types for the arcs tracker.
//!
//! # Module Organization
//!
//! - [`arc`] - Tracked arc records
//! - [`scan`] - Scan events, counters, and cumulative summaries
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use arcs_core::{LocalArc, ScanEvent, ScanSummary};
//! ```

mod arc;
mod scan;

pub use arc::LocalArc;
pub use scan::{ScanCounters, ScanEvent, ScanMessage, ScanSummary};
