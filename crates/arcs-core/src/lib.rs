//! Core types, configuration, and arc classification for the arcs tracker.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`ArcClassifier`] - the "is this directory an arc?" predicate
//! - Domain types ([`LocalArc`], [`ScanEvent`], [`ScanSummary`])
//! - Configuration structures ([`Config`], [`ScanConfig`], [`RegistryConfig`])
//! - [`ConfigError`] for configuration loading failures
//!
//! # Crate Dependencies
//!
//! ```text
//! arcs-cli ──► arcs-scanner ──► arcs-registry ──► arcs-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod error;
pub mod types;

pub use classify::{ArcClassifier, DEFAULT_MARKER_FILE};
pub use config::{Config, RegistryConfig, ScanConfig};
pub use error::ConfigError;
pub use types::{LocalArc, ScanCounters, ScanEvent, ScanMessage, ScanSummary};
