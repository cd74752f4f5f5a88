//! Persisted registry of tracked arcs and tracked directories.
//!
//! The registry is the authoritative answer to "which arcs does this machine
//! know about?". It holds two sets of absolute paths:
//!
//! - explicitly tracked arcs
//! - tracked directories, whose immediate arc children are listed as arcs
//!
//! Every successful mutation is saved through a [`RegistryStore`] before it
//! returns. [`ArcRegistry::list_arcs`] repairs entries whose paths have
//! disappeared from disk.
//!
//! # Crate Dependencies
//!
//! ```text
//! arcs-cli ──► arcs-scanner ──► arcs-registry ──► arcs-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod registry;
pub mod store;

pub use error::RegistryError;
pub use registry::{ArcRegistry, SharedRegistry};
pub use store::{DOCUMENT_VERSION, JsonFileStore, RegistryDocument, RegistryStore};
