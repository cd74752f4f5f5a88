//! Streaming, cancellable filesystem scan for arc directories.
//!
//! The scanner runs the platform's native filesystem search for `.git`
//! entries, classifies the parent of each match, and reports progress while
//! the search is still running.
//!
//! # Overview
//!
//! The main entry point is [`ArcScanner`], which combines:
//!
//! - a [`CandidateSource`] ([`UnixSource`] or [`WindowsSource`]) producing raw candidates
//! - a [`ScanRun`] classifying candidates and keeping the cumulative [`ScanSummary`]
//! - a [`SharedRegistry`] read to decide which arcs are new
//!
//! # Example
//!
//! ```no_run
//! use arcs_core::ScanConfig;
//! use arcs_registry::{ArcRegistry, JsonFileStore};
//! use arcs_scanner::{ArcScanner, ScanUpdate};
//! use futures_util::StreamExt;
//!
//! # async fn example() -> Result<(), arcs_registry::RegistryError> {
//! let config = ScanConfig::default();
//! let store = JsonFileStore::new("/home/user/.local/share/arcs/localArcs.json");
//! let registry = ArcRegistry::open(store, config.classifier())?.into_shared();
//! let scanner = ArcScanner::new(&config, registry);
//!
//! let mut updates = scanner.scan(false);
//! while let Some(update) = updates.next().await {
//!     match update {
//!         ScanUpdate::Progress { event, summary } => {
//!             println!("{event:?} ({} candidates)", summary.counters.candidates_examined);
//!         }
//!         ScanUpdate::Finished(summary) => println!("{} new arcs", summary.counters.arcs_new),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Cancellation
//!
//! There is no cancellation token. Dropping the update stream drops the
//! running search process handle, which kills the process.
//!
//! # Architecture
//!
//! ```text
//! ArcScanner::scan
//!     │
//!     ├── CandidateSource::candidates (lazy, per call)
//!     │       │
//!     │       └── search processes, one at a time (kill on drop)
//!     │
//!     └── ScanRun::drive
//!             │
//!             ├── ArcClassifier (canonical parent of each candidate)
//!             └── SharedRegistry (read lock per confirmed arc)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod command;
mod error;
mod orchestrator;
mod process;
mod source;

pub use command::CommandSpec;
pub use error::ScanError;
pub use orchestrator::{ScanRun, ScanState, ScanUpdate};
pub use source::{
    CandidateSource, CandidateStream, Platform, SourceEvent, UnixSource, WindowsSource,
    parse_drive_list,
};

use std::sync::Arc;

use arcs_core::{ArcClassifier, ScanConfig, ScanSummary};
use arcs_registry::SharedRegistry;
use futures_util::stream::BoxStream;
use tracing::info;

/// Entry point for arc discovery.
///
/// # Cloning
///
/// `ArcScanner` is cheaply cloneable. Clones share the candidate source and
/// the registry. Every [`scan`](Self::scan) call is an independent run.
#[derive(Debug, Clone)]
pub struct ArcScanner {
    source: Arc<dyn CandidateSource>,
    classifier: ArcClassifier,
    registry: SharedRegistry,
    platform: String,
}

impl ArcScanner {
    /// Creates a scanner using the search strategy of the running platform.
    #[must_use]
    pub fn new(config: &ScanConfig, registry: SharedRegistry) -> Self {
        let platform = Platform::current();
        info!(?platform, root = %config.search_root, "Arc scanner created");
        Self::with_source(platform.source(config), config.classifier(), registry)
    }

    /// Creates a scanner over a custom candidate source.
    #[must_use]
    pub fn with_source(
        source: Arc<dyn CandidateSource>,
        classifier: ArcClassifier,
        registry: SharedRegistry,
    ) -> Self {
        Self {
            source,
            classifier,
            registry,
            platform: std::env::consts::OS.to_owned(),
        }
    }

    /// Returns the registry consulted during scans.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Returns the classifier applied to candidate parents.
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &ArcClassifier {
        &self.classifier
    }

    /// Returns the platform name recorded in scan summaries.
    #[inline]
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Starts a scan.
    ///
    /// Nothing runs until the stream is polled. The stream yields one
    /// [`ScanUpdate::Progress`] per reported event and ends with exactly one
    /// [`ScanUpdate::Finished`].
    pub fn scan(&self, full_scan: bool) -> BoxStream<'static, ScanUpdate> {
        info!(platform = %self.platform, full_scan, "Starting arc scan");
        let run = ScanRun::new(
            self.platform.as_str(),
            self.classifier.clone(),
            Arc::clone(&self.registry),
        );
        run.drive(self.source.candidates(full_scan))
    }

    /// Runs a scan to completion and returns the terminal summary.
    pub async fn scan_to_end(&self, full_scan: bool) -> ScanSummary {
        use futures_util::StreamExt;

        let mut last = ScanSummary::new(self.platform.as_str());
        let mut updates = self.scan(full_scan);
        while let Some(update) = updates.next().await {
            if let ScanUpdate::Finished(summary) = update {
                last = summary;
            }
        }
        last
    }
}
