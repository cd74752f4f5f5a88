//! Platform candidate sources.
//!
//! A [`CandidateSource`] produces a lazy stream of raw `.git` paths (plus
//! narration) by running the platform's native filesystem search. Sources
//! do not classify anything; the orchestrator does that.
//!
//! # Strategies
//!
//! | Platform | Source | Search |
//! |----------|--------|--------|
//! | Windows | [`WindowsSource`] | drive enumeration, then one `dir /s /b` per drive |
//! | Everything else | [`UnixSource`] | a single `find` from the search root |

mod unix;
mod windows;

pub use unix::UnixSource;
pub use windows::{WindowsSource, parse_drive_list};

use std::fmt;
use std::sync::Arc;

use arcs_core::ScanConfig;
use camino::Utf8PathBuf;
use futures_util::stream::BoxStream;

/// An item produced by a candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Progress narration.
    Info(String),
    /// A non-fatal search failure.
    Error(String),
    /// A raw candidate path, not yet classified.
    Path(Utf8PathBuf),
}

/// Stream of source events. Dropping it stops the running search.
pub type CandidateStream = BoxStream<'static, SourceEvent>;

/// Produces candidate `.git` paths for a scan.
///
/// Every call starts a fresh, independent search. The stream ends when the
/// underlying search processes close their output.
pub trait CandidateSource: Send + Sync + fmt::Debug {
    /// Starts a search.
    ///
    /// With `full_scan` the search crosses filesystem boundaries (Unix) or
    /// includes every drive (Windows).
    fn candidates(&self, full_scan: bool) -> CandidateStream;
}

/// Search strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `find`-based search.
    Unix,
    /// Drive enumeration followed by per-drive `dir` searches.
    Windows,
}

impl Platform {
    /// Returns the strategy for the running operating system.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps an operating system name (as in [`std::env::consts::OS`]) to a
    /// strategy. Anything other than `windows` uses the Unix strategy.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        if os == "windows" {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Builds the default source for this strategy.
    ///
    /// `search_root` is only used by the Unix strategy.
    #[must_use]
    pub fn source(self, config: &ScanConfig) -> Arc<dyn CandidateSource> {
        match self {
            Self::Unix => Arc::new(UnixSource::new(config.search_root.clone())),
            Self::Windows => Arc::new(WindowsSource::default()),
        }
    }
}
