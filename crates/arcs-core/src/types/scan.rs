//! Scan progress types.
//!
//! A scan produces a sequence of [`ScanEvent`]s. Every event is paired with a
//! [`ScanSummary`] holding the cumulative state of the scan at the moment the
//! event was emitted, so a consumer that only renders the latest summary never
//! misses anything.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Narration attached to a scan summary.
///
/// Serializes as `{"kind": "info" | "error", "data": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ScanMessage {
    /// Progress or diagnostic narration.
    Info(String),
    /// A non-fatal problem encountered while scanning.
    Error(String),
}

impl ScanMessage {
    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    /// Returns `true` for [`ScanMessage::Error`].
    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A discrete scan event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Human-readable progress narration.
    Info {
        /// The narration text.
        message: String,
    },

    /// A non-fatal problem (spawn failure, unreadable output).
    ///
    /// Errors never abort the scan.
    Error {
        /// Description of the problem.
        message: String,
    },

    /// A candidate whose parent directory is an arc.
    CandidateFound {
        /// Canonical location of the arc.
        path: Utf8PathBuf,
        /// `true` if the registry did not track the arc when it was classified.
        is_new_arc: bool,
    },
}

impl ScanEvent {
    /// Converts an informational or error event into a summary message.
    ///
    /// Returns `None` for [`ScanEvent::CandidateFound`].
    #[must_use]
    pub fn to_message(&self) -> Option<ScanMessage> {
        match self {
            Self::Info { message } => Some(ScanMessage::Info(message.clone())),
            Self::Error { message } => Some(ScanMessage::Error(message.clone())),
            Self::CandidateFound { .. } => None,
        }
    }
}

/// Cumulative scan counters.
///
/// Counters only ever grow, and the invariant
/// `candidates_examined >= arcs_found >= arcs_new` holds at every point.
///
/// # Examples
///
/// ```
/// use arcs_core::ScanCounters;
///
/// let mut counters = ScanCounters::default();
/// counters.record_candidate();
/// counters.record_arc(true);
/// assert_eq!(counters.arcs_known(), 0);
/// assert!(counters.is_consistent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScanCounters {
    /// Candidate paths examined.
    pub candidates_examined: u64,
    /// Candidates whose parent directory is an arc.
    pub arcs_found: u64,
    /// Arcs found that the registry did not already track.
    pub arcs_new: u64,
}

impl ScanCounters {
    /// Counts one examined candidate.
    #[inline]
    pub fn record_candidate(&mut self) {
        self.candidates_examined += 1;
    }

    /// Counts one confirmed arc.
    #[inline]
    pub fn record_arc(&mut self, is_new: bool) {
        self.arcs_found += 1;
        if is_new {
            self.arcs_new += 1;
        }
    }

    /// Arcs found that were already tracked.
    #[inline]
    #[must_use]
    pub const fn arcs_known(&self) -> u64 {
        self.arcs_found - self.arcs_new
    }

    /// Returns `true` if the ordering invariant between counters holds.
    #[inline]
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.candidates_examined >= self.arcs_found && self.arcs_found >= self.arcs_new
    }
}

/// Cumulative state of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Operating system the scan ran on (`linux`, `macos`, `windows`, ...).
    pub platform: String,
    /// Counters at the time of emission.
    pub counters: ScanCounters,
    /// Informational and error messages, in emission order.
    pub messages: Vec<ScanMessage>,
    /// Newly discovered arc locations, in discovery order.
    pub new_arcs: Vec<Utf8PathBuf>,
}

impl ScanSummary {
    /// Creates an empty summary for the given platform.
    #[must_use]
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            ..Self::default()
        }
    }

    /// Iterates over error messages only.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.is_error())
            .map(ScanMessage::text)
    }

    /// Returns the number of error messages.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_record() {
        let mut counters = ScanCounters::default();
        counters.record_candidate();
        counters.record_candidate();
        counters.record_arc(false);
        counters.record_candidate();
        counters.record_arc(true);

        assert_eq!(counters.candidates_examined, 3);
        assert_eq!(counters.arcs_found, 2);
        assert_eq!(counters.arcs_new, 1);
        assert_eq!(counters.arcs_known(), 1);
        assert!(counters.is_consistent());
    }

    #[test]
    fn test_counters_inconsistent() {
        let counters = ScanCounters {
            candidates_examined: 1,
            arcs_found: 2,
            arcs_new: 0,
        };
        assert!(!counters.is_consistent());
    }

    #[test]
    fn test_event_to_message() {
        let info = ScanEvent::Info {
            message: "starting".to_owned(),
        };
        let error = ScanEvent::Error {
            message: "boom".to_owned(),
        };
        let found = ScanEvent::CandidateFound {
            path: Utf8PathBuf::from("/a/repo"),
            is_new_arc: true,
        };

        assert_eq!(info.to_message(), Some(ScanMessage::Info("starting".to_owned())));
        assert_eq!(error.to_message(), Some(ScanMessage::Error("boom".to_owned())));
        assert_eq!(found.to_message(), None);
    }

    #[test]
    fn test_summary_errors() {
        let mut summary = ScanSummary::new("linux");
        summary.messages.push(ScanMessage::Info("a".to_owned()));
        summary.messages.push(ScanMessage::Error("b".to_owned()));
        summary.messages.push(ScanMessage::Error("c".to_owned()));

        assert_eq!(summary.platform, "linux");
        assert_eq!(summary.errors().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(summary.error_count(), 2);
    }

    #[test]
    fn test_message_serialization() {
        insta::assert_snapshot!(
            serde_json::to_string(&ScanMessage::Info("Found new arc: /a".to_owned())).unwrap(),
            @r#"{"kind":"info","data":"Found new arc: /a"}"#
        );
        insta::assert_snapshot!(
            serde_json::to_string(&ScanMessage::Error("spawn failed".to_owned())).unwrap(),
            @r#"{"kind":"error","data":"spawn failed"}"#
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = ScanEvent::CandidateFound {
            path: Utf8PathBuf::from("/a/repo"),
            is_new_arc: false,
        };
        insta::assert_snapshot!(
            serde_json::to_string(&event).unwrap(),
            @r#"{"kind":"candidate_found","path":"/a/repo","is_new_arc":false}"#
        );
    }
}
