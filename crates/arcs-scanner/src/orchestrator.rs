//! Scan orchestration.
//!
//! [`ScanRun`] turns raw source events into scan progress. Each `.git`
//! candidate is counted, its parent directory is resolved and classified,
//! and confirmed arcs are checked against the registry.
//!
//! [`ScanRun::drive`] resolves candidates on tokio's blocking pool, since
//! doing so stats and canonicalizes paths.
//!
//! # State Machine
//!
//! ```text
//! Idle ──► Scanning ──► Finished
//! ```
//!
//! A run is single-use. Dropping its update stream while `Scanning` drops
//! the candidate stream too, which kills the search process.

use std::sync::Arc;

use arcs_core::{ArcClassifier, ScanEvent, ScanMessage, ScanSummary};
use arcs_registry::SharedRegistry;
use camino::{Utf8Path, Utf8PathBuf};
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::source::{CandidateStream, SourceEvent};

/// Update emitted while scanning.
///
/// Every update carries the cumulative summary, so a consumer that only
/// renders the most recent one never misses state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanUpdate {
    /// An event together with the summary after applying it.
    Progress {
        /// The event that changed the summary.
        event: ScanEvent,
        /// Cumulative state after the event.
        summary: ScanSummary,
    },

    /// The candidate stream ended. Always the last update of a scan.
    Finished(ScanSummary),
}

impl ScanUpdate {
    /// Returns the summary carried by this update.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        match self {
            Self::Progress { summary, .. } | Self::Finished(summary) => summary,
        }
    }

    /// Returns `true` for [`ScanUpdate::Finished`].
    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Lifecycle of a [`ScanRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanState {
    /// Created, no candidates consumed yet.
    #[default]
    Idle,
    /// Consuming candidates.
    Scanning,
    /// The terminal summary has been produced.
    Finished,
}

/// One scan invocation.
///
/// The run reads the registry to decide whether an arc is new but never
/// mutates it. Adding discovered arcs is the caller's decision.
#[derive(Debug)]
pub struct ScanRun {
    state: ScanState,
    summary: ScanSummary,
    classifier: Arc<ArcClassifier>,
    registry: SharedRegistry,
}

impl ScanRun {
    /// Creates an idle run.
    #[must_use]
    pub fn new(
        platform: impl Into<String>,
        classifier: ArcClassifier,
        registry: SharedRegistry,
    ) -> Self {
        Self {
            state: ScanState::Idle,
            summary: ScanSummary::new(platform),
            classifier: Arc::new(classifier),
            registry,
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Returns the cumulative summary so far.
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Applies one source event.
    ///
    /// Returns the event to report, or `None` for candidates that are not
    /// arcs. Moves an idle run to [`ScanState::Scanning`].
    pub fn handle(&mut self, event: SourceEvent) -> Option<ScanEvent> {
        self.start();

        match event {
            SourceEvent::Info(message) => {
                debug!(message = %message, "Scan info");
                self.summary.messages.push(ScanMessage::Info(message.clone()));
                Some(ScanEvent::Info { message })
            }
            SourceEvent::Error(message) => {
                self.summary.messages.push(ScanMessage::Error(message.clone()));
                Some(ScanEvent::Error { message })
            }
            SourceEvent::Path(candidate) => {
                let arc = resolve_arc(&self.classifier, &candidate);
                self.record_candidate(arc)
            }
        }
    }

    /// Ends the run and returns the terminal summary.
    pub fn finish(&mut self) -> ScanSummary {
        self.state = ScanState::Finished;
        let counters = &self.summary.counters;
        info!(
            candidates = counters.candidates_examined,
            arcs_found = counters.arcs_found,
            arcs_new = counters.arcs_new,
            errors = self.summary.error_count(),
            "Scan finished"
        );
        self.summary.clone()
    }

    /// Consumes `candidates`, yielding one update per reported event and a
    /// final [`ScanUpdate::Finished`].
    pub fn drive(self, candidates: CandidateStream) -> BoxStream<'static, ScanUpdate> {
        stream::unfold(Some((self, candidates)), |state| async move {
            let (mut run, mut candidates) = state?;

            while let Some(event) = candidates.next().await {
                let reported = match event {
                    SourceEvent::Path(candidate) => {
                        run.start();
                        let arc = classify_candidate(Arc::clone(&run.classifier), candidate).await;
                        run.record_candidate(arc)
                    }
                    event => run.handle(event),
                };
                if let Some(event) = reported {
                    let summary = run.summary.clone();
                    return Some((ScanUpdate::Progress { event, summary }, Some((run, candidates))));
                }
            }

            let summary = run.finish();
            Some((ScanUpdate::Finished(summary), None))
        })
        .boxed()
    }

    fn start(&mut self) {
        if self.state == ScanState::Idle {
            self.state = ScanState::Scanning;
        }
    }

    /// Counts one examined candidate whose resolved arc, if any, is `arc`.
    fn record_candidate(&mut self, arc: Option<Utf8PathBuf>) -> Option<ScanEvent> {
        self.summary.counters.record_candidate();

        let arc = arc?;
        let is_new_arc = !self.registry.read().contains_arc(&arc);
        self.summary.counters.record_arc(is_new_arc);

        if is_new_arc {
            info!(arc = %arc, "Found new arc");
            self.summary
                .messages
                .push(ScanMessage::Info(format!("Found new arc: {arc}")));
            self.summary.new_arcs.push(arc.clone());
        } else {
            debug!(arc = %arc, "Found tracked arc");
        }

        Some(ScanEvent::CandidateFound {
            path: arc,
            is_new_arc,
        })
    }
}

/// The canonical parent of `candidate`, if it is an arc.
///
/// Gitlink files named `.git` and parents that cannot be resolved are not
/// arcs. Blocks on filesystem calls.
fn resolve_arc(classifier: &ArcClassifier, candidate: &Utf8Path) -> Option<Utf8PathBuf> {
    if !candidate.is_dir() {
        debug!(candidate = %candidate, "Candidate is not a directory");
        return None;
    }

    let parent = match candidate.join("..").canonicalize_utf8() {
        Ok(parent) => parent,
        Err(e) => {
            debug!(candidate = %candidate, error = %e, "Cannot resolve candidate parent");
            return None;
        }
    };

    classifier.is_arc(&parent).then_some(parent)
}

/// [`resolve_arc`] on the blocking pool.
async fn classify_candidate(
    classifier: Arc<ArcClassifier>,
    candidate: Utf8PathBuf,
) -> Option<Utf8PathBuf> {
    let task = tokio::task::spawn_blocking(move || resolve_arc(&classifier, &candidate));
    match task.await {
        Ok(arc) => arc,
        Err(e) => {
            warn!(error = %e, "Candidate classification did not complete");
            None
        }
    }
}

impl Drop for ScanRun {
    fn drop(&mut self) {
        if self.state == ScanState::Scanning {
            debug!(
                candidates = self.summary.counters.candidates_examined,
                "Scan abandoned before completion"
            );
        }
    }
}
