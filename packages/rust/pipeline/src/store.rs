//! In-memory correlation store for pending lookups.
//!
//! Maps dispatched subjects to their pending metadata until a reply is
//! correlated. Entries keep insertion order, so "the first pending entry" is
//! always the oldest dispatch. The store itself is plain single-owner data;
//! the pipeline shares it between the dispatch loop and the response matcher
//! behind a `tokio::sync::Mutex`.

use profilescout_shared::{PendingLookup, SubjectId};
use tracing::debug;

/// Insertion-ordered set of pending lookups, at most one per subject.
#[derive(Debug, Default)]
pub struct CorrelationStore {
    entries: Vec<PendingLookup>,
}

impl CorrelationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending lookup. A subject already present is replaced, so
    /// the store never holds two entries for one subject.
    pub fn register(&mut self, pending: PendingLookup) {
        self.entries.retain(|e| e.subject != pending.subject);
        debug!(subject = %pending.subject, position = pending.position, "registered pending lookup");
        self.entries.push(pending);
    }

    /// The oldest pending entry, if any.
    pub fn oldest(&self) -> Option<PendingLookup> {
        self.entries.first().cloned()
    }

    /// Remove the entry for `subject`. Returns whether an entry was removed.
    pub fn remove(&mut self, subject: &SubjectId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.subject != subject);
        before != self.entries.len()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no lookups are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
