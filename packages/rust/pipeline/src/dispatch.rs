//! Sequential dispatch loop.
//!
//! Feeds the subject list into the command channel one entry at a time:
//! register a pending lookup, issue the slash command, hold for the fixed
//! inter-request delay, advance. Dispatch pacing is decoupled from
//! correlation completion; the loop never waits for a reply and never
//! dispatches two commands concurrently.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use profilescout_shared::{PacingConfig, PendingLookup, Result, SubjectId};

use crate::store::CorrelationStore;

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Command-channel seam: issue the resolution command for one subject.
///
/// Replies never come back through this call; they arrive asynchronously on
/// the inbound feed and are handled by the response matcher.
#[allow(async_fn_in_trait)]
pub trait CommandChannel {
    /// Send the lookup command with `subject` as its sole argument.
    async fn send_lookup(&self, subject: &SubjectId) -> Result<()>;
}

/// Progress callback for batch dispatch (the CLI hooks a progress bar here).
pub trait DispatchObserver: Send + Sync {
    /// Called after a command is issued for a subject.
    fn dispatched(&self, subject: &SubjectId, position: usize, total: usize);
    /// Called when a subject is skipped after a transport failure.
    fn skipped(&self, subject: &SubjectId, position: usize, total: usize);
    /// Called once the whole list has been dispatched.
    fn done(&self, total: usize);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl DispatchObserver for SilentObserver {
    fn dispatched(&self, _subject: &SubjectId, _position: usize, _total: usize) {}
    fn skipped(&self, _subject: &SubjectId, _position: usize, _total: usize) {}
    fn done(&self, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// Drive the full subject list through the command channel.
///
/// Each subject gets exactly one attempt: a transport failure is logged and
/// the loop advances after the (shorter) failure delay. The pending entry
/// registered for a failed dispatch stays in the store; no reply will ever
/// claim it, and the run ends before that matters.
#[instrument(skip_all, fields(total = subjects.len()))]
pub async fn run_dispatch<C: CommandChannel>(
    subjects: &[SubjectId],
    store: &Arc<Mutex<CorrelationStore>>,
    channel: &C,
    pacing: &PacingConfig,
    observer: &dyn DispatchObserver,
) {
    let total = subjects.len();

    for (position, subject) in subjects.iter().enumerate() {
        info!(%subject, position = position + 1, total, "processing subject");

        store.lock().await.register(PendingLookup {
            subject: subject.clone(),
            dispatched_at: Utc::now(),
            position,
        });

        match channel.send_lookup(subject).await {
            Ok(()) => {
                info!(%subject, "lookup command sent");
                observer.dispatched(subject, position, total);
                tokio::time::sleep(Duration::from_millis(pacing.inter_request_ms)).await;
            }
            Err(e) => {
                warn!(%subject, error = %e, "lookup dispatch failed, skipping subject");
                observer.skipped(subject, position, total);
                tokio::time::sleep(Duration::from_millis(pacing.failure_advance_ms)).await;
            }
        }
    }

    info!(total, "all subjects dispatched");
    observer.done(total);
}
