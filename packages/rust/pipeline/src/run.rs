//! End-to-end pipeline orchestration.
//!
//! Wires the gateway, scraper, router, and correlation store together and
//! drives the dispatch loop and response matcher concurrently on one task.
//! Both share the store behind a mutex; there is no parallel mutation, only
//! interleaving at suspension points.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use profilescout_scrape::{HttpProfileSource, ProfileScraper};
use profilescout_shared::{AppConfig, Result, SubjectId};

use crate::dispatch::{self, DispatchObserver};
use crate::gateway::HttpGateway;
use crate::matcher;
use crate::router::NotificationRouter;
use crate::store::CorrelationStore;
use crate::webhook::WebhookClient;

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The subject list was exhausted.
    Completed,
    /// An interrupt signal requested shutdown early.
    Interrupted,
}

/// Run the whole pipeline to completion or interrupt.
///
/// Fatal setup failures (bad gateway URL, login rejection) surface as errors;
/// everything after login degrades per subject instead of aborting the run.
/// On either exit path the scrape session is released before returning, and
/// in-flight scrape or webhook calls are abandoned, not awaited.
pub async fn run_pipeline(
    config: &AppConfig,
    token: String,
    subjects: Vec<SubjectId>,
    observer: &dyn DispatchObserver,
) -> Result<RunOutcome> {
    run_pipeline_until(config, token, subjects, observer, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Like [`run_pipeline`], but with an explicit shutdown trigger in place of
/// the process interrupt signal.
#[instrument(skip_all, fields(subjects = subjects.len()))]
pub async fn run_pipeline_until(
    config: &AppConfig,
    token: String,
    subjects: Vec<SubjectId>,
    observer: &dyn DispatchObserver,
    shutdown: impl Future<Output = ()>,
) -> Result<RunOutcome> {
    let gateway = HttpGateway::new(&config.gateway, &config.channels, token)?;
    gateway.login().await?;

    let scraper = ProfileScraper::new(HttpProfileSource::new()?, &config.scrape);
    let router = NotificationRouter::new(
        WebhookClient::new()?,
        config.webhooks.clone(),
        &config.routing,
        subjects.len(),
    );
    let store = Arc::new(Mutex::new(CorrelationStore::new()));
    let feed = gateway.spawn_feed(config.channels.known_channels());

    info!(
        total = subjects.len(),
        lookup_channel = %config.channels.lookup_channel,
        "pipeline ready"
    );

    tokio::time::sleep(Duration::from_millis(config.pacing.startup_ms)).await;

    let outcome = tokio::select! {
        _ = dispatch::run_dispatch(&subjects, &store, &gateway, &config.pacing, observer) => {
            info!("subject list exhausted, shutting down");
            RunOutcome::Completed
        }
        _ = matcher::run_matcher(feed, store.clone(), &scraper, &router, &config.channels) => {
            warn!("inbound feed closed before dispatch finished");
            RunOutcome::Completed
        }
        _ = shutdown => {
            info!("interrupt received, shutting down");
            RunOutcome::Interrupted
        }
    };

    // Release the scrape session before exit, whatever the exit path.
    scraper.close().await;

    let pending = store.lock().await.len();
    if pending > 0 {
        info!(pending, "run ended with lookups still pending");
    }

    Ok(outcome)
}
