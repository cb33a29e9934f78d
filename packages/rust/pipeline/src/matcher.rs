//! Response matcher.
//!
//! Consumes the inbound message feed and correlates resolver-bot replies back
//! to pending lookups. The command channel carries no request/response
//! linkage, so correlation is positional: the reply claims the oldest pending
//! entry, whatever subject it belongs to. One pending entry is processed per
//! incoming message.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument};

use profilescout_shared::{ChannelsConfig, InboundMessage, ProfileId};
use profilescout_scrape::{ProfileScraper, ProfileSource};

use crate::router::NotificationRouter;
use crate::store::CorrelationStore;
use crate::webhook::Notifier;

/// Case-insensitive marker an embed field label must contain to be treated as
/// the resolved identity.
const RESOLVED_ID_MARKER: &str = "resolved id";

/// Extract the resolved identity from a reply message, if present.
///
/// Looks at the first embed's fields, takes the first label containing the
/// marker, strips backtick formatting and whitespace. An empty value after
/// cleaning counts as absent.
pub fn extract_profile_id(message: &InboundMessage) -> Option<ProfileId> {
    let embed = message.embeds.first()?;

    for field in &embed.fields {
        if field.name.to_lowercase().contains(RESOLVED_ID_MARKER) {
            let cleaned = field.value.replace('`', "").trim().to_string();
            if cleaned.is_empty() {
                return None;
            }
            return Some(ProfileId(cleaned));
        }
    }

    None
}

/// Run the matcher until the inbound feed closes.
pub async fn run_matcher<S: ProfileSource, N: Notifier>(
    mut feed: mpsc::Receiver<InboundMessage>,
    store: Arc<Mutex<CorrelationStore>>,
    scraper: &ProfileScraper<S>,
    router: &NotificationRouter<N>,
    channels: &ChannelsConfig,
) {
    let known_channels = channels.known_channels();

    while let Some(message) = feed.recv().await {
        handle_message(&message, &store, scraper, router, &channels.bot_id, &known_channels)
            .await;
    }

    debug!("inbound feed closed");
}

/// Process one inbound message: filter, extract, correlate, scrape, route.
#[instrument(skip_all, fields(message_id = %message.id, channel = %message.channel_id))]
pub async fn handle_message<S: ProfileSource, N: Notifier>(
    message: &InboundMessage,
    store: &Mutex<CorrelationStore>,
    scraper: &ProfileScraper<S>,
    router: &NotificationRouter<N>,
    bot_id: &str,
    known_channels: &[String],
) {
    if message.author_id != bot_id {
        return;
    }
    if !known_channels.iter().any(|c| c == &message.channel_id) {
        return;
    }

    let Some(profile) = extract_profile_id(message) else {
        return;
    };

    info!(%profile, "resolved identity extracted from reply");

    // Positional correlation: claim the oldest pending entry. The lock is
    // released before the scrape so the dispatch loop is never held up.
    let pending = store.lock().await.oldest();
    let Some(pending) = pending else {
        debug!(%profile, "reply with no pending lookup, ignoring");
        return;
    };

    let snapshot = scraper.scrape(&profile).await;
    router.route(&pending, &snapshot, store).await;
}
