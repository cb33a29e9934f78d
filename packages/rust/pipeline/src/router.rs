//! Notification routing.
//!
//! Applies the decision table to a correlated snapshot: private inventories
//! go to the private sink, values at or above the threshold go to the
//! standard sink, everything else is dropped. Every branch removes the
//! pending entry; a sink delivery failure is logged but never rolls the
//! cleanup back.

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use profilescout_shared::{
    PendingLookup, ProfileSnapshot, RoutingConfig, Thumbnail, WebhookConfig, WebhookEmbed,
    WebhookPayload,
};

use crate::store::CorrelationStore;
use crate::webhook::Notifier;

/// Embed color for hit notifications.
const HIT_COLOR: u32 = 0x00ff00;

/// Which branch of the decision table a snapshot took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Private inventory, sent to the private sink.
    Private,
    /// Value at or above the threshold, sent to the standard sink.
    HighValue,
    /// Below threshold and not private; no notification.
    Dropped,
}

/// Routes correlated snapshots to their notification sink.
pub struct NotificationRouter<N> {
    notifier: N,
    webhooks: WebhookConfig,
    value_threshold: u64,
    total_subjects: usize,
}

impl<N: Notifier> NotificationRouter<N> {
    /// Create a router over `notifier` for a batch of `total_subjects`.
    pub fn new(
        notifier: N,
        webhooks: WebhookConfig,
        routing: &RoutingConfig,
        total_subjects: usize,
    ) -> Self {
        Self {
            notifier,
            webhooks,
            value_threshold: routing.value_threshold,
            total_subjects,
        }
    }

    /// Route one correlated snapshot and clear its pending entry.
    ///
    /// The entry is removed before delivery is attempted, so the same subject
    /// can never produce a second notification.
    pub async fn route(
        &self,
        pending: &PendingLookup,
        snapshot: &ProfileSnapshot,
        store: &Mutex<CorrelationStore>,
    ) -> RouteDecision {
        store.lock().await.remove(&pending.subject);

        let decision = if snapshot.is_private {
            RouteDecision::Private
        } else if snapshot.value >= self.value_threshold {
            RouteDecision::HighValue
        } else {
            RouteDecision::Dropped
        };

        let (sink_url, value_line) = match decision {
            RouteDecision::Private => (
                self.webhooks.private_inventory_url.as_str(),
                "Private Inventory".to_string(),
            ),
            RouteDecision::HighValue => (
                self.webhooks.standard_url.as_str(),
                format_grouped(snapshot.value),
            ),
            RouteDecision::Dropped => {
                debug!(
                    subject = %pending.subject,
                    value = snapshot.value,
                    "below threshold and not private, dropping"
                );
                return decision;
            }
        };

        let payload = self.build_payload(pending, snapshot, &value_line);

        match self.notifier.deliver(sink_url, &payload).await {
            Ok(()) => {
                info!(subject = %pending.subject, ?decision, "notification sent");
            }
            Err(e) => {
                // No redelivery: the entry is already cleared.
                error!(subject = %pending.subject, ?decision, error = %e, "notification delivery failed");
            }
        }

        decision
    }

    fn build_payload(
        &self,
        pending: &PendingLookup,
        snapshot: &ProfileSnapshot,
        value_line: &str,
    ) -> WebhookPayload {
        let thumbnail = (!snapshot.avatar_url.is_empty()).then(|| Thumbnail {
            url: snapshot.avatar_url.clone(),
        });

        WebhookPayload {
            content: "@everyone".into(),
            embeds: vec![
                WebhookEmbed {
                    title: "Hit found".into(),
                    description: format!(
                        "**Subject:** {}\n**Processing:** {}/{}",
                        pending.subject,
                        pending.position + 1,
                        self.total_subjects
                    ),
                    color: HIT_COLOR,
                    thumbnail: None,
                },
                WebhookEmbed {
                    title: "Profile Info".into(),
                    description: format!(
                        "**Value:** {}\n**Listings:** {}\n[Profile]({})",
                        value_line, snapshot.listing_count, snapshot.profile_url
                    ),
                    color: HIT_COLOR,
                    thumbnail,
                },
            ],
        }
    }
}

/// Format an integer with thousands separators (`1234567` → `1,234,567`).
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use profilescout_shared::{Result, ScoutError, SubjectId};
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    /// Records deliveries; optionally fails every delivery.
    struct RecordingNotifier {
        delivered: StdMutex<Vec<(String, WebhookPayload)>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                delivered: StdMutex::new(Vec::new()),
                fail,
            }
        }

        fn deliveries(&self) -> Vec<(String, WebhookPayload)> {
            self.delivered.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn deliver(&self, sink_url: &str, payload: &WebhookPayload) -> Result<()> {
            if self.fail {
                return Err(ScoutError::Notify("sink unavailable".into()));
            }
            self.delivered
                .lock()
                .unwrap()
                .push((sink_url.to_string(), payload.clone()));
            Ok(())
        }
    }

    fn webhooks() -> WebhookConfig {
        WebhookConfig {
            standard_url: "https://hooks.example.com/standard".into(),
            private_inventory_url: "https://hooks.example.com/private".into(),
        }
    }

    fn router(notifier: RecordingNotifier) -> NotificationRouter<RecordingNotifier> {
        NotificationRouter::new(notifier, webhooks(), &RoutingConfig::default(), 10)
    }

    fn pending(subject: &str, position: usize) -> PendingLookup {
        PendingLookup {
            subject: SubjectId::from(subject),
            dispatched_at: Utc::now(),
            position,
        }
    }

    fn snapshot(value: u64, is_private: bool) -> ProfileSnapshot {
        ProfileSnapshot {
            value,
            listing_count: 12,
            avatar_url: "https://cdn.example.com/a.png".into(),
            profile_url: "https://profiles.example.com/player/42".into(),
            is_private,
        }
    }

    async fn store_with(pending: &PendingLookup) -> Arc<Mutex<CorrelationStore>> {
        let store = Arc::new(Mutex::new(CorrelationStore::new()));
        store.lock().await.register(pending.clone());
        store
    }

    #[tokio::test]
    async fn private_goes_to_private_sink() {
        let router = router(RecordingNotifier::new(false));
        let p = pending("42", 2);
        let store = store_with(&p).await;

        let decision = router.route(&p, &snapshot(0, true), &store).await;

        assert_eq!(decision, RouteDecision::Private);
        let deliveries = router.notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "https://hooks.example.com/private");
        assert!(deliveries[0].1.embeds[1].description.contains("Private Inventory"));
        assert!(deliveries[0].1.embeds[0].description.contains("3/10"));
        assert!(store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let router = router(RecordingNotifier::new(false));

        let p = pending("a", 0);
        let store = store_with(&p).await;
        let decision = router.route(&p, &snapshot(99_999, false), &store).await;
        assert_eq!(decision, RouteDecision::Dropped);
        assert!(router.notifier.deliveries().is_empty());
        assert!(store.lock().await.is_empty());

        let p = pending("b", 1);
        let store = store_with(&p).await;
        let decision = router.route(&p, &snapshot(100_000, false), &store).await;
        assert_eq!(decision, RouteDecision::HighValue);
        let deliveries = router.notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "https://hooks.example.com/standard");
        assert!(deliveries[0].1.embeds[1].description.contains("100,000"));
    }

    #[tokio::test]
    async fn delivery_failure_still_clears_entry() {
        let router = router(RecordingNotifier::new(true));
        let p = pending("42", 0);
        let store = store_with(&p).await;

        let decision = router.route(&p, &snapshot(500_000, false), &store).await;

        assert_eq!(decision, RouteDecision::HighValue);
        assert!(store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn missing_avatar_omits_thumbnail() {
        let router = router(RecordingNotifier::new(false));
        let p = pending("42", 0);
        let store = store_with(&p).await;

        let mut snap = snapshot(200_000, false);
        snap.avatar_url.clear();
        router.route(&p, &snap, &store).await;

        let deliveries = router.notifier.deliveries();
        assert!(deliveries[0].1.embeds[1].thumbnail.is_none());
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1_000), "1,000");
        assert_eq!(format_grouped(1_234_567), "1,234,567");
    }
}
