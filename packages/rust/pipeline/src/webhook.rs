//! Webhook sink delivery.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use profilescout_shared::{Result, ScoutError, WebhookPayload};

/// User-Agent string for webhook requests.
const USER_AGENT: &str = concat!("ProfileScout/", env!("CARGO_PKG_VERSION"));

/// Notification delivery seam. The router only needs "post this payload to
/// that sink"; tests record instead of sending.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Deliver `payload` to the sink at `sink_url`.
    async fn deliver(&self, sink_url: &str, payload: &WebhookPayload) -> Result<()>;
}

/// HTTP notifier posting JSON payloads to webhook endpoints.
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    /// Build the webhook HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ScoutError::Notify(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Notifier for WebhookClient {
    async fn deliver(&self, sink_url: &str, payload: &WebhookPayload) -> Result<()> {
        let response = self
            .client
            .post(sink_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ScoutError::Notify(format!("{sink_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Notify(format!("{sink_url}: HTTP {status}")));
        }

        debug!(sink = sink_url, "webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profilescout_shared::{Thumbnail, WebhookEmbed};

    fn sample_payload() -> WebhookPayload {
        WebhookPayload {
            content: "@everyone".into(),
            embeds: vec![WebhookEmbed {
                title: "Hit found".into(),
                description: "**Subject:** 42".into(),
                color: 0x00ff00,
                thumbnail: Some(Thumbnail {
                    url: "https://cdn.example.com/a.png".into(),
                }),
            }],
        }
    }

    #[tokio::test]
    async fn posts_json_payload() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/hooks/standard"))
            .and(wiremock::matchers::body_json(sample_payload()))
            .respond_with(wiremock::ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebhookClient::new().unwrap();
        let url = format!("{}/hooks/standard", server.uri());
        client.deliver(&url, &sample_payload()).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = WebhookClient::new().unwrap();
        let err = client
            .deliver(&server.uri(), &sample_payload())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
