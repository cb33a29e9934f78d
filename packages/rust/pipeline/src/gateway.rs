//! HTTP chat-gateway transport.
//!
//! Reference implementation of the command channel and inbound feed: slash
//! commands go out as JSON POSTs, replies are collected by polling each known
//! channel's message endpoint with a per-channel cursor. Replies never come
//! back on the command call itself; the resolver bot answers asynchronously
//! on the inbound feed.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use profilescout_shared::{
    ChannelsConfig, GatewayConfig, InboundMessage, Result, ScoutError, SubjectId,
};

use crate::dispatch::CommandChannel;

/// User-Agent string for gateway requests.
const USER_AGENT: &str = concat!("ProfileScout/", env!("CARGO_PKG_VERSION"));

/// Slash command issued to the resolver bot.
const LOOKUP_COMMAND: &str = "whois";

/// Buffered inbound messages before the poller blocks.
const FEED_BUFFER: usize = 64;

/// JSON body for a slash-command POST.
#[derive(Serialize)]
struct CommandRequest<'a> {
    bot_id: &'a str,
    name: &'a str,
    args: [&'a str; 1],
}

/// Gateway client: login, command dispatch, and the inbound feed poller.
pub struct HttpGateway {
    client: Client,
    base: Url,
    token: String,
    lookup_channel: String,
    bot_id: String,
    poll_interval: Duration,
}

impl HttpGateway {
    /// Build a gateway client from config. The token comes from the
    /// environment, resolved by the caller.
    pub fn new(gateway: &GatewayConfig, channels: &ChannelsConfig, token: String) -> Result<Self> {
        let mut base = Url::parse(&gateway.url)
            .map_err(|e| ScoutError::config(format!("invalid gateway URL {}: {e}", gateway.url)))?;

        // A trailing slash keeps Url::join from eating the last path segment.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScoutError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            token,
            lookup_channel: channels.lookup_channel.clone(),
            bot_id: channels.bot_id.clone(),
            poll_interval: Duration::from_millis(gateway.poll_interval_ms),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ScoutError::Transport(format!("bad endpoint {path}: {e}")))
    }

    /// Validate the token against the gateway session endpoint.
    ///
    /// A failure here is a configuration failure: the process exits with a
    /// non-zero status rather than running a pipeline that can never hear
    /// replies.
    pub async fn login(&self) -> Result<()> {
        let url = self.endpoint("session")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ScoutError::config(format!("gateway login failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::config(format!(
                "gateway login failed: HTTP {status}"
            )));
        }

        info!("gateway session established");
        Ok(())
    }

    /// Spawn the inbound feed poller over `channels` and hand back the
    /// receiving end. The poller stops when the receiver is dropped; poll
    /// errors are logged and retried on the next tick.
    pub fn spawn_feed(&self, channels: Vec<String>) -> mpsc::Receiver<InboundMessage> {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let client = self.client.clone();
        let base = self.base.clone();
        let token = self.token.clone();
        let interval = self.poll_interval;

        tokio::spawn(async move {
            let mut cursors: HashMap<String, String> = HashMap::new();

            loop {
                for channel in &channels {
                    let cursor = cursors.get(channel).map(String::as_str);
                    match poll_channel(&client, &base, &token, channel, cursor).await {
                        Ok(messages) => {
                            for message in messages {
                                cursors.insert(channel.clone(), message.id.clone());
                                if tx.send(message).await.is_err() {
                                    debug!("feed receiver dropped, stopping poller");
                                    return;
                                }
                            }
                        }
                        Err(e) => warn!(channel, error = %e, "inbound poll failed"),
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });

        rx
    }
}

/// Fetch messages newer than `cursor` from one channel.
async fn poll_channel(
    client: &Client,
    base: &Url,
    token: &str,
    channel: &str,
    cursor: Option<&str>,
) -> Result<Vec<InboundMessage>> {
    let mut url = base
        .join(&format!("channels/{channel}/messages"))
        .map_err(|e| ScoutError::Transport(format!("bad channel endpoint: {e}")))?;

    if let Some(after) = cursor {
        url.query_pairs_mut().append_pair("after", after);
    }

    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| ScoutError::Transport(format!("{channel}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScoutError::Transport(format!("{channel}: HTTP {status}")));
    }

    response
        .json::<Vec<InboundMessage>>()
        .await
        .map_err(|e| ScoutError::parse(format!("{channel}: malformed message feed: {e}")))
}

impl CommandChannel for HttpGateway {
    async fn send_lookup(&self, subject: &SubjectId) -> Result<()> {
        let url = self.endpoint(&format!("channels/{}/commands", self.lookup_channel))?;
        let body = CommandRequest {
            bot_id: &self.bot_id,
            name: LOOKUP_COMMAND,
            args: [subject.as_str()],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Transport(format!("command send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Transport(format!(
                "command rejected: HTTP {status}"
            )));
        }

        debug!(%subject, command = LOOKUP_COMMAND, "lookup command accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gateway_for(server: &wiremock::MockServer) -> HttpGateway {
        let gateway_config = GatewayConfig {
            url: server.uri(),
            token_env: "UNUSED".into(),
            poll_interval_ms: 10,
        };
        let channels = ChannelsConfig {
            lookup_channel: "chan-1".into(),
            bot_id: "bot-9".into(),
        };
        HttpGateway::new(&gateway_config, &channels, "tok".into()).unwrap()
    }

    #[tokio::test]
    async fn login_succeeds_against_session_endpoint() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/session"))
            .and(wiremock::matchers::header("authorization", "Bearer tok"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        gateway_for(&server).login().await.unwrap();
    }

    #[tokio::test]
    async fn login_failure_is_a_config_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/session"))
            .respond_with(wiremock::ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = gateway_for(&server).login().await.unwrap_err();
        assert!(matches!(err, ScoutError::Config { .. }));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn send_lookup_posts_command_body() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/channels/chan-1/commands"))
            .and(wiremock::matchers::body_json(json!({
                "bot_id": "bot-9",
                "name": "whois",
                "args": ["42"],
            })))
            .respond_with(wiremock::ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        gateway_for(&server)
            .send_lookup(&SubjectId::from("42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_command_is_a_transport_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .send_lookup(&SubjectId::from("42"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::Transport(_)));
    }

    #[tokio::test]
    async fn feed_delivers_polled_messages() {
        let server = wiremock::MockServer::start().await;

        let messages = json!([{
            "id": "m1",
            "author_id": "bot-9",
            "channel_id": "chan-1",
            "embeds": [{"fields": [{"name": "Resolved ID", "value": "`77`"}]}],
        }]);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/channels/chan-1/messages"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(messages))
            .mount(&server)
            .await;

        let mut feed = gateway_for(&server).spawn_feed(vec!["chan-1".into()]);
        let message = feed.recv().await.expect("message");

        assert_eq!(message.id, "m1");
        assert_eq!(message.embeds[0].fields[0].value, "`77`");
    }

    #[tokio::test]
    async fn poll_uses_cursor_query() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/channels/chan-1/messages"))
            .and(wiremock::matchers::query_param("after", "m5"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let messages = poll_channel(
            &gateway.client,
            &gateway.base,
            "tok",
            "chan-1",
            Some("m5"),
        )
        .await
        .unwrap();

        assert!(messages.is_empty());
    }
}
