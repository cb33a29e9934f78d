//! Core domain types for the ProfileScout pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SubjectId
// ---------------------------------------------------------------------------

/// An opaque identifier for a resolution subject.
///
/// Consumed exactly once by the dispatch loop; retained as the key of a
/// [`PendingLookup`] until the reply is correlated or the run ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// ProfileId
// ---------------------------------------------------------------------------

/// The external identity extracted from a reply message.
///
/// Transient: never stored, handed straight to the scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileId(pub String);

impl ProfileId {
    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PendingLookup
// ---------------------------------------------------------------------------

/// A dispatched lookup awaiting its asynchronous reply.
#[derive(Debug, Clone)]
pub struct PendingLookup {
    /// The subject the command was issued for.
    pub subject: SubjectId,
    /// When the command was sent.
    pub dispatched_at: DateTime<Utc>,
    /// Zero-based position in the batch (for progress reporting).
    pub position: usize,
}

// ---------------------------------------------------------------------------
// ProfileSnapshot
// ---------------------------------------------------------------------------

/// Structured result of scraping one profile page.
///
/// Produced once per correlated subject; every field degrades to its default
/// independently, so a partial page still yields a usable snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    /// Appraised value. Always 0 when the inventory is private.
    pub value: u64,
    /// Listing count. Present even on restricted profiles.
    pub listing_count: u64,
    /// Avatar image URL, empty if not found.
    pub avatar_url: String,
    /// Canonical profile page URL this snapshot came from.
    pub profile_url: String,
    /// Whether the profile's inventory is restricted.
    pub is_private: bool,
}

impl ProfileSnapshot {
    /// The all-defaults snapshot for a profile URL, used when the page
    /// cannot be fetched at all.
    pub fn empty(profile_url: impl Into<String>) -> Self {
        Self {
            value: 0,
            listing_count: 0,
            avatar_url: String::new(),
            profile_url: profile_url.into(),
            is_private: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound messages
// ---------------------------------------------------------------------------

/// A named field inside a message embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field value, possibly wrapped in formatting markers.
    pub value: String,
}

/// A structured embed attached to an inbound message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embed {
    /// Named fields, in display order.
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

/// One message from the inbound feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Message identifier, used as the feed cursor.
    pub id: String,
    /// Author identifier.
    pub author_id: String,
    /// Channel the message arrived on.
    pub channel_id: String,
    /// Structured embeds, possibly empty.
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

// ---------------------------------------------------------------------------
// Webhook payloads
// ---------------------------------------------------------------------------

/// Thumbnail reference inside a webhook embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Image URL.
    pub url: String,
}

/// One embed in an outgoing webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEmbed {
    /// Embed title.
    pub title: String,
    /// Embed body text.
    pub description: String,
    /// RGB color as a packed integer.
    pub color: u32,
    /// Optional thumbnail image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

/// The payload delivered to exactly one notification sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Free-text content line.
    pub content: String,
    /// Embeds, in display order.
    pub embeds: Vec<WebhookEmbed>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_defaults() {
        let snap = ProfileSnapshot::empty("https://example.com/player/42");
        assert_eq!(snap.value, 0);
        assert_eq!(snap.listing_count, 0);
        assert!(snap.avatar_url.is_empty());
        assert!(!snap.is_private);
    }

    #[test]
    fn inbound_message_deserializes_without_embeds() {
        let json = r#"{"id":"9","author_id":"bot","channel_id":"c1"}"#;
        let msg: InboundMessage = serde_json::from_str(json).expect("parse");
        assert!(msg.embeds.is_empty());
    }

    #[test]
    fn webhook_embed_omits_missing_thumbnail() {
        let embed = WebhookEmbed {
            title: "Hit found".into(),
            description: "desc".into(),
            color: 0x00ff00,
            thumbnail: None,
        };
        let json = serde_json::to_string(&embed).expect("serialize");
        assert!(!json.contains("thumbnail"));
    }
}
