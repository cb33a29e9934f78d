//! Shared types, error model, and configuration for ProfileScout.
//!
//! This crate is the foundation depended on by the scrape, pipeline, and CLI
//! crates. It provides:
//! - [`ScoutError`] — the unified error type
//! - Domain types ([`SubjectId`], [`PendingLookup`], [`ProfileSnapshot`], ...)
//! - Configuration ([`AppConfig`], config loading) and subject-list loading

pub mod config;
pub mod error;
pub mod subjects;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BUILTIN_REPLY_CHANNEL, ChannelsConfig, GatewayConfig, PacingConfig, RoutingConfig,
    ScrapeConfig, SubjectsConfig, WebhookConfig, config_dir, config_file_path, gateway_token,
    init_config, load_config, load_config_from,
};
pub use error::{Result, ScoutError};
pub use subjects::{load_subjects, load_subjects_from_file};
pub use types::{
    Embed, EmbedField, InboundMessage, PendingLookup, ProfileId, ProfileSnapshot, SubjectId,
    Thumbnail, WebhookEmbed, WebhookPayload,
};
