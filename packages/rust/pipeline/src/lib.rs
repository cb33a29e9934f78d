//! The ProfileScout correlation-and-dispatch pipeline.
//!
//! Feeds a batch of subjects into the chat command channel one at a time,
//! correlates asynchronous resolver replies back to pending lookups, scrapes
//! the resolved profile page, and routes the result to a notification sink
//! (or drops it). The dispatch loop and response matcher run concurrently on
//! one task and coordinate solely through the [`CorrelationStore`].

pub mod dispatch;
pub mod gateway;
pub mod matcher;
pub mod router;
pub mod run;
pub mod store;
pub mod webhook;

pub use dispatch::{CommandChannel, DispatchObserver, SilentObserver, run_dispatch};
pub use gateway::HttpGateway;
pub use matcher::{extract_profile_id, handle_message, run_matcher};
pub use router::{NotificationRouter, RouteDecision, format_grouped};
pub use run::{RunOutcome, run_pipeline, run_pipeline_until};
pub use store::CorrelationStore;
pub use webhook::{Notifier, WebhookClient};
