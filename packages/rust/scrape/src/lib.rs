//! Profile page scraping for ProfileScout.
//!
//! Given a resolved profile identity, fetch the profile page and extract a
//! [`ProfileSnapshot`]. The scrape never fails outright: any fetch or
//! extraction problem degrades the affected fields to their defaults so the
//! pipeline always has a usable result.

pub mod extract;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use profilescout_shared::{ProfileId, ProfileSnapshot, Result, ScoutError, ScrapeConfig};

use crate::extract::{ProfileExtractor, SelectorExtractor};

/// User-Agent string for profile page requests.
const USER_AGENT: &str = concat!("ProfileScout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// ProfileSource
// ---------------------------------------------------------------------------

/// Page-fetching seam for the scraper.
///
/// The production impl is [`HttpProfileSource`]; tests substitute a fake or
/// point the HTTP impl at a mock server. The source owns the underlying
/// session, released once via [`ProfileSource::close`] at shutdown.
#[allow(async_fn_in_trait)]
pub trait ProfileSource {
    /// Fetch the page body at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Release the underlying session. Idempotent.
    async fn close(&self);
}

/// HTTP page source over a shared `reqwest` client.
pub struct HttpProfileSource {
    client: Client,
}

impl HttpProfileSource {
    /// Build the HTTP source with sane timeouts and redirect limits.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScoutError::Scrape(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl ProfileSource for HttpProfileSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScoutError::Scrape(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Scrape(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ScoutError::Scrape(format!("{url}: body read failed: {e}")))
    }

    async fn close(&self) {
        // reqwest sessions close on drop; the explicit call marks the
        // shutdown point in the logs.
        info!("scrape session released");
    }
}

// ---------------------------------------------------------------------------
// ProfileScraper
// ---------------------------------------------------------------------------

/// Scrapes one profile page per correlated subject.
pub struct ProfileScraper<S> {
    source: S,
    base_url: String,
    settle: Duration,
}

impl<S: ProfileSource> ProfileScraper<S> {
    /// Create a scraper over `source` for the configured profile site.
    pub fn new(source: S, config: &ScrapeConfig) -> Self {
        Self {
            source,
            base_url: config.profile_base_url.trim_end_matches('/').to_string(),
            settle: Duration::from_millis(config.settle_ms),
        }
    }

    /// Canonical profile page URL for an identity.
    pub fn profile_url(&self, profile: &ProfileId) -> String {
        format!("{}/player/{}", self.base_url, profile)
    }

    /// Scrape the profile page for `profile`. Never fails: fetch errors yield
    /// the empty snapshot, and each field extraction degrades independently.
    ///
    /// Restricted profiles skip value extraction entirely; the listing count
    /// is read unconditionally because the page renders it either way.
    pub async fn scrape(&self, profile: &ProfileId) -> ProfileSnapshot {
        let url = self.profile_url(profile);
        debug!(%url, "navigating to profile page");

        let body = match self.source.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "profile page fetch failed");
                return ProfileSnapshot::empty(url);
            }
        };

        // Settle delay for dynamic content to finish rendering.
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let page = SelectorExtractor::parse(&body);

        let listing_count = page.listing_count().unwrap_or(0);
        let is_private = page.is_private();
        let value = if is_private {
            0
        } else {
            page.value().unwrap_or(0)
        };
        let avatar_url = page.avatar_url().unwrap_or_default();

        info!(
            %profile,
            value,
            listing_count,
            is_private,
            "scraped profile page"
        );

        ProfileSnapshot {
            value,
            listing_count,
            avatar_url,
            profile_url: url,
            is_private,
        }
    }

    /// Release the underlying page source.
    pub async fn close(&self) {
        self.source.close().await;
    }
}
