//! Selector-based field extraction from a parsed profile page.
//!
//! The profile site renders stats into a handful of well-known elements.
//! [`ProfileExtractor`] isolates page-structure churn from pipeline logic:
//! one method per field, each independently fallible, so a redesign of one
//! widget never takes down extraction of the others.

use scraper::{Html, Selector};

/// Primary selector for the listing-count stat.
const LISTING_COUNT_SELECTOR: &str = "div.my-auto.text-center.trade-ads-created-container span.card-title.mb-1.text-light.stat-data.text-nowrap";

/// Fallback when the stat container class set changes.
const LISTING_COUNT_ALT_SELECTOR: &str = "span.card-title.mb-1.text-light.stat-data.text-nowrap";

/// Banner shown in place of the inventory on restricted profiles.
const PRIVATE_MARKER_SELECTOR: &str = "div.alert.alert-secondary.text-center.mt-3.rounded-0";

/// Text the restricted banner must contain to count as a private marker.
const PRIVATE_MARKER_TEXT: &str = "inventory is private";

/// Appraised-value element, only rendered on public profiles.
const VALUE_SELECTOR: &str = "#player_value";

/// Avatar snapshot image.
const AVATAR_SELECTOR: &str = "img.mx-auto.d-block.w-100.h-100";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Per-field access to a profile page. Every getter is best-effort.
pub trait ProfileExtractor {
    /// The listing count, present even on restricted profiles.
    fn listing_count(&self) -> Option<u64>;

    /// Whether the restricted-inventory marker is present.
    fn is_private(&self) -> bool;

    /// The appraised value. Absent on restricted profiles.
    fn value(&self) -> Option<u64>;

    /// The avatar image URL.
    fn avatar_url(&self) -> Option<String>;
}

// ---------------------------------------------------------------------------
// SelectorExtractor
// ---------------------------------------------------------------------------

/// [`ProfileExtractor`] over a parsed HTML document using CSS selectors.
pub struct SelectorExtractor {
    doc: Html,
}

impl SelectorExtractor {
    /// Parse a fetched page body.
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    /// Inner text of the first element matching `selector`, if any.
    fn first_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.doc
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}

impl ProfileExtractor for SelectorExtractor {
    fn listing_count(&self) -> Option<u64> {
        self.first_text(LISTING_COUNT_SELECTOR)
            .or_else(|| self.first_text(LISTING_COUNT_ALT_SELECTOR))
            .and_then(|text| parse_grouped_number(&text))
    }

    fn is_private(&self) -> bool {
        self.first_text(PRIVATE_MARKER_SELECTOR)
            .is_some_and(|text| text.contains(PRIVATE_MARKER_TEXT))
    }

    fn value(&self) -> Option<u64> {
        self.first_text(VALUE_SELECTOR)
            .and_then(|text| parse_grouped_number(&text))
    }

    fn avatar_url(&self) -> Option<String> {
        let sel = Selector::parse(AVATAR_SELECTOR).ok()?;
        self.doc
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(str::to_string)
    }
}

/// Parse an integer rendered with thousands separators (e.g. `1,234,567`).
pub fn parse_grouped_number(text: &str) -> Option<u64> {
    let stripped: String = text.chars().filter(|c| *c != ',').collect();
    stripped.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_PAGE: &str = r#"<html><body>
        <img class="mx-auto d-block w-100 h-100" src="https://cdn.example.com/avatar/42.png">
        <div class="my-auto text-center trade-ads-created-container">
            <span class="card-title mb-1 text-light stat-data text-nowrap">1,204</span>
        </div>
        <span id="player_value">2,500,000</span>
    </body></html>"#;

    const PRIVATE_PAGE: &str = r#"<html><body>
        <span class="card-title mb-1 text-light stat-data text-nowrap">17</span>
        <div class="alert alert-secondary text-center mt-3 rounded-0">
            This player's inventory is private
        </div>
    </body></html>"#;

    #[test]
    fn extracts_all_public_fields() {
        let page = SelectorExtractor::parse(PUBLIC_PAGE);
        assert_eq!(page.listing_count(), Some(1204));
        assert_eq!(page.value(), Some(2_500_000));
        assert_eq!(
            page.avatar_url().as_deref(),
            Some("https://cdn.example.com/avatar/42.png")
        );
        assert!(!page.is_private());
    }

    #[test]
    fn listing_count_falls_back_to_alternate_selector() {
        // No stat container div, only the bare span
        let page = SelectorExtractor::parse(PRIVATE_PAGE);
        assert_eq!(page.listing_count(), Some(17));
    }

    #[test]
    fn detects_private_marker() {
        let page = SelectorExtractor::parse(PRIVATE_PAGE);
        assert!(page.is_private());
        assert_eq!(page.value(), None);
    }

    #[test]
    fn unrelated_alert_is_not_private() {
        let html = r#"<div class="alert alert-secondary text-center mt-3 rounded-0">
            Scheduled maintenance tonight
        </div>"#;
        let page = SelectorExtractor::parse(html);
        assert!(!page.is_private());
    }

    #[test]
    fn missing_fields_yield_none() {
        let page = SelectorExtractor::parse("<html><body><p>nothing here</p></body></html>");
        assert_eq!(page.listing_count(), None);
        assert_eq!(page.value(), None);
        assert_eq!(page.avatar_url(), None);
        assert!(!page.is_private());
    }

    #[test]
    fn grouped_number_parsing() {
        assert_eq!(parse_grouped_number("1,234,567"), Some(1_234_567));
        assert_eq!(parse_grouped_number(" 42 "), Some(42));
        assert_eq!(parse_grouped_number("n/a"), None);
        assert_eq!(parse_grouped_number(""), None);
    }
}
