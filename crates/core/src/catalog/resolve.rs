//! Show page parsing: reference id lookup and the show listing.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};

use super::{CatalogError, Show};

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.entry-content script").expect("static selector"));

static LISTING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.post-inner-content a").expect("static selector"));

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Extract the numeric show id embedded in the show page's inline script.
pub fn parse_show_id(html: &str) -> Result<String, CatalogError> {
    let document = Html::parse_document(html);
    let script = document
        .select(&SCRIPT_SELECTOR)
        .next()
        .ok_or_else(|| CatalogError::Parse("show page has no id script".to_string()))?;

    let text: String = script.text().collect();
    DIGITS
        .find(&text)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CatalogError::Parse("show id script contains no number".to_string()))
}

/// Select the shows in the catalog listing whose title contains `query`.
///
/// Matching is case-insensitive; an empty query matches every show.
pub fn parse_show_listing(html: &str, query: &str) -> Vec<Show> {
    let document = Html::parse_document(html);
    let needle = query.trim().to_lowercase();

    document
        .select(&LISTING_SELECTOR)
        .filter_map(|anchor| {
            let title_attr = anchor.value().attr("title")?;
            if !title_attr.to_lowercase().contains(&needle) {
                return None;
            }
            let link = anchor.value().attr("href")?.trim();
            let text: String = anchor.text().collect();
            let title = text.trim();
            let title = if title.is_empty() { title_attr.trim() } else { title };
            if link.is_empty() || title.is_empty() {
                return None;
            }
            Some(Show::new(title, link))
        })
        .collect()
}
