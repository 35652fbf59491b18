//! Release-index page parsing.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{CatalogError, Episode, PageReleases, Quality, RawPage, ReleaseIndexPage, Show};

/// Body of the page served past the last page of a show.
pub const DONE_SENTINEL: &str = "DONE";

static ENTRY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.rls-info-container").expect("static selector"));

static MAGNET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[title="Magnet Link"]"#).expect("static selector"));

/// Selector for the per-quality link block inside a release entry.
fn quality_selector(quality: Quality) -> Result<Selector, CatalogError> {
    Selector::parse(&format!("div.link-{}", quality))
        .map_err(|e| CatalogError::Parse(format!("bad quality selector: {}", e)))
}

/// Whether a page body is the "no more pages" sentinel.
pub fn is_done_sentinel(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed == DONE_SENTINEL {
        return true;
    }
    // The sentinel may arrive wrapped in markup.
    if !trimmed.contains('<') {
        return false;
    }
    let document = Html::parse_document(trimmed);
    let text: String = document.root_element().text().collect();
    text.trim() == DONE_SENTINEL
}

/// Parse one release-index page into episodes offered at `quality`.
///
/// Entries that do not offer `quality` are skipped and counted rather than
/// failing the page. A non-sentinel page without any release entry is a
/// [`CatalogError::Parse`].
pub fn extract_page(
    raw: &RawPage,
    show: &Show,
    quality: Quality,
) -> Result<ReleaseIndexPage, CatalogError> {
    if is_done_sentinel(&raw.body) {
        debug!(show = %show.title, offset = raw.offset, "Reached end of release index");
        return Ok(ReleaseIndexPage::Done);
    }

    let document = Html::parse_document(&raw.body);
    let quality_block = quality_selector(quality)?;

    let mut releases = PageReleases::default();
    let mut entries = 0usize;

    for entry in document.select(&ENTRY_SELECTOR) {
        entries += 1;

        let Some(release_id) = entry.value().attr("id").map(str::trim).filter(|id| !id.is_empty())
        else {
            releases.skipped += 1;
            continue;
        };

        if let Ok(numeric) = release_id.parse::<u64>() {
            releases.highest_id = Some(releases.highest_id.map_or(numeric, |h| h.max(numeric)));
        }

        match magnet_for(entry, &quality_block) {
            Some(magnet) => {
                let title = format!("{} - {}", show.title, release_id);
                match Episode::new(title, magnet, quality) {
                    Ok(episode) => releases.episodes.push(episode),
                    Err(e) => {
                        debug!(release = release_id, error = %e, "Skipping invalid release entry");
                        releases.skipped += 1;
                    }
                }
            }
            None => {
                debug!(
                    show = %show.title,
                    release = release_id,
                    quality = %quality,
                    "Quality not offered for release"
                );
                releases.skipped += 1;
            }
        }
    }

    if entries == 0 {
        return Err(CatalogError::Parse(format!(
            "page {} has no release entries",
            raw.offset
        )));
    }

    debug!(
        show = %show.title,
        offset = raw.offset,
        episodes = releases.episodes.len(),
        skipped = releases.skipped,
        "Extracted release page"
    );

    Ok(ReleaseIndexPage::Releases(releases))
}

fn magnet_for<'a>(entry: ElementRef<'a>, quality_block: &Selector) -> Option<&'a str> {
    entry
        .select(quality_block)
        .next()?
        .select(&MAGNET_SELECTOR)
        .next()?
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
}
