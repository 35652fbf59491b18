//! Testing utilities and mock implementations.
//!
//! Mocks for every external seam (catalog site, download ledger, magnet
//! opener) so the pipeline can be exercised without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use relwatch_core::testing::{fixtures, MockCatalog};
//!
//! let catalog = MockCatalog::new();
//! catalog.add_show(fixtures::show("X"), "42");
//! catalog.set_page("42", 0, fixtures::release_range(1, 12));
//! catalog.set_page("42", 1, "DONE");
//! ```

mod mock_catalog;
mod mock_ledger;
mod mock_opener;

pub use mock_catalog::MockCatalog;
pub use mock_ledger::MockLedgerStore;
pub use mock_opener::MockOpener;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{Quality, Show};

    /// Create a show whose link is derived from its title.
    pub fn show(title: &str) -> Show {
        Show::new(title, format!("/shows/{}", title.to_lowercase().replace(' ', "-")))
    }

    /// Deterministic magnet link for a release at one quality.
    pub fn magnet(release_id: u64, quality: Quality) -> String {
        format!(
            "magnet:?xt=urn:btih:{:032x}{:08x}&dn=release-{}-{}",
            release_id,
            quality.lines(),
            release_id,
            quality
        )
    }

    /// Render a release-index page with one entry per `(release id, qualities)`.
    ///
    /// Entries appear in the given order; each offered quality gets a link
    /// block with a magnet and a torrent link.
    pub fn release_page(entries: &[(u64, &[Quality])]) -> String {
        let mut html = String::new();
        for (release_id, qualities) in entries {
            html.push_str(&format!(
                "<div class=\"rls-info-container\" id=\"{id}\">\n\
                 <a class=\"rls-label\" href=\"#{id}\"><span class=\"rls-date\">01/01/19</span> Release {id}</a>\n\
                 <div class=\"rls-links-container\">\n",
                id = release_id
            ));
            for quality in qualities.iter() {
                html.push_str(&format!(
                    "<div class=\"rls-link link-{q}\" id=\"{id}-{q}\">\
                     <span class=\"rls-link-label\">{q}:</span>\
                     <span class=\"dl-type hs-magnet-link\"><a title=\"Magnet Link\" href=\"{magnet}\">Magnet</a></span>\
                     <span class=\"dl-type hs-torrent-link\"><a title=\"Torrent Link\" href=\"/torrent/{id}-{q}.torrent\">Torrent</a></span>\
                     </div>\n",
                    q = quality,
                    id = release_id,
                    magnet = magnet(*release_id, *quality)
                ));
            }
            html.push_str("</div>\n</div>\n");
        }
        html
    }

    /// Render a page holding releases `lowest..=highest`, newest first, each
    /// offered at every quality.
    pub fn release_range(lowest: u64, highest: u64) -> String {
        let ids: Vec<u64> = (lowest..=highest).rev().collect();
        let entries: Vec<(u64, &[Quality])> = ids.iter().map(|id| (*id, &Quality::ALL[..])).collect();
        release_page(&entries)
    }
}
