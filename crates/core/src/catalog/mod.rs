//! Release catalog access.
//!
//! This module provides the `ReleaseSource` trait for fetching pages of a
//! show's release index, the page extractor that turns a page into episodes
//! for one quality tier, and `ShowDirectory` for show lookup.

mod extract;
mod http;
mod resolve;
mod types;

pub use extract::{extract_page, is_done_sentinel, DONE_SENTINEL};
pub use http::HttpCatalog;
pub use resolve::{parse_show_id, parse_show_listing};
pub use types::*;
