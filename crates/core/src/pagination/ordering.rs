//! Total order over episodes.
//!
//! Episodes sort by the release number at the end of their title, falling
//! back to the title itself when there is none. Numbered episodes come first.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::catalog::Episode;

static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)$").expect("static regex"));

/// Release number at the end of an episode title, if any.
pub fn release_number(title: &str) -> Option<u64> {
    TRAILING_NUMBER
        .captures(title.trim_end())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

impl Ord for Episode {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_number = match (release_number(self.title()), release_number(other.title())) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_number
            .then_with(|| self.title().cmp(other.title()))
            .then_with(|| self.quality().cmp(&other.quality()))
    }
}

impl PartialOrd for Episode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort episodes into display order.
pub fn sort_episodes(episodes: &mut [Episode]) {
    episodes.sort();
}
