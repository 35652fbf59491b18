//! "New since last run" computation.

use std::collections::HashSet;

use crate::catalog::{Episode, EpisodeKey};

use super::DownloadRecord;

/// Episodes of `candidates` whose key is not in the show's history.
///
/// The history is the entry recorded under the show title plus any entry
/// whose name is itself an episode key of the show (`"X - 5 (1080p)"` for
/// show `"X"`), the shape older ledgers were written in. A show that was
/// never recorded has an empty history, so every candidate is new.
/// Candidate order is preserved.
pub fn compute_new(show_title: &str, candidates: &[Episode], record: &DownloadRecord) -> Vec<Episode> {
    let history: HashSet<&EpisodeKey> = record
        .shows()
        .filter(|h| h.title == show_title || is_episode_entry_of(&h.title, show_title))
        .flat_map(|h| h.episodes.iter())
        .collect();

    candidates
        .iter()
        .filter(|episode| !history.contains(episode.key()))
        .cloned()
        .collect()
}

/// Whether a ledger entry name is an episode key belonging to `show_title`.
fn is_episode_entry_of(entry: &str, show_title: &str) -> bool {
    entry
        .parse::<EpisodeKey>()
        .map(|key| {
            key.title()
                .strip_prefix(show_title)
                .is_some_and(|rest| rest.starts_with(" - "))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Quality;

    fn ep(title: &str, quality: Quality) -> Episode {
        Episode::new(title, format!("magnet:?dn={}", title), quality).unwrap()
    }

    fn record(json: &str) -> DownloadRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_only_unrecorded_episodes_are_new() {
        let ledger = record(r#"{"Downloaded":[{"X":["X - 5 (1080p)"]}]}"#);
        let candidates = vec![ep("X - 5", Quality::P1080), ep("X - 6", Quality::P1080)];

        let new = compute_new("X", &candidates, &ledger);
        assert_eq!(new, vec![ep("X - 6", Quality::P1080)]);
    }

    #[test]
    fn test_per_episode_ledger_entries_suppress_duplicates() {
        let ledger = record(r#"{"Downloaded":[{"X - 5 (1080p)":["X - 5 (1080p)"]}]}"#);
        let candidates = vec![ep("X - 5", Quality::P1080), ep("X - 6", Quality::P1080)];

        let new = compute_new("X", &candidates, &ledger);
        assert_eq!(new, vec![ep("X - 6", Quality::P1080)]);
    }

    #[test]
    fn test_episode_entry_of_other_show_is_ignored() {
        // "XY - 5" must not count as an episode of "X"
        let ledger = record(r#"{"Downloaded":[{"XY - 5 (1080p)":["X - 5 (1080p)"]}]}"#);
        let candidates = vec![ep("X - 5", Quality::P1080)];

        assert_eq!(compute_new("X", &candidates, &ledger), candidates);
        assert!(!is_episode_entry_of("XY - 5 (1080p)", "X"));
        assert!(is_episode_entry_of("X - 5 (720p)", "X"));
        assert!(!is_episode_entry_of("X", "X"));
    }

    #[test]
    fn test_unknown_show_everything_is_new() {
        let ledger = record(r#"{"Downloaded":[{"Y":["Y - 1 (1080p)"]}]}"#);
        let candidates = vec![ep("X - 1", Quality::P1080), ep("X - 2", Quality::P1080)];

        assert_eq!(compute_new("X", &candidates, &ledger), candidates);
        assert_eq!(compute_new("X", &candidates, &DownloadRecord::new()), candidates);
    }

    #[test]
    fn test_other_quality_is_a_different_episode() {
        let ledger = record(r#"{"Downloaded":[{"X":["X - 5 (1080p)"]}]}"#);
        let candidates = vec![ep("X - 5", Quality::P720)];

        assert_eq!(compute_new("X", &candidates, &ledger), candidates);
    }

    #[test]
    fn test_history_of_another_show_does_not_match() {
        // Same episode key recorded under a different show title
        let ledger = record(r#"{"Downloaded":[{"Z":["X - 5 (1080p)"]}]}"#);
        let candidates = vec![ep("X - 5", Quality::P1080)];

        assert_eq!(compute_new("X", &candidates, &ledger), candidates);
    }

    #[test]
    fn test_reissued_magnet_is_not_new() {
        let ledger = record(r#"{"Downloaded":[{"X":["X - 5 (1080p)"]}]}"#);
        let reissued = Episode::new("X - 5", "magnet:?xt=reissued", Quality::P1080).unwrap();

        assert!(compute_new("X", &[reissued], &ledger).is_empty());
    }

    #[test]
    fn test_result_is_set_difference() {
        let all: Vec<Episode> = (1..=6).map(|n| ep(&format!("X - {}", n), Quality::P1080)).collect();
        let mut ledger = DownloadRecord::new();
        ledger.record("X", [1, 3, 5, 9].iter().map(|n| {
            EpisodeKey::new(format!("X - {}", n), Quality::P1080).unwrap()
        }));

        let new = compute_new("X", &all, &ledger);
        let titles: Vec<_> = new.iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["X - 2", "X - 4", "X - 6"]);
    }
}
