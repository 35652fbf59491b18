//! Types for the release catalog.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tracked show on the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Show {
    /// Display title, also the ledger key for this show.
    pub title: String,
    /// Catalog page of the show (absolute URL or path relative to the catalog root).
    pub link: String,
}

impl Show {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Resolution tier a release is offered in.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(try_from = "u16", into = "u16")]
pub enum Quality {
    P480,
    P720,
    #[default]
    P1080,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::P1080, Quality::P720, Quality::P480];

    /// Vertical resolution in lines.
    pub fn lines(self) -> u16 {
        match self {
            Quality::P1080 => 1080,
            Quality::P720 => 720,
            Quality::P480 => 480,
        }
    }
}

impl TryFrom<u16> for Quality {
    type Error = CatalogError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1080 => Ok(Quality::P1080),
            720 => Ok(Quality::P720),
            480 => Ok(Quality::P480),
            other => Err(CatalogError::InvalidEpisode(format!(
                "unsupported quality {} (expected 1080, 720 or 480)",
                other
            ))),
        }
    }
}

impl From<Quality> for u16 {
    fn from(quality: Quality) -> Self {
        quality.lines()
    }
}

impl FromStr for Quality {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits
            .strip_suffix('p')
            .or_else(|| digits.strip_suffix('P'))
            .unwrap_or(digits);
        let value: u16 = digits
            .parse()
            .map_err(|_| CatalogError::InvalidEpisode(format!("invalid quality '{}'", s)))?;
        Quality::try_from(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.lines())
    }
}

/// Identity of an episode for deduplication: title plus quality.
///
/// Encoded as `"{title} ({quality}p)"` in the ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EpisodeKey {
    title: String,
    quality: Quality,
}

impl EpisodeKey {
    pub fn new(title: impl Into<String>, quality: Quality) -> Result<Self, CatalogError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CatalogError::InvalidEpisode(
                "episode title cannot be empty".to_string(),
            ));
        }
        Ok(Self { title, quality })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.quality)
    }
}

impl FromStr for EpisodeKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::InvalidEpisode(format!("invalid episode key '{}'", s));

        let (title, suffix) = s.rsplit_once(" (").ok_or_else(invalid)?;
        let quality = suffix.strip_suffix(')').ok_or_else(invalid)?;
        if !quality.ends_with('p') {
            return Err(invalid());
        }
        let quality = quality.parse::<Quality>().map_err(|_| invalid())?;
        EpisodeKey::new(title, quality)
    }
}

impl TryFrom<String> for EpisodeKey {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EpisodeKey> for String {
    fn from(key: EpisodeKey) -> Self {
        key.to_string()
    }
}

/// One release of a show at one quality.
///
/// Equality and hashing only look at the [`EpisodeKey`]; a re-issued magnet
/// for the same release is the same episode.
#[derive(Debug, Clone)]
pub struct Episode {
    key: EpisodeKey,
    magnet: String,
}

impl Episode {
    pub fn new(
        title: impl Into<String>,
        magnet: impl Into<String>,
        quality: Quality,
    ) -> Result<Self, CatalogError> {
        let magnet = magnet.into();
        if magnet.trim().is_empty() {
            return Err(CatalogError::InvalidEpisode(
                "magnet link cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            key: EpisodeKey::new(title, quality)?,
            magnet,
        })
    }

    pub fn title(&self) -> &str {
        self.key.title()
    }

    pub fn quality(&self) -> Quality {
        self.key.quality()
    }

    pub fn magnet(&self) -> &str {
        &self.magnet
    }

    pub fn key(&self) -> &EpisodeKey {
        &self.key
    }
}

impl Serialize for Episode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Episode", 3)?;
        state.serialize_field("title", self.title())?;
        state.serialize_field("quality", &self.quality())?;
        state.serialize_field("magnet", &self.magnet)?;
        state.end()
    }
}

impl PartialEq for Episode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Episode {}

impl std::hash::Hash for Episode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Unparsed body of one release-index page.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub offset: u32,
    pub body: String,
}

/// Episodes found on one non-terminal page.
#[derive(Debug, Clone, Default)]
pub struct PageReleases {
    /// One episode per release entry that offers the requested quality.
    pub episodes: Vec<Episode>,
    /// Release entries skipped because the quality (or its magnet) was missing.
    pub skipped: usize,
    /// Largest numeric release id on the page, regardless of quality.
    pub highest_id: Option<u64>,
}

/// A parsed release-index page.
#[derive(Debug, Clone)]
pub enum ReleaseIndexPage {
    /// No further pages exist for this show.
    Done,
    Releases(PageReleases),
}

impl ReleaseIndexPage {
    pub fn is_done(&self) -> bool {
        matches!(self, ReleaseIndexPage::Done)
    }

    /// Largest numeric release id on the page; `None` for the sentinel page.
    pub fn highest_release_id(&self) -> Option<u64> {
        match self {
            ReleaseIndexPage::Done => None,
            ReleaseIndexPage::Releases(releases) => releases.highest_id,
        }
    }
}

/// Errors from the catalog layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The page does not have the expected structure.
    #[error("parse error: {0}")]
    Parse(String),

    /// A value violates an episode/quality invariant.
    #[error("invalid episode: {0}")]
    InvalidEpisode(String),
}

/// Retrieves release-index pages. Implementations do not retry.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch page `offset` of the release index for `show`.
    async fn fetch_page(
        &self,
        show: &Show,
        show_id: &str,
        offset: u32,
    ) -> Result<RawPage, CatalogError>;
}

/// Show lookup on the catalog.
#[async_trait]
pub trait ShowDirectory: Send + Sync {
    /// Resolve the numeric reference id the release index is keyed by.
    async fn resolve_show_id(&self, show: &Show) -> Result<String, CatalogError>;

    /// List catalog shows whose title matches `query` (case-insensitive).
    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError>;
}
