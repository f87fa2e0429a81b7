use std::collections::BTreeMap;

use serde::Deserialize;

/// One episode entry from the record's `episodes` list, exactly as declared.
/// All derived state (source path, numbering, destinations) lives on
/// [`crate::resolve::ResolvedEpisode`] instead.
#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeRecord {
    pub title: String,
    /// Name of the source audio file, located by searching the source tree
    pub filename: String,
    pub description: String,
    /// Short form used as the feed item subtitle; falls back to `description`
    #[serde(default)]
    pub description_short: Option<String>,
    /// Recording date, `YYYY-MM-DD` or RFC 3339
    pub recdate: String,
    /// Publish date; defaults to the recording date
    #[serde(default)]
    pub pubdate: Option<String>,
    /// Stable identifier, minted once via `--add-guids` and never regenerated
    #[serde(default)]
    pub guid: Option<String>,
    /// Explicit episode number; otherwise carried forward from the previous
    /// episode's number
    #[serde(default)]
    pub episode_no: Option<u32>,
    #[serde(default)]
    pub hidden: bool,
    /// Per-cover-art overrides for the annotate title text, keyed by cover name
    #[serde(default)]
    pub cover_titles: BTreeMap<String, String>,
}

impl EpisodeRecord {
    pub fn subtitle(&self) -> &str {
        self.description_short.as_deref().unwrap_or(&self.description)
    }
}
