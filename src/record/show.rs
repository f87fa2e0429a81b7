use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::episode::EpisodeRecord;

/// The full typed metadata record: show-level settings plus the ordered
/// episode sequence
#[derive(Debug, Clone, Deserialize)]
pub struct ShowRecord {
    pub meta: ShowMeta,
    pub episodes: Vec<EpisodeRecord>,
}

/// Show-level settings from the record's `meta` block
#[derive(Debug, Clone, Deserialize)]
pub struct ShowMeta {
    pub title: String,
    pub description: String,
    pub author: Vec<String>,
    #[serde(default)]
    pub author_join: Option<String>,
    pub email: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Language tag such as "en" or "de-DE"; the primary subtag must map to
    /// a known ISO 639-2 code
    pub language: String,
    pub remote_uri: RemoteUri,
    /// Template for the filename stem shared by all of an episode's artifacts
    pub target_filename: String,
    /// Destination template for the tagged episode audio, relative to the
    /// output directory
    pub episode_destination: String,
    /// Name of the cover image embedded into the audio tags, if any
    #[serde(default)]
    pub tag_cover_image: Option<String>,
    #[serde(default)]
    pub cover_images: BTreeMap<String, CoverImage>,
    #[serde(default)]
    pub video: Option<VideoSpec>,
    #[serde(default)]
    pub templates: Vec<TemplateSpec>,
}

impl ShowMeta {
    /// All authors joined by the configured separator
    pub fn authors(&self) -> String {
        let join = self.author_join.as_deref().unwrap_or(", ");
        self.author.join(join)
    }
}

/// Remote base URIs and per-content-type URI templates
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUri {
    pub website: String,
    pub rss_feed: String,
    /// Published show cover URL, referenced from the feed channel
    pub cover_image: String,
    /// URI template for the episode audio
    pub episode: String,
}

/// One named cover art definition
#[derive(Debug, Clone, Deserialize)]
pub struct CoverImage {
    /// Source image, relative to the record file
    pub source: PathBuf,
    /// Destination template, relative to the output directory
    pub destination: String,
    /// Optional URI template for the published cover
    #[serde(default)]
    pub uri: Option<String>,
    /// Edit operations applied in order
    pub edits: Vec<Edit>,
}

/// A single cover art edit operation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edit {
    Annotate(Annotate),
    Scale(Scale),
}

/// Draw text onto the cover. `text` is a template over the `episode_no` and
/// `title` placeholders.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Annotate {
    pub text: String,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub outline: Option<String>,
    #[serde(default)]
    pub gravity: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

/// Resize the cover
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scale {
    pub geometry: String,
    #[serde(default)]
    pub quality: Option<u32>,
}

/// The optional video rendition
#[derive(Debug, Clone, Deserialize)]
pub struct VideoSpec {
    /// Destination template, relative to the output directory
    pub destination: String,
    #[serde(default)]
    pub uri: Option<String>,
    /// Name of the cover art used as the looped still background
    pub cover_image: String,
}

/// A user-declared template artifact
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSpec {
    /// Template source file, relative to the record file
    pub source: PathBuf,
    /// Destination template, relative to the output directory
    pub destination: String,
    /// Optional per-episode URI template for the rendered page
    #[serde(default)]
    pub uri: Option<String>,
    pub scope: TemplateScope,
}

/// Whether a template renders once for the show or once per episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateScope {
    Show,
    Episode,
}
