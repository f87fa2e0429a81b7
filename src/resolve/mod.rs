// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod locale;
mod locate;
mod slug;
mod template;

pub use locale::comment_language;
pub use locate::locate_source;
pub use slug::slugify;
pub use template::{Placeholders, expand};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{ConfigError, PublishError};
use crate::progress::{ReportEvent, SharedReporter};
use crate::record::{EpisodeRecord, ShowMeta};
use crate::toolchain::{AudioInfo, MediaToolchain};

/// Show-level derived state, computed once per run before any episode is
/// resolved
#[derive(Debug, Clone)]
pub struct ShowVars {
    /// All authors joined by the configured separator
    pub authors: String,
    /// ISO 639-2 code for ID3 comment frames, derived from `meta.language`
    pub comment_language: &'static str,
}

/// Validate show-level configuration and compute [`ShowVars`]
pub fn derive_show_vars(meta: &ShowMeta) -> Result<ShowVars, ConfigError> {
    let comment_language = comment_language(&meta.language)?;

    if let Some(name) = &meta.tag_cover_image
        && !meta.cover_images.contains_key(name)
    {
        return Err(ConfigError::UnknownCoverImage {
            referrer: "tag_cover_image".to_string(),
            name: name.clone(),
        });
    }

    if let Some(video) = &meta.video
        && !meta.cover_images.contains_key(&video.cover_image)
    {
        return Err(ConfigError::UnknownCoverImage {
            referrer: "video".to_string(),
            name: video.cover_image.clone(),
        });
    }

    Ok(ShowVars {
        authors: meta.authors(),
        comment_language,
    })
}

/// An episode with all derived state attached: located source audio, numbering,
/// dates, the filename stem, and every destination path and remote URI
#[derive(Debug, Clone)]
pub struct ResolvedEpisode {
    pub record: EpisodeRecord,
    /// Effective episode number after carry-over; None until the sequence has
    /// seen a numeric value
    pub number: Option<u32>,
    pub recdate: DateTime<Utc>,
    pub pubdate: DateTime<Utc>,
    /// Located source audio; None marks the degraded, placeholder-metadata
    /// state
    pub source: Option<PathBuf>,
    pub info: AudioInfo,
    /// Human-readable duration, h:mm:ss or m:ss
    pub duration: String,
    /// Templated filename stem shared by all of this episode's artifacts
    pub stem: String,
    /// The full placeholder set (including `filename`), reusable for any
    /// further destination or URI templates
    pub placeholders: Placeholders,
    pub audio_destination: PathBuf,
    pub audio_uri: String,
    pub cover_destinations: BTreeMap<String, PathBuf>,
    pub cover_uris: BTreeMap<String, String>,
    pub video_destination: Option<PathBuf>,
    pub video_uri: Option<String>,
    /// Set by the orchestrator once every render action for this episode has
    /// run
    pub rendered: bool,
}

impl ResolvedEpisode {
    pub fn has_audio(&self) -> bool {
        self.source.is_some()
    }
}

/// The episode-number carry-over rule: an explicit number is adopted and
/// resets the counter; otherwise the counter increments, and stays unset
/// until the sequence has seen a numeric value.
fn carry_number(counter: Option<u32>, explicit: Option<u32>) -> Option<u32> {
    explicit.or_else(|| counter.map(|c| c + 1))
}

/// Parse a date field, accepting a bare date (midnight UTC) or RFC 3339
fn parse_date(
    episode: &str,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, ConfigError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidDate {
            episode: episode.to_string(),
            field,
            value: value.to_string(),
        })
}

/// Format a duration in seconds as h:mm:ss, or m:ss below one hour
pub fn format_hms(secs_total: f64) -> String {
    let total = secs_total.round().max(0.0) as u64;
    let h = total / 3600;
    let m = total % 3600 / 60;
    let s = total % 60;
    if h == 0 {
        format!("{m}:{s:02}")
    } else {
        format!("{h}:{m:02}:{s:02}")
    }
}

/// Resolve every episode in declared order, threading the numbering counter
/// left to right.
///
/// A missing source file degrades the single episode to placeholder metadata
/// with a warning; malformed dates and unresolvable placeholders abort the
/// run.
pub fn resolve_episodes(
    meta: &ShowMeta,
    episodes: &[EpisodeRecord],
    search_dir: &Path,
    output_dir: &Path,
    toolchain: &dyn MediaToolchain,
    reporter: &SharedReporter,
) -> Result<Vec<ResolvedEpisode>, PublishError> {
    let mut resolved = Vec::with_capacity(episodes.len());
    let mut counter: Option<u32> = None;

    for record in episodes {
        let number = carry_number(counter, record.episode_no);
        if number.is_some() {
            counter = number;
        }

        let recdate = parse_date(&record.title, "recdate", &record.recdate)?;
        let pubdate = match &record.pubdate {
            Some(value) => parse_date(&record.title, "pubdate", value)?,
            None => recdate,
        };

        let source = locate_source(search_dir, &record.filename)?;
        let info = match &source {
            Some(path) => toolchain.probe(path)?,
            None => {
                reporter.report(ReportEvent::SourceMissing {
                    episode: record.title.clone(),
                    filename: record.filename.clone(),
                });
                AudioInfo::placeholder()
            }
        };
        let duration = format_hms(info.duration_secs);

        let stem_vars = Placeholders::new()
            .set("episode_no", number.unwrap_or(0).to_string())
            .set("pubdate", pubdate.format("%Y_%m_%d").to_string())
            .set("title", slugify(&record.title));
        let stem = expand(&meta.target_filename, &stem_vars)?;
        let placeholders = stem_vars.set("filename", stem.clone());

        let audio_destination = output_dir.join(expand(&meta.episode_destination, &placeholders)?);
        let audio_uri = expand(&meta.remote_uri.episode, &placeholders)?;

        let mut cover_destinations = BTreeMap::new();
        let mut cover_uris = BTreeMap::new();
        for (name, cover) in &meta.cover_images {
            cover_destinations
                .insert(name.clone(), output_dir.join(expand(&cover.destination, &placeholders)?));
            if let Some(uri) = &cover.uri {
                cover_uris.insert(name.clone(), expand(uri, &placeholders)?);
            }
        }

        let (video_destination, video_uri) = match &meta.video {
            Some(video) => (
                Some(output_dir.join(expand(&video.destination, &placeholders)?)),
                video
                    .uri
                    .as_ref()
                    .map(|uri| expand(uri, &placeholders))
                    .transpose()?,
            ),
            None => (None, None),
        };

        reporter.report(ReportEvent::EpisodeResolved {
            episode: record.title.clone(),
            number,
            stem: stem.clone(),
        });

        resolved.push(ResolvedEpisode {
            record: record.clone(),
            number,
            recdate,
            pubdate,
            source,
            info,
            duration,
            stem,
            placeholders,
            audio_destination,
            audio_uri,
            cover_destinations,
            cover_uris,
            video_destination,
            video_uri,
            rendered: false,
        });
    }

    Ok(resolved)
}
