// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod audio;
mod cover;
mod video;

pub use audio::render_audio;
pub use cover::render_cover;
pub use video::render_video;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};

use crate::error::{PublishError, RenderError};
use crate::progress::{ReportEvent, SharedReporter, SkipReason};
use crate::record::ShowMeta;
use crate::resolve::{ResolvedEpisode, ShowVars};
use crate::toolchain::{MediaToolchain, TagSet};

/// Options controlling the render pass
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Regenerate artifacts even when the destination already exists
    pub force: bool,
    /// Wait for Enter after each cover-art render (debug aid)
    pub pause_after_cover: bool,
    /// Wall-clock time captured at run start; episodes published after this
    /// instant are not rendered
    pub now: DateTime<Utc>,
}

/// Sibling path an artifact is written to before being moved into place.
/// The `.partial` marker sits before the extension so external tools still
/// recognize the file type.
pub(crate) fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_stem().unwrap_or_default().to_os_string();
    name.push(".partial");
    if let Some(ext) = dest.extension() {
        name.push(".");
        name.push(ext);
    }
    dest.with_file_name(name)
}

pub(crate) fn ensure_parent(dest: &Path) -> Result<(), RenderError> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Move a finished partial into place. On failure the partial is removed so
/// no half-written artifact survives.
pub(crate) fn finalize(partial: &Path, dest: &Path) -> Result<(), RenderError> {
    std::fs::rename(partial, dest).map_err(|e| {
        let _ = std::fs::remove_file(partial);
        RenderError::FinalizeFailed {
            path: dest.to_path_buf(),
            source: e,
        }
    })
}

pub(crate) fn discard(path: &Path) {
    let _ = std::fs::remove_file(path);
}

/// Whether an episode is rendered at all, and if not, why
fn skip_reason(episode: &ResolvedEpisode, now: DateTime<Utc>) -> Option<SkipReason> {
    if !episode.has_audio() {
        Some(SkipReason::NoSource)
    } else if episode.record.hidden {
        Some(SkipReason::Hidden)
    } else if episode.pubdate > now {
        Some(SkipReason::FutureDated)
    } else {
        None
    }
}

/// Run every render action for one episode: each named cover art, the tagged
/// audio, and the optional video rendition.
///
/// Returns whether the episode was rendered. Episodes without source audio,
/// hidden episodes, and future-dated episodes are skipped as a whole; a
/// failing action aborts with any partial artifact already cleaned up.
pub fn render_episode(
    toolchain: &dyn MediaToolchain,
    meta: &ShowMeta,
    vars: &ShowVars,
    base_dir: &Path,
    episode: &ResolvedEpisode,
    options: &RenderOptions,
    reporter: &SharedReporter,
) -> Result<bool, PublishError> {
    if let Some(reason) = skip_reason(episode, options.now) {
        reporter.report(ReportEvent::RenderSkipped {
            episode: episode.record.title.clone(),
            reason,
        });
        return Ok(false);
    }

    for (name, definition) in &meta.cover_images {
        let dest = &episode.cover_destinations[name];
        let did_render = render_cover(
            toolchain,
            name,
            definition,
            base_dir,
            episode,
            dest,
            options.force,
            reporter,
        )?;

        if did_render && options.pause_after_cover {
            eprintln!("Rendered cover '{name}', press Enter to continue...");
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
        }
    }

    let source = episode
        .source
        .as_deref()
        .expect("gating guarantees a source");

    let tags = TagSet {
        author: vars.authors.clone(),
        album: meta.title.clone(),
        title: episode.record.title.clone(),
        track: episode.number,
        genre: "podcast".to_string(),
        year: episode.pubdate.year(),
        comment: episode.record.description.clone(),
        comment_language: vars.comment_language.to_string(),
        uri: Some(episode.audio_uri.clone()),
        cover_image: meta
            .tag_cover_image
            .as_ref()
            .map(|name| episode.cover_destinations[name].clone()),
    };

    render_audio(
        toolchain,
        source,
        &episode.audio_destination,
        &tags,
        options.force,
        &episode.record.title,
        reporter,
    )?;

    if let Some(video) = &meta.video {
        let background = &episode.cover_destinations[&video.cover_image];
        let dest = episode
            .video_destination
            .as_deref()
            .expect("video destination resolved whenever video is declared");

        if background.exists() {
            render_video(
                toolchain,
                background,
                &episode.audio_destination,
                dest,
                options.force,
                &episode.record.title,
                reporter,
            )?;
        } else {
            reporter.report(ReportEvent::VideoBackgroundMissing {
                episode: episode.record.title.clone(),
                cover: video.cover_image.clone(),
            });
        }
    }

    Ok(true)
}
