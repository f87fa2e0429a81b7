// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::PublishError;
use crate::feed::{self, FeedContext};
use crate::progress::{ReportEvent, SharedReporter};
use crate::record::RecordDocument;
use crate::render::{RenderOptions, render_episode};
use crate::resolve::{derive_show_vars, resolve_episodes};
use crate::templates::expand_templates;
use crate::toolchain::MediaToolchain;

/// Options for a publish run
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Regenerate every artifact even when the destination already exists
    pub force: bool,
    /// Mint GUIDs for episodes that lack one and persist them back into the
    /// record before anything else runs
    pub add_guids: bool,
    /// Directory searched recursively for source audio files
    pub search_dir: PathBuf,
    /// Include episodes without source audio in the feed (preview aid)
    pub show_missing_audio: bool,
    /// Wait for Enter after each cover-art render (debug aid)
    pub pause_after_cover: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            force: false,
            add_guids: false,
            search_dir: PathBuf::from("."),
            show_missing_audio: false,
            pause_after_cover: false,
        }
    }
}

/// Summary of a finished publish run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishResult {
    /// Episodes whose render actions all ran (or were skip-if-exists no-ops)
    pub rendered: usize,
    /// Episodes excluded from rendering entirely
    pub skipped: usize,
    /// Items serialized into the feed document
    pub feed_items: usize,
}

/// Run the whole publish pipeline for one metadata record.
///
/// Stage order is fixed: GUID minting, show validation, episode resolution,
/// rendering in declared order, feed serialization, template expansion. The
/// wall clock is read once at the start so future-dating is consistent across
/// the run.
pub fn publish(
    toolchain: &dyn MediaToolchain,
    record_path: &Path,
    output_dir: &Path,
    options: &PublishOptions,
    reporter: &SharedReporter,
) -> Result<PublishResult, PublishError> {
    let mut document = RecordDocument::load(record_path)?;

    if options.add_guids {
        let added = document.add_missing_guids()?;
        if added > 0 {
            document.save()?;
            reporter.report(ReportEvent::GuidsMinted { count: added });
        }
    }

    let show = document.show()?;
    let base_dir = document.base_dir();
    reporter.report(ReportEvent::RecordLoaded {
        path: record_path.to_path_buf(),
        episode_count: show.episodes.len(),
    });

    let vars = derive_show_vars(&show.meta)?;
    let now = Utc::now();

    let mut episodes = resolve_episodes(
        &show.meta,
        &show.episodes,
        &options.search_dir,
        output_dir,
        toolchain,
        reporter,
    )?;

    let feed_context = FeedContext {
        include_missing_audio: options.show_missing_audio,
        now,
    };

    let render_options = RenderOptions {
        force: options.force,
        pause_after_cover: options.pause_after_cover,
        now,
    };

    let mut rendered = 0;
    for episode in &mut episodes {
        episode.rendered = render_episode(
            toolchain,
            &show.meta,
            &vars,
            &base_dir,
            episode,
            &render_options,
            reporter,
        )?;
        if episode.rendered {
            rendered += 1;
        }
    }

    let channel = feed::build_channel(&show.meta, &vars, &feed_context, &episodes, reporter);
    let feed_items = channel.items().len();
    let feed_path = output_dir.join(feed::FEED_FILENAME);
    feed::write_feed(&channel, &feed_path)?;
    reporter.report(ReportEvent::FeedWritten {
        path: feed_path,
        item_count: feed_items,
    });

    expand_templates(&show.meta, &vars, &episodes, &base_dir, output_dir, reporter)?;

    let result = PublishResult {
        rendered,
        skipped: episodes.len() - rendered,
        feed_items,
    };
    reporter.report(ReportEvent::PublishCompleted {
        rendered_count: result.rendered,
        skipped_count: result.skipped,
        feed_item_count: result.feed_items,
    });

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopReporter;
    use crate::render::tests::RecordingToolchain;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn write_record(dir: &Path, episodes: serde_json::Value) -> PathBuf {
        let record = serde_json::json!({
            "meta": {
                "title": "Null Pointer",
                "description": "A show about nothing",
                "author": ["Alice", "Bob"],
                "email": "show@example.com",
                "category": "Technology",
                "keywords": ["tech"],
                "language": "en",
                "remote_uri": {
                    "website": "https://example.com",
                    "rss_feed": "https://example.com/feed.xml",
                    "cover_image": "https://example.com/cover.jpg",
                    "episode": "https://cdn.example.com/mp3/{filename}.mp3"
                },
                "target_filename": "{episode_no}_{pubdate}_{title}",
                "episode_destination": "mp3/{filename}.mp3",
                "cover_images": {
                    "square": {
                        "source": "art/base.png",
                        "destination": "covers/{filename}.jpg",
                        "edits": [{ "scale": { "geometry": "1400x1400" } }]
                    }
                },
                "templates": [
                    { "source": "tpl/index.html", "destination": "index.html", "scope": "show" }
                ]
            },
            "episodes": episodes,
        });

        let path = dir.join("show.json");
        fs::write(&path, serde_json::to_string_pretty(&record).unwrap()).unwrap();
        fs::create_dir_all(dir.join("tpl")).unwrap();
        fs::write(
            dir.join("tpl/index.html"),
            "{{ rendered_episodes | length }}/{{ episodes | length }}",
        )
        .unwrap();
        path
    }

    fn episode_json(title: &str, filename: &str, number: u32) -> serde_json::Value {
        serde_json::json!({
            "title": title,
            "filename": filename,
            "description": "desc",
            "recdate": "2024-03-05",
            "guid": format!("guid-{number}"),
            "episode_no": number,
        })
    }

    fn options(search_dir: &Path) -> PublishOptions {
        PublishOptions {
            search_dir: search_dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn publishes_audio_feed_and_templates() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.mp3"), b"audio a").unwrap();
        fs::write(dir.path().join("b.mp3"), b"audio b").unwrap();

        let record = write_record(
            dir.path(),
            serde_json::json!([
                episode_json("Alpha", "a.mp3", 1),
                episode_json("Beta", "b.mp3", 2),
            ]),
        );

        let toolchain = RecordingToolchain::default();
        let result = publish(
            &toolchain,
            &record,
            &out,
            &options(dir.path()),
            &NoopReporter::shared(),
        )
        .unwrap();

        assert_eq!(
            result,
            PublishResult {
                rendered: 2,
                skipped: 0,
                feed_items: 2
            }
        );
        assert!(out.join("mp3/1_2024_03_05_Alpha.mp3").exists());
        assert!(out.join("covers/2_2024_03_05_Beta.jpg").exists());
        assert!(out.join(feed::FEED_FILENAME).exists());
        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            "2/2"
        );
    }

    #[test]
    fn missing_audio_degrades_and_stays_out_of_the_feed() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.mp3"), b"audio").unwrap();

        let record = write_record(
            dir.path(),
            serde_json::json!([
                episode_json("Alpha", "a.mp3", 1),
                episode_json("Gone", "gone.mp3", 2),
            ]),
        );

        let toolchain = RecordingToolchain::default();
        let result = publish(
            &toolchain,
            &record,
            &out,
            &options(dir.path()),
            &NoopReporter::shared(),
        )
        .unwrap();

        assert_eq!(
            result,
            PublishResult {
                rendered: 1,
                skipped: 1,
                feed_items: 1
            }
        );
        // the degraded episode still appears in the all-episodes context
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "1/2");
    }

    #[test]
    fn show_missing_audio_override_keeps_the_feed_item() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");

        let record = write_record(
            dir.path(),
            serde_json::json!([episode_json("Gone", "gone.mp3", 1)]),
        );

        let toolchain = RecordingToolchain::default();
        let opts = PublishOptions {
            show_missing_audio: true,
            ..options(dir.path())
        };
        let result = publish(&toolchain, &record, &out, &opts, &NoopReporter::shared()).unwrap();

        assert_eq!(result.rendered, 0);
        assert_eq!(result.feed_items, 1);
        // no render action ran, so the feed write itself creates the
        // output directory
        assert!(out.join(feed::FEED_FILENAME).exists());
    }

    #[test]
    fn add_guids_persists_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.mp3"), b"audio").unwrap();

        let record = write_record(
            dir.path(),
            serde_json::json!([{
                "title": "Alpha",
                "filename": "a.mp3",
                "description": "desc",
                "recdate": "2024-03-05",
                "episode_no": 1,
            }]),
        );

        let toolchain = RecordingToolchain::default();
        let opts = PublishOptions {
            add_guids: true,
            ..options(dir.path())
        };
        publish(&toolchain, &record, &out, &opts, &NoopReporter::shared()).unwrap();

        let first: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&record).unwrap()).unwrap();
        let guid = first["episodes"][0]["guid"].as_str().unwrap().to_string();
        assert!(!guid.is_empty());

        publish(&toolchain, &record, &out, &opts, &NoopReporter::shared()).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&record).unwrap()).unwrap();
        assert_eq!(second["episodes"][0]["guid"].as_str().unwrap(), guid);
    }

    #[test]
    fn rerun_without_force_rewrites_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.mp3"), b"audio").unwrap();

        let record = write_record(
            dir.path(),
            serde_json::json!([episode_json("Alpha", "a.mp3", 1)]),
        );

        let toolchain = RecordingToolchain::default();
        publish(
            &toolchain,
            &record,
            &out,
            &options(dir.path()),
            &NoopReporter::shared(),
        )
        .unwrap();

        let audio = out.join("mp3/1_2024_03_05_Alpha.mp3");
        let cover = out.join("covers/1_2024_03_05_Alpha.jpg");
        let mtime = |p: &Path| -> SystemTime { fs::metadata(p).unwrap().modified().unwrap() };
        let (audio_before, cover_before) = (mtime(&audio), mtime(&cover));
        let calls_before = toolchain.call_names().len();

        publish(
            &toolchain,
            &record,
            &out,
            &options(dir.path()),
            &NoopReporter::shared(),
        )
        .unwrap();

        assert_eq!(mtime(&audio), audio_before);
        assert_eq!(mtime(&cover), cover_before);
        // the rerun probes again but runs no render tool
        assert_eq!(
            toolchain.call_names().len(),
            calls_before + 1,
            "expected exactly one extra probe call"
        );
    }

    #[test]
    fn force_regenerates_existing_artifacts() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.mp3"), b"audio").unwrap();

        let record = write_record(
            dir.path(),
            serde_json::json!([episode_json("Alpha", "a.mp3", 1)]),
        );

        let toolchain = RecordingToolchain::default();
        publish(
            &toolchain,
            &record,
            &out,
            &options(dir.path()),
            &NoopReporter::shared(),
        )
        .unwrap();

        let audio = out.join("mp3/1_2024_03_05_Alpha.mp3");
        fs::write(&audio, b"stale").unwrap();

        let opts = PublishOptions {
            force: true,
            ..options(dir.path())
        };
        publish(&toolchain, &record, &out, &opts, &NoopReporter::shared()).unwrap();

        assert_eq!(fs::read(&audio).unwrap(), b"audio");
    }

    #[test]
    fn failing_render_tool_aborts_the_run() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.mp3"), b"audio").unwrap();

        let record = write_record(
            dir.path(),
            serde_json::json!([episode_json("Alpha", "a.mp3", 1)]),
        );

        let toolchain = RecordingToolchain {
            fail_composite: true,
            ..Default::default()
        };
        let result = publish(
            &toolchain,
            &record,
            &out,
            &options(dir.path()),
            &NoopReporter::shared(),
        );

        assert!(result.is_err());
        assert!(!out.join("covers/1_2024_03_05_Alpha.jpg").exists());
        // the feed is never written on an aborted run
        assert!(!out.join(feed::FEED_FILENAME).exists());
    }

    #[test]
    fn missing_record_file_fails() {
        let dir = tempdir().unwrap();
        let toolchain = RecordingToolchain::default();
        let result = publish(
            &toolchain,
            &dir.path().join("absent.json"),
            &dir.path().join("out"),
            &options(dir.path()),
            &NoopReporter::shared(),
        );
        assert!(matches!(result, Err(PublishError::Record(_))));
    }
}
