// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;
use std::path::Path;

use minijinja::{Environment, context};
use serde::Serialize;

use crate::error::{PublishError, TemplateError};
use crate::progress::{ReportEvent, SharedReporter};
use crate::record::{ShowMeta, TemplateScope, TemplateSpec};
use crate::resolve::{Placeholders, ResolvedEpisode, ShowVars, expand};

/// Show-level values exposed to user templates
#[derive(Debug, Serialize)]
pub struct ShowView {
    pub title: String,
    pub description: String,
    pub authors: String,
    pub email: String,
    pub website: String,
    pub feed_uri: String,
    pub cover_image: String,
    pub language: String,
}

impl ShowView {
    pub fn new(meta: &ShowMeta, vars: &ShowVars) -> Self {
        ShowView {
            title: meta.title.clone(),
            description: meta.description.clone(),
            authors: vars.authors.clone(),
            email: meta.email.clone(),
            website: meta.remote_uri.website.clone(),
            feed_uri: meta.remote_uri.rss_feed.clone(),
            cover_image: meta.remote_uri.cover_image.clone(),
            language: meta.language.clone(),
        }
    }
}

/// Per-episode values exposed to user templates
#[derive(Debug, Serialize)]
pub struct EpisodeView {
    pub title: String,
    pub description: String,
    pub subtitle: String,
    pub number: Option<u32>,
    pub recdate: String,
    pub pubdate: String,
    pub duration: String,
    pub duration_secs: f64,
    pub size_bytes: u64,
    pub audio_uri: String,
    pub cover_uris: BTreeMap<String, String>,
    pub video_uri: Option<String>,
    pub guid: Option<String>,
    pub stem: String,
    pub has_audio: bool,
    pub hidden: bool,
    pub rendered: bool,
}

impl EpisodeView {
    pub fn new(episode: &ResolvedEpisode) -> Self {
        EpisodeView {
            title: episode.record.title.clone(),
            description: episode.record.description.clone(),
            subtitle: episode.record.subtitle().to_string(),
            number: episode.number,
            recdate: episode.recdate.format("%Y-%m-%d").to_string(),
            pubdate: episode.pubdate.format("%Y-%m-%d").to_string(),
            duration: episode.duration.clone(),
            duration_secs: episode.info.duration_secs,
            size_bytes: episode.info.size_bytes,
            audio_uri: episode.audio_uri.clone(),
            cover_uris: episode.cover_uris.clone(),
            video_uri: episode.video_uri.clone(),
            guid: episode.record.guid.clone(),
            stem: episode.stem.clone(),
            has_audio: episode.has_audio(),
            hidden: episode.record.hidden,
            rendered: episode.rendered,
        }
    }
}

fn read_template(base_dir: &Path, spec: &TemplateSpec) -> Result<String, TemplateError> {
    let path = base_dir.join(&spec.source);
    std::fs::read_to_string(&path).map_err(|e| TemplateError::ReadFailed { path, source: e })
}

fn write_output(dest: &Path, body: &str) -> Result<(), TemplateError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TemplateError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(dest, body).map_err(|e| TemplateError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// Expand every declared template artifact.
///
/// Show-scoped templates render once over the show and the full episode set;
/// episode-scoped templates render once per episode with that episode bound
/// into the context. Runs after rendering so the `rendered` flags are final.
pub fn expand_templates(
    meta: &ShowMeta,
    vars: &ShowVars,
    episodes: &[ResolvedEpisode],
    base_dir: &Path,
    output_dir: &Path,
    reporter: &SharedReporter,
) -> Result<(), PublishError> {
    if meta.templates.is_empty() {
        return Ok(());
    }

    let env = Environment::new();
    let show = ShowView::new(meta, vars);
    let all: Vec<EpisodeView> = episodes.iter().map(EpisodeView::new).collect();
    let rendered: Vec<&EpisodeView> = all.iter().filter(|e| e.rendered).collect();

    for spec in &meta.templates {
        let body = read_template(base_dir, spec)?;

        match spec.scope {
            TemplateScope::Show => {
                let dest = output_dir.join(expand(&spec.destination, &Placeholders::new())?);
                let output = env
                    .render_str(
                        &body,
                        context! {
                            show => show,
                            episodes => all,
                            rendered_episodes => rendered,
                        },
                    )
                    .map_err(|e| TemplateError::RenderFailed {
                        path: base_dir.join(&spec.source),
                        source: e,
                    })?;
                write_output(&dest, &output)?;
                reporter.report(ReportEvent::TemplateRendered {
                    path: dest.clone(),
                });
            }
            TemplateScope::Episode => {
                for (episode, view) in episodes.iter().zip(&all) {
                    let dest =
                        output_dir.join(expand(&spec.destination, &episode.placeholders)?);
                    let page_uri = spec
                        .uri
                        .as_ref()
                        .map(|uri| expand(uri, &episode.placeholders))
                        .transpose()?;
                    let output = env
                        .render_str(
                            &body,
                            context! {
                                show => show,
                                episode => view,
                                page_uri => page_uri,
                                episodes => all,
                                rendered_episodes => rendered,
                            },
                        )
                        .map_err(|e| TemplateError::RenderFailed {
                            path: base_dir.join(&spec.source),
                            source: e,
                        })?;
                    write_output(&dest, &output)?;
                    reporter.report(ReportEvent::TemplateRendered {
                        path: dest.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}
