use std::path::Path;

use crate::error::PublishError;
use crate::progress::{ReportEvent, SharedReporter};
use crate::record::{CoverImage, Edit};
use crate::resolve::{Placeholders, ResolvedEpisode, expand};
use crate::toolchain::{CompositeOp, MediaToolchain};

use super::{discard, ensure_parent, finalize, partial_path};

const DEFAULT_SIZE: u32 = 72;
const DEFAULT_FILL: &str = "white";
const DEFAULT_GRAVITY: &str = "south";
const DEFAULT_OFFSET: &str = "+0+0";

/// Expand one cover definition's edit list into compositing directives.
/// Annotate text sees `episode_no` and `title`, where `title` honors the
/// episode's per-cover override.
fn build_ops(
    name: &str,
    definition: &CoverImage,
    episode: &ResolvedEpisode,
) -> Result<Vec<CompositeOp>, PublishError> {
    let title = episode
        .record
        .cover_titles
        .get(name)
        .unwrap_or(&episode.record.title);
    let vars = Placeholders::new()
        .set("episode_no", episode.number.unwrap_or(0).to_string())
        .set("title", title.clone());

    let mut ops = Vec::with_capacity(definition.edits.len());
    for edit in &definition.edits {
        match edit {
            Edit::Annotate(a) => ops.push(CompositeOp::Annotate {
                text: expand(&a.text, &vars)?,
                font: a.font.clone(),
                size: a.size.unwrap_or(DEFAULT_SIZE),
                fill: a.fill.clone().unwrap_or_else(|| DEFAULT_FILL.to_string()),
                outline: a.outline.clone(),
                gravity: a
                    .gravity
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GRAVITY.to_string()),
                offset: a
                    .offset
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OFFSET.to_string()),
            }),
            Edit::Scale(s) => ops.push(CompositeOp::Scale {
                geometry: s.geometry.clone(),
                quality: s.quality,
            }),
        }
    }

    Ok(ops)
}

/// Composite one named cover art for one episode.
///
/// Skips when the destination exists and force is not set. The result is
/// written to a partial sibling first and moved into place on success; a
/// compositing failure removes the partial before propagating.
#[allow(clippy::too_many_arguments)]
pub fn render_cover(
    toolchain: &dyn MediaToolchain,
    name: &str,
    definition: &CoverImage,
    base_dir: &Path,
    episode: &ResolvedEpisode,
    dest: &Path,
    force: bool,
    reporter: &SharedReporter,
) -> Result<bool, PublishError> {
    if dest.exists() && !force {
        reporter.report(ReportEvent::ArtifactSkipped {
            path: dest.to_path_buf(),
        });
        return Ok(false);
    }

    let ops = build_ops(name, definition, episode)?;
    let source = base_dir.join(&definition.source);

    ensure_parent(dest)?;
    let partial = partial_path(dest);

    if let Err(e) = toolchain.composite(&source, &ops, &partial) {
        discard(&partial);
        return Err(e.into());
    }

    finalize(&partial, dest)?;

    reporter.report(ReportEvent::CoverRendered {
        episode: episode.record.title.clone(),
        name: name.to_string(),
        path: dest.to_path_buf(),
    });

    Ok(true)
}
