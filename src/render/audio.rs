use std::path::Path;

use crate::error::{PublishError, RenderError};
use crate::progress::{ReportEvent, SharedReporter};
use crate::toolchain::{MediaToolchain, TagSet};

use super::{discard, ensure_parent, finalize, partial_path};

/// Produce the tagged episode audio: copy the source byte-for-byte, strip
/// all existing tag metadata, then write the fresh tag set.
///
/// Skips when the destination exists and force is not set. All work happens
/// on a partial sibling moved into place at the end, so the destination is
/// never left half-copied or tagged-but-wrong.
pub fn render_audio(
    toolchain: &dyn MediaToolchain,
    source: &Path,
    dest: &Path,
    tags: &TagSet,
    force: bool,
    episode_title: &str,
    reporter: &SharedReporter,
) -> Result<bool, PublishError> {
    if dest.exists() && !force {
        reporter.report(ReportEvent::ArtifactSkipped {
            path: dest.to_path_buf(),
        });
        return Ok(false);
    }

    ensure_parent(dest)?;
    let partial = partial_path(dest);

    if let Err(e) = std::fs::copy(source, &partial) {
        discard(&partial);
        return Err(RenderError::CopyFailed {
            from: source.to_path_buf(),
            to: partial,
            source: e,
        }
        .into());
    }

    let tagged = toolchain
        .strip_tags(&partial)
        .and_then(|()| toolchain.write_tags(&partial, tags));
    if let Err(e) = tagged {
        discard(&partial);
        return Err(e.into());
    }

    finalize(&partial, dest)?;

    reporter.report(ReportEvent::AudioRendered {
        episode: episode_title.to_string(),
        path: dest.to_path_buf(),
    });

    Ok(true)
}
