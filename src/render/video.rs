use std::path::Path;

use crate::error::PublishError;
use crate::progress::{ReportEvent, SharedReporter};
use crate::toolchain::MediaToolchain;

use super::{discard, ensure_parent, finalize, partial_path};

/// Mux the still-image video rendition: the cover art looped as the video
/// stream, the tagged audio copied unmodified.
///
/// Skips when the destination exists and force is not set; a failed encode
/// removes the partial output before propagating.
pub fn render_video(
    toolchain: &dyn MediaToolchain,
    still: &Path,
    audio: &Path,
    dest: &Path,
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

    if let Err(e) = toolchain.mux(still, audio, &partial) {
        discard(&partial);
        return Err(e.into());
    }

    finalize(&partial, dest)?;

    reporter.report(ReportEvent::VideoRendered {
        episode: episode_title.to_string(),
        path: dest.to_path_buf(),
    });

    Ok(true)
}
