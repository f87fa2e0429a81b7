// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::error::RenderError;

/// Container-level audio metadata, as reported by probing the file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub duration_secs: f64,
    pub size_bytes: u64,
}

impl AudioInfo {
    /// The nominal metadata substituted when an episode's source audio
    /// cannot be located, so feed and templates can still render
    pub fn placeholder() -> Self {
        Self {
            duration_secs: 0.0,
            size_bytes: 0,
        }
    }
}

/// One directive of an accumulated compositing invocation
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeOp {
    /// Draw text (already fully expanded, no placeholders left)
    Annotate {
        text: String,
        font: Option<String>,
        size: u32,
        fill: String,
        outline: Option<String>,
        gravity: String,
        offset: String,
    },
    /// Resize, optionally re-quality
    Scale {
        geometry: String,
        quality: Option<u32>,
    },
}

/// The full tag set written to an episode's audio file
#[derive(Debug, Clone, PartialEq)]
pub struct TagSet {
    pub author: String,
    pub album: String,
    pub title: String,
    pub track: Option<u32>,
    pub genre: String,
    pub year: i32,
    pub comment: String,
    pub comment_language: String,
    pub uri: Option<String>,
    pub cover_image: Option<std::path::PathBuf>,
}

/// The external media tools the render actions depend on, modeled as one
/// injected capability so the pipeline can be tested without invoking real
/// binaries.
pub trait MediaToolchain: Send + Sync {
    /// Return duration and size metadata for an audio file
    fn probe(&self, path: &Path) -> Result<AudioInfo, RenderError>;

    /// Remove all existing tag metadata from an audio file
    fn strip_tags(&self, path: &Path) -> Result<(), RenderError>;

    /// Write a fresh tag set to an audio file
    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), RenderError>;

    /// Apply an ordered list of edits to a source image, writing the result
    /// to `dest`
    fn composite(&self, source: &Path, ops: &[CompositeOp], dest: &Path)
    -> Result<(), RenderError>;

    /// Combine a looped still image with an audio track (stream copied, not
    /// re-encoded) into a video container at `dest`
    fn mux(&self, still: &Path, audio: &Path, dest: &Path) -> Result<(), RenderError>;
}

/// Default toolchain shelling out to ffprobe, eyeD3, ImageMagick convert and
/// ffmpeg
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandToolchain;

impl CommandToolchain {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: String,
    size: String,
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Run a tool to completion, mapping launch failures and nonzero exits
fn run(tool: &str, args: &[String]) -> Result<Vec<u8>, RenderError> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| RenderError::ToolLaunchFailed {
            tool: tool.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(RenderError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Build the convert argument vector for one accumulated compositing call
fn composite_args(source: &Path, ops: &[CompositeOp], dest: &Path) -> Vec<String> {
    let mut args = vec![path_arg(source)];

    for op in ops {
        match op {
            CompositeOp::Annotate {
                text,
                font,
                size,
                fill,
                outline,
                gravity,
                offset,
            } => {
                args.extend(["-gravity".to_string(), gravity.clone()]);
                if let Some(font) = font {
                    args.extend(["-font".to_string(), font.clone()]);
                }
                args.extend(["-pointsize".to_string(), size.to_string()]);
                args.extend(["-fill".to_string(), fill.clone()]);
                if let Some(outline) = outline {
                    args.extend([
                        "-stroke".to_string(),
                        outline.clone(),
                        "-strokewidth".to_string(),
                        "2".to_string(),
                    ]);
                }
                args.extend(["-annotate".to_string(), offset.clone(), text.clone()]);
            }
            CompositeOp::Scale { geometry, quality } => {
                args.extend(["-resize".to_string(), geometry.clone()]);
                if let Some(quality) = quality {
                    args.extend(["-quality".to_string(), quality.to_string()]);
                }
            }
        }
    }

    args.push(path_arg(dest));
    args
}

/// Build the eyeD3 argument vector for one tag-writing call
fn tag_args(path: &Path, tags: &TagSet) -> Vec<String> {
    let mut args = vec![
        "-a".to_string(),
        tags.author.clone(),
        "-A".to_string(),
        tags.album.clone(),
        "-t".to_string(),
        tags.title.clone(),
    ];
    if let Some(track) = tags.track {
        args.extend(["-n".to_string(), track.to_string()]);
    }
    args.extend([
        "-G".to_string(),
        tags.genre.clone(),
        "-Y".to_string(),
        tags.year.to_string(),
        "--add-comment".to_string(),
        format!("{}:comment:{}", tags.comment, tags.comment_language),
    ]);
    if let Some(uri) = &tags.uri {
        args.extend(["--url-frame".to_string(), format!("WOAS:{uri}")]);
    }
    if let Some(cover) = &tags.cover_image {
        args.extend([
            "--add-image".to_string(),
            format!("{}:FRONT_COVER", cover.display()),
        ]);
    }
    args.push(path_arg(path));
    args
}

/// Build the ffmpeg argument vector for a still-image video mux
fn mux_args(still: &Path, audio: &Path, dest: &Path) -> Vec<String> {
    vec![
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        path_arg(still),
        "-i".to_string(),
        path_arg(audio),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-tune".to_string(),
        "stillimage".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "copy".to_string(),
        "-shortest".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
        path_arg(dest),
    ]
}

impl MediaToolchain for CommandToolchain {
    fn probe(&self, path: &Path) -> Result<AudioInfo, RenderError> {
        let args = vec![
            "-loglevel".to_string(),
            "0".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            path_arg(path),
        ];
        let stdout = run("ffprobe", &args)?;

        let parsed: ProbeOutput =
            serde_json::from_slice(&stdout).map_err(|e| RenderError::ProbeFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let duration_secs =
            parsed
                .format
                .duration
                .parse()
                .map_err(|_| RenderError::ProbeFailed {
                    path: path.to_path_buf(),
                    message: format!("unparsable duration '{}'", parsed.format.duration),
                })?;
        let size_bytes = parsed
            .format
            .size
            .parse()
            .map_err(|_| RenderError::ProbeFailed {
                path: path.to_path_buf(),
                message: format!("unparsable size '{}'", parsed.format.size),
            })?;

        Ok(AudioInfo {
            duration_secs,
            size_bytes,
        })
    }

    fn strip_tags(&self, path: &Path) -> Result<(), RenderError> {
        run("eyeD3", &["--remove-all".to_string(), path_arg(path)])?;
        Ok(())
    }

    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), RenderError> {
        run("eyeD3", &tag_args(path, tags))?;
        Ok(())
    }

    fn composite(
        &self,
        source: &Path,
        ops: &[CompositeOp],
        dest: &Path,
    ) -> Result<(), RenderError> {
        run("convert", &composite_args(source, ops, dest))?;
        Ok(())
    }

    fn mux(&self, still: &Path, audio: &Path, dest: &Path) -> Result<(), RenderError> {
        run("ffmpeg", &mux_args(still, audio, dest))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn composite_args_accumulate_in_edit_order() {
        let ops = vec![
            CompositeOp::Annotate {
                text: "Episode 3".to_string(),
                font: Some("DejaVu-Sans".to_string()),
                size: 72,
                fill: "white".to_string(),
                outline: Some("black".to_string()),
                gravity: "south".to_string(),
                offset: "+0+40".to_string(),
            },
            CompositeOp::Scale {
                geometry: "1400x1400".to_string(),
                quality: Some(90),
            },
        ];

        let args = composite_args(Path::new("base.png"), &ops, Path::new("out.jpg"));

        assert_eq!(args.first().unwrap(), "base.png");
        assert_eq!(args.last().unwrap(), "out.jpg");

        let annotate = args.iter().position(|a| a == "-annotate").unwrap();
        assert_eq!(args[annotate + 1], "+0+40");
        assert_eq!(args[annotate + 2], "Episode 3");

        let resize = args.iter().position(|a| a == "-resize").unwrap();
        assert!(resize > annotate);
        assert_eq!(args[resize + 1], "1400x1400");
        assert!(args.contains(&"-stroke".to_string()));
        assert!(args.contains(&"-quality".to_string()));
    }

    #[test]
    fn composite_args_skip_absent_options() {
        let ops = vec![CompositeOp::Annotate {
            text: "x".to_string(),
            font: None,
            size: 48,
            fill: "white".to_string(),
            outline: None,
            gravity: "south".to_string(),
            offset: "+0+0".to_string(),
        }];

        let args = composite_args(Path::new("a.png"), &ops, Path::new("b.jpg"));
        assert!(!args.contains(&"-font".to_string()));
        assert!(!args.contains(&"-stroke".to_string()));
    }

    fn make_tags() -> TagSet {
        TagSet {
            author: "Alice, Bob".to_string(),
            album: "Null Pointer".to_string(),
            title: "Pilot".to_string(),
            track: Some(3),
            genre: "podcast".to_string(),
            year: 2024,
            comment: "The first one".to_string(),
            comment_language: "eng".to_string(),
            uri: Some("https://cdn.example.com/mp3/ep.mp3".to_string()),
            cover_image: Some(PathBuf::from("covers/ep.jpg")),
        }
    }

    #[test]
    fn tag_args_cover_the_full_tag_set() {
        let args = tag_args(Path::new("ep.mp3"), &make_tags());

        let flag_value = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };

        assert_eq!(flag_value("-a"), "Alice, Bob");
        assert_eq!(flag_value("-A"), "Null Pointer");
        assert_eq!(flag_value("-t"), "Pilot");
        assert_eq!(flag_value("-n"), "3");
        assert_eq!(flag_value("-G"), "podcast");
        assert_eq!(flag_value("-Y"), "2024");
        assert_eq!(flag_value("--add-comment"), "The first one:comment:eng");
        assert_eq!(
            flag_value("--url-frame"),
            "WOAS:https://cdn.example.com/mp3/ep.mp3"
        );
        assert_eq!(flag_value("--add-image"), "covers/ep.jpg:FRONT_COVER");
        assert_eq!(args.last().unwrap(), "ep.mp3");
    }

    #[test]
    fn tag_args_omit_track_uri_and_image_when_absent() {
        let tags = TagSet {
            track: None,
            uri: None,
            cover_image: None,
            ..make_tags()
        };
        let args = tag_args(Path::new("ep.mp3"), &tags);

        assert!(!args.contains(&"-n".to_string()));
        assert!(!args.contains(&"--url-frame".to_string()));
        assert!(!args.contains(&"--add-image".to_string()));
    }

    #[test]
    fn mux_args_copy_audio_and_loop_still() {
        let args = mux_args(
            Path::new("cover.jpg"),
            Path::new("ep.mp3"),
            Path::new("ep.partial.mp4"),
        );

        let copy = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(args[copy + 1], "copy");
        assert!(args.contains(&"-loop".to_string()));
        assert_eq!(args.last().unwrap(), "ep.partial.mp4");
    }

    #[test]
    fn placeholder_info_is_zeroed() {
        let info = AudioInfo::placeholder();
        assert_eq!(info.duration_secs, 0.0);
        assert_eq!(info.size_bytes, 0);
    }
}
