use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors in the show definition itself. These abort the run before
/// any artifact is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown language tag '{tag}': no ISO 639-2 mapping")]
    UnknownLanguage { tag: String },

    #[error("Episode '{episode}' has an invalid {field} '{value}' (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate {
        episode: String,
        field: &'static str,
        value: String,
    },

    #[error("Unknown placeholder '{{{name}}}' in template '{template}'")]
    UnknownPlaceholder { name: String, template: String },

    #[error("Unclosed placeholder in template '{template}'")]
    UnclosedPlaceholder { template: String },

    #[error("'{referrer}' references undeclared cover image '{name}'")]
    UnknownCoverImage { referrer: String, name: String },

    #[error("Failed to search directory {path}: {source}")]
    SearchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading or rewriting the metadata record
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read metadata record {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata record {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed metadata record {path}: {reason}")]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("Failed to write metadata record {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metadata record: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// Errors during a render action (cover art, audio tagging, video muxing).
/// Any partially-written destination artifact is removed before one of these
/// propagates.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to probe {path}: {message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("Failed to launch '{tool}': {source}")]
    ToolLaunchFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {path} into place: {source}")]
    FinalizeFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while assembling or writing the RSS feed document
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to serialize feed XML: {0}")]
    Xml(#[from] rss::Error),

    #[error("Failed to write feed to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while expanding user-declared template artifacts
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {path}: {source}")]
    RenderFailed {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to write template output {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level errors for a publish run
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}
