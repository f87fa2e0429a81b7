use std::path::PathBuf;
use std::sync::Arc;

/// Why an episode was excluded from rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Source audio could not be located
    NoSource,
    /// Episode is marked hidden
    Hidden,
    /// Publish date lies after the run's wall-clock start
    FutureDated,
}

/// Events emitted during a publish run for diagnostics and progress output
#[derive(Debug, Clone)]
pub enum ReportEvent {
    /// Metadata record has been loaded and parsed
    RecordLoaded {
        path: PathBuf,
        episode_count: usize,
    },

    /// Missing GUIDs were minted and persisted back into the record
    GuidsMinted { count: usize },

    /// An episode's source audio was not found; it degrades to placeholder
    /// metadata and continues (warning)
    SourceMissing { episode: String, filename: String },

    /// An episode finished resolution
    EpisodeResolved {
        episode: String,
        number: Option<u32>,
        stem: String,
    },

    /// An episode was excluded from rendering entirely
    RenderSkipped {
        episode: String,
        reason: SkipReason,
    },

    /// A single artifact already exists and force-rerender is not set
    ArtifactSkipped { path: PathBuf },

    /// A cover art variant was composited
    CoverRendered {
        episode: String,
        name: String,
        path: PathBuf,
    },

    /// The tagged audio file was produced
    AudioRendered { episode: String, path: PathBuf },

    /// The video rendition was muxed
    VideoRendered { episode: String, path: PathBuf },

    /// Video was skipped because its background cover art is absent (warning)
    VideoBackgroundMissing { episode: String, cover: String },

    /// An episode has no GUID and was left out of the feed (warning)
    MissingGuid { episode: String },

    /// The feed document was serialized
    FeedWritten { path: PathBuf, item_count: usize },

    /// A declared template artifact was expanded
    TemplateRendered { path: PathBuf },

    /// The whole run finished
    PublishCompleted {
        rendered_count: usize,
        skipped_count: usize,
        feed_item_count: usize,
    },
}

/// Trait for reporting publish events.
///
/// Implementations can print colored terminal output, collect statistics,
/// or stay silent.
pub trait Reporter: Send + Sync {
    /// Report a publish event
    fn report(&self, event: ReportEvent);
}

/// A shared reference to a reporter
pub type SharedReporter = Arc<dyn Reporter>;

/// A no-op reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, _event: ReportEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedReporter {
        Arc::new(Self)
    }
}
