pub mod error;
pub mod feed;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod render;
pub mod resolve;
pub mod templates;
pub mod toolchain;

// Re-export main types for convenience
pub use error::{
    ConfigError, FeedError, PublishError, RecordError, RenderError, TemplateError,
};
pub use pipeline::{PublishOptions, PublishResult, publish};
pub use progress::{NoopReporter, ReportEvent, Reporter, SharedReporter, SkipReason};
pub use record::{EpisodeRecord, RecordDocument, ShowMeta, ShowRecord};
pub use resolve::{ResolvedEpisode, ShowVars};
pub use toolchain::{AudioInfo, CommandToolchain, MediaToolchain, TagSet};
