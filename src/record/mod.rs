mod document;
mod episode;
mod show;

pub use document::RecordDocument;
pub use episode::EpisodeRecord;
pub use show::{
    Annotate, CoverImage, Edit, RemoteUri, Scale, ShowMeta, ShowRecord, TemplateScope,
    TemplateSpec, VideoSpec,
};
