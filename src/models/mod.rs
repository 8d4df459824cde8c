pub mod source;
pub mod video;

pub use source::{ApiSource, SourceKind};
pub use video::{QueryResult, VideoItem};
