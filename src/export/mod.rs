//! Comment record assembly and output.
//!
//! Each eligible review thread becomes one [`CommentRecord`]. Records are
//! streamed into a [`RecordSink`], either JSON Lines (the default, flushed
//! per record) or a single pretty-printed JSON array, in a file named after
//! the repository.

mod error;
mod model;
mod output;
mod sink;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::SinkError;
pub use model::{
    CommentRecord, EligibleThread, OutputFormat, PullRequestContext, SkipReason, ThreadMessage,
};
pub use output::{open_sink, output_path};
pub use sink::{JsonArraySink, JsonlSink, RecordSink};
