use thiserror::Error;

const ERROR_DECODE: &str = "dispatcher_base64_decode_failed";
const ERROR_SLICE: &str = "dispatcher_slice_failed";
const ERROR_PUBLISH: &str = "dispatcher_publish_failed";

/// Errors surfaced while dispatching one upload (spec.md §4.3, §7).
///
/// Persistence failures are deliberately absent: spec.md §4.3/§9 calls them
/// best-effort, so [`crate::persist::persist_best_effort`] swallows them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to base64-decode upload content for {filename}: {source}")]
    Decode {
        filename: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("failed to slice document {filename}: {source}")]
    Slice {
        filename: String,
        #[source]
        source: slicer::Error,
    },

    #[error(transparent)]
    Publish(#[from] broker::Error),
}

impl Error {
    pub fn to_error_tag(&self) -> &'static str {
        match self {
            Error::Decode { .. } => ERROR_DECODE,
            Error::Slice { .. } => ERROR_SLICE,
            Error::Publish(_) => ERROR_PUBLISH,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
