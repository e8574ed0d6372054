use thiserror::Error;
use warp::reject::Reject;

const ERROR_EMPTY_UPLOAD: &str = "gateway_empty_upload";
const ERROR_MULTIPART: &str = "gateway_multipart_read_failed";
const ERROR_BROKER: &str = "gateway_broker_failed";
const ERROR_TIMEOUT: &str = "gateway_response_timeout";

/// Errors surfaced while handling one upload request (spec.md §4.6, §7).
///
/// Implements [`Reject`] so a single `warp::reject::custom` path carries it
/// through to the rejection handler in [`crate::routes`], which maps each
/// variant to the status code spec.md §6/§7 prescribes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("upload body is empty")]
    EmptyUpload,

    #[error("failed to read multipart body: {0}")]
    Multipart(#[source] warp::Error),

    #[error(transparent)]
    Broker(#[from] broker::Error),

    #[error("aggregation did not complete within the configured deadline")]
    Timeout,
}

impl Error {
    pub fn to_error_tag(&self) -> &'static str {
        match self {
            Error::EmptyUpload => ERROR_EMPTY_UPLOAD,
            Error::Multipart(_) => ERROR_MULTIPART,
            Error::Broker(_) => ERROR_BROKER,
            Error::Timeout => ERROR_TIMEOUT,
        }
    }

    /// The HTTP status this error maps to (spec.md §6: 400 on empty body,
    /// 504 on aggregation timeout; everything else surfaces as 502 per
    /// spec.md §7 "any non-200 from the internal path becomes 502/504").
    pub fn status(&self) -> warp::http::StatusCode {
        match self {
            Error::EmptyUpload => warp::http::StatusCode::BAD_REQUEST,
            Error::Timeout => warp::http::StatusCode::GATEWAY_TIMEOUT,
            Error::Multipart(_) | Error::Broker(_) => warp::http::StatusCode::BAD_GATEWAY,
        }
    }
}

impl Reject for Error {}

pub type Result<T> = std::result::Result<T, Error>;
