use thiserror::Error;

const ERROR_PUBLISH: &str = "aggregator_publish_failed";

/// Errors surfaced while handling one init/partial message or one sweep tick
/// (spec.md §4.5, §7).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Publish(#[from] broker::Error),
}

impl Error {
    pub fn to_error_tag(&self) -> &'static str {
        match self {
            Error::Publish(_) => ERROR_PUBLISH,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
