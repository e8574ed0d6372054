use thiserror::Error;

const ERROR_CONNECT: &str = "broker_connect_failed";
const ERROR_CHANNEL: &str = "broker_channel_failed";
const ERROR_DECLARE: &str = "broker_declare_failed";
const ERROR_PUBLISH: &str = "broker_publish_failed";
const ERROR_CONSUME: &str = "broker_consume_failed";
const ERROR_DECODE: &str = "broker_decode_failed";

/// Errors surfaced by the broker binding.
///
/// Every variant maps to a stable metrics tag via [`Error::to_error_tag`],
/// matching the teacher's `lgn-worker::Error` shape.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to broker at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: amqprs::error::Error,
    },

    #[error("failed to open a channel: {0}")]
    Channel(#[source] amqprs::error::Error),

    #[error("failed to declare queue {queue}: {source}")]
    Declare {
        queue: String,
        #[source]
        source: amqprs::error::Error,
    },

    #[error("failed to publish to {queue}: {source}")]
    Publish {
        queue: String,
        #[source]
        source: amqprs::error::Error,
    },

    #[error("failed to start consuming from {queue}: {source}")]
    Consume {
        queue: String,
        #[source]
        source: amqprs::error::Error,
    },

    #[error("failed to decode message body as JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Returns an error tag, suitable for use in metrics.
    pub fn to_error_tag(&self) -> &'static str {
        match self {
            Error::Connect { .. } => ERROR_CONNECT,
            Error::Channel(_) => ERROR_CHANNEL,
            Error::Declare { .. } => ERROR_DECLARE,
            Error::Publish { .. } => ERROR_PUBLISH,
            Error::Consume { .. } => ERROR_CONSUME,
            Error::Decode(_) => ERROR_DECODE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
