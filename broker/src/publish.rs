use amqprs::channel::{BasicPublishArguments, Channel};
use amqprs::BasicProperties;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Publishes `body` to `queue` on the default exchange, JSON-encoded, with
/// persistent delivery and the given correlation id and optional reply-to
/// (spec.md §4.1, §6).
pub async fn publish_json<T: Serialize>(
    channel: &Channel,
    queue: &str,
    correlation_id: &str,
    reply_to: Option<&str>,
    body: &T,
) -> Result<()> {
    let content = serde_json::to_vec(body).map_err(Error::Decode)?;

    let mut builder = BasicProperties::builder()
        .content_type("application/json")
        .delivery_mode(2) // persistent
        .correlation_id(correlation_id);
    if let Some(reply_to) = reply_to {
        builder = builder.reply_to(reply_to);
    }
    let props = builder.finish();

    let args = BasicPublishArguments::new("", queue);
    channel
        .basic_publish(props, content, args)
        .await
        .map_err(|source| Error::Publish { queue: queue.to_owned(), source })?;

    debug!(queue, correlation_id, "published message");
    Ok(())
}
