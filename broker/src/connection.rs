use amqprs::callbacks::{DefaultChannelCallback, DefaultConnectionCallback};
use amqprs::channel::{Channel, QueueDeclareArguments};
use amqprs::connection::{Connection, OpenConnectionArguments};
use tracing::info;

use crate::config::BrokerConfig;
use crate::error::{Error, Result};

/// Opens a connection to the broker.
///
/// Registers the library's default callback handlers, which log connection
/// and channel level events (close, blocked/unblocked, cancel) and drive the
/// client's own reconnection-on-drop behavior. This is the "robust
/// connection" of spec.md §4.1: reconnection is handled by reopening a fresh
/// [`Connection`]/[`Channel`] pair from the caller's retry loop rather than
/// by a custom backoff (spec.md §4.1, §7 "no custom retry/backoff").
pub async fn connect(config: &BrokerConfig) -> Result<Connection> {
    let args = OpenConnectionArguments::try_from(config.url.as_str())
        .map_err(|source| Error::Connect { url: config.url.clone(), source })?;

    let connection = Connection::open(&args)
        .await
        .map_err(|source| Error::Connect { url: config.url.clone(), source })?;

    connection
        .register_callback(DefaultConnectionCallback)
        .await
        .map_err(Error::Channel)?;

    info!(url = %config.url, "connected to broker");
    Ok(connection)
}

/// Opens a channel with the configured prefetch bound and the default
/// callback handler registered.
pub async fn open_channel(connection: &Connection, prefetch: u16) -> Result<Channel> {
    let channel = connection.open_channel(None).await.map_err(Error::Channel)?;
    channel.register_callback(DefaultChannelCallback).await.map_err(Error::Channel)?;
    channel
        .basic_qos(amqprs::channel::BasicQosArguments::new(0, prefetch, false))
        .await
        .map_err(Error::Channel)?;
    Ok(channel)
}

/// Declares a durable, non-exclusive, non-auto-delete queue (spec.md §4.1/§6:
/// every work/result/aggregation queue is durable).
pub async fn declare_durable_queue(channel: &Channel, name: &str) -> Result<()> {
    let args = QueueDeclareArguments::new(name).durable(true).finish();
    channel
        .queue_declare(args)
        .await
        .map_err(|source| Error::Declare { queue: name.to_owned(), source })?;
    Ok(())
}

/// Declares an exclusive, auto-deleted, non-durable reply queue with a
/// server-assigned name, returning that name. Used by the gateway for one
/// task's round trip (spec.md §4.6, glossary "Reply queue").
pub async fn declare_reply_queue(channel: &Channel) -> Result<String> {
    let args = QueueDeclareArguments::default().exclusive(true).auto_delete(true).finish();
    let (name, _message_count, _consumer_count) = channel
        .queue_declare(args)
        .await
        .map_err(|source| Error::Declare { queue: "<reply>".to_owned(), source })?
        .expect("server must return queue info for a queue_declare without no-wait");
    Ok(name)
}
