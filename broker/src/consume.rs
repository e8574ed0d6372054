use std::future::Future;
use std::sync::Arc;

use amqprs::channel::{BasicAckArguments, BasicConsumeArguments, BasicRejectArguments, Channel};
use amqprs::consumer::AsyncConsumer;
use amqprs::{BasicProperties, Deliver};
use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, warn};

use crate::error::{Error, Result};

/// A delivery relayed from the consumer callback to the processing loop,
/// carrying just what a handler needs: the decoded correlation metadata and
/// raw body.
struct RawDelivery {
    delivery_tag: u64,
    correlation_id: Option<String>,
    reply_to: Option<String>,
    content: Vec<u8>,
}

/// Forwards every delivery over an mpsc channel rather than processing it
/// inline, so the consumer callback (which amqprs drives from its own
/// connection I/O task) never blocks on handler latency.
struct Relay {
    sender: mpsc::Sender<RawDelivery>,
}

#[async_trait]
impl AsyncConsumer for Relay {
    async fn consume(&mut self, _channel: &Channel, deliver: Deliver, props: BasicProperties, content: Vec<u8>) {
        let raw = RawDelivery {
            delivery_tag: deliver.delivery_tag(),
            correlation_id: props.correlation_id().cloned(),
            reply_to: props.reply_to().cloned(),
            content,
        };
        if self.sender.send(raw).await.is_err() {
            warn!(delivery_tag = deliver.delivery_tag(), "delivery relay closed, message will be redelivered");
        }
    }
}

/// Subscribes to `queue` and runs `handler` for each decoded message.
///
/// Up to `prefetch` handlers run concurrently (spec.md §5's pipelining
/// bound). A message is acknowledged only once its handler returns `Ok`;
/// on `Err`, or if the body fails to decode, it's rejected without requeue
/// (spec.md §4.1 — the caller's processing failure is what sends a poison
/// payload back to the broker's own redelivery/DLX policy). This function
/// runs until the relay channel closes, which happens when the underlying
/// connection/channel is dropped.
pub async fn consume_json<T, F, Fut>(
    channel: Channel,
    queue: &str,
    consumer_tag: &str,
    prefetch: u16,
    handler: F,
) -> Result<()>
where
    T: serde::de::DeserializeOwned + Send + 'static,
    F: Fn(T, Option<String>, Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(prefetch as usize * 2 + 1);
    let relay = Relay { sender: tx };
    let args = BasicConsumeArguments::new(queue, consumer_tag).manual_ack(true).finish();
    channel
        .basic_consume(relay, args)
        .await
        .map_err(|source| Error::Consume { queue: queue.to_owned(), source })?;

    let channel = Arc::new(channel);
    let handler = Arc::new(handler);
    let permits = Arc::new(Semaphore::new(prefetch.max(1) as usize));

    while let Some(raw) = rx.recv().await {
        let permit = permits.clone().acquire_owned().await.expect("semaphore is never closed");
        let channel = Arc::clone(&channel);
        let handler = Arc::clone(&handler);
        let queue = queue.to_owned();

        tokio::spawn(async move {
            let _permit = permit;
            match serde_json::from_slice::<T>(&raw.content) {
                Ok(body) => match handler(body, raw.correlation_id.clone(), raw.reply_to.clone()).await {
                    Ok(()) => {
                        let _ = channel.basic_ack(BasicAckArguments::new(raw.delivery_tag, false)).await;
                    }
                    Err(err) => {
                        error!(queue, correlation_id = ?raw.correlation_id, "handler failed: {err:?}");
                        let _ =
                            channel.basic_reject(BasicRejectArguments::new(raw.delivery_tag, false)).await;
                    }
                },
                Err(err) => {
                    error!(queue, "failed to decode message body: {err}");
                    let _ = channel.basic_reject(BasicRejectArguments::new(raw.delivery_tag, false)).await;
                }
            }
        });
    }

    Ok(())
}
