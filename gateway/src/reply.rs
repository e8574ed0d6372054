//! Waits for exactly one correlated reply on a task's exclusive queue
//! (spec.md §4.6 steps 5-6).
use std::sync::Mutex;
use std::time::Duration;

use amqprs::channel::{BasicConsumeArguments, Channel};
use amqprs::consumer::AsyncConsumer;
use amqprs::{BasicProperties, Deliver};
use async_trait::async_trait;
use messages::FinalEnvelope;
use tokio::sync::oneshot;
use tracing::warn;

use crate::error::{Error, Result};

/// Forwards the first delivery whose `correlation_id` matches `task_id` to a
/// one-shot channel; every delivery is acknowledged immediately since the
/// reply queue is exclusive to this one request and nothing else will ever
/// reconsume it (spec.md §4.6: "exclusive, non-durable, auto-deleted").
struct ReplyConsumer {
    task_id: String,
    sender: Mutex<Option<oneshot::Sender<Vec<u8>>>>,
}

#[async_trait]
impl AsyncConsumer for ReplyConsumer {
    async fn consume(&mut self, channel: &Channel, deliver: Deliver, props: BasicProperties, content: Vec<u8>) {
        let _ = channel
            .basic_ack(amqprs::channel::BasicAckArguments::new(deliver.delivery_tag(), false))
            .await;

        if props.correlation_id().map(String::as_str) != Some(self.task_id.as_str()) {
            warn!(task_id = self.task_id, "reply queue received a message for a different correlation id");
            return;
        }

        if let Some(sender) = self.sender.lock().expect("reply sender mutex poisoned").take() {
            let _ = sender.send(content);
        }
    }
}

/// Subscribes to `queue` and waits up to `timeout` for a message whose
/// correlation id is `task_id`, decoding it as a [`FinalEnvelope`].
pub async fn await_final_envelope(
    channel: &Channel,
    queue: &str,
    task_id: &str,
    timeout: Duration,
) -> Result<FinalEnvelope> {
    let (tx, rx) = oneshot::channel();
    let consumer = ReplyConsumer { task_id: task_id.to_owned(), sender: Mutex::new(Some(tx)) };
    let args = BasicConsumeArguments::new(queue, "gateway-reply").manual_ack(true).finish();
    channel
        .basic_consume(consumer, args)
        .await
        .map_err(|source| broker::Error::Consume { queue: queue.to_owned(), source })?;

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(body)) => {
            serde_json::from_slice(&body).map_err(|source| Error::Broker(broker::Error::Decode(source)))
        }
        Ok(Err(_)) => Err(Error::Timeout),
        Err(_) => Err(Error::Timeout),
    }
}
