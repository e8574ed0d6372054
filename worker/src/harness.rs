//! The shared consume → process → publish harness every worker binary runs
//! (spec.md §4.4).
use std::future::Future;
use std::sync::Arc;

use amqprs::channel::Channel;
use messages::{ResultMessage, ServiceTag, WorkItem};
use tracing::{error, warn};

/// What every incoming work item carries regardless of its JSON shape:
/// enough to stamp the outgoing result with the right correlation id and
/// reply-to even if the AMQP properties are absent (spec.md §6 work item
/// bodies always embed both alongside the section payload).
pub trait TaskEnvelope {
    fn task_id(&self) -> &str;
    fn reply_to(&self) -> Option<&str>;
}

impl TaskEnvelope for WorkItem {
    fn task_id(&self) -> &str {
        &self.task_id
    }

    fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }
}

/// Runs `domain` for every delivery on `queue` (consumed over
/// `consume_channel`), publishing exactly one [`ResultMessage`] tagged
/// `service` per task to `results_queue` (over `publish_channel`)
/// (spec.md §4.4 steps 1-3).
///
/// Consuming and publishing use separate channels, matching the
/// dispatcher's pattern (`amqprs::channel::Channel` is not `Clone`, and a
/// channel mid-consume shouldn't also carry the publisher's confirms).
///
/// A domain-logic error does not reject the delivery: it still publishes a
/// result, with `payload = {"error": <message>}`, guaranteeing each
/// expected service accounts for exactly one terminal partial per task
/// (spec.md §4.4 step 3). The delivery is only rejected (and thus
/// redelivered) if the body fails to decode at all, or the publish itself
/// fails — both handled by [`broker::consume_json`].
pub async fn run_worker<T, F, Fut>(
    consume_channel: Channel,
    publish_channel: Channel,
    queue: &str,
    results_queue: &str,
    consumer_tag: &str,
    prefetch: u16,
    service: ServiceTag,
    domain: F,
) -> broker::Result<()>
where
    T: serde::de::DeserializeOwned + TaskEnvelope + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
{
    let channel = Arc::new(publish_channel);
    let results_queue = results_queue.to_owned();
    let domain = Arc::new(domain);

    broker::consume_json::<T, _, _>(
        consume_channel,
        queue,
        consumer_tag,
        prefetch,
        move |item, correlation_id, reply_to| {
            let channel = Arc::clone(&channel);
            let results_queue = results_queue.clone();
            let domain = Arc::clone(&domain);
            let task_id = correlation_id.unwrap_or_else(|| item.task_id().to_owned());
            let reply_to = reply_to.or_else(|| item.reply_to().map(str::to_owned));

            async move {
                let payload = match domain(item).await {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(task_id, service = %service, error = %err, "worker domain logic failed");
                        serde_json::json!({ "error": err.to_string() })
                    }
                };

                let result = ResultMessage { service: service.to_string(), payload };
                broker::publish_json(&channel, &results_queue, &task_id, reply_to.as_deref(), &result)
                    .await
                    .map_err(|err| {
                        error!(task_id, service = %service, error = %err, "failed to publish worker result");
                        anyhow::Error::from(err)
                    })
            }
        },
    )
    .await
}
