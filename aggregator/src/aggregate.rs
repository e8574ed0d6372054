//! Wires the [`crate::state`] transitions to the broker: decodes init and
//! partial messages, drives the shared table, and publishes final envelopes
//! (spec.md §4.5).
use std::sync::Arc;

use amqprs::channel::Channel;
use messages::{AggregationInit, FinalEnvelope, ResultMessage};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::Result;
use crate::state::{AggregationState, AggregationTable};

pub type SharedTable = Arc<Mutex<AggregationTable>>;

/// Handles an `AggregationInit` message (spec.md §4.5): registers the
/// expected set, then emits immediately in the degenerate case of an empty
/// expected set.
pub async fn handle_init(table: &SharedTable, publish_channel: &Channel, msg: AggregationInit) -> Result<()> {
    let task_id = msg.task_id.clone();
    let done = {
        let mut table = table.lock().await;
        table.handle_init(&task_id, msg.reply_to, msg.expected_services.iter().map(|s| s.as_str().to_owned()).collect());
        table.take_if_complete(&task_id)
    };

    if let Some(state) = done {
        emit_final(publish_channel, &task_id, state, false).await?;
    }
    Ok(())
}

/// Handles a `ResultMessage` delivered on the aggregation_results queue,
/// correlated to its task via the AMQP `correlation_id` (spec.md §4.5, §6).
pub async fn handle_partial(
    table: &SharedTable,
    publish_channel: &Channel,
    task_id: &str,
    msg: ResultMessage,
) -> Result<()> {
    let done = {
        let mut table = table.lock().await;
        table.handle_partial(task_id, None, &msg.service, msg.payload)
    };

    if let Some(state) = done {
        emit_final(publish_channel, task_id, state, false).await?;
    }
    Ok(())
}

/// Publishes the final envelope to `state.reply_to`, if set. A task with no
/// reply-to (e.g. the caller already gave up, spec.md §5 "cancellation")
/// is silently dropped — there is nowhere to deliver the result.
pub async fn emit_final(
    publish_channel: &Channel,
    task_id: &str,
    state: AggregationState,
    stale: bool,
) -> Result<()> {
    let Some(reply_to) = state.reply_to.clone() else {
        info!(task_id, "aggregation complete but no reply_to, dropping final envelope");
        return Ok(());
    };

    let result = state.merge();
    let envelope =
        if stale { FinalEnvelope::stale(task_id, result) } else { FinalEnvelope::new(task_id, result) };

    broker::publish_json(publish_channel, &reply_to, task_id, None, &envelope).await?;
    info!(task_id, reply_to, stale, "emitted final envelope");
    Ok(())
}
