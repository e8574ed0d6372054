//! Background stale-task sweep (spec.md §4.5, §9): the aggregator's
//! required defense against tasks whose expected set never drains.
use std::time::Duration;

use amqprs::channel::Channel;
use tracing::{error, warn};

use crate::aggregate::{emit_final, SharedTable};

/// Runs forever, waking every `sweep_interval` to finalize any task older
/// than `stale_after` with a `stale: true` marker (spec.md §9, DESIGN.md).
pub async fn run(table: SharedTable, publish_channel: Channel, stale_after: Duration, sweep_interval: Duration) {
    let mut ticker = tokio::time::interval(sweep_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let stale = {
            let mut table = table.lock().await;
            table.drain_stale(stale_after)
        };

        for (task_id, state) in stale {
            warn!(task_id, "stale-task timeout, emitting partial final envelope");
            if let Err(err) = emit_final(&publish_channel, &task_id, state, true).await {
                metrics::counter!("aggregator_errors_total", "type" => err.to_error_tag()).increment(1);
                error!(task_id, error = %err, "failed to emit stale final envelope");
            }
        }
    }
}
