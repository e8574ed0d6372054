use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use messages::{ResultMessage, ServiceTag, WorkItem};
use mimalloc::MiMalloc;
use tracing::{debug, error, info};
use worker::bootstrap::{install_panic_hook, setup_logging};
use worker::config::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Clone, Debug)]
struct Cli {
    #[clap(short, long)]
    config: Option<String>,
    #[clap(short, long, action)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json);
    install_panic_hook("contract_extractor");

    let config = Config::load(cli.config, "contract_extractor_parts", "aggregation_results");
    config.validate();
    debug!(?config, "loaded contract_extractor configuration");

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.prometheus.port))
        .install()
        .context("setting up Prometheus exporter")?;

    let connection = broker::connect(&config.broker).await?;
    let consume_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    let publish_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    broker::declare_durable_queue(&consume_channel, &config.queue).await?;
    broker::declare_durable_queue(&publish_channel, &config.results_queue).await?;
    broker::declare_durable_queue(&publish_channel, &config.sb_queue).await?;

    info!(queue = %config.queue, "contract_extractor worker ready");

    let channel = Arc::new(publish_channel);
    let config = Arc::new(config);
    let prefetch = config.broker.prefetch;
    let queue = config.queue.clone();

    broker::consume_json::<WorkItem, _, _>(
        consume_channel,
        &queue,
        "contract_extractor",
        prefetch,
        move |item, correlation_id, reply_to| {
            let channel = Arc::clone(&channel);
            let config = Arc::clone(&config);
            let task_id = correlation_id.unwrap_or_else(|| item.task_id.clone());
            let reply_to = reply_to.or_else(|| item.reply_to.clone());

            async move {
                let payload = worker::domain::contract_extraction(&item.sections);

                let result = ResultMessage { service: ServiceTag::ContractExtractor.to_string(), payload: payload.clone() };
                broker::publish_json(&channel, &config.results_queue, &task_id, reply_to.as_deref(), &result)
                    .await
                    .map_err(|err| {
                        error!(task_id, error = %err, "failed to publish contract_extractor result");
                        anyhow::Error::from(err)
                    })?;

                worker::cascade::cascade(
                    &channel,
                    &config.sb_queue,
                    &config.results_queue,
                    &task_id,
                    reply_to.as_deref(),
                    item.sections,
                    &payload,
                )
                .await
                .map_err(|err| {
                    error!(task_id, error = %err, "failed to cascade to sb queue");
                    anyhow::Error::from(err)
                })
            }
        },
    )
    .await?;

    Ok(())
}
