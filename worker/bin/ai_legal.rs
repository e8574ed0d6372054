use anyhow::Context;
use clap::Parser;
use messages::{ServiceTag, WorkItem};
use mimalloc::MiMalloc;
use tracing::{debug, info};
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
    install_panic_hook("ai_legal");

    let config = Config::load(cli.config, "ai_legal_parts", "aggregation_results");
    config.validate();
    debug!(?config, "loaded ai_legal configuration");

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.prometheus.port))
        .install()
        .context("setting up Prometheus exporter")?;

    let connection = broker::connect(&config.broker).await?;
    let consume_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    let publish_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    broker::declare_durable_queue(&consume_channel, &config.queue).await?;
    broker::declare_durable_queue(&publish_channel, &config.results_queue).await?;

    info!(queue = %config.queue, "ai_legal worker ready");

    worker::run_worker::<WorkItem, _, _>(
        consume_channel,
        publish_channel,
        &config.queue,
        &config.results_queue,
        "ai_legal",
        config.broker.prefetch,
        ServiceTag::AiLegal,
        |item| async move { Ok(worker::domain::ai_legal_review(&item.sections)) },
    )
    .await?;

    Ok(())
}
