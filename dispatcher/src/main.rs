use std::panic;
use std::sync::Arc;

use anyhow::Context;
use backtrace::Backtrace;
use clap::Parser;
use dispatcher::config::Config;
use dispatcher::dispatch::{dispatch_upload, UploadTask};
use mimalloc::MiMalloc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Clone, Debug)]
struct Cli {
    /// Path to a local configuration file, layered over the built-in defaults.
    #[clap(short, long)]
    config: Option<String>,

    /// If set, output logs in JSON format.
    #[clap(short, long, action)]
    json: bool,
}

fn setup_logging(json: bool) {
    let env_filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    if json {
        tracing_subscriber::fmt().json().with_target(true).with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().compact().with_target(true).with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json);

    panic::set_hook(Box::new(|panic_info| {
        error!("dispatcher panicked: {panic_info} {:?}", Backtrace::new());
    }));

    let config = Config::load(cli.config);
    config.validate();
    debug!(?config, "loaded dispatcher configuration");

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.prometheus.port))
        .install()
        .context("setting up Prometheus exporter")?;

    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let connection = broker::connect(&config.broker).await?;
    let consume_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    let publish_channel = broker::open_channel(&connection, config.broker.prefetch).await?;

    broker::declare_durable_queue(&consume_channel, &config.queues.doc_upload).await?;
    broker::declare_durable_queue(&publish_channel, &config.queues.aggregation_tasks).await?;
    broker::declare_durable_queue(&publish_channel, &config.queues.ai_legal_parts).await?;
    broker::declare_durable_queue(&publish_channel, &config.queues.ai_econom_parts).await?;
    broker::declare_durable_queue(&publish_channel, &config.queues.contract_extractor_parts).await?;

    info!(queue = %config.queues.doc_upload, "dispatcher ready");

    let config = Arc::new(config);
    let publish_channel = Arc::new(publish_channel);
    let prefetch = config.broker.prefetch;
    broker::consume_json::<UploadTask, _, _>(
        consume_channel,
        &config.queues.doc_upload,
        "dispatcher",
        prefetch,
        move |task, _correlation_id, _reply_to| {
            let config = Arc::clone(&config);
            let channel = Arc::clone(&publish_channel);
            async move {
                let task_id = task.task_id.clone();
                dispatch_upload(&channel, &config, task).await.map_err(|err| {
                    metrics::counter!("dispatcher_errors_total", "type" => err.to_error_tag()).increment(1);
                    error!(?task_id, error = %err, "failed to dispatch upload");
                    anyhow::Error::from(err)
                })
            }
        },
    )
    .await?;

    Ok(())
}
