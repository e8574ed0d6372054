use std::panic;
use std::sync::Arc;
use std::time::Duration;

use aggregator::config::Config;
use aggregator::state::AggregationTable;
use aggregator::{aggregate, sweep};
use anyhow::Context;
use backtrace::Backtrace;
use clap::Parser;
use messages::{AggregationInit, ResultMessage};
use mimalloc::MiMalloc;
use tokio::sync::Mutex;
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
        error!("aggregator panicked: {panic_info} {:?}", Backtrace::new());
    }));

    let config = Config::load(cli.config);
    config.validate();
    debug!(?config, "loaded aggregator configuration");

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.prometheus.port))
        .install()
        .context("setting up Prometheus exporter")?;

    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let connection = broker::connect(&config.broker).await?;
    let init_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    let results_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    let publish_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    let sweep_channel = broker::open_channel(&connection, config.broker.prefetch).await?;

    broker::declare_durable_queue(&init_channel, &config.queues.aggregation_tasks).await?;
    broker::declare_durable_queue(&results_channel, &config.queues.aggregation_results).await?;

    let table = Arc::new(Mutex::new(AggregationTable::new()));
    let publish_channel = Arc::new(publish_channel);
    let prefetch = config.broker.prefetch;

    info!(
        aggregation_tasks = %config.queues.aggregation_tasks,
        aggregation_results = %config.queues.aggregation_results,
        "aggregator ready"
    );

    let sweep_table = Arc::clone(&table);
    let stale_after = Duration::from_secs(config.stale_after_secs);
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
    tokio::spawn(sweep::run(sweep_table, sweep_channel, stale_after, sweep_interval));

    let init_table = Arc::clone(&table);
    let init_publish = Arc::clone(&publish_channel);
    let init_task = broker::consume_json::<AggregationInit, _, _>(
        init_channel,
        &config.queues.aggregation_tasks,
        "aggregator-init",
        prefetch,
        move |msg, _correlation_id, _reply_to| {
            let table = Arc::clone(&init_table);
            let channel = Arc::clone(&init_publish);
            async move {
                aggregate::handle_init(&table, &channel, msg).await.map_err(|err| {
                    metrics::counter!("aggregator_errors_total", "type" => err.to_error_tag()).increment(1);
                    error!(error = %err, "failed to handle aggregation init");
                    anyhow::Error::from(err)
                })
            }
        },
    );

    let results_table = Arc::clone(&table);
    let results_publish = Arc::clone(&publish_channel);
    let results_task = broker::consume_json::<ResultMessage, _, _>(
        results_channel,
        &config.queues.aggregation_results,
        "aggregator-results",
        prefetch,
        move |msg, correlation_id, _reply_to| {
            let table = Arc::clone(&results_table);
            let channel = Arc::clone(&results_publish);
            async move {
                let task_id = correlation_id.unwrap_or_default();
                aggregate::handle_partial(&table, &channel, &task_id, msg).await.map_err(|err| {
                    metrics::counter!("aggregator_errors_total", "type" => err.to_error_tag()).increment(1);
                    error!(task_id, error = %err, "failed to handle aggregation partial");
                    anyhow::Error::from(err)
                })
            }
        },
    );

    tokio::try_join!(init_task, results_task)?;
    Ok(())
}
