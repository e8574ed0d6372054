use std::panic;
use std::sync::Arc;

use anyhow::Context;
use backtrace::Backtrace;
use clap::Parser;
use gateway::config::Config;
use gateway::routes::routes;
use gateway::upload::UploadContext;
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
        error!("gateway panicked: {panic_info} {:?}", Backtrace::new());
    }));

    let config = Config::load(cli.config);
    config.validate();
    debug!(?config, "loaded gateway configuration");

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.prometheus.port))
        .install()
        .context("setting up Prometheus exporter")?;

    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let connection = broker::connect(&config.broker).await?;
    let declare_channel = broker::open_channel(&connection, config.broker.prefetch).await?;
    broker::declare_durable_queue(&declare_channel, &config.upload_queue).await?;

    let port = config.http.port;
    let ctx = Arc::new(UploadContext { connection, config });

    info!(port, upload_queue = %ctx.config.upload_queue, "gateway ready");

    warp::serve(routes(ctx)).run(([0, 0, 0, 0], port)).await;
    Ok(())
}
