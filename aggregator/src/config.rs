use broker::BrokerConfig;
use config::FileFormat;
use lazy_static_include::lazy_static_include_str;
use messages::QueueNames;
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

/// Aggregator configuration: broker connection, queue names, and the
/// stale-task sweep's interval/threshold (spec.md §4.5, §9 — "the principal
/// open robustness question in the source", resolved here as a required,
/// configurable behavior).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub queues: QueueNames,
    pub stale_after_secs: u64,
    pub sweep_interval_secs: u64,
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    pub port: u16,
}

impl Config {
    pub fn load(local_file: Option<String>) -> Config {
        let mut builder =
            config::Config::builder().add_source(config::File::from_str(&DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(local_file) = local_file {
            debug!(local_file, "loading local aggregator configuration");
            builder = builder.add_source(config::File::with_name(&local_file).required(false));
        }

        builder
            .add_source(config::Environment::default().separator("__").ignore_empty(true))
            .build()
            .expect("could not load aggregator configuration")
            .try_deserialize()
            .expect("could not deserialize aggregator configuration")
    }

    pub fn validate(&self) {
        self.broker.validate();
        assert!(self.stale_after_secs > 0, "stale_after_secs must be positive");
        assert!(self.sweep_interval_secs > 0, "sweep_interval_secs must be positive");
    }
}
