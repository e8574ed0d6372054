use broker::BrokerConfig;
use config::FileFormat;
use lazy_static_include::lazy_static_include_str;
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

/// Shared worker configuration: broker connection, the queue this binary
/// consumes, and the shared results queue every worker publishes to
/// (spec.md §4.4, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub queue: String,
    pub results_queue: String,
    /// Only read by the `contract_extractor` binary (spec.md §4.4 cascade).
    #[serde(default = "default_sb_queue")]
    pub sb_queue: String,
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    pub port: u16,
}

fn default_sb_queue() -> String {
    "sb_queue".to_owned()
}

impl Config {
    /// Loads configuration layered default-TOML < optional local file <
    /// environment (`__`-separated), matching the teacher's `Config::load`.
    /// `queue_env_default` seeds the `QUEUE` environment key so each binary
    /// can ship the same default.toml and still pick its own input queue
    /// without a per-binary config file.
    pub fn load(local_file: Option<String>, default_queue: &str, default_results_queue: &str) -> Config {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(&DEFAULT_CONFIG, FileFormat::Toml))
            .set_default("queue", default_queue)
            .expect("default queue name is valid")
            .set_default("results_queue", default_results_queue)
            .expect("default results queue name is valid");

        if let Some(local_file) = local_file {
            debug!(local_file, "loading local worker configuration");
            builder = builder.add_source(config::File::with_name(&local_file).required(false));
        }

        builder
            .add_source(config::Environment::default().separator("__").ignore_empty(true))
            .build()
            .expect("could not load worker configuration")
            .try_deserialize()
            .expect("could not deserialize worker configuration")
    }

    pub fn validate(&self) {
        self.broker.validate();
        assert!(!self.queue.is_empty(), "worker queue is required");
        assert!(!self.results_queue.is_empty(), "results queue is required");
    }
}
