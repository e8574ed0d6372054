use broker::BrokerConfig;
use config::FileFormat;
use lazy_static_include::lazy_static_include_str;
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

/// Gateway configuration: broker connection, the upload queue name, the HTTP
/// listen port, and the response deadline (spec.md §4.6, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub upload_queue: String,
    pub http: HttpConfig,
    pub response_timeout_secs: u64,
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub port: u16,
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
            debug!(local_file, "loading local gateway configuration");
            builder = builder.add_source(config::File::with_name(&local_file).required(false));
        }

        builder
            .add_source(config::Environment::default().separator("__").ignore_empty(true))
            .build()
            .expect("could not load gateway configuration")
            .try_deserialize()
            .expect("could not deserialize gateway configuration")
    }

    pub fn validate(&self) {
        self.broker.validate();
        assert!(!self.upload_queue.is_empty(), "upload queue name is required");
        assert!(self.response_timeout_secs > 0, "response_timeout_secs must be positive");
    }
}
