use broker::BrokerConfig;
use config::FileFormat;
use lazy_static_include::lazy_static_include_str;
use messages::{QueueNames, SectionKey};
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

/// Dispatcher configuration: broker connection, queue names, per-worker
/// section subsets, and the data directory used for best-effort
/// persistence (spec.md §4.3, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub queues: QueueNames,
    pub sections: SectionsConfig,
    pub storage: StorageConfig,
    pub prometheus: PrometheusConfig,
}

/// Per-worker section subsets and the wire key each worker's work item is
/// published under (spec.md §6: "key name ... is worker-specific and fixed
/// by the dispatcher's configuration").
#[derive(Debug, Clone, Deserialize)]
pub struct SectionsConfig {
    /// `part_k` indices sent to `ai_econom` (default: `[16]`).
    pub econom: Vec<usize>,
    /// `part_k` indices sent to `contract_extractor`.
    pub extractor: Vec<usize>,
    #[serde(default = "default_econom_key")]
    pub econom_key: RawSectionKey,
    #[serde(default = "default_extractor_key")]
    pub extractor_key: RawSectionKey,
}

/// A deserializable mirror of [`SectionKey`] (which has a hand-rolled
/// `Serialize`/`Deserialize` tied to [`messages::WorkItem`]'s map shape, not
/// the plain string this config field holds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawSectionKey {
    Parts,
    Sections,
}

impl From<RawSectionKey> for SectionKey {
    fn from(value: RawSectionKey) -> Self {
        match value {
            RawSectionKey::Parts => SectionKey::Parts,
            RawSectionKey::Sections => SectionKey::Sections,
        }
    }
}

fn default_econom_key() -> RawSectionKey {
    RawSectionKey::Parts
}

fn default_extractor_key() -> RawSectionKey {
    RawSectionKey::Sections
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub sections_file_name: String,
    pub part_16_file_name: String,
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
            debug!(local_file, "loading local dispatcher configuration");
            builder = builder.add_source(config::File::with_name(&local_file).required(false));
        }

        builder
            .add_source(config::Environment::default().separator("__").ignore_empty(true))
            .build()
            .expect("could not load dispatcher configuration")
            .try_deserialize()
            .expect("could not deserialize dispatcher configuration")
    }

    pub fn validate(&self) {
        self.broker.validate();
        assert!(!self.storage.data_dir.is_empty(), "data directory is required");
        assert!(!self.sections.extractor.is_empty(), "contract_extractor section subset is required");
    }
}
