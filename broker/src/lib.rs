//! Durable broker binding shared by the dispatcher, workers, aggregator, and
//! gateway (spec.md §4.1).
pub mod config;
pub mod connection;
pub mod consume;
pub mod error;
pub mod publish;

pub use config::BrokerConfig;
pub use connection::{connect, declare_durable_queue, declare_reply_queue, open_channel};
pub use consume::consume_json;
pub use error::{Error, Result};
pub use publish::publish_json;
