pub mod aggregate;
pub mod config;
pub mod error;
pub mod state;
pub mod sweep;

pub use aggregate::{handle_init, handle_partial, SharedTable};
pub use config::Config;
pub use error::{Error, Result};
pub use state::{AggregationState, AggregationTable};
