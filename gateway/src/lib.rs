pub mod config;
pub mod error;
pub mod reply;
pub mod routes;
pub mod upload;

pub use config::Config;
pub use error::{Error, Result};
pub use upload::UploadContext;
