//! Consumes the upload queue, slices the document, and fans it out to the
//! aggregation and worker queues (spec.md §4.3).
pub mod config;
pub mod dispatch;
pub mod error;
pub mod persist;

pub use config::Config;
pub use dispatch::{dispatch_upload, UploadTask};
pub use error::{Error, Result};
