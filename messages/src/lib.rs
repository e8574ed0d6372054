//! Wire types shared by every crate in the orchestration fabric.
pub mod envelope;
pub mod queues;
pub mod section;
pub mod service;

pub use envelope::{AggregationInit, FinalEnvelope, FinalResult, ResultMessage, SectionKey, UploadMessage, WorkItem};
pub use queues::QueueNames;
pub use section::SectionMap;
pub use service::ServiceTag;
