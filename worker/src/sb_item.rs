//! The work item the `contract_extractor`'s cascade publishes to the `sb`
//! queue: a normal [`messages::WorkItem`] plus the seller name it already
//! extracted (spec.md §4.4).
use messages::SectionMap;
use serde::Deserialize;

use crate::harness::TaskEnvelope;

#[derive(Debug, Clone, Deserialize)]
pub struct SbWorkItem {
    pub task_id: String,
    pub reply_to: Option<String>,
    pub seller: String,
    #[serde(default)]
    pub sections: SectionMap,
}

impl TaskEnvelope for SbWorkItem {
    fn task_id(&self) -> &str {
        &self.task_id
    }

    fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }
}
