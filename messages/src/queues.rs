//! Default broker queue names (spec.md §6), overridable via each binary's
//! own config surface.
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueNames {
    pub doc_upload: String,
    pub ai_legal_parts: String,
    pub ai_econom_parts: String,
    pub contract_extractor_parts: String,
    pub sb_queue: String,
    pub aggregation_tasks: String,
    pub aggregation_results: String,
}

impl Default for QueueNames {
    fn default() -> Self {
        QueueNames {
            doc_upload: "doc_upload".to_owned(),
            ai_legal_parts: "ai_legal_parts".to_owned(),
            ai_econom_parts: "ai_econom_parts".to_owned(),
            contract_extractor_parts: "contract_extractor_parts".to_owned(),
            sb_queue: "sb_queue".to_owned(),
            aggregation_tasks: "aggregation_tasks".to_owned(),
            aggregation_results: "aggregation_results".to_owned(),
        }
    }
}
