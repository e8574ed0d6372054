use amqprs::channel::Channel;
use base64::Engine;
use messages::{AggregationInit, SectionKey, ServiceTag, WorkItem};
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, SectionsConfig};
use crate::error::{Error, Result};
use crate::persist::persist_best_effort;

/// The gateway's upload message, decoded from `doc_upload` (spec.md §6).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadTask {
    #[serde(default)]
    pub task_id: Option<String>,
    pub filename: String,
    pub content: String,
    pub reply_to: String,
}

/// Slices one upload and fans it out to the aggregation and worker queues,
/// all stamped with the same `task_id` (spec.md §4.3).
///
/// The init message is published before any work item so the aggregator's
/// expected set is populated first (spec.md §4.3 "Ordering"); the
/// aggregator tolerates the reverse order too (spec.md §4.5), this is a
/// best-effort optimization, not a correctness requirement.
pub async fn dispatch_upload(channel: &Channel, config: &Config, task: UploadTask) -> Result<()> {
    let task_id = task.task_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

    let content = base64::engine::general_purpose::STANDARD
        .decode(&task.content)
        .map_err(|source| Error::Decode { filename: task.filename.clone(), source })?;

    let sliced = slicer::slice(&task.filename, &content)
        .map_err(|source| Error::Slice { filename: task.filename.clone(), source })?;

    persist_best_effort(&config.storage, &sliced.parts).await;

    info!(task_id, filename = %task.filename, "dispatching sliced document");

    let init = AggregationInit {
        task_id: task_id.clone(),
        reply_to: Some(task.reply_to.clone()),
        expected_services: ServiceTag::ALL.to_vec(),
    };
    publish_to(channel, &config.queues.aggregation_tasks, &task_id, &task.reply_to, &init).await?;

    let legal_item = work_item(&task_id, &task.reply_to, SectionKey::Parts, sliced.parts.clone());
    publish_to(channel, &config.queues.ai_legal_parts, &task_id, &task.reply_to, &legal_item).await?;

    let econom_item = subset_work_item(&task_id, &task.reply_to, &sliced.parts, &config.sections, Worker::Econom);
    publish_to(channel, &config.queues.ai_econom_parts, &task_id, &task.reply_to, &econom_item).await?;

    let extractor_item =
        subset_work_item(&task_id, &task.reply_to, &sliced.parts, &config.sections, Worker::Extractor);
    publish_to(channel, &config.queues.contract_extractor_parts, &task_id, &task.reply_to, &extractor_item).await?;

    Ok(())
}

enum Worker {
    Econom,
    Extractor,
}

fn work_item(task_id: &str, reply_to: &str, key: SectionKey, sections: messages::SectionMap) -> WorkItem {
    WorkItem { task_id: task_id.to_owned(), reply_to: Some(reply_to.to_owned()), key, sections }
}

fn subset_work_item(
    task_id: &str,
    reply_to: &str,
    parts: &messages::SectionMap,
    sections: &SectionsConfig,
    worker: Worker,
) -> WorkItem {
    let (indices, key) = match worker {
        Worker::Econom => (&sections.econom, sections.econom_key),
        Worker::Extractor => (&sections.extractor, sections.extractor_key),
    };
    work_item(task_id, reply_to, key.into(), parts.subset(indices))
}

async fn publish_to<T: serde::Serialize>(
    channel: &Channel,
    queue: &str,
    task_id: &str,
    reply_to: &str,
    body: &T,
) -> Result<()> {
    broker::publish_json(channel, queue, task_id, Some(reply_to), body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawSectionKey;

    fn sections_config() -> SectionsConfig {
        SectionsConfig {
            econom: vec![16],
            extractor: vec![4, 5, 6, 7, 11, 12, 15, 16],
            econom_key: RawSectionKey::Parts,
            extractor_key: RawSectionKey::Sections,
        }
    }

    #[test]
    fn econom_subset_keeps_only_configured_slots_under_parts_key() {
        let mut parts = messages::SectionMap::empty();
        parts.set(4, "section four");
        parts.set(16, "TABLE: a | b");

        let item = subset_work_item("t1", "reply", &parts, &sections_config(), Worker::Econom);
        assert_eq!(item.key, SectionKey::Parts);
        assert_eq!(item.sections.get(16), "TABLE: a | b");
        assert_eq!(item.sections.get(4), "", "econom only gets part_16 by default");
    }

    #[test]
    fn extractor_subset_keeps_configured_slots_under_sections_key() {
        let mut parts = messages::SectionMap::empty();
        parts.set(5, "section five");
        parts.set(16, "TABLE: a | b");

        let item = subset_work_item("t1", "reply", &parts, &sections_config(), Worker::Extractor);
        assert_eq!(item.key, SectionKey::Sections);
        assert_eq!(item.sections.get(5), "section five");
        assert_eq!(item.sections.get(16), "TABLE: a | b");
        assert_eq!(item.sections.get(0), "");
    }

    #[test]
    fn legal_work_item_carries_full_map_under_parts_key() {
        let mut parts = messages::SectionMap::empty();
        parts.set(0, "header");
        parts.set(16, "TABLE: a | b");

        let item = work_item("t1", "reply", SectionKey::Parts, parts.clone());
        assert_eq!(item.key, SectionKey::Parts);
        assert_eq!(item.sections, parts);
    }
}
