//! The message bodies that cross the broker (spec.md §6).
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::section::SectionMap;
use crate::service::ServiceTag;

/// The gateway's upload message, published to the `doc_upload` queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMessage {
    pub task_id: String,
    pub filename: String,
    /// base64-encoded document bytes.
    pub content: String,
    pub reply_to: String,
}

/// Published by the dispatcher to the aggregation queue before any work item,
/// so the aggregator's expected set is populated before partials can arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationInit {
    pub task_id: String,
    pub reply_to: Option<String>,
    pub expected_services: Vec<ServiceTag>,
}

/// The key under which a work item's section data is published is
/// worker-specific and chosen by the dispatcher's configuration (spec.md
/// §6): `parts` for most workers, `sections` where configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKey {
    Parts,
    Sections,
}

impl SectionKey {
    fn as_str(self) -> &'static str {
        match self {
            SectionKey::Parts => "parts",
            SectionKey::Sections => "sections",
        }
    }
}

/// A per-worker unit of dispatch: `{task_id, reply_to, <parts|sections>: SectionMap}`.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub task_id: String,
    pub reply_to: Option<String>,
    pub key: SectionKey,
    pub sections: SectionMap,
}

impl Serialize for WorkItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("task_id", &self.task_id)?;
        map.serialize_entry("reply_to", &self.reply_to)?;
        map.serialize_entry(self.key.as_str(), &self.sections)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for WorkItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WorkItemVisitor;

        impl<'de> Visitor<'de> for WorkItemVisitor {
            type Value = WorkItem;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a work item with task_id, reply_to, and a parts or sections map")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut task_id = None;
                let mut reply_to = None;
                let mut key = None;
                let mut sections = None;

                while let Some(field) = access.next_key::<String>()? {
                    match field.as_str() {
                        "task_id" => task_id = Some(access.next_value()?),
                        "reply_to" => reply_to = access.next_value()?,
                        "parts" => {
                            key = Some(SectionKey::Parts);
                            sections = Some(access.next_value()?);
                        }
                        "sections" => {
                            key = Some(SectionKey::Sections);
                            sections = Some(access.next_value()?);
                        }
                        _ => {
                            let _ignored: serde::de::IgnoredAny = access.next_value()?;
                        }
                    }
                }

                let task_id = task_id.ok_or_else(|| serde::de::Error::missing_field("task_id"))?;
                let key = key.ok_or_else(|| serde::de::Error::missing_field("parts|sections"))?;
                let sections = sections.unwrap_or_default();

                Ok(WorkItem { task_id, reply_to, key, sections })
            }
        }

        deserializer.deserialize_map(WorkItemVisitor)
    }
}

/// One worker's contribution to a task, published to the results queue.
///
/// `service` is a raw string rather than [`ServiceTag`] because the
/// aggregator must preserve unrecognized tags verbatim in the final
/// envelope (spec.md §4.5 merge policy) even though completeness tracking
/// is over the closed enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub service: String,
    pub payload: Value,
}

/// `{task_id, result: {service_tag: payload}}`, delivered to the caller's
/// reply queue.
///
/// `stale` is set when the aggregator's stale-task timeout forced emission
/// before the expected set drained (spec.md §4.5, §9); it's absent from the
/// wire payload in the ordinary case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalEnvelope {
    pub task_id: String,
    pub result: FinalResult,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl FinalEnvelope {
    pub fn new(task_id: impl Into<String>, result: FinalResult) -> Self {
        FinalEnvelope { task_id: task_id.into(), result, stale: false }
    }

    pub fn stale(task_id: impl Into<String>, result: FinalResult) -> Self {
        FinalEnvelope { task_id: task_id.into(), result, stale: true }
    }
}

/// The final envelope's `result` object: the four fixed service keys
/// defaulted to empty objects, overlaid with whatever partials actually
/// arrived (including tags outside the closed enum).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalResult(BTreeMap<String, Value>);

impl FinalResult {
    /// Starts from the four fixed keys defaulted to `{}`.
    pub fn with_defaults() -> Self {
        let mut map = BTreeMap::new();
        for tag in ServiceTag::ALL {
            map.insert(tag.as_str().to_owned(), Value::Object(Default::default()));
        }
        FinalResult(map)
    }

    pub fn insert(&mut self, service: impl Into<String>, payload: Value) {
        self.0.insert(service.into(), payload);
    }

    pub fn get(&self, service: &str) -> Option<&Value> {
        self.0.get(service)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_item_serializes_under_configured_key() {
        let item = WorkItem {
            task_id: "t1".into(),
            reply_to: None,
            key: SectionKey::Sections,
            sections: SectionMap::empty(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("sections").is_some());
        assert!(json.get("parts").is_none());

        let back: WorkItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.key, SectionKey::Sections);
    }

    #[test]
    fn final_result_defaults_then_overlays() {
        let mut result = FinalResult::with_defaults();
        assert_eq!(result.len(), 4);
        assert_eq!(result.get("ai_legal"), Some(&Value::Object(Default::default())));

        result.insert("ai_legal", serde_json::json!({"ok": true}));
        result.insert("unknown_tag", serde_json::json!({"x": 1}));
        assert_eq!(result.len(), 5);
        assert_eq!(result.get("ai_legal"), Some(&serde_json::json!({"ok": true})));
    }
}
