//! The `contract_extractor` → `sb` cascade (spec.md §4.4, REDESIGN FLAGS).
//!
//! The extractor's expected-service set unconditionally includes `sb_ai`,
//! but a real counterparty lookup only makes sense once a seller name has
//! been extracted. Rather than leave `sb_ai` permanently unfulfilled when
//! no seller is found — the latent deadlock spec.md §9 calls out — the
//! extractor always produces a terminal `sb_ai` partial itself: either by
//! forwarding to the `sb` queue when a seller was found, or by publishing
//! the stub directly.
use amqprs::channel::Channel;
use messages::{ResultMessage, ServiceTag, WorkItem};
use serde_json::{json, Value};
use tracing::info;

/// `{status:0, reason:"seller not provided"}`, spec.md §4.4's prescribed
/// stub, published in place of a real `sb` worker result when the
/// extractor found no seller.
pub fn no_seller_stub() -> Value {
    json!({ "status": 0, "reason": "seller not provided" })
}

/// Reads `result.seller` out of the extractor's own payload (spec.md §4.4,
/// grounded in the original `_attach_sb_check`'s `payload["result"]["seller"]`
/// lookup).
pub fn extracted_seller(extractor_payload: &Value) -> Option<String> {
    extractor_payload.get("result")?.get("seller")?.as_str().map(str::to_owned).filter(|s| !s.is_empty())
}

/// Either forwards to the `sb` queue (seller found) or publishes the
/// `sb_ai` stub directly to the results queue (no seller).
pub async fn cascade(
    channel: &Channel,
    sb_queue: &str,
    results_queue: &str,
    task_id: &str,
    reply_to: Option<&str>,
    sections: messages::SectionMap,
    extractor_payload: &Value,
) -> broker::Result<()> {
    match extracted_seller(extractor_payload) {
        Some(seller) => {
            info!(task_id, seller, "cascading to sb queue");
            let item = WorkItem {
                task_id: task_id.to_owned(),
                reply_to: reply_to.map(str::to_owned),
                key: messages::SectionKey::Sections,
                sections,
            };
            let mut body = serde_json::to_value(&item).expect("WorkItem always serializes");
            if let Value::Object(map) = &mut body {
                map.insert("seller".to_owned(), json!(seller));
            }
            broker::publish_json(channel, sb_queue, task_id, reply_to, &body).await
        }
        None => {
            info!(task_id, "no seller extracted, publishing sb_ai stub");
            let result = ResultMessage { service: ServiceTag::SbAi.to_string(), payload: no_seller_stub() };
            broker::publish_json(channel, results_queue, task_id, reply_to, &result).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_seller_when_present() {
        let payload = json!({ "result": { "seller": "Acme" } });
        assert_eq!(extracted_seller(&payload), Some("Acme".to_owned()));
    }

    #[test]
    fn no_seller_when_missing_or_empty() {
        assert_eq!(extracted_seller(&json!({ "result": {} })), None);
        assert_eq!(extracted_seller(&json!({ "result": { "seller": "" } })), None);
        assert_eq!(extracted_seller(&json!({})), None);
    }

    #[test]
    fn stub_matches_spec_shape() {
        let stub = no_seller_stub();
        assert_eq!(stub["status"], 0);
        assert_eq!(stub["reason"], "seller not provided");
    }
}
