//! Domain-logic stubs for the four analysis services.
//!
//! The actual legal review, econom matching, contract extraction, and
//! counterparty lookup algorithms are out of scope (spec.md §1); these
//! stand in with a deterministic, shaped placeholder so the orchestration
//! fabric around them can be exercised end to end.
use serde_json::{json, Value};

use messages::SectionMap;

/// `ai_legal`'s stub review: a per-section verdict keyed by `part_k`,
/// derived only from whether that slot has any text.
pub fn ai_legal_review(parts: &SectionMap) -> Value {
    let findings: Vec<Value> = (0..=16)
        .filter(|&i| !parts.get(i).is_empty())
        .map(|i| json!({ "part": format!("part_{i}"), "reviewed": true }))
        .collect();

    json!({
        "ok": true,
        "reviewed_sections": findings.len(),
        "findings": findings,
    })
}

/// `ai_econom`'s stub budget match, derived from the specification table
/// text it's given (by default just `part_16`).
pub fn ai_econom_analysis(parts: &SectionMap) -> Value {
    let spec_lines: Vec<&str> = parts.specification().lines().filter(|l| l.starts_with("TABLE: ")).collect();

    json!({
        "ok": true,
        "line_items": spec_lines.len(),
    })
}

/// `contract_extractor`'s stub field extraction.
///
/// Scans the sections it was given for a "Seller:"/"Продавец:"-style
/// marker line and lifts whatever follows the delimiter as the seller
/// name; `result.seller` absent means no seller was found, the signal the
/// cascade in [`crate::cascade`] keys off of.
pub fn contract_extraction(parts: &SectionMap) -> Value {
    let seller = find_seller(parts);

    json!({
        "ok": true,
        "result": {
            "seller": seller,
        },
    })
}

const SELLER_MARKERS: [&str; 2] = ["Продавец:", "Seller:"];

fn find_seller(parts: &SectionMap) -> Option<String> {
    for (_, text) in parts.iter() {
        for line in text.lines() {
            let trimmed = line.trim();
            for marker in SELLER_MARKERS {
                if let Some(rest) = trimmed.strip_prefix(marker) {
                    let name = rest.trim();
                    if !name.is_empty() {
                        return Some(name.to_owned());
                    }
                }
            }
        }
    }
    None
}

/// `sb_ai`'s stub counterparty lookup for a seller name known to exist
/// (reached only via the `sb` queue cascade, spec.md §4.4).
pub fn sb_lookup(seller: &str) -> Value {
    json!({
        "status": 1,
        "status_reason": "seller matched",
        "company_name": seller,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_seller_from_marker_line() {
        let mut parts = SectionMap::empty();
        parts.set(4, "Продавец: ООО Ромашка\nОстальной текст");
        let payload = contract_extraction(&parts);
        assert_eq!(payload["result"]["seller"], "ООО Ромашка");
    }

    #[test]
    fn no_marker_yields_null_seller() {
        let parts = SectionMap::empty();
        let payload = contract_extraction(&parts);
        assert!(payload["result"]["seller"].is_null());
    }
}
