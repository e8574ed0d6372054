//! The closed enumeration of worker identities.
//!
//! Per spec.md §9 ("ad-hoc worker identity"), the source used bare strings for
//! this; here it's a closed enum so the aggregator's completeness check is
//! static instead of stringly-typed.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTag {
    AiLegal,
    AiEconom,
    SbAi,
    ContractExtractor,
}

impl ServiceTag {
    /// The four services every task expects by default (spec.md §4.3).
    pub const ALL: [ServiceTag; 4] = [
        ServiceTag::AiLegal,
        ServiceTag::AiEconom,
        ServiceTag::SbAi,
        ServiceTag::ContractExtractor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTag::AiLegal => "ai_legal",
            ServiceTag::AiEconom => "ai_econom",
            ServiceTag::SbAi => "sb_ai",
            ServiceTag::ContractExtractor => "contract_extractor",
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown service tag: {0}")]
pub struct UnknownServiceTag(String);

impl FromStr for ServiceTag {
    type Err = UnknownServiceTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai_legal" => Ok(ServiceTag::AiLegal),
            "ai_econom" => Ok(ServiceTag::AiEconom),
            "sb_ai" => Ok(ServiceTag::SbAi),
            "contract_extractor" => Ok(ServiceTag::ContractExtractor),
            other => Err(UnknownServiceTag(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for tag in ServiceTag::ALL {
            assert_eq!(tag.as_str().parse::<ServiceTag>().unwrap(), tag);
        }
    }

    #[test]
    fn serializes_as_snake_case_string() {
        let json = serde_json::to_string(&ServiceTag::ContractExtractor).unwrap();
        assert_eq!(json, "\"contract_extractor\"");
    }
}
