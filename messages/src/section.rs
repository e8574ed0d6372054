//! The canonical 17-slot section map produced by the slicer.
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fixed slots in a [`SectionMap`]: the header (`part_0`), sections
/// `part_1..=part_15`, and the rendered specification table (`part_16`).
pub const SECTION_COUNT: usize = 17;

/// `part_0..part_16 -> text`, always exactly [`SECTION_COUNT`] keys.
///
/// `part_0` is the document header, `part_1..part_15` are the numbered
/// sections (empty string when no heading for that ordinal was found), and
/// `part_16` is the rendered specification table text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionMap {
    parts: [String; SECTION_COUNT],
}

impl SectionMap {
    /// A section map with all 17 slots empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the text at slot `index` (`0..=16`).
    ///
    /// # Panics
    /// Panics if `index > 16`.
    pub fn get(&self, index: usize) -> &str {
        &self.parts[index]
    }

    /// Overwrites the text at slot `index` (`0..=16`).
    ///
    /// # Panics
    /// Panics if `index > 16`.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        self.parts[index] = value.into();
    }

    /// The document header (`part_0`).
    pub fn header(&self) -> &str {
        self.get(0)
    }

    /// The rendered specification table text (`part_16`).
    pub fn specification(&self) -> &str {
        self.get(16)
    }

    /// Iterates over `("part_0", "...")..("part_16", "...")` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        (0..SECTION_COUNT).map(move |i| (key_for(i), self.parts[i].as_str()))
    }

    /// Keeps only the given slots (by index), replacing the rest with the
    /// empty string. Used by the dispatcher to build the cut-down work items
    /// sent to `ai_econom` and `contract_extractor`.
    pub fn subset(&self, indices: &[usize]) -> SectionMap {
        let mut out = SectionMap::empty();
        for &i in indices {
            out.set(i, self.parts[i].clone());
        }
        out
    }
}

fn key_for(index: usize) -> String {
    format!("part_{index}")
}

fn index_for(key: &str) -> Option<usize> {
    key.strip_prefix("part_")?.parse::<usize>().ok().filter(|i| *i < SECTION_COUNT)
}

impl Serialize for SectionMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(SECTION_COUNT))?;
        for i in 0..SECTION_COUNT {
            map.serialize_entry(&key_for(i), &self.parts[i])?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SectionMapVisitor;

        impl<'de> Visitor<'de> for SectionMapVisitor {
            type Value = SectionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with keys part_0..part_16")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = SectionMap::empty();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    // Unrecognized keys are ignored rather than rejected: the map is an
                    // internal wire type and we'd rather degrade gracefully than fail a
                    // whole task over a stray field from a future worker version.
                    if let Some(index) = index_for(&key) {
                        out.set(index, value);
                    }
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(SectionMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut map = SectionMap::empty();
        map.set(0, "header text");
        map.set(4, "section four");
        map.set(16, "TABLE: a | b");

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json.as_object().unwrap().len(), SECTION_COUNT);
        assert_eq!(json["part_4"], "section four");

        let back: SectionMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn deserialize_fills_missing_keys_with_empty_string() {
        let json = serde_json::json!({ "part_0": "hi" });
        let map: SectionMap = serde_json::from_value(json).unwrap();
        assert_eq!(map.get(0), "hi");
        assert_eq!(map.get(1), "");
        assert_eq!(map.iter().count(), SECTION_COUNT);
    }

    #[test]
    fn subset_keeps_only_requested_slots() {
        let mut map = SectionMap::empty();
        map.set(4, "four");
        map.set(5, "five");
        map.set(6, "six");

        let sub = map.subset(&[4, 6]);
        assert_eq!(sub.get(4), "four");
        assert_eq!(sub.get(5), "");
        assert_eq!(sub.get(6), "six");
    }
}
