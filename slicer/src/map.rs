//! Assembles chunks into the canonical [`SectionMap`] (spec.md §4.2 output).
use messages::SectionMap;

use crate::chunker::{Chunk, MAX_SECTION_ORDINAL, MIN_SECTION_ORDINAL};
use crate::table::render_specification;

/// A sliced document: the canonical wire-level section map plus the raw
/// chunks it was built from, kept around for diagnostic logging and
/// `sections.json` persistence (SPEC_FULL.md §3 supplement).
#[derive(Debug, Clone)]
pub struct SlicedDocument {
    pub chunks: Vec<Chunk>,
    pub parts: SectionMap,
}

/// Builds the 17-key section map from chunks (spec.md §4.2 steps 3-5).
///
/// `part_0` gets the header chunk's body (it has no title). `part_k` for
/// `k` in 1..=15 gets the matching chunk rendered as "title line, blank
/// line, body". Any chunk whose ordinal falls outside `1..=15` is dropped
/// here except the specification, which is rendered separately into
/// `part_16`.
pub fn build_section_map(chunks: &[Chunk]) -> SectionMap {
    let mut parts = SectionMap::empty();

    for chunk in chunks {
        match chunk.number {
            None => parts.set(0, chunk.rendered()),
            Some(n) if (MIN_SECTION_ORDINAL..=MAX_SECTION_ORDINAL).contains(&n) => {
                parts.set(n as usize, chunk.rendered());
            }
            Some(_) => {}
        }
    }

    let specification = chunks.iter().find(|c| c.is_specification);
    parts.set(16, render_specification(specification));

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Block;
    use crate::chunker::chunk_blocks;

    #[test]
    fn header_and_sections_land_in_expected_slots() {
        let blocks = vec![
            Block::Paragraph { text: "Header text".into(), bold: false },
            Block::Paragraph { text: "1. Subject".into(), bold: true },
            Block::Paragraph { text: "Body one".into(), bold: false },
        ];
        let chunks = chunk_blocks(blocks);
        let map = build_section_map(&chunks);

        assert_eq!(map.get(0), "Header text");
        assert!(map.get(1).starts_with("1. Subject"));
        assert!(map.get(1).contains("Body one"));
        assert_eq!(map.get(2), "");
    }

    #[test]
    fn ordinal_outside_one_to_fifteen_is_dropped_unless_specification() {
        let blocks = vec![
            Block::Paragraph { text: "17. Stray heading".into(), bold: true },
            Block::Paragraph { text: "stray body".into(), bold: false },
        ];
        let chunks = chunk_blocks(blocks);
        let map = build_section_map(&chunks);
        for i in 1..=15 {
            assert_eq!(map.get(i), "");
        }
        assert_eq!(map.get(16), "");
    }
}
