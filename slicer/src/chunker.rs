//! Groups blocks into section chunks and finds the specification chunk
//! (spec.md §4.2 steps 2-4).
use std::collections::HashSet;

use crate::blocks::Block;
use crate::heading::detect_heading;
use crate::table::render_table_line;

/// The lowest and highest ordinals that map to `part_1..part_15`.
pub const MIN_SECTION_ORDINAL: u32 = 1;
pub const MAX_SECTION_ORDINAL: u32 = 15;

/// The ordinal threshold at or above which a chunk is treated as the
/// specification appendix regardless of its title (spec.md §4.2 step 4a).
const SPECIFICATION_ORDINAL_THRESHOLD: u32 = 16;

/// An intermediate chunk of the document: a numbered section, the header
/// (`number: None`), or the specification appendix.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub number: Option<u32>,
    pub title: String,
    pub blocks: Vec<Block>,
    pub is_specification: bool,
}

impl Chunk {
    fn new(number: Option<u32>, title: String) -> Self {
        Chunk { number, title, blocks: Vec::new(), is_specification: false }
    }

    #[cfg(test)]
    pub(crate) fn for_test(number: Option<u32>, title: &str, blocks: Vec<Block>) -> Self {
        Chunk { number, title: title.to_owned(), blocks, is_specification: true }
    }

    /// Joins this chunk's paragraph text and rendered table lines into one
    /// body string (spec.md §4.2 output: "title line, blank line, body").
    pub fn body(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph { text, .. } => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        lines.push(trimmed.to_owned());
                    }
                }
                Block::Table { rows } => {
                    for row in rows {
                        lines.push(render_table_line(row));
                    }
                }
            }
        }
        lines.join("\n")
    }

    /// The chunk rendered as it's stored under `part_k`: title line, blank
    /// line, body. The header chunk (no title) is just its body.
    pub fn rendered(&self) -> String {
        let body = self.body();
        if self.title.is_empty() {
            body
        } else if body.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, body)
        }
    }
}

/// Splits `blocks` into the header chunk plus one chunk per detected
/// numbered heading, marking duplicate ordinals' headings as body text of
/// the chunk currently open (spec.md §4.2 step 2 tie-break: "first
/// occurrence ... wins").
pub fn chunk_blocks(blocks: Vec<Block>) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Chunk::new(None, String::new());
    let mut seen_ordinals: HashSet<u32> = HashSet::new();

    for block in blocks {
        let heading = match &block {
            Block::Paragraph { text, bold } => detect_heading(text, *bold),
            Block::Table { .. } => None,
        };

        match heading {
            Some(h) if !seen_ordinals.contains(&h.ordinal) => {
                seen_ordinals.insert(h.ordinal);
                chunks.push(std::mem::replace(
                    &mut current,
                    Chunk::new(Some(h.ordinal), paragraph_text(&block)),
                ));
            }
            _ => current.blocks.push(block),
        }
    }
    chunks.push(current);

    mark_specification(&mut chunks);
    chunks
}

fn paragraph_text(block: &Block) -> String {
    match block {
        Block::Paragraph { text, .. } => text.trim().to_owned(),
        Block::Table { .. } => String::new(),
    }
}

/// Marks the first chunk matching the specification rule (spec.md §4.2 step
/// 4); every later match is left as a regular (and likely dropped, since its
/// ordinal is outside 1..15) chunk.
fn mark_specification(chunks: &mut [Chunk]) {
    for chunk in chunks.iter_mut() {
        if is_specification_candidate(chunk) {
            chunk.is_specification = true;
            return;
        }
    }
}

fn is_specification_candidate(chunk: &Chunk) -> bool {
    if chunk.number.is_some_and(|n| n >= SPECIFICATION_ORDINAL_THRESHOLD) {
        return true;
    }

    let first_block_text = chunk
        .blocks
        .first()
        .map(paragraph_text)
        .unwrap_or_default();

    contains_specification_marker(&chunk.title) || contains_specification_marker(&first_block_text)
}

fn contains_specification_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("специф") || lower.contains("spec")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str, bold: bool) -> Block {
        Block::Paragraph { text: text.to_owned(), bold }
    }

    #[test]
    fn header_then_sections_then_duplicate_is_body_text() {
        let blocks = vec![
            para("Intro header text", false),
            para("1. Subject", true),
            para("Body of section one", false),
            para("1. Subject appears again inline", true),
            para("2. Price", true),
            para("Body of section two", false),
        ];

        let chunks = chunk_blocks(blocks);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].number, None);
        assert_eq!(chunks[1].number, Some(1));
        assert!(chunks[1].body().contains("appears again inline"));
        assert_eq!(chunks[2].number, Some(2));
    }

    #[test]
    fn specification_by_ordinal_threshold() {
        let blocks = vec![
            para("1. Subject", true),
            para("16. Appendix", true),
            Block::Table { rows: vec![vec!["A".into(), "1".into()]] },
        ];
        let chunks = chunk_blocks(blocks);
        let spec = chunks.iter().find(|c| c.is_specification).unwrap();
        assert_eq!(spec.number, Some(16));
    }

    #[test]
    fn specification_by_title_marker() {
        let blocks = vec![para("1. Subject", true), para("Спецификация товара", true)];
        let chunks = chunk_blocks(blocks);
        assert!(chunks.iter().any(|c| c.is_specification));
    }

    #[test]
    fn only_first_specification_candidate_is_marked() {
        let blocks = vec![
            para("16. Спецификация", true),
            para("17. Спецификация повторно", true),
        ];
        let chunks = chunk_blocks(blocks);
        let marked: Vec<_> = chunks.iter().filter(|c| c.is_specification).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].number, Some(16));
    }
}
