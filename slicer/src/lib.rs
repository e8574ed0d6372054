//! Converts a word-processing document into the canonical section map
//! (spec.md §4.2).
pub mod blocks;
pub mod chunker;
pub mod error;
pub mod heading;
pub mod map;
pub mod table;

use docx_rs::read_docx;
use tracing::debug;

pub use crate::chunker::Chunk;
pub use crate::error::{Error, Result};
pub use crate::map::SlicedDocument;

/// Parses `content` as a `.docx` document and slices it into the canonical
/// section map (spec.md §4.2 full pipeline).
///
/// A parse failure is the slicer's one client-visible error (spec.md §4.2
/// "Failure semantics"); everything past that point — including a
/// specification chunk with no tables — degrades to an empty `part_16`
/// rather than failing the slice.
pub fn slice(filename: &str, content: &[u8]) -> Result<SlicedDocument> {
    if content.is_empty() {
        return Err(Error::Empty { filename: filename.to_owned() });
    }

    let docx = read_docx(content).map_err(|source| Error::Parse { filename: filename.to_owned(), source })?;

    let raw_blocks = blocks::flatten(&docx);
    let chunks = chunker::chunk_blocks(raw_blocks);
    let parts = map::build_section_map(&chunks);

    debug!(filename, chunk_count = chunks.len(), "sliced document");

    Ok(SlicedDocument { chunks, parts })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_is_rejected() {
        let err = slice("empty.docx", &[]).unwrap_err();
        assert!(matches!(err, Error::Empty { .. }));
    }

    #[test]
    fn garbage_bytes_surface_as_parse_error() {
        let err = slice("garbage.docx", b"not a zip file").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
