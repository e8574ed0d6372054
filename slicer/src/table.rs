//! Renders the specification chunk's tables as plain text (spec.md §4.2 step 5).
use crate::blocks::Block;
use crate::chunker::Chunk;

/// Renders one table row as `"TABLE: " + cells joined by " | "`.
pub fn render_table_line(row: &[String]) -> String {
    let cells: Vec<&str> = row.iter().map(|cell| cell.trim()).collect();
    format!("TABLE: {}", cells.join(" | "))
}

/// Renders every table in the specification chunk into `part_16` text.
///
/// Non-table blocks in the specification chunk are ignored at this stage
/// (spec.md §4.2 step 5); a specification chunk with no tables renders to
/// the empty string rather than failing the slice.
pub fn render_specification(chunk: Option<&Chunk>) -> String {
    let Some(chunk) = chunk else {
        return String::new();
    };

    let mut lines = Vec::new();
    for block in &chunk.blocks {
        if let Block::Table { rows } = block {
            for row in rows {
                lines.push(render_table_line(row));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_row_table_per_scenario_one() {
        let chunk = Chunk::for_test(
            Some(16),
            "Спецификация",
            vec![Block::Table {
                rows: vec![
                    vec!["A".into(), "1".into(), "шт".into(), "10".into(), "20".into(), "RU".into()],
                    vec!["B".into(), "2".into(), "кг".into(), "5".into(), "10".into(), "KZ".into()],
                ],
            }],
        );

        let rendered = render_specification(Some(&chunk));
        assert_eq!(
            rendered,
            "TABLE: A | 1 | шт | 10 | 20 | RU\nTABLE: B | 2 | кг | 5 | 10 | KZ"
        );
    }

    #[test]
    fn missing_specification_renders_empty() {
        assert_eq!(render_specification(None), "");
    }

    #[test]
    fn specification_with_no_tables_renders_empty() {
        let chunk = Chunk::for_test(Some(16), "Спецификация", vec![Block::Paragraph {
            text: "no tables here".into(),
            bold: false,
        }]);
        assert_eq!(render_specification(Some(&chunk)), "");
    }
}
