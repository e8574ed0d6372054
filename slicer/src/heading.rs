//! Numbered-heading detection (spec.md §4.2 step 2).

/// A paragraph's text is considered "short" enough to read as a heading on
/// length alone, even without a bold run. Unspecified in the distilled spec;
/// resolved here as a named constant (see SPEC_FULL.md §4.2, DESIGN.md).
pub const HEADING_MAX_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMatch {
    pub ordinal: u32,
}

/// Detects whether `text` opens a new numbered section.
///
/// A paragraph begins a section iff its first non-whitespace token is an
/// Arabic integer followed immediately by `.`, `)`, or `. ` (a leading `.`
/// covers both the bare-dot and period-space cases), AND the paragraph
/// carries heading-like visual weight: at least one bold run, or a total
/// length under [`HEADING_MAX_LEN`].
pub fn detect_heading(text: &str, has_bold_run: bool) -> Option<HeadingMatch> {
    let trimmed = text.trim_start();
    let ordinal = leading_ordinal(trimmed)?;

    let is_heading_weight = has_bold_run || text.trim().chars().count() <= HEADING_MAX_LEN;
    if !is_heading_weight {
        return None;
    }

    Some(HeadingMatch { ordinal })
}

fn leading_ordinal(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let rest = &s[digits.len()..];
    let has_delimiter = rest.starts_with('.') || rest.starts_with(')');
    if !has_delimiter {
        return None;
    }

    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_dot_delimited_ordinal() {
        let m = detect_heading("3. Subject of the agreement", false).unwrap();
        assert_eq!(m.ordinal, 3);
    }

    #[test]
    fn matches_parenthesis_delimited_ordinal() {
        let m = detect_heading("12) Liability", false).unwrap();
        assert_eq!(m.ordinal, 12);
    }

    #[test]
    fn matches_period_space_delimiter() {
        let m = detect_heading("1. Общие положения", false).unwrap();
        assert_eq!(m.ordinal, 1);
    }

    #[test]
    fn rejects_long_unbold_text_without_heading_weight() {
        let long_body = "4. ".to_string() + &"lorem ipsum ".repeat(20);
        assert!(detect_heading(&long_body, false).is_none());
    }

    #[test]
    fn accepts_long_text_when_bold() {
        let long_body = "4. ".to_string() + &"lorem ipsum ".repeat(20);
        assert!(detect_heading(&long_body, true).is_some());
    }

    #[test]
    fn rejects_text_with_no_leading_digit() {
        assert!(detect_heading("Section three", false).is_none());
    }

    #[test]
    fn rejects_digit_without_delimiter() {
        assert!(detect_heading("3 подпункта оплаты", false).is_none());
    }

    #[test]
    fn detects_ordinals_at_or_above_sixteen_for_specification_routing() {
        let m = detect_heading("16. Спецификация", true).unwrap();
        assert_eq!(m.ordinal, 16);
    }
}
