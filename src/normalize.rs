//! Canonical forms for header, name and result text.

use crate::models::CellValue;

/// Trims and collapses every whitespace run (NBSP included) to one ASCII space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_header(value: &CellValue) -> String {
    collapse_whitespace(&value.to_string().to_lowercase())
}

/// Like [`normalize_header`] but keeps the original case.
pub fn normalize_name(value: &CellValue) -> String {
    collapse_whitespace(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_lowercased_and_collapsed() {
        let value = CellValue::Text("  Ф.И.О\u{a0}\u{a0} Студента\t".to_string());
        assert_eq!(normalize_header(&value), "ф.и.о студента");
    }

    #[test]
    fn name_keeps_case() {
        let value = CellValue::Text(" Ivan\u{a0}  Ivanov ".to_string());
        assert_eq!(normalize_name(&value), "Ivan Ivanov");
    }

    #[test]
    fn empty_and_non_text_values() {
        assert_eq!(normalize_header(&CellValue::Empty), "");
        assert_eq!(normalize_name(&CellValue::Empty), "");
        assert_eq!(normalize_header(&CellValue::Number(3.0)), "3");
        assert_eq!(normalize_header(&CellValue::Boolean(false)), "false");
    }
}
