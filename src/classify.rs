//! Maps free-form result cells onto pass/fail/unknown.
//!
//! Matching is by substring on the normalized text, and the negative list is
//! consulted first, so "не зачтено" is a fail even though it contains "зач".

use crate::models::{CellValue, Outcome, ResultOutcome};
use crate::normalize::collapse_whitespace;

const NEGATIVE_TOKENS: &[&str] = &["не зач", "незач", "не сдан", "не принят", "нет", "fail", "0"];

const POSITIVE_TOKENS: &[&str] = &["зач", "прин", "сдан", "ok", "passed", "1", "yes", "да"];

pub fn classify(value: &CellValue) -> ResultOutcome {
    match value {
        CellValue::Empty => ResultOutcome::missing(),
        CellValue::Boolean(passed) => {
            let outcome = if *passed { Outcome::Pass } else { Outcome::Fail };
            ResultOutcome::new(outcome, value.to_string())
        }
        CellValue::Number(number) => {
            let outcome = if *number == 0.0 {
                Outcome::Fail
            } else {
                Outcome::Pass
            };
            ResultOutcome::new(outcome, value.to_string())
        }
        CellValue::Text(text) => classify_text(text),
    }
}

fn classify_text(text: &str) -> ResultOutcome {
    let raw = text.trim();
    if raw.is_empty() {
        return ResultOutcome::missing();
    }
    let normalized = collapse_whitespace(&raw.to_lowercase());
    let outcome = if NEGATIVE_TOKENS.iter().any(|token| normalized.contains(token)) {
        Outcome::Fail
    } else if POSITIVE_TOKENS.iter().any(|token| normalized.contains(token)) {
        Outcome::Pass
    } else {
        Outcome::Unknown
    };
    ResultOutcome::new(outcome, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[test]
    fn empty_cells_are_unknown() {
        assert_eq!(classify(&CellValue::Empty), ResultOutcome::missing());
        assert_eq!(classify(&text("   ")), ResultOutcome::missing());
    }

    #[test]
    fn booleans_and_numbers() {
        assert_eq!(classify(&CellValue::Boolean(true)), ResultOutcome::new(Outcome::Pass, "True"));
        assert_eq!(classify(&CellValue::Boolean(false)), ResultOutcome::new(Outcome::Fail, "False"));
        assert_eq!(classify(&CellValue::Number(0.0)), ResultOutcome::new(Outcome::Fail, "0"));
        assert_eq!(classify(&CellValue::Number(2.5)), ResultOutcome::new(Outcome::Pass, "2.5"));
        assert_eq!(classify(&CellValue::Number(-1.0)).outcome, Outcome::Pass);
    }

    #[test]
    fn russian_vocabulary() {
        assert_eq!(classify(&text("зач")).outcome, Outcome::Pass);
        assert_eq!(classify(&text("Зачтено")).outcome, Outcome::Pass);
        assert_eq!(classify(&text("Принято")).outcome, Outcome::Pass);
        assert_eq!(classify(&text("Не зачтено")).outcome, Outcome::Fail);
        assert_eq!(classify(&text("НЕ\u{a0}СДАНО")).outcome, Outcome::Fail);
        assert_eq!(classify(&text("нет")).outcome, Outcome::Fail);
    }

    #[test]
    fn english_vocabulary() {
        assert_eq!(classify(&text("OK")).outcome, Outcome::Pass);
        assert_eq!(classify(&text("Passed")).outcome, Outcome::Pass);
        assert_eq!(classify(&text("yes")).outcome, Outcome::Pass);
        assert_eq!(classify(&text("FAIL")).outcome, Outcome::Fail);
    }

    #[test]
    fn negative_tokens_win_over_positive() {
        // "passed" and "0" both appear
        assert_eq!(classify(&text("passed 0 of 3")).outcome, Outcome::Fail);
        assert_eq!(classify(&text("10")).outcome, Outcome::Fail);
    }

    #[test]
    fn unrecognized_text_keeps_trimmed_raw() {
        let result = classify(&text("  на проверке  "));
        assert_eq!(result, ResultOutcome::new(Outcome::Unknown, "на проверке"));
    }
}
