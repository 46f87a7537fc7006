//! Extracts `name -> result` from one assignment workbook.

use std::collections::BTreeMap;

use tracing::debug;

use crate::classify::classify;
use crate::error::SheetError;
use crate::models::{AssignmentFile, CellValue, ResultOutcome};
use crate::normalize::{normalize_header, normalize_name};
use crate::workbook::{Workbook, WorkbookReader};

const NAME_HEADER_TOKENS: &[&str] = &["фио", "ф.и.о", "name"];
const RESULT_HEADER_TOKENS: &[&str] = &["результ", "статус", "оцен"];

/// Student results of one sheet, keyed by normalized name.
pub type SheetResults = BTreeMap<String, ResultOutcome>;

/// Releases the workbook however the parse ends.
struct OpenWorkbook(Box<dyn Workbook>);

impl Drop for OpenWorkbook {
    fn drop(&mut self) {
        self.0.close();
    }
}

pub fn parse_file(file: &AssignmentFile, reader: &dyn WorkbookReader) -> Result<SheetResults, SheetError> {
    let mut workbook = OpenWorkbook(reader.open(&file.path)?);
    let results = read_results(workbook.0.as_mut())?;
    debug!(file = %file.file_name(), students = results.len(), "parsed assignment");
    Ok(results)
}

pub fn read_results(workbook: &mut dyn Workbook) -> Result<SheetResults, SheetError> {
    let mut columns: Option<(usize, usize)> = None;
    let mut results = SheetResults::new();

    for row in workbook.rows()? {
        let row = row?;
        let Some((name_idx, result_idx)) = columns else {
            columns = find_header(&row);
            continue;
        };
        let Some(name_cell) = row.get(name_idx) else {
            continue;
        };
        let name = normalize_name(name_cell);
        if is_noise_name(&name) {
            continue;
        }
        let result = classify(row.get(result_idx).unwrap_or(&CellValue::Empty));
        results.insert(name, result);
    }

    if columns.is_none() {
        return Err(SheetError::HeaderNotFound);
    }
    Ok(results)
}

/// Column indices of the name and result headers when the row has both.
///
/// A later matching cell overrides an earlier one, and a single cell may
/// serve as both.
pub fn find_header(row: &[CellValue]) -> Option<(usize, usize)> {
    let mut name_idx = None;
    let mut result_idx = None;
    for (i, cell) in row.iter().enumerate() {
        let header = normalize_header(cell);
        if NAME_HEADER_TOKENS.iter().any(|token| header.contains(token)) {
            name_idx = Some(i);
        }
        if RESULT_HEADER_TOKENS.iter().any(|token| header.contains(token)) {
            result_idx = Some(i);
        }
    }
    name_idx.zip(result_idx)
}

/// Empty names and summary rows such as "Итого".
pub fn is_noise_name(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let lowered = name.to_lowercase();
    lowered == "итого" || lowered == "всего" || lowered.starts_with("итого ")
}
