//! Read-only access to the primary sheet of a tabular file.
//!
//! calamine does not report which tab was active when the file was saved,
//! so the first visible sheet stands in for it.
//!
//! Spreadsheets go through `calamine` (cached formula values, no
//! recalculation); `.csv` exports go through `csv`. Both hand rows to the
//! parser as plain [`CellValue`] vectors.

use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, SheetVisible, Sheets};

use crate::error::SheetError;
use crate::models::CellValue;

pub type Row = Vec<CellValue>;

pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, SheetError>> + 'a>;

/// An open workbook handle.
pub trait Workbook {
    /// Rows of the primary sheet, top to bottom.
    fn rows(&mut self) -> Result<RowIter<'_>, SheetError>;

    /// Releases the underlying file. Calling it twice is harmless.
    fn close(&mut self);
}

pub trait WorkbookReader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn Workbook>, SheetError>;
}

/// Picks a backend from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetReader;

impl WorkbookReader for SpreadsheetReader {
    fn open(&self, path: &Path) -> Result<Box<dyn Workbook>, SheetError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Box::new(CsvWorkbook::open(path)?)),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(CalamineWorkbook::open(path)?)),
            other => Err(SheetError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub struct CalamineWorkbook {
    sheets: Option<Sheets<BufReader<File>>>,
}

impl CalamineWorkbook {
    pub fn open(path: &Path) -> Result<Self, SheetError> {
        Ok(Self {
            sheets: Some(open_workbook_auto(path)?),
        })
    }
}

impl Workbook for CalamineWorkbook {
    fn rows(&mut self) -> Result<RowIter<'_>, SheetError> {
        let sheets = self.sheets.as_mut().ok_or(SheetError::Closed)?;
        let visibility: Vec<SheetVisible> = sheets
            .sheets_metadata()
            .iter()
            .map(|sheet| sheet.visible)
            .collect();
        let range = sheets
            .worksheet_range_at(primary_sheet_index(&visibility))
            .ok_or(SheetError::NoSheets)??;
        let rows: Vec<Row> = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }

    fn close(&mut self) {
        self.sheets = None;
    }
}

/// First visible sheet, or 0 when every sheet is hidden.
fn primary_sheet_index(visibility: &[SheetVisible]) -> usize {
    visibility
        .iter()
        .position(|visible| *visible == SheetVisible::Visible)
        .unwrap_or(0)
}

impl From<&Data> for CellValue {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => CellValue::Empty,
            Data::String(text) => CellValue::Text(text.clone()),
            Data::Int(number) => CellValue::Number(*number as f64),
            Data::Float(number) => CellValue::Number(*number),
            Data::Bool(flag) => CellValue::Boolean(*flag),
            other => CellValue::Text(other.to_string()),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvWorkbook {
    reader: Option<csv::Reader<Cursor<Vec<u8>>>>,
}

impl CsvWorkbook {
    pub fn open(path: &Path) -> Result<Self, SheetError> {
        let bytes = fs::read(path)?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        let delimiter = sniff_delimiter(&bytes);
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(Cursor::new(bytes));
        Self {
            reader: Some(reader),
        }
    }
}

impl Workbook for CsvWorkbook {
    fn rows(&mut self) -> Result<RowIter<'_>, SheetError> {
        let reader = self.reader.as_mut().ok_or(SheetError::Closed)?;
        Ok(Box::new(reader.records().map(|record| -> Result<Row, SheetError> {
            let record = record?;
            Ok(record.iter().map(csv_cell).collect())
        })))
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

fn csv_cell(field: &str) -> CellValue {
    if field.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field.to_string())
    }
}

/// Spreadsheet exports in ru locales use `;`.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|byte| *byte == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|byte| **byte == b';').count();
    let commas = first_line.iter().filter(|byte| **byte == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(workbook: &mut dyn Workbook) -> Vec<Row> {
        workbook
            .rows()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn csv_rows_are_ragged_text() {
        let mut workbook = CsvWorkbook::from_bytes("ФИО,Результат\nIvan,зач\nPetr\n".as_bytes().to_vec());
        let rows = collect(&mut workbook);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![CellValue::Text("Ivan".into()), CellValue::Text("зач".into())]);
        assert_eq!(rows[2], vec![CellValue::Text("Petr".into())]);
    }

    #[test]
    fn csv_semicolon_exports() {
        let mut workbook = CsvWorkbook::from_bytes(b"a;b;c\n1;;3\n".to_vec());
        let rows = collect(&mut workbook);
        assert_eq!(
            rows[1],
            vec![CellValue::Text("1".into()), CellValue::Empty, CellValue::Text("3".into())]
        );
    }

    #[test]
    fn csv_byte_order_mark_is_dropped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("ФИО;Статус\n".as_bytes());
        let mut workbook = CsvWorkbook::from_bytes(bytes);
        let rows = collect(&mut workbook);
        assert_eq!(rows[0][0], CellValue::Text("ФИО".into()));
    }

    #[test]
    fn closed_csv_refuses_rows() {
        let mut workbook = CsvWorkbook::from_bytes(b"a,b\n".to_vec());
        workbook.close();
        workbook.close();
        assert!(matches!(workbook.rows().err(), Some(SheetError::Closed)));
    }

    #[test]
    fn calamine_values_map_to_cells() {
        assert_eq!(CellValue::from(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from(&Data::Bool(false)), CellValue::Boolean(false));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        assert_eq!(
            CellValue::from(&Data::String("зачтено".into())),
            CellValue::Text("зачтено".into())
        );
    }

    #[test]
    fn hidden_leading_sheets_are_skipped() {
        use SheetVisible::{Hidden, VeryHidden, Visible};
        assert_eq!(primary_sheet_index(&[Visible, Visible]), 0);
        assert_eq!(primary_sheet_index(&[Hidden, VeryHidden, Visible]), 2);
        assert_eq!(primary_sheet_index(&[Hidden, Hidden]), 0);
        assert_eq!(primary_sheet_index(&[]), 0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = SpreadsheetReader.open(Path::new("HW01.txt")).err().unwrap();
        assert!(matches!(err, SheetError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn corrupt_spreadsheet_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("HW01.xlsx");
        fs::write(&path, b"not a zip archive").unwrap();
        assert!(SpreadsheetReader.open(&path).is_err());
    }
}
