//! Per-file failures.
//!
//! None of these abort a snapshot: the aggregator turns each one into a
//! warning and the offending file contributes no students.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    /// No row carried both a name column and a result column.
    #[error("Не найдены колонки ФИО и Результат (или Статус/Оценка) в первой таблице.")]
    HeaderNotFound,

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("workbook handle already closed")]
    Closed,

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SheetError {
    pub fn is_header_not_found(&self) -> bool {
        matches!(self, SheetError::HeaderNotFound)
    }
}
