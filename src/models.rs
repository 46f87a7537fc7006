use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::NaiveDateTime;
use serde::Serialize;

/// One assignment file found by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentFile {
    pub index: u32,
    pub label: String,
    pub path: PathBuf,
    pub date: Option<NaiveDateTime>,
    pub modified: SystemTime,
}

impl AssignmentFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A raw cell value as read from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Boolean(true) => f.write_str("True"),
            CellValue::Boolean(false) => f.write_str("False"),
            CellValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Pass,
    Fail,
    Unknown,
}

impl Outcome {
    /// Wire value for `per_hw`: 1, 0 or null.
    pub fn as_flag(self) -> Option<u8> {
        match self {
            Outcome::Pass => Some(1),
            Outcome::Fail => Some(0),
            Outcome::Unknown => None,
        }
    }
}

/// Classified result of one student on one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultOutcome {
    pub outcome: Outcome,
    pub raw: String,
}

impl ResultOutcome {
    pub fn new(outcome: Outcome, raw: impl Into<String>) -> Self {
        Self {
            outcome,
            raw: raw.into(),
        }
    }

    pub fn missing() -> Self {
        Self::new(Outcome::Unknown, "")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Status {
    #[serde(rename = "низкие показатели")]
    Low,
    #[serde(rename = "средние показатели")]
    Average,
    #[serde(rename = "хорошие показатели")]
    Good,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Good, Status::Average, Status::Low];

    pub fn label(self) -> &'static str {
        match self {
            Status::Low => "низкие показатели",
            Status::Average => "средние показатели",
            Status::Good => "хорошие показатели",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub name: String,
    pub accepted: usize,
    pub percent: f64,
    pub status: Status,
    pub group: String,
    pub per_hw: Vec<Option<u8>>,
    pub per_hw_raw: Vec<String>,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentSummary {
    pub id: u32,
    pub label: String,
    pub file: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotMeta {
    pub generated_at: String,
    pub hw_count: usize,
    pub signature: String,
    pub source_files: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub total: usize,
    pub counts_by_accepted: BTreeMap<String, usize>,
}

/// One fully aggregated view over every discovered assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub hws: Vec<AssignmentSummary>,
    pub students: Vec<StudentRecord>,
    pub stats: SnapshotStats,
}

impl Snapshot {
    pub fn hw_count(&self) -> usize {
        self.meta.hw_count
    }

    pub fn student(&self, name: &str) -> Option<&StudentRecord> {
        let wanted = name.to_lowercase();
        self.students
            .iter()
            .find(|student| student.name.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_flags_match_wire_format() {
        assert_eq!(Outcome::Pass.as_flag(), Some(1));
        assert_eq!(Outcome::Fail.as_flag(), Some(0));
        assert_eq!(Outcome::Unknown.as_flag(), None);
    }

    #[test]
    fn status_serializes_as_dashboard_label() {
        let value = serde_json::to_value(Status::Average).unwrap();
        assert_eq!(value, serde_json::json!("средние показатели"));
        assert_eq!(Status::Low.to_string(), "низкие показатели");
    }

    #[test]
    fn cell_values_display_like_source_text() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(0.5).to_string(), "0.5");
        assert_eq!(CellValue::Boolean(true).to_string(), "True");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
