//! Builds a [`Snapshot`] from every discovered assignment.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::discovery::{signature, EMPTY_SIGNATURE};
use crate::models::{
    AssignmentFile, AssignmentSummary, ResultOutcome, Snapshot, SnapshotMeta, SnapshotStats,
    StudentRecord,
};
use crate::parser::{parse_file, SheetResults};
use crate::risk;
use crate::workbook::WorkbookReader;

pub const NO_FILES_WARNING: &str = "Не найдено ни одного HW*.xlsx файла.";

/// One student's outcomes across assignments, positionally aligned.
struct Roster {
    name: String,
    outcomes: Vec<ResultOutcome>,
}

pub fn aggregate(files: &[AssignmentFile], reader: &dyn WorkbookReader) -> Snapshot {
    let generated_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    if files.is_empty() {
        return Snapshot {
            meta: SnapshotMeta {
                generated_at,
                hw_count: 0,
                signature: EMPTY_SIGNATURE.to_string(),
                source_files: Vec::new(),
                warnings: vec![NO_FILES_WARNING.to_string()],
            },
            hws: Vec::new(),
            students: Vec::new(),
            stats: SnapshotStats::default(),
        };
    }

    let mut warnings = Vec::new();
    let per_file: Vec<SheetResults> = files
        .iter()
        .map(|file| {
            parse_file(file, reader).unwrap_or_else(|err| {
                warn!(label = %file.label, file = %file.file_name(), error = %err, "skipping assignment");
                warnings.push(format!("{} ({}): {}", file.label, file.file_name(), err));
                SheetResults::new()
            })
        })
        .collect();

    let hw_count = files.len();
    let mut students: Vec<StudentRecord> = merge_rosters(&per_file, hw_count)
        .into_values()
        .map(|roster| student_record(roster, hw_count))
        .collect();
    risk::rank_students(&mut students);

    let stats = SnapshotStats {
        total: students.len(),
        counts_by_accepted: risk::counts_by_accepted(&students),
    };
    info!(
        assignments = hw_count,
        students = stats.total,
        warnings = warnings.len(),
        "snapshot built"
    );

    Snapshot {
        meta: SnapshotMeta {
            generated_at,
            hw_count,
            signature: signature(files),
            source_files: files.iter().map(AssignmentFile::file_name).collect(),
            warnings,
        },
        hws: files.iter().map(summary).collect(),
        students,
        stats,
    }
}

/// Unites students across files under their case-folded name.
///
/// The first spelling met in assignment order is the one displayed.
fn merge_rosters(per_file: &[SheetResults], hw_count: usize) -> BTreeMap<String, Roster> {
    let mut rosters: BTreeMap<String, Roster> = BTreeMap::new();
    for (position, results) in per_file.iter().enumerate() {
        for (name, result) in results {
            let roster = rosters
                .entry(name.to_lowercase())
                .or_insert_with(|| Roster {
                    name: name.clone(),
                    outcomes: vec![ResultOutcome::missing(); hw_count],
                });
            roster.outcomes[position] = result.clone();
        }
    }
    rosters
}

fn student_record(roster: Roster, hw_count: usize) -> StudentRecord {
    let per_hw: Vec<Option<u8>> = roster
        .outcomes
        .iter()
        .map(|result| result.outcome.as_flag())
        .collect();
    let accepted = per_hw.iter().filter(|flag| **flag == Some(1)).count();
    StudentRecord {
        status: risk::classify_status(accepted, hw_count, &per_hw),
        percent: risk::percent(accepted, hw_count),
        group: format!("{accepted}/{hw_count}"),
        per_hw_raw: roster.outcomes.into_iter().map(|result| result.raw).collect(),
        name: roster.name,
        accepted,
        per_hw,
        rank: 0,
    }
}

fn summary(file: &AssignmentFile) -> AssignmentSummary {
    AssignmentSummary {
        id: file.index,
        label: file.label.clone(),
        file: file.file_name(),
        date: file
            .date
            .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}
