use std::fmt::Write;

use crate::models::{Snapshot, Status};

pub struct StatusSummary {
    pub status: Status,
    pub count: usize,
    pub avg_percent: f64,
}

pub fn summarize_by_status(snapshot: &Snapshot) -> Vec<StatusSummary> {
    Status::ALL
        .iter()
        .map(|status| {
            let members: Vec<f64> = snapshot
                .students
                .iter()
                .filter(|student| student.status == *status)
                .map(|student| student.percent)
                .collect();
            StatusSummary {
                status: *status,
                count: members.len(),
                avg_percent: if members.is_empty() {
                    0.0
                } else {
                    members.iter().sum::<f64>() / members.len() as f64
                },
            }
        })
        .collect()
}

/// Students passing each assignment, in assignment order.
pub fn passes_per_assignment(snapshot: &Snapshot) -> Vec<usize> {
    (0..snapshot.hw_count())
        .map(|position| {
            snapshot
                .students
                .iter()
                .filter(|student| student.per_hw.get(position) == Some(&Some(1)))
                .count()
        })
        .collect()
}

pub fn build_report(snapshot: &Snapshot, top: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Homework Scoreboard");
    let _ = writeln!(
        output,
        "Generated at {} from {} assignments (signature {})",
        snapshot.meta.generated_at, snapshot.meta.hw_count, snapshot.meta.signature
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");

    if snapshot.students.is_empty() {
        let _ = writeln!(output, "No students found.");
    } else {
        for summary in summarize_by_status(snapshot) {
            let _ = writeln!(
                output,
                "- {}: {} students (avg {:.1}%)",
                summary.status, summary.count, summary.avg_percent
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Students");

    if snapshot.students.is_empty() {
        let _ = writeln!(output, "No students found.");
    } else {
        for student in snapshot.students.iter().take(top) {
            let _ = writeln!(
                output,
                "{}. {} {} ({:.1}%, {})",
                student.rank, student.name, student.group, student.percent, student.status
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignments");

    if snapshot.hws.is_empty() {
        let _ = writeln!(output, "No assignment files found.");
    } else {
        let passes = passes_per_assignment(snapshot);
        for (hw, passed) in snapshot.hws.iter().zip(passes) {
            let _ = writeln!(
                output,
                "- {} ({}{}): {} of {} passed",
                hw.label,
                hw.file,
                hw.date
                    .as_deref()
                    .map(|date| format!(", {date}"))
                    .unwrap_or_default(),
                passed,
                snapshot.students.len()
            );
        }
    }

    if !snapshot.meta.warnings.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Warnings");
        for warning in &snapshot.meta.warnings {
            let _ = writeln!(output, "- {warning}");
        }
    }

    output
}
