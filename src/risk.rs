use std::collections::BTreeMap;

use crate::models::{Status, StudentRecord};

/// Leading assignments that must all be passed to escape the low tier.
pub const EARLY_WINDOW: usize = 4;

const GOOD_RATIO: f64 = 5.0 / 7.0;
const AVERAGE_RATIO: f64 = 3.0 / 7.0;

/// Tiers a student from the pass count and the per-assignment flags.
///
/// Anything short of a pass in the first `min(4, total)` assignments puts the
/// student in the low tier no matter how the rest of the term went.
pub fn classify_status(accepted: usize, total: usize, per_hw: &[Option<u8>]) -> Status {
    if total == 0 {
        return Status::Low;
    }
    if !passed_first(per_hw, EARLY_WINDOW.min(total)) {
        return Status::Low;
    }
    let ratio = accepted as f64 / total as f64;
    if ratio >= GOOD_RATIO {
        Status::Good
    } else if ratio >= AVERAGE_RATIO {
        Status::Average
    } else {
        Status::Low
    }
}

fn passed_first(per_hw: &[Option<u8>], window: usize) -> bool {
    window > 0 && per_hw.len() >= window && per_hw[..window].iter().all(|flag| *flag == Some(1))
}

/// Share of passed assignments as a percentage with one decimal.
///
/// Float formatting rounds the exact binary value half-to-even, so 1/16
/// (6.25%) becomes 6.2.
pub fn percent(accepted: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let value = accepted as f64 / total as f64 * 100.0;
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Orders by pass count, then case-insensitive name, and numbers from 1.
pub fn rank_students(students: &mut [StudentRecord]) {
    students.sort_by(|a, b| {
        b.accepted
            .cmp(&a.accepted)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    for (position, student) in students.iter_mut().enumerate() {
        student.rank = position + 1;
    }
}

/// Number of students per exact pass count.
pub fn counts_by_accepted(students: &[StudentRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for student in students {
        *counts.entry(student.accepted.to_string()).or_insert(0) += 1;
    }
    counts
}
