//! Finds assignment files in the data directory.
//!
//! A file is an assignment when its name carries an `HW<n>` token. Several
//! uploads of the same assignment may coexist; only the most recently
//! modified one is kept.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::models::AssignmentFile;

pub const EMPTY_SIGNATURE: &str = "empty";

/// Extensions handed to the workbook reader.
pub const TABULAR_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

static INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HW\s*0*(\d+)").expect("valid index pattern"));

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(20\d{2})\.(\d{2})\.(\d{2})(?:\s+(\d{2})\s+(\d{2}))?")
        .expect("valid date pattern")
});

/// Scans `dir` and returns one file per assignment index, ascending.
///
/// An unreadable directory yields no files.
pub fn discover(dir: &Path) -> Vec<AssignmentFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "cannot read data directory");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !is_tabular(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with("~$") || name.starts_with('.') {
            continue;
        }
        let Some(index) = parse_index(name) else {
            debug!(file = name, "no assignment index in file name, skipping");
            continue;
        };
        let modified = match entry.metadata().and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                warn!(file = name, error = %err, "cannot read modification time, skipping");
                continue;
            }
        };
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        candidates.push(AssignmentFile {
            index,
            label: label_for(index),
            date: parse_date(&stem),
            path,
            modified,
        });
    }

    select_latest(candidates)
}

/// Keeps the newest file per index and orders the survivors by index.
///
/// Equal modification times fall back to the greater file name, so the
/// outcome does not depend on the order candidates arrive in.
pub fn select_latest(candidates: impl IntoIterator<Item = AssignmentFile>) -> Vec<AssignmentFile> {
    let mut latest: BTreeMap<u32, AssignmentFile> = BTreeMap::new();
    for file in candidates {
        if let Some(current) = latest.get(&file.index) {
            if !is_newer(&file, current) {
                debug!(
                    kept = %current.file_name(),
                    dropped = %file.file_name(),
                    "older upload of the same assignment"
                );
                continue;
            }
        }
        latest.insert(file.index, file);
    }
    latest.into_values().collect()
}

fn is_newer(candidate: &AssignmentFile, current: &AssignmentFile) -> bool {
    (candidate.modified, candidate.file_name()) > (current.modified, current.file_name())
}

/// Short fingerprint of the file set and the version of each file.
pub fn signature(files: &[AssignmentFile]) -> String {
    if files.is_empty() {
        return EMPTY_SIGNATURE.to_string();
    }
    let base = files
        .iter()
        .map(|file| format!("{}:{}", file.file_name(), mtime_secs(file.modified)))
        .collect::<Vec<_>>()
        .join("|");
    let digest = Sha256::digest(base.as_bytes());
    hex::encode(digest)[..12].to_string()
}

pub fn mtime_secs(modified: SystemTime) -> u64 {
    modified
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

pub fn label_for(index: u32) -> String {
    format!("HW{index:02}")
}

pub fn parse_index(file_name: &str) -> Option<u32> {
    let captures = INDEX_RE.captures(file_name)?;
    let index: u32 = captures.get(1)?.as_str().parse().ok()?;
    (index > 0).then_some(index)
}

/// Reads a `YYYY.MM.DD[ HH MM]` token; impossible dates count as absent.
pub fn parse_date(stem: &str) -> Option<NaiveDateTime> {
    let captures = DATE_RE.captures(stem)?;
    let number = |i: usize| -> Option<u32> {
        captures
            .get(i)
            .map_or(Some(0), |group| group.as_str().parse().ok())
    };
    let year: i32 = captures.get(1)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?.and_hms_opt(number(4)?, number(5)?, 0)
}

fn is_tabular(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                TABULAR_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}
