//! Memoized snapshot keyed by the signature of the discovered file set.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::discovery::{discover, signature};
use crate::models::Snapshot;
use crate::workbook::{SpreadsheetReader, WorkbookReader};

struct Cached {
    signature: String,
    snapshot: Arc<Snapshot>,
}

/// Owns the data directory, the workbook reader and the last snapshot.
///
/// `load` runs discovery, the cache decision and any rebuild under one lock,
/// so concurrent callers never rebuild twice or see a half-written cache.
pub struct SnapshotStore {
    data_dir: PathBuf,
    reader: Box<dyn WorkbookReader>,
    cached: Mutex<Option<Cached>>,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_reader(data_dir, SpreadsheetReader)
    }

    pub fn with_reader(data_dir: impl Into<PathBuf>, reader: impl WorkbookReader + 'static) -> Self {
        Self {
            data_dir: data_dir.into(),
            reader: Box::new(reader),
            cached: Mutex::new(None),
        }
    }

    pub fn load(&self, force: bool) -> Arc<Snapshot> {
        // holds either nothing or a complete snapshot
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        let files = discover(&self.data_dir);
        let current = signature(&files);
        if !force {
            if let Some(entry) = cached.as_ref().filter(|entry| entry.signature == current) {
                debug!(signature = %current, "serving cached snapshot");
                return Arc::clone(&entry.snapshot);
            }
        }

        info!(signature = %current, force, files = files.len(), "rebuilding snapshot");
        let snapshot = Arc::new(aggregate(&files, self.reader.as_ref()));
        *cached = Some(Cached {
            signature: current,
            snapshot: Arc::clone(&snapshot),
        });
        snapshot
    }

    /// Rebuilds regardless of the signature.
    pub fn refresh(&self) -> Arc<Snapshot> {
        self.load(true)
    }
}
