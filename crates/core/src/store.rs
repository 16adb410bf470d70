//! Read-only adapters over the external submission store.
//!
//! The engine never writes to the store. Two adapters are provided:
//! - [`InMemoryStore`], for hosts that already hold records in memory;
//! - [`JsonDirStore`], one `*.json` record per file in a flat directory.

use crate::constants::SUBMISSION_FILE_EXTENSION;
use crate::submission::SubmissionRecord;
use crate::sweep::SweepFailure;
use crate::{TriageError, TriageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// One record as found in the store: decoded, or the reason it could not be.
pub type StoreEntry = Result<SubmissionRecord, SweepFailure>;

/// Source of submission records for evaluation.
pub trait SubmissionStore: Send + Sync {
    /// Returns every record currently in the store.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::StoreRead`] when the store itself cannot be read. A record that
    /// cannot be decoded is returned as an `Err` entry carrying its id, so callers can report it
    /// and carry on.
    fn list(&self) -> TriageResult<Vec<StoreEntry>>;

    /// Returns the record with the given id, if present.
    ///
    /// # Errors
    ///
    /// A stored record with this id that cannot be decoded yields its decode error.
    fn get(&self, id: &str) -> TriageResult<Option<SubmissionRecord>> {
        find_entry(self.list()?, id)
    }
}

fn find_entry(entries: Vec<StoreEntry>, id: &str) -> TriageResult<Option<SubmissionRecord>> {
    for entry in entries {
        match entry {
            Ok(record) if record.id == id => return Ok(Some(record)),
            Err(failure) if failure.submission_id == id => return Err(failure.error),
            _ => {}
        }
    }
    Ok(None)
}

/// Store backed by an in-memory list of records.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    records: Vec<SubmissionRecord>,
}

impl InMemoryStore {
    pub fn new(records: Vec<SubmissionRecord>) -> Self {
        Self { records }
    }
}

impl SubmissionStore for InMemoryStore {
    fn list(&self) -> TriageResult<Vec<StoreEntry>> {
        Ok(self.records.iter().cloned().map(Ok).collect())
    }
}

/// Store reading one JSON record per file from a directory.
///
/// Files without a `.json` extension and subdirectories are ignored. A file that cannot be
/// read or decoded becomes a [`TriageError::MalformedSubmission`] entry keyed by its `"id"`
/// field when one can be recovered, otherwise by the file stem.
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_entry(path: &Path) -> StoreEntry {
        let stem = || {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let malformed = |submission_id: String, reason: String| {
            tracing::warn!(
                path = %path.display(),
                submission_id = %submission_id,
                reason = %reason,
                "undecodable submission file"
            );
            SweepFailure {
                error: TriageError::MalformedSubmission {
                    id: submission_id.clone(),
                    reason,
                },
                submission_id,
            }
        };

        let contents = fs::read_to_string(path)
            .map_err(|err| malformed(stem(), format!("unreadable file: {err}")))?;

        serde_json::from_str::<SubmissionRecord>(&contents).map_err(|err| {
            let id = serde_json::from_str::<serde_json::Value>(&contents)
                .ok()
                .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_owned))
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(stem);
            malformed(id, format!("invalid record: {err}"))
        })
    }
}

/// True when `id` can name a file directly inside the store directory.
fn is_plain_file_name(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

impl SubmissionStore for JsonDirStore {
    fn list(&self) -> TriageResult<Vec<StoreEntry>> {
        let entries = fs::read_dir(&self.dir).map_err(TriageError::StoreRead)?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(TriageError::StoreRead)?.path();
            let is_record = path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(SUBMISSION_FILE_EXTENSION));
            if is_record {
                paths.push(path);
            }
        }
        paths.sort();

        let entries: Vec<_> = paths.iter().map(|p| Self::read_entry(p)).collect();
        tracing::debug!(
            dir = %self.dir.display(),
            files = paths.len(),
            undecodable = entries.iter().filter(|e| e.is_err()).count(),
            "listed submission store"
        );
        Ok(entries)
    }

    /// Reads `<id>.json` directly when it holds the record, scanning the directory otherwise.
    fn get(&self, id: &str) -> TriageResult<Option<SubmissionRecord>> {
        if is_plain_file_name(id) {
            let path = self.dir.join(format!("{id}.{SUBMISSION_FILE_EXTENSION}"));
            if path.is_file() {
                match Self::read_entry(&path) {
                    Ok(record) if record.id == id => return Ok(Some(record)),
                    Err(failure) if failure.submission_id == id => return Err(failure.error),
                    _ => {}
                }
            }
        }
        find_entry(self.list()?, id)
    }
}
