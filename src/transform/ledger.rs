//! Append-only transformation ledger.
//!
//! The ledger is an injected dependency of the sandbox, so tests can
//! substitute [`MemoryLedger`] for the file-backed one. Records are appended
//! in issue order and never mutated or reordered; [`FileLedger`] persists
//! each entry as it is recorded, so a crash after N transformations never
//! loses entries 1..N.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Outcome of a requested transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The transformation committed; the table now has `shape_after`.
    Accepted { shape_after: (usize, usize) },
    /// The transformation was rejected before or during execution.
    Rejected { reason: String },
}

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationRecord {
    /// The expression text as issued by the caller.
    pub expression: String,
    /// Output label the caller asked the cleaned table to be saved under.
    pub label: String,
    /// Wall-clock time the record was created.
    pub timestamp: DateTime<Local>,
    /// Table shape before the transformation.
    pub shape_before: (usize, usize),
    /// Accepted (with resulting shape) or rejected (with reason).
    pub outcome: RecordOutcome,
}

impl TransformationRecord {
    /// Record a committed transformation.
    pub fn accepted(
        expression: impl Into<String>,
        label: impl Into<String>,
        shape_before: (usize, usize),
        shape_after: (usize, usize),
    ) -> Self {
        Self {
            expression: expression.into(),
            label: label.into(),
            timestamp: Local::now(),
            shape_before,
            outcome: RecordOutcome::Accepted { shape_after },
        }
    }

    /// Record a rejected transformation.
    pub fn rejected(
        expression: impl Into<String>,
        label: impl Into<String>,
        shape_before: (usize, usize),
        reason: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            label: label.into(),
            timestamp: Local::now(),
            shape_before,
            outcome: RecordOutcome::Rejected {
                reason: reason.into(),
            },
        }
    }

    /// Whether the record describes a committed transformation.
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Accepted { .. })
    }
}

impl fmt::Display for TransformationRecord {
    /// Human-readable one-line form used by the transformation log file.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.timestamp.format("%H:%M:%S");
        match &self.outcome {
            RecordOutcome::Accepted { shape_after } => write!(
                f,
                "- **{ts}:** EXECUTED {expr} | shape {before:?} -> {after:?}",
                expr = self.expression,
                before = self.shape_before,
                after = shape_after
            ),
            RecordOutcome::Rejected { reason } => write!(
                f,
                "- **{ts}:** REJECTED {expr} | {reason}",
                expr = self.expression
            ),
        }
    }
}

/// Ledger interface: append a record, read back ordered history.
pub trait TransformationLedger: Send + Sync {
    /// Append a record. Implementations must not reorder or drop prior
    /// entries.
    fn record(&self, record: &TransformationRecord);

    /// All records, in append order.
    fn history(&self) -> Vec<TransformationRecord>;
}

/// In-memory ledger for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<TransformationRecord>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransformationLedger for MemoryLedger {
    fn record(&self, record: &TransformationRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }

    fn history(&self) -> Vec<TransformationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Ledger that appends one timestamped line per record to a log file.
///
/// Writes are best-effort: failures to open or write the log file are
/// ignored, matching the advisory nature of the log. An in-memory mirror
/// serves `history()`.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    records: Mutex<Vec<TransformationRecord>>,
}

impl FileLedger {
    /// Create a file ledger appending to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: Mutex::new(Vec::new()),
        }
    }

    fn append_line(&self, line: &str) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl TransformationLedger for FileLedger {
    fn record(&self, record: &TransformationRecord) {
        self.append_line(&record.to_string());
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }

    fn history(&self) -> Vec<TransformationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}
