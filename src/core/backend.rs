// EventScope - core/backend.rs
//
// Log backend abstraction.
//
// `LogBackend` is the machine-level contract: enumerate channel names,
// classify them, and open per-log readers. Two reader traits cover the two
// subsystems: `ClassicLogReader` (indexed access over a fixed-schema log)
// and `TracedLogReader` (sequential access with an explicit end-of-data
// sentinel). Two impls of the backend exist:
//   - `EvtxBackend` — Windows-only, reads the machine's .evtx channel files
//   - `MockBackend` — all platforms, scripted records (in platform/mock.rs)
//
// The distinction between a transient per-record failure (an `Err` from
// `next_record`, to be skipped) and exhaustion (`Ok(None)`) is load-bearing:
// a backend hiccup must never be mistaken for the end of the log.

use chrono::{DateTime, Utc};

use crate::util::error::BackendError;

/// Classic-log type code value meaning "not set". Records carrying it have
/// no defined severity mapping and are skipped entirely during population.
pub const TYPE_CODE_NOT_SET: u16 = 0;

/// Backend classification of a traced log channel. Analytical and debug
/// channels are excluded from discovery, matching the built-in viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Administrative,
    Operational,
    Analytical,
    Debug,
}

impl LogKind {
    /// True for the two channel classes discovery filters out.
    pub fn is_excluded_from_discovery(&self) -> bool {
        matches!(self, LogKind::Analytical | LogKind::Debug)
    }
}

/// One raw record from a classic log, prior to normalisation.
#[derive(Debug, Clone)]
pub struct ClassicRecord {
    /// Name of the subsystem that wrote the record.
    pub source: String,

    /// Numeric instance identifier.
    pub event_id: i64,

    /// Generation time, when the record carries one.
    pub timestamp: Option<DateTime<Utc>>,

    /// Backend-formatted message text.
    pub message: String,

    /// Small integer type code; see `Severity::from_type_code`.
    /// `TYPE_CODE_NOT_SET` marks a record to be skipped.
    pub type_code: u16,
}

/// One raw record from a traced log, prior to normalisation.
#[derive(Debug, Clone)]
pub struct TracedRecord {
    /// Provider name, when the record carries one.
    pub provider: Option<String>,

    /// Numeric event identifier.
    pub event_id: i64,

    /// Creation time, when the record carries one.
    pub timestamp: Option<DateTime<Utc>>,

    /// Provider-defined level display name ("Information", "Warning", ...).
    pub level_display: Option<String>,

    /// Backend-formatted description. `None` when formatting failed because
    /// the provider's description resources are unavailable on this
    /// machine; the entry is still produced, with severity forced to
    /// `Unknown` and an empty message.
    pub message: Option<String>,
}

/// Indexed reader over one classic log.
///
/// Index 0 is the oldest record. Population walks from
/// `record_count() - 1` down to 0 and reverses the result.
pub trait ClassicLogReader: Send {
    /// Total records currently in the log.
    ///
    /// May fail when the log cannot be loaded as a whole; the caller
    /// aborts population cleanly with an empty result in that case.
    fn record_count(&mut self) -> Result<usize, BackendError>;

    /// Read the record at `index`. An individual failure is transient:
    /// the caller skips the record and moves on.
    fn record_at(&mut self, index: usize) -> Result<ClassicRecord, BackendError>;
}

/// Sequential reader over one traced log.
pub trait TracedLogReader: Send {
    /// Read the next record.
    ///
    /// - `Ok(Some(record))` — a record was read.
    /// - `Ok(None)` — the end-of-data sentinel; the only way the log ends.
    /// - `Err(_)` — a transient per-record failure; the caller skips it
    ///   and keeps reading.
    fn next_record(&mut self) -> Result<Option<TracedRecord>, BackendError>;
}

/// Machine-level log backend: channel enumeration plus reader construction.
pub trait LogBackend: Send + Sync {
    /// All log channel names exposed by this machine, in no particular
    /// order. Includes the well-known classic channels.
    fn log_names(&self) -> Result<Vec<String>, BackendError>;

    /// The backend's classification of the named channel, used to exclude
    /// analytical/debug logs from discovery.
    fn log_kind(&self, log_name: &str) -> Result<LogKind, BackendError>;

    /// Open an indexed reader over a classic log. Fails with
    /// `AccessDenied` when the caller lacks rights (expected for
    /// "Security" without elevation).
    fn open_classic(&self, log_name: &str) -> Result<Box<dyn ClassicLogReader>, BackendError>;

    /// Open a sequential reader over a traced log. `newest_first` selects
    /// reverse chronological order, the order population expects.
    /// A log with zero entries opens successfully.
    fn open_traced(
        &self,
        log_name: &str,
        newest_first: bool,
    ) -> Result<Box<dyn TracedLogReader>, BackendError>;
}
