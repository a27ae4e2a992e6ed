// EventScope - core/source.rs
//
// Log source handles: one long-lived handle per physical log, owning its
// backend reader and accumulating normalised entries.
//
// Two variants behind one trait:
//   - `ClassicLogSource` — the four fixed-schema legacy channels
//   - `TracedLogSource`  — arbitrary provider-based channels
//
// Both share the ordering contract (entries are oldest-first after
// `populate`) and the incremental cursor contract of `read`. Population
// contains every mid-enumeration failure locally; only construction-time
// failures propagate, so discovery can decide to skip a log.

use std::fmt;
use std::sync::Arc;

use crate::core::backend::{
    ClassicLogReader, LogBackend, TracedLogReader, TracedRecord, TYPE_CODE_NOT_SET,
};
use crate::core::model::{LogEntry, Severity};
use crate::util::constants::MAX_CONSECUTIVE_RECORD_FAILURES;
use crate::util::error::BackendError;

// =============================================================================
// LogSource trait
// =============================================================================

/// A source of log entries. `Send` so a source can be handed to a worker
/// thread for population and handed back.
pub trait LogSource: Send {
    /// Name of the log, stable for the handle's lifetime.
    fn log_name(&self) -> &str;

    /// The entries accumulated so far, oldest-first.
    fn entries(&self) -> &[LogEntry];

    /// Whether `populate` has completed since construction or the last
    /// reset. Distinguishes "never populated" from "populated and empty".
    fn is_populated(&self) -> bool;

    /// Run a full backend enumeration, replacing any previously
    /// accumulated entries and resetting the read cursor.
    ///
    /// Never fails: access problems mid-enumeration are contained and the
    /// source completes with whatever was gathered, possibly nothing.
    fn populate(&mut self);

    /// Return up to `count` entries starting at the internal cursor and
    /// advance the cursor by the number actually returned. Returns fewer
    /// than `count`, including zero, once the accumulated sequence is
    /// exhausted; never an error.
    fn read(&mut self, count: usize) -> Vec<LogEntry>;
}

/// Shared cursor advance for both variants.
fn read_batch(entries: &[LogEntry], cursor: &mut usize, count: usize) -> Vec<LogEntry> {
    let end = cursor.saturating_add(count).min(entries.len());
    let batch = entries[*cursor..end].to_vec();
    *cursor = end;
    batch
}

// =============================================================================
// Classic variant
// =============================================================================

/// Handle over one of the four fixed legacy logs.
pub struct ClassicLogSource {
    name: String,
    reader: Box<dyn ClassicLogReader>,
    entries: Vec<LogEntry>,
    cursor: usize,
    populated: bool,
}

impl ClassicLogSource {
    /// Open the named classic log. Propagates the backend error when the
    /// log cannot be opened, e.g. "Security" without sufficient privilege.
    pub fn open(backend: &dyn LogBackend, log_name: &str) -> Result<Self, BackendError> {
        let reader = backend.open_classic(log_name)?;
        Ok(Self {
            name: log_name.to_string(),
            reader,
            entries: Vec::new(),
            cursor: 0,
            populated: false,
        })
    }
}

impl LogSource for ClassicLogSource {
    fn log_name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    fn is_populated(&self) -> bool {
        self.populated
    }

    fn populate(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.populated = true;

        let count = match self.reader.record_count() {
            Ok(c) => c,
            Err(e) => {
                // The whole log failed to load; complete empty rather than
                // propagate.
                tracing::warn!(log = %self.name, error = %e, "Classic log unavailable");
                return;
            }
        };

        let mut collected: Vec<LogEntry> = Vec::with_capacity(count);

        // Walk newest to oldest; reversed below so entries end oldest-first.
        for index in (0..count).rev() {
            let record = match self.reader.record_at(index) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(log = %self.name, index, error = %e, "Record skipped");
                    continue;
                }
            };

            if record.type_code == TYPE_CODE_NOT_SET {
                // No severity mapping exists for the sentinel; skip the
                // record without attempting one.
                tracing::debug!(log = %self.name, index, "Record with unset type code skipped");
                continue;
            }

            collected.push(LogEntry {
                severity: Severity::from_type_code(record.type_code),
                event_id: record.event_id,
                message: record.message,
                source: Some(record.source),
                timestamp: record.timestamp,
            });
        }

        collected.reverse();
        tracing::debug!(log = %self.name, entries = collected.len(), "Classic log populated");
        self.entries = collected;
    }

    fn read(&mut self, count: usize) -> Vec<LogEntry> {
        read_batch(&self.entries, &mut self.cursor, count)
    }
}

impl fmt::Debug for ClassicLogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassicLogSource")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

// =============================================================================
// Traced variant
// =============================================================================

/// Handle over an arbitrary provider-based log, discovered by name.
pub struct TracedLogSource {
    name: String,
    backend: Arc<dyn LogBackend>,
    reader: Box<dyn TracedLogReader>,
    /// The sequential reader is exhausted by a population pass; the next
    /// pass must reopen it to start from the newest record again.
    reader_consumed: bool,
    entries: Vec<LogEntry>,
    cursor: usize,
    populated: bool,
}

impl TracedLogSource {
    /// Open a newest-first reader over the named log. Propagates the
    /// backend error on access denial; a log with zero entries opens
    /// successfully.
    pub fn open(backend: Arc<dyn LogBackend>, log_name: &str) -> Result<Self, BackendError> {
        let reader = backend.open_traced(log_name, true)?;
        Ok(Self {
            name: log_name.to_string(),
            backend,
            reader,
            reader_consumed: false,
            entries: Vec::new(),
            cursor: 0,
            populated: false,
        })
    }

    /// Convert one raw record. A record whose description could not be
    /// formatted still yields an entry: empty message, severity forced to
    /// `Unknown`.
    fn convert(record: TracedRecord) -> LogEntry {
        let severity = match &record.message {
            None => Severity::Unknown,
            Some(_) => record
                .level_display
                .as_deref()
                .map(Severity::from_level_name)
                .unwrap_or(Severity::Unknown),
        };

        LogEntry {
            severity,
            event_id: record.event_id,
            message: record.message.unwrap_or_default(),
            source: record.provider,
            timestamp: record.timestamp,
        }
    }
}

impl LogSource for TracedLogSource {
    fn log_name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    fn is_populated(&self) -> bool {
        self.populated
    }

    fn populate(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.populated = true;

        if self.reader_consumed {
            match self.backend.open_traced(&self.name, true) {
                Ok(reader) => self.reader = reader,
                Err(e) => {
                    // Reopen failure is a whole-log unavailability; complete
                    // empty rather than propagate.
                    tracing::warn!(log = %self.name, error = %e, "Traced log reopen failed");
                    return;
                }
            }
        }
        self.reader_consumed = true;

        let mut collected: Vec<LogEntry> = Vec::new();
        let mut consecutive_failures: u32 = 0;

        loop {
            match self.reader.next_record() {
                Ok(Some(record)) => {
                    consecutive_failures = 0;
                    collected.push(Self::convert(record));
                }
                // Only the explicit end-of-data sentinel terminates the loop.
                Ok(None) => break,
                Err(e) => {
                    // Transient failure: skip this record and keep reading.
                    consecutive_failures += 1;
                    tracing::debug!(log = %self.name, error = %e, "Record skipped");
                    if consecutive_failures >= MAX_CONSECUTIVE_RECORD_FAILURES {
                        tracing::warn!(
                            log = %self.name,
                            failures = consecutive_failures,
                            "Giving up on traced log after consecutive read failures"
                        );
                        break;
                    }
                }
            }
        }

        // Reader returned newest-first; store oldest-first to match the
        // classic variant's ordering contract.
        collected.reverse();
        tracing::debug!(log = %self.name, entries = collected.len(), "Traced log populated");
        self.entries = collected;
    }

    fn read(&mut self, count: usize) -> Vec<LogEntry> {
        read_batch(&self.entries, &mut self.cursor, count)
    }
}

impl fmt::Debug for TracedLogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedLogSource")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
