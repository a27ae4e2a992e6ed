// EventScope - platform/mock.rs
//
// Scripted log backend for testing and demo mode.
//
// Supports scripted record sequences (including transient read failures),
// per-log access denial, and enumeration failure. All tests use this
// instead of the real Windows backend so the suite runs in CI on any
// platform; `--demo` wires it into the GUI the same way.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};

use crate::core::backend::{
    ClassicLogReader, ClassicRecord, LogBackend, LogKind, TracedLogReader, TracedRecord,
};
use crate::util::error::BackendError;

/// One step of a scripted traced-log read sequence, served newest-first.
#[derive(Debug, Clone)]
pub enum ScriptedRead {
    /// The reader yields this record.
    Record(TracedRecord),
    /// The reader reports a transient failure; the record it stood in for
    /// is lost.
    TransientFailure,
}

#[derive(Debug, Clone, Default)]
struct MockClassicLog {
    /// Records oldest-first, matching the indexed reader contract.
    records: Vec<ClassicRecord>,
    /// Indices whose reads fail transiently.
    failing_indices: HashSet<usize>,
    access_denied: bool,
    /// When set, `record_count` fails as if the whole log cannot load.
    unavailable: bool,
}

#[derive(Debug, Clone)]
struct MockTracedLog {
    kind: LogKind,
    /// Scripted reads, newest-first.
    steps: Vec<ScriptedRead>,
    access_denied: bool,
}

/// Scripted backend over an in-memory set of logs.
#[derive(Debug, Default)]
pub struct MockBackend {
    classic: HashMap<String, MockClassicLog>,
    // BTreeMap keeps enumeration deterministic across runs.
    traced: BTreeMap<String, MockTracedLog>,
    enumeration_fails: bool,
}

impl MockBackend {
    /// Empty backend: no logs, enumeration succeeds with nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a classic log with the given records (oldest-first).
    pub fn add_classic(&mut self, name: &str, records: Vec<ClassicRecord>) -> &mut Self {
        self.classic.insert(
            name.to_string(),
            MockClassicLog {
                records,
                ..Default::default()
            },
        );
        self
    }

    /// Add a traced log with a scripted read sequence (newest-first).
    pub fn add_traced(&mut self, name: &str, kind: LogKind, steps: Vec<ScriptedRead>) -> &mut Self {
        self.traced.insert(
            name.to_string(),
            MockTracedLog {
                kind,
                steps,
                access_denied: false,
            },
        );
        self
    }

    /// Make the named classic log fail to open with access denied.
    pub fn deny_classic(&mut self, name: &str) -> &mut Self {
        self.classic.entry(name.to_string()).or_default().access_denied = true;
        self
    }

    /// Make the named traced log fail to open with access denied.
    /// The name still appears in enumeration, as it does on a real machine.
    pub fn deny_traced(&mut self, name: &str) -> &mut Self {
        if let Some(log) = self.traced.get_mut(name) {
            log.access_denied = true;
        }
        self
    }

    /// Make `record_count` on the named classic log fail, as if the whole
    /// log cannot currently be loaded.
    pub fn make_classic_unavailable(&mut self, name: &str) -> &mut Self {
        if let Some(log) = self.classic.get_mut(name) {
            log.unavailable = true;
        }
        self
    }

    /// Make reads of the given record index fail transiently.
    pub fn fail_classic_record(&mut self, name: &str, index: usize) -> &mut Self {
        if let Some(log) = self.classic.get_mut(name) {
            log.failing_indices.insert(index);
        }
        self
    }

    /// Make `log_names` fail.
    pub fn fail_enumeration(&mut self) -> &mut Self {
        self.enumeration_fails = true;
        self
    }

    /// A plausible small machine: the four well-known classic logs plus a
    /// handful of traced channels, including analytic/debug channels that
    /// discovery must exclude. Used by `--demo` and as the baseline test
    /// fixture.
    pub fn with_demo_data() -> Self {
        let mut backend = Self::new();

        backend.add_classic(
            "Application",
            vec![
                classic(1000, "MsiInstaller", 1, 4, "Product installed: demo package."),
                classic(1001, "ESENT", 2, 4, "Database engine started."),
                classic(7031, "Service Control Manager", 3, 1, "A service terminated unexpectedly."),
                classic(1530, "User Profile Service", 4, 2, "Registry handles leaked on logoff."),
            ],
        );
        backend.add_classic(
            "Security",
            vec![
                classic(4624, "Security-Auditing", 5, 8, "An account was successfully logged on."),
                classic(4625, "Security-Auditing", 6, 16, "An account failed to log on."),
            ],
        );
        backend.add_classic(
            "Setup",
            vec![classic(2, "Servicing", 7, 4, "Package installation completed.")],
        );
        backend.add_classic(
            "System",
            vec![
                classic(6005, "EventLog", 8, 4, "The Event log service was started."),
                classic(41, "Kernel-Power", 9, 1, "The system rebooted without cleanly shutting down."),
            ],
        );

        backend.add_traced(
            "Microsoft-Windows-Bits-Client/Operational",
            LogKind::Operational,
            vec![
                traced("Bits-Client", 3, 12, "Warning", "Job cancelled by user."),
                traced("Bits-Client", 59, 11, "Information", "Transfer job started."),
            ],
        );
        backend.add_traced(
            "Microsoft-Windows-Diagnostics-Performance/Operational",
            LogKind::Operational,
            vec![traced(
                "Diagnostics-Performance",
                100,
                13,
                "Error",
                "Boot performance degradation detected.",
            )],
        );
        backend.add_traced(
            "Microsoft-Windows-Kernel-Power/Thermal-Operational",
            LogKind::Operational,
            vec![],
        );
        backend.add_traced(
            "Microsoft-Windows-Time-Service/Operational",
            LogKind::Operational,
            vec![traced(
                "Time-Service",
                258,
                14,
                "Information",
                "Time synchronised with the time source.",
            )],
        );
        // Excluded channel classes.
        backend.add_traced(
            "Microsoft-Windows-Kernel-EventTracing/Analytic",
            LogKind::Analytical,
            vec![],
        );
        backend.add_traced(
            "Microsoft-Windows-DriverFrameworks-UserMode/Debug",
            LogKind::Debug,
            vec![],
        );

        backend
    }
}

fn demo_timestamp(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, minute, 0).unwrap()
}

fn classic(event_id: i64, source: &str, minute: u32, type_code: u16, message: &str) -> ClassicRecord {
    ClassicRecord {
        source: source.to_string(),
        event_id,
        timestamp: Some(demo_timestamp(minute)),
        message: message.to_string(),
        type_code,
    }
}

fn traced(provider: &str, event_id: i64, minute: u32, level: &str, message: &str) -> ScriptedRead {
    ScriptedRead::Record(TracedRecord {
        provider: Some(provider.to_string()),
        event_id,
        timestamp: Some(demo_timestamp(minute)),
        level_display: Some(level.to_string()),
        message: Some(message.to_string()),
    })
}

// =============================================================================
// Readers
// =============================================================================

struct MockClassicReader {
    log_name: String,
    log: MockClassicLog,
}

impl ClassicLogReader for MockClassicReader {
    fn record_count(&mut self) -> Result<usize, BackendError> {
        if self.log.unavailable {
            return Err(BackendError::Unavailable {
                log_name: self.log_name.clone(),
                reason: "scripted unavailability".to_string(),
            });
        }
        Ok(self.log.records.len())
    }

    fn record_at(&mut self, index: usize) -> Result<ClassicRecord, BackendError> {
        if self.log.failing_indices.contains(&index) {
            return Err(BackendError::Transient {
                log_name: self.log_name.clone(),
                reason: format!("scripted failure at index {index}"),
            });
        }
        self.log
            .records
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::Transient {
                log_name: self.log_name.clone(),
                reason: format!("index {index} out of range"),
            })
    }
}

struct MockTracedReader {
    log_name: String,
    steps: std::vec::IntoIter<ScriptedRead>,
}

impl TracedLogReader for MockTracedReader {
    fn next_record(&mut self) -> Result<Option<TracedRecord>, BackendError> {
        match self.steps.next() {
            Some(ScriptedRead::Record(record)) => Ok(Some(record)),
            Some(ScriptedRead::TransientFailure) => Err(BackendError::Transient {
                log_name: self.log_name.clone(),
                reason: "scripted transient failure".to_string(),
            }),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Backend impl
// =============================================================================

impl LogBackend for MockBackend {
    fn log_names(&self) -> Result<Vec<String>, BackendError> {
        if self.enumeration_fails {
            return Err(BackendError::Unavailable {
                log_name: String::new(),
                reason: "scripted enumeration failure".to_string(),
            });
        }
        // Real enumeration includes the classic channels alongside the
        // traced ones; discovery's seen set is responsible for the dedup.
        let mut names: Vec<String> = self.classic.keys().cloned().collect();
        names.extend(self.traced.keys().cloned());
        Ok(names)
    }

    fn log_kind(&self, log_name: &str) -> Result<LogKind, BackendError> {
        if let Some(log) = self.traced.get(log_name) {
            return Ok(log.kind);
        }
        if self.classic.contains_key(log_name) {
            return Ok(LogKind::Administrative);
        }
        Err(BackendError::LogNotFound {
            log_name: log_name.to_string(),
        })
    }

    fn open_classic(&self, log_name: &str) -> Result<Box<dyn ClassicLogReader>, BackendError> {
        let log = self
            .classic
            .get(log_name)
            .ok_or_else(|| BackendError::LogNotFound {
                log_name: log_name.to_string(),
            })?;
        if log.access_denied {
            return Err(BackendError::AccessDenied {
                log_name: log_name.to_string(),
            });
        }
        Ok(Box::new(MockClassicReader {
            log_name: log_name.to_string(),
            log: log.clone(),
        }))
    }

    fn open_traced(
        &self,
        log_name: &str,
        newest_first: bool,
    ) -> Result<Box<dyn TracedLogReader>, BackendError> {
        let log = self
            .traced
            .get(log_name)
            .ok_or_else(|| BackendError::LogNotFound {
                log_name: log_name.to_string(),
            })?;
        if log.access_denied {
            return Err(BackendError::AccessDenied {
                log_name: log_name.to_string(),
            });
        }
        // Scripts are stored newest-first; flip them for the rare
        // oldest-first request.
        let mut steps = log.steps.clone();
        if !newest_first {
            steps.reverse();
        }
        Ok(Box::new(MockTracedReader {
            log_name: log_name.to_string(),
            steps: steps.into_iter(),
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================
