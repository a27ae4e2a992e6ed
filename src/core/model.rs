// EventScope - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// Severity
// =============================================================================

/// Normalised severity levels. A closed set: every raw level indicator a
/// backend can produce resolves to one of these variants, with `Unknown`
/// absorbing everything outside the recognised values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Severity {
    Error,
    Warning,
    Informational,
    /// A message that may be useful during debugging. Present in the
    /// normalised set but never produced by classification; reserved for
    /// providers that expose an explicit trace level.
    Trace,
    /// An action completed successfully. Used only by the Security log.
    AuditSuccess,
    /// An action was denied. Used only by the Security log.
    AuditFailure,
    /// The raw level indicator was not one of the known values.
    ///
    /// Traced logs expose levels as display strings defined by the logging
    /// provider; classification compares against known English names and
    /// will therefore resolve to `Unknown` on non-English installations.
    /// Documented limitation of the string comparison, not a defect.
    #[default]
    Unknown,
}

/// Classic-log type code for "error" records.
const CLASSIC_ERROR: u16 = 1;
/// Classic-log type code for "warning" records.
const CLASSIC_WARNING: u16 = 2;
/// Classic-log type code for "information" records.
const CLASSIC_INFORMATION: u16 = 4;
/// Classic-log type code for successful security audits.
const CLASSIC_AUDIT_SUCCESS: u16 = 8;
/// Classic-log type code for failed security audits.
const CLASSIC_AUDIT_FAILURE: u16 = 16;

impl Severity {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Informational => "Information",
            Severity::Trace => "Trace",
            Severity::AuditSuccess => "Audit Success",
            Severity::AuditFailure => "Audit Failure",
            Severity::Unknown => "Unknown",
        }
    }

    /// Classify a classic-log type code.
    ///
    /// Total over all inputs: any code outside the known set resolves to
    /// `Unknown` rather than failing. The "not set" sentinel code 0 must be
    /// filtered out by the caller before classification is attempted; a
    /// record carrying it is skipped entirely.
    pub fn from_type_code(code: u16) -> Severity {
        match code {
            CLASSIC_ERROR => Severity::Error,
            CLASSIC_WARNING => Severity::Warning,
            CLASSIC_INFORMATION => Severity::Informational,
            CLASSIC_AUDIT_SUCCESS => Severity::AuditSuccess,
            CLASSIC_AUDIT_FAILURE => Severity::AuditFailure,
            _ => Severity::Unknown,
        }
    }

    /// Classify a traced-log level display name.
    ///
    /// Comparison is against the English display strings; any other string,
    /// localised variants included, resolves to `Unknown`.
    pub fn from_level_name(name: &str) -> Severity {
        match name {
            "Information" => Severity::Informational,
            "Warning" => Severity::Warning,
            "Error" => Severity::Error,
            _ => Severity::Unknown,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Log Entry (normalised output of population)
// =============================================================================

/// A single log event, normalised across both backend subsystems.
///
/// Built once from a raw backend record and never mutated afterwards.
/// This is the unit that flows through the display window regardless of
/// which subsystem produced it.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Normalised severity level.
    pub severity: Severity,

    /// Numerical identifier of the type of this entry. Backend-defined and
    /// not unique across sources; two representations of the same
    /// notification can carry different encodings of it.
    pub event_id: i64,

    /// Message text. Empty, never absent, when backend formatting fails.
    pub message: String,

    /// Name of the provider/subsystem that logged this entry.
    pub source: Option<String>,

    /// When the entry was logged. Classic records may lack one.
    pub timestamp: Option<DateTime<Utc>>,
}

impl LogEntry {
    /// One-line overview of the entry, used by the detail pane header.
    pub fn short_title(&self) -> String {
        match &self.source {
            Some(source) => format!("{} \u{2014} {}", self.event_id, source),
            None => self.event_id.to_string(),
        }
    }
}

/// Structural equality over (severity, message, source, timestamp).
///
/// `event_id` is deliberately excluded: the two subsystems encode the
/// identifier of "the same" notification differently, so including it
/// would make cross-subsystem duplicates compare unequal.
impl PartialEq for LogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity
            && self.message == other.message
            && self.source == other.source
            && self.timestamp == other.timestamp
    }
}

impl Eq for LogEntry {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn classic_codes_map_to_closed_set() {
        assert_eq!(Severity::from_type_code(1), Severity::Error);
        assert_eq!(Severity::from_type_code(2), Severity::Warning);
        assert_eq!(Severity::from_type_code(4), Severity::Informational);
        assert_eq!(Severity::from_type_code(8), Severity::AuditSuccess);
        assert_eq!(Severity::from_type_code(16), Severity::AuditFailure);
    }

    /// Any code outside the known set resolves to Unknown, never an error.
    #[test]
    fn unrecognised_classic_codes_resolve_to_unknown() {
        for code in [3u16, 5, 7, 17, 32, 255, u16::MAX] {
            assert_eq!(
                Severity::from_type_code(code),
                Severity::Unknown,
                "code {code} should classify as Unknown"
            );
        }
    }

    #[test]
    fn level_names_map_to_closed_set() {
        assert_eq!(
            Severity::from_level_name("Information"),
            Severity::Informational
        );
        assert_eq!(Severity::from_level_name("Warning"), Severity::Warning);
        assert_eq!(Severity::from_level_name("Error"), Severity::Error);
    }

    /// Unrecognised and localised level strings resolve to Unknown.
    #[test]
    fn unrecognised_level_names_resolve_to_unknown() {
        for name in ["", "information", "INFO", "Verbose", "Critical", "Fehler", "情報"] {
            assert_eq!(
                Severity::from_level_name(name),
                Severity::Unknown,
                "'{name}' should classify as Unknown"
            );
        }
    }

    #[test]
    fn equality_ignores_event_id() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let a = LogEntry {
            severity: Severity::Warning,
            event_id: 7001,
            message: "Service entered the running state.".to_string(),
            source: Some("Service Control Manager".to_string()),
            timestamp: Some(ts),
        };
        let b = LogEntry {
            event_id: 0x4000_1B59,
            ..a.clone()
        };
        assert_eq!(a, b, "entries differing only in event_id must be equal");
    }

    #[test]
    fn equality_is_structural_over_the_other_fields() {
        let a = LogEntry {
            severity: Severity::Informational,
            event_id: 1,
            message: "started".to_string(),
            source: None,
            timestamp: None,
        };
        let different_message = LogEntry {
            message: "stopped".to_string(),
            ..a.clone()
        };
        let different_severity = LogEntry {
            severity: Severity::Error,
            ..a.clone()
        };
        assert_ne!(a, different_message);
        assert_ne!(a, different_severity);
    }

    #[test]
    fn short_title_includes_source_when_present() {
        let entry = LogEntry {
            severity: Severity::Informational,
            event_id: 6005,
            message: String::new(),
            source: Some("EventLog".to_string()),
            timestamp: None,
        };
        assert_eq!(entry.short_title(), "6005 \u{2014} EventLog");

        let anonymous = LogEntry {
            source: None,
            ..entry
        };
        assert_eq!(anonymous.short_title(), "6005");
    }
}
