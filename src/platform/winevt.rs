// EventScope - platform/winevt.rs
//
// Windows log backend over the machine's .evtx channel files
// (%SystemRoot%\System32\winevt\Logs). Channel names are encoded into the
// filenames with "/" replaced by "%4"; the four classic channels live in
// Application.evtx, Security.evtx, Setup.evtx, and System.evtx alongside
// the traced channels.
//
// Rendered descriptions are only present when the file carries a
// RenderingInfo block; otherwise the message is synthesised from the
// record's EventData values, and a record with neither yields the
// formatting-failure path (empty message, Unknown severity) downstream.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::backend::{
    ClassicLogReader, ClassicRecord, LogBackend, LogKind, TracedLogReader, TracedRecord,
    TYPE_CODE_NOT_SET,
};
use crate::util::error::BackendError;

/// Filename encoding of '/' in channel names.
const CHANNEL_SEPARATOR_ENCODED: &str = "%4";

/// Audit keyword bits carried by Security log records.
const KEYWORD_AUDIT_SUCCESS: u64 = 0x0020_0000_0000_0000;
const KEYWORD_AUDIT_FAILURE: u64 = 0x0010_0000_0000_0000;

/// Classic type codes synthesised from record level/keywords.
const CLASSIC_ERROR: u16 = 1;
const CLASSIC_WARNING: u16 = 2;
const CLASSIC_INFORMATION: u16 = 4;
const CLASSIC_AUDIT_SUCCESS: u16 = 8;
const CLASSIC_AUDIT_FAILURE: u16 = 16;

/// Backend reading the local machine's event log channel files.
pub struct EvtxBackend {
    logs_dir: PathBuf,
}

impl EvtxBackend {
    /// Backend over the default channel directory.
    pub fn new() -> Self {
        let system_root =
            std::env::var("SystemRoot").unwrap_or_else(|_| r"C:\Windows".to_string());
        Self {
            logs_dir: Path::new(&system_root)
                .join("System32")
                .join("winevt")
                .join("Logs"),
        }
    }

    /// Backend over an explicit channel directory (exported log sets).
    pub fn with_logs_dir(logs_dir: PathBuf) -> Self {
        Self { logs_dir }
    }

    fn channel_path(&self, log_name: &str) -> PathBuf {
        let encoded = log_name.replace('/', CHANNEL_SEPARATOR_ENCODED);
        self.logs_dir.join(format!("{encoded}.evtx"))
    }

    /// Classify a construction-time failure against the channel file so
    /// discovery can distinguish access denial from absence.
    fn open_error(&self, log_name: &str) -> BackendError {
        match fs::metadata(self.channel_path(log_name)) {
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => BackendError::AccessDenied {
                log_name: log_name.to_string(),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BackendError::LogNotFound {
                log_name: log_name.to_string(),
            },
            Err(e) => BackendError::Io {
                path: self.channel_path(log_name),
                operation: "open",
                source: e,
            },
            Ok(_) => BackendError::Unavailable {
                log_name: log_name.to_string(),
                reason: "channel file exists but cannot be parsed".to_string(),
            },
        }
    }
}

impl Default for EvtxBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_channel_name(stem: &str) -> String {
    stem.replace(CHANNEL_SEPARATOR_ENCODED, "/")
}

impl LogBackend for EvtxBackend {
    fn log_names(&self) -> Result<Vec<String>, BackendError> {
        let dir = fs::read_dir(&self.logs_dir).map_err(|e| BackendError::Io {
            path: self.logs_dir.clone(),
            operation: "enumerate channels",
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in dir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "Unreadable directory entry skipped");
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("evtx") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(decode_channel_name(stem));
            }
        }
        Ok(names)
    }

    fn log_kind(&self, log_name: &str) -> Result<LogKind, BackendError> {
        // The channel class is conventionally the trailing path segment of
        // the channel name; the four classic channels have no segment and
        // are administrative.
        let kind = match log_name.rsplit('/').next() {
            Some("Analytic") => LogKind::Analytical,
            Some("Debug") => LogKind::Debug,
            Some("Operational") => LogKind::Operational,
            _ => LogKind::Administrative,
        };
        Ok(kind)
    }

    fn open_classic(&self, log_name: &str) -> Result<Box<dyn ClassicLogReader>, BackendError> {
        // Opening is also the access probe: a denied or missing channel
        // must fail construction, not the later population.
        let path = self.channel_path(log_name);
        if fs::metadata(&path).is_err() {
            return Err(self.open_error(log_name));
        }
        Ok(Box::new(EvtxClassicReader {
            log_name: log_name.to_string(),
            path,
            records: None,
        }))
    }

    fn open_traced(
        &self,
        log_name: &str,
        newest_first: bool,
    ) -> Result<Box<dyn TracedLogReader>, BackendError> {
        let path = self.channel_path(log_name);
        let mut raw = load_raw_records(&path, log_name).map_err(|_| self.open_error(log_name))?;

        // Record ids are assigned in write order; descending id is newest
        // first.
        if newest_first {
            raw.sort_by(|a, b| b.record_id.cmp(&a.record_id));
        } else {
            raw.sort_by(|a, b| a.record_id.cmp(&b.record_id));
        }

        let records: Vec<TracedRecord> = raw.into_iter().map(traced_from_raw).collect();
        Ok(Box::new(EvtxTracedReader {
            records: records.into_iter(),
        }))
    }
}

// =============================================================================
// Raw record loading
// =============================================================================

struct RawRecord {
    record_id: u64,
    timestamp: DateTime<Utc>,
    data: Value,
}

/// Parse every record in the channel file, skipping individually
/// malformed ones.
fn load_raw_records(path: &Path, log_name: &str) -> Result<Vec<RawRecord>, BackendError> {
    let mut parser =
        evtx::EvtxParser::from_path(path).map_err(|e| BackendError::Unavailable {
            log_name: log_name.to_string(),
            reason: e.to_string(),
        })?;

    let mut records = Vec::new();
    let mut skipped: usize = 0;
    for record in parser.records_json_value() {
        match record {
            Ok(r) => records.push(RawRecord {
                record_id: r.event_record_id,
                timestamp: r.timestamp,
                data: r.data,
            }),
            Err(e) => {
                skipped += 1;
                tracing::debug!(log = log_name, error = %e, "Malformed record skipped");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(log = log_name, skipped, "Records skipped during channel load");
    }
    Ok(records)
}

// =============================================================================
// JSON field extraction
// =============================================================================

fn system(value: &Value) -> Option<&Value> {
    value.get("Event")?.get("System")
}

fn provider_name(value: &Value) -> Option<String> {
    system(value)?
        .get("Provider")?
        .get("#attributes")?
        .get("Name")?
        .as_str()
        .map(str::to_string)
}

fn event_id(value: &Value) -> i64 {
    let field = match system(value).and_then(|s| s.get("EventID")) {
        Some(f) => f,
        None => return 0,
    };
    // Qualified ids render as {"#attributes": {...}, "#text": N}.
    field
        .as_i64()
        .or_else(|| field.get("#text").and_then(Value::as_i64))
        .unwrap_or(0)
}

fn level_code(value: &Value) -> Option<u64> {
    let field = system(value)?.get("Level")?;
    field
        .as_u64()
        .or_else(|| field.as_str().and_then(|s| s.parse().ok()))
}

fn keywords(value: &Value) -> Option<u64> {
    let raw = system(value)?.get("Keywords")?.as_str()?;
    u64::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
}

/// The rendered description, when the channel file carries one.
fn rendered_message(value: &Value) -> Option<String> {
    value
        .get("Event")?
        .get("RenderingInfo")?
        .get("Message")?
        .as_str()
        .map(str::to_string)
}

/// Fallback description from the record's data values.
fn event_data_text(value: &Value) -> Option<String> {
    let data = value.get("Event")?.get("EventData")?.as_object()?;
    let mut parts: Vec<String> = Vec::new();
    for (name, field) in data {
        match field {
            Value::String(s) => parts.push(format!("{name}: {s}")),
            Value::Number(n) => parts.push(format!("{name}: {n}")),
            _ => {}
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Human-readable level name for the standard record level values.
fn level_display_name(level: u64) -> Option<&'static str> {
    match level {
        0 => Some("LogAlways"),
        1 => Some("Critical"),
        2 => Some("Error"),
        3 => Some("Warning"),
        4 => Some("Information"),
        5 => Some("Verbose"),
        _ => None,
    }
}

/// Synthesise the classic type code from level and audit keywords.
fn classic_type_code(level: Option<u64>, keywords: Option<u64>) -> u16 {
    if let Some(kw) = keywords {
        if kw & KEYWORD_AUDIT_SUCCESS != 0 {
            return CLASSIC_AUDIT_SUCCESS;
        }
        if kw & KEYWORD_AUDIT_FAILURE != 0 {
            return CLASSIC_AUDIT_FAILURE;
        }
    }
    match level {
        Some(1) | Some(2) => CLASSIC_ERROR,
        Some(3) => CLASSIC_WARNING,
        Some(0) | Some(4) => CLASSIC_INFORMATION,
        // Unknown codes pass through and classify to Unknown downstream.
        Some(other) => u16::try_from(other).unwrap_or(u16::MAX),
        None => TYPE_CODE_NOT_SET,
    }
}

fn traced_from_raw(raw: RawRecord) -> TracedRecord {
    let message = rendered_message(&raw.data).or_else(|| event_data_text(&raw.data));
    TracedRecord {
        provider: provider_name(&raw.data),
        event_id: event_id(&raw.data),
        timestamp: Some(raw.timestamp),
        level_display: level_code(&raw.data)
            .and_then(level_display_name)
            .map(str::to_string),
        message,
    }
}

fn classic_from_raw(raw: RawRecord) -> ClassicRecord {
    let level = level_code(&raw.data);
    let kw = keywords(&raw.data);
    ClassicRecord {
        source: provider_name(&raw.data).unwrap_or_default(),
        event_id: event_id(&raw.data),
        timestamp: Some(raw.timestamp),
        message: rendered_message(&raw.data)
            .or_else(|| event_data_text(&raw.data))
            .unwrap_or_default(),
        type_code: classic_type_code(level, kw),
    }
}

// =============================================================================
// Readers
// =============================================================================

/// Indexed reader over one classic channel. Records load on the first
/// `record_count` call, which is where whole-log unavailability surfaces.
struct EvtxClassicReader {
    log_name: String,
    path: PathBuf,
    records: Option<Vec<ClassicRecord>>,
}

impl EvtxClassicReader {
    fn load(&mut self) -> Result<&Vec<ClassicRecord>, BackendError> {
        if self.records.is_none() {
            let mut raw = load_raw_records(&self.path, &self.log_name)?;
            // Index 0 is the oldest record.
            raw.sort_by(|a, b| a.record_id.cmp(&b.record_id));
            self.records = Some(raw.into_iter().map(classic_from_raw).collect());
        }
        Ok(self.records.as_ref().unwrap())
    }
}

impl ClassicLogReader for EvtxClassicReader {
    fn record_count(&mut self) -> Result<usize, BackendError> {
        Ok(self.load()?.len())
    }

    fn record_at(&mut self, index: usize) -> Result<ClassicRecord, BackendError> {
        let log_name = self.log_name.clone();
        self.load()?
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::Transient {
                log_name,
                reason: format!("record index {index} out of range"),
            })
    }
}

struct EvtxTracedReader {
    records: std::vec::IntoIter<TracedRecord>,
}

impl TracedLogReader for EvtxTracedReader {
    fn next_record(&mut self) -> Result<Option<TracedRecord>, BackendError> {
        // Malformed records were already skipped at load; what remains
        // always reads cleanly, so the end sentinel is the only outcome
        // past the last record.
        Ok(self.records.next())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_names_round_trip_through_filenames() {
        let backend = EvtxBackend::with_logs_dir(PathBuf::from(r"C:\logs"));
        let path = backend.channel_path("Microsoft-Windows-Bits-Client/Operational");
        assert!(path
            .to_str()
            .unwrap()
            .ends_with("Microsoft-Windows-Bits-Client%4Operational.evtx"));
        assert_eq!(
            decode_channel_name("Microsoft-Windows-Bits-Client%4Operational"),
            "Microsoft-Windows-Bits-Client/Operational"
        );
    }

    #[test]
    fn kind_classification_follows_channel_suffix() {
        let backend = EvtxBackend::with_logs_dir(PathBuf::from(r"C:\logs"));
        let kind = |name: &str| backend.log_kind(name).unwrap();
        assert_eq!(kind("Microsoft-Windows-Foo/Analytic"), LogKind::Analytical);
        assert_eq!(kind("Microsoft-Windows-Foo/Debug"), LogKind::Debug);
        assert_eq!(kind("Microsoft-Windows-Foo/Operational"), LogKind::Operational);
        assert_eq!(kind("Microsoft-Windows-Foo/Admin"), LogKind::Administrative);
        assert_eq!(kind("Application"), LogKind::Administrative);
    }

    #[test]
    fn event_id_handles_plain_and_qualified_forms() {
        let plain = json!({"Event": {"System": {"EventID": 7036}}});
        assert_eq!(event_id(&plain), 7036);

        let qualified = json!({"Event": {"System": {"EventID": {
            "#attributes": {"Qualifiers": 16384}, "#text": 6005
        }}}});
        assert_eq!(event_id(&qualified), 6005);
    }

    #[test]
    fn audit_keywords_override_level_for_classic_type_code() {
        assert_eq!(
            classic_type_code(Some(0), Some(0x8020_0000_0000_0000)),
            CLASSIC_AUDIT_SUCCESS
        );
        assert_eq!(
            classic_type_code(Some(0), Some(0x8010_0000_0000_0000)),
            CLASSIC_AUDIT_FAILURE
        );
        assert_eq!(classic_type_code(Some(2), None), CLASSIC_ERROR);
        assert_eq!(classic_type_code(Some(3), None), CLASSIC_WARNING);
        assert_eq!(classic_type_code(Some(4), None), CLASSIC_INFORMATION);
        assert_eq!(classic_type_code(None, None), TYPE_CODE_NOT_SET);
    }

    #[test]
    fn missing_rendering_info_falls_back_to_event_data() {
        let value = json!({"Event": {"EventData": {
            "param1": "Windows Update",
            "param2": "running"
        }}});
        let text = event_data_text(&value).unwrap();
        assert!(text.contains("param1: Windows Update"));
        assert!(text.contains("param2: running"));

        let bare = json!({"Event": {"System": {}}});
        assert!(rendered_message(&bare).is_none());
        assert!(event_data_text(&bare).is_none());
    }
}
