// EventScope - tests/e2e_catalog.rs
//
// End-to-end tests for the catalog and population pipeline.
//
// These tests exercise the real discovery path, real worker threads, and
// real channel hand-off over the scripted backend — the same wiring the
// GUI drives, minus the panels. They cover the externally observable
// contracts: catalog ordering and filtering, population failure
// containment, cursor-sequential reads, and display-window isolation when
// the active source changes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::TimeZone;

use eventscope::app::catalog::CatalogManager;
use eventscope::app::populate::{PopulateManager, PopulateProgress};
use eventscope::app::state::ViewerState;
use eventscope::core::backend::{ClassicRecord, LogBackend, LogKind, TracedRecord};
use eventscope::core::catalog::{discover_sources, CatalogProgress};
use eventscope::core::model::Severity;
use eventscope::core::source::{LogSource, TracedLogSource};
use eventscope::platform::mock::{MockBackend, ScriptedRead};

// =============================================================================
// Helpers
// =============================================================================

fn ts(minute: u32) -> chrono::DateTime<chrono::Utc> {
    chrono::Utc
        .with_ymd_and_hms(2024, 6, 1, 10, minute, 0)
        .unwrap()
}

fn classic(event_id: i64, minute: u32, type_code: u16) -> ClassicRecord {
    ClassicRecord {
        source: "TestService".to_string(),
        event_id,
        timestamp: Some(ts(minute)),
        message: format!("classic record {event_id}"),
        type_code,
    }
}

fn traced(event_id: i64, minute: u32) -> ScriptedRead {
    ScriptedRead::Record(TracedRecord {
        provider: Some("Test-Provider".to_string()),
        event_id,
        timestamp: Some(ts(minute)),
        level_display: Some("Information".to_string()),
        message: Some(format!("traced record {event_id}")),
    })
}

/// Run the full discovery pass synchronously, returning sources in
/// catalog order.
fn discover_all(backend: MockBackend) -> Vec<Box<dyn LogSource>> {
    let backend: Arc<dyn LogBackend> = Arc::new(backend);
    let mut sources = Vec::new();
    discover_sources(&backend, |source| sources.push(source));
    sources
}

/// Populate a source through the worker manager and wait for the
/// hand-back, as the GUI does.
fn populate_via_worker(
    manager: &mut PopulateManager,
    source: Box<dyn LogSource>,
) -> Box<dyn LogSource> {
    manager
        .start_populate(source)
        .ok()
        .expect("populate must start");
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        for msg in manager.poll_progress() {
            if let PopulateProgress::Completed { source, .. } = msg {
                return source;
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("population did not complete within the deadline");
}

// =============================================================================
// Catalog discovery
// =============================================================================

/// The catalog leads with the four well-known logs in fixed order, then
/// the traced channels sorted lexicographically, with no duplicates.
#[test]
fn e2e_catalog_ordering_and_dedup() {
    let sources = discover_all(MockBackend::with_demo_data());
    let names: Vec<&str> = sources.iter().map(|s| s.log_name()).collect();

    assert_eq!(&names[..4], &["Application", "Security", "Setup", "System"]);

    let tail = &names[4..];
    let mut sorted = tail.to_vec();
    sorted.sort();
    assert_eq!(tail, sorted.as_slice());

    let unique: std::collections::HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
}

/// "Application", "Setup", "System" are always present; "Security" is
/// present iff accessible.
#[test]
fn e2e_security_presence_tracks_accessibility() {
    let accessible = discover_all(MockBackend::with_demo_data());
    assert!(accessible.iter().any(|s| s.log_name() == "Security"));

    let mut backend = MockBackend::with_demo_data();
    backend.deny_classic("Security");
    let denied = discover_all(backend);

    let names: Vec<&str> = denied.iter().map(|s| s.log_name()).collect();
    assert!(!names.contains(&"Security"));
    for always in ["Application", "Setup", "System"] {
        assert!(names.contains(&always), "missing {always}");
    }
}

/// Discovery through the background manager streams the same catalog the
/// synchronous pass produces.
#[test]
fn e2e_background_discovery_matches_synchronous_catalog() {
    let expected: Vec<String> = discover_all(MockBackend::with_demo_data())
        .iter()
        .map(|s| s.log_name().to_string())
        .collect();

    let mut manager = CatalogManager::new();
    manager.ensure_started(Arc::new(MockBackend::with_demo_data()));

    let mut names: Vec<String> = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    'outer: while Instant::now() < deadline {
        for msg in manager.poll_progress() {
            match msg {
                CatalogProgress::SourcesAdded { sources } => {
                    names.extend(sources.iter().map(|s| s.log_name().to_string()));
                }
                CatalogProgress::DiscoveryCompleted { .. } => break 'outer,
                _ => {}
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(names, expected);
}

// =============================================================================
// Population scenarios
// =============================================================================

/// A classic log with 3 valid records and 1 carrying the "not set"
/// sentinel type code yields exactly 3 entries, oldest-first.
#[test]
fn e2e_classic_populate_drops_sentinel_record() {
    let mut backend = MockBackend::new();
    backend.add_classic(
        "Application",
        vec![
            classic(1, 1, 4),
            classic(2, 2, 0), // sentinel: severity mapping undefined
            classic(3, 3, 1),
            classic(4, 4, 2),
        ],
    );
    for name in ["Security", "Setup", "System"] {
        backend.add_classic(name, Vec::new());
    }

    let mut sources = discover_all(backend);
    let mut manager = PopulateManager::new();
    let source = populate_via_worker(&mut manager, sources.remove(0));

    let ids: Vec<i64> = source.entries().iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert_eq!(
        source.entries()[1].severity,
        Severity::Error,
        "type code 1 classifies as Error"
    );
}

/// A traced log whose reader fails transiently on record #2 of 5 yields 4
/// entries, oldest-first; the end sentinel after record #5 terminates the
/// loop without a 6th entry.
#[test]
fn e2e_traced_populate_survives_transient_failure() {
    let mut backend = MockBackend::new();
    // Newest-first script: records 5,4,3 then the failure standing in for
    // record 2, then record 1, then exhaustion.
    backend.add_traced(
        "Vendor-App/Operational",
        LogKind::Operational,
        vec![
            traced(5, 5),
            traced(4, 4),
            traced(3, 3),
            ScriptedRead::TransientFailure,
            traced(1, 1),
        ],
    );

    let backend: Arc<dyn LogBackend> = Arc::new(backend);
    let source = TracedLogSource::open(Arc::clone(&backend), "Vendor-App/Operational").unwrap();

    let mut manager = PopulateManager::new();
    let source = populate_via_worker(&mut manager, Box::new(source));

    let ids: Vec<i64> = source.entries().iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![1, 3, 4, 5], "4 entries, oldest-first, no 6th");
}

/// Cumulative reads across the full accumulated sequence yield exactly
/// that sequence, each entry once, in order.
#[test]
fn e2e_cumulative_reads_are_exact() {
    let mut backend = MockBackend::new();
    backend.add_classic(
        "System",
        (0..23).map(|i| classic(i, u32::try_from(i).unwrap(), 4)).collect(),
    );
    for name in ["Application", "Security", "Setup"] {
        backend.add_classic(name, Vec::new());
    }

    let mut sources = discover_all(backend);
    let position = sources
        .iter()
        .position(|s| s.log_name() == "System")
        .unwrap();
    let mut manager = PopulateManager::new();
    let mut source = populate_via_worker(&mut manager, sources.remove(position));

    let mut seen: Vec<i64> = Vec::new();
    loop {
        let batch = source.read(7);
        assert!(batch.len() <= 7, "never more than requested");
        if batch.is_empty() {
            break;
        }
        seen.extend(batch.iter().map(|e| e.event_id));
    }
    assert_eq!(seen, (0..23).collect::<Vec<i64>>());
}

// =============================================================================
// Display window isolation
// =============================================================================

/// set_active(A) → read_more → set_active(B): the display window holds
/// only entries from B, zero from A.
#[test]
fn e2e_switching_sources_isolates_the_display_window() {
    let mut backend = MockBackend::new();
    backend.add_classic(
        "Application",
        (0..6).map(|i| classic(100 + i, u32::try_from(i).unwrap(), 4)).collect(),
    );
    backend.add_classic(
        "System",
        (0..6).map(|i| classic(200 + i, u32::try_from(i).unwrap(), 1)).collect(),
    );
    for name in ["Security", "Setup"] {
        backend.add_classic(name, Vec::new());
    }

    let sources = discover_all(backend);
    let mut state = ViewerState::new(4);
    state.add_sources(sources);
    let mut manager = PopulateManager::new();

    let app_index = state
        .slots
        .iter()
        .position(|s| s.log_name == "Application")
        .unwrap();
    let sys_index = state
        .slots
        .iter()
        .position(|s| s.log_name == "System")
        .unwrap();

    // Activate Application, populate it through the worker, read a batch.
    state.set_active(app_index);
    let source = state.take_active_source().unwrap();
    let source = populate_via_worker(&mut manager, source);
    state.return_source(source);
    assert_eq!(state.read_more(), 4);
    assert!(state
        .displayed
        .iter()
        .all(|e| (100..200).contains(&e.event_id)));

    // Switch to System: the window clears immediately and refills only
    // with System entries.
    state.set_active(sys_index);
    assert!(state.displayed.is_empty(), "stale entries must not survive");

    let source = state.take_active_source().unwrap();
    let source = populate_via_worker(&mut manager, source);
    state.return_source(source);
    state.read_more();

    assert!(!state.displayed.is_empty());
    assert!(
        state.displayed.iter().all(|e| e.event_id >= 200),
        "no entries from the previously active source"
    );
}

// =============================================================================
// Normalisation
// =============================================================================

/// Two pipeline-produced entries with identical (severity, message,
/// source, timestamp) but different event id encodings compare equal.
#[test]
fn e2e_equality_ignores_event_id_across_subsystems() {
    let mut backend = MockBackend::new();
    backend.add_classic(
        "Application",
        vec![ClassicRecord {
            source: "Vendor-App".to_string(),
            event_id: 0x4000_0005,
            timestamp: Some(ts(1)),
            message: "Vendor service started.".to_string(),
            type_code: 4,
        }],
    );
    for name in ["Security", "Setup", "System"] {
        backend.add_classic(name, Vec::new());
    }
    backend.add_traced(
        "Vendor-App/Operational",
        LogKind::Operational,
        vec![ScriptedRead::Record(TracedRecord {
            provider: Some("Vendor-App".to_string()),
            event_id: 5,
            timestamp: Some(ts(1)),
            level_display: Some("Information".to_string()),
            message: Some("Vendor service started.".to_string()),
        })],
    );

    let sources = discover_all(backend);
    let mut manager = PopulateManager::new();

    let mut entries = Vec::new();
    for source in sources {
        let name = source.log_name().to_string();
        if name == "Application" || name == "Vendor-App/Operational" {
            let populated = populate_via_worker(&mut manager, source);
            entries.extend(populated.entries().to_vec());
        }
    }

    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].event_id, entries[1].event_id);
    assert_eq!(entries[0], entries[1], "equality excludes the event id");
}
