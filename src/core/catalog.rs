// EventScope - core/catalog.rs
//
// Catalog construction: the full, de-duplicated, access-filtered, sorted
// list of log sources on this machine.
//
// Ordering invariant: the four well-known classic channels come first, in
// fixed order ("Security" silently omitted when access is denied), then
// every remaining traced channel in lexicographic order, skipping names
// already seen and channels the backend classifies as analytical or debug.
//
// Per-log failures are non-fatal throughout: discovery as a whole never
// fails because one log is privileged. Even an enumeration-API failure
// degrades to the classic-only catalog plus a warning.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::backend::LogBackend;
use crate::core::source::{ClassicLogSource, LogSource, TracedLogSource};
use crate::util::constants::{MAX_WARNINGS, WELL_KNOWN_LOGS};

/// Progress messages sent from the discovery thread to the UI thread.
pub enum CatalogProgress {
    /// Discovery started.
    DiscoveryStarted,

    /// A batch of newly constructed sources, in catalog order.
    /// Batched (see SOURCE_BATCH_SIZE in app::catalog) so a consumer can
    /// render partial progress without a message per source.
    SourcesAdded { sources: Vec<Box<dyn LogSource>> },

    /// A non-fatal warning occurred during discovery.
    Warning { message: String },

    /// Discovery completed; the catalog is final.
    DiscoveryCompleted { total_sources: usize },
}

/// Discover every accessible log on the machine, streaming each
/// constructed source through `on_source` in catalog order.
///
/// Returns the total number of sources constructed and the non-fatal
/// warnings gathered along the way (capped at MAX_WARNINGS).
pub fn discover_sources<F>(backend: &Arc<dyn LogBackend>, mut on_source: F) -> (usize, Vec<String>)
where
    F: FnMut(Box<dyn LogSource>),
{
    fn push_warning(warnings: &mut Vec<String>, message: String) {
        tracing::debug!(warning = %message, "Discovery warning");
        if warnings.len() < MAX_WARNINGS {
            warnings.push(message);
        }
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut total: usize = 0;

    // The seen set is pre-seeded with all four well-known names so the
    // traced enumeration below never re-adds them, even when one of them
    // (typically "Security") failed to open.
    let mut seen: HashSet<String> = WELL_KNOWN_LOGS.iter().map(|s| s.to_string()).collect();

    for name in WELL_KNOWN_LOGS {
        match ClassicLogSource::open(backend.as_ref(), name) {
            Ok(source) => {
                total += 1;
                on_source(Box::new(source));
            }
            Err(e) if e.is_access_denied() => {
                // Expected for "Security" without elevation; omit silently.
                tracing::debug!(log = name, "Classic log inaccessible, omitted");
            }
            Err(e) => {
                push_warning(&mut warnings, format!("Cannot open log '{name}': {e}"));
            }
        }
    }

    let mut names = match backend.log_names() {
        Ok(names) => names,
        Err(e) => {
            // Enumeration itself failed; the classic-only catalog stands.
            push_warning(&mut warnings, format!("Log enumeration failed: {e}"));
            tracing::debug!(total, "Discovery complete (classic only)");
            return (total, warnings);
        }
    };
    names.sort();

    for name in names {
        if seen.contains(&name) {
            continue;
        }

        match backend.log_kind(&name) {
            Ok(kind) if kind.is_excluded_from_discovery() => {
                tracing::trace!(log = %name, ?kind, "Excluded by log kind");
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                // Some channels require elevation even to inspect.
                tracing::debug!(log = %name, error = %e, "Log kind unavailable, skipped");
                continue;
            }
        }

        match TracedLogSource::open(Arc::clone(backend), &name) {
            Ok(source) => {
                seen.insert(name);
                total += 1;
                on_source(Box::new(source));
            }
            Err(e) => {
                // One privileged log must not fail discovery as a whole.
                tracing::debug!(log = %name, error = %e, "Traced log inaccessible, skipped");
            }
        }
    }

    tracing::debug!(total, warnings = warnings.len(), "Discovery complete");
    (total, warnings)
}

// =============================================================================
// Tests
// =============================================================================
