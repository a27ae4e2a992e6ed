// EventScope - app/catalog.rs
//
// Catalog lifecycle management. Runs discovery on a background thread,
// sending progress messages to the UI thread via an mpsc channel.
//
// Architecture:
//   - `CatalogManager` lives on the UI thread; `run_discovery` runs on a
//     background thread.
//   - Discovery runs exactly once per manager lifetime: the catalog
//     reflects machine state at first population only. `reset()` re-arms
//     it explicitly; nothing re-triggers enumeration implicitly.
//   - All cross-thread communication is via `CatalogProgress` messages.

use std::sync::mpsc;
use std::sync::Arc;

use crate::core::backend::LogBackend;
use crate::core::catalog::{discover_sources, CatalogProgress};
use crate::util::constants::{MAX_CATALOG_MESSAGES_PER_FRAME, SOURCE_BATCH_SIZE};

/// Manages the once-only discovery pass on a background thread.
pub struct CatalogManager {
    /// Channel receiver for the UI to poll progress messages.
    progress_rx: Option<mpsc::Receiver<CatalogProgress>>,

    /// Discovery has completed; further `ensure_started` calls are no-ops
    /// until `reset`.
    populated: bool,

    /// Discovery thread is currently running.
    in_flight: bool,
}

impl CatalogManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            populated: false,
            in_flight: false,
        }
    }

    /// Start discovery unless it has already run or is running.
    ///
    /// Spawns a background thread immediately; progress arrives over the
    /// channel. Discovery opens and probes every log on the machine and
    /// can take seconds, hence never on the UI thread.
    pub fn ensure_started(&mut self, backend: Arc<dyn LogBackend>) {
        if self.populated || self.in_flight {
            return;
        }

        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);
        self.in_flight = true;

        std::thread::spawn(move || {
            run_discovery(backend, tx);
        });

        tracing::info!("Catalog discovery started");
    }

    /// Poll for progress messages without blocking, up to the per-frame
    /// budget. Tracks completion so the once-semantics hold.
    pub fn poll_progress(&mut self) -> Vec<CatalogProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < MAX_CATALOG_MESSAGES_PER_FRAME {
                match rx.try_recv() {
                    Ok(msg) => {
                        if matches!(msg, CatalogProgress::DiscoveryCompleted { .. }) {
                            self.populated = true;
                            self.in_flight = false;
                        }
                        messages.push(msg);
                    }
                    Err(_) => break,
                }
            }
        }
        messages
    }

    /// Whether the catalog has been fully populated.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Whether a discovery pass is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Re-arm discovery. The next `ensure_started` call enumerates the
    /// machine again; the caller is responsible for clearing the old
    /// source list first.
    pub fn reset(&mut self) {
        self.progress_rx = None;
        self.populated = false;
        self.in_flight = false;
    }
}

impl Default for CatalogManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Background discovery
// =============================================================================

/// Full discovery pass. Runs on a background thread; sends
/// `CatalogProgress` messages to `tx`, batching sources so a consumer can
/// render partial progress without a message per source.
fn run_discovery(backend: Arc<dyn LogBackend>, tx: mpsc::Sender<CatalogProgress>) {
    if tx.send(CatalogProgress::DiscoveryStarted).is_err() {
        return; // Receiver dropped (UI closed); exit quietly.
    }

    let mut batch = Vec::with_capacity(SOURCE_BATCH_SIZE);
    let (total, warnings) = discover_sources(&backend, |source| {
        batch.push(source);
        if batch.len() >= SOURCE_BATCH_SIZE {
            let sources = std::mem::replace(&mut batch, Vec::with_capacity(SOURCE_BATCH_SIZE));
            // Non-fatal: ignore send error (UI may have closed).
            let _ = tx.send(CatalogProgress::SourcesAdded { sources });
        }
    });

    if !batch.is_empty() {
        let _ = tx.send(CatalogProgress::SourcesAdded { sources: batch });
    }

    for message in warnings {
        let _ = tx.send(CatalogProgress::Warning { message });
    }

    let _ = tx.send(CatalogProgress::DiscoveryCompleted {
        total_sources: total,
    });

    tracing::info!(total, "Catalog discovery finished");
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::LogSource;
    use crate::platform::mock::MockBackend;
    use std::time::{Duration, Instant};

    /// Drain the manager until `DiscoveryCompleted` arrives or the
    /// deadline passes. Returns all messages received.
    fn drain_until_complete(manager: &mut CatalogManager) -> Vec<CatalogProgress> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut all = Vec::new();
        while Instant::now() < deadline {
            let batch = manager.poll_progress();
            let done = batch
                .iter()
                .any(|m| matches!(m, CatalogProgress::DiscoveryCompleted { .. }));
            all.extend(batch);
            if done {
                return all;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("discovery did not complete within the deadline");
    }

    #[test]
    fn discovery_streams_batches_then_completes() {
        let mut manager = CatalogManager::new();
        manager.ensure_started(Arc::new(MockBackend::with_demo_data()));

        let messages = drain_until_complete(&mut manager);

        let mut names: Vec<String> = Vec::new();
        let mut total_reported = 0;
        for msg in messages {
            match msg {
                CatalogProgress::SourcesAdded { sources } => {
                    assert!(sources.len() <= SOURCE_BATCH_SIZE);
                    names.extend(sources.iter().map(|s| s.log_name().to_string()));
                }
                CatalogProgress::DiscoveryCompleted { total_sources } => {
                    total_reported = total_sources;
                }
                _ => {}
            }
        }

        assert_eq!(names.len(), total_reported);
        assert_eq!(&names[..4], &["Application", "Security", "Setup", "System"]);
        assert!(manager.is_populated());
    }

    /// The catalog is computed exactly once: a second ensure_started after
    /// completion must not spawn another discovery pass.
    #[test]
    fn ensure_started_is_once_only_until_reset() {
        let mut manager = CatalogManager::new();
        manager.ensure_started(Arc::new(MockBackend::with_demo_data()));
        drain_until_complete(&mut manager);

        manager.ensure_started(Arc::new(MockBackend::with_demo_data()));
        assert!(!manager.is_in_flight(), "no second pass without reset");
        assert!(manager.poll_progress().is_empty());

        manager.reset();
        assert!(!manager.is_populated());
        manager.ensure_started(Arc::new(MockBackend::with_demo_data()));
        assert!(manager.is_in_flight(), "reset re-arms discovery");
        drain_until_complete(&mut manager);
    }
}
