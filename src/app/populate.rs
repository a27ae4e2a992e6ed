// EventScope - app/populate.rs
//
// Per-source population on a worker thread.
//
// A full population walks the entire physical log and can take seconds, so
// it never runs on the UI thread. The source is *moved* to the worker and
// handed back through the completion message: while a population is in
// flight the UI cannot touch that source at all, which structurally rules
// out concurrent populate and read against the same source.

use std::sync::mpsc;

use crate::core::source::LogSource;
use crate::util::constants::MAX_POPULATE_MESSAGES_PER_FRAME;

/// Progress messages sent from the populate thread to the UI thread.
pub enum PopulateProgress {
    /// Population began for the named log.
    Started { log_name: String },

    /// Population finished; the source comes back with its entries
    /// accumulated and its cursor reset.
    Completed {
        source: Box<dyn LogSource>,
        entry_count: usize,
    },
}

/// Manages at most one in-flight population.
pub struct PopulateManager {
    progress_rx: Option<mpsc::Receiver<PopulateProgress>>,

    /// Name of the log currently being populated, if any.
    in_flight: Option<String>,
}

impl PopulateManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            in_flight: None,
        }
    }

    /// Move `source` to a worker thread and populate it there.
    ///
    /// Returns the source unchanged if a population is already in flight;
    /// the caller keeps ownership and may retry later.
    pub fn start_populate(
        &mut self,
        mut source: Box<dyn LogSource>,
    ) -> Result<(), Box<dyn LogSource>> {
        if self.in_flight.is_some() {
            return Err(source);
        }

        let log_name = source.log_name().to_string();
        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);
        self.in_flight = Some(log_name.clone());

        std::thread::spawn(move || {
            if tx
                .send(PopulateProgress::Started {
                    log_name: source.log_name().to_string(),
                })
                .is_err()
            {
                return; // Receiver dropped; exit quietly.
            }

            source.populate();
            let entry_count = source.entries().len();
            let _ = tx.send(PopulateProgress::Completed {
                source,
                entry_count,
            });
        });

        tracing::info!(log = %log_name, "Population started");
        Ok(())
    }

    /// Poll for progress messages without blocking, up to the per-frame
    /// budget.
    pub fn poll_progress(&mut self) -> Vec<PopulateProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < MAX_POPULATE_MESSAGES_PER_FRAME {
                match rx.try_recv() {
                    Ok(msg) => {
                        if matches!(msg, PopulateProgress::Completed { .. }) {
                            self.in_flight = None;
                        }
                        messages.push(msg);
                    }
                    Err(_) => break,
                }
            }
        }
        messages
    }

    /// Whether a population is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Name of the log currently being populated, if any.
    pub fn busy_log_name(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }
}

impl Default for PopulateManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
