// EventScope - app/state.rs
//
// Application state management. Holds the discovered source list, the
// active source, and the display window.
// Owned by the eframe::App implementation.

use crate::core::model::LogEntry;
use crate::core::source::LogSource;

/// One catalog position. The source is `None` while it is checked out to
/// the populate worker; the name stays so the UI can keep rendering the
/// row.
pub struct SourceSlot {
    /// Name of the log, stable for the slot's lifetime.
    pub log_name: String,

    /// The source handle, absent while a worker owns it.
    pub source: Option<Box<dyn LogSource>>,
}

impl SourceSlot {
    /// Whether the source is currently checked out to a worker.
    pub fn is_busy(&self) -> bool {
        self.source.is_none()
    }
}

/// Top-level application state.
pub struct ViewerState {
    /// Discovered sources in catalog order. Append-only after discovery.
    pub slots: Vec<SourceSlot>,

    /// Index of the source currently being displayed, if any.
    pub active: Option<usize>,

    /// The display window: entries read from the active source, in the
    /// order the source returned them.
    pub displayed: Vec<LogEntry>,

    /// Index into `displayed` of the entry shown in the detail pane.
    pub selected: Option<usize>,

    /// Whether catalog discovery is still running.
    pub discovery_in_progress: bool,

    /// Entries appended per read request.
    pub read_batch_size: usize,

    /// A read was requested while the active source was being populated;
    /// satisfied when the source comes back.
    pub pending_read: bool,

    /// Set by the entries panel when the user scrolls to the bottom or
    /// asks for more; handled by the update loop.
    pub request_read_more: bool,

    /// Set by the sources panel when a row is clicked; handled by the
    /// update loop.
    pub pending_activate: Option<usize>,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal warnings accumulated during discovery.
    pub warnings: Vec<String>,
}

impl ViewerState {
    pub fn new(read_batch_size: usize) -> Self {
        Self {
            slots: Vec::new(),
            active: None,
            displayed: Vec::new(),
            selected: None,
            discovery_in_progress: false,
            read_batch_size,
            pending_read: false,
            request_read_more: false,
            pending_activate: None,
            status_message: "Discovering logs...".to_string(),
            warnings: Vec::new(),
        }
    }

    /// Append newly discovered sources, preserving catalog order.
    pub fn add_sources(&mut self, sources: Vec<Box<dyn LogSource>>) {
        for source in sources {
            self.slots.push(SourceSlot {
                log_name: source.log_name().to_string(),
                source: Some(source),
            });
        }
    }

    /// Switch the displayed source. The display window and selection are
    /// cleared immediately: stale entries from the prior source must never
    /// remain visible.
    pub fn set_active(&mut self, index: usize) {
        if index >= self.slots.len() {
            return;
        }
        self.active = Some(index);
        self.displayed.clear();
        self.selected = None;
        self.pending_read = false;
    }

    /// Name of the active log, if one is selected.
    pub fn active_log_name(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.slots.get(i))
            .map(|slot| slot.log_name.as_str())
    }

    /// Check the active source out for a worker. Returns `None` when no
    /// source is active or it is already checked out.
    pub fn take_active_source(&mut self) -> Option<Box<dyn LogSource>> {
        let index = self.active?;
        self.slots.get_mut(index)?.source.take()
    }

    /// Return a source from a worker to its slot, located by name.
    /// A source whose slot vanished (catalog reset mid-flight) is dropped,
    /// releasing its backend reader.
    pub fn return_source(&mut self, source: Box<dyn LogSource>) {
        match self
            .slots
            .iter_mut()
            .find(|slot| slot.log_name == source.log_name())
        {
            Some(slot) => slot.source = Some(source),
            None => {
                tracing::debug!(log = source.log_name(), "Returned source has no slot, dropped");
            }
        }
    }

    /// Read one batch from the active populated source and append it to
    /// the display window, preserving the order the source returned.
    /// Returns the number of entries appended.
    pub fn read_more(&mut self) -> usize {
        let batch_size = self.read_batch_size;
        let Some(index) = self.active else {
            return 0;
        };
        let Some(source) = self.slots.get_mut(index).and_then(|s| s.source.as_mut()) else {
            return 0;
        };
        if !source.is_populated() {
            return 0;
        }

        let batch = source.read(batch_size);
        let appended = batch.len();
        self.displayed.extend(batch);
        appended
    }

    /// The entry shown in the detail pane, if any.
    pub fn selected_entry(&self) -> Option<&LogEntry> {
        self.selected.and_then(|i| self.displayed.get(i))
    }

    /// Drop all discovered sources and display state (used together with
    /// a catalog manager reset).
    pub fn clear(&mut self) {
        self.slots.clear();
        self.active = None;
        self.displayed.clear();
        self.selected = None;
        self.pending_read = false;
        self.request_read_more = false;
        self.pending_activate = None;
        self.warnings.clear();
        self.status_message = "Discovering logs...".to_string();
    }
}

// =============================================================================
// Tests
// =============================================================================
