// EventScope - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the panels and drives the two background managers:
// catalog discovery and per-source population. Both are polled each frame
// and only communicate through their channels.

use std::sync::Arc;

use crate::app::catalog::CatalogManager;
use crate::app::populate::{PopulateManager, PopulateProgress};
use crate::app::state::ViewerState;
use crate::core::backend::LogBackend;
use crate::core::catalog::CatalogProgress;
use crate::core::source::LogSource;
use crate::ui;

/// The EventScope application.
pub struct EventScopeApp {
    pub state: ViewerState,
    backend: Arc<dyn LogBackend>,
    catalog_manager: CatalogManager,
    populate_manager: PopulateManager,
}

impl EventScopeApp {
    /// Create a new application instance over the given backend.
    pub fn new(state: ViewerState, backend: Arc<dyn LogBackend>) -> Self {
        Self {
            state,
            backend,
            catalog_manager: CatalogManager::new(),
            populate_manager: PopulateManager::new(),
        }
    }
}

impl eframe::App for EventScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Discovery is triggered once at startup; ensure_started is a
        // no-op on every later frame.
        self.catalog_manager.ensure_started(Arc::clone(&self.backend));

        // ---- Poll catalog discovery progress ----
        let messages = self.catalog_manager.poll_progress();
        let had_messages = !messages.is_empty();
        for msg in messages {
            match msg {
                CatalogProgress::DiscoveryStarted => {
                    self.state.discovery_in_progress = true;
                    self.state.status_message = "Discovering logs...".to_string();
                }
                CatalogProgress::SourcesAdded { sources } => {
                    self.state.add_sources(sources);
                    self.state.status_message =
                        format!("Discovering logs... ({} found)", self.state.slots.len());
                }
                CatalogProgress::Warning { message } => {
                    self.state.warnings.push(message);
                }
                CatalogProgress::DiscoveryCompleted { total_sources } => {
                    self.state.discovery_in_progress = false;
                    self.state.status_message =
                        format!("Discovery complete: {total_sources} logs.");
                }
            }
        }

        // ---- Poll population progress ----
        let populate_messages = self.populate_manager.poll_progress();
        let had_populate = !populate_messages.is_empty();
        for msg in populate_messages {
            match msg {
                PopulateProgress::Started { log_name } => {
                    self.state.status_message = format!("Reading '{log_name}'...");
                }
                PopulateProgress::Completed {
                    source,
                    entry_count,
                } => {
                    self.state.status_message =
                        format!("'{}': {entry_count} entries.", source.log_name());
                    // The pending read, if any, fires below once the slot
                    // is filled again.
                    self.state.return_source(source);
                }
            }
        }

        // ---- Handle flags set by the panels ----
        if let Some(index) = self.state.pending_activate.take() {
            self.state.set_active(index);
            // The first batch is owed as soon as the source is ready.
            self.state.request_read_more = true;
        }

        if self.state.request_read_more {
            self.state.request_read_more = false;
            self.state.pending_read = true;
        }

        // A read is owed. Satisfy it if the active source is populated and
        // at home; otherwise start its population once the worker is free.
        // The flag survives frames until the entries land.
        if self.state.pending_read {
            let active_slot = self.state.active.and_then(|i| self.state.slots.get(i));
            let populated = active_slot
                .and_then(|slot| slot.source.as_ref())
                .map(|source| source.is_populated())
                .unwrap_or(false);

            if populated {
                self.state.pending_read = false;
                self.state.read_more();
            } else if !self.populate_manager.is_busy() {
                if let Some(source) = self.state.take_active_source() {
                    if let Err(source) = self.populate_manager.start_populate(source) {
                        self.state.return_source(source);
                    }
                }
            }
        }

        // Repaint while background work is active so progress appears
        // promptly.
        if had_messages
            || had_populate
            || self.state.discovery_in_progress
            || self.populate_manager.is_busy()
        {
            ctx.request_repaint();
        }

        // ---- Layout ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.state.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.state.warnings.is_empty() {
                        ui.label(format!("{} warnings", self.state.warnings.len()))
                            .on_hover_text(self.state.warnings.join("\n"));
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("detail_pane")
            .resizable(true)
            .default_height(ui::theme::DETAIL_PANE_HEIGHT)
            .show(ctx, |ui| {
                ui::panels::detail::render(ui, &self.state);
            });

        egui::SidePanel::left("sources")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui::panels::sources::render(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::entries::render(ui, &mut self.state);
        });
    }
}
