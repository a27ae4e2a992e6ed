// EventScope - ui/panels/sources.rs
//
// Left sidebar: the discovered source catalog. One selectable row per
// log; a row whose source is checked out to the populate worker shows a
// loading marker.

use crate::app::state::ViewerState;
use egui::Ui;

pub fn render(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Logs");
    if state.discovery_in_progress {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("Discovering... ({} found)", state.slots.len()));
        });
    } else {
        ui.label(format!("{} logs", state.slots.len()));
    }
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for (index, slot) in state.slots.iter().enumerate() {
                let is_active = state.active == Some(index);
                let label = if slot.is_busy() {
                    format!("{} \u{2026}", slot.log_name)
                } else {
                    slot.log_name.clone()
                };

                if ui.selectable_label(is_active, label).clicked() && !is_active {
                    state.pending_activate = Some(index);
                }
            }
        });
}
