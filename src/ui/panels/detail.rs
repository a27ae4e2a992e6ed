// EventScope - ui/panels/detail.rs
//
// Bottom pane: full detail of the selected entry.

use crate::app::state::ViewerState;
use crate::ui::theme;
use egui::Ui;

pub fn render(ui: &mut Ui, state: &ViewerState) {
    let Some(entry) = state.selected_entry() else {
        ui.label("Select an entry to see its details.");
        return;
    };

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(entry.severity.label())
                .strong()
                .color(theme::severity_colour(&entry.severity)),
        );
        ui.separator();
        ui.label(entry.short_title());
        if let Some(timestamp) = entry.timestamp {
            ui.separator();
            ui.label(timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        }
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            let message = if entry.message.is_empty() {
                "(no message)"
            } else {
                &entry.message
            };
            ui.label(egui::RichText::new(message).monospace());
        });
}
