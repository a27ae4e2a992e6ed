// EventScope - ui/panels/entries.rs
//
// Central panel: the display window of the active source. Rows are
// appended batch by batch; scrolling to the bottom requests the next
// batch from the update loop.

use crate::app::state::ViewerState;
use crate::ui::theme;
use egui::Ui;

pub fn render(ui: &mut Ui, state: &mut ViewerState) {
    match state.active_log_name() {
        Some(name) => {
            ui.heading(name);
        }
        None => {
            ui.heading("EventScope");
            ui.label("Select a log on the left to view its entries.");
            return;
        }
    }
    ui.separator();

    let row_count = state.displayed.len();
    let scroll = egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show_rows(ui, theme::ROW_HEIGHT, row_count, |ui, rows| {
            for index in rows {
                let entry = &state.displayed[index];
                let is_selected = state.selected == Some(index);

                let timestamp = entry
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "\u{2014}".to_string());
                let source = entry.source.as_deref().unwrap_or("");
                let message = entry.message.lines().next().unwrap_or("");

                let text = egui::RichText::new(format!(
                    "{:<13} {timestamp}  {source}  {message}",
                    entry.severity.label()
                ))
                .color(theme::severity_colour(&entry.severity))
                .monospace();

                if ui.selectable_label(is_selected, text).clicked() {
                    state.selected = Some(index);
                }
            }
        });

    // Reaching the bottom of the scroll area requests the next batch.
    let at_bottom =
        scroll.state.offset.y + scroll.inner_rect.height() >= scroll.content_size.y - 1.0;
    if row_count > 0 && at_bottom {
        state.request_read_more = true;
    }

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Load more").clicked() {
            state.request_read_more = true;
        }
        ui.label(format!("{row_count} entries shown"));
    });
}
