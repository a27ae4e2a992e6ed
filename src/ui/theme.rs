// EventScope - ui/theme.rs
//
// Colour scheme, severity colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::Severity;
use egui::Color32;

/// Colour for a given severity level.
pub fn severity_colour(severity: &Severity) -> Color32 {
    match severity {
        Severity::Error => Color32::from_rgb(220, 38, 38),         // Red 600
        Severity::Warning => Color32::from_rgb(217, 119, 6),       // Amber 600
        Severity::Informational => Color32::from_rgb(209, 213, 219), // Gray 300
        Severity::Trace => Color32::from_rgb(107, 114, 128),       // Gray 500
        Severity::AuditSuccess => Color32::from_rgb(22, 163, 74),  // Green 600
        Severity::AuditFailure => Color32::from_rgb(185, 28, 28),  // Red 800
        Severity::Unknown => Color32::from_rgb(75, 85, 99),        // Gray 600
    }
}

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 280.0;
pub const DETAIL_PANE_HEIGHT: f32 = 160.0;
pub const ROW_HEIGHT: f32 = 20.0;
