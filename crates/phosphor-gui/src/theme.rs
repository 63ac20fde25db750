use nih_plug_egui::egui;

// Phosphor palette
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(14, 18, 16);
const PANEL: egui::Color32 = egui::Color32::from_rgb(24, 30, 27);
const RAISED: egui::Color32 = egui::Color32::from_rgb(38, 48, 43);
const FOREGROUND: egui::Color32 = egui::Color32::from_rgb(214, 230, 220);
const MUTED: egui::Color32 = egui::Color32::from_rgb(110, 134, 120);
const PHOSPHOR: egui::Color32 = egui::Color32::from_rgb(26, 255, 128);
const PHOSPHOR_DIM: egui::Color32 = egui::Color32::from_rgb(18, 140, 76);
const AMBER: egui::Color32 = egui::Color32::from_rgb(255, 184, 80);
const RED: egui::Color32 = egui::Color32::from_rgb(255, 90, 90);

/// Apply the phosphor-green dark theme to the egui context.
///
/// Call once per editor window; each window has its own context.
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = PANEL;
    visuals.window_fill = PANEL;
    visuals.faint_bg_color = RAISED;
    visuals.extreme_bg_color = BACKGROUND;

    visuals.selection.bg_fill = PHOSPHOR_DIM;
    visuals.selection.stroke = egui::Stroke::new(1.0, PHOSPHOR);

    visuals.hyperlink_color = PHOSPHOR;
    visuals.warn_fg_color = AMBER;
    visuals.error_fg_color = RED;

    visuals.widgets.inactive.bg_fill = RAISED;
    visuals.widgets.inactive.weak_bg_fill = RAISED;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, FOREGROUND);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(0.0, MUTED);

    visuals.widgets.hovered.bg_fill = PHOSPHOR_DIM;
    visuals.widgets.hovered.weak_bg_fill = PHOSPHOR_DIM;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.5, FOREGROUND);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, PHOSPHOR);

    visuals.widgets.active.bg_fill = PHOSPHOR;
    visuals.widgets.active.weak_bg_fill = PHOSPHOR;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(2.0, BACKGROUND);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, PHOSPHOR);

    visuals.widgets.noninteractive.bg_fill = PANEL;
    visuals.widgets.noninteractive.weak_bg_fill = PANEL;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, FOREGROUND);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(0.0, RAISED);

    visuals.window_stroke = egui::Stroke::new(1.0, MUTED);

    ctx.set_visuals(visuals);
}
