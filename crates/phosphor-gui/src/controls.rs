use nih_plug_egui::egui::{self, Ui};
use phosphor_core::parameter::{
    ParamRange, FOCUS_FALLOFF, GAIN_DB, INTENSITY, INVGAMMA, PERSISTENCE_GAMMA, TIME_SCALE,
};
use phosphor_core::{AxesMode, ScopeParameters, HISTORY_SIZES};

fn slider(ui: &mut Ui, value: &mut f32, range: ParamRange, label: &str) -> bool {
    ui.add(
        egui::Slider::new(value, range.min..=range.max)
            .logarithmic(range.logarithmic)
            .text(label),
    )
    .changed()
}

/// Draw the scope parameter panel. Returns whether anything was edited.
pub fn draw_controls(ui: &mut Ui, params: &mut ScopeParameters) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        let label = if params.paused { "Resume" } else { "Pause" };
        changed |= ui.toggle_value(&mut params.paused, label).changed();
    });

    ui.add_space(4.0);

    // -- View --
    egui::CollapsingHeader::new("View").default_open(true).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for mode in AxesMode::ALL {
                changed |= ui.radio_value(&mut params.axes, mode, mode.label()).changed();
            }
        });
    });

    // -- Signal --
    egui::CollapsingHeader::new("Signal").default_open(true).show(ui, |ui| {
        changed |= slider(ui, &mut params.gain, GAIN_DB, "Gain (dB)");
    });

    // -- Time --
    egui::CollapsingHeader::new("Time").default_open(true).show(ui, |ui| {
        egui::ComboBox::from_label("History")
            .selected_text(format!("{} samples", params.history_samples))
            .show_ui(ui, |ui| {
                for size in HISTORY_SIZES {
                    changed |= ui
                        .selectable_value(&mut params.history_samples, size, size.to_string())
                        .changed();
                }
            });
        changed |= slider(ui, &mut params.time_scale, TIME_SCALE, "Time scale (samples)");
    });

    // -- Rendering --
    egui::CollapsingHeader::new("Rendering").default_open(false).show(ui, |ui| {
        changed |= slider(ui, &mut params.intensity, INTENSITY, "Intensity");
        changed |= slider(ui, &mut params.focus_falloff, FOCUS_FALLOFF, "Focus falloff");
        changed |= slider(ui, &mut params.persistence_gamma, PERSISTENCE_GAMMA, "Persistence");
        changed |= slider(ui, &mut params.invgamma, INVGAMMA, "Gamma");
        changed |= ui.checkbox(&mut params.draw_line, "Draw as line").changed();
    });

    changed
}
