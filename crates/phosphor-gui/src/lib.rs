pub mod controls;
pub mod scope;
pub mod state;
pub mod theme;

pub use scope::GpuScopeState;
pub use state::{sample_channel, SampleSink, SampleSource, CHUNK_QUEUE_DEPTH};

use nih_plug_egui::egui;
use std::sync::{Arc, Mutex};

/// Draw the complete editor: the scope above its controls.
///
/// Call this from within the `nih_plug_egui::create_egui_editor` update closure.
pub fn draw_editor(ui: &mut egui::Ui, scope_state: &Arc<Mutex<GpuScopeState>>) {
    scope::draw_gpu_scope(ui, scope_state.clone());

    ui.add_space(8.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        let Ok(mut state) = scope_state.lock() else {
            return;
        };
        let mut params = state.scope.parameters().clone();
        if controls::draw_controls(ui, &mut params) {
            state.apply_parameters(params);
        }
    });
}
