use crate::state::SampleSource;
use nih_plug_egui::egui::{self, Vec2};
use phosphor_core::{ConfigError, IngestOutcome, Scope, ScopeParameters};
use phosphor_visualizer::{GlSampleTexture, RenderError, ScopeRenderer};
use std::sync::{Arc, Mutex};

/// Scope engine plus its GPU renderer, shared between the egui layout code
/// and the glow paint callback.
pub struct GpuScopeState {
    pub scope: Scope<GlSampleTexture>,
    pub renderer: Option<ScopeRenderer>,
    /// Set when the renderer could not be built for the current context.
    pub failure: Option<RenderError>,
    source: SampleSource,
}

impl GpuScopeState {
    pub fn new(params: ScopeParameters, source: SampleSource) -> Result<Self, ConfigError> {
        Ok(Self {
            scope: Scope::new(params, GlSampleTexture::new())?,
            renderer: None,
            failure: None,
            source,
        })
    }

    /// Ingest every chunk the audio thread queued since the last tick.
    pub fn drain(&mut self) -> usize {
        let scope = &mut self.scope;
        self.source.drain(|chunk| match scope.ingest(chunk) {
            Ok(IngestOutcome::Written { stats, .. }) if stats.added > 0 => {
                log::trace!("{} new triggers", stats.added);
            }
            // Already logged by the scope.
            Err(_) => {}
            Ok(_) => {}
        })
    }

    /// Apply edited parameters; invalid sets are logged and ignored.
    pub fn apply_parameters(&mut self, params: ScopeParameters) {
        if let Err(err) = self.scope.set_parameters(params) {
            log::error!("rejected scope parameters: {}", err);
        }
    }

    /// Forget all GPU objects and history after the GL context went away.
    pub fn context_lost(&mut self) {
        log::info!("GL context replaced, rebuilding scope");
        self.renderer = None;
        self.failure = None;
        self.scope.buffer_mut().texture_mut().forget();
        self.scope.reset();
    }

    /// Drain, plan and draw one frame into `viewport` (`[x, y, w, h]` in pixels).
    pub fn paint(&mut self, gl: &glow::Context, viewport: [i32; 4]) {
        self.drain();
        self.scope.set_surface(viewport[2].max(0) as u32, viewport[3].max(0) as u32);

        if self.renderer.is_none() && self.failure.is_none() {
            match ScopeRenderer::new(gl) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(err) => {
                    log::error!("GPU scope unavailable: {}", err);
                    self.failure = Some(err);
                }
            }
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match self.scope.take_redraw() {
            Some(plan) => {
                if let Err(err) = renderer.render(gl, self.scope.buffer_mut(), &plan, viewport) {
                    log::error!("scope frame failed: {}", err);
                    // Retry on the next tick.
                    self.scope.request_redraw();
                }
            }
            None => {
                renderer.present(gl, viewport);
            }
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy(gl);
        }
        self.scope.buffer_mut().texture_mut().destroy(gl);
    }
}

/// Draw the GPU phosphor scope using `egui::PaintCallback`.
pub fn draw_gpu_scope(ui: &mut egui::Ui, scope_state: Arc<Mutex<GpuScopeState>>) {
    let width = ui.available_width();
    let desired_size = Vec2::new(width, (width * 0.6).max(120.0));
    let (rect, _response) = ui.allocate_exact_size(desired_size, egui::Sense::hover());

    if let Ok(state) = scope_state.lock() {
        if let Some(err) = &state.failure {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("Scope unavailable: {err}"),
                egui::FontId::proportional(14.0),
                ui.visuals().error_fg_color,
            );
            return;
        }
    }

    let cb = egui_glow::CallbackFn::new(move |info, painter| {
        let vp = info.viewport_in_pixels();
        let viewport = [vp.left_px, vp.from_bottom_px, vp.width_px, vp.height_px];

        match scope_state.lock() {
            Ok(mut state) => state.paint(painter.gl(), viewport),
            Err(_) => log::error!("scope state poisoned"),
        }
    });

    ui.painter().add(egui::PaintCallback {
        rect,
        callback: Arc::new(cb),
    });
}
