use nih_plug::prelude::*;
use nih_plug_egui::{create_egui_editor, egui, EguiState};
use phosphor_core::ScopeParameters;
use phosphor_gui::{sample_channel, GpuScopeState, SampleSink, CHUNK_QUEUE_DEPTH};
use std::sync::{Arc, Mutex};

/// Stereo pass-through effect that shows its input on a phosphor scope.
pub struct PhosphorPlugin {
    params: Arc<PhosphorParams>,
    sink: SampleSink,
    scope_state: Option<Arc<Mutex<GpuScopeState>>>,
}

#[derive(Params)]
struct PhosphorParams {
    #[persist = "editor-state"]
    editor_state: Arc<EguiState>,
}

impl Default for PhosphorParams {
    fn default() -> Self {
        Self {
            editor_state: EguiState::from_size(640, 760),
        }
    }
}

impl Default for PhosphorPlugin {
    fn default() -> Self {
        let (sink, source) = sample_channel(CHUNK_QUEUE_DEPTH);
        let scope_state = match GpuScopeState::new(ScopeParameters::default(), source) {
            Ok(state) => Some(Arc::new(Mutex::new(state))),
            Err(err) => {
                log::error!("scope disabled: {}", err);
                None
            }
        };

        Self {
            params: Arc::new(PhosphorParams::default()),
            sink,
            scope_state,
        }
    }
}

impl Plugin for PhosphorPlugin {
    const NAME: &'static str = "Phosphor";
    const VENDOR: &'static str = "phosphor";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    type SysExMessage = ();
    type BackgroundTask = ();

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        ..AudioIOLayout::const_default()
    }];

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        let scope_state = self.scope_state.clone()?;
        let build_state = scope_state.clone();

        create_egui_editor(
            self.params.editor_state.clone(),
            (),
            move |egui_ctx, _| {
                phosphor_gui::theme::apply(egui_ctx);
                // Every editor window brings a fresh GL context.
                if let Ok(mut state) = build_state.lock() {
                    state.context_lost();
                }
            },
            move |egui_ctx, _setter, _state| {
                egui::CentralPanel::default().show(egui_ctx, |ui| {
                    phosphor_gui::draw_editor(ui, &scope_state);
                });
                egui_ctx.request_repaint();
            },
        )
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        log::info!(
            "phosphor scope at {} Hz, up to {} samples per block",
            buffer_config.sample_rate,
            buffer_config.max_buffer_size
        );
        self.sink.reserve(buffer_config.max_buffer_size as usize);
        true
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // Input passes through untouched; only tap it while someone is watching.
        if self.params.editor_state.is_open() {
            if let [left, right, ..] = buffer.as_slice_immutable() {
                self.sink.push_stereo(left, right);
            }
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for PhosphorPlugin {
    const CLAP_ID: &'static str = "com.phosphor.scope";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Phosphor-persistence oscilloscope");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Analyzer,
        ClapFeature::Stereo,
    ];
}

impl Vst3Plugin for PhosphorPlugin {
    const VST3_CLASS_ID: [u8; 16] = *b"PhosphorScope!!_";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Fx,
        Vst3SubCategory::Analyzer,
    ];
}

nih_export_clap!(PhosphorPlugin);
nih_export_vst3!(PhosphorPlugin);
