use std::collections::VecDeque;

use glam::Mat4;

use crate::buffer::{SampleRingBuffer, SampleTexture, WrittenRange, CHANNELS};
use crate::error::{ConfigError, IngestError};
use crate::kernel::{blur_kernel, KERNEL_DIAMETER};
use crate::parameter::{ParameterChanges, ScopeParameters};
use crate::projection::{AxisProjector, ProjectionInputs, ProjectionState};
use crate::scheduler::RedrawScheduler;
use crate::trigger::{ScanStats, TriggerDetector, TRIGGER_SLOTS};

/// Interpolated dots drawn per stored sample.
pub const INTERP_SCALE: usize = 10;

/// Relative buffer time of the single sweep drawn without a trigger.
pub const UNTRIGGERED_TIME: f32 = 0.5;

/// Dots per sweep for a given history depth.
///
/// One short of `samples * INTERP_SCALE` so the last dot never
/// interpolates across the newest/oldest seam.
pub fn dot_count(history_samples: usize) -> usize {
    history_samples.saturating_sub(1) * INTERP_SCALE + 1
}

/// Position of buffer `index` relative to the oldest sample, in `[0, 1)`.
pub fn relative_time(index: usize, cursor: usize, capacity: usize) -> f32 {
    ((index % capacity + capacity - cursor % capacity) % capacity) as f32 / capacity as f32
}

/// Depth pushed onto a sweep `age` slots older than the newest trigger.
pub fn depth_offset(age: usize) -> f32 {
    -(age as f32) / TRIGGER_SLOTS as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    LineStrip,
}

/// Output surface dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// One accumulation draw of the whole history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub trigger_time: f32,
    pub depth_offset: f32,
    pub projection: Mat4,
}

/// Everything the GPU passes need for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub surface: SurfaceSize,
    pub sweeps: Vec<Sweep>,
    pub primitive: Primitive,
    pub history_samples: usize,
    pub dot_count: usize,
    /// Cursor position as a fraction of the buffer.
    pub cut_point: f32,
    pub kernel: [f32; KERNEL_DIAMETER],
    pub intensity: f32,
    pub invgamma: f32,
    pub persistence_gamma: f32,
}

/// Result of handing a chunk to [`Scope::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Written {
        range: WrittenRange,
        stats: ScanStats,
        redraw_requested: bool,
    },
    /// Held back because the display is paused.
    Deferred { backlog_samples: usize },
}

/// The live scope: sample history, triggers, projection and redraw state.
///
/// All mutation happens on one thread; the GPU side only reads what
/// [`Scope::take_redraw`] and [`Scope::plan_frame`] hand out.
///
/// While paused, chunks go to a backlog bounded to one buffer's worth of
/// samples instead of the ring buffer, so the displayed history and trigger
/// record stay frozen. Resuming ingests the backlog as one chunk.
pub struct Scope<T> {
    params: ScopeParameters,
    buffer: SampleRingBuffer<T>,
    trigger: TriggerDetector,
    projector: AxisProjector,
    inputs: ProjectionInputs,
    scheduler: RedrawScheduler,
    backlog: VecDeque<f32>,
    surface: Option<SurfaceSize>,
}

impl<T: SampleTexture> Scope<T> {
    pub fn new(params: ScopeParameters, texture: T) -> Result<Self, ConfigError> {
        params.validate()?;
        let capacity = params.history_samples;
        Ok(Self {
            buffer: SampleRingBuffer::new(capacity, texture),
            trigger: TriggerDetector::new(),
            projector: AxisProjector::new(),
            inputs: ProjectionInputs::from_parameters(&params),
            scheduler: RedrawScheduler::new(),
            backlog: VecDeque::with_capacity(capacity * CHANNELS),
            surface: None,
            params,
        })
    }

    pub fn parameters(&self) -> &ScopeParameters {
        &self.params
    }

    pub fn buffer(&self) -> &SampleRingBuffer<T> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut SampleRingBuffer<T> {
        &mut self.buffer
    }

    pub fn trigger(&self) -> &TriggerDetector {
        &self.trigger
    }

    pub fn projector(&self) -> &AxisProjector {
        &self.projector
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    pub fn backlog_samples(&self) -> usize {
        self.backlog.len() / CHANNELS
    }

    pub fn projection(&mut self) -> ProjectionState {
        self.projector.resolve(&self.inputs)
    }

    /// Apply a new parameter set and force a redraw.
    pub fn set_parameters(&mut self, params: ScopeParameters) -> Result<ParameterChanges, ConfigError> {
        params.validate()?;
        let changes = self.params.changes(&params);
        if !changes.any {
            return Ok(changes);
        }
        let resumed = changes.paused && !params.paused;
        self.params = params;

        if changes.history {
            let capacity = self.params.history_samples;
            self.buffer.resize(capacity);
            self.trigger.clear();
            self.backlog.clear();
            self.backlog.reserve(capacity * CHANNELS);
        }
        if changes.projection {
            self.inputs = ProjectionInputs::from_parameters(&self.params);
        }
        if resumed {
            self.flush_backlog();
        }
        self.scheduler.request();
        Ok(changes)
    }

    /// Accept a chunk of interleaved channel 1 / channel 2 samples.
    pub fn ingest(&mut self, chunk: &[f32]) -> Result<IngestOutcome, IngestError> {
        if chunk.len() % CHANNELS != 0 {
            let err = IngestError::UnpairedChunk {
                len: chunk.len(),
                channels: CHANNELS,
            };
            log::error!("discarding scope data: {}", err);
            return Err(err);
        }

        if self.params.paused {
            self.defer(chunk);
            return Ok(IngestOutcome::Deferred {
                backlog_samples: self.backlog_samples(),
            });
        }

        let (range, stats) = self.write_and_scan(chunk)?;
        let redraw_requested = self.surface.is_some();
        if redraw_requested {
            self.scheduler.request();
        }
        Ok(IngestOutcome::Written {
            range,
            stats,
            redraw_requested,
        })
    }

    /// Record the output surface size; `0` in either dimension means none.
    ///
    /// Returns whether the size changed.
    pub fn set_surface(&mut self, width: u32, height: u32) -> bool {
        let next = (width > 0 && height > 0).then_some(SurfaceSize { width, height });
        if next == self.surface {
            return false;
        }
        self.surface = next;
        if next.is_some() {
            self.scheduler.request();
        }
        true
    }

    /// Force a redraw, e.g. after a host-side repaint.
    pub fn request_redraw(&mut self) {
        self.scheduler.request();
    }

    /// Take the pending redraw, if any, as a frame plan.
    ///
    /// The request stays pending while there is no surface.
    pub fn take_redraw(&mut self) -> Option<FramePlan> {
        self.surface?;
        if !self.scheduler.take() {
            return None;
        }
        self.plan_frame()
    }

    /// Describe a frame of the current state. `None` without a surface.
    pub fn plan_frame(&mut self) -> Option<FramePlan> {
        let surface = self.surface?;
        let projection = self.projection();
        let aspect = surface.aspect();
        let capacity = self.buffer.capacity();
        let cursor = self.buffer.cursor();

        let mut sweeps = Vec::with_capacity(TRIGGER_SLOTS);
        if projection.uses_trigger {
            for (age, index) in self.trigger.record().newest_first() {
                let trigger_time = relative_time(index, cursor, capacity);
                let depth_offset = depth_offset(age);
                sweeps.push(Sweep {
                    trigger_time,
                    depth_offset,
                    projection: projection.sweep_matrix(aspect, trigger_time, depth_offset),
                });
            }
        }
        if sweeps.is_empty() {
            sweeps.push(Sweep {
                trigger_time: UNTRIGGERED_TIME,
                depth_offset: 0.0,
                projection: projection.sweep_matrix(aspect, UNTRIGGERED_TIME, 0.0),
            });
        }

        Some(FramePlan {
            surface,
            sweeps,
            primitive: if self.params.draw_line {
                Primitive::LineStrip
            } else {
                Primitive::Points
            },
            history_samples: capacity,
            dot_count: dot_count(capacity),
            cut_point: self.buffer.cut_point(),
            kernel: blur_kernel(self.params.focus_falloff),
            intensity: self.params.intensity,
            invgamma: self.params.invgamma,
            persistence_gamma: self.params.persistence_gamma,
        })
    }

    /// Discard all history as after a lost GPU context.
    pub fn reset(&mut self) {
        log::info!("resetting scope state");
        self.buffer.clear();
        self.trigger.clear();
        self.backlog.clear();
        self.projector.invalidate();
        self.scheduler.request();
    }

    fn write_and_scan(&mut self, chunk: &[f32]) -> Result<(WrittenRange, ScanStats), IngestError> {
        let range = self.buffer.write(chunk)?;
        let stats = self.trigger.scan(range, &self.buffer, self.params.inhibition_samples());
        if stats.added > 0 || stats.invalidated > 0 {
            log::trace!(
                "ingested {} samples at {}: +{} -{} triggers",
                range.len,
                range.start,
                stats.added,
                stats.invalidated
            );
        }
        Ok((range, stats))
    }

    fn defer(&mut self, chunk: &[f32]) {
        let limit = self.buffer.capacity() * CHANNELS;
        let chunk = &chunk[chunk.len().saturating_sub(limit)..];
        self.backlog.extend(chunk.iter().copied());
        let excess = self.backlog.len().saturating_sub(limit);
        self.backlog.drain(..excess);
    }

    fn flush_backlog(&mut self) {
        if self.backlog.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.backlog);
        if let Err(err) = self.write_and_scan(pending.make_contiguous()) {
            log::error!("dropping paused backlog: {}", err);
        }
        pending.clear();
        self.backlog = pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxesMode;
    use crate::buffer::tests::RecordingTexture;

    fn scope(params: ScopeParameters) -> Scope<RecordingTexture> {
        Scope::new(params, RecordingTexture::default()).unwrap()
    }

    fn small() -> ScopeParameters {
        ScopeParameters {
            history_samples: 256,
            time_scale: 128.0,
            ..Default::default()
        }
    }

    /// One rising edge per `period` samples on channel 1.
    fn square(samples: usize, period: usize) -> Vec<f32> {
        (0..samples)
            .flat_map(|i| {
                let v = if i % period >= period / 2 { 1.0 } else { -1.0 };
                [v, 0.0]
            })
            .collect()
    }

    #[test]
    fn no_surface_suppresses_data_redraws() {
        let mut s = scope(small());
        let outcome = s.ingest(&square(64, 16)).unwrap();
        assert!(matches!(outcome, IngestOutcome::Written { redraw_requested: false, .. }));
        assert!(!s.scheduler().is_pending());
        assert!(s.take_redraw().is_none());
    }

    #[test]
    fn bursts_coalesce_into_one_plan() {
        let mut s = scope(small());
        s.set_surface(200, 100);
        assert!(s.take_redraw().is_some());
        for _ in 0..5 {
            s.ingest(&square(32, 16)).unwrap();
        }
        assert!(s.take_redraw().is_some());
        assert!(s.take_redraw().is_none());
    }

    #[test]
    fn paused_defers_and_resume_flushes() {
        let mut s = scope(small());
        s.set_surface(100, 100);
        s.take_redraw();
        s.set_parameters(ScopeParameters { paused: true, ..small() }).unwrap();
        assert!(s.take_redraw().is_some(), "parameter change forces a redraw");

        let cursor = s.buffer().cursor();
        let outcome = s.ingest(&square(40, 16)).unwrap();
        assert_eq!(outcome, IngestOutcome::Deferred { backlog_samples: 40 });
        assert_eq!(s.buffer().cursor(), cursor);
        assert!(s.take_redraw().is_none());

        s.set_parameters(small()).unwrap();
        assert_eq!(s.buffer().cursor(), 40);
        assert_eq!(s.backlog_samples(), 0);
        assert!(!s.trigger().record().is_empty());
    }

    #[test]
    fn backlog_keeps_newest_buffer_worth() {
        let mut s = scope(ScopeParameters { paused: true, ..small() });
        for _ in 0..10 {
            s.ingest(&square(100, 16)).unwrap();
        }
        assert_eq!(s.backlog_samples(), 256);
        s.ingest(&square(1000, 16)).unwrap();
        assert_eq!(s.backlog_samples(), 256);
    }

    #[test]
    fn odd_chunk_leaves_everything_alone() {
        let mut s = scope(small());
        s.set_surface(10, 10);
        s.take_redraw();
        assert!(s.ingest(&[0.5, 0.5, 0.5]).is_err());
        assert_eq!(s.buffer().cursor(), 0);
        assert!(!s.scheduler().is_pending());
    }

    #[test]
    fn history_change_resets_buffer_and_triggers() {
        let mut s = scope(small());
        s.ingest(&square(200, 16)).unwrap();
        assert!(!s.trigger().record().is_empty());
        let changes = s
            .set_parameters(ScopeParameters { history_samples: 1024, ..small() })
            .unwrap();
        assert!(changes.history);
        assert_eq!(s.buffer().capacity(), 1024);
        assert_eq!(s.buffer().cursor(), 0);
        assert!(s.trigger().record().is_empty());
    }

    #[test]
    fn invalid_parameters_are_rejected_whole() {
        let mut s = scope(small());
        let bad = ScopeParameters { invgamma: 7.0, ..small() };
        assert!(s.set_parameters(bad).is_err());
        assert_eq!(s.parameters(), &small());
    }

    #[test]
    fn untriggered_plan_is_centered() {
        let mut s = scope(ScopeParameters { axes: AxesMode::Xy, ..small() });
        s.set_surface(100, 100);
        s.ingest(&square(200, 16)).unwrap();
        let plan = s.take_redraw().unwrap();
        assert_eq!(plan.sweeps.len(), 1);
        assert_eq!(plan.sweeps[0].trigger_time, UNTRIGGERED_TIME);
        assert_eq!(plan.sweeps[0].depth_offset, 0.0);
        assert_eq!(plan.primitive, Primitive::Points);
    }

    #[test]
    fn triggered_plan_has_one_sweep_per_entry() {
        let mut s = scope(ScopeParameters { draw_line: true, ..small() });
        s.set_surface(100, 100);
        s.ingest(&square(256, 32)).unwrap();
        let valid = s.trigger().record().valid_count();
        assert!(valid > 1);
        let plan = s.take_redraw().unwrap();
        assert_eq!(plan.sweeps.len(), valid);
        assert_eq!(plan.sweeps[0].depth_offset, 0.0);
        assert!(plan.sweeps.windows(2).all(|w| w[1].depth_offset < w[0].depth_offset));
        assert_eq!(plan.primitive, Primitive::LineStrip);
        assert_eq!(plan.dot_count, 255 * INTERP_SCALE + 1);
    }

    #[test]
    fn surface_changes_request_frames() {
        let mut s = scope(small());
        assert!(s.set_surface(10, 10));
        assert!(!s.set_surface(10, 10));
        assert!(s.take_redraw().is_some());
        assert!(s.set_surface(0, 10));
        assert!(s.surface().is_none());
        s.request_redraw();
        assert!(s.take_redraw().is_none());
        assert!(s.scheduler().is_pending());
    }

    #[test]
    fn surface_changes_leave_history_alone() {
        let mut s = scope(small());
        s.ingest(&square(200, 16)).unwrap();
        let cursor = s.buffer().cursor();
        let shadow = s.buffer().shadow().to_vec();
        let record = s.trigger().record().clone();
        assert!(!record.is_empty());

        for (width, height) in [(640, 480), (1, 1), (0, 300), (1920, 1080), (300, 0)] {
            s.set_surface(width, height);
            s.take_redraw();
            assert_eq!(s.buffer().cursor(), cursor);
            assert_eq!(s.buffer().shadow(), &shadow[..]);
            assert_eq!(s.trigger().record(), &record);
        }
    }

    #[test]
    fn reset_clears_history() {
        let mut s = scope(small());
        s.ingest(&square(100, 16)).unwrap();
        s.reset();
        assert_eq!(s.buffer().cursor(), 0);
        assert!(s.trigger().record().is_empty());
        assert!(s.buffer().shadow().iter().all(|v| *v == 0.0));
        assert_eq!(s.buffer().texture().data, s.buffer().shadow());
    }

    #[test]
    fn relative_time_wraps() {
        assert_eq!(relative_time(5, 5, 10), 0.0);
        assert_eq!(relative_time(4, 5, 10), 0.9);
        assert_eq!(relative_time(7, 5, 10), 0.2);
    }
}
