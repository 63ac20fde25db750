use glam::{Mat4, Vec4};

use crate::axis::{AxisSpec, AxisToken, AXIS_COUNT};
use crate::memo::Memo;
use crate::parameter::{db_to_amplitude, ScopeParameters};

/// Axis index that carries afterglow depth rather than screen position.
pub const DEPTH_AXIS: usize = 2;

/// Everything the projection depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInputs {
    pub axes: AxisSpec,
    pub gain_db: f32,
    pub history_samples: usize,
    pub time_scale: f32,
}

impl ProjectionInputs {
    pub fn from_parameters(params: &ScopeParameters) -> Self {
        Self {
            axes: params.axes.axis_spec(),
            gain_db: params.gain,
            history_samples: params.history_samples,
            time_scale: params.time_scale,
        }
    }
}

/// Static projection of a sample `(ch1, ch2, time, 1)` onto `(x, y, depth, w)`.
///
/// Each row holds the weights of one output axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionState {
    pub rows: [Vec4; 4],
    /// Whether a screen axis shows time, so sweeps should align on triggers.
    pub uses_trigger: bool,
}

impl ProjectionState {
    /// Per-draw matrix for a sweep aligned on `trigger_time` (relative to the
    /// buffer, in `[0, 1)`) and pushed back in depth by `depth_offset`.
    ///
    /// The result maps a column vector, i.e. `matrix * base_pos`.
    pub fn sweep_matrix(&self, aspect: f32, trigger_time: f32, depth_offset: f32) -> Mat4 {
        let mut rows = self.rows;
        let shift = trigger_time * 2.0 - 1.0;
        for row in rows.iter_mut() {
            row.w -= row.z * shift;
        }
        if aspect > 0.0 {
            rows[0] /= aspect;
        }
        rows[DEPTH_AXIS].w += depth_offset;
        Mat4::from_cols(rows[0], rows[1], rows[2], rows[3]).transpose()
    }
}

/// Build the projection rows for an axis spec. Pure.
pub fn resolve(inputs: &ProjectionInputs) -> ProjectionState {
    let gain = db_to_amplitude(inputs.gain_db);
    let time_stretch = inputs.history_samples as f32 / inputs.time_scale;

    let mut rows = [Vec4::ZERO, Vec4::ZERO, Vec4::ZERO, Vec4::W];
    let mut uses_trigger = false;

    for (index, tokens) in inputs.axes.axes() {
        debug_assert!(index < AXIS_COUNT);
        for token in tokens {
            let contribution = match token {
                AxisToken::Const1 => Vec4::new(0.0, 0.0, 0.0, 1.0),
                AxisToken::Channel1 => Vec4::new(gain, 0.0, 0.0, 0.0),
                AxisToken::Channel2 => Vec4::new(0.0, gain, 0.0, 0.0),
                AxisToken::Time if index == DEPTH_AXIS => Vec4::new(0.0, 0.0, 1.0, 0.0),
                AxisToken::Time => {
                    uses_trigger = true;
                    Vec4::new(0.0, 0.0, time_stretch, 0.0)
                }
                AxisToken::SumChannels => Vec4::new(gain, gain, 0.0, 0.0),
                AxisToken::DiffChannels => Vec4::new(gain, -gain, 0.0, 0.0),
                AxisToken::Unknown(text) => {
                    log::warn!("bad axis specification token {:?} on axis {}", text, index);
                    Vec4::ZERO
                }
            };
            rows[index] += contribution;
        }
    }

    ProjectionState { rows, uses_trigger }
}

/// Owns the memoized [`ProjectionState`].
#[derive(Debug, Default)]
pub struct AxisProjector {
    cell: Memo<ProjectionInputs, ProjectionState>,
    recomputations: u64,
}

impl AxisProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, inputs: &ProjectionInputs) -> ProjectionState {
        let recomputations = &mut self.recomputations;
        *self.cell.get_or_compute(inputs, |inputs| {
            *recomputations += 1;
            log::debug!("recomputing projection for {:?}", inputs);
            resolve(inputs)
        })
    }

    pub fn invalidate(&mut self) {
        self.cell.invalidate();
    }

    /// How many times the projection has been rebuilt.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxesMode;

    fn inputs(spec: &str, gain_db: f32) -> ProjectionInputs {
        ProjectionInputs {
            axes: AxisSpec::parse(spec),
            gain_db,
            history_samples: 8192,
            time_scale: 1024.0,
        }
    }

    #[test]
    fn time_channel_constant() {
        let state = resolve(&inputs("t,ch1,1", 0.0));
        assert!(state.uses_trigger);
        assert_eq!(state.rows[0], Vec4::new(0.0, 0.0, 8.0, 0.0));
        assert_eq!(state.rows[1], Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(state.rows[2], Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(state.rows[3], Vec4::W);
    }

    #[test]
    fn depth_time_does_not_use_trigger() {
        let state = resolve(&inputs("ch1,ch2,t", 20.0));
        assert!(!state.uses_trigger);
        assert!((state.rows[0].x - 10.0).abs() < 1e-4);
        assert!((state.rows[1].y - 10.0).abs() < 1e-4);
        assert_eq!(state.rows[2], Vec4::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn sum_and_difference() {
        let state = resolve(&inputs(AxesMode::Stereo.spec(), 0.0));
        assert_eq!(state.rows[0], Vec4::new(1.0, -1.0, 0.0, 0.0));
        assert_eq!(state.rows[1], Vec4::new(1.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn unknown_token_contributes_nothing() {
        let state = resolve(&inputs("t,wat,1", 0.0));
        assert_eq!(state.rows[1], Vec4::ZERO);
        assert!(state.uses_trigger);
    }

    #[test]
    fn tokens_accumulate() {
        let state = resolve(&inputs("ch1 ch1,ch2 1,1", 0.0));
        assert_eq!(state.rows[0], Vec4::new(2.0, 0.0, 0.0, 0.0));
        assert_eq!(state.rows[1], Vec4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn sweep_matrix_centers_trigger() {
        let state = resolve(&inputs("t,ch1,1", 0.0));
        // A sample exactly at the trigger lands on x = 0.
        let trigger_time = 0.25;
        let m = state.sweep_matrix(1.0, trigger_time, 0.0);
        let at_trigger = m * Vec4::new(0.3, 0.0, trigger_time * 2.0 - 1.0, 1.0);
        assert!(at_trigger.x.abs() < 1e-5);
        assert!((at_trigger.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn sweep_matrix_aspect_and_depth() {
        let state = resolve(&inputs("ch1,ch2,1", 0.0));
        let m = state.sweep_matrix(2.0, 0.5, -0.25);
        let p = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
        assert!((p.z - 0.75).abs() < 1e-6);
        assert!((p.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn projector_memoizes_by_value() {
        let mut projector = AxisProjector::new();
        let a = inputs("t,ch1,1", 0.0);
        projector.resolve(&a);
        projector.resolve(&a.clone());
        assert_eq!(projector.recomputations(), 1);

        projector.resolve(&inputs("t,ch1,1", 3.0));
        assert_eq!(projector.recomputations(), 2);

        let mut deeper = inputs("t,ch1,1", 3.0);
        deeper.history_samples = 16384;
        let state = projector.resolve(&deeper);
        assert_eq!(projector.recomputations(), 3);
        assert_eq!(state.rows[0].z, 16.0);
    }
}
