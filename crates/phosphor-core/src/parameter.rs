use serde::{Deserialize, Serialize};

use crate::axis::AxesMode;
use crate::error::ConfigError;

/// Selectable ring buffer depths, in samples.
pub const HISTORY_SIZES: [usize; 7] = [256, 512, 1024, 2048, 4096, 8192, 16384];

/// Declared numeric domain of a continuous parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    /// Whether a UI should present the range on a log scale.
    pub logarithmic: bool,
}

impl ParamRange {
    pub const fn new(name: &'static str, min: f32, max: f32, logarithmic: bool) -> Self {
        Self { name, min, max, logarithmic }
    }

    pub fn check(&self, value: f32) -> Result<f32, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { name: self.name, value });
        }
        if value < self.min || value > self.max {
            return Err(ConfigError::OutOfRange {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

pub const TIME_SCALE: ParamRange = ParamRange::new("time_scale", 128.0, 16384.0, false);
pub const GAIN_DB: ParamRange = ParamRange::new("gain", -50.0, 50.0, false);
pub const INTENSITY: ParamRange = ParamRange::new("intensity", 1.01 / 256.0, 10.0, true);
pub const FOCUS_FALLOFF: ParamRange = ParamRange::new("focus_falloff", 0.1, 3.0, false);
pub const PERSISTENCE_GAMMA: ParamRange = ParamRange::new("persistence_gamma", 1.0, 100.0, true);
pub const INVGAMMA: ParamRange = ParamRange::new("invgamma", 0.5, 2.0, false);

/// Convert a gain in decibels to a linear amplitude factor.
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// The user-facing settings of one scope view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeParameters {
    pub paused: bool,
    pub axes: AxesMode,
    /// Connect successive samples with a line strip instead of plotting dots.
    pub draw_line: bool,
    pub history_samples: usize,
    /// Samples per horizontal sweep; also the trigger inhibition window.
    pub time_scale: f32,
    /// Vertical gain in dB.
    pub gain: f32,
    pub intensity: f32,
    pub focus_falloff: f32,
    pub persistence_gamma: f32,
    pub invgamma: f32,
}

impl Default for ScopeParameters {
    fn default() -> Self {
        Self {
            paused: false,
            axes: AxesMode::At,
            draw_line: false,
            history_samples: 8192,
            time_scale: 1024.0,
            gain: 0.0,
            intensity: 1.0,
            focus_falloff: 0.8,
            persistence_gamma: 10.0,
            invgamma: 1.0,
        }
    }
}

impl ScopeParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !HISTORY_SIZES.contains(&self.history_samples) {
            return Err(ConfigError::UnsupportedHistory(self.history_samples));
        }
        TIME_SCALE.check(self.time_scale)?;
        GAIN_DB.check(self.gain)?;
        INTENSITY.check(self.intensity)?;
        FOCUS_FALLOFF.check(self.focus_falloff)?;
        PERSISTENCE_GAMMA.check(self.persistence_gamma)?;
        INVGAMMA.check(self.invgamma)?;
        Ok(())
    }

    /// Trigger inhibition window in samples.
    pub fn inhibition_samples(&self) -> usize {
        (self.time_scale.round() as usize).min(self.history_samples)
    }

    /// Which derived state must be rebuilt when moving from `self` to `next`.
    pub fn changes(&self, next: &ScopeParameters) -> ParameterChanges {
        ParameterChanges {
            history: self.history_samples != next.history_samples,
            projection: self.axes != next.axes
                || self.gain != next.gain
                || self.history_samples != next.history_samples
                || self.time_scale != next.time_scale,
            paused: self.paused != next.paused,
            any: self != next,
        }
    }
}

/// Summary of a parameter update, used to invalidate dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterChanges {
    pub history: bool,
    pub projection: bool,
    pub paused: bool,
    pub any: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ScopeParameters::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let params = ScopeParameters { gain: 60.0, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange { name: "gain", .. })
        ));

        let params = ScopeParameters { focus_falloff: f32::NAN, ..Default::default() };
        assert!(matches!(params.validate(), Err(ConfigError::NotFinite { .. })));
    }

    #[test]
    fn rejects_unlisted_history() {
        let params = ScopeParameters { history_samples: 3000, ..Default::default() };
        assert_eq!(params.validate(), Err(ConfigError::UnsupportedHistory(3000)));
    }

    #[test]
    fn db_conversion() {
        assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amplitude(20.0) - 10.0).abs() < 1e-4);
        assert!((db_to_amplitude(-40.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn inhibition_is_capped_by_history() {
        let params = ScopeParameters {
            history_samples: 512,
            time_scale: 4096.0,
            ..Default::default()
        };
        assert_eq!(params.inhibition_samples(), 512);
    }

    #[test]
    fn change_summary() {
        let base = ScopeParameters::default();
        let brighter = ScopeParameters { intensity: 2.0, ..base.clone() };
        let c = base.changes(&brighter);
        assert!(c.any && !c.projection && !c.history && !c.paused);

        let deeper = ScopeParameters { history_samples: 16384, ..base.clone() };
        let c = base.changes(&deeper);
        assert!(c.history && c.projection);

        assert_eq!(base.changes(&base), ParameterChanges::default());
    }

    #[test]
    fn serde_fills_missing_fields() {
        let params: ScopeParameters = serde_json::from_str(r#"{"axes":"Xy","gain":6.0}"#).unwrap();
        assert_eq!(params.axes, AxesMode::Xy);
        assert_eq!(params.gain, 6.0);
        assert_eq!(params.history_samples, 8192);
    }
}
