use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Immutable processing configuration, validated once when the pipeline is
/// built. Amplitudes are treated as microvolts throughout, but only the
/// artifact thresholds care about the physical unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlphaConfig {
    /// Sampling rate in Hz.
    pub fs: f32,
    /// Target frequency band (lo, hi) in Hz.
    pub band: (f32, f32),
    /// High-pass cutoff in Hz, removes electrode drift.
    pub hp_hz: f32,
    /// Low-pass cutoff in Hz, rejects high-frequency noise.
    pub lp_hz: f32,
    /// Line-frequency notch in Hz; `None` disables the stage.
    pub notch_hz: Option<f32>,
    /// Analysis window length in seconds.
    pub window_sec: f32,
    /// Window overlap fraction in [0, 1).
    pub window_overlap: f32,
    /// EMA smoothing time constant in seconds.
    pub ema_tau_sec: f32,
    /// z-score at or above which the indicator switches ON.
    pub on_z: f32,
    /// z-score at or below which the indicator switches OFF.
    pub off_z: f32,
    /// Absolute amplitude (µV) that marks a sample as an artifact.
    pub artifact_amp_uv: f32,
    /// Slope (µV/s) that marks a sample as an artifact.
    pub artifact_slope_uvps: f32,
    /// Seconds a baseline phase accumulates before it auto-closes.
    pub baseline_phase_sec: f64,
    /// IQR fence multiplier for bad-channel screening.
    pub bad_channel_k: f32,
    /// Variance floor below which a channel is always screened out.
    pub bad_channel_floor: f32,
}

impl AlphaConfig {
    /// Defaults for an alpha (8-12 Hz) protocol at the given sampling rate.
    pub fn new(fs: f32) -> Self {
        Self {
            fs,
            band: (8.0, 12.0),
            hp_hz: 1.0,
            lp_hz: 40.0,
            notch_hz: Some(50.0),
            window_sec: 1.0,
            window_overlap: 0.5,
            ema_tau_sec: 2.0,
            on_z: 1.0,
            off_z: 0.7,
            artifact_amp_uv: 150.0,
            artifact_slope_uvps: 800.0,
            baseline_phase_sec: 120.0,
            bad_channel_k: 0.5,
            bad_channel_floor: 1e-6,
        }
    }

    pub fn nyquist(&self) -> f32 {
        self.fs / 2.0
    }

    /// Window length in samples.
    pub fn window_len(&self) -> usize {
        (self.window_sec * self.fs) as usize
    }

    /// Stride between window evaluations, in samples.
    pub fn step_len(&self) -> usize {
        ((self.window_len() as f32 * (1.0 - self.window_overlap)) as usize).max(1)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.fs > 0.0) {
            return Err(PipelineError::InvalidSampleRate);
        }
        let nyquist = self.nyquist();
        let (lo, hi) = self.band;
        if !(0.0 <= lo && lo < hi && hi <= nyquist) {
            return Err(PipelineError::InvalidBand { lo, hi, nyquist });
        }
        for cutoff in [Some(self.hp_hz), Some(self.lp_hz), self.notch_hz].into_iter().flatten() {
            if !(cutoff > 0.0 && cutoff < nyquist) {
                return Err(PipelineError::CutoffOutOfRange { cutoff, nyquist });
            }
        }
        if self.window_sec * self.fs < 1.0 {
            return Err(PipelineError::WindowTooShort(self.window_sec));
        }
        if !(0.0..1.0).contains(&self.window_overlap) {
            return Err(PipelineError::InvalidOverlap(self.window_overlap));
        }
        if !(self.ema_tau_sec > 0.0) {
            return Err(PipelineError::InvalidTimeConstant);
        }
        if self.on_z < self.off_z {
            return Err(PipelineError::ThresholdOrder {
                on: self.on_z,
                off: self.off_z,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AlphaConfig::new(256.0).validate().is_ok());
    }

    #[test]
    fn band_above_nyquist_rejected() {
        let mut cfg = AlphaConfig::new(256.0);
        cfg.band = (8.0, 200.0);
        assert!(matches!(
            cfg.validate(),
            Err(PipelineError::InvalidBand { .. })
        ));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let mut cfg = AlphaConfig::new(256.0);
        cfg.on_z = 0.5;
        cfg.off_z = 1.0;
        assert!(matches!(
            cfg.validate(),
            Err(PipelineError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn full_overlap_rejected() {
        let mut cfg = AlphaConfig::new(256.0);
        cfg.window_overlap = 1.0;
        assert!(matches!(cfg.validate(), Err(PipelineError::InvalidOverlap(_))));
    }

    #[test]
    fn step_never_hits_zero() {
        let mut cfg = AlphaConfig::new(256.0);
        cfg.window_overlap = 0.999;
        assert!(cfg.step_len() >= 1);
    }
}
