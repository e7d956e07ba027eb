//! The decision pipeline behind a single `push` entry point.
//!
//! Raw chunk -> artifact gate -> common average reference -> zero-phase
//! filtering -> per-channel sliding buffers -> (on a window boundary) band
//! power with bad-channel screening -> EMA -> baseline bookkeeping ->
//! z-score -> hysteretic ON/OFF state.
//!
//! The pipeline is a plain call-driven object with no interior locking: one
//! producer drives `push`, and any thread issuing calibration controls must
//! share the same exclusive handle (a mutex around the pipeline, or a
//! single-threaded actor).

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::artifact::ArtifactGate;
use crate::baseline::{BaselineCalibrator, BaselinePhase, BaselineStats, CalibrationStatus};
use crate::buffer::SlidingBuffer;
use crate::channels::bad_channels;
use crate::config::AlphaConfig;
use crate::error::PipelineError;
use crate::filter::FilterChain;
use crate::frame::ChannelFrame;
use crate::smoother::Ema;
use crate::source::FrameSource;
use crate::welch::WelchPsd;

use ndarray::Axis;

/// Guard against a vanishing baseline deviation when forming z-scores.
const Z_EPSILON: f32 = 1e-6;
/// z-score span mapped onto the [0, 1] UI score.
const UI_Z_SPAN: f32 = 4.0;

/// Public indicator state for one processed window. `Artifact` is
/// transient: it forces the underlying ON latch false but is not itself
/// remembered across windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusState {
    Off,
    On,
    Artifact,
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FocusState::Off => "OFF",
            FocusState::On => "ON",
            FocusState::Artifact => "ARTIFACT",
        };
        f.write_str(name)
    }
}

/// Baseline percentile references carried on every result once calibrated.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PercentileRefs {
    pub p50: f32,
    pub p60: f32,
    pub p70: f32,
}

/// Metrics for one processed window.
#[derive(Clone, Debug, Serialize)]
pub struct StepResult {
    pub band_power: f32,
    pub smoothed_power: f32,
    /// `None` until a baseline exists.
    pub z_score: Option<f32>,
    /// `z / 4 + 0.5` clamped to [0, 1]; `None` until a baseline exists.
    pub ui_score: Option<f32>,
    pub status: FocusState,
    pub is_artifact: bool,
    /// Channels screened out of this window's aggregate, multi-channel only.
    pub bad_channels: Vec<usize>,
    pub baseline_percentiles: Option<PercentileRefs>,
}

/// Streaming alpha-power pipeline. Owns every piece of mutable state; the
/// caller holds the only handle.
pub struct AlphaPipeline {
    cfg: AlphaConfig,
    n_channels: usize,
    window_len: usize,
    step_len: usize,
    filter: FilterChain,
    buffers: Vec<SlidingBuffer>,
    welch: WelchPsd,
    ema: Ema,
    gate: ArtifactGate,
    calibrator: BaselineCalibrator,
    baseline: Option<BaselineStats>,
    on: bool,
    pending_samples: usize,
}

impl AlphaPipeline {
    pub fn new(cfg: AlphaConfig, n_channels: usize) -> Result<Self, PipelineError> {
        cfg.validate()?;
        if n_channels == 0 {
            return Err(PipelineError::NoChannels);
        }
        let window_len = cfg.window_len();
        let step_len = cfg.step_len();
        Ok(Self {
            filter: FilterChain::from_config(&cfg),
            buffers: (0..n_channels)
                .map(|_| SlidingBuffer::new(window_len))
                .collect(),
            welch: WelchPsd::for_window(cfg.fs, window_len),
            ema: Ema::from_step(step_len, cfg.ema_tau_sec, cfg.fs),
            gate: ArtifactGate::new(cfg.artifact_amp_uv, cfg.artifact_slope_uvps),
            calibrator: BaselineCalibrator::new(cfg.baseline_phase_sec),
            baseline: None,
            on: false,
            pending_samples: 0,
            cfg,
            n_channels,
            window_len,
            step_len,
        })
    }

    /// Feed one raw chunk. Returns `Ok(None)` until a window boundary is
    /// crossed; at most one window is evaluated per call. A chunk is
    /// processed to completion or rejected up front, never partially.
    pub fn push(
        &mut self,
        frame: &ChannelFrame,
        timestamp: Option<f64>,
    ) -> Result<Option<StepResult>, PipelineError> {
        if frame.num_channels() != self.n_channels {
            return Err(PipelineError::ChannelMismatch {
                expected: self.n_channels,
                actual: frame.num_channels(),
            });
        }
        let n_samples = frame.num_samples();
        if n_samples == 0 {
            return Ok(None);
        }
        let timestamp = timestamp.or_else(|| frame.timestamp());

        let is_artifact = match frame.representative_tail() {
            Some(tail) => self.gate.check(timestamp, tail),
            None => false,
        };

        // A common average reference needs several electrodes; with one
        // channel it would null the signal outright.
        let referenced = if self.n_channels >= 2 {
            frame.centered()
        } else {
            frame.samples().clone()
        };
        for (channel, buffer) in self.buffers.iter_mut().enumerate() {
            let series: Vec<f32> = referenced.index_axis(Axis(1), channel).to_vec();
            buffer.append(&self.filter.apply_zero_phase(&series));
        }
        self.pending_samples += n_samples;

        if !self.buffers[0].is_window_ready() || self.pending_samples < self.step_len {
            return Ok(None);
        }
        // Burst catch-up is capped at one backlogged evaluation.
        self.pending_samples = (self.pending_samples - self.step_len).min(self.step_len);

        let (band_power, rejected) = self.window_band_power();
        let smoothed = self.ema.update(band_power);
        self.calibrator.observe(smoothed, timestamp);

        let z_score = self
            .baseline
            .as_ref()
            .map(|stats| (smoothed - stats.mean) / stats.std.max(Z_EPSILON));

        let status = if is_artifact {
            self.on = false;
            FocusState::Artifact
        } else if let Some(z) = z_score {
            if !self.on && z >= self.cfg.on_z {
                self.on = true;
                debug!("indicator ON at z={z:.2}");
            } else if self.on && z <= self.cfg.off_z {
                self.on = false;
                debug!("indicator OFF at z={z:.2}");
            }
            if self.on {
                FocusState::On
            } else {
                FocusState::Off
            }
        } else {
            FocusState::Off
        };

        Ok(Some(StepResult {
            band_power,
            smoothed_power: smoothed,
            z_score,
            ui_score: z_score.map(|z| (z / UI_Z_SPAN + 0.5).clamp(0.0, 1.0)),
            status,
            is_artifact,
            bad_channels: rejected,
            baseline_percentiles: self.baseline.as_ref().map(|stats| PercentileRefs {
                p50: stats.p50,
                p60: stats.p60,
                p70: stats.p70,
            }),
        }))
    }

    /// Band power of the newest window. Multi-channel blocks are estimated
    /// per channel and averaged over the channels that pass screening; if
    /// every channel is screened out the average falls back to all of them.
    fn window_band_power(&self) -> (f32, Vec<usize>) {
        let windows: Vec<Vec<f32>> = self
            .buffers
            .iter()
            .filter_map(|buffer| buffer.latest_window())
            .collect();
        let (f_lo, f_hi) = self.cfg.band;
        if windows.len() == 1 {
            let psd = self.welch.estimate(&windows[0]);
            return (self.welch.band_power(&psd, f_lo, f_hi), Vec::new());
        }
        let rejected = bad_channels(&windows, self.cfg.bad_channel_k, self.cfg.bad_channel_floor);
        if !rejected.is_empty() {
            debug!("screening out channels {rejected:?} for this window");
        }
        let powers: Vec<f32> = windows
            .iter()
            .map(|window| {
                let psd = self.welch.estimate(window);
                self.welch.band_power(&psd, f_lo, f_hi)
            })
            .collect();
        let kept: Vec<f32> = powers
            .iter()
            .enumerate()
            .filter(|(channel, _)| !rejected.contains(channel))
            .map(|(_, &power)| power)
            .collect();
        let pool = if kept.is_empty() { &powers[..] } else { &kept[..] };
        (pool.iter().sum::<f32>() / pool.len() as f32, rejected)
    }

    /// Start or restart a calibration phase.
    pub fn begin_baseline_phase(&mut self, phase: BaselinePhase) {
        self.calibrator.begin_phase(phase);
    }

    /// Finalize calibration. `None` until both phases have contributed; on
    /// success the stats become the reference for all following z-scores.
    pub fn end_baseline(&mut self) -> Option<BaselineStats> {
        let stats = self.calibrator.finalize();
        if let Some(stats) = stats {
            self.baseline = Some(stats);
        }
        stats
    }

    /// Drop EMA state, baseline data and the ON/OFF latch. Buffered samples
    /// survive so the stream keeps its continuity.
    pub fn reset(&mut self) {
        self.ema.reset();
        self.calibrator.reset();
        self.baseline = None;
        self.on = false;
    }

    pub fn baseline(&self) -> Option<&BaselineStats> {
        self.baseline.as_ref()
    }

    pub fn calibration_status(&self) -> CalibrationStatus {
        self.calibrator.status()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn num_channels(&self) -> usize {
        self.n_channels
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Pull one frame from a source and push it.
    pub fn pump<S: FrameSource>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<StepResult>, PipelineError> {
        match source.next_frame()? {
            Some(frame) => {
                let timestamp = frame.timestamp();
                self.push(&frame, timestamp)
            }
            None => Ok(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_baseline_for_test(&mut self, stats: BaselineStats) {
        self.baseline = Some(stats);
    }
}
