//! Two-phase baseline calibration: eyes closed, then eyes open, both
//! started explicitly by the caller.

use std::str::FromStr;
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::error::PipelineError;
use crate::stats::{mean, percentile_sorted, population_std};

/// Floor added to the pooled standard deviation so z-scores stay finite.
const STD_FLOOR: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePhase {
    EyesClosed,
    EyesOpen,
}

impl FromStr for BaselinePhase {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eyes_closed" => Ok(Self::EyesClosed),
            "eyes_open" => Ok(Self::EyesOpen),
            other => Err(PipelineError::InvalidPhase(other.to_owned())),
        }
    }
}

/// Summary of the pooled two-phase calibration samples. Immutable once
/// computed; recalibrating replaces it wholesale.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BaselineStats {
    pub mean: f32,
    pub std: f32,
    pub p50: f32,
    pub p60: f32,
    pub p70: f32,
}

/// Phase bookkeeping exposed to callers. A phase that auto-closed leaves
/// `active_phase` at `None` while its sample count stays put, which is how a
/// caller tells "waiting for the next phase" from "never calibrated".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationStatus {
    pub active_phase: Option<BaselinePhase>,
    pub closed_samples: usize,
    pub open_samples: usize,
}

/// Accumulates smoothed band-power observations during explicit phases and
/// derives the pooled baseline statistics.
///
/// A phase auto-closes once `phase_duration` seconds have elapsed but never
/// advances on its own; the caller starts the next phase explicitly.
pub struct BaselineCalibrator {
    phase: Option<BaselinePhase>,
    phase_duration: f64,
    wall_start: Option<Instant>,
    stream_start: Option<f64>,
    closed: Vec<f32>,
    open: Vec<f32>,
}

impl BaselineCalibrator {
    pub fn new(phase_duration: f64) -> Self {
        Self {
            phase: None,
            phase_duration,
            wall_start: None,
            stream_start: None,
            closed: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Start or restart a phase. Restarting discards the phase's previous
    /// contribution so recalibration replaces, not extends.
    pub fn begin_phase(&mut self, phase: BaselinePhase) {
        match phase {
            BaselinePhase::EyesClosed => self.closed.clear(),
            BaselinePhase::EyesOpen => self.open.clear(),
        }
        self.phase = Some(phase);
        self.wall_start = Some(Instant::now());
        self.stream_start = None;
        info!("baseline phase {phase:?} started");
    }

    /// Record one smoothed band-power observation. `timestamp` is the stream
    /// time of the window that produced it; without timestamps the wall
    /// clock decides when the phase expires.
    pub fn observe(&mut self, value: f32, timestamp: Option<f64>) {
        let Some(phase) = self.phase else { return };
        match phase {
            BaselinePhase::EyesClosed => self.closed.push(value),
            BaselinePhase::EyesOpen => self.open.push(value),
        }
        let elapsed = match timestamp {
            Some(now) => {
                let start = *self.stream_start.get_or_insert(now);
                now - start
            }
            None => self
                .wall_start
                .map(|start| start.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        };
        if elapsed >= self.phase_duration {
            info!("baseline phase {phase:?} closed after {elapsed:.1} s; next phase must be started explicitly");
            self.phase = None;
            self.wall_start = None;
            self.stream_start = None;
        }
    }

    /// Pooled statistics over both phases, or `None` until each phase has
    /// contributed at least one sample.
    pub fn finalize(&self) -> Option<BaselineStats> {
        if self.closed.is_empty() || self.open.is_empty() {
            return None;
        }
        let mut pooled: Vec<f32> = self.closed.iter().chain(&self.open).copied().collect();
        pooled.sort_by(f32::total_cmp);
        let stats = BaselineStats {
            mean: mean(&pooled),
            std: population_std(&pooled) + STD_FLOOR,
            p50: percentile_sorted(&pooled, 50.0),
            p60: percentile_sorted(&pooled, 60.0),
            p70: percentile_sorted(&pooled, 70.0),
        };
        info!(
            "baseline acquired over {} samples: mean={:.4} std={:.4}",
            pooled.len(),
            stats.mean,
            stats.std
        );
        Some(stats)
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            active_phase: self.phase,
            closed_samples: self.closed.len(),
            open_samples: self.open.len(),
        }
    }

    pub fn reset(&mut self) {
        self.phase = None;
        self.wall_start = None;
        self.stream_start = None;
        self.closed.clear();
        self.open.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn phase_strings_parse_and_reject() {
        assert_eq!(
            "eyes_closed".parse::<BaselinePhase>().unwrap(),
            BaselinePhase::EyesClosed
        );
        assert!(matches!(
            "eyes_shut".parse::<BaselinePhase>(),
            Err(PipelineError::InvalidPhase(_))
        ));
    }

    #[test]
    fn finalize_needs_both_phases() {
        let mut cal = BaselineCalibrator::new(120.0);
        assert!(cal.finalize().is_none());
        cal.begin_phase(BaselinePhase::EyesClosed);
        cal.observe(10.0, Some(0.0));
        assert!(cal.finalize().is_none());
    }

    #[test]
    fn pooled_stats_over_both_phases() {
        let mut cal = BaselineCalibrator::new(120.0);
        cal.begin_phase(BaselinePhase::EyesClosed);
        for i in 0..5 {
            cal.observe(10.0, Some(i as f64 * 0.5));
        }
        cal.begin_phase(BaselinePhase::EyesOpen);
        for i in 0..5 {
            cal.observe(20.0, Some(10.0 + i as f64 * 0.5));
        }
        let stats = cal.finalize().unwrap();
        assert_abs_diff_eq!(stats.mean, 15.0, epsilon = 1e-4);
        assert_abs_diff_eq!(stats.std, 5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(stats.p50, 15.0, epsilon = 1e-4);
        assert_abs_diff_eq!(stats.p60, 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(stats.p70, 20.0, epsilon = 1e-4);
        assert!(stats.std >= 1e-6);
    }

    #[test]
    fn phase_auto_closes_without_advancing() {
        let mut cal = BaselineCalibrator::new(1.0);
        cal.begin_phase(BaselinePhase::EyesClosed);
        cal.observe(10.0, Some(0.0));
        cal.observe(10.0, Some(0.5));
        assert_eq!(cal.status().active_phase, Some(BaselinePhase::EyesClosed));
        cal.observe(10.0, Some(1.0));
        let status = cal.status();
        assert_eq!(status.active_phase, None);
        assert_eq!(status.closed_samples, 3);
        assert_eq!(status.open_samples, 0);
        // observations outside any phase go nowhere
        cal.observe(10.0, Some(1.5));
        assert_eq!(cal.status().closed_samples, 3);
    }

    #[test]
    fn restarting_a_phase_discards_its_samples() {
        let mut cal = BaselineCalibrator::new(120.0);
        cal.begin_phase(BaselinePhase::EyesClosed);
        cal.observe(10.0, Some(0.0));
        cal.observe(11.0, Some(0.5));
        cal.begin_phase(BaselinePhase::EyesClosed);
        assert_eq!(cal.status().closed_samples, 0);
    }
}
