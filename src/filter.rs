//! Zero-phase IIR front end: optional line-frequency notch, then high-pass,
//! then low-pass, each run forward and backward over the chunk so no group
//! delay enters the analysis windows.

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use crate::config::AlphaConfig;

/// Notch quality factor, the classic EEG line-filter setting.
const NOTCH_Q: f32 = 30.0;
/// Section Qs of a 4th-order Butterworth lowpass split into two biquads.
const BUTTER4_Q: [f32; 2] = [0.541_196_1, 1.306_563];

#[derive(Clone, Copy, Debug)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl Biquad {
    fn lowpass(freq_hz: f32, fs: f32, q: f32) -> Self {
        let w0 = 2.0 * PI * freq_hz / fs;
        let alpha = (w0 / 2.0).sin() / (2.0 * q);
        let cos_w0 = w0.cos();
        let b0 = (1.0 - cos_w0) * 0.5;
        Self::normalized(b0, 1.0 - cos_w0, b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
    }

    fn highpass(freq_hz: f32, fs: f32, q: f32) -> Self {
        let w0 = 2.0 * PI * freq_hz / fs;
        let alpha = (w0 / 2.0).sin() / (2.0 * q);
        let cos_w0 = w0.cos();
        let b0 = (1.0 + cos_w0) * 0.5;
        Self::normalized(
            b0,
            -(1.0 + cos_w0),
            b0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        )
    }

    fn notch(freq_hz: f32, fs: f32, q: f32) -> Self {
        let w0 = 2.0 * PI * freq_hz / fs;
        let alpha = (w0 / 2.0).sin() / (2.0 * q);
        let cos_w0 = w0.cos();
        Self::normalized(
            1.0,
            -2.0 * cos_w0,
            1.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        )
    }

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// Run the section across `data` in place, starting from rest.
    /// Transposed direct form II.
    fn run(&self, data: &mut [f32]) {
        let (mut z1, mut z2) = (0.0f32, 0.0f32);
        for v in data.iter_mut() {
            let y = self.b0 * *v + z1;
            z1 = self.b1 * *v - self.a1 * y + z2;
            z2 = self.b2 * *v - self.a2 * y;
            *v = y;
        }
    }
}

/// Fixed cascade with coefficients derived once from configuration. Each
/// chunk is filtered independently; no state survives a chunk boundary.
pub struct FilterChain {
    sections: Vec<Biquad>,
}

impl FilterChain {
    pub fn from_config(cfg: &AlphaConfig) -> Self {
        let mut sections = Vec::with_capacity(4);
        if let Some(freq) = cfg.notch_hz {
            sections.push(Biquad::notch(freq, cfg.fs, NOTCH_Q));
        }
        sections.push(Biquad::highpass(cfg.hp_hz, cfg.fs, FRAC_1_SQRT_2));
        for q in BUTTER4_Q {
            sections.push(Biquad::lowpass(cfg.lp_hz, cfg.fs, q));
        }
        Self { sections }
    }

    /// Filter one chunk forward, then backward, cancelling the phase delay
    /// of the cascade.
    pub fn apply_zero_phase(&self, input: &[f32]) -> Vec<f32> {
        let mut data = input.to_vec();
        for section in &self.sections {
            section.run(&mut data);
        }
        data.reverse();
        for section in &self.sections {
            section.run(&mut data);
        }
        data.reverse();
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The chain trades recomputation for phase accuracy: every chunk is
    // re-filtered from rest in both directions instead of carrying causal
    // state across chunks. The tests below pin what that buys: in-band
    // content keeps its amplitude AND its timing, so threshold decisions
    // track power changes without systematic lag.

    fn sine(freq: f32, fs: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / fs).sin())
            .collect()
    }

    fn mid_rms(data: &[f32]) -> f32 {
        let mid = &data[data.len() / 4..3 * data.len() / 4];
        (mid.iter().map(|v| v * v).sum::<f32>() / mid.len() as f32).sqrt()
    }

    #[test]
    fn alpha_band_passes_with_near_unity_gain() {
        let chain = FilterChain::from_config(&AlphaConfig::new(256.0));
        let input = sine(10.0, 256.0, 1024);
        let output = chain.apply_zero_phase(&input);
        let ratio = mid_rms(&output) / mid_rms(&input);
        assert!((0.9..=1.1).contains(&ratio), "gain ratio {ratio}");
    }

    #[test]
    fn notch_suppresses_line_frequency() {
        let chain = FilterChain::from_config(&AlphaConfig::new(256.0));
        let input = sine(50.0, 256.0, 1024);
        let output = chain.apply_zero_phase(&input);
        assert!(mid_rms(&output) < 0.1 * mid_rms(&input));
    }

    #[test]
    fn highpass_removes_dc_offset() {
        let chain = FilterChain::from_config(&AlphaConfig::new(256.0));
        let input = vec![25.0f32; 1024];
        let output = chain.apply_zero_phase(&input);
        assert!(mid_rms(&output) < 0.5);
    }

    #[test]
    fn forward_backward_pass_leaves_no_group_delay() {
        // A causal run of the same cascade would shift the 10 Hz peaks by
        // several samples; the forward-backward pass must keep them in place.
        let fs = 256.0;
        let chain = FilterChain::from_config(&AlphaConfig::new(fs));
        let input = sine(10.0, fs, 1024);
        let output = chain.apply_zero_phase(&input);

        let search = 300..724usize;
        let argmax = |data: &[f32]| {
            search
                .clone()
                .max_by(|&a, &b| data[a].total_cmp(&data[b]))
                .unwrap()
        };
        let in_peak = argmax(&input) as i64;
        let out_peak = argmax(&output) as i64;
        assert!(
            (in_peak - out_peak).abs() <= 1,
            "peak moved from {in_peak} to {out_peak}"
        );
    }
}
