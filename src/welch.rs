//! Welch-averaged power spectral density and band power.

use std::sync::Arc;

use rustfft::{num_complex::Complex32, Fft, FftPlanner};

/// Largest segment used for a single periodogram; longer analysis windows
/// are split so averaging can bring the variance down.
const MAX_SEGMENT: usize = 256;

/// PSD estimator for fixed-length analysis windows.
///
/// Overlapping Hann-windowed segments are demeaned, transformed and their
/// periodograms averaged, then scaled to a one-sided density in
/// (unit)²/Hz. The unit is arbitrary but consistent; absolute calibration
/// against physical units is out of scope here.
pub struct WelchPsd {
    fs: f32,
    segment_len: usize,
    step: usize,
    hann: Vec<f32>,
    window_power: f32,
    fft: Arc<dyn Fft<f32>>,
}

impl WelchPsd {
    /// Estimator for windows of `window_len` samples: segment length
    /// `min(window_len, 256)` with 50% segment overlap.
    pub fn for_window(fs: f32, window_len: usize) -> Self {
        let segment_len = window_len.min(MAX_SEGMENT).max(1);
        let step = (segment_len - segment_len / 2).max(1);
        // periodic Hann; degenerate one-sample segments keep unit weight
        let hann: Vec<f32> = if segment_len == 1 {
            vec![1.0]
        } else {
            (0..segment_len)
                .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / segment_len as f32).cos())
                .collect()
        };
        let window_power = hann.iter().map(|w| w * w).sum();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(segment_len);
        Self {
            fs,
            segment_len,
            step,
            hann,
            window_power,
            fft,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.segment_len / 2 + 1
    }

    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.fs / self.segment_len as f32
    }

    /// One-sided PSD of `window`, averaged over every full segment.
    /// A window shorter than one segment yields all-zero bins.
    pub fn estimate(&self, window: &[f32]) -> Vec<f32> {
        let n_bins = self.num_bins();
        let mut acc = vec![0.0f32; n_bins];
        let mut buf = vec![Complex32::new(0.0, 0.0); self.segment_len];
        let mut segments = 0usize;

        let mut start = 0usize;
        while start + self.segment_len <= window.len() {
            let chunk = &window[start..start + self.segment_len];
            let mean = chunk.iter().sum::<f32>() / self.segment_len as f32;
            for ((slot, &value), &weight) in buf.iter_mut().zip(chunk).zip(&self.hann) {
                *slot = Complex32::new((value - mean) * weight, 0.0);
            }
            self.fft.process(&mut buf);
            for (bin, slot) in acc.iter_mut().zip(&buf) {
                *bin += slot.norm_sqr();
            }
            segments += 1;
            start += self.step;
        }

        if segments == 0 {
            return acc;
        }
        let scale = 1.0 / (segments as f32 * self.fs * self.window_power);
        let has_nyquist_bin = self.segment_len % 2 == 0;
        for (bin, value) in acc.iter_mut().enumerate() {
            *value *= scale;
            // interior bins carry the mirrored negative frequencies
            let one_sided_edge = bin == 0 || (has_nyquist_bin && bin == n_bins - 1);
            if !one_sided_edge {
                *value *= 2.0;
            }
        }
        acc
    }

    /// Arithmetic mean of the PSD bins whose frequency falls inside
    /// `[f_lo, f_hi]`; 0 when the band holds no bin.
    pub fn band_power(&self, psd: &[f32], f_lo: f32, f_hi: f32) -> f32 {
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for (bin, &power) in psd.iter().enumerate() {
            let freq = self.bin_frequency(bin);
            if freq >= f_lo && freq <= f_hi {
                sum += power;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }
}
