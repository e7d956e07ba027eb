//! Bad-channel screening over the current analysis window.

use crate::stats::{percentile_sorted, population_variance};

/// Indices of channels whose window variance falls outside the fence
/// `[max(floor, Q1 - k*IQR), Q3 + k*IQR]` over the cross-channel variance
/// distribution. With identical variances the fence collapses onto the
/// common value and nothing is flagged (unless it sits under the floor).
pub fn bad_channels(windows: &[Vec<f32>], k: f32, floor: f32) -> Vec<usize> {
    if windows.len() < 2 {
        return Vec::new();
    }
    let variances: Vec<f32> = windows.iter().map(|w| population_variance(w)).collect();
    let mut sorted = variances.clone();
    sorted.sort_by(f32::total_cmp);
    let q1 = percentile_sorted(&sorted, 25.0);
    let q3 = percentile_sorted(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower = (q1 - k * iqr).max(floor);
    let upper = q3 + k * iqr;
    variances
        .iter()
        .enumerate()
        .filter(|(_, &variance)| variance < lower || variance > upper)
        .map(|(index, _)| index)
        .collect()
}
