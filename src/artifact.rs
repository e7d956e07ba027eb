/// Amplitude and slope gate over the representative channel.
///
/// Holds the last timestamped value; with fewer than two timestamped
/// samples no artifact is ever flagged.
pub struct ArtifactGate {
    amp_threshold: f32,
    slope_threshold: f32,
    last: Option<(f64, f32)>,
}

impl ArtifactGate {
    pub fn new(amp_threshold: f32, slope_threshold: f32) -> Self {
        Self {
            amp_threshold,
            slope_threshold,
            last: None,
        }
    }

    /// Check the newest representative value against both thresholds.
    /// Out-of-order timestamps (`dt <= 0`) skip the slope check instead of
    /// failing; the amplitude check still applies.
    pub fn check(&mut self, timestamp: Option<f64>, value: f32) -> bool {
        let mut artifact = false;
        if let (Some(now), Some((previous_ts, previous_value))) = (timestamp, self.last) {
            if value.abs() > self.amp_threshold {
                artifact = true;
            }
            let dt = now - previous_ts;
            if dt > 0.0 {
                let slope = ((value - previous_value) as f64 / dt.max(1e-6)).abs() as f32;
                if slope > self.slope_threshold {
                    artifact = true;
                }
            }
        }
        if let Some(now) = timestamp {
            self.last = Some((now, value));
        }
        artifact
    }
}
