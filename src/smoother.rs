/// Exponential moving average over the band-power stream, one update per
/// processed window.
pub struct Ema {
    decay: f32,
    state: Option<f32>,
}

impl Ema {
    /// Decay derives from the stride between window evaluations, not the raw
    /// sample rate: `exp(-step_samples / (tau_sec * fs))`. Rebuild the
    /// smoother if window or overlap settings change.
    pub fn from_step(step_samples: usize, tau_sec: f32, fs: f32) -> Self {
        let decay = (-(step_samples as f32) / (tau_sec * fs)).exp();
        Self { decay, state: None }
    }

    /// First observation seeds the state; later ones blend with the decay.
    pub fn update(&mut self, value: f32) -> f32 {
        let next = match self.state {
            None => value,
            Some(previous) => self.decay * previous + (1.0 - self.decay) * value,
        };
        self.state = Some(next);
        next
    }

    pub fn value(&self) -> Option<f32> {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn first_update_has_no_transient() {
        let mut ema = Ema::from_step(128, 2.0, 256.0);
        assert_abs_diff_eq!(ema.update(7.5), 7.5);
    }

    #[test]
    fn constant_input_converges_monotonically() {
        let mut ema = Ema::from_step(128, 2.0, 256.0);
        ema.update(0.0);
        let mut previous = 0.0f32;
        for _ in 0..50 {
            let next = ema.update(10.0);
            assert!(next > previous);
            assert!(next <= 10.0);
            previous = next;
        }
        assert!(previous > 9.9);
    }
}
