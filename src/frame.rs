use ndarray::{Array1, Array2, Axis};

/// One chunk of raw multi-channel samples, shaped `n_samples x n_channels`,
/// with an optional monotonic timestamp for the newest sample.
#[derive(Clone, Debug)]
pub struct ChannelFrame {
    samples: Array2<f32>,
    timestamp: Option<f64>,
}

impl ChannelFrame {
    pub fn new(samples: Array2<f32>, timestamp: Option<f64>) -> Self {
        Self { samples, timestamp }
    }

    /// Convenience constructor for a single-channel chunk.
    pub fn single_channel(values: Vec<f32>, timestamp: Option<f64>) -> Self {
        let samples = Array1::from(values).insert_axis(Axis(1));
        Self { samples, timestamp }
    }

    pub fn num_samples(&self) -> usize {
        self.samples.nrows()
    }

    pub fn num_channels(&self) -> usize {
        self.samples.ncols()
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }

    /// Cross-channel mean of the newest sample, taken on the raw values
    /// before any re-referencing.
    pub fn representative_tail(&self) -> Option<f32> {
        let n = self.samples.nrows();
        if n == 0 {
            return None;
        }
        self.samples.row(n - 1).mean()
    }

    /// Common average reference: subtract the per-sample cross-channel mean.
    /// Only meaningful with at least two channels.
    pub fn centered(&self) -> Array2<f32> {
        let mut out = self.samples.clone();
        for mut row in out.rows_mut() {
            let m = row.mean().unwrap_or(0.0);
            row.mapv_inplace(|v| v - m);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn centering_zeroes_the_cross_channel_mean() {
        let frame = ChannelFrame::new(array![[1.0, 3.0], [2.0, 6.0]], None);
        let centered = frame.centered();
        for row in centered.rows() {
            assert_abs_diff_eq!(row.mean().unwrap(), 0.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(centered[[0, 0]], -1.0);
        assert_abs_diff_eq!(centered[[1, 1]], 2.0);
    }

    #[test]
    fn representative_tail_averages_the_newest_sample() {
        let frame = ChannelFrame::new(array![[0.0, 0.0], [10.0, 30.0]], Some(1.0));
        assert_abs_diff_eq!(frame.representative_tail().unwrap(), 20.0);
    }

    #[test]
    fn single_channel_shape() {
        let frame = ChannelFrame::single_channel(vec![1.0, 2.0, 3.0], None);
        assert_eq!(frame.num_samples(), 3);
        assert_eq!(frame.num_channels(), 1);
    }
}
