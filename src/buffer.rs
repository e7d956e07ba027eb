use std::collections::VecDeque;

/// Capacity to window-length ratio; four windows of history absorb bursty
/// producers without unbounded growth.
const CAPACITY_WINDOWS: usize = 4;

/// Bounded FIFO over the filtered sample stream. Oldest samples are evicted
/// silently once capacity is exceeded; eviction is by age, never by value.
pub struct SlidingBuffer {
    data: VecDeque<f32>,
    window_len: usize,
    capacity: usize,
}

impl SlidingBuffer {
    pub fn new(window_len: usize) -> Self {
        let capacity = window_len * CAPACITY_WINDOWS;
        Self {
            data: VecDeque::with_capacity(capacity),
            window_len,
            capacity,
        }
    }

    pub fn append(&mut self, values: &[f32]) {
        for &value in values {
            if self.data.len() == self.capacity {
                self.data.pop_front();
            }
            self.data.push_back(value);
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_window_ready(&self) -> bool {
        self.data.len() >= self.window_len
    }

    /// The most recent `window_len` samples, oldest first.
    pub fn latest_window(&self) -> Option<Vec<f32>> {
        if !self.is_window_ready() {
            return None;
        }
        Some(
            self.data
                .iter()
                .rev()
                .take(self.window_len)
                .rev()
                .copied()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_unavailable_until_filled() {
        let mut buffer = SlidingBuffer::new(4);
        buffer.append(&[1.0, 2.0, 3.0]);
        assert!(!buffer.is_window_ready());
        assert!(buffer.latest_window().is_none());
        buffer.append(&[4.0]);
        assert_eq!(buffer.latest_window().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn eviction_is_fifo_and_capacity_bounded() {
        let mut buffer = SlidingBuffer::new(2);
        buffer.append(&[0.0, 1.0, 2.0, 3.0]);
        // capacity 8: still growing
        buffer.append(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.latest_window().unwrap(), vec![8.0, 9.0]);
    }
}
