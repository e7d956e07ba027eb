use thiserror::Error;

/// Errors raised at pipeline construction or per-call validation.
///
/// Construction-time configuration errors are the only hard failures;
/// everything the stream can hit at runtime degrades to a sentinel value
/// instead of an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sampling rate must be greater than zero")]
    InvalidSampleRate,
    #[error("band ({lo} Hz, {hi} Hz) must satisfy 0 <= lo < hi <= {nyquist} Hz")]
    InvalidBand { lo: f32, hi: f32, nyquist: f32 },
    #[error("filter cutoff {cutoff} Hz must lie inside (0, {nyquist}) Hz")]
    CutoffOutOfRange { cutoff: f32, nyquist: f32 },
    #[error("window of {0} s holds less than one sample")]
    WindowTooShort(f32),
    #[error("window overlap {0} must be in [0, 1)")]
    InvalidOverlap(f32),
    #[error("EMA time constant must be greater than zero")]
    InvalidTimeConstant,
    #[error("on threshold {on} must not be below off threshold {off}")]
    ThresholdOrder { on: f32, off: f32 },
    #[error("pipeline needs at least one channel")]
    NoChannels,
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("unknown baseline phase {0:?}; expected \"eyes_closed\" or \"eyes_open\"")]
    InvalidPhase(String),
}
