//! Real-time alpha-band focus indicator for streamed biosignals.
//!
//! A raw multi-channel chunk enters through [`AlphaPipeline::push`] and runs
//! through notch/high-pass/low-pass filtering, a sliding analysis window,
//! Welch band power with bad-channel screening, EMA smoothing and a
//! hysteretic z-score threshold. Two caller-driven calibration phases (eyes
//! closed, eyes open) provide the baseline the z-score is taken against.
//!
//! Hardware acquisition, network transport and persistence stay outside;
//! the crate exchanges plain records ([`ChannelFrame`] in,
//! [`StepResult`] / [`MetricEvent`] out) with those layers.

pub mod artifact;
pub mod baseline;
pub mod buffer;
pub mod channels;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod frame;
pub mod pipeline;
pub mod recorder;
pub mod smoother;
pub mod source;
pub mod stats;
pub mod welch;

pub use baseline::{BaselineCalibrator, BaselinePhase, BaselineStats, CalibrationStatus};
pub use config::AlphaConfig;
pub use error::PipelineError;
pub use events::MetricEvent;
pub use frame::ChannelFrame;
pub use pipeline::{AlphaPipeline, FocusState, PercentileRefs, StepResult};
pub use recorder::SampleRecorder;
pub use source::{FrameSource, ManualSource};
