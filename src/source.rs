use std::collections::VecDeque;

use crate::error::PipelineError;
use crate::frame::ChannelFrame;

/// Something that can yield raw frames on demand.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<ChannelFrame>, PipelineError>;
}

/// In-memory source for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<ChannelFrame>,
}

impl ManualSource {
    pub fn new(frames: impl IntoIterator<Item = ChannelFrame>) -> Self {
        Self {
            queue: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for ManualSource {
    fn next_frame(&mut self) -> Result<Option<ChannelFrame>, PipelineError> {
        Ok(self.queue.pop_front())
    }
}
