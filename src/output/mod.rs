mod png_sequence;

pub use png_sequence::PngSequence;

use crate::error::Result;
use crate::pipeline::RenderResult;

/// Trait for output destinations
pub trait OutputSink {
    /// Hand a rendered frame to the presentation side
    ///
    /// # Arguments
    /// * `frame` - Complete render result; its image and dimensions come
    ///   from the same render call
    fn write_frame(&mut self, frame: &RenderResult) -> Result<()>;

    /// Number of frames accepted by `write_frame` so far
    fn frames_written(&self) -> u64;
}
