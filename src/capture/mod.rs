mod image_sequence;

pub use image_sequence::ImageSequence;

use crate::error::Result;
use crate::ColorImage;

/// Trait for frame sources (camera, decoder, still images)
pub trait FrameSource {
    /// Capture or decode the next frame
    ///
    /// # Returns
    /// * `Some(frame)` - RGBA frame, straight alpha
    /// * `None` - the source is exhausted; live sources never return this
    fn next_frame(&mut self) -> Result<Option<ColorImage>>;

    /// Whether frames keep arriving as a continuous stream
    ///
    /// Live sources are presented with a cover fit and driven through a
    /// frame gate instead of one render per frame.
    fn is_live(&self) -> bool {
        false
    }
}
