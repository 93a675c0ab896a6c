//! Segmentation overlay compositing.
//!
//! A label buffer from a segmentation model becomes a binary alpha mask,
//! the mask cuts the primary segment out of the source image, a style
//! effect is applied to what remains, and the result is scaled to fit a
//! presentation viewport.

pub mod capture;
pub mod compose;
pub mod effects;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod scale;
pub mod segmentation;

pub use compose::composite;
pub use effects::{apply_style, StyleKind};
pub use error::{OverlayError, Result};
pub use pipeline::{
    FrameGate, PipelineConfig, PresentationMode, RenderRequest, RenderResult,
    SegmentationOverlayPipeline, SubmitOutcome,
};
pub use scale::{FitPolicy, Viewport};
pub use segmentation::{AlphaMask, LabelBuffer, LabelMap, MaskBuilder};

/// RGBA, 8 bits per channel, straight alpha.
pub type ColorImage = image::RgbaImage;
