mod gate;

pub use gate::{FrameGate, SubmitOutcome};

use crate::compose::composite;
use crate::effects::{validate_radius, StyleKind};
use crate::error::Result;
use crate::scale::{scale, FitPolicy, Viewport};
use crate::segmentation::{LabelBuffer, MaskBuilder};
use crate::ColorImage;
use image::imageops::{self, FilterType};
use std::sync::Arc;

/// How the caller presents rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    /// A single still image
    Image,
    /// Frames decoded from a recorded video
    Video,
    /// Continuous camera capture shown in a fill layout
    LiveStream,
}

impl PresentationMode {
    pub fn fit_policy(self) -> FitPolicy {
        match self {
            Self::Image | Self::Video => FitPolicy::Contain,
            Self::LiveStream => FitPolicy::Cover,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Resize the source to the label dimensions (nearest neighbour)
    /// before compositing, instead of skipping mismatched frames.
    pub resample_source: bool,
}

impl PipelineConfig {
    pub fn with_resample_source(mut self, resample_source: bool) -> Self {
        self.resample_source = resample_source;
        self
    }
}

/// Final image for the presentation surface.
///
/// Image and dimensions always come from the same render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub image: ColorImage,
    pub width: u32,
    pub height: u32,
    /// Number of the render call that produced this result, starting at 1
    pub sequence: u64,
}

/// Owned inputs for one render, for callers that hand frames across threads
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub source: Option<ColorImage>,
    pub labels: Vec<u8>,
    pub label_width: u32,
    pub label_height: u32,
    pub viewport: Viewport,
    pub mode: PresentationMode,
    pub style: StyleKind,
}

impl RenderRequest {
    /// Check the parameters `render` would reject, without rendering
    ///
    /// Requests without a source pass; they render nothing.
    pub fn validate(&self) -> Result<()> {
        if self.source.is_none() {
            return Ok(());
        }
        LabelBuffer::new(&self.labels, self.label_width, self.label_height)?;
        validate_style(self.style)
    }
}

fn validate_style(style: StyleKind) -> Result<()> {
    if let StyleKind::Blur(radius) = style {
        validate_radius(radius)?;
    }
    Ok(())
}

/// Mask -> composite -> style -> scale, keeping the last rendered result
pub struct SegmentationOverlayPipeline {
    config: PipelineConfig,
    current: Option<Arc<RenderResult>>,
    renders: u64,
}

impl SegmentationOverlayPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            current: None,
            renders: 0,
        }
    }

    /// Render one frame
    ///
    /// # Arguments
    /// * `source` - Frame to composite; `None` before the first frame arrives
    /// * `labels` - Segmentation labels, row-major, `label_width * label_height` values
    /// * `viewport` - Destination surface the result is fitted to
    /// * `mode` - Presentation mode, selecting contain or cover fitting
    /// * `style` - Effect applied to the region outside the primary segment
    ///
    /// # Returns
    /// * `Some(result)` - the new current result
    /// * `None` - nothing to show: `source` is absent, or source and labels
    ///   disagree in size. The previous result stays current.
    ///
    /// # Errors
    /// * [`OverlayError::InvalidBufferLength`](crate::OverlayError::InvalidBufferLength)
    ///   when `labels` does not match the declared size
    /// * [`OverlayError::InvalidRadius`](crate::OverlayError::InvalidRadius)
    ///   for a blur radius outside [1.0, 25.0]
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        source: Option<&ColorImage>,
        labels: &[u8],
        label_width: u32,
        label_height: u32,
        viewport: Viewport,
        mode: PresentationMode,
        style: StyleKind,
    ) -> Result<Option<Arc<RenderResult>>> {
        let Some(source) = source else {
            tracing::debug!("No source frame yet, skipping render");
            return Ok(None);
        };

        let _span = tracing::debug_span!("render", ?mode, %style).entered();

        let labels = LabelBuffer::new(labels, label_width, label_height)?;
        validate_style(style)?;
        let mask = MaskBuilder::build_from(labels);

        let resampled;
        let source = if self.config.resample_source && source.dimensions() != labels.dimensions() {
            resampled = imageops::resize(source, label_width, label_height, FilterType::Nearest);
            &resampled
        } else {
            source
        };

        let Some(styled) = composite(source, &mask, style)? else {
            return Ok(None);
        };

        let image = scale(&styled, viewport, mode.fit_policy());
        self.renders += 1;
        let (width, height) = image.dimensions();
        let result = Arc::new(RenderResult {
            image,
            width,
            height,
            sequence: self.renders,
        });

        self.current = Some(Arc::clone(&result));
        Ok(Some(result))
    }

    pub fn render_request(&mut self, request: &RenderRequest) -> Result<Option<Arc<RenderResult>>> {
        self.render(
            request.source.as_ref(),
            &request.labels,
            request.label_width,
            request.label_height,
            request.viewport,
            request.mode,
            request.style,
        )
    }

    /// Last successful result
    pub fn current(&self) -> Option<Arc<RenderResult>> {
        self.current.clone()
    }

    /// Drop the stored result, leaving the presentation surface empty
    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl Default for SegmentationOverlayPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
