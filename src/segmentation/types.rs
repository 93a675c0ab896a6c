use crate::error::{OverlayError, Result};
use crate::ColorImage;

/// Borrowed per-pixel labels, row-major, `width * height` values.
///
/// The length is checked on construction, so every `LabelBuffer` in
/// circulation matches its declared dimensions.
#[derive(Debug, Clone, Copy)]
pub struct LabelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> LabelBuffer<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(OverlayError::InvalidBufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Owned label map, as handed over by a [`LabelSource`] once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl LabelMap {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        LabelBuffer::new(&data, width, height)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn as_buffer(&self) -> LabelBuffer<'_> {
        LabelBuffer {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Trait for label producers
/// Stands in for the segmentation model, which lives outside this crate.
pub trait LabelSource {
    /// Produce the label map belonging to a frame
    ///
    /// # Arguments
    /// * `frame` - Source frame the labels describe
    ///
    /// # Returns
    /// * One label per pixel, row-major; palette index 0 (`label % 20`)
    ///   marks the primary segment. The map may differ in size from
    ///   `frame`; the pipeline decides what to do with a mismatch.
    fn segment(&mut self, frame: &ColorImage) -> Result<LabelMap>;
}
