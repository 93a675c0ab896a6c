use super::types::{LabelMap, LabelSource};
use crate::error::{OverlayError, Result};
use crate::ColorImage;
use std::path::{Path, PathBuf};

/// Label maps precomputed by an external segmentation run.
///
/// Grayscale image files are read as one label per pixel (luma value).
/// Files with a `.bin` or `.raw` extension hold bare label bytes and need
/// the dimensions supplied through [`LabelFiles::with_raw_size`].
/// Successive calls to `segment` walk the list and wrap around at the end.
pub struct LabelFiles {
    paths: Vec<PathBuf>,
    raw_size: Option<(u32, u32)>,
    next: usize,
}

impl LabelFiles {
    pub fn new<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
        tracing::info!("Using {} precomputed label map(s)", paths.len());

        Self {
            paths,
            raw_size: None,
            next: 0,
        }
    }

    pub fn with_raw_size(mut self, width: u32, height: u32) -> Self {
        self.raw_size = Some((width, height));
        self
    }

    /// Load a single label map from disk
    pub fn load(path: &Path, raw_size: Option<(u32, u32)>) -> Result<LabelMap> {
        let _span = tracing::debug_span!("load_labels").entered();

        if is_raw(path) {
            let (width, height) =
                raw_size.ok_or_else(|| OverlayError::MissingLabelSize(path.to_path_buf()))?;
            let data = std::fs::read(path)?;
            return LabelMap::new(data, width, height);
        }

        let luma = image::open(path)?.to_luma8();
        let (width, height) = luma.dimensions();
        LabelMap::new(luma.into_raw(), width, height)
    }
}

fn is_raw(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("bin") | Some("raw")
    )
}

impl LabelSource for LabelFiles {
    fn segment(&mut self, frame: &ColorImage) -> Result<LabelMap> {
        if self.paths.is_empty() {
            return Err(OverlayError::NoLabelMaps);
        }

        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();

        let labels = Self::load(path, self.raw_size)?;
        if (labels.width, labels.height) != frame.dimensions() {
            tracing::debug!(
                "Label map {}x{} differs from frame {}x{}",
                labels.width,
                labels.height,
                frame.width(),
                frame.height()
            );
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("overlay-fx-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_luma_and_raw_label_maps() {
        let dir = scratch_dir("labels");
        let png = dir.join("labels.png");
        GrayImage::from_fn(2, 2, |x, _| Luma([x as u8 * 15])).save(&png).unwrap();
        let raw = dir.join("labels.bin");
        std::fs::write(&raw, [0u8, 1, 2, 3, 4, 5]).unwrap();

        let mut source = LabelFiles::new([&png, &raw]).with_raw_size(3, 2);
        let frame = ColorImage::new(2, 2);

        let first = source.segment(&frame).unwrap();
        assert_eq!(first, LabelMap::new(vec![0, 15, 0, 15], 2, 2).unwrap());

        let second = source.segment(&frame).unwrap();
        assert_eq!((second.width, second.height), (3, 2));
        assert_eq!(second.data, vec![0, 1, 2, 3, 4, 5]);

        // wraps around
        assert_eq!(source.segment(&frame).unwrap(), first);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_label_list_is_a_configuration_error() {
        let mut source = LabelFiles::new(Vec::<PathBuf>::new());
        let err = source.segment(&ColorImage::new(1, 1)).unwrap_err();
        assert!(matches!(err, OverlayError::NoLabelMaps));
    }

    #[test]
    fn raw_file_with_wrong_size_is_rejected() {
        let dir = scratch_dir("raw-size");
        let raw = dir.join("labels.raw");
        std::fs::write(&raw, [0u8; 5]).unwrap();

        let err = LabelFiles::load(&raw, Some((2, 2))).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidBufferLength { .. }));
        assert!(matches!(
            LabelFiles::load(&raw, None),
            Err(OverlayError::MissingLabelSize(p)) if p == raw
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
