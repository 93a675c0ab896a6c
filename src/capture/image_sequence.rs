use super::FrameSource;
use crate::error::Result;
use crate::ColorImage;
use std::path::{Path, PathBuf};

/// Decodes image files in order, one frame per file.
///
/// With `looping` set the sequence restarts after the last file and
/// behaves like a live feed.
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    looping: bool,
}

impl ImageSequence {
    pub fn new<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>, looping: bool) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
        tracing::info!(
            "Image sequence of {} file(s){}",
            paths.len(),
            if looping { ", looping" } else { "" }
        );

        Self {
            paths,
            next: 0,
            looping,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<ColorImage>> {
        if self.next >= self.paths.len() {
            if !self.looping || self.paths.is_empty() {
                return Ok(None);
            }
            self.next = 0;
        }

        let path = &self.paths[self.next];
        self.next += 1;

        let _span = tracing::debug_span!("decode_frame").entered();
        let frame = image::open(path)?.to_rgba8();
        tracing::debug!("Decoded {} ({}x{})", path.display(), frame.width(), frame.height());

        Ok(Some(frame))
    }

    fn is_live(&self) -> bool {
        self.looping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn yields_each_file_then_stops_or_loops() {
        let dir = std::env::temp_dir().join(format!("overlay-fx-seq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.png");
        let b = dir.join("b.png");
        ColorImage::from_pixel(2, 1, Rgba([1, 2, 3, 255])).save(&a).unwrap();
        ColorImage::from_pixel(1, 3, Rgba([4, 5, 6, 255])).save(&b).unwrap();

        let mut once = ImageSequence::new([&a, &b], false);
        assert_eq!(once.next_frame().unwrap().unwrap().dimensions(), (2, 1));
        assert_eq!(once.next_frame().unwrap().unwrap().dimensions(), (1, 3));
        assert!(once.next_frame().unwrap().is_none());

        let mut looped = ImageSequence::new([&a, &b], true);
        assert!(looped.is_live());
        for _ in 0..2 {
            looped.next_frame().unwrap().unwrap();
        }
        assert_eq!(looped.next_frame().unwrap().unwrap().dimensions(), (2, 1));

        assert!(ImageSequence::new(Vec::<PathBuf>::new(), true).next_frame().unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }
}
