use super::OutputSink;
use crate::error::Result;
use crate::pipeline::RenderResult;
use std::path::{Path, PathBuf};

/// Writes each rendered frame as `frame_NNNNN.png` into a directory
pub struct PngSequence {
    dir: PathBuf,
    written: u64,
}

impl PngSequence {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tracing::info!("Writing frames to {}", dir.display());

        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir, written: 0 })
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }
}

impl OutputSink for PngSequence {
    fn write_frame(&mut self, frame: &RenderResult) -> Result<()> {
        let path = self.frame_path(self.written);
        frame.image.save(&path)?;
        tracing::debug!("Wrote {}x{} frame to {}", frame.width, frame.height, path.display());

        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}
