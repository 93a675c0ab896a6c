mod label_files;
mod mask;
pub mod types;

pub use label_files::LabelFiles;
pub use mask::{label_color, AlphaMask, MaskBuilder, OVERLAY_ALPHA, PALETTE_SIZE};
pub use types::{LabelBuffer, LabelMap, LabelSource};

use std::path::PathBuf;

/// Create the default label source (precomputed label files)
pub fn create_default_source(
    paths: Vec<PathBuf>,
    raw_size: Option<(u32, u32)>,
) -> Box<dyn LabelSource + Send> {
    let source = LabelFiles::new(paths);
    match raw_size {
        Some((width, height)) => Box::new(source.with_raw_size(width, height)),
        None => Box::new(source),
    }
}
