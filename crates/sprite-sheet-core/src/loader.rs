//! Frame loading: path selection, decoding and the uniform-size check.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tracing::{debug, instrument, trace};

use crate::config::{FrameSelection, PackerConfig};
use crate::error::{Result, SpriteSheetError};
use crate::model::{Frame, FrameSet, TileSize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Indices of the paths that make it onto the sheet, in order.
///
/// Caller guarantees `len > 0` and `step > 0`.
pub fn select_paths(len: usize, step: usize, selection: FrameSelection) -> Vec<usize> {
    match selection {
        FrameSelection::Compat => std::iter::once(0)
            .chain((step..len).step_by(step))
            .collect(),
        FrameSelection::Stride => (0..len).step_by(step).collect(),
    }
}

/// Loads frames with the default selection policy, decoding sequentially.
pub fn load_frames<P: AsRef<Path>>(paths: &[P], step: usize) -> Result<FrameSet> {
    let cfg = PackerConfig {
        step,
        ..Default::default()
    };
    load_frames_with(paths, &cfg)
}

#[instrument(skip_all, fields(paths = paths.len(), step = cfg.step))]
/// Loads the selected frames of `paths` and checks they all share the first frame's size.
///
/// Fails on the first decode error or size mismatch in path order; no partial set is returned.
pub fn load_frames_with<P: AsRef<Path>>(paths: &[P], cfg: &PackerConfig) -> Result<FrameSet> {
    if paths.is_empty() {
        return Err(SpriteSheetError::InvalidInput("no files".into()));
    }
    if cfg.step == 0 {
        return Err(SpriteSheetError::InvalidInput("invalid step".into()));
    }

    let selected: Vec<&Path> = select_paths(paths.len(), cfg.step, cfg.selection)
        .into_iter()
        .map(|i| paths[i].as_ref())
        .collect();
    debug!(selected = selected.len(), "selected frame paths");

    let frames = if use_parallel(cfg) {
        load_parallel(&selected)?
    } else {
        load_sequential(&selected)?
    };
    let tile = frames[0].size();
    debug!(%tile, frames = frames.len(), "frames loaded");
    Ok(FrameSet::from_validated(tile, frames))
}

fn use_parallel(cfg: &PackerConfig) -> bool {
    cfg!(feature = "parallel") && cfg.parallel
}

fn load_sequential(paths: &[&Path]) -> Result<Vec<Frame>> {
    let mut frames: Vec<Frame> = Vec::with_capacity(paths.len());
    let mut tile: Option<TileSize> = None;
    for &path in paths {
        let image = decode_frame(path)?;
        let size = TileSize::of(&image);
        match tile {
            None => tile = Some(size),
            Some(expected) => check_size(path, expected, size)?,
        }
        frames.push(Frame::new(path, image));
    }
    Ok(frames)
}

#[cfg(feature = "parallel")]
fn load_parallel(paths: &[&Path]) -> Result<Vec<Frame>> {
    // index-ordered collect keeps slot order; validation below walks that order
    let decoded: Vec<Result<DynamicImage>> = paths.par_iter().map(|p| decode_frame(p)).collect();
    let mut frames: Vec<Frame> = Vec::with_capacity(paths.len());
    let mut tile: Option<TileSize> = None;
    for (&path, image) in paths.iter().zip(decoded) {
        let image = image?;
        let size = TileSize::of(&image);
        match tile {
            None => tile = Some(size),
            Some(expected) => check_size(path, expected, size)?,
        }
        frames.push(Frame::new(path, image));
    }
    Ok(frames)
}

#[cfg(not(feature = "parallel"))]
fn load_parallel(paths: &[&Path]) -> Result<Vec<Frame>> {
    load_sequential(paths)
}

fn check_size(path: &Path, expected: TileSize, actual: TileSize) -> Result<()> {
    if actual != expected {
        return Err(SpriteSheetError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Decodes one frame; the file handle is dropped before returning.
pub fn decode_frame(path: &Path) -> Result<DynamicImage> {
    trace!(path = %path.display(), "decoding frame");
    let decode = || -> std::result::Result<DynamicImage, image::ImageError> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    };
    decode().map_err(|source| SpriteSheetError::Decode {
        path: PathBuf::from(path),
        source,
    })
}
