use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, instrument};

use crate::compositing::composite;
use crate::config::PackerConfig;
use crate::error::{Result, SpriteSheetError};
use crate::layout::plan_grid;
use crate::loader::load_frames_with;
use crate::model::{FrameSet, GridLayout, Meta, Sheet, SheetFrame, TileSize};

/// Output of a packing run: sheet metadata and the composited canvas.
#[derive(Debug, Clone)]
pub struct PackOutput {
    pub sheet: Sheet,
    pub canvas: DynamicImage,
}

impl PackOutput {
    pub fn layout(&self) -> &GridLayout {
        &self.sheet.layout
    }

    /// Hands the canvas over to the caller (e.g. for encoding).
    pub fn into_canvas(self) -> DynamicImage {
        self.canvas
    }

    /// Computes fill statistics for this output.
    /// This is a convenience method that delegates to `sheet.stats()`.
    pub fn stats(&self) -> crate::model::SheetStats {
        self.sheet.stats()
    }
}

/// A validated pack request: input paths plus configuration, checked once up front.
#[derive(Debug, Clone)]
pub struct SheetPacker {
    paths: Vec<PathBuf>,
    cfg: PackerConfig,
}

impl SheetPacker {
    /// Fails fast on an empty path list, a zero step or zero columns, before anything is decoded.
    pub fn new<P: AsRef<Path>>(paths: &[P], cfg: PackerConfig) -> Result<Self> {
        if paths.is_empty() {
            return Err(SpriteSheetError::InvalidInput("no files".into()));
        }
        cfg.validate()?;
        Ok(Self {
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            cfg,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn config(&self) -> &PackerConfig {
        &self.cfg
    }

    #[instrument(skip_all, fields(paths = self.paths.len()))]
    /// Load, plan and composite. Any failure aborts the whole run.
    pub fn pack(self) -> Result<PackOutput> {
        let frames = load_frames_with(&self.paths, &self.cfg)?;
        pack_frames(frames, &self.cfg)
    }
}

/// Packs the frames at `paths` into one sheet.
pub fn pack_sheet<P: AsRef<Path>>(paths: &[P], cfg: PackerConfig) -> Result<PackOutput> {
    SheetPacker::new(paths, cfg)?.pack()
}

#[instrument(skip_all, fields(frames = frames.len()))]
/// Packs frames that are already decoded. Frame order is slot order.
pub fn pack_frames(frames: FrameSet, cfg: &PackerConfig) -> Result<PackOutput> {
    cfg.validate()?;
    let layout = plan_grid(frames.tile_size(), frames.len(), cfg.max_columns)?;
    debug!(
        columns = layout.columns,
        rows = layout.rows,
        width = layout.canvas_width,
        height = layout.canvas_height,
        "grid planned"
    );
    let canvas = composite(&frames, &layout, cfg.color_mode);
    let entries = frames
        .iter()
        .enumerate()
        .map(|(index, f)| SheetFrame {
            index,
            key: f.key(),
            frame: layout.slot(index),
            source_size: (f.size().width, f.size().height),
        })
        .collect();
    Ok(PackOutput {
        sheet: build_sheet(layout, entries, cfg),
        canvas,
    })
}

/// Layout-only: metadata for `frame_count` frames of `tile` size, no pixels.
///
/// Frame keys are the slot indices.
pub fn plan_sheet(tile: TileSize, frame_count: usize, cfg: &PackerConfig) -> Result<Sheet> {
    cfg.validate()?;
    let layout = plan_grid(tile, frame_count, cfg.max_columns)?;
    let entries = (0..frame_count)
        .map(|index| SheetFrame {
            index,
            key: index.to_string(),
            frame: layout.slot(index),
            source_size: (tile.width, tile.height),
        })
        .collect();
    Ok(build_sheet(layout, entries, cfg))
}

fn build_sheet(layout: GridLayout, frames: Vec<SheetFrame>, cfg: &PackerConfig) -> Sheet {
    Sheet {
        layout,
        frames,
        meta: Meta {
            app: "sprite-sheet".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            color_mode: cfg.color_mode,
            max_columns: cfg.max_columns,
            step: cfg.step,
            selection: cfg.selection,
        },
    }
}
