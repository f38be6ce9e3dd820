use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::config::{ColorMode, FrameSelection};
use crate::error::{Result, SpriteSheetError};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        if self.w == 0 || self.h == 0 || r.w == 0 || r.h == 0 {
            return false;
        }
        self.x <= r.right() && r.x <= self.right() && self.y <= r.bottom() && r.y <= self.bottom()
    }
}

/// Shared pixel size of every frame in one pack run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One decoded animation frame and the path it came from.
///
/// Frames are never mutated once loaded; the compositor only reads them.
#[derive(Debug, Clone)]
pub struct Frame {
    path: PathBuf,
    image: DynamicImage,
}

impl Frame {
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn size(&self) -> TileSize {
        TileSize::of(&self.image)
    }

    /// Forward-slash key used in exported metadata.
    pub fn key(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// Ordered, non-empty frames that all share one [`TileSize`].
///
/// Index order is animation order and sheet slot order.
#[derive(Debug, Clone)]
pub struct FrameSet {
    tile: TileSize,
    frames: Vec<Frame>,
}

impl FrameSet {
    /// Builds a set from already decoded frames, checking the uniform-size invariant.
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(SpriteSheetError::InvalidInput("no files".into()));
        };
        let tile = first.size();
        if let Some(bad) = frames.iter().find(|f| f.size() != tile) {
            return Err(SpriteSheetError::SizeMismatch {
                path: bad.path.clone(),
                expected: tile,
                actual: bad.size(),
            });
        }
        Ok(Self { tile, frames })
    }

    /// Caller guarantees `frames` is non-empty and every frame is `tile` sized.
    pub(crate) fn from_validated(tile: TileSize, frames: Vec<Frame>) -> Self {
        debug_assert!(!frames.is_empty());
        debug_assert!(frames.iter().all(|f| f.size() == tile));
        Self { tile, frames }
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a FrameSet {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Grid geometry of a sheet, derived from tile size, frame count and max columns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridLayout {
    pub tile: TileSize,
    pub frame_count: usize,
    pub columns: u32,
    pub rows: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl GridLayout {
    /// Top-left pixel offset of slot `index` (row-major).
    ///
    /// `index` must be below `columns * rows`.
    pub fn placement(&self, index: usize) -> (u32, u32) {
        let columns = self.columns as usize;
        let col = (index % columns) as u32;
        let row = (index / columns) as u32;
        (col * self.tile.width, row * self.tile.height)
    }

    /// Full box of slot `index`.
    pub fn slot(&self, index: usize) -> Rect {
        let (left, top) = self.placement(index);
        Rect::new(left, top, self.tile.width, self.tile.height)
    }

    /// Number of grid cells, filled or not.
    pub fn slots(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0, 0, self.canvas_width, self.canvas_height)
    }
}

/// A frame as placed on the sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetFrame {
    pub index: usize,
    pub key: String,
    pub frame: Rect,
    pub source_size: (u32, u32),
}

/// Sheet-level metadata (common fields used by exporters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub app: String,
    pub version: String,
    pub color_mode: ColorMode,
    pub max_columns: u32,
    pub step: usize,
    pub selection: FrameSelection,
}

/// Logical record of one packed sheet: grid plus where every frame went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub layout: GridLayout,
    pub frames: Vec<SheetFrame>,
    pub meta: Meta,
}

/// Fill statistics of a sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetStats {
    pub frames: usize,
    pub slots: usize,
    pub empty_slots: usize,
    pub canvas_area: u64,
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl Sheet {
    pub fn stats(&self) -> SheetStats {
        let layout = &self.layout;
        let slots = layout.slots();
        let canvas_area = layout.canvas_width as u64 * layout.canvas_height as u64;
        let used_area: u64 = self
            .frames
            .iter()
            .map(|f| f.frame.w as u64 * f.frame.h as u64)
            .sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        SheetStats {
            frames: self.frames.len(),
            slots,
            empty_slots: slots.saturating_sub(self.frames.len()),
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

impl SheetStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Frames: {}, Slots: {} ({} empty), Occupancy: {:.2}%, Canvas Area: {} px², Used Area: {} px²",
            self.frames,
            self.slots,
            self.empty_slots,
            self.occupancy * 100.0,
            self.canvas_area,
            self.used_area,
        )
    }
}
