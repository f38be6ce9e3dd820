//! Core library for assembling rendered animation frames into a sprite sheet.
//!
//! - Loader: decodes the selected frame files and checks they share one tile size
//! - Layout: row-major grid from frame count and a maximum-columns constraint
//! - Compositing: writes every frame into its grid slot (direct overwrite, no blending)
//! - Pipeline: `pack_sheet` runs the three in order and returns the canvas + metadata
//!
//! Quick example:
//! ```ignore
//! use sprite_sheet_core::{PackerConfig, pack_sheet, save_canvas};
//! # fn main() -> anyhow::Result<()> {
//! let paths = vec!["render/0001.png", "render/0002.png", "render/0003.png"];
//! let cfg = PackerConfig { max_columns: 8, ..Default::default() };
//! let out = pack_sheet(&paths, cfg)?;
//! println!("sheet: {}x{}", out.layout().canvas_width, out.layout().canvas_height);
//! save_canvas(&out.canvas, "walk.png".as_ref(), None)?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod sequence;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use loader::*;
pub use model::*;
pub use pipeline::*;
pub use sequence::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_sheet_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{ColorMode, FrameSelection, PackerConfig, PackerConfigBuilder};
    pub use crate::error::SpriteSheetError;
    pub use crate::model::{
        Frame, FrameSet, GridLayout, Meta, Rect, Sheet, SheetFrame, SheetStats, TileSize,
    };
    pub use crate::{
        PackOutput, SheetPacker, composite, load_frames, load_frames_with, pack_frames,
        pack_sheet, plan_grid, plan_sheet, save_canvas, slice_frame,
    };
}
