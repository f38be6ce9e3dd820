use tracing::trace;

use crate::error::{Result, SpriteSheetError};
use crate::model::{GridLayout, TileSize};

/// Plans a row-major grid for `frame_count` tiles of `tile` size.
///
/// - more frames than `max_columns`: `max_columns` columns, `ceil(frame_count / max_columns)` rows
/// - otherwise a single row holding every frame
pub fn plan_grid(tile: TileSize, frame_count: usize, max_columns: u32) -> Result<GridLayout> {
    if frame_count == 0 {
        return Err(SpriteSheetError::Layout("frame count must be at least 1".into()));
    }
    if max_columns == 0 {
        return Err(SpriteSheetError::Layout("max columns must be at least 1".into()));
    }

    let (columns, rows) = if frame_count > max_columns as usize {
        (max_columns, frame_count.div_ceil(max_columns as usize))
    } else {
        // frame_count <= max_columns, so it fits in u32
        (frame_count as u32, 1)
    };
    let rows = u32::try_from(rows)
        .map_err(|_| SpriteSheetError::Layout(format!("too many rows: {rows}")))?;

    let canvas_width = tile.width.checked_mul(columns).ok_or_else(|| {
        SpriteSheetError::Layout(format!(
            "canvas width overflows: {} x {columns} columns",
            tile.width
        ))
    })?;
    let canvas_height = tile.height.checked_mul(rows).ok_or_else(|| {
        SpriteSheetError::Layout(format!(
            "canvas height overflows: {} x {rows} rows",
            tile.height
        ))
    })?;

    trace!(columns, rows, canvas_width, canvas_height, "planned grid");
    Ok(GridLayout {
        tile,
        frame_count,
        columns,
        rows,
        canvas_width,
        canvas_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_when_frames_fit() {
        let g = plan_grid(TileSize::new(64, 64), 5, 10).expect("plan");
        assert_eq!((g.columns, g.rows), (5, 1));
        assert_eq!((g.canvas_width, g.canvas_height), (320, 64));
        assert_eq!(g.placement(3), (192, 0));
    }

    #[test]
    fn wraps_into_rows() {
        let g = plan_grid(TileSize::new(64, 64), 5, 2).expect("plan");
        assert_eq!((g.columns, g.rows), (2, 3));
        assert_eq!((g.canvas_width, g.canvas_height), (128, 192));
        assert_eq!(g.placement(4), (0, 128));
        assert_eq!(g.slots(), 6);
    }

    #[test]
    fn exact_fill_uses_one_row() {
        let g = plan_grid(TileSize::new(16, 8), 8, 8).expect("plan");
        assert_eq!((g.columns, g.rows), (8, 1));
        assert_eq!((g.canvas_width, g.canvas_height), (128, 8));
    }

    #[test]
    fn single_frame() {
        let g = plan_grid(TileSize::new(32, 32), 1, 8).expect("plan");
        assert_eq!((g.canvas_width, g.canvas_height), (32, 32));
        assert_eq!(g.placement(0), (0, 0));
    }

    #[test]
    fn rejects_zero_inputs() {
        assert!(matches!(
            plan_grid(TileSize::new(8, 8), 0, 4),
            Err(SpriteSheetError::Layout(_))
        ));
        assert!(matches!(
            plan_grid(TileSize::new(8, 8), 4, 0),
            Err(SpriteSheetError::Layout(_))
        ));
    }

    #[test]
    fn rejects_overflowing_canvas() {
        let r = plan_grid(TileSize::new(u32::MAX / 2, 1), 3, 10);
        assert!(matches!(r, Err(SpriteSheetError::Layout(_))));
    }
}
