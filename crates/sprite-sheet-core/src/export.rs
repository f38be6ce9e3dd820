use std::path::Path;

use image::{DynamicImage, ImageFormat};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, SpriteSheetError};
use crate::model::{Sheet, SheetFrame};

fn frame_value(fr: &SheetFrame) -> Value {
    let (w, h) = fr.source_size;
    json!({
        "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
        "rotated": false,
        "trimmed": false,
        "spriteSourceSize": {"x": 0, "y": 0, "w": w, "h": h},
        "sourceSize": {"w": w, "h": h},
    })
}

/// Serialize the sheet as `{ frames: [...], layout, meta }`, frames in slot order.
pub fn to_json_array(sheet: &Sheet) -> Value {
    let frames: Vec<Value> = sheet
        .frames
        .iter()
        .map(|fr| {
            let mut v = frame_value(fr);
            v["index"] = json!(fr.index);
            v["key"] = json!(fr.key);
            v
        })
        .collect();
    json!({"frames": frames, "layout": &sheet.layout, "meta": &sheet.meta})
}

/// Frames keyed by name, TexturePacker-like JSON hash.
/// Shape: `{ frames: { key: { frame, rotated, trimmed, spriteSourceSize, sourceSize } }, meta }`.
pub fn to_json_hash(sheet: &Sheet) -> Value {
    let mut frames = serde_json::Map::new();
    for fr in &sheet.frames {
        frames.insert(fr.key.clone(), frame_value(fr));
    }
    let layout = &sheet.layout;
    json!({
        "frames": frames,
        "meta": {
            "app": sheet.meta.app,
            "version": sheet.meta.version,
            "format": sheet.meta.color_mode,
            "size": {"w": layout.canvas_width, "h": layout.canvas_height},
            "grid": {"columns": layout.columns, "rows": layout.rows},
            "scale": "1",
        },
    })
}

/// Encode `canvas` to `path`. With `format == None` the format comes from the file extension.
pub fn save_canvas(canvas: &DynamicImage, path: &Path, format: Option<ImageFormat>) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => ImageFormat::from_path(path)?,
    };
    if !format.can_write() {
        return Err(SpriteSheetError::InvalidInput(format!(
            "image format {format:?} cannot be written"
        )));
    }
    debug!(path = %path.display(), ?format, "encoding sheet");
    canvas.save_with_format(path, format)?;
    Ok(())
}
