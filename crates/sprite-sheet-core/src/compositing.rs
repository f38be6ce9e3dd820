use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::trace;

use crate::config::ColorMode;
use crate::model::{FrameSet, GridLayout};

/// Copy all of `src` into `canvas` with its top-left at (dx, dy).
///
/// Direct overwrite: destination pixels (alpha included) are replaced, never blended.
/// Rows or columns falling outside `canvas` are clipped.
pub fn blit<P: Pixel>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    canvas: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    dx: u32,
    dy: u32,
) {
    let channels = P::CHANNEL_COUNT as usize;
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();
    let w = sw.min(cw.saturating_sub(dx)) as usize;
    let h = sh.min(ch.saturating_sub(dy));
    if w == 0 || h == 0 {
        return;
    }

    let src_stride = sw as usize * channels;
    let dst_stride = cw as usize * channels;
    let row_len = w * channels;
    let src_raw = src.as_raw();
    let dst_raw: &mut [P::Subpixel] = canvas;
    for yy in 0..h as usize {
        let s = yy * src_stride;
        let d = (dy as usize + yy) * dst_stride + dx as usize * channels;
        dst_raw[d..d + row_len].copy_from_slice(&src_raw[s..s + row_len]);
    }
}

/// Composite every frame of `frames` into a new zeroed canvas laid out by `layout`.
///
/// Frames are converted to `mode` first. Cells past the last frame stay transparent black.
pub fn composite(frames: &FrameSet, layout: &GridLayout, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::L8 => DynamicImage::ImageLuma8(composite_as(frames, layout, |i| i.to_luma8())),
        ColorMode::La8 => {
            DynamicImage::ImageLumaA8(composite_as(frames, layout, |i| i.to_luma_alpha8()))
        }
        ColorMode::Rgb8 => DynamicImage::ImageRgb8(composite_as(frames, layout, |i| i.to_rgb8())),
        ColorMode::Rgba8 => {
            DynamicImage::ImageRgba8(composite_as(frames, layout, |i| i.to_rgba8()))
        }
        ColorMode::L16 => {
            DynamicImage::ImageLuma16(composite_as(frames, layout, |i| i.to_luma16()))
        }
        ColorMode::La16 => {
            DynamicImage::ImageLumaA16(composite_as(frames, layout, |i| i.to_luma_alpha16()))
        }
        ColorMode::Rgb16 => {
            DynamicImage::ImageRgb16(composite_as(frames, layout, |i| i.to_rgb16()))
        }
        ColorMode::Rgba16 => {
            DynamicImage::ImageRgba16(composite_as(frames, layout, |i| i.to_rgba16()))
        }
        ColorMode::Rgb32F => {
            DynamicImage::ImageRgb32F(composite_as(frames, layout, |i| i.to_rgb32f()))
        }
        ColorMode::Rgba32F => {
            DynamicImage::ImageRgba32F(composite_as(frames, layout, |i| i.to_rgba32f()))
        }
    }
}

fn composite_as<P, F>(
    frames: &FrameSet,
    layout: &GridLayout,
    convert: F,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
    F: Fn(&DynamicImage) -> ImageBuffer<P, Vec<P::Subpixel>>,
{
    let mut canvas = ImageBuffer::new(layout.canvas_width, layout.canvas_height);
    for (i, frame) in frames.iter().enumerate() {
        let (left, top) = layout.placement(i);
        trace!(index = i, left, top, "blit frame");
        blit(&convert(frame.image()), &mut canvas, left, top);
    }
    canvas
}

/// Cut slot `index` back out of a composited canvas.
pub fn slice_frame(canvas: &DynamicImage, layout: &GridLayout, index: usize) -> DynamicImage {
    let r = layout.slot(index);
    canvas.crop_imm(r.x, r.y, r.w, r.h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn blit_overwrites_alpha_instead_of_blending() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let src = RgbaImage::from_pixel(2, 2, Rgba([200, 0, 0, 0]));
        blit(&src, &mut canvas, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1).0, [200, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(2, 2).0, [200, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(canvas.get_pixel(3, 3).0, [10, 20, 30, 255]);
    }

    #[test]
    fn blit_clips_at_canvas_edge() {
        let mut canvas = RgbaImage::new(3, 3);
        let src = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        blit(&src, &mut canvas, 2, 2);
        assert_eq!(canvas.get_pixel(2, 2).0, [1, 2, 3, 4]);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 0]);
        // fully outside: no-op
        blit(&src, &mut canvas, 5, 0);
    }
}
