use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use sprite_sheet_core::prelude::*;

/// Frame with a per-pixel pattern so any misplaced or blended pixel shows up.
fn patterned(i: usize, w: u32, h: u32) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            // alpha varies too: half-transparent pixels must survive unchanged
            let a = if (x + y) % 2 == 0 { 255 } else { 64 };
            img.put_pixel(x, y, Rgba([i as u8 * 17, x as u8 * 3, y as u8 * 5, a]));
        }
    }
    DynamicImage::ImageRgba8(img)
}

fn frame_set(count: usize, w: u32, h: u32) -> FrameSet {
    let frames = (0..count)
        .map(|i| Frame::new(format!("f{i}"), patterned(i, w, h)))
        .collect();
    FrameSet::new(frames).expect("frames")
}

#[test]
fn every_slot_slices_back_to_its_frame() {
    for (count, cols) in [(1, 1), (4, 4), (7, 3), (9, 2), (12, 5)] {
        let frames = frame_set(count, 12, 9);
        let cfg = PackerConfig::builder().max_columns(cols).build();
        let out = pack_frames(frames.clone(), &cfg).expect("pack");
        for (i, frame) in frames.iter().enumerate() {
            let slice = slice_frame(&out.canvas, out.layout(), i);
            assert_eq!(
                slice.to_rgba8().as_raw(),
                frame.image().to_rgba8().as_raw(),
                "count={count} cols={cols} index={i}"
            );
        }
    }
}

#[test]
fn transparent_pixels_overwrite_without_blending() {
    let mut a = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    a.put_pixel(1, 1, Rgba([9, 9, 9, 0]));
    let frames = FrameSet::new(vec![
        Frame::new("a", DynamicImage::ImageRgba8(a)),
        Frame::new("b", DynamicImage::ImageRgba8(RgbaImage::new(4, 4))),
    ])
    .expect("frames");
    let out = pack_frames(frames, &PackerConfig::default()).expect("pack");
    let rgba = out.canvas.as_rgba8().expect("rgba8 canvas");
    assert_eq!(rgba.get_pixel(1, 1).0, [9, 9, 9, 0]);
    assert_eq!(rgba.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(rgba.get_pixel(5, 1).0, [0, 0, 0, 0]);
}

#[test]
fn canvas_uses_configured_color_mode() {
    let frames = frame_set(3, 5, 5);
    let cases = [
        (ColorMode::L8, image::ColorType::L8),
        (ColorMode::La8, image::ColorType::La8),
        (ColorMode::Rgb8, image::ColorType::Rgb8),
        (ColorMode::Rgba8, image::ColorType::Rgba8),
        (ColorMode::Rgba16, image::ColorType::Rgba16),
        (ColorMode::Rgb32F, image::ColorType::Rgb32F),
    ];
    for (mode, expected) in cases {
        let cfg = PackerConfig::builder().color_mode(mode).build();
        let out = pack_frames(frames.clone(), &cfg).expect("pack");
        assert_eq!(out.canvas.color(), expected, "{mode}");
        assert_eq!(out.canvas.dimensions(), (15, 5));
        assert_eq!(out.sheet.meta.color_mode, mode);
    }
}

#[test]
fn rgb_canvas_keeps_frame_colors() {
    let frames = frame_set(2, 3, 3);
    let cfg = PackerConfig::builder().color_mode(ColorMode::Rgb8).build();
    let out = pack_frames(frames.clone(), &cfg).expect("pack");
    let rgb = out.canvas.as_rgb8().expect("rgb8 canvas");
    let src = frames.frames()[1].image().to_rgb8();
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(rgb.get_pixel(3 + x, y), src.get_pixel(x, y));
        }
    }
}
