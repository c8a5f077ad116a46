//! Pure raster operations on RGBA images.

use image::{imageops, GrayImage, Luma, RgbaImage};

/// Centered square extent `(left, top, size)` with `size = min(width, height)`.
pub fn square_extent(width: u32, height: u32) -> (u32, u32, u32) {
    let size = width.min(height);
    ((width - size) / 2, (height - size) / 2, size)
}

/// Crops the centered `size × size` region, keeping alpha.
pub fn crop_square(img: &RgbaImage) -> RgbaImage {
    let (left, top, size) = square_extent(img.width(), img.height());
    imageops::crop_imm(img, left, top, size, size).to_image()
}

/// Single-channel `size × size` mask: 255 where the pixel center lies inside
/// the inscribed circle, 0 elsewhere.
pub fn circle_mask(size: u32) -> GrayImage {
    let r = size as f64 / 2.0;
    let r2 = r * r;
    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f64 + 0.5 - r;
        let dy = y as f64 + 0.5 - r;
        if dx * dx + dy * dy <= r2 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Crops to the centered square, then replaces alpha with [`circle_mask`].
pub fn apply_circle_mask(img: &RgbaImage) -> RgbaImage {
    let mut square = crop_square(img);
    let mask = circle_mask(square.width());
    for (px, m) in square.pixels_mut().zip(mask.pixels()) {
        px[3] = m[0];
    }
    square
}
