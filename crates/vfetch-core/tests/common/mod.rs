pub mod image_server;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Encodes a `w × h` gradient in `format` (JPEG drops alpha).
pub fn encoded_image(w: u32, h: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 128, 255]));
    let dynimg = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut buf = Vec::new();
    dynimg.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}
