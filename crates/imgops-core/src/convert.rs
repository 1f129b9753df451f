//! Conversion between RGB images and float luminance buffers.
//!
//! Ingest averages the three channels with equal weights, which is not
//! gamma-aware and not the perceptual luminance formula. Display rescales
//! the observed value range onto `0..=255` and replicates it into every
//! channel.

use image::{Rgb, RgbImage};

use crate::buffer::{Buffer2d, max_value, min_value};
use crate::error::Error;

/// Decode raw image bytes into a luminance buffer.
///
/// Supports whatever formats the `image` crate was built with (PNG,
/// JPEG, BMP and WebP in this workspace). Alpha is discarded.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] if `bytes` is empty.
/// Returns [`Error::ImageDecode`] if the format is unrecognized or the
/// data is corrupt.
#[must_use = "returns the decoded luminance buffer"]
pub fn decode_luminance(bytes: &[u8]) -> Result<Buffer2d<f32>, Error> {
    if bytes.is_empty() {
        return Err(Error::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(luminance_from_rgb(&img.to_rgb8()))
}

/// Per-pixel `(R + G + B) / 3`.
#[must_use]
pub fn luminance_from_rgb(img: &RgbImage) -> Buffer2d<f32> {
    Buffer2d::from_fn(img.height() as usize, img.width() as usize, |row, col| {
        #[allow(clippy::cast_possible_truncation)]
        let Rgb([r, g, b]) = *img.get_pixel(col as u32, row as u32);
        (f32::from(r) + f32::from(g) + f32::from(b)) / 3.0
    })
}

/// Rescale `[min, max]` of `buf` onto `0..=255` and render it as a gray
/// RGB image.
///
/// A constant buffer (`min == max`) renders as all black. An empty
/// buffer renders as an empty image.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_display_rgb(buf: &Buffer2d<f32>) -> RgbImage {
    let (width, height) = (buf.width() as u32, buf.height() as u32);
    if buf.is_empty() {
        return RgbImage::new(width, height);
    }

    let min = min_value(buf);
    let range = max_value(buf) - min;
    let scale = if range > 0.0 { 255.0 / range } else { 0.0 };

    RgbImage::from_fn(width, height, |x, y| {
        let value = buf[(y as usize, x as usize)];
        let v = ((value - min) * scale).round().clamp(0.0, 255.0) as u8;
        Rgb([v, v, v])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .ok();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_luminance(&[]);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_luminance(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(Error::ImageDecode(_))));
    }

    #[test]
    fn decoded_buffer_is_row_major_average() {
        let img = RgbImage::from_fn(3, 2, |x, y| {
            let v = u8::try_from(x * 10 + y * 100).unwrap();
            Rgb([v, v + 30, v])
        });
        let buf = decode_luminance(&encode_png(&img)).unwrap();
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.width(), 3);
        assert_abs_diff_eq!(buf[(1, 2)], (120.0 + 150.0 + 120.0) / 3.0);
        assert_abs_diff_eq!(buf[(0, 0)], 10.0);
    }

    #[test]
    fn luminance_uses_equal_weights() {
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let buf = luminance_from_rgb(&img);
        assert_eq!(buf.row(0), &[85.0, 85.0, 85.0]);
    }

    #[test]
    fn display_rescales_to_full_range() {
        let buf = Buffer2d::from_vec(1, 3, vec![-10.0, 0.0, 10.0]).unwrap();
        let img = to_display_rgb(&buf);
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([128, 128, 128]));
        assert_eq!(img.get_pixel(2, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn constant_buffer_displays_black() {
        let mut buf: Buffer2d<f32> = Buffer2d::new(4, 4);
        buf.fill(42.0);
        let img = to_display_rgb(&buf);
        assert!(img.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn empty_buffer_displays_empty_image() {
        let img = to_display_rgb(&Buffer2d::new(0, 5));
        assert_eq!(img.width(), 5);
        assert_eq!(img.height(), 0);
    }

    #[test]
    fn display_round_trip_preserves_full_range_values() {
        let buf = Buffer2d::from_fn(16, 16, |row, col| (row * 16 + col) as f32);
        let back = luminance_from_rgb(&to_display_rgb(&buf));
        for (&a, &b) in buf.as_slice().iter().zip(back.as_slice()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-2);
        }
    }
}
