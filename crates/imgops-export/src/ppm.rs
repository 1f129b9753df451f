//! Plain-text PPM (`P3`) export for diagnostic dumps.
//!
//! The buffer's observed range `[min, max]` is mapped onto `0..=255`
//! with `round((v - min) * 255.999 / (max - min + 1))`, and the level is
//! written to all three channels, one `r g b` triple per line in
//! row-major order.
//!
//! This is a pure function with no I/O: it returns a `String`.

use std::fmt::Write;

use imgops_core::buffer::{max_value, min_value};
use imgops_core::{Buffer2d, Element};
use num_traits::AsPrimitive;

/// Serialize `buf` as a `P3` PPM string.
///
/// An empty buffer produces the header only.
///
/// # Examples
///
/// ```
/// use imgops_core::Buffer2d;
///
/// let buf = Buffer2d::from_vec(1, 2, vec![0_u8, 255]).unwrap();
/// assert_eq!(imgops_export::to_ppm(&buf), "P3\n2 1\n255\n0 0 0\n255 255 255\n");
/// ```
#[must_use]
pub fn to_ppm<T>(buf: &Buffer2d<T>) -> String
where
    T: Element + AsPrimitive<f64>,
{
    let mut out = String::with_capacity(16 + buf.len() * 12);
    let _ = write!(out, "P3\n{} {}\n255\n", buf.width(), buf.height());
    if buf.is_empty() {
        return out;
    }

    let min: f64 = min_value(buf).as_();
    let max: f64 = max_value(buf).as_();
    for &value in buf.as_slice() {
        let v = ppm_level(value.as_(), min, max);
        let _ = writeln!(out, "{v} {v} {v}");
    }
    out
}

/// Output level of `value` for a buffer spanning `[min, max]`.
///
/// The result is clamped into `0..=255`: for ranges wider than about 512
/// the top level rounds up to 256.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ppm_level(value: f64, min: f64, max: f64) -> u8 {
    let scale = 255.999 / (max - min + 1.0);
    ((value - min) * scale).round().clamp(0.0, 255.0) as u8
}
