//! Separable 1D convolution engine and the filters built on it.
//!
//! [`filter_x`] and [`filter_y`] correlate every row (or column) of a
//! buffer with an odd-length kernel. Each line is split into an interior
//! run, where the whole kernel lies inside the buffer and the inner loop
//! has no branches, and a border run of `radius` elements at each end
//! whose out-of-range taps are resolved by the [`BorderCondition`]. The
//! two runs never overlap and together cover the line, so every element
//! of `dst` is written exactly once.
//!
//! Box, Gaussian, difference and Sobel filters are thin wrappers that
//! build a kernel and run one or two 1D passes.

use num_traits::{AsPrimitive, Float, Signed};

use crate::border::{BorderCondition, map_index};
use crate::buffer::{Buffer2d, Element, sum};

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Correlate each row of `src` with `kernel`, writing into `dst`.
///
/// The kernel radius is `kernel.len() / 2`; tap `k` of output column `x`
/// reads input column `x - radius + k`.
///
/// # Panics
///
/// If `kernel` has even (or zero) length, or `dst` differs in extent
/// from `src`.
pub fn filter_x<T: Element>(
    src: &Buffer2d<T>,
    kernel: &[T],
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    filter_axis(src, kernel, border, dst, Axis::X);
}

/// Correlate each column of `src` with `kernel`, writing into `dst`.
///
/// # Panics
///
/// If `kernel` has even (or zero) length, or `dst` differs in extent
/// from `src`.
pub fn filter_y<T: Element>(
    src: &Buffer2d<T>,
    kernel: &[T],
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    filter_axis(src, kernel, border, dst, Axis::Y);
}

#[allow(clippy::cast_possible_wrap)]
fn filter_axis<T: Element>(
    src: &Buffer2d<T>,
    kernel: &[T],
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
    axis: Axis,
) {
    assert!(
        kernel.len() % 2 == 1,
        "kernel length must be odd, got {}",
        kernel.len(),
    );
    assert!(
        src.same_extent(dst),
        "destination is {}x{}, source is {}x{}",
        dst.height(),
        dst.width(),
        src.height(),
        src.width(),
    );

    let width = src.width();
    // Sample `pos` of line `line` lives at `line * line_stride + pos * step`.
    let (lines, len, line_stride, step) = match axis {
        Axis::X => (src.height(), width, width, 1),
        Axis::Y => (width, src.height(), 1, width),
    };
    if lines == 0 || len == 0 {
        return;
    }

    let radius = kernel.len() / 2;
    // Interior is [lead, trail); it is empty when the kernel is at least
    // as long as the line.
    let lead = radius.min(len);
    let trail = len.saturating_sub(radius).max(lead);

    let input = src.as_slice();
    let output = dst.as_mut_slice();

    for line in 0..lines {
        let base = line * line_stride;

        for pos in lead..trail {
            let first = base + (pos - radius) * step;
            output[base + pos * step] = kernel
                .iter()
                .enumerate()
                .fold(T::zero(), |acc, (k, &weight)| {
                    acc + weight * input[first + k * step]
                });
        }

        for pos in (0..lead).chain(trail..len) {
            let first_tap = pos as isize - radius as isize;
            output[base + pos * step] =
                kernel
                    .iter()
                    .enumerate()
                    .fold(T::zero(), |acc, (k, &weight)| {
                        map_index(first_tap + k as isize, len, border)
                            .map_or(acc, |p| acc + weight * input[base + p * step])
                    });
        }
    }
}

/// `[-1, 0, 1]`: central difference.
fn diff_kernel<T: Element + Signed>() -> [T; 3] {
    [-T::one(), T::zero(), T::one()]
}

/// `[1, 2, 1]`: Sobel smoothing taps.
fn smooth_kernel<T: Element>() -> [T; 3] {
    [T::one(), T::one() + T::one(), T::one()]
}

/// Central difference along x.
pub fn diff_filter_x<T: Element + Signed>(
    src: &Buffer2d<T>,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    filter_x(src, &diff_kernel(), border, dst);
}

/// Central difference along y.
pub fn diff_filter_y<T: Element + Signed>(
    src: &Buffer2d<T>,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    filter_y(src, &diff_kernel(), border, dst);
}

/// Horizontal Sobel gradient: `[1, 2, 1]` along y, then `[-1, 0, 1]`
/// along x.
pub fn sobel_x<T: Element + Signed>(
    src: &Buffer2d<T>,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    let mut smoothed = Buffer2d::new(src.height(), src.width());
    filter_y(src, &smooth_kernel(), border, &mut smoothed);
    diff_filter_x(&smoothed, border, dst);
}

/// Vertical Sobel gradient: `[1, 2, 1]` along x, then `[-1, 0, 1]`
/// along y.
pub fn sobel_y<T: Element + Signed>(
    src: &Buffer2d<T>,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    let mut smoothed = Buffer2d::new(src.height(), src.width());
    filter_x(src, &smooth_kernel(), border, &mut smoothed);
    diff_filter_y(&smoothed, border, dst);
}

/// Euclidean gradient magnitude `sqrt(gx^2 + gy^2)` of the two Sobel
/// gradients.
pub fn sobel_magnitude<T: Element + Float + Signed>(
    src: &Buffer2d<T>,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    let mut grad_y = Buffer2d::new(src.height(), src.width());
    sobel_x(src, border, dst);
    sobel_y(src, border, &mut grad_y);
    for (gx, &gy) in dst.as_mut_slice().iter_mut().zip(grad_y.as_slice()) {
        *gx = gx.hypot(gy);
    }
}

/// `1 x (2 * radius + 1)` kernel of ones.
#[must_use]
pub fn box_kernel<T: Element>(radius: usize) -> Buffer2d<T> {
    let mut kernel = Buffer2d::new(1, 2 * radius + 1);
    kernel.fill(T::one());
    kernel
}

/// Unnormalized box sum along x.
pub fn box_filter_x<T: Element>(
    src: &Buffer2d<T>,
    radius: usize,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    filter_x(src, box_kernel(radius).as_slice(), border, dst);
}

/// Unnormalized box sum along y.
pub fn box_filter_y<T: Element>(
    src: &Buffer2d<T>,
    radius: usize,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    filter_y(src, box_kernel(radius).as_slice(), border, dst);
}

/// 2D box sum: an x pass with `radius_x`, then a y pass with `radius_y`.
pub fn box_filter<T: Element>(
    src: &Buffer2d<T>,
    radius_x: usize,
    radius_y: usize,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) {
    let mut tmp = Buffer2d::new(src.height(), src.width());
    box_filter_x(src, radius_x, border, &mut tmp);
    box_filter_y(&tmp, radius_y, border, dst);
}

/// `1 x (2 * radius + 1)` Gaussian kernel sampled from
/// `exp(-dx^2 / (2 sigma^2))` and normalized to unit sum.
///
/// A non-positive (or NaN) `sigma` yields the identity kernel: a single
/// one at the center, so filtering with it leaves the input unchanged.
#[must_use]
pub fn gauss_kernel<T>(radius: usize, sigma: T) -> Buffer2d<T>
where
    T: Element + Float,
    usize: AsPrimitive<T>,
{
    let mut kernel: Buffer2d<T> = Buffer2d::new(1, 2 * radius + 1);
    if sigma.is_nan() || sigma <= T::zero() {
        kernel[(0, radius)] = T::one();
        return kernel;
    }

    let factor = T::one() / ((T::one() + T::one()) * sigma * sigma);
    for (x, tap) in kernel.as_mut_slice().iter_mut().enumerate() {
        let dx: T = x.abs_diff(radius).as_();
        *tap = (-factor * dx * dx).exp();
    }

    let normalization = T::one() / sum(&kernel);
    kernel.map_in_place(|v| v * normalization);
    kernel
}

/// Gaussian smoothing along x.
pub fn gauss_filter_x<T>(
    src: &Buffer2d<T>,
    radius: usize,
    sigma: T,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) where
    T: Element + Float,
    usize: AsPrimitive<T>,
{
    filter_x(src, gauss_kernel(radius, sigma).as_slice(), border, dst);
}

/// Gaussian smoothing along y.
pub fn gauss_filter_y<T>(
    src: &Buffer2d<T>,
    radius: usize,
    sigma: T,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) where
    T: Element + Float,
    usize: AsPrimitive<T>,
{
    filter_y(src, gauss_kernel(radius, sigma).as_slice(), border, dst);
}

/// 2D Gaussian smoothing with independent radius and sigma per axis,
/// x pass first.
pub fn gauss_filter<T>(
    src: &Buffer2d<T>,
    radius_x: usize,
    radius_y: usize,
    sigma_x: T,
    sigma_y: T,
    border: BorderCondition,
    dst: &mut Buffer2d<T>,
) where
    T: Element + Float,
    usize: AsPrimitive<T>,
{
    let mut tmp = Buffer2d::new(src.height(), src.width());
    gauss_filter_x(src, radius_x, sigma_x, border, &mut tmp);
    gauss_filter_y(&tmp, radius_y, sigma_y, border, dst);
}

/// `dst = true_val` where `src >= thresh`, else `false_val`.
///
/// # Panics
///
/// If `dst` differs in extent from `src`.
pub fn threshold_image<T: Element, U: Element>(
    src: &Buffer2d<T>,
    thresh: T,
    true_val: U,
    false_val: U,
    dst: &mut Buffer2d<U>,
) {
    assert!(
        src.same_extent(dst),
        "destination is {}x{}, source is {}x{}",
        dst.height(),
        dst.width(),
        src.height(),
        src.width(),
    );
    for (d, &s) in dst.as_mut_slice().iter_mut().zip(src.as_slice()) {
        *d = if s >= thresh { true_val } else { false_val };
    }
}
