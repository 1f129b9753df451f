//! Binary morphology on integral buffers.

use num_traits::PrimInt;

use crate::buffer::{Buffer2d, Element};

/// Binary erosion with a square `(2 * radius + 1)^2` structuring element.
///
/// A pixel becomes one only if every sample in its window is non-zero.
/// Pixels within `radius` of any edge have no full window and are set to
/// zero without being examined.
///
/// # Panics
///
/// If `dst` differs in extent from `src`.
pub fn erode<T: Element + PrimInt>(src: &Buffer2d<T>, radius: usize, dst: &mut Buffer2d<T>) {
    assert!(
        src.same_extent(dst),
        "destination is {}x{}, source is {}x{}",
        dst.height(),
        dst.width(),
        src.height(),
        src.width(),
    );

    let (height, width) = (src.height(), src.width());
    for row in 0..height {
        for col in 0..width {
            let on_border =
                row < radius || row + radius >= height || col < radius || col + radius >= width;
            dst[(row, col)] = if on_border {
                T::zero()
            } else if window_is_set(src, row, col, radius) {
                T::one()
            } else {
                T::zero()
            };
        }
    }
}

fn window_is_set<T: Element + PrimInt>(
    src: &Buffer2d<T>,
    row: usize,
    col: usize,
    radius: usize,
) -> bool {
    (row - radius..=row + radius).all(|r| {
        src.row(r)[col - radius..=col + radius]
            .iter()
            .all(|&v| v != T::zero())
    })
}
