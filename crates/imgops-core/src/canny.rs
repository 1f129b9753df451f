//! Canny edge detection on [`Buffer2d`] gradients.
//!
//! The detector runs five stages, each exposed so it can be tested in
//! isolation:
//!
//! 1. Sobel gradients under [`BorderCondition::Clamp`].
//! 2. Squared magnitude and a direction bin per pixel
//!    ([`canny_get_angle_bin`]).
//! 3. [`non_max_suppression`] along the binned direction.
//! 4. [`double_threshold`] on squared magnitudes.
//! 5. [`hysteresis_edge_tracking`] from strong pixels.
//!
//! The output holds [`EDGE`] for linked edges. Weak candidates that were
//! never reached keep the value [`WEAK`]; callers that need a strict
//! binary mask treat anything other than [`EDGE`] as background.

use num_traits::{AsPrimitive, Signed};

use crate::border::{BorderCondition, clamp_index};
use crate::buffer::{Buffer2d, Element, Position};
use crate::consts::{EIGHTH_PI, HALF_PI, PI, QUARTER_PI};
use crate::filter::{sobel_x, sobel_y};

/// Non-maximum pixel, or a candidate below the low threshold.
pub const SUPPRESSED: u8 = 0;
/// Local maximum at or above the low threshold but below the high one.
pub const WEAK: u8 = 1;
/// Local maximum at or above the high threshold, before linking.
pub const STRONG: u8 = 2;
/// Linked edge pixel.
pub const EDGE: u8 = 255;

/// `(previous, next)` neighbour offsets per direction bin, as
/// `(row, col)` pairs.
const NMS_OFFSETS: [(Position, Position); 4] = [
    (Position::new(0, -1), Position::new(0, 1)),
    (Position::new(-1, -1), Position::new(1, 1)),
    (Position::new(-1, 0), Position::new(1, 0)),
    (Position::new(-1, 1), Position::new(1, -1)),
];

const NEIGHBOURS_8: [Position; 8] = [
    Position::new(-1, -1),
    Position::new(-1, 0),
    Position::new(-1, 1),
    Position::new(0, -1),
    Position::new(0, 1),
    Position::new(1, -1),
    Position::new(1, 0),
    Position::new(1, 1),
];

/// Run the full Canny pipeline over `src`.
///
/// `lo_threshold` and `hi_threshold` bound the gradient magnitude; they
/// are squared internally and compared against `gx^2 + gy^2`.
///
/// # Panics
///
/// If `dst` differs in extent from `src`.
pub fn canny_edge_detection<T>(
    src: &Buffer2d<T>,
    lo_threshold: T,
    hi_threshold: T,
    dst: &mut Buffer2d<u8>,
) where
    T: Element + Signed + AsPrimitive<f64>,
{
    assert!(
        src.same_extent(dst),
        "destination is {}x{}, source is {}x{}",
        dst.height(),
        dst.width(),
        src.height(),
        src.width(),
    );
    let (height, width) = (src.height(), src.width());

    let mut grad_x = Buffer2d::new(height, width);
    let mut grad_y = Buffer2d::new(height, width);
    sobel_x(src, BorderCondition::Clamp, &mut grad_x);
    sobel_y(src, BorderCondition::Clamp, &mut grad_y);

    // Squares are taken in f64: narrow integer gradients overflow `T`.
    let mut grad_sq: Buffer2d<f64> = Buffer2d::new(height, width);
    let mut bins: Buffer2d<u8> = Buffer2d::new(height, width);
    for (((sq, bin), &gx), &gy) in grad_sq
        .as_mut_slice()
        .iter_mut()
        .zip(bins.as_mut_slice())
        .zip(grad_x.as_slice())
        .zip(grad_y.as_slice())
    {
        let (gx, gy): (f64, f64) = (gx.as_(), gy.as_());
        *sq = gx.mul_add(gx, gy * gy);
        *bin = canny_get_angle_bin(gradient_angle(gx, gy));
    }

    let (lo, hi): (f64, f64) = (lo_threshold.as_(), hi_threshold.as_());
    non_max_suppression(&grad_sq, &bins, dst);
    double_threshold(&grad_sq, lo * lo, hi * hi, dst);
    hysteresis_edge_tracking(dst);
}

/// Direction of the gradient `(gx, gy)` in radians.
///
/// A zero horizontal component is classified as vertical (`pi / 2`)
/// whatever `gy` is, so flat regions land in the vertical bin.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn gradient_angle(gx: f64, gy: f64) -> f64 {
    if gx == 0.0 {
        HALF_PI
    } else {
        gy.atan2(gx)
    }
}

/// Quantize a gradient angle into one of four `pi / 4`-wide bins
/// centered at `0`, `pi / 4`, `pi / 2` and `3 pi / 4`.
///
/// Angles are taken modulo `pi`, so opposite directions share a bin.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn canny_get_angle_bin(angle: f64) -> u8 {
    let shifted = (angle + EIGHTH_PI).rem_euclid(PI);
    // rem_euclid may round a tiny negative remainder up to exactly pi.
    ((shifted / QUARTER_PI) as u8) % 4
}

/// Mark pixels whose squared magnitude is a local maximum along their
/// direction bin with [`WEAK`] (candidate), all others with
/// [`SUPPRESSED`].
///
/// A pixel must be strictly greater than its previous neighbour and at
/// least equal to its next one, so a plateau keeps exactly its first
/// pixel along the direction. Neighbours outside the buffer are clamped
/// to the edge.
///
/// # Panics
///
/// If the three buffers differ in extent, or a bin is outside `0..4`.
#[allow(clippy::cast_possible_wrap)]
pub fn non_max_suppression<T: Element>(
    grad_sq: &Buffer2d<T>,
    bins: &Buffer2d<u8>,
    dst: &mut Buffer2d<u8>,
) {
    assert!(
        grad_sq.same_extent(bins) && grad_sq.same_extent(dst),
        "gradient, bin and destination buffers differ in extent",
    );
    let (height, width) = (grad_sq.height(), grad_sq.width());
    let clamp = |pos: Position| {
        (
            clamp_index(pos.row, height),
            clamp_index(pos.col, width),
        )
    };

    for row in 0..height {
        for col in 0..width {
            let here = Position::new(row as isize, col as isize);
            let (prev, next) = NMS_OFFSETS[usize::from(bins[(row, col)])];
            let curr = grad_sq[(row, col)];
            let keep = curr > grad_sq[clamp(here + prev)] && curr >= grad_sq[clamp(here + next)];
            dst[(row, col)] = if keep { WEAK } else { SUPPRESSED };
        }
    }
}

/// Classify candidates by squared magnitude: below `lo_sq` becomes
/// [`SUPPRESSED`], below `hi_sq` [`WEAK`], otherwise [`STRONG`].
/// Non-candidates are left untouched.
///
/// # Panics
///
/// If `grad_sq` and `edges` differ in extent.
pub fn double_threshold<T: Element>(
    grad_sq: &Buffer2d<T>,
    lo_sq: T,
    hi_sq: T,
    edges: &mut Buffer2d<u8>,
) {
    assert!(
        grad_sq.same_extent(edges),
        "gradient and edge buffers differ in extent",
    );
    for (edge, &sq) in edges.as_mut_slice().iter_mut().zip(grad_sq.as_slice()) {
        if *edge == SUPPRESSED {
            continue;
        }
        *edge = if sq < lo_sq {
            SUPPRESSED
        } else if sq < hi_sq {
            WEAK
        } else {
            STRONG
        };
    }
}

/// Promote every [`STRONG`] pixel to [`EDGE`] and flood through
/// 8-connected [`WEAK`] neighbours, promoting them too.
///
/// The flood uses an explicit work list. Pixels never reached keep their
/// value.
#[allow(clippy::cast_possible_wrap)]
pub fn hysteresis_edge_tracking(edges: &mut Buffer2d<u8>) {
    let mut stack = Vec::new();
    for row in 0..edges.height() {
        for col in 0..edges.width() {
            if edges[(row, col)] != STRONG {
                continue;
            }
            edges[(row, col)] = EDGE;
            stack.push(Position::new(row as isize, col as isize));

            while let Some(pos) = stack.pop() {
                for offset in NEIGHBOURS_8 {
                    let neighbour = pos + offset;
                    if edges.is_valid_pos(neighbour) && edges[neighbour] == WEAK {
                        edges[neighbour] = EDGE;
                        stack.push(neighbour);
                    }
                }
            }
        }
    }
}
