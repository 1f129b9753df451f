//! Dense, row-major 2D numeric buffers.
//!
//! [`Buffer2d`] is the single storage type every filter, the Canny
//! detector and the operation chain read from and write into. It owns a
//! contiguous `Vec<T>` of `height * width` elements addressed as
//! `row * width + col`.
//!
//! Buffers are not `Clone`. Copying pixel data is always an explicit
//! [`Buffer2d::fill_from`]. Moving out of a buffer that is still
//! borrowed mutably goes through [`Buffer2d::take`], which leaves an empty
//! (`0 x 0`) buffer behind.
//!
//! The elementwise helpers ([`add`], [`sub`], [`mul`] and their scalar
//! forms) require operands with identical extents. A mismatch is a
//! programmer error and fails fast.

use std::fmt::Debug;
use std::ops::{Add, Index, IndexMut, Sub};

use num_traits::{AsPrimitive, Num, NumCast};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Numeric element types a [`Buffer2d`] can hold.
///
/// Blanket-implemented for every primitive integer and float type.
pub trait Element: Copy + PartialOrd + Num + NumCast + Debug + 'static {}

impl<T> Element for T where T: Copy + PartialOrd + Num + NumCast + Debug + 'static {}

/// Signed `(row, col)` pair used for offset arithmetic and bounds tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Vertical coordinate (0 at the top row).
    pub row: isize,
    /// Horizontal coordinate (0 at the left column).
    pub col: isize,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.row + other.row, self.col + other.col)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.row - other.row, self.col - other.col)
    }
}

/// Owned, contiguous, row-major 2D grid of numeric values.
#[derive(Debug, PartialEq)]
pub struct Buffer2d<T> {
    height: usize,
    width: usize,
    data: Vec<T>,
}

impl<T> Default for Buffer2d<T> {
    fn default() -> Self {
        Self {
            height: 0,
            width: 0,
            data: Vec::new(),
        }
    }
}

impl<T> Buffer2d<T> {
    /// Wrap existing row-major storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtentMismatch`] if `data.len() != height * width`.
    pub fn from_vec(height: usize, width: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = height.checked_mul(width).ok_or(Error::ExtentMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;
        if data.len() != expected {
            return Err(Error::ExtentMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Build a buffer by evaluating `f(row, col)` for every element in
    /// row-major order.
    pub fn from_fn(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            height,
            width,
            data,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Extent as a `(height, width)` position.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn size(&self) -> Position {
        Position::new(self.height as isize, self.width as isize)
    }

    /// Number of elements (`height * width`).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `self` and `other` have the same height and width.
    #[must_use]
    pub const fn same_extent<U>(&self, other: &Buffer2d<U>) -> bool {
        self.height == other.height && self.width == other.width
    }

    /// Bounds test: `0 <= row < height` and `0 <= col < width`.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn is_valid(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// Bounds test for a [`Position`].
    #[must_use]
    pub const fn is_valid_pos(&self, pos: Position) -> bool {
        self.is_valid(pos.row, pos.col)
    }

    /// Row-major view of the whole storage.
    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// Mutable row-major view of the whole storage.
    #[must_use]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// One row of the buffer.
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    /// Move the contents out, leaving an empty `0 x 0` buffer behind.
    #[must_use = "the taken buffer is dropped otherwise"]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Consume the buffer and return its row-major storage.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(
            row < self.height && col < self.width,
            "({row}, {col}) outside {}x{} buffer",
            self.height,
            self.width,
        );
        row * self.width + col
    }

    #[allow(clippy::cast_sign_loss)]
    fn pos_offset(&self, pos: Position) -> usize {
        self.offset(pos.row as usize, pos.col as usize)
    }
}

impl<T: Element> Buffer2d<T> {
    /// Allocate a `height x width` buffer. Contents are zeroed.
    #[must_use]
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![T::zero(); height * width],
        }
    }

    /// Replace the storage with a fresh `height x width` allocation.
    ///
    /// Prior contents are discarded.
    pub fn reallocate(&mut self, height: usize, width: usize) {
        *self = Self::new(height, width);
    }

    /// Reallocate only when the extent differs from `height x width`.
    pub(crate) fn ensure_extent(&mut self, height: usize, width: usize) {
        if self.height != height || self.width != width {
            self.reallocate(height, width);
        }
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy `other` into `self`, casting each element with `as` semantics.
    ///
    /// # Panics
    ///
    /// If the extents differ.
    pub fn fill_from<U>(&mut self, other: &Buffer2d<U>)
    where
        U: AsPrimitive<T>,
    {
        assert_same_extent(self, other);
        for (dst, &src) in self.data.iter_mut().zip(&other.data) {
            *dst = src.as_();
        }
    }

    /// Apply `f` to every element in place.
    pub fn map_in_place(&mut self, mut f: impl FnMut(T) -> T) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }
}

impl<T> Index<(usize, usize)> for Buffer2d<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[self.offset(row, col)]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2d<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let i = self.offset(row, col);
        &mut self.data[i]
    }
}

impl<T> Index<Position> for Buffer2d<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        &self.data[self.pos_offset(pos)]
    }
}

impl<T> IndexMut<Position> for Buffer2d<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        let i = self.pos_offset(pos);
        &mut self.data[i]
    }
}

fn assert_same_extent<T, U>(a: &Buffer2d<T>, b: &Buffer2d<U>) {
    assert!(
        a.same_extent(b),
        "buffer extents differ: {}x{} vs {}x{}",
        a.height,
        a.width,
        b.height,
        b.width,
    );
}

fn zip_scalar<T: Element>(src: &Buffer2d<T>, dst: &mut Buffer2d<T>, f: impl Fn(T) -> T) {
    assert_same_extent(src, dst);
    for (d, &s) in dst.data.iter_mut().zip(&src.data) {
        *d = f(s);
    }
}

fn zip_buffers<T: Element>(
    src1: &Buffer2d<T>,
    src2: &Buffer2d<T>,
    dst: &mut Buffer2d<T>,
    f: impl Fn(T, T) -> T,
) {
    assert_same_extent(src1, src2);
    assert_same_extent(src1, dst);
    for ((d, &a), &b) in dst.data.iter_mut().zip(&src1.data).zip(&src2.data) {
        *d = f(a, b);
    }
}

/// `dst = src + scalar`, elementwise.
pub fn add_scalar<T: Element>(src: &Buffer2d<T>, scalar: T, dst: &mut Buffer2d<T>) {
    zip_scalar(src, dst, |v| v + scalar);
}

/// `dst = src1 + src2`, elementwise.
pub fn add<T: Element>(src1: &Buffer2d<T>, src2: &Buffer2d<T>, dst: &mut Buffer2d<T>) {
    zip_buffers(src1, src2, dst, |a, b| a + b);
}

/// `dst = src - scalar`, elementwise.
pub fn sub_scalar<T: Element>(src: &Buffer2d<T>, scalar: T, dst: &mut Buffer2d<T>) {
    zip_scalar(src, dst, |v| v - scalar);
}

/// `dst = src1 - src2`, elementwise.
pub fn sub<T: Element>(src1: &Buffer2d<T>, src2: &Buffer2d<T>, dst: &mut Buffer2d<T>) {
    zip_buffers(src1, src2, dst, |a, b| a - b);
}

/// `dst = src * scalar`, elementwise.
pub fn mul_scalar<T: Element>(src: &Buffer2d<T>, scalar: T, dst: &mut Buffer2d<T>) {
    zip_scalar(src, dst, |v| v * scalar);
}

/// `dst = src1 * src2`, elementwise.
pub fn mul<T: Element>(src1: &Buffer2d<T>, src2: &Buffer2d<T>, dst: &mut Buffer2d<T>) {
    zip_buffers(src1, src2, dst, |a, b| a * b);
}

/// Sum of all elements. Zero for an empty buffer.
#[must_use]
pub fn sum<T: Element>(src: &Buffer2d<T>) -> T {
    src.data.iter().fold(T::zero(), |acc, &v| acc + v)
}

/// Smallest element.
///
/// # Panics
///
/// If the buffer is empty.
#[must_use]
pub fn min_value<T: Element>(src: &Buffer2d<T>) -> T {
    assert!(!src.is_empty(), "min_value of an empty buffer");
    src.data[1..]
        .iter()
        .fold(src.data[0], |min, &v| if v < min { v } else { min })
}

/// Largest element.
///
/// # Panics
///
/// If the buffer is empty.
#[must_use]
pub fn max_value<T: Element>(src: &Buffer2d<T>) -> T {
    assert!(!src.is_empty(), "max_value of an empty buffer");
    src.data[1..]
        .iter()
        .fold(src.data[0], |max, &v| if v > max { v } else { max })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    fn ramp(h: usize, w: usize) -> Buffer2d<i32> {
        Buffer2d::from_fn(h, w, |row, col| i32::try_from(row * w + col).unwrap())
    }

    #[test]
    fn construction_sets_extent() {
        let buf: Buffer2d<i32> = Buffer2d::new(20, 10);
        assert_eq!(buf.height(), 20);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.len(), 200);
        assert_eq!(buf.size(), Position::new(20, 10));
    }

    #[test]
    fn element_access_is_row_major() {
        let (h, w) = (20, 10);
        let mut buf: Buffer2d<i32> = Buffer2d::new(h, w);
        for row in 0..h {
            for col in 0..w {
                buf[(row, col)] = i32::try_from(row * w + col).unwrap();
            }
        }
        for (i, &v) in buf.as_slice().iter().enumerate() {
            assert_eq!(v, i32::try_from(i).unwrap());
        }
        assert_eq!(buf[Position::new(3, 7)], 37);
        assert_eq!(buf.row(2), &[20, 21, 22, 23, 24, 25, 26, 27, 28, 29]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Buffer2d::from_vec(3, 4, vec![0_u8; 11]).unwrap_err();
        assert!(matches!(
            err,
            Error::ExtentMismatch {
                expected: 12,
                actual: 11
            }
        ));
        assert!(Buffer2d::from_vec(3, 4, vec![0_u8; 12]).is_ok());
    }

    #[test]
    fn reallocate_discards_contents() {
        let mut buf = ramp(4, 4);
        buf.reallocate(2, 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.width(), 3);
        assert!(buf.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut src = ramp(5, 6);
        let moved = src.take();
        assert_eq!(moved.height(), 5);
        assert_eq!(moved.width(), 6);
        assert_eq!(src.height(), 0);
        assert_eq!(src.width(), 0);
        assert!(src.is_empty());
    }

    #[test]
    fn is_valid_checks_both_axes() {
        let buf: Buffer2d<u8> = Buffer2d::new(3, 5);
        assert!(buf.is_valid(0, 0));
        assert!(buf.is_valid(2, 4));
        assert!(!buf.is_valid(-1, 0));
        assert!(!buf.is_valid(0, -1));
        assert!(!buf.is_valid(3, 0));
        assert!(!buf.is_valid(0, 5));
        assert!(buf.is_valid_pos(Position::new(1, 1) + Position::new(1, 3)));
        assert!(!buf.is_valid_pos(Position::new(0, 0) - Position::new(1, 0)));
    }

    #[test]
    fn position_arithmetic() {
        let a = Position::new(3, -2);
        let b = Position::new(-1, 5);
        assert_eq!(a + b, Position::new(2, 3));
        assert_eq!(a - b, Position::new(4, -7));
    }

    #[test]
    fn fill_from_casts_between_types() {
        let ints = ramp(20, 10);
        let mut floats: Buffer2d<f32> = Buffer2d::new(20, 10);
        floats.fill_from(&ints);
        for row in 0..20 {
            for col in 0..10 {
                assert!((floats[(row, col)] - ints[(row, col)] as f32).abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn fill_from_truncates_like_as() {
        let floats = Buffer2d::from_vec(1, 3, vec![1.9_f32, -0.5, 300.0]).unwrap();
        let mut bytes: Buffer2d<u8> = Buffer2d::new(1, 3);
        bytes.fill_from(&floats);
        assert_eq!(bytes.as_slice(), &[1, 0, 255]);
    }

    #[test]
    #[should_panic(expected = "buffer extents differ")]
    fn fill_from_rejects_mismatched_extent() {
        let src: Buffer2d<i32> = Buffer2d::new(2, 2);
        let mut dst: Buffer2d<i32> = Buffer2d::new(2, 3);
        dst.fill_from(&src);
    }

    #[test]
    fn scalar_and_buffer_arithmetic() {
        let a = ramp(2, 3);
        let mut b: Buffer2d<i32> = Buffer2d::new(2, 3);
        b.fill(2);
        let mut out: Buffer2d<i32> = Buffer2d::new(2, 3);

        add_scalar(&a, 10, &mut out);
        assert_eq!(out.as_slice(), &[10, 11, 12, 13, 14, 15]);
        sub_scalar(&a, 1, &mut out);
        assert_eq!(out.as_slice(), &[-1, 0, 1, 2, 3, 4]);
        mul_scalar(&a, 3, &mut out);
        assert_eq!(out.as_slice(), &[0, 3, 6, 9, 12, 15]);

        add(&a, &b, &mut out);
        assert_eq!(out.as_slice(), &[2, 3, 4, 5, 6, 7]);
        sub(&a, &b, &mut out);
        assert_eq!(out.as_slice(), &[-2, -1, 0, 1, 2, 3]);
        mul(&a, &b, &mut out);
        assert_eq!(out.as_slice(), &[0, 2, 4, 6, 8, 10]);
    }

    #[test]
    #[should_panic(expected = "buffer extents differ")]
    fn binary_arithmetic_rejects_mismatched_extent() {
        let a: Buffer2d<f32> = Buffer2d::new(4, 4);
        let b: Buffer2d<f32> = Buffer2d::new(4, 5);
        let mut out: Buffer2d<f32> = Buffer2d::new(4, 4);
        add(&a, &b, &mut out);
    }

    #[test]
    fn reductions() {
        let buf = Buffer2d::from_vec(2, 3, vec![4, -7, 9, 0, 3, 1]).unwrap();
        assert_eq!(sum(&buf), 10);
        assert_eq!(min_value(&buf), -7);
        assert_eq!(max_value(&buf), 9);
    }

    #[test]
    #[should_panic(expected = "empty buffer")]
    fn min_of_empty_buffer_fails_fast() {
        let buf: Buffer2d<f64> = Buffer2d::default();
        let _ = min_value(&buf);
    }

    #[test]
    fn map_in_place_applies_everywhere() {
        let mut buf = ramp(3, 3);
        buf.map_in_place(|v| v * v);
        assert_eq!(buf.as_slice(), &[0, 1, 4, 9, 16, 25, 36, 49, 64]);
    }
}
