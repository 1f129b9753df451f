//! Border policies for convolution taps that fall outside a buffer.

use serde::{Deserialize, Serialize};

/// How a 1D convolution synthesizes samples outside `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderCondition {
    /// Out-of-range taps contribute nothing.
    Zero,
    /// Out-of-range taps read the nearest edge sample.
    #[default]
    Clamp,
    /// Out-of-range taps read from the opposite edge (circular).
    Wrap,
}

/// Map a possibly out-of-range tap index to a sample index in `[0, len)`.
///
/// Returns `None` when the tap contributes nothing: always for
/// [`BorderCondition::Zero`] outside the range, and for every policy
/// when `len == 0`.
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn map_index(i: isize, len: usize, border: BorderCondition) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }
    match border {
        BorderCondition::Zero => None,
        BorderCondition::Clamp => Some(clamp_index(i, len)),
        BorderCondition::Wrap => Some(i.rem_euclid(len as isize) as usize),
    }
}

/// Clamp `i` into `[0, len - 1]`. `len` must be non-zero.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else if i as usize >= len {
        len - 1
    } else {
        i as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_is_identity_for_every_policy() {
        for border in [
            BorderCondition::Zero,
            BorderCondition::Clamp,
            BorderCondition::Wrap,
        ] {
            for i in 0..5 {
                assert_eq!(map_index(i, 5, border), Some(i.unsigned_abs()));
            }
        }
    }

    #[test]
    fn zero_drops_out_of_range() {
        assert_eq!(map_index(-1, 5, BorderCondition::Zero), None);
        assert_eq!(map_index(5, 5, BorderCondition::Zero), None);
    }

    #[test]
    fn clamp_replicates_edges() {
        let mode = BorderCondition::Clamp;
        assert_eq!(map_index(-3, 5, mode), Some(0));
        assert_eq!(map_index(-1, 5, mode), Some(0));
        assert_eq!(map_index(5, 5, mode), Some(4));
        assert_eq!(map_index(99, 5, mode), Some(4));
    }

    #[test]
    fn wrap_is_circular() {
        let mode = BorderCondition::Wrap;
        assert_eq!(map_index(-1, 5, mode), Some(4));
        assert_eq!(map_index(-2, 5, mode), Some(3));
        assert_eq!(map_index(5, 5, mode), Some(0));
        assert_eq!(map_index(6, 5, mode), Some(1));
        // Taps further than one period away still land in range.
        assert_eq!(map_index(-7, 5, mode), Some(3));
        assert_eq!(map_index(12, 5, mode), Some(2));
    }

    #[test]
    fn empty_axis_has_no_samples() {
        assert_eq!(map_index(0, 0, BorderCondition::Clamp), None);
        assert_eq!(map_index(-1, 0, BorderCondition::Wrap), None);
    }

    #[test]
    fn clamp_index_bounds() {
        assert_eq!(clamp_index(-4, 3), 0);
        assert_eq!(clamp_index(1, 3), 1);
        assert_eq!(clamp_index(3, 3), 2);
    }

    #[test]
    fn default_is_clamp() {
        assert_eq!(BorderCondition::default(), BorderCondition::Clamp);
    }
}
