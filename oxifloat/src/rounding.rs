//! Rounding modes and lost-fraction tracking.
//!
//! Rounding is factored into two pieces: every precision-losing primitive
//! classifies the discarded bits as a [`Loss`], and a single decision point
//! turns that classification plus the [`Round`] mode into an increment of
//! the kept significand. No operation ever needs more than the guard/sticky
//! information captured here.

use crate::sig::{self, Limb, LIMB_BITS};
use core::ops::Neg;

/// The five IEEE-754 rounding-direction attributes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Round {
    /// Round to nearest, ties to the even significand (the IEEE default).
    NearestTiesToEven,
    /// Round toward positive infinity.
    TowardPositive,
    /// Round toward negative infinity.
    TowardNegative,
    /// Round toward zero (truncate).
    TowardZero,
    /// Round to nearest, ties away from zero.
    NearestTiesToAway,
}

impl Neg for Round {
    type Output = Round;

    /// The mode that rounds `-x` the way `self` rounds `x`. Used to reduce
    /// signed operations to operations on absolute values.
    fn neg(self) -> Round {
        match self {
            Round::TowardPositive => Round::TowardNegative,
            Round::TowardNegative => Round::TowardPositive,
            Round::NearestTiesToEven | Round::TowardZero | Round::NearestTiesToAway => self,
        }
    }
}

/// What fraction of an ulp the truncated bits of a significand represent.
///
/// This combines the roles of the classic guard and sticky bits.
#[must_use]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Loss {
    /// Truncated bits were `000000`.
    ExactlyZero,
    /// Truncated bits were `0xxxxx`, x's not all zero.
    LessThanHalf,
    /// Truncated bits were `100000`.
    ExactlyHalf,
    /// Truncated bits were `1xxxxx`, x's not all zero.
    MoreThanHalf,
}

impl Loss {
    /// Combine the effect of two lost fractions, `self` being the more
    /// significant of the two.
    pub(crate) fn combine(self, less_significant: Loss) -> Loss {
        let mut more_significant = self;
        if less_significant != Loss::ExactlyZero {
            if more_significant == Loss::ExactlyZero {
                more_significant = Loss::LessThanHalf;
            } else if more_significant == Loss::ExactlyHalf {
                more_significant = Loss::MoreThanHalf;
            }
        }

        more_significant
    }

    /// The fraction that would be lost were `limbs` truncated by its least
    /// significant `bits` bits.
    pub(crate) fn through_truncation(limbs: &[Limb], bits: usize) -> Loss {
        if bits == 0 {
            return Loss::ExactlyZero;
        }

        let half_bit = bits - 1;
        let half_limb = half_bit / LIMB_BITS;
        let (half_limb, rest) = if half_limb < limbs.len() {
            (limbs[half_limb], &limbs[..half_limb])
        } else {
            (0, limbs)
        };
        let half = 1 << (half_bit % LIMB_BITS);
        let has_half = half_limb & half != 0;
        let has_rest = half_limb & (half - 1) != 0 || !sig::is_all_zeros(rest);

        match (has_half, has_rest) {
            (false, false) => Loss::ExactlyZero,
            (false, true) => Loss::LessThanHalf,
            (true, false) => Loss::ExactlyHalf,
            (true, true) => Loss::MoreThanHalf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_modes() {
        assert_eq!(-Round::TowardPositive, Round::TowardNegative);
        assert_eq!(-Round::TowardNegative, Round::TowardPositive);
        assert_eq!(-Round::NearestTiesToEven, Round::NearestTiesToEven);
        assert_eq!(-Round::TowardZero, Round::TowardZero);
        assert_eq!(-Round::NearestTiesToAway, Round::NearestTiesToAway);
    }

    #[test]
    fn truncation_classes() {
        // Dropping the low 4 bits of 0b1_1000 loses exactly half an ulp.
        assert_eq!(Loss::through_truncation(&[0b1_1000], 4), Loss::ExactlyHalf);
        assert_eq!(Loss::through_truncation(&[0b1_1001], 4), Loss::MoreThanHalf);
        assert_eq!(Loss::through_truncation(&[0b1_0001], 4), Loss::LessThanHalf);
        assert_eq!(Loss::through_truncation(&[0b1_0000], 4), Loss::ExactlyZero);
        assert_eq!(Loss::through_truncation(&[!0], 0), Loss::ExactlyZero);
    }

    #[test]
    fn combine_keeps_more_significant_half() {
        assert_eq!(Loss::ExactlyHalf.combine(Loss::LessThanHalf), Loss::MoreThanHalf);
        assert_eq!(Loss::ExactlyZero.combine(Loss::MoreThanHalf), Loss::LessThanHalf);
        assert_eq!(Loss::ExactlyZero.combine(Loss::ExactlyZero), Loss::ExactlyZero);
        assert_eq!(Loss::MoreThanHalf.combine(Loss::ExactlyZero), Loss::MoreThanHalf);
    }
}
