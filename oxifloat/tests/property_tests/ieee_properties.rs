//! Property-based tests for the scalar engine

use oxifloat::sem::{DOUBLE, FLOAT8_E4M3FN, FLOAT8_E5M2FNUZ, HALF, SINGLE};
use oxifloat::{IeeeFloat, OpStatus};
use proptest::prelude::*;

/// Strategy for arbitrary single-precision encodings
fn single_bits() -> impl Strategy<Value = u32> {
    any::<u32>()
}

/// Strategy for arbitrary double-precision encodings
fn double_bits() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn single(bits: u32) -> IeeeFloat {
    IeeeFloat::from_bits(&SINGLE, bits as u128)
}

fn double(bits: u64) -> IeeeFloat {
    IeeeFloat::from_bits(&DOUBLE, bits as u128)
}

#[cfg(test)]
mod arithmetic_properties {
    use super::*;

    proptest! {
        /// Addition is commutative, bits and status included. Two NaN
        /// operands are excluded because the result keeps the first
        /// operand's payload.
        #[test]
        fn add_commutes(a in single_bits(), b in single_bits()) {
            let (x, y) = (single(a), single(b));
            prop_assume!(!(x.is_nan() && y.is_nan()));
            let ab = x + y;
            let ba = y + x;
            prop_assert_eq!(ab.status, ba.status);
            prop_assert!(ab.value.bitwise_eq(ba.value));
        }

        /// Multiplication is commutative under the same caveat.
        #[test]
        fn mul_commutes(a in single_bits(), b in single_bits()) {
            let (x, y) = (single(a), single(b));
            prop_assume!(!(x.is_nan() && y.is_nan()));
            let ab = x * y;
            let ba = y * x;
            prop_assert_eq!(ab.status, ba.status);
            prop_assert!(ab.value.bitwise_eq(ba.value));
        }

        /// Adding positive zero is an exact identity away from zero.
        #[test]
        fn zero_is_additive_identity(a in double_bits()) {
            let x = double(a);
            prop_assume!(!x.is_nan() && !x.is_zero());
            let r = x + IeeeFloat::zero(&DOUBLE);
            prop_assert_eq!(r.status, OpStatus::OK);
            prop_assert!(r.value.bitwise_eq(x));
        }

        /// x - x is positive zero under default rounding.
        #[test]
        fn self_difference_is_positive_zero(a in double_bits()) {
            let x = double(a);
            prop_assume!(x.is_finite() && !x.is_nan());
            let r = x - x;
            prop_assert_eq!(r.status, OpStatus::OK);
            prop_assert!(r.value.is_zero());
            prop_assert!(!r.value.is_negative());
        }

        /// Negation is an involution on every encoding, NaNs included.
        #[test]
        fn neg_is_involutive(a in double_bits()) {
            let x = double(a);
            prop_assert!((-(-x)).bitwise_eq(x));
        }

        /// The absolute value never carries a sign.
        #[test]
        fn abs_clears_the_sign(a in double_bits()) {
            prop_assert!(!double(a).abs().is_negative());
        }
    }
}

#[cfg(test)]
mod ordering_properties {
    use super::*;

    proptest! {
        /// partial_cmp is antisymmetric.
        #[test]
        fn compare_is_antisymmetric(a in double_bits(), b in double_bits()) {
            let (x, y) = (double(a), double(b));
            prop_assert_eq!(
                x.partial_cmp(&y),
                y.partial_cmp(&x).map(std::cmp::Ordering::reverse)
            );
        }

        /// next_down undoes next_up for finite values. Negative zero is
        /// excluded: stepping up from it crosses to positive territory.
        #[test]
        fn next_up_then_down_is_identity(a in double_bits()) {
            let x = double(a);
            prop_assume!(x.is_finite() && !x.is_nan());
            prop_assume!(!(x.is_zero() && x.is_negative()));
            let up = x.next_up().value;
            prop_assume!(up.is_finite());
            prop_assert!(up.next_down().value.bitwise_eq(x));
        }
    }
}

#[cfg(test)]
mod conversion_properties {
    use super::*;

    proptest! {
        /// Widening then narrowing is lossless, quiet NaN payloads
        /// included.
        #[test]
        fn single_survives_a_double_round_trip(a in single_bits()) {
            let x = single(a);
            prop_assume!(!x.is_signaling());
            let mut loses_info = false;
            let wide = x.convert(&DOUBLE, &mut loses_info).value;
            prop_assert!(!loses_info);
            let back = wide.convert(&SINGLE, &mut loses_info).value;
            prop_assert!(back.bitwise_eq(x));
        }

        /// Every encoding decodes and re-encodes to itself, across NaN
        /// encoding schemes.
        #[test]
        fn bit_round_trip(h in any::<u16>(), s in single_bits(), b in any::<u8>()) {
            for (sem, bits) in [
                (&HALF, h as u128),
                (&SINGLE, s as u128),
                (&FLOAT8_E4M3FN, b as u128),
                (&FLOAT8_E5M2FNUZ, b as u128),
            ] {
                prop_assert_eq!(IeeeFloat::from_bits(sem, bits).to_bits(), bits);
            }
        }

        /// The encoding never spills past the format's storage width.
        #[test]
        fn to_bits_fits_the_format(a in double_bits()) {
            prop_assert_eq!(double(a).to_bits() >> 64, 0);
        }

        /// frexp decomposes exactly.
        #[test]
        fn frexp_recomposes(a in double_bits()) {
            let x = double(a);
            prop_assume!(x.is_finite() && !x.is_nan());
            let mut exp = 0;
            let frac = x.frexp(&mut exp);
            prop_assert!(frac.scalbn(exp).bitwise_eq(x));
        }

        /// Scaling composes while the exponent stays in range.
        #[test]
        fn scalbn_composes(n in 1u64..(1 << 52), a in -400i32..400, b in -400i32..400) {
            let x = IeeeFloat::from_u128(&DOUBLE, n as u128).value;
            let stepped = x.scalbn(a).scalbn(b);
            prop_assert!(stepped.bitwise_eq(x.scalbn(a + b)));
        }

        /// Printing and reparsing a finite value is bit-exact.
        #[test]
        fn display_round_trips(a in double_bits(), s in single_bits()) {
            let x = double(a);
            prop_assume!(x.is_finite());
            let back = IeeeFloat::from_str(&DOUBLE, &x.to_string()).unwrap().value;
            prop_assert!(back.bitwise_eq(x));

            let x = single(s);
            prop_assume!(x.is_finite());
            let back = IeeeFloat::from_str(&SINGLE, &x.to_string()).unwrap().value;
            prop_assert!(back.bitwise_eq(x));
        }
    }
}
