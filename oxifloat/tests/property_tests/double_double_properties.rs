//! Property-based tests for the paired-double composite

use oxifloat::{DoubleDouble, OpStatus};
use proptest::prelude::*;

/// Strategy for integers that are exact in a single double component
fn exact_int() -> impl Strategy<Value = u64> {
    0u64..(1 << 52)
}

#[cfg(test)]
mod composite_properties {
    use super::*;

    proptest! {
        /// The two-component encoding survives a decode/encode cycle for
        /// any bit pattern, canonical or not.
        #[test]
        fn bit_round_trip(bits in any::<u128>()) {
            prop_assert_eq!(DoubleDouble::from_bits(bits).to_bits(), bits);
        }

        /// Negation is an involution on both components.
        #[test]
        fn neg_is_involutive(bits in any::<u128>()) {
            let x = DoubleDouble::from_bits(bits);
            prop_assert!((-(-x)).bitwise_eq(x));
        }

        /// Integer sums below the head's precision are exact and agree
        /// with the integer-constructed result.
        #[test]
        fn small_integer_addition_is_exact(a in exact_int(), b in exact_int()) {
            let x = DoubleDouble::from_u128(a as u128).value;
            let y = DoubleDouble::from_u128(b as u128).value;
            let sum = x + y;
            prop_assert_eq!(sum.status, OpStatus::OK);
            let direct = DoubleDouble::from_u128(a as u128 + b as u128).value;
            prop_assert!(sum.value.bitwise_eq(direct));
        }

        /// Addition of finite integer values commutes.
        #[test]
        fn addition_commutes(a in any::<u64>(), b in any::<u64>()) {
            let x = DoubleDouble::from_u128(a as u128).value;
            let y = DoubleDouble::from_u128(b as u128).value;
            let ab = x + y;
            let ba = y + x;
            prop_assert_eq!(ab.status, ba.status);
            prop_assert!(ab.value.bitwise_eq(ba.value));
        }

        /// The composite orders 64-bit integers like the integers.
        #[test]
        fn ordering_matches_integers(a in any::<u64>(), b in any::<u64>()) {
            let x = DoubleDouble::from_u128(a as u128).value;
            let y = DoubleDouble::from_u128(b as u128).value;
            prop_assert_eq!(x.partial_cmp(&y), a.partial_cmp(&b));
        }

        /// Every 64-bit integer is exact in 106 bits and converts back.
        #[test]
        fn u64_round_trip(a in any::<u64>()) {
            let v = DoubleDouble::from_u128(a as u128).value;
            let mut exact = false;
            let n = v.to_u128_r(128, oxifloat::Round::TowardZero, &mut exact);
            prop_assert!(exact);
            prop_assert_eq!(n.value, a as u128);
        }

        /// Scaling up and back down by the same power of two is exact for
        /// in-range values.
        #[test]
        fn scalbn_round_trips(a in 1u64.., k in -60i32..60) {
            let v = DoubleDouble::from_u128(a as u128).value;
            prop_assert!(v.scalbn(k).scalbn(-k).bitwise_eq(v));
        }
    }
}
