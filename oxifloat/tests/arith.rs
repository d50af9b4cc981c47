//! Integration tests for the scalar arithmetic engine across formats.

use oxifloat::sem::{
    DOUBLE, FLOAT4_E2M1FN, FLOAT8_E4M3FN, FLOAT8_E5M2FNUZ, HALF, SINGLE, X87_DOUBLE_EXTENDED,
};
use oxifloat::{Category, IeeeFloat, OpStatus, Round, IEK_INF, IEK_NAN, IEK_ZERO};

fn d(bits: u64) -> IeeeFloat {
    IeeeFloat::from_bits(&DOUBLE, bits as u128)
}

#[test]
fn addition_special_cases() {
    let inf = IeeeFloat::inf(&DOUBLE);
    let one = IeeeFloat::from_f64(1.0);

    let r = inf + -inf;
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());

    let r = inf + one;
    assert_eq!(r.status, OpStatus::OK);
    assert!(r.value.is_infinite());
    assert!(!r.value.is_negative());

    let r = one + -one;
    assert_eq!(r.status, OpStatus::OK);
    assert!(r.value.is_zero());
    assert!(!r.value.is_negative());

    // Rounding toward negative infinity flips the sign of an exact zero sum.
    let r = one.add_r(-one, Round::TowardNegative);
    assert!(r.value.is_zero());
    assert!(r.value.is_negative());
}

#[test]
fn signaling_nan_is_quieted() {
    let snan = IeeeFloat::snan(&SINGLE, None);
    assert_eq!(snan.to_bits(), 0x7FA0_0000);
    assert!(snan.is_signaling());

    let one = IeeeFloat::from_f32(1.0);
    let r = one + snan;
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());
    assert!(!r.value.is_signaling());
    assert_eq!(r.value.to_bits(), 0x7FE0_0000);
}

#[test]
fn decimal_fractions_round_as_hardware_does() {
    let a = IeeeFloat::from_f64(0.1);
    let b = IeeeFloat::from_f64(0.2);
    assert_eq!(a.to_bits(), 0x3FB9_9999_9999_999A);

    let sum = a + b;
    assert_eq!(sum.status, OpStatus::INEXACT);
    assert_eq!(sum.value.to_bits(), 0x3FD3_3333_3333_3334);
}

#[test]
fn fused_multiply_add_rounds_once() {
    // (2^27 + 1)^2 = 2^54 + 2^28 + 1, which needs 55 significand bits.
    let a = IeeeFloat::from_u128(&DOUBLE, (1 << 27) + 1).value;
    let c = IeeeFloat::from_i128(&DOUBLE, -(1i128 << 54)).value;

    let fused = a.mul_add(a, c);
    assert_eq!(fused.status, OpStatus::OK);
    let mut exact = false;
    let n = fused
        .value
        .to_u128_r(128, Round::NearestTiesToEven, &mut exact);
    assert!(exact);
    assert_eq!(n.value, (1 << 28) + 1);

    // The separately rounded product loses the trailing 1.
    let split = ((a * a).value + c).value;
    let n = split.to_u128(128);
    assert_eq!(n.value, 1 << 28);
}

#[test]
fn division_special_cases() {
    let one = IeeeFloat::from_f32(1.0);
    let three = IeeeFloat::from_f32(3.0);
    let zero = IeeeFloat::zero(&SINGLE);

    let r = one / three;
    assert_eq!(r.status, OpStatus::INEXACT);
    assert_eq!(r.value.to_bits(), 0x3EAA_AAAB);

    let r = one / zero;
    assert_eq!(r.status, OpStatus::DIV_BY_ZERO);
    assert!(r.value.is_infinite());

    let r = zero / zero;
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());

    let inf = IeeeFloat::inf(&SINGLE);
    let r = inf / inf;
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());
}

#[test]
fn remainder_and_fmod() {
    let five = IeeeFloat::from_f64(5.0);
    let three = IeeeFloat::from_f64(3.0);
    let two = IeeeFloat::from_f64(2.0);

    // 5/3 is nearest to 2, so the IEEE remainder is negative.
    let r = five.ieee_rem(three);
    assert_eq!(r.status, OpStatus::OK);
    assert_eq!(r.value.to_f64(), -1.0);

    // Ties pick the even quotient: 5/2 = 2.5 rounds to 2.
    let r = five.ieee_rem(two);
    assert_eq!(r.value.to_f64(), 1.0);

    let r = five.c_fmod(three);
    assert_eq!(r.value.to_f64(), 2.0);

    // fmod keeps the dividend's sign.
    let r = (-five).c_fmod(three);
    assert_eq!(r.value.to_f64(), -2.0);

    let r = five.c_fmod(IeeeFloat::zero(&DOUBLE));
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());
}

#[test]
fn rounding_to_integral() {
    let cases = [
        (2.5, Round::NearestTiesToEven, 2.0),
        (3.5, Round::NearestTiesToEven, 4.0),
        (2.5, Round::NearestTiesToAway, 3.0),
        (-2.5, Round::TowardPositive, -2.0),
        (-2.5, Round::TowardNegative, -3.0),
        (0.4, Round::NearestTiesToEven, 0.0),
        (-0.4, Round::TowardZero, -0.0),
    ];
    for (input, round, expected) in cases {
        let r = IeeeFloat::from_f64(input).round_to_integral(round);
        assert_eq!(r.status, OpStatus::INEXACT, "{input} {round:?}");
        assert!(
            r.value.bitwise_eq(IeeeFloat::from_f64(expected)),
            "{input} {round:?} gave {:?}",
            r.value
        );
    }

    let r = IeeeFloat::from_f64(7.0).round_to_integral(Round::NearestTiesToEven);
    assert_eq!(r.status, OpStatus::OK);
    assert_eq!(r.value.to_f64(), 7.0);
}

#[test]
fn next_up_walks_the_number_line() {
    assert_eq!(d(0x3FF0_0000_0000_0000).next_up().value.to_bits(), 0x3FF0_0000_0000_0001);

    // Binade boundary.
    assert_eq!(d(0x3FEF_FFFF_FFFF_FFFF).next_up().value.to_f64(), 1.0);

    assert!(IeeeFloat::largest(&DOUBLE).next_up().value.is_infinite());

    let up = IeeeFloat::zero(&DOUBLE).next_up().value;
    assert!(up.is_smallest());
    assert!(!up.is_negative());

    // Crossing zero from below lands on negative zero.
    let up = (-IeeeFloat::smallest(&DOUBLE)).next_up().value;
    assert!(up.is_zero());
    assert!(up.is_negative());

    assert!(IeeeFloat::inf(&DOUBLE).next_down().value.is_largest());
}

#[test]
fn exponent_queries() {
    assert_eq!(IeeeFloat::from_f64(1.0).ilogb(), 0);
    assert_eq!(IeeeFloat::from_f64(0.25).ilogb(), -2);
    assert_eq!(IeeeFloat::zero(&DOUBLE).ilogb(), IEK_ZERO);
    assert_eq!(IeeeFloat::inf(&DOUBLE).ilogb(), IEK_INF);
    assert_eq!(IeeeFloat::qnan(&DOUBLE, None).ilogb(), IEK_NAN);
    assert_eq!(IeeeFloat::smallest(&DOUBLE).ilogb(), -1074);
}

#[test]
fn scalbn_and_frexp() {
    assert_eq!(IeeeFloat::from_f64(1.0).scalbn(3).to_f64(), 8.0);
    assert!(IeeeFloat::largest(&DOUBLE).scalbn(1).is_infinite());
    assert!(IeeeFloat::smallest(&DOUBLE).scalbn(-1).is_zero());

    let mut exp = 0;
    let frac = IeeeFloat::from_f64(8.0).frexp(&mut exp);
    assert_eq!(exp, 4);
    assert_eq!(frac.to_f64(), 0.5);

    let frac = IeeeFloat::zero(&DOUBLE).frexp(&mut exp);
    assert_eq!(exp, 0);
    assert!(frac.is_zero());
}

#[test]
fn conversion_between_formats() {
    let mut loses_info = true;
    let r = IeeeFloat::from_f64(1.5).convert(&SINGLE, &mut loses_info);
    assert_eq!(r.status, OpStatus::OK);
    assert!(!loses_info);
    assert_eq!(r.value.to_bits(), 0x3FC0_0000);

    let r = IeeeFloat::from_f64(0.1).convert(&SINGLE, &mut loses_info);
    assert_eq!(r.status, OpStatus::INEXACT);
    assert!(loses_info);
    assert_eq!(r.value.to_bits(), 0x3DCC_CCCD);

    // Widening a signaling NaN quiets it and shifts the payload.
    let r = IeeeFloat::snan(&SINGLE, None).convert(&DOUBLE, &mut loses_info);
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert_eq!(r.value.to_bits(), 0x7FFC_0000_0000_0000);

    let r = IeeeFloat::from_f64(65536.0).convert(&HALF, &mut loses_info);
    assert_eq!(r.status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    assert_eq!(r.value.to_bits(), 0x7C00);
}

#[test]
fn x87_explicit_integer_bit() {
    let one = IeeeFloat::from_bits(&X87_DOUBLE_EXTENDED, 0x3FFF_8000_0000_0000_0000);
    assert_eq!(one.category(), Category::Normal);
    assert_eq!(one.to_bits(), 0x3FFF_8000_0000_0000_0000);

    let mut loses_info = true;
    let r = one.convert(&DOUBLE, &mut loses_info);
    assert_eq!(r.status, OpStatus::OK);
    assert!(!loses_info);
    assert_eq!(r.value.to_f64(), 1.0);

    assert_eq!(
        IeeeFloat::qnan(&X87_DOUBLE_EXTENDED, None).to_bits(),
        0x7FFF_C000_0000_0000_0000
    );
}

#[test]
fn nan_only_format_saturates_to_nan() {
    let largest = IeeeFloat::largest(&FLOAT8_E4M3FN);
    assert_eq!(largest.to_bits(), 0x7E);

    let r = largest + largest;
    assert_eq!(r.status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    assert!(r.value.is_nan());
    assert_eq!(r.value.to_bits(), 0x7F);

    let one = IeeeFloat::from_u128(&FLOAT8_E4M3FN, 1).value;
    let r = one / IeeeFloat::zero(&FLOAT8_E4M3FN);
    assert_eq!(r.status, OpStatus::DIV_BY_ZERO);
    assert!(r.value.is_nan());
}

#[test]
fn nan_only_overflow_at_the_all_ones_boundary() {
    // 448 is the top finite value; the next encoding up is the NaN.
    let r = IeeeFloat::from_str(&FLOAT8_E4M3FN, "448").unwrap();
    assert_eq!(r.status, OpStatus::OK);
    assert_eq!(r.value.to_bits(), 0x7E);

    // 465 rounds up onto the all-ones pattern, which must overflow to
    // NaN rather than decode as a finite value.
    let r = IeeeFloat::from_str(&FLOAT8_E4M3FN, "465").unwrap();
    assert_eq!(r.status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    assert!(r.value.is_nan());
    assert_eq!(r.value.to_bits(), 0x7F);

    // The same boundary through addition: 448 + 24 = 472 is nearer the
    // all-ones step at 480 than 448.
    let largest = IeeeFloat::largest(&FLOAT8_E4M3FN);
    let step = IeeeFloat::from_u128(&FLOAT8_E4M3FN, 24).value;
    let r = largest + step;
    assert_eq!(r.status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    assert!(r.value.is_nan());

    // Truncating modes clamp to the largest finite value instead.
    let r = largest.add_r(step, Round::TowardZero);
    assert_eq!(r.status, OpStatus::INEXACT);
    assert!(r.value.bitwise_eq(largest));
}

#[test]
fn unsigned_zero_format_has_one_nan_and_one_zero() {
    assert_eq!(IeeeFloat::qnan(&FLOAT8_E5M2FNUZ, None).to_bits(), 0x80);
    assert!(IeeeFloat::from_bits(&FLOAT8_E5M2FNUZ, 0x80).is_nan());

    let zero = IeeeFloat::zero(&FLOAT8_E5M2FNUZ);
    assert!(!(-zero).is_negative());

    let one = IeeeFloat::from_u128(&FLOAT8_E5M2FNUZ, 1).value;
    let diff = (one + -one).value;
    assert!(diff.is_zero());
    assert!(!diff.is_negative());
}

#[test]
fn finite_only_format_saturates_to_largest() {
    let largest = IeeeFloat::largest(&FLOAT4_E2M1FN);
    assert_eq!(largest.to_bits(), 0x7);

    let four = IeeeFloat::from_u128(&FLOAT4_E2M1FN, 4).value;
    let r = four + four;
    assert_eq!(r.status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    assert!(r.value.bitwise_eq(largest));

    let r = four / IeeeFloat::zero(&FLOAT4_E2M1FN);
    assert_eq!(r.status, OpStatus::DIV_BY_ZERO | OpStatus::INVALID_OP);
    assert!(r.value.bitwise_eq(largest));
}

#[test]
fn integer_conversions() {
    let mut exact = true;

    let r = IeeeFloat::from_f64(-1.5).to_i128_r(64, Round::TowardZero, &mut exact);
    assert_eq!(r.status, OpStatus::INEXACT);
    assert!(!exact);
    assert_eq!(r.value, -1);

    let r = IeeeFloat::qnan(&DOUBLE, None).to_i128(64);
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert_eq!(r.value, 0);

    // Out of range values saturate.
    let big = IeeeFloat::from_f64(1.2e30);
    let r = big.to_i128(64);
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert_eq!(r.value, i64::MAX as i128);
    let r = (-big).to_i128(64);
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert_eq!(r.value, i64::MIN as i128);

    let r = IeeeFloat::from_f64(-1.0).to_u128(64);
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert_eq!(r.value, 0);

    // 2^25 + 1 does not fit in a single's 24-bit significand.
    let r = IeeeFloat::from_u128(&SINGLE, (1 << 25) + 1);
    assert_eq!(r.status, OpStatus::INEXACT);
    assert_eq!(r.value.to_bits(), 0x4C00_0000);
}

#[test]
fn minnum_maxnum_prefer_numbers() {
    let one = IeeeFloat::from_f64(1.0);
    let two = IeeeFloat::from_f64(2.0);
    let nan = IeeeFloat::qnan(&DOUBLE, None);

    assert_eq!(one.minnum(two).to_f64(), 1.0);
    assert_eq!(one.maxnum(two).to_f64(), 2.0);
    assert_eq!(one.minnum(nan).to_f64(), 1.0);
    assert_eq!(nan.maxnum(two).to_f64(), 2.0);
    assert!(nan.minnum(nan).is_nan());
}

#[test]
fn exact_inverse() {
    let half = IeeeFloat::from_f64(2.0).get_exact_inverse();
    assert_eq!(half.map(IeeeFloat::to_f64), Some(0.5));

    let two = IeeeFloat::from_f64(0.5).get_exact_inverse();
    assert_eq!(two.map(IeeeFloat::to_f64), Some(2.0));

    assert!(IeeeFloat::from_f64(3.0).get_exact_inverse().is_none());
    assert!(IeeeFloat::zero(&DOUBLE).get_exact_inverse().is_none());
}

#[test]
fn sign_operations() {
    let minus_one = IeeeFloat::from_f64(1.0).copy_sign(IeeeFloat::from_f64(-2.0));
    assert_eq!(minus_one.to_f64(), -1.0);

    assert_eq!(IeeeFloat::from_f64(-3.0).abs().to_f64(), 3.0);

    let z = -IeeeFloat::from_f64(-0.0);
    assert!(z.is_zero());
    assert!(!z.is_negative());
}

#[test]
fn comparison_semantics() {
    let zero = IeeeFloat::zero(&DOUBLE);
    assert_eq!(zero, -zero);

    assert!(IeeeFloat::from_f64(1.0) < IeeeFloat::from_f64(2.0));
    assert!(IeeeFloat::inf(&DOUBLE) > IeeeFloat::largest(&DOUBLE));

    let nan = IeeeFloat::qnan(&DOUBLE, None);
    assert_eq!(nan.partial_cmp(&nan), None);
    assert_ne!(nan, nan);
}

#[test]
fn classification() {
    assert!(IeeeFloat::smallest(&DOUBLE).is_denormal());
    assert!(!IeeeFloat::smallest_normalized(&DOUBLE).is_denormal());

    assert!(IeeeFloat::from_f64(4.0).is_integer());
    assert!(!IeeeFloat::from_f64(0.5).is_integer());
    assert!(!IeeeFloat::inf(&DOUBLE).is_integer());

    assert!(IeeeFloat::largest(&DOUBLE).is_largest());
    assert!(IeeeFloat::smallest(&DOUBLE).is_smallest());
}
