//! Integration tests for the PowerPC paired-double composite format.

use oxifloat::{DoubleDouble, OpStatus, Round};

fn dd(hi: u64, lo: u64) -> DoubleDouble {
    DoubleDouble::from_bits(((lo as u128) << 64) | hi as u128)
}

fn bits(v: DoubleDouble) -> (u64, u64) {
    let b = v.to_bits();
    (b as u64, (b >> 64) as u64)
}

#[test]
fn addition_keeps_the_residue() {
    // 1 + 2^-105 is exact in 106 bits but not in 53, so the rounded
    // high part reports inexact even though the residue recovers it.
    let one = dd(0x3FF0_0000_0000_0000, 0);
    let tiny = dd(0x3960_0000_0000_0000, 0);

    let r = one + tiny;
    assert_eq!(r.status, OpStatus::INEXACT);
    assert_eq!(bits(r.value), (0x3FF0_0000_0000_0000, 0x3960_0000_0000_0000));
}

#[test]
fn multiplication_uses_the_component_products() {
    // (1 + 2^-53)^2; the b*d term is below the composite's precision.
    let x = dd(0x3FF0_0000_0000_0000, 0x3CA0_0000_0000_0000);
    let r = x * x;
    assert_eq!(bits(r.value), (0x3FF0_0000_0000_0001, 0));
}

#[test]
fn division_through_the_wide_view() {
    let one = DoubleDouble::from_u128(1).value;
    let three = DoubleDouble::from_u128(3).value;

    let r = one / three;
    assert_eq!(r.status, OpStatus::INEXACT);
    assert_eq!(bits(r.value), (0x3FD5_5555_5555_5555, 0x3C75_5555_5555_5556));
}

#[test]
fn remainder_is_sterbenz_exact() {
    // 3*(1 + 2^-53) rem 1.25*(1 + 2^-53) = 0.5*(1 + 2^-53).
    let a = dd(0x4008_0000_0000_0000, 0x3CB8_0000_0000_0000);
    let b = dd(0x3FF4_0000_0000_0000, 0x3CA4_0000_0000_0000);
    let r = a.ieee_rem(b);
    assert_eq!(bits(r.value), (0x3FE0_0000_0000_0000, 0x3C90_0000_0000_0000));

    // With divisor 1.75*(1 + 2^-53) the nearest quotient is 2, so the
    // remainder comes out negative.
    let b = dd(0x3FFC_0000_0000_0000, 0x3CAC_0000_0000_0000);
    let r = a.ieee_rem(b);
    assert_eq!(bits(r.value), (0xBFE0_0000_0000_0000, 0xBC90_0000_0000_0000));

    // fmod truncates instead: 3(1+e) mod 1.75(1+e) = 1.25(1+e), which
    // re-splits with an upward-rounded head.
    let r = a.c_fmod(b);
    assert_eq!(bits(r.value), (0x3FF4_0000_0000_0001, 0xBC98_0000_0000_0000));
}

#[test]
fn special_values() {
    let inf = DoubleDouble::inf();
    let nan = DoubleDouble::qnan(None);
    let one = DoubleDouble::from_u128(1).value;

    assert!(inf.is_infinite());
    assert!(nan.is_nan());
    assert!(DoubleDouble::snan(None).is_signaling());

    let r = inf + -inf;
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());

    let r = one / DoubleDouble::zero();
    assert_eq!(r.status, OpStatus::DIV_BY_ZERO);
    assert!(r.value.is_infinite());

    let r = DoubleDouble::zero() * inf;
    assert_eq!(r.status, OpStatus::INVALID_OP);
    assert!(r.value.is_nan());
}

#[test]
fn next_up_steps_by_the_composite_ulp() {
    let one = DoubleDouble::from_u128(1).value;
    let r = one.next_up();
    assert_eq!(bits(r.value), (0x3FF0_0000_0000_0000, 0x3960_0000_0000_0000));
}

#[test]
fn rounding_sees_the_low_component() {
    // 2.5 + 2^-104 is above the tie, so it rounds up to 3.
    let v = dd(0x4004_0000_0000_0000, 0x3970_0000_0000_0000);
    let r = v.round_to_integral(Round::NearestTiesToEven);
    assert_eq!(r.status, OpStatus::INEXACT);
    assert_eq!(bits(r.value), (0x4008_0000_0000_0000, 0));

    // Without the residue the tie goes to even.
    let v = dd(0x4004_0000_0000_0000, 0);
    let r = v.round_to_integral(Round::NearestTiesToEven);
    assert_eq!(bits(r.value), (0x4000_0000_0000_0000, 0));
}

#[test]
fn ordering_consults_both_components() {
    let a = dd(0x3FF0_0000_0000_0000, 0x3960_0000_0000_0000);
    let b = dd(0x3FF0_0000_0000_0000, 0);
    assert!(a > b);
    assert_eq!(b, b);

    let nan = DoubleDouble::qnan(None);
    assert_eq!(nan.partial_cmp(&nan), None);
}

#[test]
fn integer_and_string_conversions() {
    // 2^64 + 3 fits the composite exactly as two widely-split doubles.
    let v = DoubleDouble::from_u128((1 << 64) + 3).value;
    assert_eq!(bits(v), (0x43F0_0000_0000_0000, 0x4008_0000_0000_0000));
    let mut exact = false;
    let n = v.to_u128_r(128, Round::TowardZero, &mut exact);
    assert!(exact);
    assert_eq!(n.value, (1 << 64) + 3);

    let r = DoubleDouble::from_str("1.5").unwrap();
    assert_eq!(r.status, OpStatus::OK);
    assert_eq!(bits(r.value), (0x3FF8_0000_0000_0000, 0));
    assert_eq!(r.value.to_string(), "1.5");
}

#[test]
fn scalbn_and_frexp_are_componentwise() {
    let v = dd(0x3FF0_0000_0000_0000, 0x3960_0000_0000_0000);

    let scaled = v.scalbn(1);
    assert_eq!(bits(scaled), (0x4000_0000_0000_0000, 0x3970_0000_0000_0000));

    let mut exp = 0;
    let frac = DoubleDouble::from_u128(8).value.frexp(&mut exp);
    assert_eq!(exp, 4);
    assert_eq!(bits(frac), (0x3FE0_0000_0000_0000, 0));
}

#[test]
fn conversion_through_the_float_facade() {
    use oxifloat::{Float, Format};

    let v = Float::from_str(Format::Double, "1.5").unwrap().value;
    let mut loses_info = true;
    let r = v.convert(Format::PpcDoubleDouble, &mut loses_info);
    assert_eq!(r.status, OpStatus::OK);
    assert!(!loses_info);
    assert_eq!(r.value.to_bits(), 0x3FF8_0000_0000_0000);

    let back = r.value.convert(Format::Single, &mut loses_info);
    assert_eq!(back.value.to_bits(), 0x3FC0_0000);
}

#[test]
fn denormal_means_unrepresentable_as_a_sum() {
    // A pair whose exact sum cannot be re-split canonically.
    let v = dd(0x3FF0_0000_0000_0000, 0x3FF0_0000_0000_0000);
    assert!(v.is_denormal());

    let canonical = dd(0x4000_0000_0000_0000, 0);
    assert!(!canonical.is_denormal());
}
