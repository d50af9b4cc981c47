//! Integration tests for literal parsing and decimal formatting.

use oxifloat::sem::{DOUBLE, SINGLE};
use oxifloat::{IeeeFloat, OpStatus, ParseError, Round};

fn parse64(s: &str) -> (u64, OpStatus) {
    let r = IeeeFloat::from_str(&DOUBLE, s).unwrap();
    (r.value.to_bits() as u64, r.status)
}

fn parse32(s: &str) -> (u32, OpStatus) {
    let r = IeeeFloat::from_str(&SINGLE, s).unwrap();
    (r.value.to_bits() as u32, r.status)
}

#[test]
fn decimal_parsing_is_correctly_rounded() {
    assert_eq!(parse64("0.1"), (0x3FB9_9999_9999_999A, OpStatus::INEXACT));
    assert_eq!(parse64("2.2250738585072014e-308"), (0x0010_0000_0000_0000, OpStatus::INEXACT));
    assert_eq!(parse64("1"), (0x3FF0_0000_0000_0000, OpStatus::OK));
    assert_eq!(parse64("-1.25"), (0xBFF4_0000_0000_0000, OpStatus::OK));

    // The single-precision extremes.
    assert_eq!(parse32("1.17549435e-38"), (0x0080_0000, OpStatus::INEXACT));
    assert_eq!(parse32("3.4028235e38"), (0x7F7F_FFFF, OpStatus::INEXACT));
}

#[test]
fn out_of_range_literals_round_not_fail() {
    let (bits, status) = parse32("1e39");
    assert_eq!(status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    assert_eq!(bits, 0x7F80_0000);

    let (bits, status) = parse32("1e-46");
    assert_eq!(status, OpStatus::UNDERFLOW | OpStatus::INEXACT);
    assert_eq!(bits, 0);

    // Halfway into the denormal range still rounds to the smallest value.
    let (bits, status) = parse32("1e-45");
    assert_eq!(status, OpStatus::UNDERFLOW | OpStatus::INEXACT);
    assert_eq!(bits, 0x0000_0001);
}

#[test]
fn directed_rounding_of_literals() {
    let r = IeeeFloat::from_str_r(&DOUBLE, "0.1", Round::TowardZero).unwrap();
    assert_eq!(r.value.to_bits(), 0x3FB9_9999_9999_9999);

    // Toward-negative parsing of a negated literal truncates the magnitude
    // upward.
    let r = IeeeFloat::from_str_r(&DOUBLE, "-0.1", Round::TowardNegative).unwrap();
    assert_eq!(r.value.to_bits(), 0xBFB9_9999_9999_999A);
}

#[test]
fn hexadecimal_literals() {
    assert_eq!(parse64("0x1.921fb54442d18p+1"), (0x4009_21FB_5444_2D18, OpStatus::OK));
    assert_eq!(parse64("0x1p-1074"), (0x0000_0000_0000_0001, OpStatus::OK));
    assert_eq!(parse64("-0x1.8p1"), (0xC008_0000_0000_0000, OpStatus::OK));
}

#[test]
fn special_value_spellings() {
    let r = IeeeFloat::from_str(&DOUBLE, "inf").unwrap();
    assert!(r.value.is_infinite());
    let r = IeeeFloat::from_str(&DOUBLE, "-INFINITY").unwrap();
    assert!(r.value.is_infinite());
    assert!(r.value.is_negative());
    let r = IeeeFloat::from_str(&DOUBLE, "nan").unwrap();
    assert!(r.value.is_nan());
    let r = IeeeFloat::from_str(&DOUBLE, "-NaN").unwrap();
    assert!(r.value.is_nan());
}

#[test]
fn syntax_errors() {
    let cases = [
        ("", ParseError::InvalidLength),
        ("-", ParseError::NoDigits),
        ("1q", ParseError::InvalidSignificandChar),
        ("1e1z", ParseError::InvalidExponentChar),
        ("1.0.0", ParseError::MultipleDots),
        ("0x", ParseError::SignificandNoDigits),
        ("1e", ParseError::ExponentNoDigits),
        ("0x1", ParseError::HexExponentRequired),
    ];
    for (input, expected) in cases {
        assert_eq!(IeeeFloat::from_str(&DOUBLE, input), Err(expected), "{input:?}");
    }
}

#[test]
fn error_messages_are_stable() {
    assert_eq!(
        ParseError::MultipleDots.to_string(),
        "String contains multiple dots"
    );
    assert_eq!(
        ParseError::HexExponentRequired.to_string(),
        "Hex strings require an exponent"
    );
}

#[test]
fn display_formatting() {
    let cases = [
        ("1.5", "1.5"),
        ("100", "100"),
        ("1e10", "1.0E+10"),
        ("0.00625", "0.0062500000000000003"),
        ("-4", "-4"),
        ("0", "0"),
        ("-0", "-0"),
    ];
    for (input, expected) in cases {
        let v = IeeeFloat::from_str(&DOUBLE, input).unwrap().value;
        assert_eq!(v.to_string(), expected, "{input:?}");
    }

    assert_eq!(IeeeFloat::inf(&DOUBLE).to_string(), "+Inf");
    assert_eq!((-IeeeFloat::inf(&DOUBLE)).to_string(), "-Inf");
    assert_eq!(IeeeFloat::qnan(&DOUBLE, None).to_string(), "NaN");
}

#[test]
fn hex_string_output() {
    let rne = Round::NearestTiesToEven;

    assert_eq!(IeeeFloat::from_f64(1.0).to_hex_string(0, false, rne), "0x1p0");
    assert_eq!(IeeeFloat::from_f64(1.5).to_hex_string(0, false, rne), "0x1.8p0");
    assert_eq!(IeeeFloat::from_f64(-0.25).to_hex_string(0, false, rne), "-0x1p-2");
    assert_eq!(
        IeeeFloat::from_f64(std::f64::consts::PI).to_hex_string(0, false, rne),
        "0x1.921fb54442d18p1"
    );

    // The smallest denormal keeps its stored minimum exponent.
    assert_eq!(
        IeeeFloat::from_bits(&DOUBLE, 1).to_hex_string(0, false, rne),
        "0x0.0000000000001p-1022"
    );

    // Requested digit counts pad or round.
    assert_eq!(IeeeFloat::from_f64(1.0).to_hex_string(3, false, rne), "0x1.00p0");
    assert_eq!(IeeeFloat::from_f64(1.5).to_hex_string(1, false, rne), "0x2p0");
    assert_eq!(IeeeFloat::from_f64(1.5).to_hex_string(1, false, Round::TowardZero), "0x1p0");

    assert_eq!(IeeeFloat::from_f64(1.5).to_hex_string(0, true, rne), "0X1.8P0");
    assert_eq!(IeeeFloat::zero(&DOUBLE).to_hex_string(0, false, rne), "0x0p0");
    assert_eq!(IeeeFloat::zero(&DOUBLE).to_hex_string(3, false, rne), "0x0.00p0");
    assert_eq!((-IeeeFloat::inf(&DOUBLE)).to_hex_string(0, false, rne), "-Inf");
    assert_eq!(IeeeFloat::qnan(&DOUBLE, None).to_hex_string(0, true, rne), "NAN");
}

#[test]
fn display_round_trips_inexact_values() {
    for bits in [
        0x3FD3_3333_3333_3334u64, // 0.1 + 0.2
        0x4009_21FB_5444_2D18,    // pi
        0x0000_0000_0000_0001,    // smallest denormal
        0x7FEF_FFFF_FFFF_FFFF,    // largest
    ] {
        let v = IeeeFloat::from_bits(&DOUBLE, bits as u128);
        let back = IeeeFloat::from_str(&DOUBLE, &v.to_string()).unwrap().value;
        assert!(v.bitwise_eq(back), "{bits:#X} printed as {v}");
    }
}
