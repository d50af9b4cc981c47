//! Format descriptors.
//!
//! Every supported interchange format is described by a static [`Semantics`]
//! record; values carry a reference to their descriptor and all arithmetic
//! reads the format parameters from it at runtime. The closed [`Format`]
//! enum names each descriptor and is the only way user code selects a
//! format, so the set of supported formats is fixed at compile time even
//! though dispatch is dynamic.

use crate::ExpInt;

/// How a format behaves at the top of its range.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NonFinite {
    /// Full IEEE-754: both infinities and NaNs are encoded.
    Ieee,
    /// No infinities; the would-be infinity encodings are reclaimed for
    /// finite values and a single NaN remains. Overflow produces NaN.
    NanOnly,
    /// Neither infinities nor NaNs; every encoding is finite. Overflow
    /// saturates to the largest finite value.
    FiniteOnly,
}

/// How a format encodes its NaNs.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NanEncoding {
    /// IEEE-754: exponent all ones, any non-zero trailing significand;
    /// quiet bit is the most significant significand bit.
    Ieee,
    /// The single NaN is the all-ones exponent and all-ones significand
    /// pattern (e.g. Float8E4M3FN). Always quiet.
    AllOnes,
    /// The single NaN is the negative-zero bit pattern; consequently the
    /// format has no signed zero (the FNUZ family). Always quiet.
    NegativeZero,
}

/// Parameters of one floating-point format.
///
/// `precision` counts the significand bits including the integer bit;
/// `max_exp`/`min_exp` are the IEEE-754 `emax`/`emin` (largest exponent of a
/// finite value, smallest exponent of a normalized value). The interchange
/// bias is always `1 - min_exp`.
#[derive(Debug)]
pub struct Semantics {
    pub(crate) min_exp: ExpInt,
    pub(crate) max_exp: ExpInt,
    pub(crate) precision: usize,
    pub(crate) bits: usize,
    pub(crate) non_finite: NonFinite,
    pub(crate) nan_encoding: NanEncoding,
    /// The integer bit is stored explicitly in the interchange format
    /// (x87 80-bit extended precision).
    pub(crate) explicit_int_bit: bool,
}

impl Semantics {
    /// Number of significand bits, integer bit included.
    #[inline]
    #[must_use]
    pub const fn precision(&self) -> usize {
        self.precision
    }

    /// Total number of bits in the interchange encoding.
    #[inline]
    #[must_use]
    pub const fn bits(&self) -> usize {
        self.bits
    }

    /// The largest exponent E such that 2<sup>E</sup> is representable.
    #[inline]
    #[must_use]
    pub const fn max_exponent(&self) -> ExpInt {
        self.max_exp
    }

    /// The smallest exponent E such that 2<sup>E</sup> is normalized.
    #[inline]
    #[must_use]
    pub const fn min_exponent(&self) -> ExpInt {
        self.min_exp
    }

    /// Non-finite behavior of this format.
    #[inline]
    #[must_use]
    pub const fn non_finite(&self) -> NonFinite {
        self.non_finite
    }

    /// NaN encoding style of this format.
    #[inline]
    #[must_use]
    pub const fn nan_encoding(&self) -> NanEncoding {
        self.nan_encoding
    }

    /// Whether infinity encodings exist.
    #[inline]
    #[must_use]
    pub const fn has_infinity(&self) -> bool {
        matches!(self.non_finite, NonFinite::Ieee)
    }

    /// Whether NaN encodings exist.
    #[inline]
    #[must_use]
    pub const fn has_nan(&self) -> bool {
        !matches!(self.non_finite, NonFinite::FiniteOnly)
    }

    /// Whether signaling NaNs are distinguishable from quiet ones.
    #[inline]
    #[must_use]
    pub const fn has_signaling_nan(&self) -> bool {
        self.has_nan() && matches!(self.nan_encoding, NanEncoding::Ieee)
    }

    /// Whether negative zero is representable.
    #[inline]
    #[must_use]
    pub const fn has_signed_zero(&self) -> bool {
        !matches!(self.nan_encoding, NanEncoding::NegativeZero)
    }

    /// Interchange exponent bias.
    #[inline]
    pub(crate) const fn bias(&self) -> ExpInt {
        1 - self.min_exp
    }

    /// Number of exponent bits in the interchange encoding.
    #[inline]
    pub(crate) const fn exponent_bits(&self) -> usize {
        if self.explicit_int_bit {
            self.bits - self.precision - 1
        } else {
            self.bits - self.precision
        }
    }

    /// The significand bit that marks a NaN as quiet.
    #[inline]
    pub(crate) const fn qnan_bit(&self) -> usize {
        self.precision - 2
    }
}

macro_rules! semantics {
    ($($(#[$attr:meta])* $name:ident = {
        $min:expr, $max:expr, $prec:expr, $bits:expr,
        $nonfinite:ident, $nan:ident $(, $x87:ident)?
    };)*) => {
        $(
            $(#[$attr])*
            pub static $name: Semantics = Semantics {
                min_exp: $min,
                max_exp: $max,
                precision: $prec,
                bits: $bits,
                non_finite: NonFinite::$nonfinite,
                nan_encoding: NanEncoding::$nan,
                explicit_int_bit: semantics!(@x87 $($x87)?),
            };
        )*
    };
    (@x87 explicit_int_bit) => { true };
    (@x87) => { false };
}

semantics! {
    /// IEEE-754 binary16.
    HALF = { -14, 15, 11, 16, Ieee, Ieee };
    /// bfloat16: binary32 range at 8 bits of precision.
    BFLOAT = { -126, 127, 8, 16, Ieee, Ieee };
    /// IEEE-754 binary32.
    SINGLE = { -126, 127, 24, 32, Ieee, Ieee };
    /// IEEE-754 binary64.
    DOUBLE = { -1022, 1023, 53, 64, Ieee, Ieee };
    /// IEEE-754 binary128.
    QUAD = { -16382, 16383, 113, 128, Ieee, Ieee };
    /// x87 80-bit extended precision, with its explicit integer bit.
    X87_DOUBLE_EXTENDED = { -16382, 16383, 64, 80, Ieee, Ieee, explicit_int_bit };
    /// 8-bit, 5 exponent bits, 2 significand bits.
    FLOAT8_E5M2 = { -14, 15, 3, 8, Ieee, Ieee };
    /// 8-bit E5M2 without infinities or signed zero; NaN is the sign bit.
    FLOAT8_E5M2FNUZ = { -15, 15, 3, 8, NanOnly, NegativeZero };
    /// 8-bit, 4 exponent bits, 3 significand bits, full IEEE behavior.
    FLOAT8_E4M3 = { -6, 7, 4, 8, Ieee, Ieee };
    /// 8-bit E4M3 without infinities; all-ones is the single NaN.
    FLOAT8_E4M3FN = { -6, 8, 4, 8, NanOnly, AllOnes };
    /// 8-bit E4M3 without infinities or signed zero; NaN is the sign bit.
    FLOAT8_E4M3FNUZ = { -7, 7, 4, 8, NanOnly, NegativeZero };
    /// Float8E4M3FNUZ with bias 11 instead of 8.
    FLOAT8_E4M3B11FNUZ = { -10, 4, 4, 8, NanOnly, NegativeZero };
    /// 8-bit, 3 exponent bits, 4 significand bits.
    FLOAT8_E3M4 = { -2, 3, 5, 8, Ieee, Ieee };
    /// NVIDIA TF32: binary32 range at 11 bits of precision in 19 bits.
    FLOAT_TF32 = { -126, 127, 11, 19, Ieee, Ieee };
    /// 6-bit, 3 exponent bits, 2 significand bits; every encoding finite.
    FLOAT6_E3M2FN = { -2, 4, 3, 6, FiniteOnly, Ieee };
    /// 6-bit, 2 exponent bits, 3 significand bits; every encoding finite.
    FLOAT6_E2M3FN = { 0, 2, 4, 6, FiniteOnly, Ieee };
    /// 4-bit, 2 exponent bits, 1 significand bit; every encoding finite.
    FLOAT4_E2M1FN = { 0, 2, 2, 4, FiniteOnly, Ieee };
    /// The scalar view of PowerPC double-double: 106 consecutive significand
    /// bits with binary64 range. Also used internally by the paired
    /// composite for its division-class operations.
    PPC_DOUBLE_DOUBLE = { -1022 + 53, 1023, 53 + 53, 128, Ieee, Ieee };
}

/// The closed set of supported formats.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// IEEE-754 binary16.
    Half,
    /// bfloat16.
    BFloat,
    /// IEEE-754 binary32.
    Single,
    /// IEEE-754 binary64.
    Double,
    /// IEEE-754 binary128.
    Quad,
    /// x87 80-bit extended precision.
    X87DoubleExtended,
    /// 8-bit E5M2.
    Float8E5M2,
    /// 8-bit E5M2, finite + NaN, unsigned zero.
    Float8E5M2FNUZ,
    /// 8-bit E4M3.
    Float8E4M3,
    /// 8-bit E4M3, finite + NaN.
    Float8E4M3FN,
    /// 8-bit E4M3, finite + NaN, unsigned zero.
    Float8E4M3FNUZ,
    /// 8-bit E4M3 with bias 11, finite + NaN, unsigned zero.
    Float8E4M3B11FNUZ,
    /// 8-bit E3M4.
    Float8E3M4,
    /// NVIDIA TF32.
    FloatTF32,
    /// 6-bit E3M2, finite only.
    Float6E3M2FN,
    /// 6-bit E2M3, finite only.
    Float6E2M3FN,
    /// 4-bit E2M1, finite only.
    Float4E2M1FN,
    /// PowerPC double-double (a pair of binary64 values).
    PpcDoubleDouble,
}

impl Format {
    /// Every supported format.
    pub const ALL: [Format; 18] = [
        Format::Half,
        Format::BFloat,
        Format::Single,
        Format::Double,
        Format::Quad,
        Format::X87DoubleExtended,
        Format::Float8E5M2,
        Format::Float8E5M2FNUZ,
        Format::Float8E4M3,
        Format::Float8E4M3FN,
        Format::Float8E4M3FNUZ,
        Format::Float8E4M3B11FNUZ,
        Format::Float8E3M4,
        Format::FloatTF32,
        Format::Float6E3M2FN,
        Format::Float6E2M3FN,
        Format::Float4E2M1FN,
        Format::PpcDoubleDouble,
    ];

    /// The descriptor for this format.
    ///
    /// For [`Format::PpcDoubleDouble`] this is the 106-bit scalar view; the
    /// [`Float`](crate::Float) facade routes that format to the paired
    /// composite representation instead.
    #[must_use]
    pub const fn semantics(self) -> &'static Semantics {
        match self {
            Format::Half => &HALF,
            Format::BFloat => &BFLOAT,
            Format::Single => &SINGLE,
            Format::Double => &DOUBLE,
            Format::Quad => &QUAD,
            Format::X87DoubleExtended => &X87_DOUBLE_EXTENDED,
            Format::Float8E5M2 => &FLOAT8_E5M2,
            Format::Float8E5M2FNUZ => &FLOAT8_E5M2FNUZ,
            Format::Float8E4M3 => &FLOAT8_E4M3,
            Format::Float8E4M3FN => &FLOAT8_E4M3FN,
            Format::Float8E4M3FNUZ => &FLOAT8_E4M3FNUZ,
            Format::Float8E4M3B11FNUZ => &FLOAT8_E4M3B11FNUZ,
            Format::Float8E3M4 => &FLOAT8_E3M4,
            Format::FloatTF32 => &FLOAT_TF32,
            Format::Float6E3M2FN => &FLOAT6_E3M2FN,
            Format::Float6E2M3FN => &FLOAT6_E2M3FN,
            Format::Float4E2M1FN => &FLOAT4_E2M1FN,
            Format::PpcDoubleDouble => &PPC_DOUBLE_DOUBLE,
        }
    }

    /// Recovers the format a descriptor belongs to.
    pub(crate) fn of(sem: &'static Semantics) -> Format {
        for format in Format::ALL {
            if core::ptr::eq(format.semantics(), sem) {
                return format;
            }
        }
        unreachable!("descriptor does not belong to a known format")
    }
}
