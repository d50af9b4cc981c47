//! The format-dispatching facade.
//!
//! [`Float`] wraps either scalar or paired-double storage behind one value
//! type, chosen by the [`Format`] passed to its constructors. Operations on
//! mixed representations are a programming error and panic.

use crate::double_double::DoubleDouble;
use crate::error::ParseError;
use crate::ieee::IeeeFloat;
use crate::rounding::Round;
use crate::sem::Semantics;
use crate::status::{OpStatus, StatusAnd};
use crate::{Category, ExpInt, Format};
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// A floating-point value of any supported [`Format`].
#[must_use]
#[derive(Copy, Clone)]
pub enum Float {
    /// Scalar storage, used by every format except the paired double.
    Ieee(IeeeFloat),
    /// Paired-double storage.
    DoubleDouble(DoubleDouble),
}

/// Matches a pair of operands onto the same representation.
macro_rules! match_pair {
    ($lhs:expr, $rhs:expr, |$a:ident, $b:ident| $e:expr) => {
        match ($lhs, $rhs) {
            (Float::Ieee($a), Float::Ieee($b)) => $e,
            (Float::DoubleDouble($a), Float::DoubleDouble($b)) => $e,
            _ => panic!("mismatched floating-point formats"),
        }
    };
}

/// Applies an operation to whichever representation is inside, rewrapping
/// the result.
macro_rules! dispatch {
    ($self:expr, |$x:ident| $e:expr) => {
        match $self {
            Float::Ieee($x) => Float::Ieee($e),
            Float::DoubleDouble($x) => Float::DoubleDouble($e),
        }
    };
}

/// Like `dispatch!` for operations returning `StatusAnd`.
macro_rules! dispatch_status {
    ($self:expr, |$x:ident| $e:expr) => {
        match $self {
            Float::Ieee($x) => $e.map(Float::Ieee),
            Float::DoubleDouble($x) => $e.map(Float::DoubleDouble),
        }
    };
}

/// Forwards a query to whichever representation is inside.
macro_rules! forward {
    ($self:expr, |$x:ident| $e:expr) => {
        match $self {
            Float::Ieee($x) => $e,
            Float::DoubleDouble($x) => $e,
        }
    };
}

impl Float {
    /// Positive zero of the given format.
    pub fn zero(format: Format) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::zero()),
            _ => Float::Ieee(IeeeFloat::zero(format.semantics())),
        }
    }

    /// Positive infinity of the given format, or its stand-in where the
    /// format has no infinities.
    pub fn inf(format: Format) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::inf()),
            _ => Float::Ieee(IeeeFloat::inf(format.semantics())),
        }
    }

    /// A quiet NaN of the given format, with an optional payload.
    pub fn qnan(format: Format, payload: Option<u128>) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::qnan(payload)),
            _ => Float::Ieee(IeeeFloat::qnan(format.semantics(), payload)),
        }
    }

    /// A signaling NaN of the given format, with an optional payload.
    pub fn snan(format: Format, payload: Option<u128>) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::snan(payload)),
            _ => Float::Ieee(IeeeFloat::snan(format.semantics(), payload)),
        }
    }

    /// The largest finite value of the given format.
    pub fn largest(format: Format) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::largest()),
            _ => Float::Ieee(IeeeFloat::largest(format.semantics())),
        }
    }

    /// The smallest positive value of the given format.
    pub fn smallest(format: Format) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::smallest()),
            _ => Float::Ieee(IeeeFloat::smallest(format.semantics())),
        }
    }

    /// The smallest positive value with a full-precision significand.
    pub fn smallest_normalized(format: Format) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::smallest_normalized()),
            _ => Float::Ieee(IeeeFloat::smallest_normalized(format.semantics())),
        }
    }

    /// The format of this value.
    pub fn format(&self) -> Format {
        match self {
            Float::Ieee(x) => x.format(),
            Float::DoubleDouble(_) => Format::PpcDoubleDouble,
        }
    }

    /// The format descriptor of this value.
    pub fn semantics(&self) -> &'static Semantics {
        self.format().semantics()
    }

    /// The category of this value.
    pub fn category(&self) -> Category {
        forward!(self, |x| x.category())
    }

    /// Whether the sign bit is set.
    pub fn is_negative(&self) -> bool {
        forward!(self, |x| x.is_negative())
    }

    /// Whether this is a zero of either sign.
    pub fn is_zero(&self) -> bool {
        forward!(self, |x| x.is_zero())
    }

    /// Whether this is an infinity of either sign.
    pub fn is_infinite(&self) -> bool {
        forward!(self, |x| x.is_infinite())
    }

    /// Whether this is any NaN.
    pub fn is_nan(&self) -> bool {
        forward!(self, |x| x.is_nan())
    }

    /// Whether this is a signaling NaN.
    pub fn is_signaling(&self) -> bool {
        forward!(self, |x| x.is_signaling())
    }

    /// Whether this is zero, subnormal or normal.
    pub fn is_finite(&self) -> bool {
        forward!(self, |x| x.is_finite())
    }

    /// Whether this is subnormal or normal.
    pub fn is_finite_non_zero(&self) -> bool {
        forward!(self, |x| x.is_finite_non_zero())
    }

    /// Whether this is a subnormal value.
    pub fn is_denormal(&self) -> bool {
        forward!(self, |x| x.is_denormal())
    }

    /// Whether this is a nonzero finite value at full precision.
    pub fn is_normal(&self) -> bool {
        forward!(self, |x| x.is_normal())
    }

    /// Whether the magnitude equals the smallest positive value.
    pub fn is_smallest(&self) -> bool {
        forward!(self, |x| x.is_smallest())
    }

    /// Whether the magnitude equals the largest finite value.
    pub fn is_largest(&self) -> bool {
        forward!(self, |x| x.is_largest())
    }

    /// Whether the value is a finite integer.
    pub fn is_integer(&self) -> bool {
        forward!(self, |x| x.is_integer())
    }

    /// Exact structural equality, distinguishing zero signs and NaNs.
    pub fn bitwise_eq(self, rhs: Self) -> bool {
        match_pair!(self, rhs, |a, b| a.bitwise_eq(b))
    }

    /// The value with the sign of `rhs`.
    pub fn copy_sign(self, rhs: Self) -> Self {
        if self.is_negative() != rhs.is_negative() { -self } else { self }
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        if self.is_negative() { -self } else { self }
    }

    /// `self + rhs`, rounding as directed.
    pub fn add_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        match_pair!(self, rhs, |a, b| a.add_r(b, round).map(Self::from))
    }

    /// `self - rhs`, rounding as directed.
    pub fn sub_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        self.add_r(-rhs, round)
    }

    /// `self * rhs`, rounding as directed.
    pub fn mul_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        match_pair!(self, rhs, |a, b| a.mul_r(b, round).map(Self::from))
    }

    /// `self / rhs`, rounding as directed.
    pub fn div_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        match_pair!(self, rhs, |a, b| a.div_r(b, round).map(Self::from))
    }

    /// Fused `self * multiplicand + addend` with a single final rounding.
    pub fn mul_add_r(self, multiplicand: Self, addend: Self, round: Round) -> StatusAnd<Self> {
        match (self, multiplicand, addend) {
            (Float::Ieee(a), Float::Ieee(b), Float::Ieee(c)) => {
                a.mul_add_r(b, c, round).map(Self::from)
            }
            (Float::DoubleDouble(a), Float::DoubleDouble(b), Float::DoubleDouble(c)) => {
                a.mul_add_r(b, c, round).map(Self::from)
            }
            _ => panic!("mismatched floating-point formats"),
        }
    }

    /// Fused multiply-add with default rounding.
    pub fn mul_add(self, multiplicand: Self, addend: Self) -> StatusAnd<Self> {
        self.mul_add_r(multiplicand, addend, Round::NearestTiesToEven)
    }

    /// C-style `fmod`.
    pub fn c_fmod(self, rhs: Self) -> StatusAnd<Self> {
        match_pair!(self, rhs, |a, b| a.c_fmod(b).map(Self::from))
    }

    /// IEEE-754 `remainder`.
    pub fn ieee_rem(self, rhs: Self) -> StatusAnd<Self> {
        match_pair!(self, rhs, |a, b| a.ieee_rem(b).map(Self::from))
    }

    /// Rounds to an integral value, staying in the same format.
    pub fn round_to_integral(self, round: Round) -> StatusAnd<Self> {
        dispatch_status!(self, |x| x.round_to_integral(round))
    }

    /// The least value that compares greater than `self`.
    pub fn next_up(self) -> StatusAnd<Self> {
        dispatch_status!(self, |x| x.next_up())
    }

    /// The greatest value that compares less than `self`.
    pub fn next_down(self) -> StatusAnd<Self> {
        dispatch_status!(self, |x| x.next_down())
    }

    /// The smaller operand, preferring a number over a NaN.
    pub fn minnum(self, rhs: Self) -> Self {
        match_pair!(self, rhs, |a, b| Self::from(a.minnum(b)))
    }

    /// The larger operand, preferring a number over a NaN.
    pub fn maxnum(self, rhs: Self) -> Self {
        match_pair!(self, rhs, |a, b| Self::from(a.maxnum(b)))
    }

    /// The unbiased exponent, or an `IEK_*` sentinel.
    pub fn ilogb(&self) -> ExpInt {
        forward!(self, |x| x.ilogb())
    }

    /// `self * 2^exp`, rounding as directed.
    pub fn scalbn_r(self, exp: ExpInt, round: Round) -> Self {
        dispatch!(self, |x| x.scalbn_r(exp, round))
    }

    /// `self * 2^exp` with default rounding.
    pub fn scalbn(self, exp: ExpInt) -> Self {
        self.scalbn_r(exp, Round::NearestTiesToEven)
    }

    /// Decomposes into a fraction in +/-[0.5, 1.0) and a power of two.
    pub fn frexp_r(self, exp: &mut ExpInt, round: Round) -> Self {
        dispatch!(self, |x| x.frexp_r(exp, round))
    }

    /// [`frexp_r`](Self::frexp_r) with default rounding.
    pub fn frexp(self, exp: &mut ExpInt) -> Self {
        self.frexp_r(exp, Round::NearestTiesToEven)
    }

    /// Converts to another format, rounding as directed. `loses_info` is
    /// set when the result is not numerically identical to the input.
    pub fn convert_r(self, to: Format, round: Round, loses_info: &mut bool) -> StatusAnd<Self> {
        match (self, to) {
            (Float::Ieee(x), Format::PpcDoubleDouble) => x
                .convert_r(Format::PpcDoubleDouble.semantics(), round, loses_info)
                .map(|w| Float::DoubleDouble(DoubleDouble::from_wide(w))),
            (Float::Ieee(x), _) => {
                x.convert_r(to.semantics(), round, loses_info).map(Float::Ieee)
            }
            (Float::DoubleDouble(x), Format::PpcDoubleDouble) => {
                *loses_info = false;
                OpStatus::OK.and(Float::DoubleDouble(x))
            }
            (Float::DoubleDouble(x), _) => x
                .to_wide()
                .convert_r(to.semantics(), round, loses_info)
                .map(Float::Ieee),
        }
    }

    /// [`convert_r`](Self::convert_r) with default rounding.
    pub fn convert(self, to: Format, loses_info: &mut bool) -> StatusAnd<Self> {
        self.convert_r(to, Round::NearestTiesToEven, loses_info)
    }

    /// Reconstructs a value from its interchange encoding.
    pub fn from_bits(format: Format, input: u128) -> Self {
        match format {
            Format::PpcDoubleDouble => Float::DoubleDouble(DoubleDouble::from_bits(input)),
            _ => Float::Ieee(IeeeFloat::from_bits(format.semantics(), input)),
        }
    }

    /// The interchange encoding of the value.
    pub fn to_bits(self) -> u128 {
        forward!(self, |x| x.to_bits())
    }

    /// A [`Format::Single`] value with the bits of a hardware `f32`.
    pub fn from_f32(input: f32) -> Self {
        Float::Ieee(IeeeFloat::from_f32(input))
    }

    /// A [`Format::Double`] value with the bits of a hardware `f64`.
    pub fn from_f64(input: f64) -> Self {
        Float::Ieee(IeeeFloat::from_f64(input))
    }

    /// Converts an unsigned integer, rounding as directed.
    pub fn from_u128_r(format: Format, input: u128, round: Round) -> StatusAnd<Self> {
        match format {
            Format::PpcDoubleDouble => {
                DoubleDouble::from_u128_r(input, round).map(Float::DoubleDouble)
            }
            _ => IeeeFloat::from_u128_r(format.semantics(), input, round).map(Float::Ieee),
        }
    }

    /// Converts an unsigned integer with default rounding.
    pub fn from_u128(format: Format, input: u128) -> StatusAnd<Self> {
        Self::from_u128_r(format, input, Round::NearestTiesToEven)
    }

    /// Converts a signed integer, rounding as directed.
    pub fn from_i128_r(format: Format, input: i128, round: Round) -> StatusAnd<Self> {
        match format {
            Format::PpcDoubleDouble => {
                DoubleDouble::from_i128_r(input, round).map(Float::DoubleDouble)
            }
            _ => IeeeFloat::from_i128_r(format.semantics(), input, round).map(Float::Ieee),
        }
    }

    /// Converts a signed integer with default rounding.
    pub fn from_i128(format: Format, input: i128) -> StatusAnd<Self> {
        Self::from_i128_r(format, input, Round::NearestTiesToEven)
    }

    /// Converts to an unsigned integer of the given bit `width`, rounding
    /// as directed, saturating on overflow.
    pub fn to_u128_r(self, width: usize, round: Round, is_exact: &mut bool) -> StatusAnd<u128> {
        forward!(self, |x| x.to_u128_r(width, round, is_exact))
    }

    /// Converts to an unsigned integer, truncating.
    pub fn to_u128(self, width: usize) -> StatusAnd<u128> {
        self.to_u128_r(width, Round::TowardZero, &mut true)
    }

    /// Converts to a signed integer of the given bit `width`, rounding as
    /// directed, saturating on overflow.
    pub fn to_i128_r(self, width: usize, round: Round, is_exact: &mut bool) -> StatusAnd<i128> {
        forward!(self, |x| x.to_i128_r(width, round, is_exact))
    }

    /// Converts to a signed integer, truncating.
    pub fn to_i128(self, width: usize) -> StatusAnd<i128> {
        self.to_i128_r(width, Round::TowardZero, &mut true)
    }

    /// Parses a literal in the given format, rounding as directed.
    pub fn from_str_r(
        format: Format,
        s: &str,
        round: Round,
    ) -> Result<StatusAnd<Self>, ParseError> {
        match format {
            Format::PpcDoubleDouble => {
                DoubleDouble::from_str_r(s, round).map(|r| r.map(Float::DoubleDouble))
            }
            _ => IeeeFloat::from_str_r(format.semantics(), s, round).map(|r| r.map(Float::Ieee)),
        }
    }

    /// Parses a literal with default rounding.
    pub fn from_str(format: Format, s: &str) -> Result<StatusAnd<Self>, ParseError> {
        Self::from_str_r(format, s, Round::NearestTiesToEven)
    }

    /// Formats in C99 `%a` hexadecimal style.
    pub fn to_hex_string(&self, hex_digits: usize, upper_case: bool, round: Round) -> String {
        match self {
            Float::Ieee(x) => x.to_hex_string(hex_digits, upper_case, round),
            Float::DoubleDouble(x) => x.to_hex_string(hex_digits, upper_case, round),
        }
    }
}

impl From<IeeeFloat> for Float {
    fn from(x: IeeeFloat) -> Self {
        Float::Ieee(x)
    }
}

impl From<DoubleDouble> for Float {
    fn from(x: DoubleDouble) -> Self {
        Float::DoubleDouble(x)
    }
}

impl Neg for Float {
    type Output = Self;
    fn neg(self) -> Self {
        dispatch!(self, |x| -x)
    }
}

impl PartialEq for Float {
    fn eq(&self, rhs: &Self) -> bool {
        self.partial_cmp(rhs) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Float {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        match (self, rhs) {
            (Float::Ieee(a), Float::Ieee(b)) => a.partial_cmp(b),
            (Float::DoubleDouble(a), Float::DoubleDouble(b)) => a.partial_cmp(b),
            _ => panic!("mismatched floating-point formats"),
        }
    }
}

impl Add for Float {
    type Output = StatusAnd<Self>;
    fn add(self, rhs: Self) -> StatusAnd<Self> {
        self.add_r(rhs, Round::NearestTiesToEven)
    }
}

impl Sub for Float {
    type Output = StatusAnd<Self>;
    fn sub(self, rhs: Self) -> StatusAnd<Self> {
        self.sub_r(rhs, Round::NearestTiesToEven)
    }
}

impl Mul for Float {
    type Output = StatusAnd<Self>;
    fn mul(self, rhs: Self) -> StatusAnd<Self> {
        self.mul_r(rhs, Round::NearestTiesToEven)
    }
}

impl Div for Float {
    type Output = StatusAnd<Self>;
    fn div(self, rhs: Self) -> StatusAnd<Self> {
        self.div_r(rhs, Round::NearestTiesToEven)
    }
}

impl Rem for Float {
    type Output = StatusAnd<Self>;
    fn rem(self, rhs: Self) -> StatusAnd<Self> {
        self.c_fmod(rhs)
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Float::Ieee(x) => fmt::Display::fmt(x, f),
            Float::DoubleDouble(x) => fmt::Display::fmt(x, f),
        }
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Float::Ieee(x) => fmt::Debug::fmt(x, f),
            Float::DoubleDouble(x) => fmt::Debug::fmt(x, f),
        }
    }
}
