//! The paired-double composite format.
//!
//! [`DoubleDouble`] represents a number as an unevaluated sum of two
//! binary64 values, the way PowerPC "double-double" long doubles do. The
//! high part is the value correctly rounded to double; the low part holds
//! the residue, giving 106 and sometimes far more effective significand
//! bits while keeping the double exponent range.
//!
//! Addition, subtraction and multiplication run Dekker-style compensated
//! component algorithms and are accurate in both parts. The remaining
//! operations go through a 106-bit scalar view: the pair is flattened into
//! an [`IeeeFloat`] with the [`PPC_DOUBLE_DOUBLE`] descriptor, the scalar
//! engine does the work, and the result is split back into components.

use crate::ieee::IeeeFloat;
use crate::error::ParseError;
use crate::rounding::Round;
use crate::sem::{DOUBLE, PPC_DOUBLE_DOUBLE};
use crate::status::{unpack, OpStatus, StatusAnd};
use crate::{Category, ExpInt, Format};
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Interchange encoding of the largest finite low component,
/// `(2^106 - 2^52) * 2^918`.
const LARGEST_LO_BITS: u128 = 0x7C8F_FFFF_FFFF_FFFE;

/// Interchange encoding of the largest finite high component.
const LARGEST_HI_BITS: u128 = 0x7FEF_FFFF_FFFF_FFFF;

/// Interchange encoding of `2^-969`, the smallest value whose full
/// 106-bit significand is representable.
const SMALLEST_NORMALIZED_HI_BITS: u128 = 0x0360_0000_0000_0000;

/// A number held as the unevaluated sum of two binary64 values.
///
/// The category and sign of the pair are those of the high part; the low
/// part is meaningless unless the value is finite and non-zero.
#[must_use]
#[derive(Copy, Clone)]
pub struct DoubleDouble {
    hi: IeeeFloat,
    lo: IeeeFloat,
}

impl DoubleDouble {
    fn new(hi: IeeeFloat, lo: IeeeFloat) -> Self {
        DoubleDouble { hi, lo }
    }

    /// Positive zero.
    pub fn zero() -> Self {
        Self::new(IeeeFloat::zero(&DOUBLE), IeeeFloat::zero(&DOUBLE))
    }

    /// Positive infinity.
    pub fn inf() -> Self {
        Self::new(IeeeFloat::inf(&DOUBLE), IeeeFloat::zero(&DOUBLE))
    }

    /// A quiet NaN carried in the high part.
    pub fn qnan(payload: Option<u128>) -> Self {
        Self::new(IeeeFloat::qnan(&DOUBLE, payload), IeeeFloat::zero(&DOUBLE))
    }

    /// A signaling NaN carried in the high part.
    pub fn snan(payload: Option<u128>) -> Self {
        Self::new(IeeeFloat::snan(&DOUBLE, payload), IeeeFloat::zero(&DOUBLE))
    }

    /// The largest finite value: both components at their maxima.
    pub fn largest() -> Self {
        Self::new(
            IeeeFloat::from_bits(&DOUBLE, LARGEST_HI_BITS),
            IeeeFloat::from_bits(&DOUBLE, LARGEST_LO_BITS),
        )
    }

    /// The smallest positive value, a bare double subnormal.
    pub fn smallest() -> Self {
        Self::new(IeeeFloat::smallest(&DOUBLE), IeeeFloat::zero(&DOUBLE))
    }

    /// The smallest positive value with a full-width significand.
    pub fn smallest_normalized() -> Self {
        Self::new(
            IeeeFloat::from_bits(&DOUBLE, SMALLEST_NORMALIZED_HI_BITS),
            IeeeFloat::zero(&DOUBLE),
        )
    }

    /// The format this type implements.
    pub fn format(&self) -> Format {
        Format::PpcDoubleDouble
    }

    /// The high component.
    #[inline]
    pub fn hi(&self) -> IeeeFloat {
        self.hi
    }

    /// The low component.
    #[inline]
    pub fn lo(&self) -> IeeeFloat {
        self.lo
    }

    /// The category of the pair, which is the category of the high part.
    #[inline]
    pub fn category(self) -> Category {
        self.hi.category()
    }

    /// Whether the sign bit is set.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.hi.is_negative()
    }

    /// Whether this is a zero of either sign.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.hi.is_zero()
    }

    /// Whether this is an infinity of either sign.
    #[inline]
    pub fn is_infinite(self) -> bool {
        self.hi.is_infinite()
    }

    /// Whether this is any NaN.
    #[inline]
    pub fn is_nan(self) -> bool {
        self.hi.is_nan()
    }

    /// Whether this is a signaling NaN.
    #[inline]
    pub fn is_signaling(self) -> bool {
        self.hi.is_signaling()
    }

    /// Whether this is zero, subnormal or normal.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.hi.is_finite()
    }

    /// Whether this is subnormal or normal.
    #[inline]
    pub fn is_finite_non_zero(self) -> bool {
        self.hi.is_finite_non_zero()
    }

    /// Whether the value has less than full precision: either component is
    /// a double subnormal, or the parts do not overlap-free recombine.
    pub fn is_denormal(self) -> bool {
        self.category() == Category::Normal
            && (self.hi.is_denormal()
                || self.lo.is_denormal()
                // A normal pair recombines to exactly its high part.
                || self.hi != (self.hi + self.lo).value)
    }

    /// Whether this is a nonzero finite value at full precision.
    #[inline]
    pub fn is_normal(self) -> bool {
        self.is_finite_non_zero() && !self.is_denormal()
    }

    /// Whether the magnitude equals the smallest positive value.
    pub fn is_smallest(self) -> bool {
        if self.category() != Category::Normal {
            return false;
        }
        let mut tmp = Self::smallest();
        if self.is_negative() {
            tmp = -tmp;
        }
        tmp.partial_cmp(&self) == Some(Ordering::Equal)
    }

    /// Whether the magnitude equals the largest finite value.
    pub fn is_largest(self) -> bool {
        if self.category() != Category::Normal {
            return false;
        }
        let mut tmp = Self::largest();
        if self.is_negative() {
            tmp = -tmp;
        }
        tmp.bitwise_eq(self)
    }

    /// Whether the value is a finite integer.
    pub fn is_integer(self) -> bool {
        self.hi.is_integer() && self.lo.is_integer()
    }

    /// Exact structural equality of both components.
    pub fn bitwise_eq(self, rhs: Self) -> bool {
        self.hi.bitwise_eq(rhs.hi) && self.lo.bitwise_eq(rhs.lo)
    }

    /// The value with the sign of `rhs`.
    pub fn copy_sign(self, rhs: Self) -> Self {
        if self.is_negative() != rhs.is_negative() { -self } else { self }
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        if self.is_negative() { -self } else { self }
    }

    // ---------------------------------------------------------------
    // Accurate component arithmetic
    // ---------------------------------------------------------------

    /// Sums two expanded pairs `(a + aa) + (c + cc)` into a new pair, with
    /// both components accurate.
    fn add_impl(a: IeeeFloat, aa: IeeeFloat, c: IeeeFloat, cc: IeeeFloat, round: Round) -> StatusAnd<Self> {
        let mut status = OpStatus::OK;
        let mut z = unpack!(status|=, a.add_r(c, round));
        if !z.is_finite() {
            if !z.is_infinite() {
                return status.and(Self::new(z, IeeeFloat::zero(&DOUBLE)));
            }

            // The naive sum overflowed; re-associate starting from the low
            // parts, adding the larger high part last.
            status = OpStatus::OK;
            let a_cmp_c = a.cmp_abs_normal(c);
            z = unpack!(status|=, cc.add_r(aa, round));
            if a_cmp_c == Ordering::Greater {
                // z = cc + aa + c + a
                z = unpack!(status|=, z.add_r(c, round));
                z = unpack!(status|=, z.add_r(a, round));
            } else {
                // z = cc + aa + a + c
                z = unpack!(status|=, z.add_r(a, round));
                z = unpack!(status|=, z.add_r(c, round));
            }
            if !z.is_finite() {
                return status.and(Self::new(z, IeeeFloat::zero(&DOUBLE)));
            }
            let zz = unpack!(status|=, aa.add_r(cc, round));
            let mut lo = if a_cmp_c == Ordering::Greater {
                // lo = a - z + c + zz
                unpack!(status|=, a.sub_r(z, round))
            } else {
                // lo = c - z + a + zz
                unpack!(status|=, c.sub_r(z, round))
            };
            lo = if a_cmp_c == Ordering::Greater {
                unpack!(status|=, lo.add_r(c, round))
            } else {
                unpack!(status|=, lo.add_r(a, round))
            };
            lo = unpack!(status|=, lo.add_r(zz, round));
            status.and(Self::new(z, lo))
        } else {
            // q = a - z; zz = q + c + (a - (q + z)) + aa + cc
            // Compute a - (q + z) as -((q + z) - a) to avoid temporaries.
            let mut q = unpack!(status|=, a.sub_r(z, round));
            let mut zz = unpack!(status|=, q.add_r(c, round));
            q = unpack!(status|=, q.add_r(z, round));
            q = unpack!(status|=, q.sub_r(a, round));
            q = -q;
            zz = unpack!(status|=, zz.add_r(q, round));
            zz = unpack!(status|=, zz.add_r(aa, round));
            zz = unpack!(status|=, zz.add_r(cc, round));
            if zz.is_zero() && !zz.is_negative() {
                return OpStatus::OK.and(Self::new(z, IeeeFloat::zero(&DOUBLE)));
            }
            let hi = unpack!(status|=, z.add_r(zz, round));
            if !hi.is_finite() {
                return status.and(Self::new(hi, IeeeFloat::zero(&DOUBLE)));
            }
            let mut lo = unpack!(status|=, z.sub_r(hi, round));
            lo = unpack!(status|=, lo.add_r(zz, round));
            status.and(Self::new(hi, lo))
        }
    }

    /// `self + rhs`, rounding as directed.
    pub fn add_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        match (self.category(), rhs.category()) {
            (Category::NaN, _) => OpStatus::OK.and(self),
            (_, Category::NaN) => OpStatus::OK.and(rhs),
            (Category::Zero, _) => OpStatus::OK.and(rhs),
            (_, Category::Zero) => OpStatus::OK.and(self),
            (Category::Infinity, Category::Infinity) if self.is_negative() != rhs.is_negative() => {
                OpStatus::INVALID_OP.and(Self::qnan(None))
            }
            (Category::Infinity, _) => OpStatus::OK.and(self),
            (_, Category::Infinity) => OpStatus::OK.and(rhs),
            (Category::Normal, Category::Normal) => {
                Self::add_impl(self.hi, self.lo, rhs.hi, rhs.lo, round)
            }
        }
    }

    /// `self - rhs`, rounding as directed.
    pub fn sub_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        self.add_r(-rhs, round)
    }

    /// `self * rhs`, rounding as directed.
    pub fn mul_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        // For special categories the result category is the join in the
        // lattice NaN over {Zero, Infinity} over Normal, e.g.
        // NaN * anything = NaN, Zero * Infinity = NaN, Normal * Zero = Zero.
        match (self.category(), rhs.category()) {
            (Category::NaN, _) => return OpStatus::OK.and(self),
            (_, Category::NaN) => return OpStatus::OK.and(rhs),
            (Category::Zero, Category::Infinity) | (Category::Infinity, Category::Zero) => {
                return OpStatus::INVALID_OP.and(Self::qnan(None));
            }
            (Category::Zero | Category::Infinity, _) => {
                let mut r = self;
                if rhs.is_negative() {
                    r = -r;
                }
                return OpStatus::OK.and(r);
            }
            (_, Category::Zero | Category::Infinity) => {
                let mut r = rhs;
                if self.is_negative() {
                    r = -r;
                }
                return OpStatus::OK.and(r);
            }
            (Category::Normal, Category::Normal) => {}
        }

        let mut status = OpStatus::OK;
        let (a, b, c, d) = (self.hi, self.lo, rhs.hi, rhs.lo);
        // t = a * c
        let t = unpack!(status|=, a.mul_r(c, round));
        if !t.is_finite_non_zero() {
            return status.and(Self::new(t, IeeeFloat::zero(&DOUBLE)));
        }

        // tau = fmsub(a, c, t), that is -fmadd(-a, c, t).
        let mut tau = unpack!(status|=, a.mul_add_r(c, -t, round));
        // v = a * d
        let v = unpack!(status|=, a.mul_r(d, round));
        // w = b * c
        let w = unpack!(status|=, b.mul_r(c, round));
        let vw = unpack!(status|=, v.add_r(w, round));
        // tau += v + w
        tau = unpack!(status|=, tau.add_r(vw, round));
        // u = t + tau
        let u = unpack!(status|=, t.add_r(tau, round));

        let lo = if !u.is_finite() {
            IeeeFloat::zero(&DOUBLE)
        } else {
            // lo = (t - u) + tau
            let x = unpack!(status|=, t.sub_r(u, round));
            unpack!(status|=, x.add_r(tau, round))
        };
        status.and(Self::new(u, lo))
    }

    // ---------------------------------------------------------------
    // Operations through the 106-bit scalar view
    // ---------------------------------------------------------------

    /// Flattens the pair into a 106-bit scalar.
    pub(crate) fn to_wide(self) -> IeeeFloat {
        let mut ignored = false;
        let hi = self.hi.convert(&PPC_DOUBLE_DOUBLE, &mut ignored).value;
        if !self.hi.is_finite_non_zero() || self.lo.is_zero() {
            return hi;
        }
        let lo = self.lo.convert(&PPC_DOUBLE_DOUBLE, &mut ignored).value;
        (hi + lo).value
    }

    /// Splits a 106-bit scalar back into high and residue parts.
    pub(crate) fn from_wide(w: IeeeFloat) -> Self {
        let mut ignored = false;
        let hi = w.convert(&DOUBLE, &mut ignored).value;
        if !hi.is_finite_non_zero() {
            return Self::new(hi, IeeeFloat::zero(&DOUBLE));
        }
        let hi_wide = hi.convert(&PPC_DOUBLE_DOUBLE, &mut ignored).value;
        let lo = (w - hi_wide).value.convert(&DOUBLE, &mut ignored).value;
        Self::new(hi, lo)
    }

    /// `self / rhs`, rounding as directed.
    pub fn div_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        self.to_wide().div_r(rhs.to_wide(), round).map(Self::from_wide)
    }

    /// C-style `fmod`.
    pub fn c_fmod(self, rhs: Self) -> StatusAnd<Self> {
        self.to_wide().c_fmod(rhs.to_wide()).map(Self::from_wide)
    }

    /// IEEE-754 `remainder`.
    pub fn ieee_rem(self, rhs: Self) -> StatusAnd<Self> {
        self.to_wide().ieee_rem(rhs.to_wide()).map(Self::from_wide)
    }

    /// Fused `self * multiplicand + addend` with a single final rounding.
    pub fn mul_add_r(self, multiplicand: Self, addend: Self, round: Round) -> StatusAnd<Self> {
        self.to_wide()
            .mul_add_r(multiplicand.to_wide(), addend.to_wide(), round)
            .map(Self::from_wide)
    }

    /// Rounds to an integral value.
    pub fn round_to_integral(self, round: Round) -> StatusAnd<Self> {
        self.to_wide().round_to_integral(round).map(Self::from_wide)
    }

    /// The least value that compares greater than `self`.
    pub fn next_up(self) -> StatusAnd<Self> {
        self.to_wide().next_up().map(Self::from_wide)
    }

    /// The greatest value that compares less than `self`.
    pub fn next_down(self) -> StatusAnd<Self> {
        (-self).next_up().map(|r| -r)
    }

    /// The smaller operand, preferring a number over a NaN.
    pub fn minnum(self, rhs: Self) -> Self {
        if self.is_nan() {
            rhs
        } else if rhs.is_nan() {
            self
        } else if let Some(Ordering::Greater) = self.partial_cmp(&rhs) {
            rhs
        } else {
            self
        }
    }

    /// The larger operand, preferring a number over a NaN.
    pub fn maxnum(self, rhs: Self) -> Self {
        if self.is_nan() {
            rhs
        } else if rhs.is_nan() {
            self
        } else if let Some(Ordering::Less) = self.partial_cmp(&rhs) {
            rhs
        } else {
            self
        }
    }

    /// The unbiased exponent, or an `IEK_*` sentinel.
    pub fn ilogb(self) -> ExpInt {
        self.to_wide().ilogb()
    }

    /// `self * 2^exp`, scaling both components.
    pub fn scalbn_r(self, exp: ExpInt, round: Round) -> Self {
        Self::new(self.hi.scalbn_r(exp, round), self.lo.scalbn_r(exp, round))
    }

    /// [`scalbn_r`](Self::scalbn_r) with default rounding.
    pub fn scalbn(self, exp: ExpInt) -> Self {
        self.scalbn_r(exp, Round::NearestTiesToEven)
    }

    /// Decomposes into a fraction in +/-[0.5, 1.0) and a power of two.
    pub fn frexp_r(self, exp: &mut ExpInt, round: Round) -> Self {
        let hi = self.hi.frexp_r(exp, round);
        let lo = if self.category() == Category::Normal {
            self.lo.scalbn_r(-*exp, round)
        } else {
            self.lo
        };
        Self::new(hi, lo)
    }

    /// [`frexp_r`](Self::frexp_r) with default rounding.
    pub fn frexp(self, exp: &mut ExpInt) -> Self {
        self.frexp_r(exp, Round::NearestTiesToEven)
    }

    // ---------------------------------------------------------------
    // Conversions
    // ---------------------------------------------------------------

    /// Reconstructs a pair from its interchange encoding: the high double
    /// in the low 64 bits, the low double in the high 64 bits.
    pub fn from_bits(input: u128) -> Self {
        Self::new(
            IeeeFloat::from_bits(&DOUBLE, input & !0u64 as u128),
            IeeeFloat::from_bits(&DOUBLE, input >> 64),
        )
    }

    /// The interchange encoding of the pair.
    pub fn to_bits(self) -> u128 {
        self.hi.to_bits() | self.lo.to_bits() << 64
    }

    /// Converts an unsigned integer, rounding as directed.
    pub fn from_u128_r(input: u128, round: Round) -> StatusAnd<Self> {
        IeeeFloat::from_u128_r(&PPC_DOUBLE_DOUBLE, input, round).map(Self::from_wide)
    }

    /// Converts an unsigned integer with default rounding.
    pub fn from_u128(input: u128) -> StatusAnd<Self> {
        Self::from_u128_r(input, Round::NearestTiesToEven)
    }

    /// Converts a signed integer, rounding as directed.
    pub fn from_i128_r(input: i128, round: Round) -> StatusAnd<Self> {
        IeeeFloat::from_i128_r(&PPC_DOUBLE_DOUBLE, input, round).map(Self::from_wide)
    }

    /// Converts a signed integer with default rounding.
    pub fn from_i128(input: i128) -> StatusAnd<Self> {
        Self::from_i128_r(input, Round::NearestTiesToEven)
    }

    /// Converts to an unsigned integer of the given bit `width`, rounding
    /// as directed, saturating on overflow.
    pub fn to_u128_r(self, width: usize, round: Round, is_exact: &mut bool) -> StatusAnd<u128> {
        self.to_wide().to_u128_r(width, round, is_exact)
    }

    /// Converts to a signed integer of the given bit `width`, rounding as
    /// directed, saturating on overflow.
    pub fn to_i128_r(self, width: usize, round: Round, is_exact: &mut bool) -> StatusAnd<i128> {
        self.to_wide().to_i128_r(width, round, is_exact)
    }

    /// Parses a literal, rounding as directed.
    pub fn from_str_r(s: &str, round: Round) -> Result<StatusAnd<Self>, ParseError> {
        IeeeFloat::from_str_r(&PPC_DOUBLE_DOUBLE, s, round).map(|r| r.map(Self::from_wide))
    }

    /// Parses a literal with default rounding.
    pub fn from_str(s: &str) -> Result<StatusAnd<Self>, ParseError> {
        Self::from_str_r(s, Round::NearestTiesToEven)
    }

    /// Formats the 106-bit scalar view in C99 `%a` hexadecimal style.
    pub fn to_hex_string(&self, hex_digits: usize, upper_case: bool, round: Round) -> String {
        self.to_wide().to_hex_string(hex_digits, upper_case, round)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.hi, -self.lo)
    }
}

impl PartialEq for DoubleDouble {
    fn eq(&self, rhs: &Self) -> bool {
        self.partial_cmp(rhs) == Some(Ordering::Equal)
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&rhs.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&rhs.lo),
            result => result,
        }
    }
}

impl Add for DoubleDouble {
    type Output = StatusAnd<Self>;
    fn add(self, rhs: Self) -> StatusAnd<Self> {
        self.add_r(rhs, Round::NearestTiesToEven)
    }
}

impl Sub for DoubleDouble {
    type Output = StatusAnd<Self>;
    fn sub(self, rhs: Self) -> StatusAnd<Self> {
        self.sub_r(rhs, Round::NearestTiesToEven)
    }
}

impl Mul for DoubleDouble {
    type Output = StatusAnd<Self>;
    fn mul(self, rhs: Self) -> StatusAnd<Self> {
        self.mul_r(rhs, Round::NearestTiesToEven)
    }
}

impl Div for DoubleDouble {
    type Output = StatusAnd<Self>;
    fn div(self, rhs: Self) -> StatusAnd<Self> {
        self.div_r(rhs, Round::NearestTiesToEven)
    }
}

impl Rem for DoubleDouble {
    type Output = StatusAnd<Self>;
    fn rem(self, rhs: Self) -> StatusAnd<Self> {
        self.c_fmod(rhs)
    }
}

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_wide(), f)
    }
}

impl fmt::Debug for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}) + ({:?})", self.hi, self.lo)
    }
}
