//! The scalar arithmetic engine.
//!
//! [`IeeeFloat`] holds one number in sign/exponent/significand form, tagged
//! with a [`Category`] and bound to a static format descriptor. All
//! operations are pure: they consume their operands by value and return the
//! result together with the exception flags raised.
//!
//! The engine computes in an internal extended form (full-limb significand,
//! unbiased exponent) and funnels every precision-losing path through
//! `normalize`, which applies the descriptor's overflow and NaN policies.

use crate::rounding::{Loss, Round};
use crate::sem::{NanEncoding, NonFinite, Semantics};
use crate::sig::{self, Limb};
use crate::status::{unpack, OpStatus, StatusAnd};
use crate::{Category, ExpInt, Format, IEK_INF, IEK_NAN, IEK_ZERO};
use core::cmp::{self, Ordering};
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// A software floating-point value bound to a runtime format descriptor.
///
/// Operands of binary operations must share a descriptor; mixing formats is
/// a programming error (checked in debug builds). Use
/// [`convert_r`](IeeeFloat::convert_r) to move values between formats.
#[must_use]
#[derive(Copy, Clone)]
pub struct IeeeFloat {
    /// Absolute significand value, integer bit included.
    pub(crate) sig: [Limb; 1],

    /// The signed unbiased exponent of the value.
    pub(crate) exp: ExpInt,

    /// What kind of floating point number this is.
    pub(crate) category: Category,

    /// Sign bit of the number.
    pub(crate) sign: bool,

    /// The format this value lives in.
    pub(crate) sem: &'static Semantics,
}

/// The significand bit pattern of a canonical quiet NaN.
fn qnan_significand(sem: &'static Semantics) -> Limb {
    match sem.nan_encoding {
        // For x87 extended precision we want a NaN, not a pseudo-NaN, so
        // the explicit integer bit is set as well.
        NanEncoding::Ieee if sem.explicit_int_bit => 0b11 << sem.qnan_bit(),
        NanEncoding::Ieee => 1 << sem.qnan_bit(),
        NanEncoding::AllOnes => (1 << (sem.precision - 1)) - 1,
        NanEncoding::NegativeZero => 0,
    }
}

impl IeeeFloat {
    /// Positive zero.
    pub fn zero(sem: &'static Semantics) -> Self {
        IeeeFloat { sig: [0], exp: sem.min_exp - 1, category: Category::Zero, sign: false, sem }
    }

    /// Positive infinity, or the format's stand-in for it: the NaN of a
    /// NaN-only format, the largest finite value of a finite-only format.
    pub fn inf(sem: &'static Semantics) -> Self {
        match sem.non_finite {
            NonFinite::Ieee => IeeeFloat {
                sig: [0],
                exp: sem.max_exp + 1,
                category: Category::Infinity,
                sign: false,
                sem,
            },
            NonFinite::NanOnly => Self::qnan(sem, None),
            NonFinite::FiniteOnly => Self::largest(sem),
        }
    }

    /// A quiet NaN with an optional payload. Formats with a single NaN
    /// encoding ignore the payload. Finite-only formats have no NaN; this
    /// returns the largest finite value instead (see DESIGN notes).
    pub fn qnan(sem: &'static Semantics, payload: Option<u128>) -> Self {
        if !sem.has_nan() {
            return Self::largest(sem);
        }
        let payload = match sem.nan_encoding {
            NanEncoding::Ieee => {
                payload.map_or(0, |payload| payload & ((1 << sem.qnan_bit()) - 1))
            }
            NanEncoding::AllOnes | NanEncoding::NegativeZero => 0,
        };
        IeeeFloat {
            sig: [qnan_significand(sem) | payload],
            exp: sem.max_exp + 1,
            category: Category::NaN,
            // The FNUZ NaN is the sign bit; everywhere else default positive.
            sign: matches!(sem.nan_encoding, NanEncoding::NegativeZero),
            sem,
        }
    }

    /// A signaling NaN with an optional payload. Formats whose NaNs are all
    /// quiet return their quiet NaN.
    pub fn snan(sem: &'static Semantics, payload: Option<u128>) -> Self {
        if !sem.has_signaling_nan() {
            return Self::qnan(sem, payload);
        }

        let mut snan = Self::qnan(sem, payload);

        // We always have to clear the QNaN bit to make it an SNaN.
        sig::clear_bit(&mut snan.sig, sem.qnan_bit());
        if sem.explicit_int_bit {
            sig::set_bit(&mut snan.sig, sem.precision - 1);
        }

        // If there are no bits set in the payload, we have to set
        // *something* to make it a NaN instead of an infinity;
        // conventionally, this is the next bit down from the QNaN bit.
        if snan.sig[0] & !qnan_significand(sem) == 0 {
            sig::set_bit(&mut snan.sig, sem.qnan_bit() - 1);
        }

        snan
    }

    /// The largest finite value.
    pub fn largest(sem: &'static Semantics) -> Self {
        // In interchange format: exponent all ones (less one for IEEE
        // formats), significand all ones. Formats whose NaN is the all-ones
        // pattern give up their last significand bit to it.
        let sig = if matches!(sem.nan_encoding, NanEncoding::AllOnes) {
            ((1 as Limb) << sem.precision) - 2
        } else {
            ((1 as Limb) << sem.precision) - 1
        };
        IeeeFloat { sig: [sig], exp: sem.max_exp, category: Category::Normal, sign: false, sem }
    }

    /// The smallest positive value (subnormal).
    pub fn smallest(sem: &'static Semantics) -> Self {
        IeeeFloat { sig: [1], exp: sem.min_exp, category: Category::Normal, sign: false, sem }
    }

    /// The smallest positive normalized value.
    pub fn smallest_normalized(sem: &'static Semantics) -> Self {
        IeeeFloat {
            sig: [1 << (sem.precision - 1)],
            exp: sem.min_exp,
            category: Category::Normal,
            sign: false,
            sem,
        }
    }

    /// Exactly one.
    fn one(sem: &'static Semantics) -> Self {
        IeeeFloat {
            sig: [1 << (sem.precision - 1)],
            exp: 0,
            category: Category::Normal,
            sign: false,
            sem,
        }
    }

    /// The descriptor this value is bound to.
    #[inline]
    pub fn semantics(&self) -> &'static Semantics {
        self.sem
    }

    /// The format this value is bound to.
    pub fn format(&self) -> Format {
        Format::of(self.sem)
    }

    /// The category of this value.
    #[inline]
    pub fn category(self) -> Category {
        self.category
    }

    /// Whether the sign bit is set.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.sign
    }

    /// Whether this is a zero of either sign.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.category == Category::Zero
    }

    /// Whether this is an infinity of either sign.
    #[inline]
    pub fn is_infinite(self) -> bool {
        self.category == Category::Infinity
    }

    /// Whether this is any NaN.
    #[inline]
    pub fn is_nan(self) -> bool {
        self.category == Category::NaN
    }

    /// Whether this is zero, subnormal or normal.
    #[inline]
    pub fn is_finite(self) -> bool {
        !self.is_nan() && !self.is_infinite()
    }

    /// Whether this is subnormal or normal.
    #[inline]
    pub fn is_finite_non_zero(self) -> bool {
        self.is_finite() && !self.is_zero()
    }

    /// Whether this is anything but zero.
    #[inline]
    pub fn is_non_zero(self) -> bool {
        !self.is_zero()
    }

    /// Whether this is a subnormal value.
    pub fn is_denormal(self) -> bool {
        self.is_finite_non_zero()
            && self.exp == self.sem.min_exp
            && !sig::get_bit(&self.sig, self.sem.precision - 1)
    }

    /// Whether this is a nonzero finite value with a full-precision
    /// significand.
    #[inline]
    pub fn is_normal(self) -> bool {
        self.is_finite_non_zero() && !self.is_denormal()
    }

    /// Whether this is a signaling NaN.
    pub fn is_signaling(self) -> bool {
        // IEEE-754 2008 6.2.1: a signaling NaN has the first bit of the
        // trailing significand clear.
        self.is_nan()
            && self.sem.has_signaling_nan()
            && !sig::get_bit(&self.sig, self.sem.qnan_bit())
    }

    /// Whether the magnitude equals the smallest subnormal.
    pub fn is_smallest(self) -> bool {
        Self::smallest(self.sem).copy_sign(self).bitwise_eq(self)
    }

    /// Whether the magnitude equals the largest finite value.
    pub fn is_largest(self) -> bool {
        Self::largest(self.sem).copy_sign(self).bitwise_eq(self)
    }

    /// Whether the value is a finite integer.
    pub fn is_integer(self) -> bool {
        self.is_finite() && self.round_to_integral(Round::TowardZero).value.bitwise_eq(self)
    }

    /// The value with the sign of `rhs`.
    pub fn copy_sign(self, rhs: Self) -> Self {
        if self.is_negative() != rhs.is_negative() { -self } else { self }
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        if self.is_negative() { -self } else { self }
    }

    /// Exact structural equality: same category, sign, exponent and
    /// significand. Unlike `==` this distinguishes zero signs and is
    /// reflexive on NaN.
    pub fn bitwise_eq(self, rhs: Self) -> bool {
        if self.category != rhs.category || self.sign != rhs.sign {
            return false;
        }

        if self.category == Category::Zero || self.category == Category::Infinity {
            return true;
        }

        if self.is_finite_non_zero() && self.exp != rhs.exp {
            return false;
        }

        self.sig == rhs.sig
    }

    /// Compares absolute values of two finite non-zero numbers.
    pub fn cmp_abs_normal(self, rhs: Self) -> Ordering {
        assert!(self.is_finite_non_zero());
        assert!(rhs.is_finite_non_zero());

        // If exponents are equal, do an unsigned comparison of the
        // significands.
        self.exp.cmp(&rhs.exp).then_with(|| sig::cmp(&self.sig, &rhs.sig))
    }

    // ---------------------------------------------------------------
    // Arithmetic
    // ---------------------------------------------------------------

    /// `self + rhs`, rounding as directed.
    pub fn add_r(mut self, rhs: Self, round: Round) -> StatusAnd<Self> {
        debug_assert!(core::ptr::eq(self.sem, rhs.sem), "mixed-format operands");
        let status = match (self.category, rhs.category) {
            (Category::NaN, _) | (_, Category::NaN) => return self.nan_result(rhs),

            (Category::Infinity, Category::Infinity) => {
                // Differently signed infinities can only be validly
                // subtracted.
                if self.sign != rhs.sign {
                    return OpStatus::INVALID_OP.and(Self::qnan(self.sem, None));
                }
                OpStatus::OK
            }

            // Sign may depend on rounding mode; handled below.
            (_, Category::Zero) | (Category::Infinity, Category::Normal) => OpStatus::OK,

            (Category::Zero, _) | (_, Category::Infinity) => {
                self = rhs;
                OpStatus::OK
            }

            (Category::Normal, Category::Normal) => {
                let loss = sig::add_or_sub(
                    &mut self.sig,
                    &mut self.exp,
                    &mut self.sign,
                    &mut [rhs.sig[0]],
                    rhs.exp,
                    rhs.sign,
                );
                let status;
                self = unpack!(status=, self.normalize(round, loss));

                // Can only be zero if we lost no fraction.
                assert!(self.category != Category::Zero || loss == Loss::ExactlyZero);

                status
            }
        };

        // If two numbers add (exactly) to zero, IEEE 754 decrees it is a
        // positive zero unless rounding to minus infinity, except that
        // adding two like-signed zeroes gives that zero.
        if self.category == Category::Zero
            && (rhs.category != Category::Zero || self.sign != rhs.sign)
        {
            self.sign = round == Round::TowardNegative && self.sem.has_signed_zero();
        }

        status.and(self)
    }

    /// `self - rhs`, rounding as directed.
    pub fn sub_r(self, rhs: Self, round: Round) -> StatusAnd<Self> {
        self.add_r(-rhs, round)
    }

    /// `self * rhs`, rounding as directed.
    pub fn mul_r(mut self, rhs: Self, round: Round) -> StatusAnd<Self> {
        debug_assert!(core::ptr::eq(self.sem, rhs.sem), "mixed-format operands");
        if self.is_nan() || rhs.is_nan() {
            return self.nan_result(rhs);
        }

        self.sign ^= rhs.sign;

        match (self.category, rhs.category) {
            (Category::NaN, _) | (_, Category::NaN) => unreachable!(),

            (Category::Zero, Category::Infinity) | (Category::Infinity, Category::Zero) => {
                OpStatus::INVALID_OP.and(Self::qnan(self.sem, None))
            }

            (_, Category::Infinity) | (Category::Infinity, _) => {
                self.category = Category::Infinity;
                OpStatus::OK.and(self)
            }

            (Category::Zero, _) | (_, Category::Zero) => {
                let sign = self.sign;
                self = Self::zero(self.sem);
                self.sign = sign && self.sem.has_signed_zero();
                OpStatus::OK.and(self)
            }

            (Category::Normal, Category::Normal) => {
                self.exp += rhs.exp;
                let mut wide_sig = [0; 2];
                let loss = sig::mul(
                    &mut wide_sig,
                    &mut self.exp,
                    &self.sig,
                    &rhs.sig,
                    self.sem.precision,
                );
                self.sig = [wide_sig[0]];
                let mut status;
                self = unpack!(status=, self.normalize(round, loss));
                if loss != Loss::ExactlyZero {
                    status |= OpStatus::INEXACT;
                }
                status.and(self)
            }
        }
    }

    /// `self / rhs`, rounding as directed.
    pub fn div_r(mut self, rhs: Self, round: Round) -> StatusAnd<Self> {
        debug_assert!(core::ptr::eq(self.sem, rhs.sem), "mixed-format operands");
        if self.is_nan() || rhs.is_nan() {
            return self.nan_result(rhs);
        }

        self.sign ^= rhs.sign;

        match (self.category, rhs.category) {
            (Category::NaN, _) | (_, Category::NaN) => unreachable!(),

            (Category::Infinity, Category::Infinity) | (Category::Zero, Category::Zero) => {
                OpStatus::INVALID_OP.and(Self::qnan(self.sem, None))
            }

            (Category::Infinity | Category::Zero, _) => {
                if self.category == Category::Zero && !self.sem.has_signed_zero() {
                    self.sign = false;
                }
                OpStatus::OK.and(self)
            }

            (Category::Normal, Category::Infinity) => {
                let sign = self.sign;
                self = Self::zero(self.sem);
                self.sign = sign && self.sem.has_signed_zero();
                OpStatus::OK.and(self)
            }

            (Category::Normal, Category::Zero) => match self.sem.non_finite {
                NonFinite::Ieee => {
                    self.category = Category::Infinity;
                    OpStatus::DIV_BY_ZERO.and(self)
                }
                NonFinite::NanOnly => {
                    OpStatus::DIV_BY_ZERO.and(Self::qnan(self.sem, None).copy_sign(self))
                }
                NonFinite::FiniteOnly => (OpStatus::DIV_BY_ZERO | OpStatus::INVALID_OP)
                    .and(Self::largest(self.sem).copy_sign(self)),
            },

            (Category::Normal, Category::Normal) => {
                self.exp -= rhs.exp;
                let dividend = self.sig[0];
                let loss = sig::div(
                    &mut self.sig,
                    &mut self.exp,
                    &mut [dividend],
                    &mut [rhs.sig[0]],
                    self.sem.precision,
                );
                let mut status;
                self = unpack!(status=, self.normalize(round, loss));
                if loss != Loss::ExactlyZero {
                    status |= OpStatus::INEXACT;
                }
                status.and(self)
            }
        }
    }

    /// Fused `self * multiplicand + addend` with a single final rounding.
    pub fn mul_add_r(mut self, multiplicand: Self, addend: Self, round: Round) -> StatusAnd<Self> {
        // If and only if all arguments are normal do we need to do an
        // extended-precision calculation.
        if !self.is_finite_non_zero() || !multiplicand.is_finite_non_zero() || !addend.is_finite() {
            let mut status;
            self = unpack!(status=, self.mul_r(multiplicand, round));

            // FS can only be OK or INVALID_OP. There is no more work to do
            // in the latter case. The IEEE-754R standard says it is
            // implementation-defined in this case whether, if ADDEND is a
            // quiet NaN, we raise invalid op; this implementation does so.
            //
            // If we need to do the addition we can do so with normal
            // precision.
            if status.is_ok() {
                self = unpack!(status=, self.add_r(addend, round));
            }
            return status.and(self);
        }

        // Post-multiplication sign, before addition.
        self.sign ^= multiplicand.sign;

        // Allocate space for twice as many bits as the original significand,
        // plus one extra bit for the addition to overflow into.
        debug_assert!(2 * self.sem.precision + 1 <= 2 * sig::LIMB_BITS);
        let mut wide_sig = sig::widening_mul(self.sig[0], multiplicand.sig[0]);

        let mut loss = Loss::ExactlyZero;
        let mut omsb = sig::omsb(&wide_sig);
        self.exp += multiplicand.exp;

        // The intermediate product has two digits left of the radix point
        // plus the always-zero headroom bit; move the radix point left by
        // two and adjust the exponent accordingly.
        self.exp += 2;

        if addend.is_non_zero() {
            // Normalize our MSB to one below the top bit to allow for
            // overflow.
            let ext_precision = 2 * self.sem.precision + 1;
            if omsb != ext_precision - 1 {
                assert!(ext_precision > omsb);
                sig::shift_left(&mut wide_sig, &mut self.exp, (ext_precision - 1) - omsb);
            }

            // The intermediate result of the multiplication has twice the
            // significant bits; adjust the addend to be consistent with the
            // product.
            let mut ext_addend_sig = [addend.sig[0], 0];

            // Extend the addend significand to ext_precision - 1. This
            // guarantees that the high bit of the significand is zero (same
            // as wide_sig), so the addition will overflow (if it does
            // overflow at all) into the top bit.
            sig::shift_left(&mut ext_addend_sig, &mut 0, ext_precision - 1 - self.sem.precision);
            loss = sig::add_or_sub(
                &mut wide_sig,
                &mut self.exp,
                &mut self.sign,
                &mut ext_addend_sig,
                addend.exp + 1,
                addend.sign,
            );

            omsb = sig::omsb(&wide_sig);
        }

        // Convert the result back from double-width significand to single.
        self.exp -= self.sem.precision as ExpInt + 1;

        // In case the MSB resides left of the radix point, shift the
        // mantissa right to place the MSB right before the radix point.
        if omsb > self.sem.precision {
            let bits = omsb - self.sem.precision;
            loss = sig::shift_right(&mut wide_sig, &mut self.exp, bits).combine(loss);
        }

        self.sig[0] = wide_sig[0];

        let mut status;
        self = unpack!(status=, self.normalize(round, loss));
        if loss != Loss::ExactlyZero {
            status |= OpStatus::INEXACT;
        }

        // If two numbers add (exactly) to zero, IEEE 754 decrees it is a
        // positive zero unless rounding to minus infinity, except that
        // adding two like-signed zeroes gives that zero.
        if self.category == Category::Zero
            && !status.intersects(OpStatus::UNDERFLOW)
            && self.sign != addend.sign
        {
            self.sign = round == Round::TowardNegative && self.sem.has_signed_zero();
        }

        status.and(self)
    }

    /// [`mul_add_r`](Self::mul_add_r) with default rounding.
    pub fn mul_add(self, multiplicand: Self, addend: Self) -> StatusAnd<Self> {
        self.mul_add_r(multiplicand, addend, Round::NearestTiesToEven)
    }

    /// C-style `fmod`: the remainder of truncating division, exact, with
    /// the sign of the dividend.
    pub fn c_fmod(mut self, rhs: Self) -> StatusAnd<Self> {
        debug_assert!(core::ptr::eq(self.sem, rhs.sem), "mixed-format operands");
        match (self.category, rhs.category) {
            (Category::NaN, _) | (_, Category::NaN) => self.nan_result(rhs),

            (Category::Zero, Category::Infinity | Category::Normal)
            | (Category::Normal, Category::Infinity) => OpStatus::OK.and(self),

            (Category::Infinity, _) | (_, Category::Zero) => {
                OpStatus::INVALID_OP.and(Self::qnan(self.sem, None))
            }

            (Category::Normal, Category::Normal) => {
                let orig_sign = self.sign;

                while self.is_finite_non_zero()
                    && rhs.is_finite_non_zero()
                    && self.cmp_abs_normal(rhs) != Ordering::Less
                {
                    let exp_diff = self.ilogb() - rhs.ilogb();
                    let mut v = rhs.scalbn(exp_diff);
                    // The scaling can overflow past the format's range (it
                    // may even produce NaN in a NaN-only format); retreat
                    // one power of two if so.
                    if !v.is_finite_non_zero() || self.cmp_abs_normal(v) == Ordering::Less {
                        v = rhs.scalbn(exp_diff - 1);
                    }
                    v = v.copy_sign(self);

                    let status;
                    self = unpack!(status=, self.sub_r(v, Round::NearestTiesToEven));
                    assert!(status.is_ok());
                }
                if self.is_zero() {
                    self.sign = orig_sign && self.sem.has_signed_zero();
                }
                OpStatus::OK.and(self)
            }
        }
    }

    /// IEEE-754 `remainder`: `self - n * rhs` with `n` the integer nearest
    /// the exact quotient, ties to even. Exact; a zero result takes the
    /// sign of the dividend.
    pub fn ieee_rem(mut self, rhs: Self) -> StatusAnd<Self> {
        debug_assert!(core::ptr::eq(self.sem, rhs.sem), "mixed-format operands");
        match (self.category, rhs.category) {
            (Category::NaN, _) | (_, Category::NaN) => self.nan_result(rhs),

            (Category::Zero, Category::Infinity | Category::Normal)
            | (Category::Normal, Category::Infinity) => OpStatus::OK.and(self),

            (Category::Infinity, _) | (_, Category::Zero) => {
                OpStatus::INVALID_OP.and(Self::qnan(self.sem, None))
            }

            (Category::Normal, Category::Normal) => {
                let orig_sign = self.sign;

                // First reduce as fmod does. Each subtraction of a scaled
                // divisor is exact, and the truncated quotient is odd
                // exactly if a final unscaled subtraction happened.
                let mut parity_odd = false;
                while self.is_finite_non_zero()
                    && rhs.is_finite_non_zero()
                    && self.cmp_abs_normal(rhs) != Ordering::Less
                {
                    let mut exp_diff = self.ilogb() - rhs.ilogb();
                    let mut v = rhs.scalbn(exp_diff);
                    if !v.is_finite_non_zero() || self.cmp_abs_normal(v) == Ordering::Less {
                        exp_diff -= 1;
                        v = rhs.scalbn(exp_diff);
                    }
                    v = v.copy_sign(self);

                    let status;
                    self = unpack!(status=, self.sub_r(v, Round::NearestTiesToEven));
                    assert!(status.is_ok());

                    if exp_diff == 0 {
                        parity_odd = !parity_odd;
                    }
                }

                // Now |self| < |rhs|; correct to the nearest multiple by
                // comparing twice the residue against the divisor.
                if self.is_finite_non_zero() {
                    let twice = self.scalbn(1);
                    let adjust = if !twice.is_finite_non_zero() {
                        // Doubling overflowed, so it certainly exceeds rhs.
                        true
                    } else {
                        match twice.cmp_abs_normal(rhs) {
                            Ordering::Greater => true,
                            Ordering::Equal => parity_odd,
                            Ordering::Less => false,
                        }
                    };
                    if adjust {
                        let v = rhs.copy_sign(self);
                        let status;
                        self = unpack!(status=, self.sub_r(v, Round::NearestTiesToEven));
                        assert!(status.is_ok());
                    }
                }

                if self.is_zero() {
                    self.sign = orig_sign && self.sem.has_signed_zero();
                }
                OpStatus::OK.and(self)
            }
        }
    }

    /// Rounds to an integral value, staying in the same format.
    pub fn round_to_integral(self, round: Round) -> StatusAnd<Self> {
        match self.category {
            Category::Zero | Category::Infinity => OpStatus::OK.and(self),

            Category::NaN => {
                if self.is_signaling() {
                    OpStatus::INVALID_OP.and(self.make_quiet())
                } else {
                    OpStatus::OK.and(self)
                }
            }

            Category::Normal => {
                let prec = self.sem.precision;

                // An ulp of one or more means the value is already integral.
                if self.exp >= prec as ExpInt - 1 {
                    return OpStatus::OK.and(self);
                }

                let omsb = sig::omsb(&self.sig);
                // True binary exponent, denormals included.
                let e = self.exp - (prec as ExpInt - omsb as ExpInt);

                if e < 0 {
                    // |x| < 1 rounds to zero or one, deciding against the
                    // halfway point (with a result parity of even).
                    let loss = if e < -1 {
                        Loss::LessThanHalf
                    } else if sig::olsb(&self.sig) == omsb {
                        Loss::ExactlyHalf
                    } else {
                        Loss::MoreThanHalf
                    };
                    let away = match round {
                        Round::NearestTiesToAway => loss != Loss::LessThanHalf,
                        Round::NearestTiesToEven => loss == Loss::MoreThanHalf,
                        Round::TowardZero => false,
                        Round::TowardPositive => !self.sign,
                        Round::TowardNegative => self.sign,
                    };
                    let mut r =
                        if away { Self::one(self.sem) } else { Self::zero(self.sem) };
                    r.sign = self.sign && (r.category != Category::Zero || self.sem.has_signed_zero());
                    return OpStatus::INEXACT.and(r);
                }

                // Clear the fraction bits and round the integer part.
                let fract_bits = (prec as ExpInt - 1 - self.exp) as usize;
                let loss = Loss::through_truncation(&self.sig, fract_bits);
                if loss == Loss::ExactlyZero {
                    return OpStatus::OK.and(self);
                }

                let mut r = self;
                r.sig[0] &= !(((1 as Limb) << fract_bits) - 1);
                if r.round_away_from_zero(round, loss, fract_bits) {
                    r.sig[0] += (1 as Limb) << fract_bits;
                    if sig::omsb(&r.sig) == prec + 1 {
                        // Carried past the top of the significand.
                        let _: Loss = sig::shift_right(&mut r.sig, &mut r.exp, 1);
                        if r.exp > self.sem.max_exp {
                            return Self::overflowed(self.sem).map(|x| x.copy_sign(self));
                        }
                    }
                }
                if sig::is_all_zeros(&r.sig) {
                    // A subnormal's integer part rounded down to zero.
                    let sign = r.sign;
                    r = Self::zero(self.sem);
                    r.sign = sign && self.sem.has_signed_zero();
                }
                OpStatus::INEXACT.and(r)
            }
        }
    }

    /// The least value that compares greater than `self`.
    pub fn next_up(mut self) -> StatusAnd<Self> {
        // Compute nextUp(x), handling each float category separately.
        match self.category {
            Category::Infinity => {
                if self.sign {
                    // nextUp(-inf) = -largest
                    OpStatus::OK.and(-Self::largest(self.sem))
                } else {
                    // nextUp(+inf) = +inf
                    OpStatus::OK.and(self)
                }
            }
            Category::NaN => {
                // IEEE-754R 2008 6.2 Par 2: nextUp(sNaN) = qNaN. Set Invalid
                // flag.
                // IEEE-754R 2008 6.2: nextUp(qNaN) = qNaN. Must be identity
                // so we do not change the payload.
                if self.is_signaling() {
                    // For consistency, propagate the sign of the sNaN to the
                    // qNaN.
                    OpStatus::INVALID_OP.and(Self::qnan(self.sem, None).copy_sign(self))
                } else {
                    OpStatus::OK.and(self)
                }
            }
            Category::Zero => {
                // nextUp(pm 0) = +smallest
                OpStatus::OK.and(Self::smallest(self.sem))
            }
            Category::Normal => {
                // nextUp(-smallest) = -0, or +0 where -0 does not exist.
                if self.is_smallest() && self.sign {
                    let mut r = Self::zero(self.sem);
                    r.sign = self.sem.has_signed_zero();
                    return OpStatus::OK.and(r);
                }

                // nextUp(largest) == INFINITY (or the format's stand-in).
                if self.is_largest() && !self.sign {
                    return OpStatus::OK.and(Self::inf(self.sem));
                }

                let prec = self.sem.precision;

                // Excluding the integral bit. This allows us to test for
                // binade boundaries.
                let sig_mask = ((1 as Limb) << (prec - 1)) - 1;

                // nextUp(normal) == normal + inc.
                if self.sign {
                    // If we are negative, we need to decrement the
                    // significand.

                    // We only cross a binade boundary that requires adjusting
                    // the exponent if:
                    //   1. exponent != min_exp. This implies we are not in
                    //      the smallest binade or are dealing with denormals.
                    //   2. Our significand excluding the integral bit is all
                    //      zeros.
                    let crossing_binade_boundary =
                        self.exp != self.sem.min_exp && self.sig[0] & sig_mask == 0;

                    // Decrement the significand.
                    //
                    // We always do this since:
                    //   1. If we are dealing with a non-binade decrement, by
                    //      definition we just decrement the significand.
                    //   2. If we are dealing with a normal -> normal binade
                    //      decrement, since we have an explicit integral bit
                    //      the fact that all bits but the integral bit are
                    //      zero implies that subtracting one will yield a
                    //      significand with 0 integral bit and 1 in all
                    //      other spots. Thus we must just adjust the
                    //      exponent and set the integral bit to 1.
                    //   3. If we are dealing with a normal -> denormal binade
                    //      decrement, since we set the integral bit to 0 when
                    //      we represent denormals, we just decrement the
                    //      significand.
                    sig::decrement(&mut self.sig);

                    if crossing_binade_boundary {
                        // Our result is a normal number. Do the following:
                        // 1. Set the integral bit to 1.
                        // 2. Decrement the exponent.
                        sig::set_bit(&mut self.sig, prec - 1);
                        self.exp -= 1;
                    }
                } else {
                    // If we are positive, we need to increment the
                    // significand.

                    // We only cross a binade boundary that requires adjusting
                    // the exponent if the input is not a denormal and all of
                    // said input's significand bits are set. If all of said
                    // conditions are true: clear the significand, set the
                    // integral bit to 1, and increment the exponent. If we
                    // have a denormal always increment since moving denormals
                    // and the numbers in the smallest normal binade have the
                    // same exponent in our representation.
                    let crossing_binade_boundary =
                        !self.is_denormal() && self.sig[0] & sig_mask == sig_mask;

                    if crossing_binade_boundary {
                        self.sig = [0];
                        sig::set_bit(&mut self.sig, prec - 1);
                        assert_ne!(
                            self.exp,
                            self.sem.max_exp,
                            "cannot increment an exponent beyond the format maximum"
                        );
                        self.exp += 1;
                    } else {
                        sig::increment(&mut self.sig);
                    }
                }
                OpStatus::OK.and(self)
            }
        }
    }

    /// The greatest value that compares less than `self`.
    pub fn next_down(self) -> StatusAnd<Self> {
        (-self).next_up().map(|r| -r)
    }

    /// IEEE-754 `minNum`: the smaller operand, preferring a number over a
    /// NaN.
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

    /// IEEE-754 `maxNum`: the larger operand, preferring a number over a
    /// NaN.
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

    /// If `self` is an exact power of two whose reciprocal is an exact
    /// normal value, returns that reciprocal.
    pub fn get_exact_inverse(self) -> Option<Self> {
        // Special floats and denormals have no exact inverse.
        if !self.is_finite_non_zero() {
            return None;
        }

        // Check that the number is a power of two by making sure that only
        // the integer bit is set in the significand.
        if self.sig != [1 << (self.sem.precision - 1)] {
            return None;
        }

        // Get the inverse.
        let mut reciprocal = Self::from_u128(self.sem, 1).value;
        let status;
        reciprocal = unpack!(status=, reciprocal.div_r(self, Round::NearestTiesToEven));
        if !status.is_ok() {
            return None;
        }

        // Avoid multiplication with a denormal, it is not safe on all
        // platforms and may be slower than a normal division.
        if reciprocal.is_denormal() {
            return None;
        }

        assert!(reciprocal.is_finite_non_zero());
        assert_eq!(reciprocal.sig, [1 << (self.sem.precision - 1)]);

        Some(reciprocal)
    }

    /// The unbiased exponent of the value, or one of the
    /// [`IEK_ZERO`]/[`IEK_NAN`]/[`IEK_INF`] sentinels.
    pub fn ilogb(mut self) -> ExpInt {
        if self.is_nan() {
            return IEK_NAN;
        }
        if self.is_zero() {
            return IEK_ZERO;
        }
        if self.is_infinite() {
            return IEK_INF;
        }
        if !self.is_denormal() {
            return self.exp;
        }

        let sig_bits = (self.sem.precision - 1) as ExpInt;
        self.exp += sig_bits;
        self = self.normalize(Round::NearestTiesToEven, Loss::ExactlyZero).value;
        self.exp - sig_bits
    }

    /// `self * 2^exp`, rounding as directed.
    pub fn scalbn_r(mut self, exp: ExpInt, round: Round) -> Self {
        // If exp is wildly out-of-scale, simply adding it to self.exp will
        // overflow; clamp it to a safe range before adding, but ensure that
        // the range is large enough that the clamp does not change the
        // result. The range we need to support is the difference between the
        // largest possible exponent and the normalized exponent of half the
        // smallest denormal.

        let sig_bits = (self.sem.precision - 1) as i32;
        let max_change = self.sem.max_exp - (self.sem.min_exp - sig_bits) + 1;

        // Clamp to one past the range ends to let normalize handle overflow.
        let exp_change = cmp::min(cmp::max(exp, -max_change - 1), max_change);
        self.exp = self.exp.saturating_add(exp_change);
        self = self.normalize(round, Loss::ExactlyZero).value;
        self.make_quiet()
    }

    /// `self * 2^exp` with default rounding.
    pub fn scalbn(self, exp: ExpInt) -> Self {
        self.scalbn_r(exp, Round::NearestTiesToEven)
    }

    /// Decomposes into a fraction in +/-[0.5, 1.0) and a power of two.
    pub fn frexp_r(self, exp: &mut ExpInt, round: Round) -> Self {
        *exp = self.ilogb();

        // Quiet signaling NaNs.
        if *exp == IEK_NAN {
            return self.make_quiet();
        }

        if *exp == IEK_INF {
            return self;
        }

        // 1 is added because frexp is defined to return a normalized
        // fraction in +/-[0.5, 1.0), rather than the usual +/-[1.0, 2.0).
        if *exp == IEK_ZERO {
            *exp = 0;
        } else {
            *exp += 1;
        }
        self.scalbn_r(-*exp, round)
    }

    /// [`frexp_r`](Self::frexp_r) with default rounding.
    pub fn frexp(self, exp: &mut ExpInt) -> Self {
        self.frexp_r(exp, Round::NearestTiesToEven)
    }

    // ---------------------------------------------------------------
    // Conversions
    // ---------------------------------------------------------------

    /// Converts to another format, rounding as directed. `loses_info` is
    /// set when the result is not numerically identical to the input.
    pub fn convert_r(
        self,
        to: &'static Semantics,
        round: Round,
        loses_info: &mut bool,
    ) -> StatusAnd<Self> {
        let mut r = IeeeFloat {
            sig: self.sig,
            exp: self.exp,
            category: self.category,
            sign: self.sign,
            sem: to,
        };

        // x87 has some unusual NaNs which cannot be represented in any
        // other format; note them here.
        let x87_special_nan = self.sem.explicit_int_bit
            && !to.explicit_int_bit
            && r.category == Category::NaN
            && (r.sig[0] & qnan_significand(self.sem)) != qnan_significand(self.sem);

        // If this is a truncation of a denormal number, and the target
        // format has a larger exponent range than the source (this can
        // happen when truncating from the paired-double scalar view to
        // double), the right shift could lose result mantissa bits. Adjust
        // the exponent instead of performing an excessive shift.
        let mut shift = to.precision as ExpInt - self.sem.precision as ExpInt;
        if shift < 0 && r.is_finite_non_zero() {
            let mut exp_change = sig::omsb(&r.sig) as ExpInt - self.sem.precision as ExpInt;
            if r.exp + exp_change < to.min_exp {
                exp_change = to.min_exp - r.exp;
            }
            if exp_change < shift {
                exp_change = shift;
            }
            if exp_change < 0 {
                shift -= exp_change;
                r.exp += exp_change;
            }
        }

        // If this is a truncation, perform the shift.
        let loss = if shift < 0 && (r.is_finite_non_zero() || r.category == Category::NaN) {
            sig::shift_right(&mut r.sig, &mut 0, -shift as usize)
        } else {
            Loss::ExactlyZero
        };

        // If this is an extension, perform the shift.
        if shift > 0 && (r.is_finite_non_zero() || r.category == Category::NaN) {
            sig::shift_left(&mut r.sig, &mut 0, shift as usize);
        }

        let status;
        if r.is_finite_non_zero() {
            r = unpack!(status=, r.normalize(round, loss));
            *loses_info = !status.is_ok();
        } else if r.category == Category::NaN {
            if !to.has_nan() {
                // The target cannot hold any NaN; saturate (see DESIGN).
                *loses_info = true;
                return OpStatus::INVALID_OP.and(Self::largest(to).copy_sign(self));
            }

            *loses_info = loss != Loss::ExactlyZero || x87_special_nan;

            if !matches!(to.nan_encoding, NanEncoding::Ieee) {
                // Single-NaN targets drop payload and signaling-ness.
                *loses_info = *loses_info
                    || self.is_signaling()
                    || (self.sig[0] & !qnan_significand(self.sem)) != 0;
                let keep_sign = r.sign;
                r = Self::qnan(to, None);
                if matches!(to.nan_encoding, NanEncoding::AllOnes) {
                    r.sign = keep_sign;
                }
                let status = if self.is_signaling() { OpStatus::INVALID_OP } else { OpStatus::OK };
                return status.and(r);
            }

            // For x87 extended precision, we want to make a NaN, not a
            // special NaN if the input wasn't special either.
            if !x87_special_nan && to.explicit_int_bit {
                sig::set_bit(&mut r.sig, to.precision - 1);
            }

            // Conversion of an sNaN creates a qNaN and raises an exception
            // (invalid op). This also guarantees that an sNaN does not
            // become Inf on a truncation that loses all payload bits.
            if self.is_signaling() {
                // Quiet signaling NaN.
                sig::set_bit(&mut r.sig, to.qnan_bit());
                status = OpStatus::INVALID_OP;
            } else {
                status = OpStatus::OK;
            }
        } else if r.category == Category::Infinity && !to.has_infinity() {
            // No infinity in the target: NaN-only formats produce their NaN,
            // finite-only formats saturate.
            *loses_info = true;
            let r = Self::inf(to).copy_sign(self);
            return OpStatus::INEXACT.and(r);
        } else if r.category == Category::Zero && r.sign && !to.has_signed_zero() {
            // Negative zero loses its sign.
            *loses_info = true;
            r.sign = false;
            status = OpStatus::INEXACT;
        } else {
            *loses_info = false;
            status = OpStatus::OK;
        }

        status.and(r)
    }

    /// [`convert_r`](Self::convert_r) with default rounding.
    pub fn convert(self, to: &'static Semantics, loses_info: &mut bool) -> StatusAnd<Self> {
        self.convert_r(to, Round::NearestTiesToEven, loses_info)
    }

    /// Reconstructs a value from its interchange encoding.
    pub fn from_bits(sem: &'static Semantics, input: u128) -> Self {
        let prec = sem.precision;
        let stored_sig_bits = if sem.explicit_int_bit { prec } else { prec - 1 };
        let exp_bits = sem.exponent_bits();

        let sign = (input >> (sem.bits - 1)) & 1 != 0;
        let exp_field = ((input >> stored_sig_bits) & ((1 << exp_bits) - 1)) as ExpInt;
        let sig_field = input & (((1 as u128) << stored_sig_bits) - 1);
        let all_ones_exp = exp_field == (1 << exp_bits) - 1;

        let mut r =
            IeeeFloat { sig: [sig_field], exp: 0, category: Category::Normal, sign, sem };

        if matches!(sem.nan_encoding, NanEncoding::NegativeZero)
            && sign
            && exp_field == 0
            && sig_field == 0
        {
            // The sign-bit-only pattern is the single NaN.
            r.category = Category::NaN;
            r.exp = sem.max_exp + 1;
            r.sig = [0];
        } else if sem.has_infinity() && all_ones_exp {
            r.exp = sem.max_exp + 1;
            let inf_sig: Limb = if sem.explicit_int_bit { 1 << (prec - 1) } else { 0 };
            if sig_field == inf_sig {
                // Exponent, significand meaningless.
                r.category = Category::Infinity;
                r.sig = [0];
                if sem.explicit_int_bit {
                    r.sig = [inf_sig];
                }
            } else {
                // Sign, exponent meaningless. Pseudo-NaNs of x87 land here
                // too.
                r.category = Category::NaN;
            }
        } else if matches!(sem.nan_encoding, NanEncoding::AllOnes)
            && all_ones_exp
            && sig_field == (1 << stored_sig_bits) - 1
        {
            r.category = Category::NaN;
            r.exp = sem.max_exp + 1;
        } else if exp_field == 0 && sig_field == 0 {
            // Exponent, significand meaningless.
            r.category = Category::Zero;
            r.exp = sem.min_exp - 1;
        } else {
            r.category = Category::Normal;
            if exp_field == 0 {
                // Denormal.
                r.exp = sem.min_exp;
            } else {
                r.exp = exp_field - sem.bias();
                if !sem.explicit_int_bit {
                    // Set the implicit integer bit.
                    sig::set_bit(&mut r.sig, prec - 1);
                }
            }
        }

        r
    }

    /// The interchange encoding of the value.
    pub fn to_bits(self) -> u128 {
        let sem = self.sem;
        let prec = sem.precision;
        let stored_sig_bits = if sem.explicit_int_bit { prec } else { prec - 1 };
        let all_ones_exp = ((1 as u128) << sem.exponent_bits()) - 1;
        let trailing_mask = ((1 as u128) << stored_sig_bits) - 1;

        let (exp_field, sig_field) = match self.category {
            Category::Zero => (0, 0),
            Category::Infinity => {
                let sig: u128 = if sem.explicit_int_bit { 1 << (prec - 1) } else { 0 };
                (all_ones_exp, sig)
            }
            Category::NaN => match sem.nan_encoding {
                NanEncoding::Ieee => (all_ones_exp, self.sig[0] & trailing_mask),
                NanEncoding::AllOnes => (all_ones_exp, trailing_mask),
                NanEncoding::NegativeZero => {
                    return 1 << (sem.bits - 1);
                }
            },
            Category::Normal => {
                let integer_bit = sig::get_bit(&self.sig, prec - 1);
                let exp_field = if self.exp == sem.min_exp && !integer_bit {
                    // Denormal.
                    0
                } else {
                    (self.exp + sem.bias()) as u128
                };
                (exp_field, self.sig[0] & trailing_mask)
            }
        };

        ((self.sign as u128) << (sem.bits - 1)) | (exp_field << stored_sig_bits) | sig_field
    }

    /// Converts an unsigned integer, rounding as directed.
    pub fn from_u128_r(sem: &'static Semantics, input: u128, round: Round) -> StatusAnd<Self> {
        IeeeFloat {
            sig: [input],
            exp: sem.precision as ExpInt - 1,
            category: Category::Normal,
            sign: false,
            sem,
        }
        .normalize(round, Loss::ExactlyZero)
    }

    /// Converts an unsigned integer with default rounding.
    pub fn from_u128(sem: &'static Semantics, input: u128) -> StatusAnd<Self> {
        Self::from_u128_r(sem, input, Round::NearestTiesToEven)
    }

    /// Converts a signed integer, rounding as directed.
    pub fn from_i128_r(sem: &'static Semantics, input: i128, round: Round) -> StatusAnd<Self> {
        if input < 0 {
            Self::from_u128_r(sem, input.wrapping_neg() as u128, -round).map(|r| -r)
        } else {
            Self::from_u128_r(sem, input as u128, round)
        }
    }

    /// Converts a signed integer with default rounding.
    pub fn from_i128(sem: &'static Semantics, input: i128) -> StatusAnd<Self> {
        Self::from_i128_r(sem, input, Round::NearestTiesToEven)
    }

    /// Converts an `f32`, exactly, into the binary32 format.
    pub fn from_f32(input: f32) -> Self {
        Self::from_bits(&crate::sem::SINGLE, input.to_bits() as u128)
    }

    /// Converts an `f64`, exactly, into the binary64 format.
    pub fn from_f64(input: f64) -> Self {
        Self::from_bits(&crate::sem::DOUBLE, input.to_bits() as u128)
    }

    /// Converts to an unsigned integer of the given bit `width`, rounding
    /// as directed, saturating on overflow. `is_exact` reports whether the
    /// result equals the input. NaN converts to zero with
    /// [`OpStatus::INVALID_OP`].
    pub fn to_u128_r(self, width: usize, round: Round, is_exact: &mut bool) -> StatusAnd<u128> {
        // The result of trying to convert a number too large.
        let overflow = if self.sign {
            // Negative numbers cannot be represented as unsigned.
            0
        } else {
            // Largest unsigned integer of the given width.
            !0 >> (128 - width)
        };

        *is_exact = false;

        match self.category {
            Category::NaN => OpStatus::INVALID_OP.and(0),

            Category::Infinity => OpStatus::INVALID_OP.and(overflow),

            Category::Zero => {
                // Negative zero can't be represented as an int.
                *is_exact = !self.sign;
                OpStatus::OK.and(0)
            }

            Category::Normal => {
                let mut r = 0;
                let prec = self.sem.precision;

                // Step 1: place our absolute value, with any fraction
                // truncated, in the destination.
                let truncated_bits = if self.exp < 0 {
                    // Our absolute value is less than one; truncate
                    // everything. For exponent -1 the integer bit
                    // represents .5, look at that. For smaller exponents
                    // the leftmost truncated bit is 0.
                    prec - 1 + (-self.exp) as usize
                } else {
                    // We want the most significant (exponent + 1) bits; the
                    // rest are truncated.
                    let bits = self.exp as usize + 1;

                    // Hopelessly large in magnitude?
                    if bits > width {
                        return OpStatus::INVALID_OP.and(overflow);
                    }

                    if bits < prec {
                        // We truncate (prec - bits) bits.
                        r = self.sig[0] >> (prec - bits);
                        prec - bits
                    } else {
                        // We want at least as many bits as are available.
                        r = self.sig[0] << (bits - prec);
                        0
                    }
                };

                // Step 2: work out any lost fraction, and increment the
                // absolute value if we would round away from zero.
                let mut loss = Loss::ExactlyZero;
                if truncated_bits > 0 {
                    loss = Loss::through_truncation(&self.sig, truncated_bits);
                    if loss != Loss::ExactlyZero
                        && self.round_away_from_zero(round, loss, truncated_bits)
                    {
                        r = r.wrapping_add(1);
                        if r == 0 {
                            return OpStatus::INVALID_OP.and(overflow); // Overflow.
                        }
                    }
                }

                // Step 3: check if we fit in the destination.
                if r > overflow {
                    return OpStatus::INVALID_OP.and(overflow);
                }

                if loss == Loss::ExactlyZero {
                    *is_exact = true;
                    OpStatus::OK.and(r)
                } else {
                    OpStatus::INEXACT.and(r)
                }
            }
        }
    }

    /// Converts to an unsigned integer, truncating, saturating on overflow.
    pub fn to_u128(self, width: usize) -> StatusAnd<u128> {
        self.to_u128_r(width, Round::TowardZero, &mut true)
    }

    /// Converts to a signed integer of the given bit `width`, rounding as
    /// directed, saturating on overflow.
    pub fn to_i128_r(self, width: usize, round: Round, is_exact: &mut bool) -> StatusAnd<i128> {
        assert!(width <= 128);
        *is_exact = false;

        if self.is_nan() {
            return OpStatus::INVALID_OP.and(0);
        }
        if self.is_zero() {
            *is_exact = true;
            return OpStatus::OK.and(0);
        }

        let sign = self.sign;
        // Largest magnitude representable in `width` signed bits.
        let limit: u128 = if sign { 1 << (width - 1) } else { (1 << (width - 1)) - 1 };
        let saturated: i128 = if sign {
            (1i128 << (width - 1)).wrapping_neg()
        } else {
            (1i128 << (width - 1)).wrapping_sub(1)
        };

        // Negating the rounding mode along with the value keeps directed
        // modes faithful.
        let magnitude_round = if sign { -round } else { round };
        let status;
        let magnitude =
            unpack!(status=, self.abs().to_u128_r(128, magnitude_round, is_exact));

        if status.intersects(OpStatus::INVALID_OP) || magnitude > limit {
            *is_exact = false;
            return OpStatus::INVALID_OP.and(saturated);
        }

        let r = if sign { (magnitude as i128).wrapping_neg() } else { magnitude as i128 };
        status.and(r)
    }

    /// Converts to a signed integer, truncating, saturating on overflow.
    pub fn to_i128(self, width: usize) -> StatusAnd<i128> {
        self.to_i128_r(width, Round::TowardZero, &mut true)
    }

    /// The `f64` with the same bits; the value must be in the binary64
    /// format.
    pub fn to_f64(self) -> f64 {
        debug_assert!(core::ptr::eq(self.sem, &crate::sem::DOUBLE));
        f64::from_bits(self.to_bits() as u64)
    }

    /// The `f32` with the same bits; the value must be in the binary32
    /// format.
    pub fn to_f32(self) -> f32 {
        debug_assert!(core::ptr::eq(self.sem, &crate::sem::SINGLE));
        f32::from_bits(self.to_bits() as u32)
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    /// Sets the quiet bit on a NaN, leaving everything else alone.
    pub(crate) fn make_quiet(mut self) -> Self {
        if self.category == Category::NaN && self.sem.has_signaling_nan() {
            self.sig[0] |= qnan_significand(self.sem);
        }
        self
    }

    /// The result of a NaN-producing binary operation: the first NaN
    /// operand, quieted; signaling operands raise INVALID_OP.
    fn nan_result(self, rhs: Self) -> StatusAnd<Self> {
        let signaling = self.is_signaling() || rhs.is_signaling();
        let r = if self.is_nan() { self } else { rhs }.make_quiet();
        if signaling { OpStatus::INVALID_OP.and(r) } else { OpStatus::OK.and(r) }
    }

    /// The positive overflow value when rounding away from zero: infinity,
    /// or the format's stand-in for it.
    /// Whether this sits on the top encoding of a format whose NaN is the
    /// all-ones pattern. That pattern is not a finite value; arithmetic
    /// that lands on it has overflowed.
    fn at_all_ones_nan(&self) -> bool {
        matches!(self.sem.non_finite, NonFinite::NanOnly)
            && matches!(self.sem.nan_encoding, NanEncoding::AllOnes)
            && self.exp == self.sem.max_exp
            && self.sig[0] == ((1 as Limb) << self.sem.precision) - 1
    }

    fn overflowed(sem: &'static Semantics) -> StatusAnd<Self> {
        let r = match sem.non_finite {
            NonFinite::Ieee => Self::inf(sem),
            NonFinite::NanOnly => Self::qnan(sem, None),
            NonFinite::FiniteOnly => Self::largest(sem),
        };
        (OpStatus::OVERFLOW | OpStatus::INEXACT).and(r)
    }

    /// Handle positive overflow. We either return infinity (as the format
    /// allows) or the largest finite number. For negative overflow, negate
    /// the `round` argument before calling.
    pub(crate) fn overflow_result(sem: &'static Semantics, round: Round) -> StatusAnd<Self> {
        match round {
            // Rounding away from zero?
            Round::NearestTiesToEven | Round::NearestTiesToAway | Round::TowardPositive => {
                Self::overflowed(sem)
            }
            // Otherwise we become the largest finite number.
            Round::TowardNegative | Round::TowardZero => {
                OpStatus::INEXACT.and(Self::largest(sem))
            }
        }
    }

    /// Returns `true` if, when truncating the current number, with `bit`
    /// the new LSB, with the given lost fraction and rounding mode, the
    /// result would need to be rounded away from zero (i.e. by increasing
    /// the significand). This routine must work for `Category::Zero` of
    /// both signs, and `Category::Normal` numbers.
    pub(crate) fn round_away_from_zero(&self, round: Round, loss: Loss, bit: usize) -> bool {
        // NaNs and infinities should not have lost fractions.
        assert!(self.is_finite_non_zero() || self.is_zero());

        // Current callers never pass this so we don't handle it.
        assert_ne!(loss, Loss::ExactlyZero);

        match round {
            Round::NearestTiesToAway => loss == Loss::ExactlyHalf || loss == Loss::MoreThanHalf,
            Round::NearestTiesToEven => {
                if loss == Loss::MoreThanHalf {
                    return true;
                }

                // Our zeros don't have a significand to test.
                if loss == Loss::ExactlyHalf && self.category != Category::Zero {
                    return sig::get_bit(&self.sig, bit);
                }

                false
            }
            Round::TowardZero => false,
            Round::TowardPositive => !self.sign,
            Round::TowardNegative => self.sign,
        }
    }

    /// Turns this value into a canonical zero of the given sign.
    fn canonical_zero(&mut self, sign: bool) {
        self.category = Category::Zero;
        self.sig = [0];
        self.exp = self.sem.min_exp - 1;
        self.sign = sign && self.sem.has_signed_zero();
    }

    /// Brings the extended intermediate form back into the format: places
    /// the significand MSB at the integer bit, rounds off any lost
    /// fraction, and applies the descriptor's overflow, underflow and zero
    /// policies.
    pub(crate) fn normalize(mut self, round: Round, mut loss: Loss) -> StatusAnd<Self> {
        if !self.is_finite_non_zero() {
            return OpStatus::OK.and(self);
        }

        let prec = self.sem.precision;

        // Before rounding normalize the exponent of Category::Normal
        // numbers.
        let mut omsb = sig::omsb(&self.sig);

        if omsb > 0 {
            // OMSB is numbered from 1. We want to place it in the integer
            // bit numbered PRECISION if possible, with a compensating change
            // in the exponent.
            let mut final_exp = self.exp.saturating_add(omsb as ExpInt - prec as ExpInt);

            // If the resulting exponent is too high, overflow according to
            // the rounding mode.
            if final_exp > self.sem.max_exp {
                let round = if self.sign { -round } else { round };
                return Self::overflow_result(self.sem, round).map(|r| r.copy_sign(self));
            }

            // Subnormal numbers have exponent min_exp, and their MSB is
            // forced based on that.
            if final_exp < self.sem.min_exp {
                final_exp = self.sem.min_exp;
            }

            // Shifting left is easy as we don't lose precision.
            if final_exp < self.exp {
                assert_eq!(loss, Loss::ExactlyZero);

                let exp_change = (self.exp - final_exp) as usize;
                sig::shift_left(&mut self.sig, &mut self.exp, exp_change);

                return OpStatus::OK.and(self);
            }

            // Shift right and capture any new lost fraction.
            if final_exp > self.exp {
                let exp_change = (final_exp - self.exp) as usize;
                loss = sig::shift_right(&mut self.sig, &mut self.exp, exp_change).combine(loss);

                // Keep OMSB up-to-date.
                omsb = omsb.saturating_sub(exp_change);
            }
        }

        // An exact result can still land on the all-ones NaN encoding.
        if self.at_all_ones_nan() {
            let round = if self.sign { -round } else { round };
            return Self::overflow_result(self.sem, round).map(|r| r.copy_sign(self));
        }

        // Now round the number according to round given the lost fraction.

        // As specified in IEEE 754, since we do not trap we do not report
        // underflow for exact results.
        if loss == Loss::ExactlyZero {
            // Canonicalize zeros.
            if omsb == 0 {
                let sign = self.sign;
                self.canonical_zero(sign);
            }

            return OpStatus::OK.and(self);
        }

        // Increment the significand if we're rounding away from zero.
        if self.round_away_from_zero(round, loss, 0) {
            if omsb == 0 {
                self.exp = self.sem.min_exp;
            }

            // We should never overflow.
            assert_eq!(sig::increment(&mut self.sig), 0);
            omsb = sig::omsb(&self.sig);

            // Did the significand increment overflow?
            if omsb == prec + 1 {
                // Renormalize by incrementing the exponent and shifting our
                // significand right one. However if we already have the
                // maximum exponent we overflow to infinity (or whatever the
                // format puts in its place).
                if self.exp == self.sem.max_exp {
                    return Self::overflowed(self.sem).map(|r| r.copy_sign(self));
                }

                let _: Loss = sig::shift_right(&mut self.sig, &mut self.exp, 1);

                return OpStatus::INEXACT.and(self);
            }

            // Rounding up can also step onto the all-ones NaN encoding.
            if self.at_all_ones_nan() {
                let round = if self.sign { -round } else { round };
                return Self::overflow_result(self.sem, round).map(|r| r.copy_sign(self));
            }
        }

        // The normal case - we were and are not denormal, and any
        // significand increment above didn't overflow.
        if omsb == prec {
            return OpStatus::INEXACT.and(self);
        }

        // We have a non-zero denormal.
        assert!(omsb < prec);

        // Canonicalize zeros.
        if omsb == 0 {
            let sign = self.sign;
            self.canonical_zero(sign);
        }

        // The Category::Zero case is a denormal that underflowed to zero.
        (OpStatus::UNDERFLOW | OpStatus::INEXACT).and(self)
    }
}

impl Neg for IeeeFloat {
    type Output = Self;
    fn neg(mut self) -> Self {
        // Neither the NaN nor the zero of an unsigned-zero format can
        // change sign.
        if !self.sem.has_signed_zero() && (self.is_zero() || self.is_nan()) {
            return self;
        }
        self.sign = !self.sign;
        self
    }
}

impl PartialEq for IeeeFloat {
    fn eq(&self, rhs: &Self) -> bool {
        self.partial_cmp(rhs) == Some(Ordering::Equal)
    }
}

impl PartialOrd for IeeeFloat {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        match (self.category, rhs.category) {
            (Category::NaN, _) | (_, Category::NaN) => None,

            (Category::Infinity, Category::Infinity) => Some((!self.sign).cmp(&(!rhs.sign))),

            (Category::Zero, Category::Zero) => Some(Ordering::Equal),

            (Category::Infinity, _) | (Category::Normal, Category::Zero) => {
                Some((!self.sign).cmp(&self.sign))
            }

            (_, Category::Infinity) | (Category::Zero, Category::Normal) => {
                Some(rhs.sign.cmp(&(!rhs.sign)))
            }

            (Category::Normal, Category::Normal) => {
                // Two normal numbers. Do they have the same sign?
                Some((!self.sign).cmp(&(!rhs.sign)).then_with(|| {
                    // Compare absolute values; invert result if negative.
                    let result = self.cmp_abs_normal(*rhs);

                    if self.sign { result.reverse() } else { result }
                }))
            }
        }
    }
}

impl Add for IeeeFloat {
    type Output = StatusAnd<Self>;
    fn add(self, rhs: Self) -> StatusAnd<Self> {
        self.add_r(rhs, Round::NearestTiesToEven)
    }
}

impl Sub for IeeeFloat {
    type Output = StatusAnd<Self>;
    fn sub(self, rhs: Self) -> StatusAnd<Self> {
        self.sub_r(rhs, Round::NearestTiesToEven)
    }
}

impl Mul for IeeeFloat {
    type Output = StatusAnd<Self>;
    fn mul(self, rhs: Self) -> StatusAnd<Self> {
        self.mul_r(rhs, Round::NearestTiesToEven)
    }
}

impl Div for IeeeFloat {
    type Output = StatusAnd<Self>;
    fn div(self, rhs: Self) -> StatusAnd<Self> {
        self.div_r(rhs, Round::NearestTiesToEven)
    }
}

impl Rem for IeeeFloat {
    type Output = StatusAnd<Self>;
    fn rem(self, rhs: Self) -> StatusAnd<Self> {
        self.c_fmod(rhs)
    }
}

impl fmt::Debug for IeeeFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?} | {}{:?} * 2^{})",
            self,
            self.category,
            if self.sign { "-" } else { "+" },
            self.sig,
            self.exp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem::{DOUBLE, FLOAT8_E4M3FN, FLOAT8_E5M2FNUZ, SINGLE};

    #[test]
    fn category_dispatch_basics() {
        let one = IeeeFloat::from_u128(&SINGLE, 1).value;
        let inf = IeeeFloat::inf(&SINGLE);
        assert!((one + inf).value.is_infinite());
        assert!((inf - inf).value.is_nan());
        assert_eq!((inf - inf).status, OpStatus::INVALID_OP);
        assert!((one / IeeeFloat::zero(&SINGLE)).value.is_infinite());
    }

    #[test]
    fn unsigned_zero_format_never_produces_negative_zero() {
        let sem = &FLOAT8_E5M2FNUZ;
        let one = IeeeFloat::from_u128(sem, 1).value;
        let z = (one - one).value;
        assert!(z.is_zero());
        assert!(!z.is_negative());
        assert!(!(-z).is_negative());
    }

    #[test]
    fn nan_only_overflow_produces_nan() {
        let sem = &FLOAT8_E4M3FN;
        let big = IeeeFloat::largest(sem);
        let r = big + big;
        assert!(r.value.is_nan());
        assert_eq!(r.status, OpStatus::OVERFLOW | OpStatus::INEXACT);
    }

    #[test]
    fn interchange_round_trip() {
        for bits in [0x0000_0000_0000_0000u128, 0x8000_0000_0000_0000, 0x3FF0_0000_0000_0000, 0x000F_FFFF_FFFF_FFFF, 0x7FF0_0000_0000_0000, 0x7FF8_0000_0000_0001] {
            assert_eq!(IeeeFloat::from_bits(&DOUBLE, bits).to_bits(), bits);
        }
    }
}
