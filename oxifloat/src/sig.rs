//! Fixed-width significand primitives.
//!
//! Significands are little-endian limb vectors holding the absolute value
//! of a number's significand, integer bit included. All routines here work
//! on plain limb slices, track discarded precision as a
//! [`Loss`](crate::rounding::Loss), and never allocate.

use crate::rounding::Loss;
use crate::ExpInt;
use core::cmp::Ordering;
use core::iter;
use core::mem;

/// Fundamental unit of significand arithmetic. Wide enough that the largest
/// supported precision (quad, 113 bits) fits in a single limb.
pub(crate) type Limb = u128;

/// Bit width of a [`Limb`].
pub(crate) const LIMB_BITS: usize = 128;

/// Number of limbs needed to hold `bits` bits.
pub(crate) fn limbs_for_bits(bits: usize) -> usize {
    (bits + LIMB_BITS - 1) / LIMB_BITS
}

pub(crate) fn is_all_zeros(limbs: &[Limb]) -> bool {
    limbs.iter().all(|&l| l == 0)
}

/// One, not zero, based LSB. That is, returns 0 for a zeroed significand.
pub(crate) fn olsb(limbs: &[Limb]) -> usize {
    limbs
        .iter()
        .enumerate()
        .find(|(_, &limb)| limb != 0)
        .map_or(0, |(i, limb)| i * LIMB_BITS + limb.trailing_zeros() as usize + 1)
}

/// One, not zero, based MSB. That is, returns 0 for a zeroed significand.
pub(crate) fn omsb(limbs: &[Limb]) -> usize {
    limbs
        .iter()
        .enumerate()
        .rfind(|(_, &limb)| limb != 0)
        .map_or(0, |(i, limb)| (i + 1) * LIMB_BITS - limb.leading_zeros() as usize)
}

/// Unsigned comparison of two equal-length significands.
pub(crate) fn cmp(a: &[Limb], b: &[Limb]) -> Ordering {
    assert_eq!(a.len(), b.len());
    for (a, b) in a.iter().zip(b).rev() {
        match a.cmp(b) {
            Ordering::Equal => {}
            o => return o,
        }
    }

    Ordering::Equal
}

pub(crate) fn get_bit(limbs: &[Limb], bit: usize) -> bool {
    limbs[bit / LIMB_BITS] & (1 << (bit % LIMB_BITS)) != 0
}

pub(crate) fn set_bit(limbs: &mut [Limb], bit: usize) {
    limbs[bit / LIMB_BITS] |= 1 << (bit % LIMB_BITS);
}

pub(crate) fn clear_bit(limbs: &mut [Limb], bit: usize) {
    limbs[bit / LIMB_BITS] &= !(1 << (bit % LIMB_BITS));
}

/// Shifts `dst` left `bits` bits, subtracting `bits` from its exponent.
pub(crate) fn shift_left(dst: &mut [Limb], exp: &mut ExpInt, bits: usize) {
    if bits > 0 {
        // The exponent must not underflow.
        *exp = exp.checked_sub(bits as ExpInt).unwrap();

        // Jump is the inter-limb jump; shift is the intra-limb shift.
        let jump = bits / LIMB_BITS;
        let shift = bits % LIMB_BITS;

        for i in (0..dst.len()).rev() {
            let mut limb;

            if i < jump {
                limb = 0;
            } else {
                // dst[i] comes from the two limbs src[i - jump] and, if we
                // have an intra-limb shift, src[i - jump - 1].
                limb = dst[i - jump];
                if shift > 0 {
                    limb <<= shift;
                    if i > jump {
                        limb |= dst[i - jump - 1] >> (LIMB_BITS - shift);
                    }
                }
            }

            dst[i] = limb;
        }
    }
}

/// Shifts `dst` right `bits` bits, noting the lost fraction.
pub(crate) fn shift_right(dst: &mut [Limb], exp: &mut ExpInt, bits: usize) -> Loss {
    let loss = Loss::through_truncation(dst, bits);

    if bits > 0 {
        // The exponent must not overflow.
        *exp = exp.checked_add(bits as ExpInt).unwrap();

        // Jump is the inter-limb jump; shift is the intra-limb shift.
        let jump = bits / LIMB_BITS;
        let shift = bits % LIMB_BITS;

        // This leaves the most significant `bits` bits of the result at zero.
        for i in 0..dst.len() {
            let mut limb;

            if i + jump >= dst.len() {
                limb = 0;
            } else {
                limb = dst[i + jump];
                if shift > 0 {
                    limb >>= shift;
                    if i + jump + 1 < dst.len() {
                        limb |= dst[i + jump + 1] << (LIMB_BITS - shift);
                    }
                }
            }

            dst[i] = limb;
        }
    }

    loss
}

/// Copies the bit vector of width `src_bits` from `src`, starting at bit
/// `src_lsb`, to `dst`, such that bit `src_lsb` becomes the least
/// significant bit of `dst`. All high bits above `src_bits` in `dst` are
/// zero-filled.
pub(crate) fn extract(dst: &mut [Limb], src: &[Limb], src_bits: usize, src_lsb: usize) {
    if src_bits == 0 {
        return;
    }

    let dst_limbs = limbs_for_bits(src_bits);
    assert!(dst_limbs <= dst.len());

    let src = &src[src_lsb / LIMB_BITS..];
    dst[..dst_limbs].copy_from_slice(&src[..dst_limbs]);

    let shift = src_lsb % LIMB_BITS;
    let _: Loss = shift_right(&mut dst[..dst_limbs], &mut 0, shift);

    // We now have (dst_limbs * LIMB_BITS - shift) bits from `src` in `dst`.
    // If this is less than src_bits, append the rest, else clear the high
    // bits.
    let n = dst_limbs * LIMB_BITS - shift;
    if n < src_bits {
        let mask = (1 << (src_bits - n)) - 1;
        dst[dst_limbs - 1] |= (src[dst_limbs] & mask) << (n % LIMB_BITS);
    } else if n > src_bits && src_bits % LIMB_BITS > 0 {
        dst[dst_limbs - 1] &= (1 << (src_bits % LIMB_BITS)) - 1;
    }

    // Clear high limbs.
    for x in &mut dst[dst_limbs..] {
        *x = 0;
    }
}

/// We want the most significant `precision` bits of `src`. There may not be
/// that many; extract what we can.
pub(crate) fn from_limbs(dst: &mut [Limb], src: &[Limb], precision: usize) -> (Loss, ExpInt) {
    let omsb = omsb(src);

    if precision <= omsb {
        extract(dst, src, precision, omsb - precision);
        (Loss::through_truncation(src, omsb - precision), omsb as ExpInt - 1)
    } else {
        extract(dst, src, omsb, 0);
        (Loss::ExactlyZero, precision as ExpInt - 1)
    }
}

/// For every consecutive chunk of `bits` bits from `limbs`, going from the
/// most significant to the least significant bits, call `f` to transform
/// those bits and store the result back.
pub(crate) fn each_chunk<F: FnMut(Limb) -> Limb>(limbs: &mut [Limb], bits: usize, mut f: F) {
    assert_eq!(LIMB_BITS % bits, 0);
    for limb in limbs.iter_mut().rev() {
        let mut r = 0;
        for i in (0..LIMB_BITS / bits).rev() {
            r |= f((*limb >> (i * bits)) & ((1 << bits) - 1)) << (i * bits);
        }
        *limb = r;
    }
}

/// Increment in-place, return the carry flag.
pub(crate) fn increment(dst: &mut [Limb]) -> Limb {
    for x in dst {
        *x = x.wrapping_add(1);
        if *x != 0 {
            return 0;
        }
    }

    1
}

/// Decrement in-place, return the borrow flag.
pub(crate) fn decrement(dst: &mut [Limb]) -> Limb {
    for x in dst {
        *x = x.wrapping_sub(1);
        if *x != !0 {
            return 0;
        }
    }

    1
}

/// `a += b + c` where `c` is zero or one. Returns the carry flag.
pub(crate) fn add(a: &mut [Limb], b: &[Limb], mut c: Limb) -> Limb {
    assert!(c <= 1);

    for (a, &b) in iter::zip(a, b) {
        let (r, overflow) = a.overflowing_add(b);
        let (r, overflow2) = r.overflowing_add(c);
        *a = r;
        c = (overflow | overflow2) as Limb;
    }

    c
}

/// `a -= b + c` where `c` is zero or one. Returns the borrow flag.
pub(crate) fn sub(a: &mut [Limb], b: &[Limb], mut c: Limb) -> Limb {
    assert!(c <= 1);

    for (a, &b) in iter::zip(a, b) {
        let (r, overflow) = a.overflowing_sub(b);
        let (r, overflow2) = r.overflowing_sub(c);
        *a = r;
        c = (overflow | overflow2) as Limb;
    }

    c
}

/// `a += b` or `a -= b`, for signed-magnitude significands with attached
/// exponents. Does not preserve `b`. The result is not normalized; a guard
/// bit position must be available so the addition cannot carry out.
pub(crate) fn add_or_sub(
    a_sig: &mut [Limb],
    a_exp: &mut ExpInt,
    a_sign: &mut bool,
    b_sig: &mut [Limb],
    b_exp: ExpInt,
    b_sign: bool,
) -> Loss {
    // Are we bigger exponent-wise than the RHS?
    let bits = *a_exp - b_exp;

    // Determine if the operation on the absolute values is effectively an
    // addition or subtraction. Subtraction is more subtle than one might
    // naively expect.
    if *a_sign ^ b_sign {
        let (reverse, loss);

        if bits == 0 {
            reverse = cmp(a_sig, b_sig) == Ordering::Less;
            loss = Loss::ExactlyZero;
        } else if bits > 0 {
            loss = shift_right(b_sig, &mut 0, (bits - 1) as usize);
            shift_left(a_sig, a_exp, 1);
            reverse = false;
        } else {
            loss = shift_right(a_sig, a_exp, (-bits - 1) as usize);
            shift_left(b_sig, &mut 0, 1);
            reverse = true;
        }

        let borrow = (loss != Loss::ExactlyZero) as Limb;
        if reverse {
            // The shifts above are intended to ensure that no borrow is
            // necessary.
            assert_eq!(sub(b_sig, a_sig, borrow), 0);
            a_sig.copy_from_slice(b_sig);
            *a_sign = !*a_sign;
        } else {
            assert_eq!(sub(a_sig, b_sig, borrow), 0);
        }

        // Invert the lost fraction - it was on the RHS and subtracted.
        match loss {
            Loss::LessThanHalf => Loss::MoreThanHalf,
            Loss::MoreThanHalf => Loss::LessThanHalf,
            _ => loss,
        }
    } else {
        let loss = if bits > 0 {
            shift_right(b_sig, &mut 0, bits as usize)
        } else {
            shift_right(a_sig, a_exp, -bits as usize)
        };
        // We have a guard bit; generating a carry cannot happen.
        assert_eq!(add(a_sig, b_sig, 0), 0);
        loss
    }
}

/// `[low, high] = a * b`.
///
/// This cannot overflow, because
/// `(n - 1) * (n - 1) + 2 * (n - 1) == (n - 1) * (n + 1)`
/// which is less than n<sup>2</sup>.
pub(crate) fn widening_mul(a: Limb, b: Limb) -> [Limb; 2] {
    let mut wide = [0, 0];

    if a == 0 || b == 0 {
        return wide;
    }

    const HALF_BITS: usize = LIMB_BITS / 2;

    let select = |limb, i| (limb >> (i * HALF_BITS)) & ((1 << HALF_BITS) - 1);
    for i in 0..2 {
        for j in 0..2 {
            let mut x = [select(a, i) * select(b, j), 0];
            shift_left(&mut x, &mut 0, (i + j) * HALF_BITS);
            assert_eq!(add(&mut wide, &x, 0), 0);
        }
    }

    wide
}

/// `dst = a * b` (for normal `a` and `b`). Returns the lost fraction.
pub(crate) fn mul<'a>(
    dst: &mut [Limb],
    exp: &mut ExpInt,
    mut a: &'a [Limb],
    mut b: &'a [Limb],
    precision: usize,
) -> Loss {
    // Put the narrower number on `a` for fewer loops below.
    if a.len() > b.len() {
        mem::swap(&mut a, &mut b);
    }

    for x in &mut dst[..b.len()] {
        *x = 0;
    }

    for i in 0..a.len() {
        let mut carry = 0;
        for j in 0..b.len() {
            let [low, mut high] = widening_mul(a[i], b[j]);

            // Now add carry.
            let (low, overflow) = low.overflowing_add(carry);
            high += overflow as Limb;

            // And now `dst[i + j]`, and store the new low part there.
            let (low, overflow) = low.overflowing_add(dst[i + j]);
            high += overflow as Limb;

            dst[i + j] = low;
            carry = high;
        }
        dst[i + b.len()] = carry;
    }

    // The full product of two p-bit significands has 2p bits, with two
    // digits left of the radix point (plus a headroom bit that is still
    // zero here). Move the radix point left by two, then bring the result
    // from "2p significant bits" back to "p significant bits".
    *exp += 2;
    *exp -= precision as ExpInt + 1;

    // In case the MSB resides left of the radix point, shift the mantissa
    // right to put the MSB right before the radix point.
    //
    // Note that the result is not normalized when "omsb < precision"; the
    // caller needs to normalize if a normalized value is expected.
    let omsb = omsb(dst);
    if omsb <= precision { Loss::ExactlyZero } else { shift_right(dst, exp, omsb - precision) }
}

/// `quotient = dividend / divisor`. Returns the lost fraction.
/// Does not preserve `dividend` or `divisor`.
pub(crate) fn div(
    quotient: &mut [Limb],
    exp: &mut ExpInt,
    dividend: &mut [Limb],
    divisor: &mut [Limb],
    precision: usize,
) -> Loss {
    // Normalize the divisor.
    let bits = precision - omsb(divisor);
    shift_left(divisor, &mut 0, bits);
    *exp += bits as ExpInt;

    // Normalize the dividend.
    let bits = precision - omsb(dividend);
    shift_left(dividend, exp, bits);

    // Division by a power of two is a copy.
    let olsb_divisor = olsb(divisor);
    if olsb_divisor == precision {
        quotient.copy_from_slice(dividend);
        return Loss::ExactlyZero;
    }

    // Ensure the dividend >= divisor initially for the loop below.
    // Incidentally, this means that the division loop below is guaranteed
    // to set the integer bit to one.
    if cmp(dividend, divisor) == Ordering::Less {
        shift_left(dividend, exp, 1);
        assert_ne!(cmp(dividend, divisor), Ordering::Less)
    }

    // Helper for figuring out the lost fraction.
    let lost_fraction = |dividend: &[Limb], divisor: &[Limb]| match cmp(dividend, divisor) {
        Ordering::Greater => Loss::MoreThanHalf,
        Ordering::Equal => Loss::ExactlyHalf,
        Ordering::Less => {
            if is_all_zeros(dividend) {
                Loss::ExactlyZero
            } else {
                Loss::LessThanHalf
            }
        }
    };

    // Try to perform a (much faster) short division for small divisors.
    let divisor_bits = precision - (olsb_divisor - 1);
    macro_rules! try_short_div {
        ($W:ty, $H:ty, $half:expr) => {
            if divisor_bits * 2 <= $half {
                // Extract the small divisor.
                let _: Loss = shift_right(divisor, &mut 0, olsb_divisor - 1);
                let divisor = divisor[0] as $H as $W;

                // Shift the dividend to produce a quotient with the unit bit
                // set.
                let top_limb = *dividend.last().unwrap();
                let mut rem = (top_limb >> (LIMB_BITS - (divisor_bits - 1))) as $H;
                shift_left(dividend, &mut 0, divisor_bits - 1);

                // Apply short division in place on $H (of $half bits) chunks.
                each_chunk(dividend, $half, |chunk| {
                    let chunk = chunk as $H;
                    let combined = ((rem as $W) << $half) | (chunk as $W);
                    rem = (combined % divisor) as $H;
                    (combined / divisor) as $H as Limb
                });
                quotient.copy_from_slice(dividend);

                return lost_fraction(&[(rem as Limb) << 1], &[divisor as Limb]);
            }
        };
    }

    try_short_div!(u32, u16, 16);
    try_short_div!(u64, u32, 32);
    try_short_div!(u128, u64, 64);

    // Zero the quotient before setting bits in it.
    for x in &mut quotient[..limbs_for_bits(precision)] {
        *x = 0;
    }

    // Long division.
    for bit in (0..precision).rev() {
        if cmp(dividend, divisor) != Ordering::Less {
            sub(dividend, divisor, 0);
            set_bit(quotient, bit);
        }
        shift_left(dividend, &mut 0, 1);
    }

    lost_fraction(dividend, divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_scans() {
        assert_eq!(olsb(&[0]), 0);
        assert_eq!(omsb(&[0]), 0);
        assert_eq!(olsb(&[0b1010]), 2);
        assert_eq!(omsb(&[0b1010]), 4);
        assert_eq!(olsb(&[0, 1]), LIMB_BITS + 1);
        assert_eq!(omsb(&[!0, 1]), LIMB_BITS + 1);
    }

    #[test]
    fn shifts_track_exponent() {
        let mut sig = [0b1011u128];
        let mut exp = 10;
        shift_left(&mut sig, &mut exp, 3);
        assert_eq!(sig, [0b1011_000]);
        assert_eq!(exp, 7);

        let loss = shift_right(&mut sig, &mut exp, 4);
        assert_eq!(sig, [0b101]);
        assert_eq!(exp, 11);
        assert_eq!(loss, Loss::ExactlyHalf);
    }

    #[test]
    fn widening_mul_carries() {
        assert_eq!(widening_mul(0, !0), [0, 0]);
        assert_eq!(widening_mul(!0, !0), [1, !0 - 1]);
        assert_eq!(widening_mul(1 << 127, 2), [0, 1]);
    }

    #[test]
    fn extract_across_limbs() {
        let src = [0xCD_u128 << 120, 0xAB];
        let mut dst = [0u128; 2];
        // Take the 16 bits straddling the limb boundary.
        extract(&mut dst, &src, 16, 120);
        assert_eq!(dst, [0xABCD, 0]);
    }

    #[test]
    fn short_and_long_division_agree() {
        // 7 / 3 at 8 bits of precision: 1.0010101(01...) truncated.
        let mut quotient = [0u128];
        let mut exp = 0;
        let loss = div(&mut quotient, &mut exp, &mut [7], &mut [3], 8);
        assert_eq!(quotient, [0b1001_0101]);
        assert_eq!(loss, Loss::LessThanHalf);
    }
}
