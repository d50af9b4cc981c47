//! Text conversions: parsing decimal and hexadecimal literals, and the
//! round-trippable decimal `Display` rendering.
//!
//! Parsing is correctly rounded. Decimal literals go through a
//! Clinger-style loop: the significand and the needed power of five are
//! computed at increasing working precisions until the accumulated error
//! bound proves the truncated result rounds correctly.

use crate::error::ParseError;
use crate::ieee::IeeeFloat;
use crate::rounding::{Loss, Round};
use crate::sem::Semantics;
use crate::sig::{self, Limb, LIMB_BITS};
use crate::status::{unpack, OpStatus, StatusAnd};
use crate::{Category, ExpInt};
use core::fmt::{self, Write};
use core::{cmp, mem};
use smallvec::{smallvec, SmallVec};

impl IeeeFloat {
    /// Parses a decimal or hexadecimal (`0x`-prefixed, `p`-exponent)
    /// literal, rounding as directed. The special spellings `inf`,
    /// `INFINITY`, `nan` and `NaN` are accepted, with an optional sign.
    ///
    /// Syntax errors are reported through [`ParseError`]; out-of-range
    /// values never fail, they round and report overflow or underflow in
    /// the status.
    pub fn from_str_r(
        sem: &'static Semantics,
        mut s: &str,
        mut round: Round,
    ) -> Result<StatusAnd<Self>, ParseError> {
        if s.is_empty() {
            return Err(ParseError::InvalidLength);
        }

        // Handle special cases.
        match s {
            "inf" | "INFINITY" => return Ok(OpStatus::OK.and(Self::inf(sem))),
            "-inf" | "-INFINITY" => return Ok(OpStatus::OK.and(-Self::inf(sem))),
            "nan" | "NaN" => return Ok(OpStatus::OK.and(Self::qnan(sem, None))),
            "-nan" | "-NaN" => return Ok(OpStatus::OK.and(-Self::qnan(sem, None))),
            _ => {}
        }

        // Handle a leading minus sign.
        let minus = s.starts_with('-');
        if minus || s.starts_with('+') {
            s = &s[1..];
            if s.is_empty() {
                return Err(ParseError::NoDigits);
            }
        }

        // Adjust the rounding mode for the absolute value below.
        if minus {
            round = -round;
        }

        let r = if s.starts_with("0x") || s.starts_with("0X") {
            s = &s[2..];
            if s.is_empty() {
                return Err(ParseError::SignificandNoDigits);
            }
            from_hexadecimal_string(sem, s, round)?
        } else {
            from_decimal_string(sem, s, round)?
        };

        Ok(r.map(|r| if minus { -r } else { r }))
    }

    /// [`from_str_r`](Self::from_str_r) with default rounding.
    pub fn from_str(sem: &'static Semantics, s: &str) -> Result<StatusAnd<Self>, ParseError> {
        Self::from_str_r(sem, s, Round::NearestTiesToEven)
    }
}

fn from_hexadecimal_string(
    sem: &'static Semantics,
    s: &str,
    round: Round,
) -> Result<StatusAnd<IeeeFloat>, ParseError> {
    let mut r = IeeeFloat { sig: [0], exp: 0, category: Category::Normal, sign: false, sem };

    let mut any_digits = false;
    let mut has_exp = false;
    let mut bit_pos = LIMB_BITS as isize;
    let mut loss = None;

    // Without leading or trailing zeros, irrespective of the dot.
    let mut first_sig_digit = None;
    let mut dot = s.len();

    for (p, c) in s.char_indices() {
        // Skip leading zeros and any (hexa)decimal point.
        if c == '.' {
            if dot != s.len() {
                return Err(ParseError::MultipleDots);
            }
            dot = p;
        } else if let Some(hex_value) = c.to_digit(16) {
            any_digits = true;

            if first_sig_digit.is_none() {
                if hex_value == 0 {
                    continue;
                }
                first_sig_digit = Some(p);
            }

            // Store the number while we have space.
            bit_pos -= 4;
            if bit_pos >= 0 {
                r.sig[0] |= (hex_value as Limb) << bit_pos;
            // If zero or one-half (the hexadecimal digit 8) are followed
            // by non-zero, they're a little more than zero or one-half.
            } else if let Some(ref mut loss) = loss {
                if hex_value != 0 {
                    if *loss == Loss::ExactlyZero {
                        *loss = Loss::LessThanHalf;
                    }
                    if *loss == Loss::ExactlyHalf {
                        *loss = Loss::MoreThanHalf;
                    }
                }
            } else {
                loss = Some(match hex_value {
                    0 => Loss::ExactlyZero,
                    1..=7 => Loss::LessThanHalf,
                    8 => Loss::ExactlyHalf,
                    9..=15 => Loss::MoreThanHalf,
                    _ => unreachable!(),
                });
            }
        } else if c == 'p' || c == 'P' {
            if !any_digits {
                return Err(ParseError::SignificandNoDigits);
            }

            if dot == s.len() {
                dot = p;
            }

            let mut chars = s[p + 1..].chars().peekable();

            // Adjust for the given exponent.
            let exp_minus = chars.peek() == Some(&'-');
            if exp_minus || chars.peek() == Some(&'+') {
                chars.next();
            }

            for c in chars {
                if let Some(value) = c.to_digit(10) {
                    has_exp = true;
                    r.exp = r.exp.saturating_mul(10).saturating_add(value as ExpInt);
                } else {
                    return Err(ParseError::InvalidExponentChar);
                }
            }
            if !has_exp {
                return Err(ParseError::ExponentNoDigits);
            }

            if exp_minus {
                r.exp = -r.exp;
            }

            break;
        } else {
            return Err(ParseError::InvalidSignificandChar);
        }
    }
    if !any_digits {
        return Err(ParseError::SignificandNoDigits);
    }

    // Hex floats require an exponent but not a hexadecimal point.
    if !has_exp {
        return Err(ParseError::HexExponentRequired);
    }

    // Ignore the exponent if we are zero.
    let first_sig_digit = match first_sig_digit {
        Some(p) => p,
        None => return Ok(OpStatus::OK.and(IeeeFloat::zero(sem))),
    };

    // Calculate the exponent adjustment implicit in the number of
    // significant digits and adjust for writing the significand starting
    // at the most significant nibble.
    let exp_adjustment = if dot > first_sig_digit {
        ExpInt::try_from(dot - first_sig_digit).unwrap_or(ExpInt::MAX)
    } else {
        ExpInt::try_from(first_sig_digit - dot - 1)
            .map_or(ExpInt::MIN, |adjustment: ExpInt| -adjustment)
    };
    let exp_adjustment = exp_adjustment
        .saturating_mul(4)
        .saturating_sub(1)
        .saturating_add(sem.precision as ExpInt)
        .saturating_sub(LIMB_BITS as ExpInt);
    r.exp = r.exp.saturating_add(exp_adjustment);

    Ok(r.normalize(round, loss.unwrap_or(Loss::ExactlyZero)))
}

fn from_decimal_string(
    sem: &'static Semantics,
    s: &str,
    round: Round,
) -> Result<StatusAnd<IeeeFloat>, ParseError> {
    // Given a normal decimal floating point number of the form
    //
    //   dddd.dddd[eE][+-]ddd
    //
    // where the decimal point and exponent are optional, fill out the
    // variables below. Exponent is appropriate if the significand is
    // treated as an integer, and normalized_exp if the significand
    // is taken to have the decimal point after a single leading
    // non-zero digit.
    //
    // If the value is zero, first_sig_digit is None.

    let mut any_digits = false;
    let mut dec_exp = 0i32;

    // Without leading or trailing zeros, irrespective of the dot.
    let mut first_sig_digit = None;
    let mut last_sig_digit = 0;
    let mut dot = s.len();

    for (p, c) in s.char_indices() {
        if c == '.' {
            if dot != s.len() {
                return Err(ParseError::MultipleDots);
            }
            dot = p;
        } else if let Some(dec_value) = c.to_digit(10) {
            any_digits = true;

            if dec_value != 0 {
                if first_sig_digit.is_none() {
                    first_sig_digit = Some(p);
                }
                last_sig_digit = p;
            }
        } else if c == 'e' || c == 'E' {
            if !any_digits {
                return Err(ParseError::SignificandNoDigits);
            }

            if dot == s.len() {
                dot = p;
            }

            let mut chars = s[p + 1..].chars().peekable();

            // Adjust for the given exponent.
            let exp_minus = chars.peek() == Some(&'-');
            if exp_minus || chars.peek() == Some(&'+') {
                chars.next();
            }

            any_digits = false;
            for c in chars {
                if let Some(value) = c.to_digit(10) {
                    any_digits = true;
                    dec_exp = dec_exp.saturating_mul(10).saturating_add(value as i32);
                } else {
                    return Err(ParseError::InvalidExponentChar);
                }
            }
            if !any_digits {
                return Err(ParseError::ExponentNoDigits);
            }

            if exp_minus {
                dec_exp = -dec_exp;
            }

            break;
        } else {
            return Err(ParseError::InvalidSignificandChar);
        }
    }
    if !any_digits {
        return Err(ParseError::SignificandNoDigits);
    }

    // Test if we have a zero number allowing for non-zero exponents.
    let first_sig_digit = match first_sig_digit {
        Some(p) => p,
        None => return Ok(OpStatus::OK.and(IeeeFloat::zero(sem))),
    };

    // Adjust the exponents for any decimal point.
    if dot > last_sig_digit {
        dec_exp = dec_exp.saturating_add((dot - last_sig_digit - 1) as i32);
    } else {
        dec_exp = dec_exp.saturating_sub((last_sig_digit - dot) as i32);
    }
    let significand_digits = last_sig_digit - first_sig_digit + 1
        - (dot > first_sig_digit && dot < last_sig_digit) as usize;
    let normalized_exp = dec_exp.saturating_add(significand_digits as i32 - 1);

    // Handle the cases where exponents are obviously too large or too
    // small. Writing L for log 10 / log 2, a number d.ddddd*10^dec_exp
    // definitely overflows if
    //
    //       (dec_exp - 1) * L >= MAX_EXP
    //
    // and definitely underflows to zero where
    //
    //       (dec_exp + 1) * L <= MIN_EXP - PRECISION
    //
    // With integer arithmetic the tightest bounds for L are
    //
    //       93/28 < L < 196/59            [ numerator <= 256 ]
    //       42039/12655 < L < 28738/8651  [ numerator <= 65536 ]

    // Check for MAX_EXP.
    if normalized_exp.saturating_sub(1).saturating_mul(42039) >= 12655 * sem.max_exp {
        // Overflow and round.
        return Ok(IeeeFloat::overflow_result(sem, round));
    }

    // Check for MIN_EXP.
    if normalized_exp.saturating_add(1).saturating_mul(28738)
        <= 8651 * (sem.min_exp - sem.precision as i32)
    {
        // Underflow to zero and round.
        let r = if round == Round::TowardPositive {
            IeeeFloat::smallest(sem)
        } else {
            IeeeFloat::zero(sem)
        };
        return Ok((OpStatus::UNDERFLOW | OpStatus::INEXACT).and(r));
    }

    // A tight upper bound on number of bits required to hold an
    // N-digit decimal integer is N * 196 / 59. Allocate enough space
    // to hold the full significand, and an extra limb required by
    // the multiplication.
    let max_limbs = sig::limbs_for_bits(1 + 196 * significand_digits / 59);
    let mut dec_sig: SmallVec<[Limb; 1]> = SmallVec::with_capacity(max_limbs);

    // Convert to binary efficiently - we do almost all multiplication
    // in a Limb. When this would overflow do we do a single
    // bignum multiplication, and then revert again to multiplication
    // in a Limb.
    let mut chars = s[first_sig_digit..=last_sig_digit].chars();
    loop {
        let mut val = 0;
        let mut multiplier = 1;

        loop {
            let dec_value = match chars.next() {
                Some('.') => continue,
                Some(c) => match c.to_digit(10) {
                    Some(d) => d,
                    None => return Err(ParseError::InvalidSignificandChar),
                },
                None => break,
            };

            multiplier *= 10;
            val = val * 10 + dec_value as Limb;

            // The maximum number that can be multiplied by ten with any
            // digit added without overflowing a Limb.
            if multiplier > (!0 - 9) / 10 {
                break;
            }
        }

        // If we've consumed no digits, we're done.
        if multiplier == 1 {
            break;
        }

        // Multiply out the current limb.
        let mut carry = val;
        for x in &mut dec_sig {
            let [low, mut high] = sig::widening_mul(*x, multiplier);

            // Now add carry.
            let (low, overflow) = low.overflowing_add(carry);
            high += overflow as Limb;

            *x = low;
            carry = high;
        }

        // If we had carry, we need another limb (likely but not guaranteed).
        if carry > 0 {
            dec_sig.push(carry);
        }
    }

    // Calculate pow(5, abs(dec_exp)) into `pow5_full`.
    // The *_calc buffers are reused scratch space, as an optimization.
    let (pow5_full, mut pow5_calc, mut sig_calc, mut sig_scratch_calc) = {
        let mut power = dec_exp.unsigned_abs() as usize;

        const FIRST_EIGHT_POWERS: [Limb; 8] = [1, 5, 25, 125, 625, 3125, 15625, 78125];

        let mut p5_scratch = smallvec![];
        let mut p5: SmallVec<[Limb; 1]> = smallvec![FIRST_EIGHT_POWERS[4]];

        let mut r_scratch = smallvec![];
        let mut r: SmallVec<[Limb; 1]> = smallvec![FIRST_EIGHT_POWERS[power & 7]];
        power >>= 3;

        while power > 0 {
            // Calculate pow(5,pow(2,n+3)).
            p5_scratch.resize(p5.len() * 2, 0);
            let _: Loss = sig::mul(&mut p5_scratch, &mut 0, &p5, &p5, p5.len() * 2 * LIMB_BITS);
            while p5_scratch.last() == Some(&0) {
                p5_scratch.pop();
            }
            mem::swap(&mut p5, &mut p5_scratch);

            if power & 1 != 0 {
                r_scratch.resize(r.len() + p5.len(), 0);
                let _: Loss =
                    sig::mul(&mut r_scratch, &mut 0, &r, &p5, (r.len() + p5.len()) * LIMB_BITS);
                while r_scratch.last() == Some(&0) {
                    r_scratch.pop();
                }
                mem::swap(&mut r, &mut r_scratch);
            }

            power >>= 1;
        }

        (r, r_scratch, p5, p5_scratch)
    };

    // Attempt dec_sig * 10^dec_exp with increasing precision.
    let mut attempt = 0;
    loop {
        let calc_precision = (LIMB_BITS << attempt) - 1;
        attempt += 1;

        let calc_normal_from_limbs =
            |sig: &mut SmallVec<[Limb; 1]>, limbs: &[Limb]| -> StatusAnd<ExpInt> {
                sig.resize(sig::limbs_for_bits(calc_precision), 0);
                let (mut loss, mut exp) = sig::from_limbs(sig, limbs, calc_precision);

                // Before rounding normalize the exponent of Category::Normal
                // numbers.
                let mut omsb = sig::omsb(sig);

                assert_ne!(omsb, 0);

                // OMSB is numbered from 1. We want to place it in the integer
                // bit numbered PRECISION if possible, with a compensating
                // change in the exponent.
                let final_exp = exp.saturating_add(omsb as ExpInt - calc_precision as ExpInt);

                // Shifting left is easy as we don't lose precision.
                if final_exp < exp {
                    assert_eq!(loss, Loss::ExactlyZero);

                    let exp_change = (exp - final_exp) as usize;
                    sig::shift_left(sig, &mut exp, exp_change);

                    return OpStatus::OK.and(exp);
                }

                // Shift right and capture any new lost fraction.
                if final_exp > exp {
                    let exp_change = (final_exp - exp) as usize;
                    loss = sig::shift_right(sig, &mut exp, exp_change).combine(loss);

                    // Keep OMSB up-to-date.
                    omsb = omsb.saturating_sub(exp_change);
                }

                assert_eq!(omsb, calc_precision);

                // Now round the number according to round given the lost
                // fraction.

                // As specified in IEEE 754, since we do not trap we do not
                // report underflow for exact results.
                if loss == Loss::ExactlyZero {
                    return OpStatus::OK.and(exp);
                }

                // Increment the significand if we're rounding away from zero.
                if loss == Loss::MoreThanHalf || loss == Loss::ExactlyHalf && sig::get_bit(sig, 0)
                {
                    // We should never overflow.
                    assert_eq!(sig::increment(sig), 0);
                    omsb = sig::omsb(sig);

                    // Did the significand increment overflow?
                    if omsb == calc_precision + 1 {
                        let _: Loss = sig::shift_right(sig, &mut exp, 1);

                        return OpStatus::INEXACT.and(exp);
                    }
                }

                // The normal case - we were and are not denormal, and any
                // significand increment above didn't overflow.
                OpStatus::INEXACT.and(exp)
            };

        let status;
        let mut exp = unpack!(status=, calc_normal_from_limbs(&mut sig_calc, &dec_sig));
        let pow5_status;
        let pow5_exp = unpack!(pow5_status=, calc_normal_from_limbs(&mut pow5_calc, &pow5_full));

        // Add dec_exp, as 10^n = 5^n * 2^n.
        exp += dec_exp as ExpInt;

        let mut used_bits = sem.precision;
        let mut truncated_bits = calc_precision - used_bits;

        let half_ulp_err1 = (!status.is_ok()) as Limb;
        let (calc_loss, half_ulp_err2);
        if dec_exp >= 0 {
            exp += pow5_exp;

            sig_scratch_calc.resize(sig_calc.len() + pow5_calc.len(), 0);
            calc_loss =
                sig::mul(&mut sig_scratch_calc, &mut exp, &sig_calc, &pow5_calc, calc_precision);
            mem::swap(&mut sig_calc, &mut sig_scratch_calc);

            half_ulp_err2 = (!pow5_status.is_ok()) as Limb;
        } else {
            exp -= pow5_exp;

            sig_scratch_calc.resize(sig_calc.len(), 0);
            calc_loss = sig::div(
                &mut sig_scratch_calc,
                &mut exp,
                &mut sig_calc,
                &mut pow5_calc,
                calc_precision,
            );
            mem::swap(&mut sig_calc, &mut sig_scratch_calc);

            // Denormal numbers have less precision.
            if exp < sem.min_exp {
                truncated_bits += (sem.min_exp - exp) as usize;
                used_bits = calc_precision.saturating_sub(truncated_bits);
            }
            // Extra half-ulp lost in reciprocal of exponent.
            half_ulp_err2 = 2 * (!pow5_status.is_ok() || calc_loss != Loss::ExactlyZero) as Limb;
        }

        // Both sig::mul and sig::div return the result with the integer
        // bit set.
        assert!(sig::get_bit(&sig_calc, calc_precision - 1));

        // The error from the true value, in half-ulps, on multiplying two
        // floating point numbers, which differ from the value they
        // approximate by at most half_ulp_err1 and half_ulp_err2 half-ulps,
        // is strictly less than the returned value.
        //
        // See "How to Read Floating Point Numbers Accurately" by William D
        // Clinger.
        assert!(half_ulp_err1 < 2 || half_ulp_err2 < 2 || (half_ulp_err1 + half_ulp_err2 < 8));

        let inexact = (calc_loss != Loss::ExactlyZero) as Limb;
        let half_ulp_err = if half_ulp_err1 + half_ulp_err2 == 0 {
            inexact * 2 // <= inexact half-ulps.
        } else {
            inexact + 2 * (half_ulp_err1 + half_ulp_err2)
        };

        let ulps_from_boundary = {
            let bits = calc_precision - used_bits - 1;

            let i = bits / LIMB_BITS;
            let limb = sig_calc[i] & (!0 >> (LIMB_BITS - 1 - bits % LIMB_BITS));
            let boundary = match round {
                Round::NearestTiesToEven | Round::NearestTiesToAway => 1 << (bits % LIMB_BITS),
                _ => 0,
            };
            if i == 0 {
                let delta = limb.wrapping_sub(boundary);
                cmp::min(delta, delta.wrapping_neg())
            } else if limb == boundary {
                if !sig::is_all_zeros(&sig_calc[1..i]) {
                    !0 // A lot.
                } else {
                    sig_calc[0]
                }
            } else if limb == boundary.wrapping_sub(1) {
                if sig_calc[1..i].iter().any(|&x| x.wrapping_neg() != 1) {
                    !0 // A lot.
                } else {
                    sig_calc[0].wrapping_neg()
                }
            } else {
                !0 // A lot.
            }
        };

        // Are we guaranteed to round correctly if we truncate?
        if ulps_from_boundary.saturating_mul(2) >= half_ulp_err {
            let mut r = IeeeFloat { sig: [0], exp, category: Category::Normal, sign: false, sem };
            sig::extract(&mut r.sig, &sig_calc, used_bits, calc_precision - used_bits);
            // If we extracted less bits above we must adjust our exponent
            // to compensate for the implicit right shift.
            r.exp += (sem.precision - used_bits) as ExpInt;
            let loss = Loss::through_truncation(&sig_calc, truncated_bits);
            return Ok(r.normalize(round, loss));
        }
    }
}

impl IeeeFloat {
    /// Formats in C99 `%a` hexadecimal style: `0x1.8p1`, `-0x1.4p-2`.
    ///
    /// `hex_digits` is the total number of significand digits to emit;
    /// zero means exactly as many as the value needs. When the requested
    /// count cannot hold the value the last kept digit is rounded as
    /// directed.
    pub fn to_hex_string(&self, hex_digits: usize, upper_case: bool, round: Round) -> String {
        let mut out = String::new();
        if self.sign {
            out.push('-');
        }
        match self.category {
            Category::Infinity => out.push_str(if upper_case { "INF" } else { "Inf" }),
            Category::NaN => out.push_str(if upper_case { "NAN" } else { "NaN" }),
            Category::Zero => {
                out.push_str(if upper_case { "0X0" } else { "0x0" });
                if hex_digits > 1 {
                    out.push('.');
                    for _ in 1..hex_digits {
                        out.push('0');
                    }
                }
                out.push(if upper_case { 'P' } else { 'p' });
                out.push('0');
            }
            Category::Normal => self.write_normal_hex(&mut out, hex_digits, upper_case, round),
        }
        out
    }

    fn write_normal_hex(&self, out: &mut String, hex_digits: usize, upper_case: bool, round: Round) {
        out.push_str(if upper_case { "0X" } else { "0x" });

        // Pad the significand with three leading zero bits so the integer
        // bit occupies the first digit on its own.
        let value_bits = self.sem.precision + 3;
        let lsb = self.sig[0].trailing_zeros() as usize;

        // Digit count ignoring trailing zero digits.
        let mut output_digits = (value_bits - lsb + 3) / 4;

        let mut sig = self.sig;
        if hex_digits != 0 {
            if hex_digits < output_digits {
                let dropped = value_bits - hex_digits * 4;
                let loss = Loss::through_truncation(&sig, dropped);
                if loss != Loss::ExactlyZero && self.round_away_from_zero(round, loss, dropped) {
                    // A carry out of the fraction turns the integer digit
                    // from 1 into 2, which prints as-is.
                    sig[0] = ((sig[0] >> dropped) + 1) << dropped;
                }
            }
            output_digits = hex_digits;
        }

        let digit_chars: &[u8; 16] =
            if upper_case { b"0123456789ABCDEF" } else { b"0123456789abcdef" };

        // Align the window on a nibble boundary and emit from the top.
        let total = (value_bits + 3) / 4 * 4;
        let padded = sig[0] << (total - value_bits);
        for i in 0..output_digits {
            let low_bit = total as isize - 4 * (i as isize + 1);
            let nibble = if low_bit >= 0 { (padded >> low_bit) & 0xF } else { 0 };
            out.push(digit_chars[nibble as usize] as char);
            if i == 0 && output_digits > 1 {
                out.push('.');
            }
        }

        out.push(if upper_case { 'P' } else { 'p' });
        out.push_str(&self.exp.to_string());
    }
}

impl fmt::Display for IeeeFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f.width().unwrap_or(3);
        let alternate = f.alternate();

        match self.category {
            Category::Infinity => {
                if self.sign {
                    return f.write_str("-Inf");
                } else {
                    return f.write_str("+Inf");
                }
            }

            Category::NaN => return f.write_str("NaN"),

            Category::Zero => {
                if self.sign {
                    f.write_char('-')?;
                }

                if width == 0 {
                    if alternate {
                        f.write_str("0.0")?;
                        if let Some(n) = f.precision() {
                            for _ in 1..n {
                                f.write_char('0')?;
                            }
                        }
                        f.write_str("e+00")?;
                    } else {
                        f.write_str("0.0E+0")?;
                    }
                } else {
                    f.write_char('0')?;
                }
                return Ok(());
            }

            Category::Normal => {}
        }

        if self.sign {
            f.write_char('-')?;
        }

        // We use enough digits so the number can be parsed back to the
        // exact same bits. The formula comes from "How to Print
        // Floating-Point Numbers Accurately" by Steele and White.

        // precision = 2 + floor(significand_precision / lg_2(10))
        let precision = f.precision().unwrap_or(2 + self.sem.precision * 59 / 196);

        // Decompose the number into an integer significand and an exponent.
        let mut exp = self.exp - (self.sem.precision as ExpInt - 1);
        let mut sig: SmallVec<[Limb; 1]> = smallvec![self.sig[0]];

        // Ignore trailing binary zeros.
        let trailing_zeros = sig[0].trailing_zeros();
        let _: Loss = sig::shift_right(&mut sig, &mut exp, trailing_zeros as usize);

        // Change the exponent from 2^e to 10^e.
        if exp == 0 {
            // Nothing to do.
        } else if exp > 0 {
            // Just shift left.
            let shift = exp as usize;
            sig.resize(sig::limbs_for_bits(self.sem.precision + shift), 0);
            sig::shift_left(&mut sig, &mut exp, shift);
        } else {
            // exp < 0
            let mut texp = -exp as usize;

            // We transform this using the identity:
            //   (N)(2^-e) == (N)(5^e)(10^-e)

            // Multiply significand by 5^e.
            //   N * 5^0101 == N * 5^(1*1) * 5^(0*2) * 5^(1*4) * 5^(0*8)
            let mut sig_scratch: SmallVec<[Limb; 1]> = smallvec![];
            let mut p5: SmallVec<[Limb; 1]> = smallvec![];
            let mut p5_scratch: SmallVec<[Limb; 1]> = smallvec![];
            while texp != 0 {
                if p5.is_empty() {
                    p5.push(5);
                } else {
                    p5_scratch.resize(p5.len() * 2, 0);
                    let _: Loss =
                        sig::mul(&mut p5_scratch, &mut 0, &p5, &p5, p5.len() * 2 * LIMB_BITS);
                    while p5_scratch.last() == Some(&0) {
                        p5_scratch.pop();
                    }
                    mem::swap(&mut p5, &mut p5_scratch);
                }
                if texp & 1 != 0 {
                    sig_scratch.resize(sig.len() + p5.len(), 0);
                    let _: Loss = sig::mul(
                        &mut sig_scratch,
                        &mut 0,
                        &sig,
                        &p5,
                        (sig.len() + p5.len()) * LIMB_BITS,
                    );
                    while sig_scratch.last() == Some(&0) {
                        sig_scratch.pop();
                    }
                    mem::swap(&mut sig, &mut sig_scratch);
                }
                texp >>= 1;
            }
        }

        // Fill the buffer.
        let mut buffer: SmallVec<[u8; 64]> = smallvec![];

        // Ignore digits from the significand until it is no more
        // precise than is required for the desired precision.
        // 196/59 is a very slight overestimate of lg_2(10).
        let required = (precision * 196 + 58) / 59;
        let mut discard_digits = sig::omsb(&sig).saturating_sub(required) * 59 / 196;
        let mut in_trail = true;
        while !sig.is_empty() {
            // Perform short division by 10 to extract the rightmost digit.
            // rem <- sig % 10
            // sig <- sig / 10
            let mut rem = 0;

            // Use 64-bit division and remainder, with 32-bit chunks from sig.
            sig::each_chunk(&mut sig, 32, |chunk| {
                let chunk = chunk as u32;
                let combined = ((rem as u64) << 32) | (chunk as u64);
                rem = (combined % 10) as u8;
                (combined / 10) as u32 as Limb
            });

            // Reduce the significand to avoid wasting time dividing 0's.
            while sig.last() == Some(&0) {
                sig.pop();
            }

            let digit = rem;

            // Ignore digits we don't need.
            if discard_digits > 0 {
                discard_digits -= 1;
                exp += 1;
                continue;
            }

            // Drop trailing zeros.
            if in_trail && digit == 0 {
                exp += 1;
            } else {
                in_trail = false;
                buffer.push(b'0' + digit);
            }
        }

        assert!(!buffer.is_empty(), "no characters in buffer!");

        // Drop down to precision.
        if buffer.len() > precision {
            // The most significant figures are the last ones in the buffer.
            let mut first_sig = buffer.len() - precision;

            // Round half up.

            // Rounding down is just a truncation, except we also want to
            // drop trailing zeros from the new result.
            if buffer[first_sig - 1] < b'5' {
                while first_sig < buffer.len() && buffer[first_sig] == b'0' {
                    first_sig += 1;
                }
            } else {
                // Rounding up requires a decimal add-with-carry. If we
                // continue the carry, the newly-introduced zeros will just
                // be truncated.
                for x in &mut buffer[first_sig..] {
                    if *x == b'9' {
                        first_sig += 1;
                    } else {
                        *x += 1;
                        break;
                    }
                }
            }

            exp += first_sig as ExpInt;
            buffer.drain(..first_sig);

            // If we carried through, we have exactly one digit of precision.
            if buffer.is_empty() {
                buffer.push(b'1');
            }
        }

        let digits = buffer.len();

        // Check whether we should use scientific notation.
        let scientific = if width == 0 {
            true
        } else if exp >= 0 {
            // 765e3 --> 765000
            //              ^^^
            // But we shouldn't make the number look more precise than it is.
            exp as usize > width || digits + exp as usize > precision
        } else {
            // Power of the most significant digit.
            let msd = exp + (digits - 1) as ExpInt;
            if msd >= 0 {
                // 765e-2 == 7.65
                false
            } else {
                // 765e-5 == 0.00765
                //           ^ ^^
                -msd as usize > width
            }
        };

        // Scientific formatting is pretty straightforward.
        if scientific {
            exp += digits as ExpInt - 1;

            f.write_char(buffer[digits - 1] as char)?;
            f.write_char('.')?;
            let truncate_zero = !alternate;
            if digits == 1 && truncate_zero {
                f.write_char('0')?;
            } else {
                for &d in buffer[..digits - 1].iter().rev() {
                    f.write_char(d as char)?;
                }
            }
            // Fill with zeros up to precision.
            if !truncate_zero && precision > digits - 1 {
                for _ in 0..=precision - digits {
                    f.write_char('0')?;
                }
            }
            // For alternate we use lower 'e'.
            f.write_char(if alternate { 'e' } else { 'E' })?;

            // Exponent always at least two digits if we do not truncate
            // zeros.
            if truncate_zero {
                write!(f, "{:+}", exp)?;
            } else {
                write!(f, "{:+03}", exp)?;
            }

            return Ok(());
        }

        // Non-scientific, positive exponents.
        if exp >= 0 {
            for &d in buffer.iter().rev() {
                f.write_char(d as char)?;
            }
            for _ in 0..exp {
                f.write_char('0')?;
            }
            return Ok(());
        }

        // Non-scientific, negative exponents.
        let unit_place = -exp as usize;
        if unit_place < digits {
            for &d in buffer[unit_place..].iter().rev() {
                f.write_char(d as char)?;
            }
            f.write_char('.')?;
            for &d in buffer[..unit_place].iter().rev() {
                f.write_char(d as char)?;
            }
        } else {
            f.write_str("0.")?;
            for _ in digits..unit_place {
                f.write_char('0')?;
            }
            for &d in buffer.iter().rev() {
                f.write_char(d as char)?;
            }
        }

        Ok(())
    }
}
