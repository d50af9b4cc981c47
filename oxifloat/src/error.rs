//! Parse errors for textual floating-point literals.

use thiserror::Error;

/// Reasons a decimal or hexadecimal floating-point literal can be rejected.
///
/// These are syntax errors only: a syntactically valid literal whose value
/// does not fit the target format never fails, it rounds (reporting
/// overflow/underflow through the operation status instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input was empty.
    #[error("Invalid string length")]
    InvalidLength,
    /// Nothing followed the sign character.
    #[error("String has no digits")]
    NoDigits,
    /// A character in the significand is not a digit of the expected radix.
    #[error("Invalid character in significand")]
    InvalidSignificandChar,
    /// A character in the exponent is not a decimal digit.
    #[error("Invalid character in exponent")]
    InvalidExponentChar,
    /// More than one radix point.
    #[error("String contains multiple dots")]
    MultipleDots,
    /// The significand contains no digits at all.
    #[error("Significand has no digits")]
    SignificandNoDigits,
    /// An exponent marker with no digits after it.
    #[error("Exponent has no digits")]
    ExponentNoDigits,
    /// Hexadecimal literals must carry an explicit binary exponent.
    #[error("Hex strings require an exponent")]
    HexExponentRequired,
}
