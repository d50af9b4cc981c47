//! Bit-exact software IEEE-754 arithmetic.
//!
//! `oxifloat` evaluates floating-point arithmetic entirely in integer
//! software, producing the exact bit patterns and exception flags IEEE-754
//! prescribes, independent of the host FPU, its rounding state, or the
//! target the result is destined for. It covers the common hardware
//! formats (binary16 through binary128 and x87 extended), the small ML
//! formats (bfloat16, the 8-, 6- and 4-bit types with their non-standard
//! NaN encodings), and the PowerPC paired-double composite.
//!
//! Every operation is pure: operands are consumed by value and the result
//! carries an [`OpStatus`] recording the exceptions raised.
//!
//! ```
//! use oxifloat::{Float, Format};
//!
//! let a = Float::from_str(Format::Double, "1.5").unwrap().value;
//! let b = Float::from_str(Format::Double, "2.25").unwrap().value;
//! let sum = (a + b).value;
//! assert_eq!(sum.to_string(), "3.75");
//! ```
//!
//! Values are constructed for a [`Format`] and stay bound to it; use
//! [`Float::convert`] to move between formats. Code working with a single
//! known representation can use [`IeeeFloat`] or [`DoubleDouble`]
//! directly.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod double_double;
pub mod error;
pub mod float;
pub mod ieee;
pub mod rounding;
pub mod sem;
mod sig;
pub mod status;
mod strconv;

pub use double_double::DoubleDouble;
pub use error::ParseError;
pub use float::Float;
pub use ieee::IeeeFloat;
pub use rounding::Round;
pub use sem::{Format, NanEncoding, NonFinite, Semantics};
pub use status::{OpStatus, StatusAnd};

/// A signed type to represent a floating point number's unbiased exponent.
pub type ExpInt = i32;

/// [`IeeeFloat::ilogb`] result for a zero input.
pub const IEK_ZERO: ExpInt = ExpInt::MIN + 1;

/// [`IeeeFloat::ilogb`] result for a NaN input.
pub const IEK_NAN: ExpInt = ExpInt::MIN;

/// [`IeeeFloat::ilogb`] result for an infinite input.
pub const IEK_INF: ExpInt = ExpInt::MAX;

/// The broad kind of a floating-point value.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// A zero of either sign.
    Zero,
    /// A normal or subnormal finite value.
    Normal,
    /// An infinity of either sign.
    Infinity,
    /// A quiet or signaling NaN.
    NaN,
}
