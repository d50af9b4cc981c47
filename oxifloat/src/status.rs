//! Operation status reporting.
//!
//! Every arithmetic operation is a pure function returning its result
//! together with the set of IEEE-754 exception flags it raised, packaged as
//! a [`StatusAnd`]. Flags accumulate with `|`; an exact operation reports
//! [`OpStatus::OK`] (the empty set).

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// IEEE-754 exception flags raised by an operation.
///
/// This is a bitmask: several flags can be raised by a single operation,
/// e.g. an overflowing addition reports `OVERFLOW | INEXACT`.
#[must_use]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpStatus {
    bits: u8,
}

impl OpStatus {
    /// No exceptions; the result is exact.
    pub const OK: OpStatus = OpStatus { bits: 0 };
    /// The operation has no meaningful result (e.g. `0 / 0`, `inf - inf`).
    pub const INVALID_OP: OpStatus = OpStatus { bits: 0x01 };
    /// Division of a finite non-zero value by zero.
    pub const DIV_BY_ZERO: OpStatus = OpStatus { bits: 0x02 };
    /// The rounded result is too large in magnitude for the format.
    pub const OVERFLOW: OpStatus = OpStatus { bits: 0x04 };
    /// The result is subnormal and inexact (tininess after rounding).
    pub const UNDERFLOW: OpStatus = OpStatus { bits: 0x08 };
    /// The result had to be rounded.
    pub const INEXACT: OpStatus = OpStatus { bits: 0x10 };

    /// Returns `true` if no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if any flag in `other` is also set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: OpStatus) -> bool {
        self.bits & other.bits != 0
    }

    /// Returns `true` if every flag in `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: OpStatus) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Attaches a value, producing a [`StatusAnd`].
    #[inline]
    pub fn and<T>(self, value: T) -> StatusAnd<T> {
        StatusAnd { status: self, value }
    }
}

impl BitOr for OpStatus {
    type Output = OpStatus;
    #[inline]
    fn bitor(self, rhs: OpStatus) -> OpStatus {
        OpStatus { bits: self.bits | rhs.bits }
    }
}

impl BitOrAssign for OpStatus {
    #[inline]
    fn bitor_assign(&mut self, rhs: OpStatus) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for OpStatus {
    type Output = OpStatus;
    #[inline]
    fn bitand(self, rhs: OpStatus) -> OpStatus {
        OpStatus { bits: self.bits & rhs.bits }
    }
}

impl BitAndAssign for OpStatus {
    #[inline]
    fn bitand_assign(&mut self, rhs: OpStatus) {
        self.bits &= rhs.bits;
    }
}

impl fmt::Debug for OpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("OK");
        }
        let mut first = true;
        for (flag, name) in [
            (OpStatus::INVALID_OP, "INVALID_OP"),
            (OpStatus::DIV_BY_ZERO, "DIV_BY_ZERO"),
            (OpStatus::OVERFLOW, "OVERFLOW"),
            (OpStatus::UNDERFLOW, "UNDERFLOW"),
            (OpStatus::INEXACT, "INEXACT"),
        ] {
            if self.intersects(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A value paired with the exception flags raised while computing it.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusAnd<T> {
    /// The exception flags.
    pub status: OpStatus,
    /// The computed value.
    pub value: T,
}

impl<T> StatusAnd<T> {
    /// Applies `f` to the value, keeping the status.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> StatusAnd<U> {
        StatusAnd { status: self.status, value: f(self.value) }
    }
}

/// Unwraps a `StatusAnd`, storing the status into the named variable.
macro_rules! unpack {
    ($status:ident|=, $e:expr) => {
        match $e {
            $crate::status::StatusAnd { status, value } => {
                $status |= status;
                value
            }
        }
    };
    ($status:ident=, $e:expr) => {
        match $e {
            $crate::status::StatusAnd { status, value } => {
                $status = status;
                value
            }
        }
    };
}
pub(crate) use unpack;
