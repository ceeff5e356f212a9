use std::ops::{BitOr, BitOrAssign};

/// Sticky status flags raised by the arithmetic core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Exception(pub u8);
pub const EXCEPTION_NONE: u8 = 0;
pub const EXCEPTION_INEXACT: u8 = 1 << 0;
pub const EXCEPTION_UNDERFLOW: u8 = 1 << 1;
pub const EXCEPTION_OVERFLOW: u8 = 1 << 2;
pub const EXCEPTION_INFINITE: u8 = 1 << 3;
pub const EXCEPTION_INVALID: u8 = 1 << 4;
pub const EXCEPTION_RANGE: u8 = 1 << 5;

impl Exception {
    pub fn none() -> Exception { Exception(EXCEPTION_NONE) }
    pub fn inexact() -> Exception { Exception(EXCEPTION_INEXACT) }
    pub fn underflow() -> Exception { Exception(EXCEPTION_UNDERFLOW) }
    pub fn overflow() -> Exception { Exception(EXCEPTION_OVERFLOW) }
    /// Division of a finite non-zero value by zero.
    pub fn infinite() -> Exception { Exception(EXCEPTION_INFINITE) }
    /// A NaN was produced from non-NaN operands.
    pub fn invalid() -> Exception { Exception(EXCEPTION_INVALID) }
    /// A conversion to a native integer did not fit.
    pub fn range() -> Exception { Exception(EXCEPTION_RANGE) }

    pub fn is_none(self) -> bool {
        self.0 == EXCEPTION_NONE
    }

    pub fn contains(self, other: Exception) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Exception {
    type Output = Exception;

    fn bitor(self, other: Exception) -> Exception {
        Exception(self.0 | other.0)
    }
}

impl BitOrAssign for Exception {
    fn bitor_assign(&mut self, other: Exception) {
        self.0 |= other.0;
    }
}
