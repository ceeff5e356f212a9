//! Arbitrary-precision binary floating point with correct rounding.
//!
//! A [`Float`] carries its own precision in bits. Every operation writes into
//! a destination value and rounds the exact mathematical result once, to the
//! destination's precision, in the requested [`RoundingMode`]. The returned
//! [`Ordering`](std::cmp::Ordering) tells whether the stored value is below
//! (`Less`), equal to (`Equal`) or above (`Greater`) the exact result.
//!
//! ```
//! use mpfloat::{Float, RoundingMode};
//!
//! let mut x = Float::new(100).unwrap();
//! x.set_i64(2, RoundingMode::NearEven);
//! let mut root = Float::new(100).unwrap();
//! root.sqrt(&x, RoundingMode::NearEven);
//! assert_eq!(
//!     root.to_string_radix(10, 20, RoundingMode::Zero).unwrap(),
//!     "1.4142135623730950488"
//! );
//! ```

mod constant;
mod constructor;
mod error;
mod exception;
mod format;
mod getter;
mod limb;
mod ops;
mod util;

pub mod context;

pub use constant::free_cache;
pub use context::Context;
pub use error::Error;
pub use exception::*;
pub use getter::Number;
pub use ops::Operand;

use limb::Limbs;

/// Smallest exponent of a regular value; `0.1b × 2^EXP_MIN` is the least
/// positive number.
pub const EXP_MIN: i64 = 1 - (1 << 30);
/// Largest exponent of a regular value.
pub const EXP_MAX: i64 = (1 << 30) - 1;

#[derive(Clone, Debug)]
pub struct Float {
    // true means negative
    sign: bool,
    // value is 0.sig × 2^exp for regular numbers
    exp: i64,
    prec: usize,
    // ceil(prec / 64) limbs; top bit set for regular numbers
    sig: Limbs,
    category: Category,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    NaN,
    Infinity,
    Zero,
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    NearEven,
    /// Round toward zero.
    Zero,
    /// Round toward +∞.
    Max,
    /// Round toward −∞.
    Min,
    /// Round away from zero.
    Away,
}

impl Default for RoundingMode {
    fn default() -> RoundingMode {
        RoundingMode::NearEven
    }
}
