use std::cmp::Ordering;
use std::convert::TryFrom;

use either::Either;

use crate::limb::{limbs_for, Limbs};
use crate::ops::rint::{round_at, IntRounding};
use crate::util::{make_exp_sig, round_raw, rounds_toward_zero};
use crate::{context, Category, Error, Exception, Float, RoundingMode};

/// A native number, as handed back by [`Float::to_number`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
  Int(i64),
  Double(f64),
}

impl Float {
  pub fn prec(&self) -> usize {
    self.prec
  }

  /// Exponent of a regular value, with the mantissa in [1/2, 1). Zero for
  /// special values.
  pub fn exp(&self) -> i64 {
    match self.category {
      Category::Normal => self.exp,
      _ => 0,
    }
  }

  pub fn category(&self) -> Category {
    self.category
  }

  pub fn is_sign_negative(&self) -> bool {
    self.sign
  }

  pub fn is_sign_positive(&self) -> bool {
    !self.sign
  }

  /// Sign of the value; `None` for NaN. Both zeros give `Equal`.
  pub fn sgn(&self) -> Option<Ordering> {
    match self.category {
      Category::NaN => None,
      Category::Zero => Some(Ordering::Equal),
      _ if self.sign => Some(Ordering::Less),
      _ => Some(Ordering::Greater),
    }
  }

  pub fn is_nan(&self) -> bool {
    self.category == Category::NaN
  }

  pub fn is_inf(&self) -> bool {
    self.category == Category::Infinity
  }

  /// Neither NaN nor infinite.
  pub fn is_number(&self) -> bool {
    matches!(self.category, Category::Zero | Category::Normal)
  }

  pub fn is_zero(&self) -> bool {
    self.category == Category::Zero
  }

  /// Finite and non-zero.
  pub fn is_regular(&self) -> bool {
    self.category == Category::Normal
  }

  pub fn is_integer(&self) -> bool {
    match make_exp_sig(self) {
      Either::Right((_, n, e)) => e >= 0 || n.low_bits_zero((-e) as usize),
      Either::Left(category) => category == Category::Zero,
    }
  }

  /// The significand limbs, most significant first, `ceil(prec / 64)` of
  /// them. Special values read as all zero.
  pub fn limbs(&self) -> Vec<u64> {
    match self.category {
      Category::Normal => self.sig.as_slice().iter().rev().copied().collect(),
      _ => vec![0; limbs_for(self.prec)],
    }
  }

  /// `(n, e)` with `|self| = n·2^e`, for a regular value.
  pub(crate) fn int_parts(&self) -> (&Limbs, i64) {
    debug_assert_eq!(self.category, Category::Normal);
    (&self.sig, self.exp - (self.sig.len() * 64) as i64)
  }

  /// Fewest bits that hold the value exactly; zero for special values.
  pub fn min_prec(&self) -> usize {
    match self.category {
      Category::Normal => self.sig.bit_len() - self.sig.trailing_zeros(),
      _ => 0,
    }
  }

  /// Round into an IEEE binary64, subnormals included.
  pub fn to_f64(&self, rm: RoundingMode) -> f64 {
    let (sign, n, e) = match make_exp_sig(self) {
      Either::Right(parts) => parts,
      Either::Left(Category::NaN) => return f64::NAN,
      Either::Left(Category::Infinity) => return signed(self.sign, f64::INFINITY),
      Either::Left(_) => return signed(self.sign, 0.0),
    };

    if self.exp > 1024 {
      return signed(sign, f64_overflow(sign, rm));
    }
    let prec = if self.exp >= -1021 { 53 } else { 1074 + self.exp };
    if prec < 1 {
      // below the least subnormal; 2^-1075 is the tie
      let up = match rm {
        RoundingMode::NearEven => self.exp == -1074 && !n.is_power_of_two(),
        _ => !rounds_toward_zero(rm, sign),
      };
      return signed(sign, if up { f64::from_bits(1) } else { 0.0 });
    }

    let (r, _, _) = round_raw(sign, n, e, false, prec as usize, rm);
    if r.exp > 1024 {
      return signed(sign, f64_overflow(sign, rm));
    }
    // r fits one limb: bit 63 is the leading bit
    let top = r.sig.as_slice()[0];
    let bits = if r.exp >= -1021 {
      (((r.exp + 1022) as u64) << 52) | ((top >> 11) & ((1 << 52) - 1))
    } else {
      top >> (-(r.exp + 1010)) as u32
    };
    signed(sign, f64::from_bits(bits))
  }

  /// Round to an integer and convert; NaN, infinities and values outside
  /// `i64` raise the range flag.
  pub fn to_i64(&self, rm: RoundingMode) -> Result<i64, Error> {
    self.to_i64_quiet(rm).ok_or_else(|| {
      context::raise(Exception::range());
      Error::IntegerOutOfRange("i64")
    })
  }

  fn to_i64_quiet(&self, rm: RoundingMode) -> Option<i64> {
    let (sign, n, e) = match make_exp_sig(self) {
      Either::Right(parts) => parts,
      Either::Left(Category::Zero) => return Some(0),
      Either::Left(_) => return None,
    };
    if self.exp > 64 {
      return None;
    }
    let (k, _) = round_at(sign, n, e, 0, IntRounding::Mode(rm));
    let v = k.to_u64()?;
    if sign {
      if v <= 1 << 63 {
        Some((v as i64).wrapping_neg())
      } else {
        None
      }
    } else {
      i64::try_from(v).ok()
    }
  }

  /// An `Int` for integral values that fit `i64`, a rounded `Double`
  /// otherwise.
  pub fn to_number(&self, rm: RoundingMode) -> Number {
    if self.is_integer() {
      if let Some(i) = self.to_i64_quiet(rm) {
        return Number::Int(i);
      }
    }
    Number::Double(self.to_f64(rm))
  }
}

fn signed(sign: bool, v: f64) -> f64 {
  if sign {
    -v
  } else {
    v
  }
}

fn f64_overflow(sign: bool, rm: RoundingMode) -> f64 {
  if rounds_toward_zero(rm, sign) {
    f64::MAX
  } else {
    f64::INFINITY
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{EXP_MAX, EXP_MIN};

  fn from_str(prec: usize, s: &str) -> Float {
    Float::parse(s, 10, prec, RoundingMode::NearEven).unwrap().0
  }

  #[test]
  fn classification() {
    let mut x = Float::new(20).unwrap();
    assert!(x.is_nan() && !x.is_number());
    assert_eq!(x.sgn(), None);
    x.set_inf(true);
    assert!(x.is_inf() && !x.is_regular());
    assert_eq!(x.sgn(), Some(Ordering::Less));
    x.set_zero(true);
    assert!(x.is_zero() && x.is_number() && x.is_integer());
    assert_eq!(x.sgn(), Some(Ordering::Equal));
    x.set_f64(2.5, RoundingMode::NearEven);
    assert!(x.is_regular() && !x.is_integer());
    assert_eq!(x.category(), Category::Normal);
    x.set_f64(-1024.0, RoundingMode::NearEven);
    assert!(x.is_integer());
    assert_eq!(x.exp(), 11);
  }

  #[test]
  fn limbs_are_most_significant_first() {
    let mut x = Float::new(100).unwrap();
    x.set_u64(3, RoundingMode::NearEven);
    assert_eq!(x.limbs(), vec![0xC000_0000_0000_0000, 0]);
    assert_eq!(x.min_prec(), 2);
    x.set_nan();
    assert_eq!(x.limbs(), vec![0, 0]);
  }

  #[test]
  fn to_f64_rounds_by_mode() {
    let third = from_str(200, "0.333333333333333333333333333333333333333333333333");
    assert_eq!(third.to_f64(RoundingMode::NearEven), 1.0 / 3.0);
    assert!(third.to_f64(RoundingMode::Zero) < third.to_f64(RoundingMode::Away));
    assert_eq!(third.to_f64(RoundingMode::Max), third.to_f64(RoundingMode::Away));

    let big = from_str(64, "1e400");
    assert_eq!(big.to_f64(RoundingMode::NearEven), f64::INFINITY);
    assert_eq!(big.to_f64(RoundingMode::Zero), f64::MAX);
    let mut neg = big.clone();
    neg.abs_assign();
    neg.neg_assign();
    assert_eq!(neg.to_f64(RoundingMode::Max), -f64::MAX);
  }

  #[test]
  fn to_f64_subnormals() {
    let mut x = Float::new(64).unwrap();
    x.set_f64(5e-324, RoundingMode::NearEven);
    x.mul_2si(&x.clone(), -1, RoundingMode::NearEven);
    // exactly half the least subnormal ties to zero
    assert_eq!(x.to_f64(RoundingMode::NearEven), 0.0);
    assert_eq!(x.to_f64(RoundingMode::Away), 5e-324);

    x.set_f64(5e-324, RoundingMode::NearEven);
    x.mul(&x.clone(), 0.75, RoundingMode::NearEven);
    assert_eq!(x.to_f64(RoundingMode::NearEven), 5e-324);
    assert_eq!(x.to_f64(RoundingMode::Zero), 0.0);

    x.set_f64(3e-320, RoundingMode::NearEven);
    assert_eq!(x.to_f64(RoundingMode::NearEven), 3e-320);

    let tiny = Float::min_positive(10).unwrap();
    assert_eq!(tiny.to_f64(RoundingMode::NearEven), 0.0);
    assert_eq!(tiny.to_f64(RoundingMode::Max), 5e-324);
    assert!(EXP_MIN < -1074 && EXP_MAX > 1024);
  }

  #[test]
  fn to_i64_range() {
    context::clear_flags();
    let x = from_str(80, "9223372036854775807.4");
    assert_eq!(x.to_i64(RoundingMode::Zero), Ok(i64::MAX));
    assert_eq!(x.to_i64(RoundingMode::Max), Err(Error::IntegerOutOfRange("i64")));
    assert!(context::flags().contains(Exception::range()));

    let y = from_str(80, "-2.5");
    assert_eq!(y.to_i64(RoundingMode::NearEven), Ok(-2));
    assert_eq!(y.to_i64(RoundingMode::Away), Ok(-3));
    assert_eq!(y.to_i64(RoundingMode::Max), Ok(-2));
    assert!(Float::new(10).unwrap().to_i64(RoundingMode::NearEven).is_err());
  }

  #[test]
  fn to_number_prefers_integers() {
    assert_eq!(from_str(53, "42").to_number(RoundingMode::NearEven), Number::Int(42));
    assert_eq!(from_str(53, "-0.5").to_number(RoundingMode::NearEven), Number::Double(-0.5));
    assert_eq!(from_str(100, "1e20").to_number(RoundingMode::NearEven), Number::Double(1e20));
  }
}
