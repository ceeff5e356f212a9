use std::borrow::Cow;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use either::Either;

use crate::limb::Limbs;
use crate::util::*;
use crate::{context, Category, Error, Float, RoundingMode};

mod add;
mod cmp;
mod div;
mod mul;
mod pow;
pub(crate) mod rint;
mod root;
mod sqrt;
mod sub;

pub(crate) use cmp::cmp_floats;

type UnaryFn = fn(&Float, usize, RoundingMode) -> (Float, Ordering);
type BinaryFn = fn(&Float, &Float, usize, RoundingMode) -> (Float, Ordering);

/// An argument to an arithmetic operation.
///
/// Native numbers are widened exactly before the operation runs: integers
/// to 64 bits and doubles to 53 bits. They are never rounded to the
/// destination's precision first.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
  Float(&'a Float),
  Int(i64),
  Double(f64),
}

impl<'a> From<&'a Float> for Operand<'a> {
  fn from(f: &'a Float) -> Operand<'a> {
    Operand::Float(f)
  }
}

impl<'a> From<&'a mut Float> for Operand<'a> {
  fn from(f: &'a mut Float) -> Operand<'a> {
    Operand::Float(f)
  }
}

impl<'a> From<i64> for Operand<'a> {
  fn from(v: i64) -> Operand<'a> {
    Operand::Int(v)
  }
}

impl<'a> From<i32> for Operand<'a> {
  fn from(v: i32) -> Operand<'a> {
    Operand::Int(v.into())
  }
}

impl<'a> From<u32> for Operand<'a> {
  fn from(v: u32) -> Operand<'a> {
    Operand::Int(v.into())
  }
}

impl<'a> From<f64> for Operand<'a> {
  fn from(v: f64) -> Operand<'a> {
    Operand::Double(v)
  }
}

impl<'a> TryFrom<u64> for Operand<'a> {
  type Error = Error;

  fn try_from(v: u64) -> Result<Operand<'a>, Error> {
    i64::try_from(v).map(Operand::Int).map_err(|_| Error::IntegerOutOfRange("i64"))
  }
}

impl<'a> Operand<'a> {
  /// The operand as a float holding its exact value.
  pub(crate) fn to_float(self) -> Cow<'a, Float> {
    match self {
      Operand::Float(f) => Cow::Borrowed(f),
      Operand::Int(i) => {
        let mut f = Float::nan_with_prec(64);
        f.set_i64(i, RoundingMode::NearEven);
        Cow::Owned(f)
      }
      Operand::Double(d) => {
        let mut f = Float::nan_with_prec(53);
        f.set_f64(d, RoundingMode::NearEven);
        Cow::Owned(f)
      }
    }
  }
}

/// `x` with its sign replaced, rounded to `prec`.
fn round_with_sign(x: &Float, sign: bool, prec: usize, rm: RoundingMode) -> (Float, Ordering) {
  match make_exp_sig(x) {
    Either::Right((_, n, e)) => pack(sign, n, e, false, prec, rm),
    Either::Left(Category::NaN) => propagate_nan(prec),
    Either::Left(Category::Infinity) => (Float::inf_with_prec(prec, sign), Ordering::Equal),
    Either::Left(_) => (Float::zero_with_prec(prec, sign), Ordering::Equal),
  }
}

fn min_impl(x: &Float, y: &Float, prec: usize, rm: RoundingMode) -> (Float, Ordering) {
  match (x.is_nan(), y.is_nan()) {
    (true, true) => propagate_nan(prec),
    (true, false) => round_to(y, prec, rm),
    (false, true) => round_to(x, prec, rm),
    (false, false) => {
      let pick = match cmp_floats(x, y) {
        Some(Ordering::Less) => x,
        Some(Ordering::Greater) => y,
        // -0 is the smaller zero
        _ => if x.sign { x } else { y },
      };
      round_to(pick, prec, rm)
    }
  }
}

fn max_impl(x: &Float, y: &Float, prec: usize, rm: RoundingMode) -> (Float, Ordering) {
  match (x.is_nan(), y.is_nan()) {
    (true, true) => propagate_nan(prec),
    (true, false) => round_to(y, prec, rm),
    (false, true) => round_to(x, prec, rm),
    (false, false) => {
      let pick = match cmp_floats(x, y) {
        Some(Ordering::Greater) => x,
        Some(Ordering::Less) => y,
        _ => if x.sign { y } else { x },
      };
      round_to(pick, prec, rm)
    }
  }
}

impl Float {
  fn apply_unary(&mut self, x: Operand, rm: RoundingMode, f: UnaryFn) -> Ordering {
    let x = x.to_float();
    let prec = self.prec;
    self.store(f(&x, prec, rm))
  }

  fn apply_binary(&mut self, a: Operand, b: Operand, rm: RoundingMode, f: BinaryFn) -> Ordering {
    let (a, b) = (a.to_float(), b.to_float());
    let prec = self.prec;
    self.store(f(&a, &b, prec, rm))
  }

  pub fn add<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, add::add_impl)
  }

  pub fn sub<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, sub::sub_impl)
  }

  pub fn mul<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, mul::mul_impl)
  }

  pub fn div<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, div::div_impl)
  }

  /// `a - trunc(a / b)·b`, with the sign of `a`.
  pub fn fmod<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, div::fmod_impl)
  }

  /// `a - n·b` where `n` is `a / b` rounded to the nearest even integer.
  pub fn remainder<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, div::remainder_impl)
  }

  /// The smaller operand; a NaN loses to a number.
  pub fn min<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, min_impl)
  }

  /// The larger operand; a NaN loses to a number.
  pub fn max<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, max_impl)
  }

  pub fn sqrt<'a>(&mut self, x: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    self.apply_unary(x.into(), rm, sqrt::sqrt_impl)
  }

  pub fn sqrt_ui(&mut self, n: u64, rm: RoundingMode) -> Ordering {
    let mut x = Float::nan_with_prec(64);
    x.set_u64(n, RoundingMode::NearEven);
    self.apply_unary(Operand::Float(&x), rm, sqrt::sqrt_impl)
  }

  /// `1/sqrt(x)`; `+inf` for either zero.
  pub fn rec_sqrt<'a>(&mut self, x: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    self.apply_unary(x.into(), rm, root::rec_sqrt_impl)
  }

  pub fn cbrt<'a>(&mut self, x: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    self.apply_unary(x.into(), rm, |x, prec, rm| root::root_impl(x, 3, prec, rm))
  }

  /// The `k`-th root. NaN for `k = 0` and for even roots of negative values.
  pub fn root<'a>(&mut self, x: impl Into<Operand<'a>>, k: u64, rm: RoundingMode) -> Ordering {
    let x = x.into().to_float();
    let prec = self.prec;
    self.store(root::root_impl(&x, k, prec, rm))
  }

  /// `x^k`; `x^0` is 1 for every `x`.
  pub fn pow_ui<'a>(&mut self, x: impl Into<Operand<'a>>, k: u64, rm: RoundingMode) -> Ordering {
    let x = x.into().to_float();
    let prec = self.prec;
    self.store(pow::pow_ui_impl(&x, k, prec, rm))
  }

  pub fn pow_si<'a>(&mut self, x: impl Into<Operand<'a>>, k: i64, rm: RoundingMode) -> Ordering {
    let x = x.into().to_float();
    let prec = self.prec;
    self.store(pow::pow_si_impl(&x, k, prec, rm))
  }

  pub fn ui_pow_ui(&mut self, a: u64, k: u64, rm: RoundingMode) -> Ordering {
    let mut x = Float::nan_with_prec(64);
    x.set_u64(a, RoundingMode::NearEven);
    let prec = self.prec;
    self.store(pow::pow_ui_impl(&x, k, prec, rm))
  }

  /// `sqrt(a^2 + b^2)` with a single rounding.
  pub fn hypot<'a, 'b>(&mut self, a: impl Into<Operand<'a>>, b: impl Into<Operand<'b>>, rm: RoundingMode) -> Ordering {
    self.apply_binary(a.into(), b.into(), rm, root::hypot_impl)
  }

  pub fn sqr<'a>(&mut self, x: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    self.apply_unary(x.into(), rm, |x, prec, rm| mul::mul_impl(x, x, prec, rm))
  }

  pub fn neg<'a>(&mut self, x: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    self.apply_unary(x.into(), rm, |x, prec, rm| round_with_sign(x, !x.sign, prec, rm))
  }

  pub fn abs<'a>(&mut self, x: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    self.apply_unary(x.into(), rm, |x, prec, rm| round_with_sign(x, false, prec, rm))
  }

  /// Flip the sign in place. Exact.
  pub fn neg_assign(&mut self) {
    self.sign = !self.sign;
  }

  /// Clear the sign in place. Exact.
  pub fn abs_assign(&mut self) {
    self.sign = false;
  }

  /// `|x|` with the sign of `y`.
  pub fn copysign(&mut self, x: &Float, y: &Float, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(round_with_sign(x, y.sign, prec, rm))
  }

  /// `x·2^k`.
  pub fn mul_2si(&mut self, x: &Float, k: i64, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    let result = match make_exp_sig(x) {
      Either::Right((sign, n, e)) => pack(sign, n, e.saturating_add(k), false, prec, rm),
      Either::Left(_) => round_to(x, prec, rm),
    };
    self.store(result)
  }

  /// `a·b + c` with a single rounding.
  pub fn fma(&mut self, a: &Float, b: &Float, c: &Float, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(mul::fma_impl(a, b, c, c.sign, prec, rm))
  }

  /// `a·b - c` with a single rounding.
  pub fn fms(&mut self, a: &Float, b: &Float, c: &Float, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(mul::fma_impl(a, b, c, !c.sign, prec, rm))
  }

  /// `n!`
  pub fn fac_ui(&mut self, n: u64, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    let product = (2..=n).fold(Limbs::one(), |acc, i| acc.mul_small(i));
    self.store(pack(false, &product, 0, false, prec, rm))
  }

  /// Compare with any operand; `None` when either side is NaN.
  pub fn compare<'a>(&self, other: impl Into<Operand<'a>>) -> Option<Ordering> {
    let other = other.into().to_float();
    cmp_floats(self, &other)
  }

  /// Compare magnitudes; `None` when either side is NaN.
  pub fn cmpabs(&self, other: &Float) -> Option<Ordering> {
    cmp::cmp_abs(self, other)
  }

  pub fn greater<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    self.compare(other) == Some(Ordering::Greater)
  }

  pub fn greater_equal<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    matches!(self.compare(other), Some(Ordering::Greater) | Some(Ordering::Equal))
  }

  pub fn less<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    self.compare(other) == Some(Ordering::Less)
  }

  pub fn less_equal<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    matches!(self.compare(other), Some(Ordering::Less) | Some(Ordering::Equal))
  }

  pub fn equal<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    self.compare(other) == Some(Ordering::Equal)
  }

  /// Ordered and not equal.
  pub fn less_greater<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    matches!(self.compare(other), Some(Ordering::Less) | Some(Ordering::Greater))
  }

  pub fn unordered<'a>(&self, other: impl Into<Operand<'a>>) -> bool {
    self.compare(other).is_none()
  }

  /// Whether an approximation `self` of some `x`, with
  /// `|self - x| <= 2^(exp(self) - err)` in the direction `err_rm` describes,
  /// is enough to round `x` to `prec` bits in mode `rm`.
  pub fn can_round(&self, err: u64, err_rm: RoundingMode, rm: RoundingMode, prec: usize) -> bool {
    let (sign, n, e) = match make_exp_sig(self) {
      Either::Right(parts) => parts,
      Either::Left(_) => return false,
    };
    let err = i64::try_from(err).unwrap_or(i64::MAX);
    // a bound this far below the last bit of self decides nothing more
    let err_exp = self.exp.saturating_sub(err).max(e - prec as i64 - 64);
    let f = e.min(err_exp);
    let c = n.shl((e - f) as usize);
    let d = Limbs::power_of_two((err_exp - f) as usize);

    // which side of self the exact value can lie on, by magnitude
    let (below, above) = match err_rm {
      RoundingMode::NearEven => (true, true),
      RoundingMode::Zero => (false, true),
      RoundingMode::Away => (true, false),
      RoundingMode::Max => (sign, !sign),
      RoundingMode::Min => (!sign, sign),
    };
    if below && c.cmp(&d) != Ordering::Greater {
      return false;
    }
    let lo = if below { c.sub(&d) } else { c.clone() };
    let hi = if above { c.add(&d) } else { c };
    rounds_same(sign, &lo, &hi, f, prec, rm)
  }
}

impl PartialEq for Float {
  fn eq(&self, other: &Float) -> bool {
    cmp_floats(self, other) == Some(Ordering::Equal)
  }
}

impl PartialOrd for Float {
  fn partial_cmp(&self, other: &Float) -> Option<Ordering> {
    cmp_floats(self, other)
  }
}

impl PartialEq<i64> for Float {
  fn eq(&self, other: &i64) -> bool {
    self.compare(*other) == Some(Ordering::Equal)
  }
}

impl PartialOrd<i64> for Float {
  fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
    self.compare(*other)
  }
}

impl PartialEq<f64> for Float {
  fn eq(&self, other: &f64) -> bool {
    self.compare(*other) == Some(Ordering::Equal)
  }
}

impl PartialOrd<f64> for Float {
  fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
    self.compare(*other)
  }
}

impl<'a> std::ops::Add<&'a Float> for &'a Float {
  type Output = Float;

  /// Sum at the wider precision, in the default rounding mode.
  fn add(self, other: &'a Float) -> Float {
    let mut r = Float::nan_with_prec(self.prec.max(other.prec));
    Float::add(&mut r, self, other, context::default_rounding_mode());
    r
  }
}

impl<'a> std::ops::Sub<&'a Float> for &'a Float {
  type Output = Float;

  fn sub(self, other: &'a Float) -> Float {
    let mut r = Float::nan_with_prec(self.prec.max(other.prec));
    Float::sub(&mut r, self, other, context::default_rounding_mode());
    r
  }
}

impl<'a> std::ops::Mul<&'a Float> for &'a Float {
  type Output = Float;

  fn mul(self, other: &'a Float) -> Float {
    let mut r = Float::nan_with_prec(self.prec.max(other.prec));
    Float::mul(&mut r, self, other, context::default_rounding_mode());
    r
  }
}

impl<'a> std::ops::Div<&'a Float> for &'a Float {
  type Output = Float;

  fn div(self, other: &'a Float) -> Float {
    let mut r = Float::nan_with_prec(self.prec.max(other.prec));
    Float::div(&mut r, self, other, context::default_rounding_mode());
    r
  }
}

impl<'a> std::ops::Neg for &'a Float {
  type Output = Float;

  fn neg(self) -> Float {
    let mut r = self.clone();
    r.neg_assign();
    r
  }
}

impl AddAssign<&Float> for Float {
  fn add_assign(&mut self, other: &Float) {
    let lhs = self.clone();
    Float::add(self, &lhs, other, context::default_rounding_mode());
  }
}

impl SubAssign<&Float> for Float {
  fn sub_assign(&mut self, other: &Float) {
    let lhs = self.clone();
    Float::sub(self, &lhs, other, context::default_rounding_mode());
  }
}

impl MulAssign<&Float> for Float {
  fn mul_assign(&mut self, other: &Float) {
    let lhs = self.clone();
    Float::mul(self, &lhs, other, context::default_rounding_mode());
  }
}

impl DivAssign<&Float> for Float {
  fn div_assign(&mut self, other: &Float) {
    let lhs = self.clone();
    Float::div(self, &lhs, other, context::default_rounding_mode());
  }
}

impl AddAssign<i64> for Float {
  fn add_assign(&mut self, other: i64) {
    let lhs = self.clone();
    Float::add(self, &lhs, other, context::default_rounding_mode());
  }
}

impl SubAssign<i64> for Float {
  fn sub_assign(&mut self, other: i64) {
    let lhs = self.clone();
    Float::sub(self, &lhs, other, context::default_rounding_mode());
  }
}

impl MulAssign<i64> for Float {
  fn mul_assign(&mut self, other: i64) {
    let lhs = self.clone();
    Float::mul(self, &lhs, other, context::default_rounding_mode());
  }
}

impl DivAssign<i64> for Float {
  fn div_assign(&mut self, other: i64) {
    let lhs = self.clone();
    Float::div(self, &lhs, other, context::default_rounding_mode());
  }
}

impl AddAssign<f64> for Float {
  fn add_assign(&mut self, other: f64) {
    let lhs = self.clone();
    Float::add(self, &lhs, other, context::default_rounding_mode());
  }
}

impl SubAssign<f64> for Float {
  fn sub_assign(&mut self, other: f64) {
    let lhs = self.clone();
    Float::sub(self, &lhs, other, context::default_rounding_mode());
  }
}

impl MulAssign<f64> for Float {
  fn mul_assign(&mut self, other: f64) {
    let lhs = self.clone();
    Float::mul(self, &lhs, other, context::default_rounding_mode());
  }
}

impl DivAssign<f64> for Float {
  fn div_assign(&mut self, other: f64) {
    let lhs = self.clone();
    Float::div(self, &lhs, other, context::default_rounding_mode());
  }
}
