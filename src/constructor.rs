use std::cmp::Ordering;

use crate::limb::{limbs_for, Limbs, LIMB_BITS};
use crate::util::{pack, round_to};
use crate::{context, Category, Error, Float, Operand, RoundingMode, EXP_MAX, EXP_MIN};

impl Float {
  /// A NaN carrying `prec` bits of precision.
  pub fn new(prec: usize) -> Result<Float, Error> {
    let prec = context::check_prec(prec)?;
    Ok(Float::nan_with_prec(prec))
  }

  /// The largest finite value at `prec` bits.
  pub fn max_value(prec: usize) -> Result<Float, Error> {
    let prec = context::check_prec(prec)?;
    Ok(Float::max_with_prec(prec, false))
  }

  /// The least positive value at `prec` bits, `0.1b × 2^EXP_MIN`.
  pub fn min_positive(prec: usize) -> Result<Float, Error> {
    let prec = context::check_prec(prec)?;
    Ok(Float::min_pos_with_prec(prec, false))
  }

  pub(crate) fn nan_with_prec(prec: usize) -> Float {
    Float::special(prec, Category::NaN, false)
  }

  pub(crate) fn zero_with_prec(prec: usize, sign: bool) -> Float {
    Float::special(prec, Category::Zero, sign)
  }

  pub(crate) fn inf_with_prec(prec: usize, sign: bool) -> Float {
    Float::special(prec, Category::Infinity, sign)
  }

  pub(crate) fn max_with_prec(prec: usize, sign: bool) -> Float {
    let m = Limbs::power_of_two(prec).sub(&Limbs::one());
    Float::from_raw(sign, EXP_MAX, prec, m)
  }

  pub(crate) fn min_pos_with_prec(prec: usize, sign: bool) -> Float {
    Float::from_raw(sign, EXP_MIN, prec, Limbs::power_of_two(prec - 1))
  }

  fn special(prec: usize, category: Category, sign: bool) -> Float {
    Float { sign, exp: 0, prec, sig: Limbs::zero(), category }
  }

  /// A regular value `±0.m × 2^exp`; `m` holds exactly `prec` bits.
  pub(crate) fn from_raw(sign: bool, exp: i64, prec: usize, m: Limbs) -> Float {
    debug_assert_eq!(m.bit_len(), prec);
    debug_assert!((EXP_MIN..=EXP_MAX).contains(&exp));
    let pad = limbs_for(prec) * LIMB_BITS - prec;
    Float { sign, exp, prec, sig: m.shl(pad), category: Category::Normal }
  }

  /// Take a rounded result computed at `self.prec()`.
  pub(crate) fn store(&mut self, (value, ord): (Float, Ordering)) -> Ordering {
    debug_assert_eq!(value.prec, self.prec);
    *self = value;
    ord
  }

  pub fn set_nan(&mut self) {
    *self = Float::nan_with_prec(self.prec);
  }

  pub fn set_inf(&mut self, neg: bool) {
    *self = Float::inf_with_prec(self.prec, neg);
  }

  pub fn set_zero(&mut self, neg: bool) {
    *self = Float::zero_with_prec(self.prec, neg);
  }

  /// Change the precision; the value becomes NaN.
  pub fn set_prec(&mut self, prec: usize) -> Result<(), Error> {
    let prec = context::check_prec(prec)?;
    log::debug!("precision reset from {} to {} bits", self.prec, prec);
    *self = Float::nan_with_prec(prec);
    Ok(())
  }

  /// Change the precision, rounding the current value into it.
  pub fn prec_round(&mut self, prec: usize, rm: RoundingMode) -> Result<Ordering, Error> {
    let prec = context::check_prec(prec)?;
    let (value, ord) = round_to(self, prec, rm);
    *self = value;
    Ok(ord)
  }

  pub fn set(&mut self, x: &Float, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(round_to(x, prec, rm))
  }

  pub fn set_i64(&mut self, v: i64, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(pack(v < 0, &Limbs::from_u64(v.unsigned_abs()), 0, false, prec, rm))
  }

  pub fn set_u64(&mut self, v: u64, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(pack(false, &Limbs::from_u64(v), 0, false, prec, rm))
  }

  pub fn set_f64(&mut self, v: f64, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    if v.is_nan() {
      self.set_nan();
      return Ordering::Equal;
    }
    if v.is_infinite() {
      self.set_inf(v < 0.0);
      return Ordering::Equal;
    }
    let (n, e) = f64_parts(v);
    self.store(pack(v.is_sign_negative(), &Limbs::from_u64(n), e, false, prec, rm))
  }

  /// Parse `s` in `base` into this value's precision. On error the value is
  /// left as it was.
  pub fn set_str(&mut self, s: &str, base: u32, rm: RoundingMode) -> Result<Ordering, Error> {
    let (value, ord) = Float::parse(s, base, self.prec, rm)?;
    *self = value;
    Ok(ord)
  }

  /// Set from any operand kind.
  pub fn assign<'a>(&mut self, v: impl Into<Operand<'a>>, rm: RoundingMode) -> Ordering {
    match v.into() {
      Operand::Float(x) => self.set(x, rm),
      Operand::Int(i) => self.set_i64(i, rm),
      Operand::Double(d) => self.set_f64(d, rm),
    }
  }
}

impl Default for Float {
  /// A NaN at the current default precision.
  fn default() -> Float {
    Float::nan_with_prec(context::default_prec())
  }
}

/// `|v| = n·2^e` for a finite `v`.
pub(crate) fn f64_parts(v: f64) -> (u64, i64) {
  let bits = v.to_bits();
  let exp = ((bits >> 52) & 0x7FF) as i64;
  let frac = bits & ((1 << 52) - 1);
  if exp == 0 {
    (frac, -1074)
  } else {
    (frac | (1 << 52), exp - 1075)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::context::{PREC_MAX, TEST_DEFAULTS_LOCK};

  #[test]
  fn new_checks_precision() {
    assert!(Float::new(1).unwrap().is_nan());
    assert_eq!(Float::new(200).unwrap().prec(), 200);
    assert!(matches!(Float::new(0), Err(Error::InvalidPrecision { prec: 0, .. })));
    assert!(Float::new(PREC_MAX + 1).is_err());
  }

  #[test]
  fn default_uses_context_precision() {
    let _guard = TEST_DEFAULTS_LOCK.lock();
    let x = Float::default();
    assert!(x.is_nan());
    assert_eq!(x.prec(), context::default_prec());
  }

  #[test]
  fn set_i64_rounds_into_precision() {
    let mut x = Float::new(4).unwrap();
    assert_eq!(x.set_i64(-17, RoundingMode::NearEven), Ordering::Greater);
    assert_eq!(x.to_f64(RoundingMode::NearEven), -16.0);
    assert_eq!(x.set_i64(i64::MIN, RoundingMode::Zero), Ordering::Equal);
    assert_eq!(x.to_i64(RoundingMode::Zero), Ok(i64::MIN));
    x.set_i64(0, RoundingMode::NearEven);
    assert!(x.is_zero() && !x.is_sign_negative());
  }

  #[test]
  fn set_f64_is_exact_at_53_bits() {
    let mut x = Float::new(53).unwrap();
    for &v in &[1.5, -0.1, 5e-324, f64::MAX, -2.2250738585072014e-308] {
      assert_eq!(x.set_f64(v, RoundingMode::NearEven), Ordering::Equal);
      assert_eq!(x.to_f64(RoundingMode::NearEven), v);
    }
    x.set_f64(-0.0, RoundingMode::NearEven);
    assert!(x.is_zero() && x.is_sign_negative());
    x.set_f64(f64::NEG_INFINITY, RoundingMode::NearEven);
    assert!(x.is_inf() && x.is_sign_negative());
    x.set_f64(f64::NAN, RoundingMode::NearEven);
    assert!(x.is_nan());
  }

  #[test]
  fn set_prec_resets_and_prec_round_keeps_value() {
    let mut x = Float::new(64).unwrap();
    x.set_u64(0xFFFF_FFFF_FFFF_FFFF, RoundingMode::NearEven);
    assert_eq!(x.prec_round(8, RoundingMode::Zero), Ok(Ordering::Less));
    assert_eq!(x.prec(), 8);
    assert_eq!(x.to_f64(RoundingMode::NearEven), 18374686479671623680.0);

    x.set_prec(100).unwrap();
    assert!(x.is_nan());
    assert_eq!(x.prec(), 100);
    assert!(x.set_prec(0).is_err());
    assert_eq!(x.prec(), 100);
  }

  #[test]
  fn set_str_leaves_value_on_error() {
    let mut x = Float::new(30).unwrap();
    x.set_i64(7, RoundingMode::NearEven);
    assert!(x.set_str("12x", 10, RoundingMode::NearEven).is_err());
    assert_eq!(x.to_i64(RoundingMode::NearEven), Ok(7));
    assert_eq!(x.set_str("ff", 16, RoundingMode::NearEven), Ok(Ordering::Equal));
    assert_eq!(x.to_i64(RoundingMode::NearEven), Ok(255));
  }

  #[test]
  fn extreme_values() {
    let max = Float::max_value(10).unwrap();
    assert_eq!(max.exp(), EXP_MAX);
    assert_eq!(max.min_prec(), 10);
    let tiny = Float::min_positive(10).unwrap();
    assert_eq!(tiny.exp(), EXP_MIN);
    assert_eq!(tiny.min_prec(), 1);
  }

  #[test]
  fn assign_dispatches_on_operand() {
    let mut x = Float::new(53).unwrap();
    x.assign(3, RoundingMode::NearEven);
    let mut y = Float::new(53).unwrap();
    y.assign(&x, RoundingMode::NearEven);
    assert_eq!(y.to_f64(RoundingMode::NearEven), 3.0);
    y.assign(0.25, RoundingMode::NearEven);
    assert_eq!(y.to_f64(RoundingMode::NearEven), 0.25);
  }
}
