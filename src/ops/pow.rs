use std::cmp::Ordering;

use either::Either;

use crate::limb::Limbs;
use crate::util::*;
use crate::{context, Category, Exception, Float, RoundingMode, EXP_MAX, EXP_MIN};

/// `(n·2^e)^k`, or its reciprocal when `invert` is set, signed by `sign`.
fn pow_parts(sign: bool, n: &Limbs, e: i64, k: u64, invert: bool, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let tz = n.trailing_zeros();
  let odd = n.shr(tz);
  let e = e as i128 + tz as i128;
  let bits = odd.bit_len() as i128;
  let k_wide = k as i128;

  // 2^lg_lo <= |result| <= 2^lg_hi
  let (lg_lo, lg_hi) = if invert {
    (-(e + bits) * k_wide, -(e + bits - 1) * k_wide)
  } else {
    ((e + bits - 1) * k_wide, (e + bits) * k_wide)
  };
  if lg_lo >= EXP_MAX as i128 {
    let (f, ord, flags) = overflow(sign, prec, mode);
    context::raise(flags);
    return (f, ord);
  }
  if lg_hi < EXP_MIN as i128 - 2 {
    let to_zero = mode == RoundingMode::NearEven || rounds_toward_zero(mode, sign);
    let (f, ord, flags) = underflow(sign, prec, to_zero);
    context::raise(flags);
    return (f, ord);
  }

  let scale = if invert { -e * k_wide } else { e * k_wide };
  let one = Limbs::one();
  round_bounds(sign, prec, mode, prec + 64, |w| Bounds::scaled(&one, scale, &odd, k, invert, w))
}

/// `x^k`. Any `x`, NaN included, gives exactly 1 for `k = 0`.
pub(crate) fn pow_ui_impl(x: &Float, k: u64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  if k == 0 {
    return pack(false, &Limbs::one(), 0, false, prec, mode);
  }
  let sign = x.sign && k % 2 == 1;
  match make_exp_sig(x) {
    Either::Right((_, n, e)) => pow_parts(sign, n, e, k, false, prec, mode),
    Either::Left(Category::NaN) => propagate_nan(prec),
    Either::Left(Category::Infinity) => (Float::inf_with_prec(prec, sign), Ordering::Equal),
    Either::Left(_) => (Float::zero_with_prec(prec, sign), Ordering::Equal),
  }
}

pub(crate) fn pow_si_impl(x: &Float, k: i64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  if k >= 0 {
    return pow_ui_impl(x, k as u64, prec, mode);
  }
  let k = k.unsigned_abs();
  let sign = x.sign && k % 2 == 1;
  match make_exp_sig(x) {
    Either::Right((_, n, e)) => pow_parts(sign, n, e, k, true, prec, mode),
    Either::Left(Category::NaN) => propagate_nan(prec),
    Either::Left(Category::Infinity) => (Float::zero_with_prec(prec, sign), Ordering::Equal),
    Either::Left(_) => {
      context::raise(Exception::infinite());
      (Float::inf_with_prec(prec, sign), Ordering::Equal)
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn float(prec: usize, v: f64) -> Float {
    let mut x = Float::new(prec).unwrap();
    x.set_f64(v, RoundingMode::NearEven);
    x
  }

  #[test]
  fn small_powers_are_exact() {
    let (r, ord) = pow_ui_impl(&float(53, 3.0), 39, 64, RoundingMode::NearEven);
    assert_eq!(ord, Ordering::Equal);
    assert_eq!(r.to_i64(RoundingMode::NearEven), Ok(4_052_555_153_018_976_267));
    let (r, ord) = pow_ui_impl(&float(53, -1.5), 3, 53, RoundingMode::NearEven);
    assert_eq!(ord, Ordering::Equal);
    assert_eq!(r.to_f64(RoundingMode::NearEven), -3.375);
    let (r, _) = pow_si_impl(&float(53, -2.0), -3, 53, RoundingMode::NearEven);
    assert_eq!(r.to_f64(RoundingMode::NearEven), -0.125);
    let (r, ord) = pow_si_impl(&float(53, 3.0), -1, 53, RoundingMode::NearEven);
    assert_eq!(r.to_f64(RoundingMode::NearEven), 1.0 / 3.0);
    assert_eq!(ord, Ordering::Less);
  }

  #[test]
  fn inexact_powers_bracket() {
    let x = float(53, 1.1);
    let (lo, ord_lo) = pow_ui_impl(&x, 77, 60, RoundingMode::Min);
    let (hi, ord_hi) = pow_ui_impl(&x, 77, 60, RoundingMode::Max);
    assert_eq!((ord_lo, ord_hi), (Ordering::Less, Ordering::Greater));
    assert!(lo < hi);
    // the exact power needs 77·53 bits; widen and compare
    let mut exact = Float::new(77 * 53).unwrap();
    exact.set(&x, RoundingMode::NearEven);
    let mut acc = exact.clone();
    for _ in 1..77 {
      acc.mul(&acc.clone(), &exact, RoundingMode::NearEven);
    }
    assert!(lo < acc && acc < hi);
  }

  #[test]
  fn huge_exponents_stay_cheap() {
    // the same value as the decimal literal, rounded once
    let (p, ord) = pow_ui_impl(&float(53, 10.0), 300_000_000, 53, RoundingMode::NearEven);
    let (q, ord_q) = Float::parse("1e300000000", 10, 53, RoundingMode::NearEven).unwrap();
    assert_eq!(p, q);
    assert_eq!(ord, ord_q);

    // (1 + 2^-52)^(2^52) is close to e
    let mut x = Float::new(53).unwrap();
    x.set_f64(1.0 + f64::EPSILON, RoundingMode::NearEven);
    let (r, _) = pow_ui_impl(&x, 1 << 52, 53, RoundingMode::NearEven);
    assert_eq!(r.to_string_radix(10, 10, RoundingMode::Zero).unwrap(), "2.718281828");

    let (r, _) = pow_si_impl(&float(53, 10.0), -300_000_000, 53, RoundingMode::NearEven);
    assert_eq!(r.to_string_radix(10, 15, RoundingMode::NearEven).unwrap(), "1.00000000000000e-300000000");
  }

  #[test]
  fn out_of_range_powers() {
    context::clear_flags();
    let (r, ord) = pow_ui_impl(&float(53, 2.0), 1 << 31, 53, RoundingMode::NearEven);
    assert!(r.is_inf());
    assert_eq!(ord, Ordering::Greater);
    assert!(context::flags().contains(Exception::overflow()));
    let (r, _) = pow_ui_impl(&float(53, -2.0), (1 << 31) + 1, 53, RoundingMode::Zero);
    assert_eq!(r, -&Float::max_value(53).unwrap());
    let (r, ord) = pow_ui_impl(&float(53, 0.1), 1_000_000_000, 53, RoundingMode::NearEven);
    assert!(r.is_zero() && !r.is_sign_negative());
    assert_eq!(ord, Ordering::Less);
    assert!(context::flags().contains(Exception::underflow()));
    let (r, _) = pow_si_impl(&float(53, 10.0), -1_000_000_000, 53, RoundingMode::Max);
    assert_eq!(r, Float::min_positive(53).unwrap());
  }

  #[test]
  fn special_bases() {
    let nan = Float::new(10).unwrap();
    let (r, ord) = pow_ui_impl(&nan, 0, 10, RoundingMode::NearEven);
    assert_eq!((r.to_f64(RoundingMode::NearEven), ord), (1.0, Ordering::Equal));
    assert!(pow_ui_impl(&nan, 3, 10, RoundingMode::NearEven).0.is_nan());

    let (r, _) = pow_ui_impl(&float(10, f64::NEG_INFINITY), 3, 10, RoundingMode::NearEven);
    assert!(r.is_inf() && r.is_sign_negative());
    let (r, _) = pow_ui_impl(&float(10, -0.0), 2, 10, RoundingMode::NearEven);
    assert!(r.is_zero() && !r.is_sign_negative());

    context::clear_flags();
    let (r, _) = pow_si_impl(&float(10, -0.0), -3, 10, RoundingMode::NearEven);
    assert!(r.is_inf() && r.is_sign_negative());
    assert!(context::flags().contains(Exception::infinite()));
    let (r, _) = pow_si_impl(&float(10, f64::INFINITY), -2, 10, RoundingMode::NearEven);
    assert!(r.is_zero() && !r.is_sign_negative());
  }
}
