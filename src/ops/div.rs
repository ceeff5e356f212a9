use std::cmp::Ordering;

use either::Either;

use crate::limb::Limbs;
use crate::util::*;
use crate::{context, Category, Exception, Float, RoundingMode};

pub(crate) fn div_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let sign = x.sign ^ y.sign;
  match (make_exp_sig(x), make_exp_sig(y)) {
    (Either::Right((_, nx, ex)), Either::Right((_, ny, ey))) => {
      // enough quotient bits for prec plus a guard bit
      let shift = (prec + 2 + ny.bit_len()).saturating_sub(nx.bit_len());
      let (q, r) = nx.shl(shift).divrem(ny);
      pack(sign, &q, ex - ey - shift as i64, !r.is_zero(), prec, mode)
    }
    (Either::Left(Category::NaN), _) | (_, Either::Left(Category::NaN)) => propagate_nan(prec),
    (Either::Left(Category::Infinity), Either::Left(Category::Infinity))
    | (Either::Left(Category::Zero), Either::Left(Category::Zero)) => default_nan(prec),
    (Either::Left(Category::Infinity), _) => (Float::inf_with_prec(prec, sign), Ordering::Equal),
    (_, Either::Left(Category::Infinity)) => (Float::zero_with_prec(prec, sign), Ordering::Equal),
    (Either::Right(_), Either::Left(Category::Zero)) => {
      context::raise(Exception::infinite());
      (Float::inf_with_prec(prec, sign), Ordering::Equal)
    }
    _ => (Float::zero_with_prec(prec, sign), Ordering::Equal),
  }
}

/// `2^d mod m`.
fn pow2_mod(mut d: u64, m: &Limbs) -> Limbs {
  let mut result = Limbs::one().divrem(m).1;
  let mut base = Limbs::from_u64(2).divrem(m).1;
  while d > 0 {
    if d & 1 == 1 {
      result = result.mul(&base).divrem(m).1;
    }
    d >>= 1;
    if d > 0 {
      base = base.mul(&base).divrem(m).1;
    }
  }
  result
}

/// `|x| mod |y|` for `|x| = nx·2^ex`, `|y| = ny·2^ey`, as `(r, e)` with the
/// remainder `r·2^e`, plus the parity of the truncated quotient.
fn mod_magnitudes(nx: &Limbs, ex: i64, ny: &Limbs, ey: i64) -> (Limbs, i64, bool) {
  let tx = ex + nx.bit_len() as i64;
  let ty = ey + ny.bit_len() as i64;
  if tx < ty {
    return (nx.clone(), ex, false);
  }
  let f = ex.min(ey);
  // reducing modulo 2|y| leaves the quotient's parity in the top step
  let m = ny.shl((ey - f) as usize + 1);
  let r2 = if ex > ey {
    let d = (ex - ey) as u64;
    if d <= (m.bit_len() + 64) as u64 {
      nx.shl(d as usize).divrem(&m).1
    } else {
      nx.divrem(&m).1.mul(&pow2_mod(d, &m)).divrem(&m).1
    }
  } else {
    nx.divrem(&m).1
  };
  let y = m.shr(1);
  if r2.cmp(&y) == Ordering::Less {
    (r2, f, false)
  } else {
    (r2.sub(&y), f, true)
  }
}

pub(crate) fn fmod_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match (make_exp_sig(x), make_exp_sig(y)) {
    (Either::Right((sx, nx, ex)), Either::Right((_, ny, ey))) => {
      let (r, e, _) = mod_magnitudes(nx, ex, ny, ey);
      if r.is_zero() {
        (Float::zero_with_prec(prec, sx), Ordering::Equal)
      } else {
        pack(sx, &r, e, false, prec, mode)
      }
    }
    (Either::Left(Category::NaN), _) | (_, Either::Left(Category::NaN)) => propagate_nan(prec),
    (Either::Left(Category::Infinity), _) | (_, Either::Left(Category::Zero)) => default_nan(prec),
    _ => round_to(x, prec, mode),
  }
}

pub(crate) fn remainder_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match (make_exp_sig(x), make_exp_sig(y)) {
    (Either::Right((sx, nx, ex)), Either::Right((_, ny, ey))) => {
      let (r, e, odd) = mod_magnitudes(nx, ex, ny, ey);
      if r.is_zero() {
        return (Float::zero_with_prec(prec, sx), Ordering::Equal);
      }
      // past half of |y| the nearest quotient is one more
      let up = match cmp_scaled(&r, e + 1, ny, ey) {
        Ordering::Less => false,
        Ordering::Greater => true,
        Ordering::Equal => odd,
      };
      if !up {
        return pack(sx, &r, e, false, prec, mode);
      }
      // r > |y|/2 bounds the alignment
      let t = e.min(ey);
      let y_aligned = ny.shl((ey - t) as usize);
      let r_aligned = r.shl((e - t) as usize);
      pack(!sx, &y_aligned.sub(&r_aligned), t, false, prec, mode)
    }
    (Either::Left(Category::NaN), _) | (_, Either::Left(Category::NaN)) => propagate_nan(prec),
    (Either::Left(Category::Infinity), _) | (_, Either::Left(Category::Zero)) => default_nan(prec),
    _ => round_to(x, prec, mode),
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

  fn rem(f: fn(&Float, &Float, usize, RoundingMode) -> (Float, Ordering), x: f64, y: f64) -> f64 {
    let (r, ord) = f(&float(53, x), &float(53, y), 53, RoundingMode::NearEven);
    assert_eq!(ord, Ordering::Equal);
    r.to_f64(RoundingMode::NearEven)
  }

  #[test]
  fn quotient_carries_sticky_remainder() {
    let (q, ord) = div_impl(&float(10, 1.0), &float(10, 3.0), 10, RoundingMode::Zero);
    assert_eq!(ord, Ordering::Less);
    assert_eq!(q.to_f64(RoundingMode::NearEven), 341.0 / 1024.0);
    let (q, ord) = div_impl(&float(10, 1.0), &float(10, 3.0), 10, RoundingMode::Away);
    assert_eq!(ord, Ordering::Greater);
    assert_eq!(q.to_f64(RoundingMode::NearEven), 342.0 / 1024.0);
    let (q, ord) = div_impl(&float(10, 6.0), &float(10, 3.0), 10, RoundingMode::Away);
    assert_eq!(ord, Ordering::Equal);
    assert_eq!(q.to_f64(RoundingMode::NearEven), 2.0);
  }

  #[test]
  fn fmod_keeps_dividend_sign() {
    assert_eq!(rem(fmod_impl, 7.5, 2.0), 1.5);
    assert_eq!(rem(fmod_impl, -7.5, 2.0), -1.5);
    assert_eq!(rem(fmod_impl, 7.5, -2.0), 1.5);
    assert_eq!(rem(fmod_impl, 1.0, 3.0), 1.0);
    assert_eq!(rem(fmod_impl, 0.1, 0.01), 0.1 % 0.01);
    let (r, _) = fmod_impl(&float(53, -4.0), &float(53, 2.0), 53, RoundingMode::NearEven);
    assert!(r.is_zero() && r.is_sign_negative());
  }

  #[test]
  fn remainder_rounds_quotient_to_even() {
    assert_eq!(rem(remainder_impl, 5.0, 2.0), 1.0);
    assert_eq!(rem(remainder_impl, 7.0, 2.0), -1.0);
    assert_eq!(rem(remainder_impl, 3.0, 2.0), -1.0);
    assert_eq!(rem(remainder_impl, 1.0, 2.0), 1.0);
    assert_eq!(rem(remainder_impl, 1.5, 2.0), -0.5);
    assert_eq!(rem(remainder_impl, -7.25, 2.0), 0.75);
  }

  #[test]
  fn huge_exponent_gap() {
    // 2^1000 mod 3 = 1
    let mut x = float(10, 1.0);
    x.mul_2si(&x.clone(), 1000, RoundingMode::NearEven);
    let (r, _) = fmod_impl(&x, &float(10, 3.0), 10, RoundingMode::NearEven);
    assert_eq!(r.to_f64(RoundingMode::NearEven), 1.0);
    // 2^(2^20) mod 7 = 2^(2^20 mod 3) = 2
    x.set_i64(1, RoundingMode::NearEven);
    x.mul_2si(&x.clone(), 1 << 20, RoundingMode::NearEven);
    let (r, _) = fmod_impl(&x, &float(10, 7.0), 10, RoundingMode::NearEven);
    assert_eq!(r.to_f64(RoundingMode::NearEven), 2.0);
    assert_eq!(pow2_mod(10, &Limbs::from_u64(1000)).to_u64(), Some(24));
  }

  #[test]
  fn special_operands() {
    let mut inf = Float::new(10).unwrap();
    inf.set_inf(false);
    let (r, _) = fmod_impl(&inf, &float(10, 1.0), 10, RoundingMode::NearEven);
    assert!(r.is_nan());
    let (r, _) = remainder_impl(&float(10, 1.0), &float(10, 0.0), 10, RoundingMode::NearEven);
    assert!(r.is_nan());
    let (r, _) = fmod_impl(&float(10, 3.0), &inf, 10, RoundingMode::NearEven);
    assert_eq!(r.to_f64(RoundingMode::NearEven), 3.0);
  }
}
