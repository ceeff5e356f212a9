use std::cmp::Ordering;

use either::Either;

use super::sqrt::sqrt_parts;
use crate::limb::Limbs;
use crate::util::*;
use crate::{context, Category, Exception, Float, RoundingMode};

/// Compare `y^k` with `m·2^t`, widening the power until they separate.
fn cmp_power(y: &Limbs, k: u64, m: &Limbs, t: i128, mut w: usize) -> Ordering {
  let tz = y.trailing_zeros();
  let odd = y.shr(tz);
  let shift = tz as i128 * k as i128;
  loop {
    let (hi, eh) = pow_bound(&odd, k, w, true);
    if cmp_wide(&hi, eh + shift, m, t) == Ordering::Less {
      return Ordering::Less;
    }
    let (lo, el) = pow_bound(&odd, k, w, false);
    let c = cmp_wide(&lo, el + shift, m, t);
    if c == Ordering::Greater || (lo == hi && el == eh) {
      return c;
    }
    w += w / 2;
  }
}

/// `k`-th root of `n·2^e` for `k >= 2`, by bisection on the integer root.
fn root_parts(sign: bool, n: &Limbs, e: i64, k: u64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let k_wide = k as i128;
  let (q, rem) = ((e as i128).div_euclid(k_wide), (e as i128).rem_euclid(k_wide));
  // the root is y·2^(q - f) with y the integer root of t = n·2^(rem + k·f)
  let f = prec as i128 + 2;
  let t = rem + k_wide * f;
  let bits = n.bit_len() as i128;
  let mut lo = Limbs::power_of_two(((t + bits - 1) / k_wide) as usize);
  let mut hi = Limbs::power_of_two(((t + bits + k_wide - 1) / k_wide) as usize);
  let w = hi.bit_len() + 64;

  // lo^k <= t < hi^k
  while hi.sub(&lo).cmp(&Limbs::one()) == Ordering::Greater {
    let mid = lo.add(&hi).shr(1);
    if cmp_power(&mid, k, n, t, w) == Ordering::Greater {
      hi = mid;
    } else {
      lo = mid;
    }
  }
  let exact = cmp_power(&lo, k, n, t, w) == Ordering::Equal;
  pack(sign, &lo, (q - f) as i64, !exact, prec, mode)
}

/// `x^(1/k)`. Zeros keep their sign; even roots of negative values are NaN.
pub(crate) fn root_impl(x: &Float, k: u64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let even = k % 2 == 0;
  match make_exp_sig(x) {
    _ if x.is_nan() => propagate_nan(prec),
    _ if k == 0 => default_nan(prec),
    Either::Right((true, _, _)) if even => default_nan(prec),
    Either::Right((sign, n, e)) if k > 1 => root_parts(sign, n, e, k, prec, mode),
    Either::Left(Category::Infinity) if x.sign && even => default_nan(prec),
    _ => round_to(x, prec, mode),
  }
}

/// `1/sqrt(x)`.
pub(crate) fn rec_sqrt_impl(x: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match make_exp_sig(x) {
    Either::Right((true, _, _)) => default_nan(prec),
    Either::Right((_, n, e)) => {
      let (n, e) = if e % 2 != 0 { (n.shl(1), e - 1) } else { (n.clone(), e) };
      // floor(sqrt(floor(z))) = floor(sqrt(z)) for z = 2^(2g)/n
      let g = prec + 3 + (n.bit_len() + 1) / 2;
      let (z, r) = Limbs::power_of_two(2 * g).divrem(&n);
      let y = z.isqrt();
      let exact = r.is_zero() && y.mul(&y) == z;
      pack(false, &y, -(g as i64) - e / 2, !exact, prec, mode)
    }
    Either::Left(Category::NaN) => propagate_nan(prec),
    Either::Left(Category::Infinity) if x.sign => default_nan(prec),
    Either::Left(Category::Infinity) => (Float::zero_with_prec(prec, false), Ordering::Equal),
    Either::Left(_) => {
      context::raise(Exception::infinite());
      (Float::inf_with_prec(prec, false), Ordering::Equal)
    }
  }
}

/// `sqrt(x^2 + y^2)` without intermediate rounding.
pub(crate) fn hypot_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match (make_exp_sig(x), make_exp_sig(y)) {
    (Either::Left(Category::Infinity), _) | (_, Either::Left(Category::Infinity)) => {
      (Float::inf_with_prec(prec, false), Ordering::Equal)
    }
    (Either::Left(Category::NaN), _) | (_, Either::Left(Category::NaN)) => propagate_nan(prec),
    (Either::Right((_, nx, ex)), Either::Right((_, ny, ey))) => hypot_parts(nx, ex, ny, ey, prec, mode),
    (Either::Right((_, n, e)), _) | (_, Either::Right((_, n, e))) => pack(false, n, e, false, prec, mode),
    _ => (Float::zero_with_prec(prec, false), Ordering::Equal),
  }
}

fn hypot_parts(nx: &Limbs, ex: i64, ny: &Limbs, ey: i64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let sx = (nx.mul(nx), 2 * ex);
  let sy = (ny.mul(ny), 2 * ey);
  let top = |s: &(Limbs, i64)| s.1 + s.0.bit_len() as i64;
  let ((a, ea), (b, eb)) = if top(&sx) >= top(&sy) { (sx, sy) } else { (sy, sx) };
  let top_a = ea + a.bit_len() as i64;
  let top_b = eb + b.bit_len() as i64;

  // a smaller square wholly below `cut` only decides the sticky bit
  let cut = (top_a - 2 * prec as i64 - 64).min(ea);
  let cut = cut - cut.rem_euclid(2);
  if top_b <= cut {
    let s = a.shl((ea - cut) as usize);
    return pack(false, &s.isqrt(), cut / 2, true, prec, mode);
  }
  let f = ea.min(eb);
  let sum = a.shl((ea - f) as usize).add(&b.shl((eb - f) as usize));
  sqrt_parts(&sum, f, prec, mode)
}
