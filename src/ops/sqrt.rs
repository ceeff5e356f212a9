use std::cmp::Ordering;

use either::Either;

use crate::limb::Limbs;
use crate::util::*;
use crate::{Category, Float, RoundingMode};

/// Square root of the exact value `n·2^e`.
pub(crate) fn sqrt_parts(n: &Limbs, e: i64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  // an even exponent halves exactly
  let (n, e) = if e % 2 != 0 { (n.shl(1), e - 1) } else { (n.clone(), e) };
  let need = 2 * prec + 4;
  let bits = n.bit_len();
  let k = if bits >= need { 0 } else { (need - bits + 1) / 2 };
  let m = n.shl(2 * k);
  let r = m.isqrt();
  let exact = r.mul(&r) == m;
  pack(false, &r, (e - 2 * k as i64) / 2, !exact, prec, mode)
}

pub(crate) fn sqrt_impl(x: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match make_exp_sig(x) {
    Either::Right((true, _, _)) => default_nan(prec),
    Either::Right((_, n, e)) => sqrt_parts(n, e, prec, mode),
    Either::Left(Category::NaN) => propagate_nan(prec),
    Either::Left(Category::Infinity) if x.sign => default_nan(prec),
    // +inf and both zeros are their own roots
    Either::Left(_) => round_to(x, prec, mode),
  }
}
