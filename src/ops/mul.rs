use std::cmp::Ordering;

use either::Either;

use crate::ops::add::{add_parts, zero_sum_sign};
use crate::util::*;
use crate::{Category, Float, RoundingMode};

pub(crate) fn mul_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let sign = x.sign ^ y.sign;
  match (make_exp_sig(x), make_exp_sig(y)) {
    (Either::Right((_, nx, ex)), Either::Right((_, ny, ey))) => pack(sign, &nx.mul(ny), ex + ey, false, prec, mode),
    (Either::Left(Category::NaN), _) | (_, Either::Left(Category::NaN)) => propagate_nan(prec),
    (Either::Left(Category::Infinity), Either::Left(Category::Zero))
    | (Either::Left(Category::Zero), Either::Left(Category::Infinity)) => default_nan(prec),
    (Either::Left(Category::Infinity), _) | (_, Either::Left(Category::Infinity)) => {
      (Float::inf_with_prec(prec, sign), Ordering::Equal)
    }
    _ => (Float::zero_with_prec(prec, sign), Ordering::Equal),
  }
}

/// `x·y + (±|z|)` rounded once; `z_sign` stands in for the sign of `z`.
pub(crate) fn fma_impl(x: &Float, y: &Float, z: &Float, z_sign: bool, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let sp = x.sign ^ y.sign;
  match (make_exp_sig(x), make_exp_sig(y), make_exp_sig(z)) {
    (Either::Right((_, nx, ex)), Either::Right((_, ny, ey)), Either::Right((_, nz, ez))) => {
      return add_parts(sp, &nx.mul(ny), ex + ey, z_sign, nz, ez, prec, mode);
    }
    (Either::Right((_, nx, ex)), Either::Right((_, ny, ey)), Either::Left(Category::Zero)) => {
      return pack(sp, &nx.mul(ny), ex + ey, false, prec, mode);
    }
    _ => {}
  }

  if x.is_nan() || y.is_nan() || z.is_nan() {
    return propagate_nan(prec);
  }
  let product_inf = x.is_inf() || y.is_inf();
  if product_inf && (x.is_zero() || y.is_zero()) {
    return default_nan(prec);
  }
  if product_inf {
    if z.is_inf() && z_sign != sp {
      return default_nan(prec);
    }
    return (Float::inf_with_prec(prec, sp), Ordering::Equal);
  }
  if z.is_inf() {
    return (Float::inf_with_prec(prec, z_sign), Ordering::Equal);
  }
  // the product is zero
  match make_exp_sig(z) {
    Either::Right((_, nz, ez)) => pack(z_sign, nz, ez, false, prec, mode),
    Either::Left(_) => (Float::zero_with_prec(prec, zero_sum_sign(sp, z_sign, mode)), Ordering::Equal),
  }
}
