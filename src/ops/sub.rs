use std::cmp::Ordering;

use crate::limb::Limbs;
use crate::ops::add::add_signed;
use crate::util::pack;
use crate::{Float, RoundingMode};

pub(crate) fn sub_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  add_signed(x, y, !y.sign, prec, mode)
}

/// Round `±(a - b)·2^t` where the sign belongs to `a`.
pub(crate) fn sub_magnitudes(sign: bool, a: &Limbs, b: &Limbs, t: i64, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match a.cmp(b) {
    Ordering::Equal => (Float::zero_with_prec(prec, mode == RoundingMode::Min), Ordering::Equal),
    Ordering::Greater => pack(sign, &a.sub(b), t, false, prec, mode),
    Ordering::Less => pack(!sign, &b.sub(a), t, false, prec, mode),
  }
}
