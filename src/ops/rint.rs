use std::cmp::Ordering;

use either::Either;

use crate::limb::Limbs;
use crate::util::*;
use crate::{context, Category, Exception, Float, RoundingMode};

/// Direction used when rounding to an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IntRounding {
  Mode(RoundingMode),
  /// Nearest, halfway cases away from zero.
  TiesAway,
}

/// Round `±n·2^e` to a multiple of `2^p`. Returns the multiplier `k` and
/// the ternary of `±k·2^p` against the exact value.
pub(crate) fn round_at(sign: bool, n: &Limbs, e: i64, p: i64, how: IntRounding) -> (Limbs, Ordering) {
  if e >= p {
    return (n.shl((e - p) as usize), Ordering::Equal);
  }
  let (k, loss) = shift_right_with_loss(n, (p - e) as usize);
  let away = match how {
    IntRounding::Mode(rm) => need_round_away(rm, sign, loss, k.is_odd()),
    IntRounding::TiesAway => matches!(loss, Loss::ExactlyHalf | Loss::MoreThanHalf),
  };
  let ord = if loss == Loss::ExactlyZero {
    Ordering::Equal
  } else if away ^ sign {
    Ordering::Greater
  } else {
    Ordering::Less
  };
  (if away { k.add_small(1) } else { k }, ord)
}

/// The representable integer next to `x` in direction `how`.
pub(crate) fn rint_impl(x: &Float, prec: usize, how: IntRounding) -> (Float, Ordering) {
  let (sign, n, e) = match make_exp_sig(x) {
    Either::Right(parts) => parts,
    Either::Left(Category::NaN) => return propagate_nan(prec),
    Either::Left(_) => return round_to(x, prec, RoundingMode::NearEven),
  };

  // rounding position: the unit, or the destination's last place if coarser
  let p = (x.exp - prec as i64).max(0);
  if e >= p {
    return round_to(x, prec, RoundingMode::NearEven);
  }
  let (k, ord) = round_at(sign, n, e, p, how);
  if ord != Ordering::Equal {
    context::raise(Exception::inexact());
  }
  if k.is_zero() {
    return (Float::zero_with_prec(prec, sign), ord);
  }
  // k·2^p fits in prec bits
  let (r, _) = pack(sign, &k, p, false, prec, RoundingMode::NearEven);
  (r, ord)
}

/// `x` minus its integer part toward zero.
pub(crate) fn frac_impl(x: &Float, prec: usize, rm: RoundingMode) -> (Float, Ordering) {
  let (sign, n, e) = match make_exp_sig(x) {
    Either::Right(parts) => parts,
    Either::Left(Category::NaN) => return propagate_nan(prec),
    Either::Left(Category::Infinity) => return default_nan(prec),
    Either::Left(_) => return (Float::zero_with_prec(prec, x.sign), Ordering::Equal),
  };
  if e >= 0 {
    return (Float::zero_with_prec(prec, sign), Ordering::Equal);
  }
  let f = n.low_bits((-e) as usize);
  if f.is_zero() {
    return (Float::zero_with_prec(prec, sign), Ordering::Equal);
  }
  pack(sign, &f, e, false, prec, rm)
}

impl Float {
  /// Round `x` to an integer in direction `rm`.
  pub fn rint(&mut self, x: &Float, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(rint_impl(x, prec, IntRounding::Mode(rm)))
  }

  pub fn rint_ceil(&mut self, x: &Float) -> Ordering {
    let prec = self.prec;
    self.store(rint_impl(x, prec, IntRounding::Mode(RoundingMode::Max)))
  }

  pub fn rint_floor(&mut self, x: &Float) -> Ordering {
    let prec = self.prec;
    self.store(rint_impl(x, prec, IntRounding::Mode(RoundingMode::Min)))
  }

  /// Nearest integer, halfway cases away from zero.
  pub fn rint_round(&mut self, x: &Float) -> Ordering {
    let prec = self.prec;
    self.store(rint_impl(x, prec, IntRounding::TiesAway))
  }

  pub fn rint_trunc(&mut self, x: &Float) -> Ordering {
    let prec = self.prec;
    self.store(rint_impl(x, prec, IntRounding::Mode(RoundingMode::Zero)))
  }

  pub fn frac(&mut self, x: &Float, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(frac_impl(x, prec, rm))
  }

  /// Split `x` into its integer part (into `self`) and its fractional part
  /// (into `frac`), both with the sign of `x`.
  pub fn modf(&mut self, frac: &mut Float, x: &Float, rm: RoundingMode) -> (Ordering, Ordering) {
    if x.is_inf() {
      self.set_inf(x.sign);
      frac.set_zero(x.sign);
      return (Ordering::Equal, Ordering::Equal);
    }
    let fprec = frac.prec;
    let frac_ord = frac.store(frac_impl(x, fprec, rm));
    let prec = self.prec;
    let int_ord = match make_exp_sig(x) {
      Either::Right((sign, n, e)) if e < 0 => {
        let k = n.shr((-e) as usize);
        if k.is_zero() {
          self.set_zero(sign);
          Ordering::Equal
        } else {
          self.store(pack(sign, &k, 0, false, prec, rm))
        }
      }
      _ => self.set(x, rm),
    };
    (int_ord, frac_ord)
  }
}
