use std::cmp::Ordering;

use either::Either;

use crate::limb::Limbs;
use crate::ops::sub::sub_magnitudes;
use crate::util::*;
use crate::{Category, Float, RoundingMode};

/// Bits kept below the destination's last place when the smaller operand
/// is folded into a sticky bit.
const GUARD_BITS: i64 = 4;

pub(crate) fn add_impl(x: &Float, y: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  add_signed(x, y, y.sign, prec, mode)
}

/// `x + (±|y|)`, with `y_sign` standing in for the sign of `y`.
pub(crate) fn add_signed(x: &Float, y: &Float, y_sign: bool, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match (make_exp_sig(x), make_exp_sig(y)) {
    (Either::Right((sx, nx, ex)), Either::Right((_, ny, ey))) => add_parts(sx, nx, ex, y_sign, ny, ey, prec, mode),
    (Either::Left(Category::NaN), _) | (_, Either::Left(Category::NaN)) => propagate_nan(prec),
    (Either::Left(Category::Infinity), Either::Left(Category::Infinity)) => {
      if x.sign == y_sign {
        (Float::inf_with_prec(prec, x.sign), Ordering::Equal)
      } else {
        default_nan(prec)
      }
    }
    (Either::Left(Category::Infinity), _) => (Float::inf_with_prec(prec, x.sign), Ordering::Equal),
    (_, Either::Left(Category::Infinity)) => (Float::inf_with_prec(prec, y_sign), Ordering::Equal),
    (Either::Left(_), Either::Right((_, ny, ey))) => pack(y_sign, ny, ey, false, prec, mode),
    (Either::Right(_), Either::Left(_)) => round_to(x, prec, mode),
    (Either::Left(_), Either::Left(_)) => {
      (Float::zero_with_prec(prec, zero_sum_sign(x.sign, y_sign, mode)), Ordering::Equal)
    }
  }
}

/// Sign of an exact zero sum: the common sign, otherwise `-0` only when
/// rounding toward −∞.
pub(crate) fn zero_sum_sign(a: bool, b: bool, mode: RoundingMode) -> bool {
  if a == b {
    a
  } else {
    mode == RoundingMode::Min
  }
}

/// Round `±nx·2^ex ± ny·2^ey`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn add_parts(
  sx: bool,
  nx: &Limbs,
  ex: i64,
  sy: bool,
  ny: &Limbs,
  ey: i64,
  prec: usize,
  mode: RoundingMode,
) -> (Float, Ordering) {
  let tx = ex + nx.bit_len() as i64;
  let ty = ey + ny.bit_len() as i64;
  // a has the higher top bit
  let ((sa, na, ea, ta), (sb, nb, eb, tb)) = if tx >= ty {
    ((sx, nx, ex, tx), (sy, ny, ey, ty))
  } else {
    ((sy, ny, ey, ty), (sx, nx, ex, tx))
  };

  if ta - tb <= 1 {
    // close enough to cancel: align exactly
    let t = ea.min(eb);
    let a = na.shl((ea - t) as usize);
    let b = nb.shl((eb - t) as usize);
    return if sa == sb {
      pack(sa, &a.add(&b), t, false, prec, mode)
    } else {
      sub_magnitudes(sa, &a, &b, t, prec, mode)
    };
  }

  let t = ea.min(eb.max(ta - prec as i64 - GUARD_BITS));
  let a = na.shl((ea - t) as usize);
  let (b, sticky) = if eb >= t {
    (nb.shl((eb - t) as usize), false)
  } else {
    let s = (t - eb) as usize;
    (nb.shr(s), !nb.low_bits_zero(s))
  };

  if sa == sb {
    pack(sa, &a.add(&b), t, sticky, prec, mode)
  } else if sticky {
    // a - (b + f) with 0 < f < 1 lies in (a - b - 1, a - b)
    pack(sa, &a.sub(&b).sub(&Limbs::one()), t, true, prec, mode)
  } else {
    pack(sa, &a.sub(&b), t, false, prec, mode)
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
  fn ties_resolve_by_mode() {
    // 1 + 2^-53 is the midpoint between 1 and its successor at 53 bits
    let one = float(53, 1.0);
    let half_ulp = float(53, 2f64.powi(-53));
    let (r, ord) = add_impl(&one, &half_ulp, 53, RoundingMode::NearEven);
    assert_eq!((r.to_f64(RoundingMode::NearEven), ord), (1.0, Ordering::Less));
    let (r, ord) = add_impl(&one, &half_ulp, 53, RoundingMode::Away);
    assert_eq!((r.to_f64(RoundingMode::NearEven), ord), (1.0 + f64::EPSILON, Ordering::Greater));

    let three_halves = float(53, 1.0 + f64::EPSILON);
    let (r, _) = add_impl(&three_halves, &half_ulp, 53, RoundingMode::NearEven);
    assert_eq!(r.to_f64(RoundingMode::NearEven), 1.0 + 2.0 * f64::EPSILON);
  }

  #[test]
  fn sticky_subtraction_borrows() {
    // 2^100 - 3 at 10 bits toward zero: just below 2^100
    let mut big = Float::new(10).unwrap();
    big.set_i64(1, RoundingMode::NearEven);
    big.mul_2si(&big.clone(), 100, RoundingMode::NearEven);
    let three = float(10, 3.0);
    let (r, ord) = add_signed(&big, &three, true, 10, RoundingMode::Zero);
    assert_eq!(ord, Ordering::Less);
    assert_eq!(r.exp(), 100);
    assert_eq!(r.min_prec(), 10);
    let (r, ord) = add_signed(&big, &three, true, 10, RoundingMode::NearEven);
    assert_eq!(ord, Ordering::Greater);
    assert_eq!(r.compare(&big), Some(Ordering::Equal));
  }

  #[test]
  fn zero_operands() {
    let zero = float(20, 0.0);
    let x = float(53, 0.1);
    let (r, ord) = add_impl(&zero, &x, 20, RoundingMode::Zero);
    assert_eq!(ord, Ordering::Less);
    assert_eq!(r.prec(), 20);
    let (r, _) = add_signed(&x, &zero, false, 20, RoundingMode::Zero);
    assert!(r.to_f64(RoundingMode::NearEven) < 0.1);
    assert!(zero_sum_sign(true, false, RoundingMode::Min));
    assert!(!zero_sum_sign(true, false, RoundingMode::Max));
    assert!(zero_sum_sign(true, true, RoundingMode::Max));
  }
}
