use std::cmp::Ordering;

use either::Either;

use crate::limb::{Limbs, LIMB_BITS};
use crate::{context, Category, Exception, Float, RoundingMode, EXP_MAX, EXP_MIN};

/// What the bits discarded by a right shift were worth, relative to half a
/// unit in the last kept place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Loss {
  ExactlyZero,
  LessThanHalf,
  ExactlyHalf,
  MoreThanHalf,
}

/// Classify the low `bits` bits of `n`.
pub(crate) fn loss_of_low_bits(n: &Limbs, bits: usize) -> Loss {
  if bits == 0 {
    return Loss::ExactlyZero;
  }
  let half = n.bit(bits - 1);
  let rest_zero = n.low_bits_zero(bits - 1);
  match (half, rest_zero) {
    (false, true) => Loss::ExactlyZero,
    (false, false) => Loss::LessThanHalf,
    (true, true) => Loss::ExactlyHalf,
    (true, false) => Loss::MoreThanHalf,
  }
}

pub(crate) fn shift_right_with_loss(n: &Limbs, bits: usize) -> (Limbs, Loss) {
  (n.shr(bits), loss_of_low_bits(n, bits))
}

/// Merge the loss of the upper discarded part with a loss from below it.
pub(crate) fn combine_loss(msb: Loss, lsb: Loss) -> Loss {
  if lsb == Loss::ExactlyZero {
    return msb;
  }
  match msb {
    Loss::ExactlyZero => Loss::LessThanHalf,
    Loss::ExactlyHalf => Loss::MoreThanHalf,
    other => other,
  }
}

pub(crate) fn need_round_away(mode: RoundingMode, sign: bool, loss: Loss, odd: bool) -> bool {
  if loss == Loss::ExactlyZero {
    return false;
  }
  match mode {
    RoundingMode::NearEven => loss == Loss::MoreThanHalf || (loss == Loss::ExactlyHalf && odd),
    RoundingMode::Zero => false,
    RoundingMode::Away => true,
    RoundingMode::Max => !sign,
    RoundingMode::Min => sign,
  }
}

/// True when `mode` moves a value of this sign toward zero.
pub(crate) fn rounds_toward_zero(mode: RoundingMode, sign: bool) -> bool {
  match mode {
    RoundingMode::Zero => true,
    RoundingMode::Max => sign,
    RoundingMode::Min => !sign,
    RoundingMode::NearEven | RoundingMode::Away => false,
  }
}

/// Ternary of a result whose magnitude was moved up (`away`) or down.
fn ternary(sign: bool, away: bool) -> Ordering {
  if away ^ sign {
    Ordering::Greater
  } else {
    Ordering::Less
  }
}

/// Round `±(n + sticky·ε)·2^e` to `prec` bits without touching the flags.
///
/// When `sticky` is set the caller must hand in more than `prec` bits, so
/// that the extra fraction lies entirely below the rounding position.
pub(crate) fn round_raw(
  sign: bool,
  n: &Limbs,
  e: i64,
  sticky: bool,
  prec: usize,
  mode: RoundingMode,
) -> (Float, Ordering, Exception) {
  if n.is_zero() {
    debug_assert!(!sticky);
    return (Float::zero_with_prec(prec, sign), Ordering::Equal, Exception::none());
  }

  let bits = n.bit_len();
  let (mut m, loss) = if bits > prec {
    let (m, loss) = shift_right_with_loss(n, bits - prec);
    let loss = if sticky { combine_loss(loss, Loss::LessThanHalf) } else { loss };
    (m, loss)
  } else {
    debug_assert!(!sticky, "sticky bit needs more than prec bits");
    (n.shl(prec - bits), Loss::ExactlyZero)
  };

  let mut exp = e.saturating_add(bits as i64);
  let away = need_round_away(mode, sign, loss, m.is_odd());
  if away {
    m = m.add_small(1);
    if m.bit_len() > prec {
      m = m.shr(1);
      exp = exp.saturating_add(1);
    }
  }
  let inexact = loss != Loss::ExactlyZero;

  if exp > EXP_MAX {
    return overflow(sign, prec, mode);
  }
  if exp < EXP_MIN {
    // the tie to zero only exists one binade below the least positive value
    let to_zero = match mode {
      RoundingMode::NearEven => exp < EXP_MIN - 1 || (m.is_power_of_two() && (away || !inexact)),
      _ => rounds_toward_zero(mode, sign),
    };
    return underflow(sign, prec, to_zero);
  }

  let ord = if inexact { ternary(sign, away) } else { Ordering::Equal };
  let exception = if inexact { Exception::inexact() } else { Exception::none() };
  (Float::from_raw(sign, exp, prec, m), ord, exception)
}

/// Round `±(n + sticky·ε)·2^e` to `prec` bits and raise the resulting flags.
pub(crate) fn pack(
  sign: bool,
  n: &Limbs,
  e: i64,
  sticky: bool,
  prec: usize,
  mode: RoundingMode,
) -> (Float, Ordering) {
  let (f, ord, exception) = round_raw(sign, n, e, sticky, prec, mode);
  context::raise(exception);
  (f, ord)
}

pub(crate) fn overflow(sign: bool, prec: usize, mode: RoundingMode) -> (Float, Ordering, Exception) {
  log::trace!("overflow at {} bits, {:?}", prec, mode);
  let exception = Exception::overflow() | Exception::inexact();
  if rounds_toward_zero(mode, sign) {
    (Float::max_with_prec(prec, sign), ternary(sign, false), exception)
  } else {
    (Float::inf_with_prec(prec, sign), ternary(sign, true), exception)
  }
}

pub(crate) fn underflow(sign: bool, prec: usize, to_zero: bool) -> (Float, Ordering, Exception) {
  log::trace!("underflow at {} bits", prec);
  let exception = Exception::underflow() | Exception::inexact();
  if to_zero {
    (Float::zero_with_prec(prec, sign), ternary(sign, false), exception)
  } else {
    (Float::min_pos_with_prec(prec, sign), ternary(sign, true), exception)
  }
}

/// Round `±v` for a `v` known to lie strictly inside `(lo·2^e, hi·2^e)`.
///
/// Returns `None` when the two ends round differently, or when the rounded
/// value falls inside the interval and its direction is unknown.
pub(crate) fn round_interval(
  sign: bool,
  lo: &Limbs,
  hi: &Limbs,
  e: i64,
  prec: usize,
  mode: RoundingMode,
) -> Option<(Float, Ordering)> {
  if lo.is_zero() {
    return None;
  }
  let (a, ord, ea) = round_raw(sign, lo, e, false, prec, mode);
  let (b, _, eb) = round_raw(sign, hi, e, false, prec, mode);
  if !same_value(&a, &b) {
    return None;
  }
  let range = Exception::overflow() | Exception::underflow();
  match (ea.0 & range.0, eb.0 & range.0) {
    (0, 0) => {}
    // both ends settle on the same bound, and so does everything between
    (ra, rb) if ra == rb => {
      context::raise(ea);
      return Some((a, ord));
    }
    _ => return None,
  }
  if a.category != Category::Normal {
    return None;
  }
  let (n, ne) = a.int_parts();
  let below = if cmp_scaled(n, ne, lo, e) != Ordering::Greater {
    Ordering::Less
  } else if cmp_scaled(n, ne, hi, e) != Ordering::Less {
    Ordering::Greater
  } else {
    return None;
  };
  context::raise(Exception::inexact());
  Some((a, if sign { below.reverse() } else { below }))
}

/// Keep the top `w` bits of `n·2^e`, cutting toward zero or, with `up`,
/// away from it.
fn truncate(n: Limbs, e: i128, w: usize, up: bool) -> (Limbs, i128) {
  let bits = n.bit_len();
  if bits <= w {
    return (n, e);
  }
  let cut = bits - w;
  let q = n.shr(cut);
  let q = if up && !n.low_bits_zero(cut) { q.add_small(1) } else { q };
  (q, e + cut as i128)
}

/// A lower (or, with `up`, upper) bound `r·2^e` on `b^k`, carried with `w`
/// bits through binary powering.
pub(crate) fn pow_bound(b: &Limbs, k: u64, w: usize, up: bool) -> (Limbs, i128) {
  let mut r = (Limbs::one(), 0i128);
  for i in (0..64 - k.leading_zeros()).rev() {
    r = truncate(r.0.mul(&r.0), 2 * r.1, w, up);
    if (k >> i) & 1 == 1 {
      r = truncate(r.0.mul(b), r.1, w, up);
    }
  }
  r
}

fn clamp_exp(e: i128) -> i64 {
  e.max(i64::MIN as i128 / 4).min(i64::MAX as i128 / 4) as i64
}

/// An enclosure `lo·2^e <= v <= hi·2^e` of a positive value. The ends
/// coincide only when `v` is known exactly; otherwise both are strict.
#[derive(Clone, Debug)]
pub(crate) struct Bounds {
  pub lo: Limbs,
  pub hi: Limbs,
  pub e: i64,
}

impl Bounds {
  fn aligned(lo: (Limbs, i128), hi: (Limbs, i128)) -> Bounds {
    let e = lo.1.min(hi.1);
    Bounds {
      lo: lo.0.shl((lo.1 - e) as usize),
      hi: hi.0.shl((hi.1 - e) as usize),
      e: clamp_exp(e),
    }
  }

  /// `m·2^e·b^k`, or `m·2^e / b^k` when `divide` is set, good to about `w`
  /// bits. The power is never expanded beyond `w` bits.
  pub fn scaled(m: &Limbs, e: i128, b: &Limbs, k: u64, divide: bool, w: usize) -> Bounds {
    let p_lo = pow_bound(b, k, w, false);
    let p_hi = pow_bound(b, k, w, true);
    if !divide {
      return Bounds::aligned((m.mul(&p_lo.0), e + p_lo.1), (m.mul(&p_hi.0), e + p_hi.1));
    }
    let shift = (w + p_hi.0.bit_len() + 1).saturating_sub(m.bit_len());
    let num = m.shl(shift);
    let lo = num.divrem(&p_hi.0).0;
    let (q, r) = num.divrem(&p_lo.0);
    let hi = if r.is_zero() { q } else { q.add_small(1) };
    let e = e - shift as i128;
    Bounds::aligned((lo, e - p_hi.1), (hi, e - p_lo.1))
  }

  pub fn is_exact(&self) -> bool {
    self.lo == self.hi
  }

  /// Round `±v`, raising flags, or `None` when the enclosure is too wide.
  pub fn round(&self, sign: bool, prec: usize, mode: RoundingMode) -> Option<(Float, Ordering)> {
    if self.is_exact() {
      Some(pack(sign, &self.lo, self.e, false, prec, mode))
    } else {
      round_interval(sign, &self.lo, &self.hi, self.e, prec, mode)
    }
  }
}

/// Evaluate enclosures of `±v` at growing working precision, starting from
/// `w` bits, until one decides the rounding.
pub(crate) fn round_bounds<F>(sign: bool, prec: usize, mode: RoundingMode, mut w: usize, mut eval: F) -> (Float, Ordering)
where
  F: FnMut(usize) -> Bounds,
{
  loop {
    if let Some(r) = eval(w).round(sign, prec, mode) {
      return r;
    }
    log::trace!("{} working bits do not decide {} bits, retrying", w, prec);
    w += w / 2;
  }
}

/// True when every value of `[lo, hi]·2^e` (signed by `sign`) rounds alike.
pub(crate) fn rounds_same(
  sign: bool,
  lo: &Limbs,
  hi: &Limbs,
  e: i64,
  prec: usize,
  mode: RoundingMode,
) -> bool {
  let (a, _, _) = round_raw(sign, lo, e, false, prec, mode);
  let (b, _, _) = round_raw(sign, hi, e, false, prec, mode);
  same_value(&a, &b)
}

/// Bit-for-bit equality of two rounded results.
pub(crate) fn same_value(a: &Float, b: &Float) -> bool {
  a.category == b.category
    && a.sign == b.sign
    && (a.category != Category::Normal || (a.exp == b.exp && a.sig == b.sig))
}

/// Compare `a·2^ea` with `b·2^eb` exactly.
pub(crate) fn cmp_scaled(a: &Limbs, ea: i64, b: &Limbs, eb: i64) -> Ordering {
  cmp_wide(a, ea as i128, b, eb as i128)
}

/// [`cmp_scaled`] for exponents past the `i64` range.
pub(crate) fn cmp_wide(a: &Limbs, ea: i128, b: &Limbs, eb: i128) -> Ordering {
  match (a.is_zero(), b.is_zero()) {
    (true, true) => return Ordering::Equal,
    (true, false) => return Ordering::Less,
    (false, true) => return Ordering::Greater,
    (false, false) => {}
  }
  let ta = ea + a.bit_len() as i128;
  let tb = eb + b.bit_len() as i128;
  if ta != tb {
    return ta.cmp(&tb);
  }
  // equal tops bound the shift by the operands' lengths
  if ea >= eb {
    a.shl((ea - eb) as usize).cmp(b)
  } else {
    a.cmp(&b.shl((eb - ea) as usize))
  }
}

/// Split off special values. Regular values give `(sign, n, e)` with
/// `|value| = n·2^e`.
pub(crate) fn make_exp_sig(f: &Float) -> Either<Category, (bool, &Limbs, i64)> {
  match f.category {
    Category::Normal => Either::Right((f.sign, &f.sig, f.exp - (f.sig.len() * LIMB_BITS) as i64)),
    category => Either::Left(category),
  }
}

/// Round `x` to `prec` bits; special values carry over unchanged.
pub(crate) fn round_to(x: &Float, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  match make_exp_sig(x) {
    Either::Right((sign, n, e)) => pack(sign, n, e, false, prec, mode),
    Either::Left(Category::NaN) => propagate_nan(prec),
    Either::Left(Category::Infinity) => (Float::inf_with_prec(prec, x.sign), Ordering::Equal),
    Either::Left(_) => (Float::zero_with_prec(prec, x.sign), Ordering::Equal),
  }
}

/// A quiet NaN result from a NaN operand.
pub(crate) fn propagate_nan(prec: usize) -> (Float, Ordering) {
  (Float::nan_with_prec(prec), Ordering::Equal)
}

/// A NaN produced from non-NaN operands.
pub(crate) fn default_nan(prec: usize) -> (Float, Ordering) {
  context::raise(Exception::invalid());
  (Float::nan_with_prec(prec), Ordering::Equal)
}
