//! Mathematical constants, evaluated to any precision and cached.
//!
//! Each constant is computed as a fixed-point integer `n` with
//! `|c·2^w - n| < ERR_UNITS`. When that interval does not decide the
//! rounding the working precision grows and the evaluation is repeated.
//! The best approximation seen so far is kept for the life of the process,
//! or until [`free_cache`].

use std::cmp::Ordering;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::limb::Limbs;
use crate::util::round_interval;
use crate::{Float, RoundingMode};

/// Bound on the error of every fixed-point evaluation, in units of the
/// last place.
const ERR_UNITS: u64 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Constant {
  Pi,
  Log2,
  Euler,
  Catalan,
  E,
}

#[derive(Clone, Debug)]
struct Approx {
  n: Limbs,
  w: usize,
}

static CACHE: Lazy<Mutex<HashMap<Constant, Approx>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Drop every cached constant.
pub fn free_cache() {
  let mut cache = CACHE.lock();
  log::debug!("freeing {} cached constants", cache.len());
  cache.clear();
}

/// Extra working bits for `w` result bits, covering the truncation error
/// of a series with O(w) terms.
fn guard_bits(w: usize) -> usize {
  2 * (usize::BITS - w.leading_zeros()) as usize + 32
}

/// `Σ x^(2j+1)/(2j+1)` for `x = 1/k`, as a fixed-point value at `wp` bits.
/// Alternating when `alternate` is set (arctangent), otherwise atanh.
fn arc_series(k: u64, wp: usize, alternate: bool) -> Limbs {
  let k2 = k * k;
  let mut power = Limbs::power_of_two(wp).divrem_small(k).0;
  let (mut plus, mut minus) = (Limbs::zero(), Limbs::zero());
  let mut j = 0u64;
  while !power.is_zero() {
    let term = power.divrem_small(2 * j + 1).0;
    if alternate && j % 2 == 1 {
      minus = minus.add(&term);
    } else {
      plus = plus.add(&term);
    }
    power = power.divrem_small(k2).0;
    j += 1;
  }
  plus.sub(&minus)
}

/// π = 16·atan(1/5) - 4·atan(1/239)
fn pi_fixed(wp: usize) -> Limbs {
  arc_series(5, wp, true).shl(4).sub(&arc_series(239, wp, true).shl(2))
}

/// ln 2 = 2·atanh(1/3)
fn log2_fixed(wp: usize) -> Limbs {
  arc_series(3, wp, false).shl(1)
}

/// e = Σ 1/k!
fn e_fixed(wp: usize) -> Limbs {
  let mut term = Limbs::power_of_two(wp);
  let mut sum = Limbs::zero();
  let mut k = 1u64;
  while !term.is_zero() {
    sum = sum.add(&term);
    term = term.divrem_small(k).0;
    k += 1;
  }
  sum
}

/// Brent–McMillan with `n = 2^m`: γ = A/B - m·ln 2, where
/// `B = Σ (n^k/k!)^2` and `A = Σ (n^k/k!)^2·H_k`. The truncation error is
/// below `π·e^(-4n)`.
fn euler_fixed(wp: usize) -> Limbs {
  let need = (wp as f64 * std::f64::consts::LN_2 / 4.0).ceil() as u64 + 2;
  let m = 64 - (need - 1).leading_zeros() as u64;
  let n2 = 1u64 << (2 * m);

  let mut b_k = Limbs::power_of_two(wp);
  let mut a_k = Limbs::zero();
  let (mut a, mut b) = (Limbs::zero(), b_k.clone());
  let mut k = 1u64;
  while !(a_k.is_zero() && b_k.is_zero()) || k <= need {
    b_k = b_k.mul_small(n2).divrem_small(k).0.divrem_small(k).0;
    a_k = a_k.mul_small(n2).divrem_small(k).0.add(&b_k).divrem_small(k).0;
    a = a.add(&a_k);
    b = b.add(&b_k);
    k += 1;
  }
  let ratio = a.shl(wp).divrem(&b).0;
  ratio.sub(&log2_fixed(wp).mul_small(m))
}

/// G = (π/8)·ln(2+√3) + (3/8)·Σ (k!)^2 / ((2k)!·(2k+1)^2)
///
/// `ln(2+√3) = 2·atanh(1/√3) = (2/√3)·Σ 3^-j/(2j+1)`.
fn catalan_fixed(wp: usize) -> Limbs {
  let mut a = Limbs::power_of_two(wp);
  let mut sum = Limbs::zero();
  let mut k = 0u64;
  while !a.is_zero() {
    sum = sum.add(&a.divrem_small((2 * k + 1) * (2 * k + 1)).0);
    k += 1;
    a = a.mul_small(k).divrem_small(2 * (2 * k - 1)).0;
  }

  let mut power = Limbs::power_of_two(wp);
  let mut s = Limbs::zero();
  let mut j = 0u64;
  while !power.is_zero() {
    s = s.add(&power.divrem_small(2 * j + 1).0);
    power = power.divrem_small(3).0;
    j += 1;
  }
  let sqrt3 = Limbs::from_u64(3).shl(2 * wp).isqrt();
  let ln = s.shl(wp + 1).divrem(&sqrt3).0;

  let pi_ln = pi_fixed(wp).mul(&ln).shr(wp);
  pi_ln.add(&sum.mul_small(3)).shr(3)
}

impl Constant {
  /// `n` with `|self·2^w - n| < ERR_UNITS`.
  fn compute(self, w: usize) -> Limbs {
    let g = guard_bits(w);
    let wp = w + g;
    let fixed = match self {
      Constant::Pi => pi_fixed(wp),
      Constant::Log2 => log2_fixed(wp),
      Constant::Euler => euler_fixed(wp),
      Constant::Catalan => catalan_fixed(wp),
      Constant::E => e_fixed(wp),
    };
    fixed.shr(g)
  }
}

impl Approx {
  fn round(&self, prec: usize, mode: RoundingMode) -> Option<(Float, Ordering)> {
    let err = Limbs::from_u64(ERR_UNITS);
    round_interval(false, &self.n.sub(&err), &self.n.add(&err), -(self.w as i64), prec, mode)
  }
}

fn evaluate(c: Constant, prec: usize, mode: RoundingMode) -> (Float, Ordering) {
  let mut cache = CACHE.lock();
  let mut w = prec + 32;
  if let Some(a) = cache.get(&c) {
    if let Some(r) = a.round(prec, mode) {
      return r;
    }
    w = w.max(a.w + a.w / 2);
  }
  loop {
    let a = Approx { n: c.compute(w), w };
    let r = a.round(prec, mode);
    log::debug!("{:?} evaluated to {} bits", c, w);
    cache.insert(c, a);
    if let Some(r) = r {
      return r;
    }
    log::debug!("{:?} at {} bits does not decide rounding to {} bits, retrying", c, w, prec);
    w += w / 2;
  }
}

impl Float {
  /// π
  pub fn const_pi(&mut self, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(evaluate(Constant::Pi, prec, rm))
  }

  /// ln 2
  pub fn const_log2(&mut self, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(evaluate(Constant::Log2, prec, rm))
  }

  /// Euler's constant γ.
  pub fn const_euler(&mut self, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(evaluate(Constant::Euler, prec, rm))
  }

  /// Catalan's constant.
  pub fn const_catalan(&mut self, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(evaluate(Constant::Catalan, prec, rm))
  }

  pub fn const_e(&mut self, rm: RoundingMode) -> Ordering {
    let prec = self.prec;
    self.store(evaluate(Constant::E, prec, rm))
  }
}
