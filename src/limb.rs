use std::cmp::Ordering;

pub(crate) const LIMB_BITS: usize = 64;

/// Number of limbs needed to hold `prec` bits.
pub(crate) fn limbs_for(prec: usize) -> usize {
  (prec + LIMB_BITS - 1) / LIMB_BITS
}

/// A natural number stored as 64-bit limbs, least significant limb first.
/// Always trimmed: no zero limbs on top.
#[derive(Clone, Debug, Default)]
pub struct Limbs(Vec<u64>);

impl Limbs {
  pub fn zero() -> Limbs {
    Limbs(Vec::new())
  }

  pub fn one() -> Limbs {
    Limbs(vec![1])
  }

  pub fn from_u64(v: u64) -> Limbs {
    Limbs::from_vec(vec![v])
  }

  pub(crate) fn from_vec(v: Vec<u64>) -> Limbs {
    let mut l = Limbs(v);
    l.trim();
    l
  }

  /// 2^bits
  pub fn power_of_two(bits: usize) -> Limbs {
    Limbs::one().shl(bits)
  }

  pub fn as_slice(&self) -> &[u64] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  fn trim(&mut self) {
    while let Some(&0) = self.0.last() {
      self.0.pop();
    }
  }

  fn effective_len(&self) -> usize {
    self.0.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
  }

  pub fn is_zero(&self) -> bool {
    self.0.iter().all(|&l| l == 0)
  }

  pub fn bit_len(&self) -> usize {
    match self.0.iter().rposition(|&l| l != 0) {
      Some(i) => i * LIMB_BITS + (LIMB_BITS - self.0[i].leading_zeros() as usize),
      None => 0,
    }
  }

  pub fn bit(&self, i: usize) -> bool {
    let (word, bit) = (i / LIMB_BITS, i % LIMB_BITS);
    word < self.0.len() && (self.0[word] >> bit) & 1 == 1
  }

  pub fn is_odd(&self) -> bool {
    self.bit(0)
  }

  pub fn is_power_of_two(&self) -> bool {
    !self.is_zero() && self.trailing_zeros() + 1 == self.bit_len()
  }

  pub fn trailing_zeros(&self) -> usize {
    for (i, &l) in self.0.iter().enumerate() {
      if l != 0 {
        return i * LIMB_BITS + l.trailing_zeros() as usize;
      }
    }
    0
  }

  /// True when every bit below position `n` is zero.
  pub fn low_bits_zero(&self, n: usize) -> bool {
    let (word, bit) = (n / LIMB_BITS, n % LIMB_BITS);
    let full = word.min(self.0.len());
    if self.0[..full].iter().any(|&l| l != 0) {
      return false;
    }
    if bit > 0 && word < self.0.len() {
      self.0[word] & ((1u64 << bit) - 1) == 0
    } else {
      true
    }
  }

  /// The low `n` bits.
  pub fn low_bits(&self, n: usize) -> Limbs {
    let (word, bit) = (n / LIMB_BITS, n % LIMB_BITS);
    if word >= self.0.len() {
      return self.clone();
    }
    let mut v = self.0[..word].to_vec();
    if bit > 0 {
      v.push(self.0[word] & ((1u64 << bit) - 1));
    }
    Limbs::from_vec(v)
  }

  pub fn to_u64(&self) -> Option<u64> {
    match self.effective_len() {
      0 => Some(0),
      1 => Some(self.0[0]),
      _ => None,
    }
  }

  pub fn shl(&self, n: usize) -> Limbs {
    if self.is_zero() {
      return Limbs::zero();
    }
    let (word, bit) = (n / LIMB_BITS, n % LIMB_BITS);
    let mut out = Vec::with_capacity(word + self.0.len() + 1);
    out.resize(word, 0);
    if bit == 0 {
      out.extend_from_slice(&self.0);
    } else {
      let mut carry = 0u64;
      for &l in &self.0 {
        out.push((l << bit) | carry);
        carry = l >> (LIMB_BITS - bit);
      }
      out.push(carry);
    }
    Limbs::from_vec(out)
  }

  pub fn shr(&self, n: usize) -> Limbs {
    let (word, bit) = (n / LIMB_BITS, n % LIMB_BITS);
    if word >= self.0.len() {
      return Limbs::zero();
    }
    let src = &self.0[word..];
    if bit == 0 {
      return Limbs::from_vec(src.to_vec());
    }
    let out = (0..src.len())
      .map(|i| {
        let hi = src.get(i + 1).map_or(0, |&h| h << (LIMB_BITS - bit));
        (src[i] >> bit) | hi
      })
      .collect();
    Limbs::from_vec(out)
  }

  pub fn add(&self, other: &Limbs) -> Limbs {
    let (a, b) = if self.0.len() >= other.0.len() { (&self.0, &other.0) } else { (&other.0, &self.0) };
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry = false;
    for i in 0..a.len() {
      let (s1, c1) = a[i].overflowing_add(b.get(i).copied().unwrap_or(0));
      let (s2, c2) = s1.overflowing_add(carry as u64);
      out.push(s2);
      carry = c1 || c2;
    }
    if carry {
      out.push(1);
    }
    Limbs::from_vec(out)
  }

  /// `self - other`; the caller guarantees `self >= other`.
  pub fn sub(&self, other: &Limbs) -> Limbs {
    debug_assert!(self.cmp(other) != Ordering::Less, "subtraction underflow");
    let mut out = Vec::with_capacity(self.0.len());
    let mut borrow = false;
    for i in 0..self.0.len() {
      let (d1, b1) = self.0[i].overflowing_sub(other.0.get(i).copied().unwrap_or(0));
      let (d2, b2) = d1.overflowing_sub(borrow as u64);
      out.push(d2);
      borrow = b1 || b2;
    }
    Limbs::from_vec(out)
  }

  pub fn cmp(&self, other: &Limbs) -> Ordering {
    let (la, lb) = (self.effective_len(), other.effective_len());
    if la != lb {
      return la.cmp(&lb);
    }
    for i in (0..la).rev() {
      match self.0[i].cmp(&other.0[i]) {
        Ordering::Equal => {}
        ord => return ord,
      }
    }
    Ordering::Equal
  }

  /// Schoolbook product into a fresh `len(a) + len(b)` limb buffer.
  pub fn mul(&self, other: &Limbs) -> Limbs {
    if self.is_zero() || other.is_zero() {
      return Limbs::zero();
    }
    let (a, b) = (&self.0, &other.0);
    let mut out = vec![0u64; a.len() + b.len()];
    for i in 0..a.len() {
      let mut carry: u128 = 0;
      for j in 0..b.len() {
        let t = a[i] as u128 * b[j] as u128 + out[i + j] as u128 + carry;
        out[i + j] = t as u64;
        carry = t >> 64;
      }
      out[i + b.len()] = carry as u64;
    }
    Limbs::from_vec(out)
  }

  pub fn mul_small(&self, m: u64) -> Limbs {
    let mut out = Vec::with_capacity(self.0.len() + 1);
    let mut carry: u128 = 0;
    for &l in &self.0 {
      let t = l as u128 * m as u128 + carry;
      out.push(t as u64);
      carry = t >> 64;
    }
    out.push(carry as u64);
    Limbs::from_vec(out)
  }

  pub fn add_small(&self, v: u64) -> Limbs {
    self.add(&Limbs::from_u64(v))
  }

  pub fn divrem_small(&self, d: u64) -> (Limbs, u64) {
    assert!(d != 0, "division by zero");
    let mut q = vec![0u64; self.0.len()];
    let mut rem: u128 = 0;
    for i in (0..self.0.len()).rev() {
      let cur = (rem << 64) | self.0[i] as u128;
      q[i] = (cur / d as u128) as u64;
      rem = cur % d as u128;
    }
    (Limbs::from_vec(q), rem as u64)
  }

  /// Quotient and remainder. Knuth, TAOCP vol. 2, 4.3.1, algorithm D.
  pub fn divrem(&self, divisor: &Limbs) -> (Limbs, Limbs) {
    let n = divisor.effective_len();
    assert!(n != 0, "division by zero");
    if self.cmp(divisor) == Ordering::Less {
      return (Limbs::zero(), Limbs::from_vec(self.0.clone()));
    }
    if n == 1 {
      let (q, r) = self.divrem_small(divisor.0[0]);
      return (q, Limbs::from_u64(r));
    }

    let u = &self.0[..self.effective_len()];
    let v = &divisor.0[..n];
    let m = u.len() - n;
    let s = v[n - 1].leading_zeros() as usize;
    let vn = shift_into(v, s, n);
    let mut un = shift_into(u, s, u.len() + 1);
    let mut q = vec![0u64; m + 1];
    let b: u128 = 1 << 64;

    for j in (0..=m).rev() {
      let num = ((un[j + n] as u128) << 64) | un[j + n - 1] as u128;
      let mut qhat = num / vn[n - 1] as u128;
      let mut rhat = num % vn[n - 1] as u128;
      while qhat >= b || qhat * vn[n - 2] as u128 > ((rhat << 64) | un[j + n - 2] as u128) {
        qhat -= 1;
        rhat += vn[n - 1] as u128;
        if rhat >= b {
          break;
        }
      }

      // multiply and subtract
      let mut borrow: i128 = 0;
      for i in 0..n {
        let p = qhat * vn[i] as u128;
        let t = un[i + j] as i128 - borrow - (p as u64) as i128;
        un[i + j] = t as u64;
        borrow = (p >> 64) as i128 - (t >> 64);
      }
      let t = un[j + n] as i128 - borrow;
      un[j + n] = t as u64;

      if t < 0 {
        // qhat was one too large: add back
        q[j] = (qhat - 1) as u64;
        let mut carry: u128 = 0;
        for i in 0..n {
          let s = un[i + j] as u128 + vn[i] as u128 + carry;
          un[i + j] = s as u64;
          carry = s >> 64;
        }
        un[j + n] = un[j + n].wrapping_add(carry as u64);
      } else {
        q[j] = qhat as u64;
      }
    }

    un.truncate(n);
    let rem = Limbs::from_vec(un).shr(s);
    (Limbs::from_vec(q), rem)
  }

  /// floor(sqrt(self)) by Newton iteration.
  pub fn isqrt(&self) -> Limbs {
    if self.is_zero() {
      return Limbs::zero();
    }
    let mut x = Limbs::power_of_two((self.bit_len() + 1) / 2);
    loop {
      let y = x.add(&self.divrem(&x).0).shr(1);
      if y.cmp(&x) != Ordering::Less {
        return x;
      }
      x = y;
    }
  }

  /// base^exp
  pub fn pow_small(base: u64, exp: u64) -> Limbs {
    let mut result = Limbs::one();
    let mut square = Limbs::from_u64(base);
    let mut e = exp;
    while e > 0 {
      if e & 1 == 1 {
        result = result.mul(&square);
      }
      e >>= 1;
      if e > 0 {
        square = square.mul(&square);
      }
    }
    result
  }

  /// Digit values in `base`, most significant first. Zero gives `[0]`.
  pub fn to_radix_digits(&self, base: u32) -> Vec<u8> {
    if self.is_zero() {
      return vec![0];
    }
    let (chunk, width) = radix_chunk(base);
    let mut rev = Vec::new();
    let mut cur = Limbs::from_vec(self.0.clone());
    while !cur.is_zero() {
      let (q, mut r) = cur.divrem_small(chunk);
      for _ in 0..width {
        rev.push((r % base as u64) as u8);
        r /= base as u64;
      }
      cur = q;
    }
    while rev.len() > 1 && rev.last() == Some(&0) {
      rev.pop();
    }
    rev.reverse();
    rev
  }

  /// Inverse of `to_radix_digits`; every digit must be below `base`.
  pub fn from_radix_digits(digits: &[u8], base: u32) -> Limbs {
    let (chunk, width) = radix_chunk(base);
    let mut acc = Limbs::zero();
    for group in digits.chunks(width) {
      let mut word = 0u64;
      for &d in group {
        word = word * base as u64 + d as u64;
      }
      let scale = if group.len() == width { chunk } else { (base as u64).pow(group.len() as u32) };
      acc = acc.mul_small(scale).add_small(word);
    }
    acc
  }
}

impl PartialEq for Limbs {
  fn eq(&self, other: &Limbs) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Limbs {}

/// Compare two significands left-aligned on their top limb.
pub(crate) fn cmp_aligned_top(a: &[u64], b: &[u64]) -> Ordering {
  let n = a.len().max(b.len());
  for i in 0..n {
    let x = if i < a.len() { a[a.len() - 1 - i] } else { 0 };
    let y = if i < b.len() { b[b.len() - 1 - i] } else { 0 };
    match x.cmp(&y) {
      Ordering::Equal => {}
      ord => return ord,
    }
  }
  Ordering::Equal
}

/// Largest power of `base` that fits a limb, and its exponent.
fn radix_chunk(base: u32) -> (u64, usize) {
  let mut chunk = base as u64;
  let mut width = 1;
  while let Some(next) = chunk.checked_mul(base as u64) {
    chunk = next;
    width += 1;
  }
  (chunk, width)
}

/// `src << s` (s < 64) into a buffer of exactly `len` limbs.
fn shift_into(src: &[u64], s: usize, len: usize) -> Vec<u64> {
  let mut out = vec![0u64; len];
  if s == 0 {
    out[..src.len()].copy_from_slice(src);
    return out;
  }
  let mut carry = 0u64;
  for (i, &l) in src.iter().enumerate() {
    out[i] = (l << s) | carry;
    carry = l >> (LIMB_BITS - s);
  }
  if src.len() < len {
    out[src.len()] = carry;
  }
  out
}
