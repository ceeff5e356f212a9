use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use either::Either;

use crate::limb::Limbs;
use crate::util::*;
use crate::{context, Category, Error, Float, RoundingMode, EXP_MAX, EXP_MIN};

const LOWER_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MIXED_DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Binary orders of magnitude past the exponent range at which a parsed
/// value is settled without expanding its power.
const PARSE_EXP_MARGIN: f64 = 64.0;

fn digit_value(c: u8, base: u32) -> Option<u32> {
  let v = match c {
    b'0'..=b'9' => c - b'0',
    b'a'..=b'z' if base <= 36 => c - b'a' + 10,
    b'a'..=b'z' => c - b'a' + 36,
    b'A'..=b'Z' => c - b'A' + 10,
    _ => return None,
  } as u32;
  if v < base {
    Some(v)
  } else {
    None
  }
}

fn digit_char(d: u8, base: u32) -> char {
  let table: &[u8] = if base <= 36 { LOWER_DIGITS } else { MIXED_DIGITS };
  table[d as usize] as char
}

/// `ceil(prec / log2(base))`
fn digits_for(prec: usize, base: u32) -> usize {
  if base.is_power_of_two() {
    let k = base.trailing_zeros() as usize;
    (prec + k - 1) / k
  } else {
    (prec as f64 * std::f64::consts::LN_2 / (base as f64).ln()).ceil() as usize
  }
}

/// Room needed to print a `prec`-bit value with `n` digits in `base`, the
/// point included.
pub fn output_len(prec: usize, base: u32, n: usize) -> usize {
  let n = if n == 0 { digits_for(prec, base) + 1 } else { n };
  let len = if n < 5 { 7 } else { n.saturating_add(2) };
  len.saturating_add(1)
}

/// A decimal exponent with an optional sign. Magnitudes beyond any useful
/// range saturate.
fn parse_exponent(s: &str) -> Option<i64> {
  let (neg, digits) = match s.as_bytes().first() {
    Some(b'-') => (true, &s[1..]),
    Some(b'+') => (false, &s[1..]),
    _ => (false, s),
  };
  if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
    return None;
  }
  let v = digits
    .bytes()
    .fold(0i64, |acc, c| acc.saturating_mul(10).saturating_add((c - b'0') as i64))
    .min(1 << 62);
  Some(if neg { -v } else { v })
}

fn special_token(s: &str, base: u32) -> Option<Category> {
  let is = |t: &str| s.eq_ignore_ascii_case(t);
  if is("@nan@") || (base <= 16 && is("nan")) {
    Some(Category::NaN)
  } else if is("@inf@") || (base <= 16 && (is("inf") || is("infinity"))) {
    Some(Category::Infinity)
  } else {
    None
  }
}

fn parse_impl(s: &str, base: u32, prec: usize, rm: RoundingMode) -> Option<(Float, Ordering)> {
  let s = s.trim_start();
  let (neg, body) = match s.as_bytes().first() {
    Some(b'-') => (true, &s[1..]),
    Some(b'+') => (false, &s[1..]),
    _ => (false, s),
  };
  match special_token(body, base) {
    Some(Category::NaN) => return Some((Float::nan_with_prec(prec), Ordering::Equal)),
    Some(_) => return Some((Float::inf_with_prec(prec, neg), Ordering::Equal)),
    None => {}
  }

  let bytes = body.as_bytes();
  let mut digits = Vec::new();
  let mut frac_digits = 0i64;
  let mut seen_point = false;
  let mut i = 0;
  while i < bytes.len() {
    let c = bytes[i];
    if c == b'.' && !seen_point {
      seen_point = true;
    } else if let Some(d) = digit_value(c, base) {
      digits.push(d as u8);
      if seen_point {
        frac_digits += 1;
      }
    } else {
      break;
    }
    i += 1;
  }
  if digits.is_empty() {
    return None;
  }

  let (mut exp_base, mut exp_two) = (0i64, 0i64);
  if i < bytes.len() {
    let c = bytes[i];
    let exponent = parse_exponent(&body[i + 1..])?;
    match c {
      b'p' | b'P' if base == 2 || base == 16 => exp_two = exponent,
      b'e' | b'E' if base <= 10 => exp_base = exponent,
      b'@' => exp_base = exponent,
      _ => return None,
    }
  }

  let n = Limbs::from_radix_digits(&digits, base);
  if n.is_zero() {
    return Some((Float::zero_with_prec(prec, neg), Ordering::Equal));
  }
  let k = exp_base.saturating_sub(frac_digits);

  let log2 = n.bit_len() as f64 + k as f64 * (base as f64).log2() + exp_two as f64;
  if log2 > EXP_MAX as f64 + PARSE_EXP_MARGIN {
    let (f, ord, e) = overflow(neg, prec, rm);
    context::raise(e);
    return Some((f, ord));
  }
  if log2 < EXP_MIN as f64 - PARSE_EXP_MARGIN {
    let to_zero = rm == RoundingMode::NearEven || rounds_toward_zero(rm, neg);
    let (f, ord, e) = underflow(neg, prec, to_zero);
    context::raise(e);
    return Some((f, ord));
  }

  let b = Limbs::from_u64(base as u64);
  let w = prec + 64;
  Some(round_bounds(neg, prec, rm, w, |w| {
    Bounds::scaled(&n, exp_two as i128, &b, k.unsigned_abs(), k < 0, w)
  }))
}

/// Integer part of `n·2^e` and what its fraction is worth.
fn split_integer(n: &Limbs, e: i64) -> (Limbs, Loss) {
  if e >= 0 {
    (n.shl(e as usize), Loss::ExactlyZero)
  } else {
    shift_right_with_loss(n, e.unsigned_abs() as usize)
  }
}

impl Float {
  /// Parse `s` in `base` (2 to 62), rounding to `prec` bits.
  ///
  /// Accepts leading whitespace, an optional sign, digits with an optional
  /// point and an optional exponent: `e` for bases up to 10, `@` for any
  /// base (both powers of the base), `p` for bases 2 and 16 (a power of
  /// two). The whole rest of the string must be consumed.
  pub fn parse(s: &str, base: u32, prec: usize, rm: RoundingMode) -> Result<(Float, Ordering), Error> {
    let base = context::check_base(base)?;
    let prec = context::check_prec(prec)?;
    parse_impl(s, base, prec, rm).ok_or_else(|| {
      log::debug!("cannot parse {:?} in base {}", s, base);
      Error::Parse { input: s.to_owned(), base }
    })
  }

  /// Render with `n` significant digits in `base`, `n = 0` meaning enough
  /// to read the value back. The form is `[-]d.ddd` followed by the
  /// exponent of the base when it is not zero.
  pub fn to_string_radix(&self, base: u32, n: usize, rm: RoundingMode) -> Result<String, Error> {
    let base = context::check_base(base)?;
    let (sign, m, e) = match make_exp_sig(self) {
      Either::Right(parts) => parts,
      Either::Left(Category::NaN) => return Ok("nan".to_owned()),
      Either::Left(Category::Infinity) => return Ok(if self.sign { "-inf" } else { "inf" }.to_owned()),
      Either::Left(_) => return Ok(if self.sign { "-0" } else { "0" }.to_owned()),
    };
    let n = if n == 0 { digits_for(self.prec, base) + 1 } else { n };

    // b^(big_e - 1) <= |x| < b^big_e
    let mut big_e = ((self.exp - 1) as f64 / (base as f64).log2()).floor() as i64 + 1;
    let lower = Limbs::pow_small(base as u64, n as u64 - 1);
    let upper = lower.mul_small(base as u64);
    let b = Limbs::from_u64(base as u64);
    let mut w = upper.bit_len() + 64;
    let (t, loss) = loop {
      // |x|·b^(n - big_e), enclosed
      let s = big_e - n as i64;
      let bounds = Bounds::scaled(m, e as i128, &b, s.unsigned_abs(), s > 0, w);
      let (t_lo, loss_lo) = split_integer(&bounds.lo, bounds.e);
      let (t_hi, loss_hi) = split_integer(&bounds.hi, bounds.e);
      if t_hi.cmp(&lower) == Ordering::Less {
        big_e -= 1;
        continue;
      }
      if t_lo.cmp(&upper) != Ordering::Less {
        big_e += 1;
        continue;
      }
      if bounds.is_exact() {
        break (t_lo, loss_lo);
      }
      let inside = matches!(loss_lo, Loss::LessThanHalf | Loss::MoreThanHalf);
      if t_lo == t_hi && loss_lo == loss_hi && inside {
        break (t_lo, loss_lo);
      }
      log::trace!("{} working bits do not decide {} digits, retrying", w, n);
      w += w / 2;
    };

    let odd_digit = t.divrem_small(base as u64).1 % 2 == 1;
    let mut q = if need_round_away(rm, sign, loss, odd_digit) { t.add_small(1) } else { t };
    if q == upper {
      q = lower;
      big_e += 1;
    }

    let digits = q.to_radix_digits(base);
    let mut out = String::with_capacity(output_len(self.prec, base, n).saturating_add(24));
    if sign {
      out.push('-');
    }
    out.push(digit_char(digits[0], base));
    out.push('.');
    out.extend(digits[1..].iter().map(|&d| digit_char(d, base)));
    if big_e != 1 {
      out.push(if base > 10 { '@' } else { 'e' });
      out.push_str(&(big_e - 1).to_string());
    }
    Ok(out)
  }
}

impl fmt::Display for Float {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let s = self.to_string_radix(10, 0, context::default_rounding_mode()).map_err(|_| fmt::Error)?;
    f.write_str(&s)
  }
}

impl FromStr for Float {
  type Err = Error;

  fn from_str(s: &str) -> Result<Float, Error> {
    Float::parse(s, 10, context::default_prec(), context::default_rounding_mode()).map(|(f, _)| f)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::context::TEST_DEFAULTS_LOCK;
  use crate::Exception;
  use regex::Regex;

  fn parse(s: &str, base: u32, prec: usize) -> Float {
    Float::parse(s, base, prec, RoundingMode::NearEven).unwrap().0
  }

  fn show(v: f64, prec: usize, base: u32, n: usize, rm: RoundingMode) -> String {
    let mut x = Float::new(prec).unwrap();
    x.set_f64(v, RoundingMode::NearEven);
    x.to_string_radix(base, n, rm).unwrap()
  }

  #[test]
  fn grammar() {
    assert_eq!(parse("  -12.5", 10, 53).to_f64(RoundingMode::NearEven), -12.5);
    assert_eq!(parse("+.5e1", 10, 53).to_f64(RoundingMode::NearEven), 5.0);
    assert_eq!(parse("3.", 10, 53).to_f64(RoundingMode::NearEven), 3.0);
    assert_eq!(parse("1p-2", 2, 53).to_f64(RoundingMode::NearEven), 0.25);
    assert_eq!(parse("1.8p3", 16, 53).to_f64(RoundingMode::NearEven), 12.0);
    assert_eq!(parse("ff.8", 16, 53).to_f64(RoundingMode::NearEven), 255.5);
    assert_eq!(parse("1e1", 16, 53).to_f64(RoundingMode::NearEven), 481.0);
    assert_eq!(parse("1@2", 16, 53).to_f64(RoundingMode::NearEven), 256.0);
    assert_eq!(parse("Zz", 62, 53).to_f64(RoundingMode::NearEven), (35 * 62 + 61) as f64);
    assert_eq!(parse("zZ", 36, 53).to_f64(RoundingMode::NearEven), (35 * 36 + 35) as f64);

    for bad in &["", "-", ".", "1.2.3", "--1", "1e", "1e+", "12 ", "0x10", "1p3", "2", "@nan"] {
      let base = if *bad == "2" { 2 } else { 10 };
      assert!(Float::parse(bad, base, 53, RoundingMode::NearEven).is_err(), "{:?}", bad);
    }
    assert_eq!(
      Float::parse("1", 63, 53, RoundingMode::NearEven).unwrap_err(),
      Error::InvalidBase(63)
    );
  }

  #[test]
  fn special_tokens() {
    assert!(parse("@NaN@", 62, 10).is_nan());
    assert!(parse("nan", 16, 10).is_nan());
    let inf = parse("-Infinity", 10, 10);
    assert!(inf.is_inf() && inf.is_sign_negative());
    assert!(parse("@inf@", 50, 10).is_inf());
    assert!(Float::parse("inf", 20, 10, RoundingMode::NearEven).is_err());
    let z = parse("-0.000", 10, 10);
    assert!(z.is_zero() && z.is_sign_negative());
  }

  #[test]
  fn parse_rounds_correctly() {
    let (x, ord) = Float::parse("0.1", 10, 53, RoundingMode::NearEven).unwrap();
    assert_eq!(x.to_f64(RoundingMode::NearEven), 0.1);
    assert_eq!(ord, Ordering::Greater);
    let (_, ord) = Float::parse("0.1", 10, 53, RoundingMode::Zero).unwrap();
    assert_eq!(ord, Ordering::Less);
    let (x, ord) = Float::parse("123456789", 10, 64, RoundingMode::NearEven).unwrap();
    assert_eq!(ord, Ordering::Equal);
    assert_eq!(x.to_i64(RoundingMode::NearEven), Ok(123_456_789));
    let x = parse("2.2250738585072014e-308", 10, 53);
    assert_eq!(x.to_f64(RoundingMode::NearEven), f64::MIN_POSITIVE);
  }

  #[test]
  fn huge_exponents_skip_expansion() {
    context::clear_flags();
    let (x, ord) = Float::parse("1e999999999999999", 10, 53, RoundingMode::NearEven).unwrap();
    assert!(x.is_inf());
    assert_eq!(ord, Ordering::Greater);
    assert!(context::flags().contains(Exception::overflow()));
    let (x, _) = Float::parse("-1e-999999999999999", 10, 53, RoundingMode::NearEven).unwrap();
    assert!(x.is_zero() && x.is_sign_negative());
    let (x, _) = Float::parse("1e-999999999999999", 10, 53, RoundingMode::Max).unwrap();
    assert_eq!(x, Float::min_positive(53).unwrap());
    assert!(context::flags().contains(Exception::underflow()));
  }

  #[test]
  fn extreme_values_print() {
    let max = Float::max_value(53).unwrap();
    assert_eq!(max.to_string_radix(10, 0, RoundingMode::NearEven).unwrap(), "2.0985787164673875e323228496");
    assert_eq!(max.to_string_radix(10, 5, RoundingMode::Zero).unwrap(), "2.0985e323228496");
    let tiny = Float::min_positive(53).unwrap();
    assert_eq!(tiny.to_string_radix(10, 0, RoundingMode::NearEven).unwrap(), "2.3825649048879511e-323228497");
    assert_eq!(tiny.to_string_radix(10, 3, RoundingMode::Max).unwrap(), "2.39e-323228497");
    // powers of two stay exact in base 16
    assert_eq!(tiny.to_string_radix(16, 1, RoundingMode::NearEven).unwrap(), "1.@-268435456");
  }

  #[test]
  fn extreme_exponents_parse() {
    let (big, ord) = Float::parse("1e300000000", 10, 53, RoundingMode::NearEven).unwrap();
    assert!(big.is_number());
    assert_ne!(ord, Ordering::Equal);
    assert_eq!(big.exp(), 996578429);
    assert_eq!(big.to_string_radix(10, 15, RoundingMode::NearEven).unwrap(), "1.00000000000000e300000000");

    let (small, _) = Float::parse("1e-300000000", 10, 53, RoundingMode::NearEven).unwrap();
    assert!(small.is_number() && !small.is_zero());
    assert_eq!(small.exp(), -996578428);
    assert_eq!(small.to_string_radix(10, 15, RoundingMode::NearEven).unwrap(), "1.00000000000000e-300000000");

    let (lo, ord_lo) = Float::parse("-7.25e123456789", 10, 64, RoundingMode::Min).unwrap();
    let (hi, ord_hi) = Float::parse("-7.25e123456789", 10, 64, RoundingMode::Max).unwrap();
    assert_eq!((ord_lo, ord_hi), (Ordering::Less, Ordering::Greater));
    assert!(lo < hi);
    assert_eq!(hi.to_string_radix(10, 3, RoundingMode::NearEven).unwrap(), "-7.25e123456789");
  }

  #[test]
  fn format_layout() {
    let shape = Regex::new(r"^-?[0-9]\.[0-9]*(e-?[0-9]+)?$").unwrap();
    assert_eq!(show(0.1, 53, 10, 0, RoundingMode::NearEven), "1.0000000000000001e-1");
    assert_eq!(show(-1234.5, 53, 10, 6, RoundingMode::NearEven), "-1.23450e3");
    assert_eq!(show(2.5, 53, 10, 1, RoundingMode::NearEven), "2.");
    assert_eq!(show(2.5, 53, 10, 1, RoundingMode::Away), "3.");
    assert_eq!(show(9.99, 53, 10, 2, RoundingMode::NearEven), "1.0e1");
    assert_eq!(show(0.75, 2, 2, 0, RoundingMode::NearEven), "1.10e-1");
    assert_eq!(show(255.0, 53, 16, 2, RoundingMode::NearEven), "f.f@1");
    assert_eq!(show(61.0, 53, 62, 1, RoundingMode::NearEven), "z.");
    assert_eq!(show(10.0, 53, 62, 1, RoundingMode::NearEven), "A.");
    assert_eq!(show(36.0, 53, 62, 1, RoundingMode::NearEven), "a.");
    assert_eq!(show(1.0 / 3.0, 53, 10, 5, RoundingMode::Max), "3.3334e-1");
    assert_eq!(show(-1.0 / 3.0, 53, 10, 5, RoundingMode::Max), "-3.3333e-1");
    for &v in &[1e-300, -7.0, 123456.789, 1e300] {
      assert!(shape.is_match(&show(v, 80, 10, 0, RoundingMode::NearEven)));
    }
  }

  #[test]
  fn special_values_print_plainly() {
    let mut x = Float::new(10).unwrap();
    assert_eq!(x.to_string_radix(10, 0, RoundingMode::NearEven).unwrap(), "nan");
    x.set_inf(true);
    assert_eq!(x.to_string_radix(16, 0, RoundingMode::NearEven).unwrap(), "-inf");
    x.set_zero(true);
    assert_eq!(x.to_string_radix(10, 0, RoundingMode::NearEven).unwrap(), "-0");
    x.set_zero(false);
    assert_eq!(x.to_string_radix(10, 0, RoundingMode::NearEven).unwrap(), "0");
    assert!(x.to_string_radix(1, 0, RoundingMode::NearEven).is_err());
  }

  #[test]
  fn buffer_length() {
    assert_eq!(output_len(53, 10, 0), 20);
    assert_eq!(output_len(53, 10, 3), 8);
    assert_eq!(output_len(64, 2, 0), 68);
    assert_eq!(output_len(53, 10, usize::MAX), usize::MAX);
    assert_eq!(output_len(53, 10, usize::MAX - 2), usize::MAX);
    for &(prec, base) in &[(53usize, 10u32), (200, 16), (7, 3), (1000, 62)] {
      let mut x = Float::new(prec).unwrap();
      x.set_f64(-0.123, RoundingMode::NearEven);
      let s = x.to_string_radix(base, 0, RoundingMode::NearEven).unwrap();
      let marker = if base > 10 { '@' } else { 'e' };
      let mantissa = s.split(marker).next().unwrap();
      assert!(mantissa.len() <= output_len(prec, base, 0));
    }
  }

  #[test]
  fn display_and_from_str_use_defaults() {
    let _guard = TEST_DEFAULTS_LOCK.lock();
    let x: Float = "1.5".parse().unwrap();
    assert_eq!(x.prec(), context::default_prec());
    assert_eq!(x.to_string(), "1.5000000000000000");
    assert!("1.5x".parse::<Float>().is_err());
    assert_eq!(format!("{}", parse("-0.03125", 10, 5)), "-3.12e-2");
  }
}
