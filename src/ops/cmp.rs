use std::cmp::Ordering;

use crate::limb::cmp_aligned_top;
use crate::{Category, Float};

/// Compare magnitudes; `None` when either side is NaN.
pub(crate) fn cmp_abs(x: &Float, y: &Float) -> Option<Ordering> {
  match (x.category, y.category) {
    (Category::NaN, _) | (_, Category::NaN) => None,
    (Category::Infinity, Category::Infinity) | (Category::Zero, Category::Zero) => Some(Ordering::Equal),
    (Category::Infinity, _) | (_, Category::Zero) => Some(Ordering::Greater),
    (_, Category::Infinity) | (Category::Zero, _) => Some(Ordering::Less),
    (Category::Normal, Category::Normal) => Some(
      x.exp
        .cmp(&y.exp)
        .then_with(|| cmp_aligned_top(x.sig.as_slice(), y.sig.as_slice())),
    ),
  }
}

/// Numeric order; the zeros are equal and NaN is unordered.
pub(crate) fn cmp_floats(x: &Float, y: &Float) -> Option<Ordering> {
  let (sx, sy) = (x.sgn()?, y.sgn()?);
  if sx != sy {
    return Some(sx.cmp(&sy));
  }
  match sx {
    Ordering::Equal => Some(Ordering::Equal),
    Ordering::Greater => cmp_abs(x, y),
    Ordering::Less => cmp_abs(x, y).map(Ordering::reverse),
  }
}
