//! Process-wide defaults and per-thread status flags.
//!
//! The default precision and rounding mode are read by every operation that
//! is not handed an explicit precision or mode. They live behind a single
//! lock; writes are expected to be rare. Status flags are sticky and
//! thread-local, so one thread's inexact results never show up in another's.

use std::cell::Cell;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::{Error, Exception, RoundingMode};

pub const PREC_MIN: usize = 1;
pub const PREC_MAX: usize = (i32::MAX as usize) - 256;
pub const DEFAULT_PREC: usize = 53;

/// Snapshot of the process defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    pub prec: usize,
    pub rounding_mode: RoundingMode,
}

impl Default for Context {
    fn default() -> Context {
        Context {
            prec: DEFAULT_PREC,
            rounding_mode: RoundingMode::NearEven,
        }
    }
}

static DEFAULTS: Lazy<RwLock<Context>> = Lazy::new(|| RwLock::new(Context::default()));

thread_local! {
    static FLAGS: Cell<Exception> = Cell::new(Exception::none());
}

pub fn current() -> Context {
    *DEFAULTS.read()
}

pub fn default_prec() -> usize {
    DEFAULTS.read().prec
}

pub fn set_default_prec(prec: usize) -> Result<(), Error> {
    let prec = check_prec(prec)?;
    DEFAULTS.write().prec = prec;
    log::debug!("default precision set to {} bits", prec);
    Ok(())
}

pub fn default_rounding_mode() -> RoundingMode {
    DEFAULTS.read().rounding_mode
}

pub fn set_default_rounding_mode(mode: RoundingMode) {
    DEFAULTS.write().rounding_mode = mode;
}

/// Flags raised on this thread since the last `clear_flags`.
pub fn flags() -> Exception {
    FLAGS.with(|f| f.get())
}

pub fn clear_flags() {
    FLAGS.with(|f| f.set(Exception::none()));
}

pub(crate) fn raise(e: Exception) {
    if !e.is_none() {
        FLAGS.with(|f| f.set(f.get() | e));
    }
}

pub(crate) fn check_prec(prec: usize) -> Result<usize, Error> {
    if (PREC_MIN..=PREC_MAX).contains(&prec) {
        Ok(prec)
    } else {
        Err(Error::InvalidPrecision { prec, min: PREC_MIN, max: PREC_MAX })
    }
}

pub(crate) fn check_base(base: u32) -> Result<u32, Error> {
    if (2..=62).contains(&base) {
        Ok(base)
    } else {
        Err(Error::InvalidBase(base))
    }
}

/// Serializes tests that touch the process defaults.
#[cfg(test)]
pub(crate) static TEST_DEFAULTS_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());
