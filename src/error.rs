use thiserror::Error;

/// Argument errors. They are detected before the destination is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("precision must be between {min} and {max}, got {prec}")]
    InvalidPrecision { prec: usize, min: usize, max: usize },
    #[error("base must be between 2 and 62, got {0}")]
    InvalidBase(u32),
    #[error("not a valid number in base {base}: {input:?}")]
    Parse { input: String, base: u32 },
    #[error("out of range of {0}")]
    IntegerOutOfRange(&'static str),
}
