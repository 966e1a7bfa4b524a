use std::io;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Probability outside (0, 1) handed to `stretch`
    #[error("probability {0} is outside of (0, 1)")]
    Domain(f64),
    /// Scaled probability outside [0, max] handed to the coder
    #[error("coder probability {p} is outside of [0, {max}]")]
    Range { p: u32, max: u32 },
    /// The coder interval is corrupted, the stream can't continue
    #[error("coder invariant violated: {0}")]
    Invariant(&'static str),
    #[error("compressed stream is shorter than its length prefix")]
    Truncated,
    #[error("input of {0} bytes doesn't fit the 32-bit length prefix")]
    TooLarge(usize),
    #[error("model config is invalid: {0}")]
    BadConfig(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
