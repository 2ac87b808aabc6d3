//! Crate error type.
//!
//! Only construction and configuration paths return [`Error`]. Per-frame reads
//! never do: [`Device::poll`](crate::device::Device::poll) reports `false` and
//! [`Device::state`](crate::device::Device::state) returns an empty buffer.

use thiserror::Error;

/// Errors raised while building devices or loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// An OS transport primitive failed.
    ///
    /// `code` is the raw platform status (HRESULT / Win32 error code).
    #[error("{op} failed (code 0x{code:08x})")]
    Transport { op: &'static str, code: i32 },

    /// Exclusive access to a DirectInput device could not be acquired.
    #[error("could not acquire device (code 0x{0:08x})")]
    Acquire(i32),

    /// No controller is connected in the given XInput slot.
    #[error("no controller connected in slot {slot}")]
    NotConnected { slot: u32 },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    /// Config parsed but holds a value the tester cannot run with.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Shorthand for [`Error::Transport`].
    pub fn transport(op: &'static str, code: i32) -> Self {
        Error::Transport { op, code }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
