//! Error taxonomy and C status codes
//!
//! Author: Moroya Sakamoto

use core::fmt;

/// Kernel operation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Generic failure, e.g. a missing callback
    Failed,
    /// Reserved; no current operation times out
    Timeout,
    /// Out-of-range id or zero duration
    InvalidParameter,
    /// Operation on a task slot that was never registered
    NotInitialized,
    /// Descriptor pool exhausted
    Busy,
    /// No active descriptor with that id
    NotFound,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Failed => write!(f, "operation failed"),
            Error::Timeout => write!(f, "timed out"),
            Error::InvalidParameter => write!(f, "invalid parameter"),
            Error::NotInitialized => write!(f, "slot not initialized"),
            Error::Busy => write!(f, "pool exhausted"),
            Error::NotFound => write!(f, "id not found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Status code returned across the C ABI
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    Error = 1,
    Timeout = 2,
    InvalidParameter = 3,
    NotInitialized = 4,
    Busy = 5,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Failed | Error::NotFound => Status::Error,
            Error::Timeout => Status::Timeout,
            Error::InvalidParameter => Status::InvalidParameter,
            Error::NotInitialized => Status::NotInitialized,
            Error::Busy => Status::Busy,
        }
    }
}

impl From<Result<()>> for Status {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Status::Ok,
            Err(err) => err.into(),
        }
    }
}
