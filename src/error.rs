// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for vip8

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for vip8.
#[derive(Debug, Error)]
pub enum Error {
    /// A `call` was issued with all sixteen stack frames in use
    #[error("stack overflow: call at {addr:03x} exceeds depth 16")]
    StackOverflow {
        /// Address of the offending `call`
        addr: u16,
    },
    /// A `ret` was issued with nothing on the stack
    #[error("stack underflow: ret at {addr:03x} with an empty stack")]
    StackUnderflow {
        /// Address of the offending `ret`
        addr: u16,
    },
    /// The program does not fit between its load address and the end of memory
    #[error("program of {len} bytes does not fit at {addr:03x} ({capacity} bytes available)")]
    ProgramTooLarge {
        /// Length of the rejected program
        len: usize,
        /// Requested load address
        addr: u16,
        /// Bytes available from `addr` to the end of memory
        capacity: usize,
    },
    /// The CPU hit a fatal error earlier, and must be reset before it runs again
    #[error("cpu halted after a fatal error; reset or load a new program")]
    Halted,
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Tried to convert string into mode, but it did not match.
    #[error("no suitable conversion of \"{mode}\" into Mode")]
    InvalidMode {
        /// The string which failed to become a mode
        mode: String,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error ends execution of the loaded program
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::StackOverflow { .. } | Error::StackUnderflow { .. } | Error::Halted
        )
    }
}
