//! NDR error types

use thiserror::Error;

/// NDR encoding/decoding errors
#[derive(Debug, Error)]
pub enum NdrError {
    /// Buffer underflow - not enough data
    #[error("buffer underflow: needed {needed} bytes, have {have}")]
    BufferUnderflow { needed: usize, have: usize },

    /// Invalid string - missing terminator, bad offset, or bad encoding
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// A `[ref]` pointer was null on the wire or in memory
    #[error("null reference pointer")]
    NullRefPointer,

    /// Invalid pointer - unexpected or unresolvable referent ID
    #[error("invalid pointer: referent ID 0x{0:08x}")]
    InvalidPointer(u32),

    /// Array size mismatch
    #[error("array size mismatch: expected {expected}, got {got}")]
    ArraySizeMismatch { expected: usize, got: usize },

    /// Invalid discriminant for union
    #[error("invalid union discriminant: {0}")]
    InvalidDiscriminant(u32),

    /// Invalid enum value
    #[error("invalid enum value: {0}")]
    InvalidEnumValue(i32),

    /// Conformance mismatch
    #[error("conformance mismatch: max_count={max_count}, offset={offset}, actual_count={actual_count}")]
    ConformanceMismatch {
        max_count: u32,
        offset: u32,
        actual_count: u32,
    },

    /// Element count or allocation above the configured limit
    #[error("allocation limit exceeded: requested {requested}, limit {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// Pointee nesting deeper than the configured limit
    #[error("pointer nesting too deep: limit {0}")]
    NestingTooDeep(usize),

    /// Deferred pointees were never flushed
    #[error("{0} deferred pointee(s) left unflushed")]
    PendingDeferred(usize),

    /// Length does not fit the 32-bit wire field
    #[error("length {0} does not fit in a 32-bit count")]
    LengthOverflow(usize),

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// UTF-16 decoding error
    #[error("UTF-16 error: {0}")]
    Utf16Error(#[from] std::char::DecodeUtf16Error),
}

/// Result type for NDR operations
pub type Result<T> = std::result::Result<T, NdrError>;

/// Convert a host length to a 32-bit wire count.
pub(crate) fn wire_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| NdrError::LengthOverflow(len))
}
