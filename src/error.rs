//! The closed error taxonomy returned by every decoder in this crate.

use thiserror::Error;

/// Every way a byte stream can fail to decode as a WebAssembly module.
///
/// Variants are deliberately cheap to construct and to match on: none of them
/// wrap an opaque `Box<dyn Error>`, so callers (a validator, an interpreter)
/// can recover on specific kinds without downcasting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream ended in the middle of a datum.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A LEB128-encoded index was required but none could be decoded.
    #[error("expected an index")]
    ExpectedIndex,

    /// A discriminating tag byte was required but the stream ended first.
    #[error("expected a kind tag")]
    ExpectedKindTag,

    /// A section or code-entry size prefix was required.
    #[error("expected a size prefix")]
    ExpectedSize,

    /// Inside an expression, neither a legal instruction nor a terminator was seen.
    #[error("expected an instruction or a terminator")]
    ExpectedValueOrTerminator,

    /// An index decoded successfully but is out of representable range.
    #[error("index {0} is out of range")]
    InvalidIndex(u64),

    /// Catch-all for structural violations: overlong LEB128, bad section
    /// ordering, unknown opcode, malformed element tag, leftover bytes in a
    /// bounded view, malformed UTF-8.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// The module header's magic bytes didn't match `\0asm`.
    #[error("invalid module magic")]
    InvalidModuleMagic,

    /// The module header's version word wasn't the one this decoder understands.
    #[error("invalid module version")]
    InvalidModuleVersion,

    /// A declared size (section, code entry) disagreed with the bytes actually consumed.
    #[error("declared size {expected} does not match consumed size {actual}")]
    InvalidSize {
        /// The size declared by the size prefix.
        expected: u32,
        /// The number of bytes actually consumed while decoding the payload.
        actual: u32,
    },

    /// An unrecognized discriminating tag byte.
    #[error("invalid tag byte {0:#x}")]
    InvalidTag(u8),

    /// An unrecognized value type byte.
    #[error("invalid value type byte {0:#x}")]
    InvalidType(u8),

    /// A vector length prefix exceeded the allocation sanity bound.
    #[error("refusing to allocate {requested} elements (bound {bound})")]
    HugeAllocationRequested {
        /// The length the stream asked the decoder to allocate for.
        requested: u64,
        /// The sanity bound the request was checked against.
        bound: u64,
    },

    /// An encoding that the decoder recognizes but intentionally does not support.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, DecodeError>;
