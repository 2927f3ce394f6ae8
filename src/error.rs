//! Error types for the Cauchy Reed-Solomon engine.

use thiserror::Error;

/// Closed set of failure modes for field initialization, encoding, and decoding.
///
/// There is no panic path through the arithmetic kernels: every table index
/// is derived from a `u8`, which structurally cannot exceed a 256-entry
/// table, so the only failures are the ones enumerated here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CauchyError {
    /// `original_count < 1`, `original_count + recovery_count > 256`, or
    /// `block_bytes == 0`.
    #[error("invalid encoder parameters: {0}")]
    InvalidParams(&'static str),

    /// A block buffer's length does not match `block_bytes`. Rust slices
    /// cannot be null, so this stands in for the C API's "absent pointer".
    #[error("a required block buffer has the wrong length or is empty")]
    NullBuffer,

    /// A block's index is `>= original_count + recovery_count`.
    #[error("block index {0} is out of range for this codeword")]
    IndexOutOfRange(u8),

    /// Two blocks in the same call carry the same index.
    #[error("block index {0} appears more than once")]
    DuplicateIndex(u8),

    /// The decoder was not given exactly `original_count` blocks.
    #[error("decoder requires exactly {expected} blocks, received {got}")]
    InsufficientBlocks { expected: usize, got: usize },

    /// Gauss-Jordan elimination found no nonzero pivot at the given row of
    /// the generator submatrix. Unreachable for a well-formed Cauchy matrix;
    /// surfacing it instead of panicking catches malformed input early.
    #[error("generator submatrix has no pivot at row {0}; indicates malformed or duplicated indices")]
    SingularMatrix(usize),

    /// Table construction failed its own consistency check.
    #[error("field table construction failed its self-check")]
    InitFailed,
}
