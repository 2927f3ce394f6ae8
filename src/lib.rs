//! cauchy_rs - a Cauchy Reed-Solomon erasure coding engine over GF(2^8)
//!
//! ## Performance
//!
//! SIMD-accelerated GF(256) multiply-by-constant (AVX2 / SSSE3 PSHUFB on
//! x86_64, NEON table lookup on aarch64, `portable_simd` elsewhere) backs the
//! bulk arithmetic kernels that dominate encode/decode runtime.
//!
//! ## Reed-Solomon implementation
//!
//! Uses a Cauchy generator matrix over GF(2^8) under the irreducible
//! polynomial 0x11D (`x^8 + x^4 + x^3 + x^2 + 1`), with row 0 forced to the
//! all-ones row so the first recovery block is a plain XOR parity. Any
//! `original_count` of the `original_count + recovery_count` codeword blocks
//! recover every original (MDS property), subject to the combined count not
//! exceeding 256.

#![feature(portable_simd)]

pub mod codec;
pub mod error;
pub mod galois;
pub mod kernels;
pub mod matrix;
pub mod simd;

pub use codec::{decode, encode, encode_one, encode_parallel, DecodeBlock, EncoderParams};
pub use error::CauchyError;
pub use galois::GfContext;

/// Builds the default field context, validating its tables against the
/// invariants in [`galois::GfContext::new`]. Idempotent and safe to call
/// from multiple threads; repeated calls rebuild independent contexts with
/// identical tables. Callers that only need the process-wide singleton
/// should use [`GfContext::global`] instead, which builds at most once.
pub fn init() -> Result<GfContext, CauchyError> {
    GfContext::new()
}
