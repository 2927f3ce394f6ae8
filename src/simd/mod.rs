//! SIMD tier detection and dispatch for GF(256) multiply-by-constant.
//!
//! GF(256) split tables operate directly on bytes, so each lane-width chunk
//! needs exactly one low-nibble lookup, one high-nibble lookup, and one
//! XOR — no even/odd byte de-interleave step, unlike a GF(2^16) field where
//! each 16-bit word must first be split into its two component bytes.

pub mod common;
#[cfg(target_arch = "aarch64")]
pub mod neon;
#[cfg(target_arch = "x86_64")]
pub mod pshufb;
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub mod portable;

pub use common::{process_slice, process_slice_inplace, WriteOp};

use crate::galois::SplitTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdLevel {
    None,
    Ssse3,
    Avx2,
    Neon,
    Portable,
}

/// Picks the best tier this CPU supports. Called once and cached by the
/// caller (see `crate::kernels`); the result cannot change during the
/// process's lifetime.
pub fn detect_simd_support() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return SimdLevel::Avx2;
        }
        if is_x86_feature_detected!("ssse3") {
            return SimdLevel::Ssse3;
        }
        SimdLevel::None
    }
    #[cfg(target_arch = "aarch64")]
    {
        SimdLevel::Neon
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        SimdLevel::Portable
    }
}

/// Multiplies `src` by the scalar behind `table`, writing or XOR-accumulating
/// into `dst` per `mode`, using whichever `level` was detected.
pub fn dispatch(dst: &mut [u8], src: &[u8], table: &SplitTable, mode: WriteOp, level: SimdLevel) {
    match level {
        SimdLevel::Avx2 => {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                pshufb::multiply_avx2(dst, src, table, mode);
            }
            #[cfg(not(target_arch = "x86_64"))]
            process_slice(dst, src, table, mode);
        }
        SimdLevel::Ssse3 => {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                pshufb::multiply_ssse3(dst, src, table, mode);
            }
            #[cfg(not(target_arch = "x86_64"))]
            process_slice(dst, src, table, mode);
        }
        SimdLevel::Neon => {
            #[cfg(target_arch = "aarch64")]
            unsafe {
                neon::multiply_neon(dst, src, table, mode);
            }
            #[cfg(not(target_arch = "aarch64"))]
            process_slice(dst, src, table, mode);
        }
        SimdLevel::Portable => {
            #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
            portable::multiply_portable(dst, src, table, mode);
            #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
            process_slice(dst, src, table, mode);
        }
        SimdLevel::None => process_slice(dst, src, table, mode),
    }
}

/// In-place counterpart of [`dispatch`] for decode's pivot-row scaling, where
/// source and destination are the same buffer.
pub fn dispatch_inplace(buf: &mut [u8], table: &SplitTable, level: SimdLevel) {
    match level {
        SimdLevel::Avx2 => {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                pshufb::multiply_avx2_inplace(buf, table);
            }
            #[cfg(not(target_arch = "x86_64"))]
            process_slice_inplace(buf, table);
        }
        SimdLevel::Ssse3 => {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                pshufb::multiply_ssse3_inplace(buf, table);
            }
            #[cfg(not(target_arch = "x86_64"))]
            process_slice_inplace(buf, table);
        }
        SimdLevel::Neon => {
            #[cfg(target_arch = "aarch64")]
            unsafe {
                neon::multiply_neon_inplace(buf, table);
            }
            #[cfg(not(target_arch = "aarch64"))]
            process_slice_inplace(buf, table);
        }
        SimdLevel::Portable => {
            #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
            portable::multiply_portable_inplace(buf, table);
            #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
            process_slice_inplace(buf, table);
        }
        SimdLevel::None => process_slice_inplace(buf, table),
    }
}
