//! Bulk GF(256) arithmetic over memory buffers.
//!
//! These are the only functions in the crate that touch block-sized
//! buffers directly; the codec (`crate::codec`) composes them but never
//! loops over bytes itself.

use crate::galois::GfContext;
use crate::simd::{self, SimdLevel, WriteOp};
use std::sync::OnceLock;

/// Detected once per process and reused for every call.
static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

fn level() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(simd::detect_simd_support)
}

/// Below this length the dispatch and setup overhead of a SIMD tier is not
/// worth it; the scalar path handles small buffers directly.
const SIMD_MIN_LEN: usize = 16;

fn level_for(len: usize) -> SimdLevel {
    if len >= SIMD_MIN_LEN {
        level()
    } else {
        SimdLevel::None
    }
}

/// `dst ^= src`.
pub fn xor_mem(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// `dst ^= a ^ b`.
pub fn xor2_mem(dst: &mut [u8], a: &[u8], b: &[u8]) {
    debug_assert!(dst.len() == a.len() && dst.len() == b.len());
    for ((d, x), y) in dst.iter_mut().zip(a).zip(b) {
        *d ^= x ^ y;
    }
}

/// `dst = a ^ b`.
pub fn xor_set_mem(dst: &mut [u8], a: &[u8], b: &[u8]) {
    debug_assert!(dst.len() == a.len() && dst.len() == b.len());
    for ((d, x), y) in dst.iter_mut().zip(a).zip(b) {
        *d = x ^ y;
    }
}

/// `dst = MUL[y, src]`.
pub fn mul_mem(ctx: &GfContext, dst: &mut [u8], src: &[u8], y: u8) {
    debug_assert_eq!(dst.len(), src.len());
    match y {
        0 => dst.fill(0),
        1 => dst.copy_from_slice(src),
        _ => {
            let table = ctx.split_table(y);
            simd::dispatch(dst, src, table, WriteOp::Direct, level_for(dst.len()));
        }
    }
}

/// `dst ^= MUL[y, src]`.
pub fn muladd_mem(ctx: &GfContext, dst: &mut [u8], y: u8, src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    match y {
        0 => {}
        1 => xor_mem(dst, src),
        _ => {
            let table = ctx.split_table(y);
            simd::dispatch(dst, src, table, WriteOp::Add, level_for(dst.len()));
        }
    }
}

/// `dst = MUL[INV[y], src]`.
pub fn div_mem(ctx: &GfContext, dst: &mut [u8], src: &[u8], y: u8) {
    if y == 1 {
        dst.copy_from_slice(src);
    } else {
        mul_mem(ctx, dst, src, ctx.inv(y));
    }
}

/// `buf *= y`, in place. Used for decode's pivot-row scaling: at most `e`
/// calls total (`e` is the erasure count, at most `recovery_count`), but
/// each call scales a full block-sized buffer, so it dispatches through the
/// same SIMD tiers as [`mul_mem`]/[`muladd_mem`] rather than looping byte by
/// byte.
pub fn scale_mem(ctx: &GfContext, buf: &mut [u8], y: u8) {
    match y {
        0 => buf.fill(0),
        1 => {}
        _ => {
            let table = ctx.split_table(y);
            simd::dispatch_inplace(buf, table, level_for(buf.len()));
        }
    }
}

/// Exchanges the contents of two equal-length buffers.
pub fn memswap(a: &mut [u8], b: &mut [u8]) {
    debug_assert_eq!(a.len(), b.len());
    a.swap_with_slice(b);
}
