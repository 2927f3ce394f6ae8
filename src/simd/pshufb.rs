//! x86_64 PSHUFB kernels: AVX2 (32-byte lanes) and SSSE3 (16-byte lanes).
//!
//! Both extract each byte's low and high nibble with a shift-and-mask (per
//! `_mm256_srli_epi16`/`_mm_srli_epi16`, which operates on 16-bit lanes, not
//! individual bytes — the low-nibble mask afterward discards the spillover
//! from the neighboring byte, which is what makes this trick work), then
//! reconstruct the product with two table shuffles and an XOR.

use super::common::{process_slice, process_slice_inplace, WriteOp};
use crate::galois::SplitTable;
use std::arch::x86_64::*;

/// Safety: caller must have verified `avx2` support (see `detect_simd_support`).
#[target_feature(enable = "avx2")]
pub unsafe fn multiply_avx2(dst: &mut [u8], src: &[u8], table: &SplitTable, mode: WriteOp) {
    let n = dst.len().min(src.len());
    let lo = _mm256_broadcastsi128_si256(_mm_loadu_si128(table.lo.as_ptr() as *const __m128i));
    let hi = _mm256_broadcastsi128_si256(_mm_loadu_si128(table.hi.as_ptr() as *const __m128i));
    let nibble_mask = _mm256_set1_epi8(0x0F);

    let chunks = n / 32;
    for c in 0..chunks {
        let off = c * 32;
        let in_vec = _mm256_loadu_si256(src.as_ptr().add(off) as *const __m256i);
        let lo_nib = _mm256_and_si256(in_vec, nibble_mask);
        let hi_nib = _mm256_and_si256(_mm256_srli_epi16(in_vec, 4), nibble_mask);
        let product = _mm256_xor_si256(_mm256_shuffle_epi8(lo, lo_nib), _mm256_shuffle_epi8(hi, hi_nib));
        let dst_ptr = dst.as_mut_ptr().add(off) as *mut __m256i;
        match mode {
            WriteOp::Direct => _mm256_storeu_si256(dst_ptr, product),
            WriteOp::Add => {
                let existing = _mm256_loadu_si256(dst_ptr as *const __m256i);
                _mm256_storeu_si256(dst_ptr, _mm256_xor_si256(existing, product));
            }
        }
    }

    let rem = chunks * 32;
    if rem < n {
        process_slice(&mut dst[rem..n], &src[rem..n], table, mode);
    }
}

/// Safety: caller must have verified `ssse3` support.
#[target_feature(enable = "ssse3")]
pub unsafe fn multiply_ssse3(dst: &mut [u8], src: &[u8], table: &SplitTable, mode: WriteOp) {
    let n = dst.len().min(src.len());
    let lo = _mm_loadu_si128(table.lo.as_ptr() as *const __m128i);
    let hi = _mm_loadu_si128(table.hi.as_ptr() as *const __m128i);
    let nibble_mask = _mm_set1_epi8(0x0F);

    let chunks = n / 16;
    for c in 0..chunks {
        let off = c * 16;
        let in_vec = _mm_loadu_si128(src.as_ptr().add(off) as *const __m128i);
        let lo_nib = _mm_and_si128(in_vec, nibble_mask);
        let hi_nib = _mm_and_si128(_mm_srli_epi16(in_vec, 4), nibble_mask);
        let product = _mm_xor_si128(_mm_shuffle_epi8(lo, lo_nib), _mm_shuffle_epi8(hi, hi_nib));
        let dst_ptr = dst.as_mut_ptr().add(off) as *mut __m128i;
        match mode {
            WriteOp::Direct => _mm_storeu_si128(dst_ptr, product),
            WriteOp::Add => {
                let existing = _mm_loadu_si128(dst_ptr as *const __m128i);
                _mm_storeu_si128(dst_ptr, _mm_xor_si128(existing, product));
            }
        }
    }

    let rem = chunks * 16;
    if rem < n {
        process_slice(&mut dst[rem..n], &src[rem..n], table, mode);
    }
}

/// In-place variant for decode's pivot-row scaling (no separate `dst`/`src`
/// pointers to juggle since there is only one buffer).
#[target_feature(enable = "avx2")]
pub unsafe fn multiply_avx2_inplace(buf: &mut [u8], table: &SplitTable) {
    let n = buf.len();
    let lo = _mm256_broadcastsi128_si256(_mm_loadu_si128(table.lo.as_ptr() as *const __m128i));
    let hi = _mm256_broadcastsi128_si256(_mm_loadu_si128(table.hi.as_ptr() as *const __m128i));
    let nibble_mask = _mm256_set1_epi8(0x0F);

    let chunks = n / 32;
    for c in 0..chunks {
        let off = c * 32;
        let ptr = buf.as_mut_ptr().add(off) as *mut __m256i;
        let in_vec = _mm256_loadu_si256(ptr as *const __m256i);
        let lo_nib = _mm256_and_si256(in_vec, nibble_mask);
        let hi_nib = _mm256_and_si256(_mm256_srli_epi16(in_vec, 4), nibble_mask);
        let product = _mm256_xor_si256(_mm256_shuffle_epi8(lo, lo_nib), _mm256_shuffle_epi8(hi, hi_nib));
        _mm256_storeu_si256(ptr, product);
    }

    let rem = chunks * 32;
    if rem < n {
        process_slice_inplace(&mut buf[rem..n], table);
    }
}

#[target_feature(enable = "ssse3")]
pub unsafe fn multiply_ssse3_inplace(buf: &mut [u8], table: &SplitTable) {
    let n = buf.len();
    let lo = _mm_loadu_si128(table.lo.as_ptr() as *const __m128i);
    let hi = _mm_loadu_si128(table.hi.as_ptr() as *const __m128i);
    let nibble_mask = _mm_set1_epi8(0x0F);

    let chunks = n / 16;
    for c in 0..chunks {
        let off = c * 16;
        let ptr = buf.as_mut_ptr().add(off) as *mut __m128i;
        let in_vec = _mm_loadu_si128(ptr as *const __m128i);
        let lo_nib = _mm_and_si128(in_vec, nibble_mask);
        let hi_nib = _mm_and_si128(_mm_srli_epi16(in_vec, 4), nibble_mask);
        let product = _mm_xor_si128(_mm_shuffle_epi8(lo, lo_nib), _mm_shuffle_epi8(hi, hi_nib));
        _mm_storeu_si128(ptr, product);
    }

    let rem = chunks * 16;
    if rem < n {
        process_slice_inplace(&mut buf[rem..n], table);
    }
}
