//! aarch64 NEON kernel. NEON shifts each byte lane independently, so unlike
//! the x86 PSHUFB tier this needs no shift/mask trick to separate nibbles.

use super::common::{process_slice, process_slice_inplace, WriteOp};
use crate::galois::SplitTable;
use std::arch::aarch64::*;

/// Safety: NEON is baseline on aarch64, so this has no feature precondition
/// beyond the target architecture itself.
#[target_feature(enable = "neon")]
pub unsafe fn multiply_neon(dst: &mut [u8], src: &[u8], table: &SplitTable, mode: WriteOp) {
    let n = dst.len().min(src.len());
    let lo_tbl = vld1q_u8(table.lo.as_ptr());
    let hi_tbl = vld1q_u8(table.hi.as_ptr());
    let nibble_mask = vdupq_n_u8(0x0F);

    let chunks = n / 16;
    for c in 0..chunks {
        let off = c * 16;
        let in_vec = vld1q_u8(src.as_ptr().add(off));
        let lo_nib = vandq_u8(in_vec, nibble_mask);
        let hi_nib = vshrq_n_u8(in_vec, 4);
        let product = veorq_u8(vqtbl1q_u8(lo_tbl, lo_nib), vqtbl1q_u8(hi_tbl, hi_nib));
        let dst_ptr = dst.as_mut_ptr().add(off);
        match mode {
            WriteOp::Direct => vst1q_u8(dst_ptr, product),
            WriteOp::Add => {
                let existing = vld1q_u8(dst_ptr);
                vst1q_u8(dst_ptr, veorq_u8(existing, product));
            }
        }
    }

    let rem = chunks * 16;
    if rem < n {
        process_slice(&mut dst[rem..n], &src[rem..n], table, mode);
    }
}

#[target_feature(enable = "neon")]
pub unsafe fn multiply_neon_inplace(buf: &mut [u8], table: &SplitTable) {
    let n = buf.len();
    let lo_tbl = vld1q_u8(table.lo.as_ptr());
    let hi_tbl = vld1q_u8(table.hi.as_ptr());
    let nibble_mask = vdupq_n_u8(0x0F);

    let chunks = n / 16;
    for c in 0..chunks {
        let off = c * 16;
        let ptr = buf.as_mut_ptr().add(off);
        let in_vec = vld1q_u8(ptr);
        let lo_nib = vandq_u8(in_vec, nibble_mask);
        let hi_nib = vshrq_n_u8(in_vec, 4);
        let product = veorq_u8(vqtbl1q_u8(lo_tbl, lo_nib), vqtbl1q_u8(hi_tbl, hi_nib));
        vst1q_u8(ptr, product);
    }

    let rem = chunks * 16;
    if rem < n {
        process_slice_inplace(&mut buf[rem..n], table);
    }
}

#[cfg(test)]
#[cfg(target_arch = "aarch64")]
mod tests {
    use super::*;
    use crate::galois::GfContext;

    #[test]
    fn neon_matches_scalar_reference() {
        let ctx = GfContext::new().unwrap();
        for &len in &[0usize, 1, 15, 16, 31, 32, 63, 64, 4096] {
            let input: Vec<u8> = (0..len).map(|i| (i * 37 + 13) as u8).collect();
            let mut out = vec![0u8; len];
            unsafe { multiply_neon(&mut out, &input, ctx.split_table(0x9C), WriteOp::Direct) };
            let expected: Vec<u8> = input.iter().map(|&x| ctx.mul(0x9C, x)).collect();
            assert_eq!(out, expected, "len={len}");
        }
    }

    #[test]
    fn neon_inplace_matches_scalar_reference() {
        let ctx = GfContext::new().unwrap();
        for &len in &[0usize, 1, 15, 16, 31, 32, 63, 64, 4096] {
            let input: Vec<u8> = (0..len).map(|i| (i * 37 + 13) as u8).collect();
            let mut buf = input.clone();
            unsafe { multiply_neon_inplace(&mut buf, ctx.split_table(0x9C)) };
            let expected: Vec<u8> = input.iter().map(|&x| ctx.mul(0x9C, x)).collect();
            assert_eq!(buf, expected, "len={len}");
        }
    }
}
