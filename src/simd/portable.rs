//! Portable `std::simd` fallback for targets with no dedicated tier above
//! (anything that is not x86_64 or aarch64). Requires the nightly
//! `portable_simd` feature, declared once in `lib.rs`.

use super::common::{process_slice, process_slice_inplace, WriteOp};
use crate::galois::SplitTable;
use std::simd::prelude::*;

pub fn multiply_portable(dst: &mut [u8], src: &[u8], table: &SplitTable, mode: WriteOp) {
    let n = dst.len().min(src.len());
    let lo = u8x16::from_array(table.lo);
    let hi = u8x16::from_array(table.hi);
    let nibble_mask = u8x16::splat(0x0F);

    let chunks = n / 16;
    for c in 0..chunks {
        let off = c * 16;
        let in_vec = u8x16::from_slice(&src[off..off + 16]);
        let lo_nib = in_vec & nibble_mask;
        let hi_nib = in_vec >> u8x16::splat(4);
        let product = lo.swizzle_dyn(lo_nib) ^ hi.swizzle_dyn(hi_nib);
        match mode {
            WriteOp::Direct => product.copy_to_slice(&mut dst[off..off + 16]),
            WriteOp::Add => {
                let existing = u8x16::from_slice(&dst[off..off + 16]);
                (existing ^ product).copy_to_slice(&mut dst[off..off + 16]);
            }
        }
    }

    let rem = chunks * 16;
    if rem < n {
        process_slice(&mut dst[rem..n], &src[rem..n], table, mode);
    }
}

pub fn multiply_portable_inplace(buf: &mut [u8], table: &SplitTable) {
    let n = buf.len();
    let lo = u8x16::from_array(table.lo);
    let hi = u8x16::from_array(table.hi);
    let nibble_mask = u8x16::splat(0x0F);

    let chunks = n / 16;
    for c in 0..chunks {
        let off = c * 16;
        let in_vec = u8x16::from_slice(&buf[off..off + 16]);
        let lo_nib = in_vec & nibble_mask;
        let hi_nib = in_vec >> u8x16::splat(4);
        let product = lo.swizzle_dyn(lo_nib) ^ hi.swizzle_dyn(hi_nib);
        product.copy_to_slice(&mut buf[off..off + 16]);
    }

    let rem = chunks * 16;
    if rem < n {
        process_slice_inplace(&mut buf[rem..n], table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galois::GfContext;

    #[test]
    fn portable_matches_scalar_reference() {
        let ctx = GfContext::new().unwrap();
        for &len in &[0usize, 1, 15, 16, 31, 32, 63, 64, 4096] {
            let input: Vec<u8> = (0..len).map(|i| (i * 37 + 13) as u8).collect();
            let mut out = vec![0u8; len];
            multiply_portable(&mut out, &input, ctx.split_table(0x6D), WriteOp::Direct);
            let expected: Vec<u8> = input.iter().map(|&x| ctx.mul(0x6D, x)).collect();
            assert_eq!(out, expected, "len={len}");
        }
    }

    #[test]
    fn portable_inplace_matches_scalar_reference() {
        let ctx = GfContext::new().unwrap();
        for &len in &[0usize, 1, 15, 16, 31, 32, 63, 64, 4096] {
            let input: Vec<u8> = (0..len).map(|i| (i * 37 + 13) as u8).collect();
            let mut buf = input.clone();
            multiply_portable_inplace(&mut buf, ctx.split_table(0x6D));
            let expected: Vec<u8> = input.iter().map(|&x| ctx.mul(0x6D, x)).collect();
            assert_eq!(buf, expected, "len={len}");
        }
    }
}
