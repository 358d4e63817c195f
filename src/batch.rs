//! Outer-loop driver shared by every kernel.
//!
//! A gufunc call carries leading batch dimensions beyond each operand's core
//! dimensions. This module enumerates every batch index combination in
//! row-major order (last axis fastest) and hands the kernel body one element
//! offset per operand. Offsets are maintained incrementally, odometer style:
//! advance the innermost axis by its stride; on wraparound, step the offset
//! back across the exhausted axis and carry into the next one. The full
//! `index . stride` dot product is never recomputed.

use smallvec::{smallvec, SmallVec};

/// Enumerate the Cartesian product of batch-axis indices.
///
/// `dims` holds the batch-axis sizes (broadcasting already resolved by the
/// caller; sizes agree across operands). `steps` is axis-major: for axis
/// `ax` and operand `op`, the per-axis element stride is
/// `steps[ax * nop + op]`, matching the layout the raw loops receive.
///
/// The callback runs once per combination with the current per-operand
/// offsets. No batch axes means a single invocation with zero offsets; a
/// zero-sized axis means no invocations at all.
pub(crate) fn for_each_batch<F>(dims: &[usize], steps: &[isize], nop: usize, mut f: F)
where
    F: FnMut(&[isize]),
{
    debug_assert_eq!(steps.len(), dims.len() * nop);

    let rank = dims.len();
    let total: usize = dims.iter().product();
    let mut offsets: SmallVec<[isize; 6]> = smallvec![0; nop];
    let mut index: SmallVec<[usize; 4]> = smallvec![0; rank];

    for _ in 0..total {
        f(&offsets);

        for ax in (0..rank).rev() {
            index[ax] += 1;
            if index[ax] < dims[ax] {
                for (op, offset) in offsets.iter_mut().enumerate() {
                    *offset += steps[ax * nop + op];
                }
                break;
            }
            // Wraparound: step back across the exhausted axis, carry on.
            index[ax] = 0;
            for (op, offset) in offsets.iter_mut().enumerate() {
                *offset -= (dims[ax] as isize - 1) * steps[ax * nop + op];
            }
        }
    }
}
