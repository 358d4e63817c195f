//! Raw kernel loops.
//!
//! Each loop mirrors the gufunc inner-loop calling convention:
//!
//! - `args`: operand base pointers, read-only inputs first, then writable
//!   outputs. Input pointers are never written through.
//! - `dims`: `nbatch` batch-axis sizes followed by the kernel's core
//!   dimensions in signature order.
//! - `steps`: for each batch axis, one element stride per operand
//!   (axis-major), followed by each operand's core strides in operand order.
//!
//! The loops perform no validation: shape compatibility is the caller's
//! contract (see `ops`), and arithmetic follows IEEE-754 throughout: a
//! zero denominator produces infinity or NaN, never a panic.

use num_traits::Float;

use crate::batch::for_each_batch;
use crate::vector::{squared_distance, VectorCursor, VectorLayout};
use crate::Numerics;

#[inline]
fn split<'a, T>(
    args: &[*mut T],
    dims: &'a [usize],
    steps: &'a [isize],
    nbatch: usize,
) -> (&'a [usize], &'a [usize], &'a [isize], &'a [isize]) {
    let nop = args.len();
    let (batch_dims, core_dims) = dims.split_at(nbatch);
    let (batch_steps, core_steps) = steps.split_at(nbatch * nop);
    (batch_dims, core_dims, batch_steps, core_steps)
}

// ============================================================================
// pdist_ratio: (d,m),(d,n)->(),()
// ============================================================================

/// Min/max ratio of pairwise distances over all unordered pairs (i < j) of
/// `d` points, numerator space against denominator space.
///
/// `core_dims = [d, m, n]`, `core_steps = [num_d, num_m, den_d, den_n]`.
/// Outputs are `sqrt(min)` and `sqrt(max)`. With d <= 1 there are no pairs
/// and the outputs are the seeded extrema: `sqrt(inf) = inf`, `sqrt(0) = 0`.
///
/// # Safety
/// Pointers and strides must describe in-bounds operands per the module
/// contract; `args.len() == 4`.
pub unsafe fn pdist_ratio_loop<T: Float>(
    args: &[*mut T],
    dims: &[usize],
    steps: &[isize],
    nbatch: usize,
    nc: &Numerics<T>,
) {
    let (batch_dims, core, batch_steps, core_steps) = split(args, dims, steps, nbatch);
    let len_d = core[0];
    let stride_num_d = core_steps[0];
    let stride_den_d = core_steps[2];
    let num_in = VectorLayout::new(core[1], core_steps[1]);
    let den_in = VectorLayout::new(core[2], core_steps[3]);

    for_each_batch(batch_dims, batch_steps, args.len(), |offsets| unsafe {
        let mut ip_num_fr = (args[0] as *const T).offset(offsets[0]);
        let mut ip_den_fr = (args[1] as *const T).offset(offsets[1]);
        let op1 = args[2].offset(offsets[2]);
        let op2 = args[3].offset(offsets[3]);

        let mut dr_min = nc.inf;
        let mut dr_max = nc.zero;

        for d1 in 0..len_d.saturating_sub(1) {
            let mut ip_num_to = ip_num_fr.offset(stride_num_d);
            let mut ip_den_to = ip_den_fr.offset(stride_den_d);

            for _d2 in d1 + 1..len_d {
                let numerator = squared_distance(ip_num_fr, ip_num_to, &num_in, &num_in);
                let denominator = squared_distance(ip_den_fr, ip_den_to, &den_in, &den_in);

                let ratio = numerator / denominator;
                if ratio < dr_min {
                    dr_min = ratio;
                }
                if ratio > dr_max {
                    dr_max = ratio;
                }

                ip_num_to = ip_num_to.offset(stride_num_d);
                ip_den_to = ip_den_to.offset(stride_den_d);
            }
            ip_num_fr = ip_num_fr.offset(stride_num_d);
            ip_den_fr = ip_den_fr.offset(stride_den_d);
        }
        *op1 = dr_min.sqrt();
        *op2 = dr_max.sqrt();
    });
}

// ============================================================================
// cdist_ratio: (d1,m),(d2,m),(d1,n),(d2,n)->(),()
// ============================================================================

/// Min/max ratio of cross-wise distances over the full d1 x d2 product of a
/// `from` set and a `to` set, numerator space against denominator space.
///
/// `core_dims = [d1, m, d2, n]`,
/// `core_steps = [num_fr_d, num_fr_m, num_to_d, num_to_m,
///                den_fr_d, den_fr_n, den_to_d, den_to_n]` in operand order.
///
/// Self-pairs are not excluded: when the two sets coincide, the 0/0 ratio of
/// a point with itself is NaN and updates neither extremum (both `<` and `>`
/// are false for NaN).
///
/// # Safety
/// Pointers and strides must describe in-bounds operands per the module
/// contract; `args.len() == 6`.
pub unsafe fn cdist_ratio_loop<T: Float>(
    args: &[*mut T],
    dims: &[usize],
    steps: &[isize],
    nbatch: usize,
    nc: &Numerics<T>,
) {
    let (batch_dims, core, batch_steps, core_steps) = split(args, dims, steps, nbatch);
    let len_fr_d = core[0];
    let stride_num_fr_d = core_steps[0];
    let stride_den_fr_d = core_steps[4];
    let num_fr_in = VectorLayout::new(core[1], core_steps[1]);
    let num_to_in = VectorLayout::new(core[1], core_steps[3]);
    let den_fr_in = VectorLayout::new(core[3], core_steps[5]);
    let den_to_in = VectorLayout::new(core[3], core_steps[7]);
    // Point axis of the `to` sets, rewound for every `from` point.
    let num_to_pts = VectorLayout::new(core[2], core_steps[2]);
    let den_to_pts = VectorLayout::new(core[2], core_steps[6]);

    for_each_batch(batch_dims, batch_steps, args.len(), |offsets| unsafe {
        let mut ip_num_fr = (args[0] as *const T).offset(offsets[0]);
        let mut ip_den_fr = (args[2] as *const T).offset(offsets[2]);
        let op1 = args[4].offset(offsets[4]);
        let op2 = args[5].offset(offsets[5]);

        let mut num_to = VectorCursor::new((args[1] as *const T).offset(offsets[1]), num_to_pts);
        let mut den_to = VectorCursor::new((args[3] as *const T).offset(offsets[3]), den_to_pts);

        let mut dr_min = nc.inf;
        let mut dr_max = nc.zero;

        for _d1 in 0..len_fr_d {
            for _d2 in 0..num_to_pts.len {
                let numerator = squared_distance(ip_num_fr, num_to.ptr(), &num_fr_in, &num_to_in);
                let denominator = squared_distance(ip_den_fr, den_to.ptr(), &den_fr_in, &den_to_in);

                let ratio = numerator / denominator;
                if ratio < dr_min {
                    dr_min = ratio;
                }
                if ratio > dr_max {
                    dr_max = ratio;
                }

                num_to.step();
                den_to.step();
            }
            num_to.reset();
            den_to.reset();

            ip_num_fr = ip_num_fr.offset(stride_num_fr_d);
            ip_den_fr = ip_den_fr.offset(stride_den_fr_d);
        }
        *op1 = dr_min.sqrt();
        *op2 = dr_max.sqrt();
    });
}

// ============================================================================
// matmul: (m,n),(n,p)->(m,p)
// ============================================================================

/// Matrix product with the inner accumulation order n = 0..n-1 fixed, so
/// rounding is reproducible. Each output cell is zero-initialized before
/// accumulation.
///
/// `core_dims = [m, n, p]`,
/// `core_steps = [x_m, x_n, y_n, y_p, z_m, z_p]`.
///
/// # Safety
/// Pointers and strides must describe in-bounds operands per the module
/// contract; `args.len() == 3`. The output must not alias the inputs.
pub unsafe fn matmul_loop<T: Float>(
    args: &[*mut T],
    dims: &[usize],
    steps: &[isize],
    nbatch: usize,
    nc: &Numerics<T>,
) {
    let (batch_dims, core, batch_steps, core_steps) = split(args, dims, steps, nbatch);
    let len_m = core[0];
    let len_p = core[2];
    let stride_x_m = core_steps[0];
    let stride_z_m = core_steps[4];
    let x_row = VectorLayout::new(core[1], core_steps[1]);
    let y_col = VectorLayout::new(core[1], core_steps[2]);
    let y_row = VectorLayout::new(core[2], core_steps[3]);
    let z_row = VectorLayout::new(core[2], core_steps[5]);

    for_each_batch(batch_dims, batch_steps, args.len(), |offsets| unsafe {
        let mut ip_x = (args[0] as *const T).offset(offsets[0]);
        let mut ip_y = (args[1] as *const T).offset(offsets[1]);
        let mut op_z = args[2].offset(offsets[2]);

        for _m in 0..len_m {
            for _p in 0..len_p {
                *op_z = nc.zero;

                for _n in 0..x_row.len {
                    *op_z = *op_z + *ip_x * *ip_y;

                    ip_x = ip_x.offset(x_row.stride);
                    ip_y = ip_y.offset(y_col.stride);
                }
                ip_x = ip_x.offset(-x_row.back_stride);
                ip_y = ip_y.offset(-y_col.back_stride);

                ip_y = ip_y.offset(y_row.stride);
                op_z = op_z.offset(z_row.stride);
            }
            ip_y = ip_y.offset(-y_row.back_stride);
            op_z = op_z.offset(-z_row.back_stride);

            ip_x = ip_x.offset(stride_x_m);
            op_z = op_z.offset(stride_z_m);
        }
    });
}

// ============================================================================
// norm: (n)->()
// ============================================================================

/// Euclidean norm of a vector: sum of squares, then square root. An empty
/// vector yields 0.
///
/// `core_dims = [n]`, `core_steps = [x_n]`.
///
/// # Safety
/// Pointers and strides must describe in-bounds operands per the module
/// contract; `args.len() == 2`.
pub unsafe fn norm_loop<T: Float>(
    args: &[*mut T],
    dims: &[usize],
    steps: &[isize],
    nbatch: usize,
    nc: &Numerics<T>,
) {
    let (batch_dims, core, batch_steps, core_steps) = split(args, dims, steps, nbatch);
    let len_n = core[0];
    let stride_n = core_steps[0];

    for_each_batch(batch_dims, batch_steps, args.len(), |offsets| unsafe {
        let mut ip_x = (args[0] as *const T).offset(offsets[0]);
        let op_r = args[1].offset(offsets[1]);

        let mut normsq = nc.zero;
        for _n in 0..len_n {
            normsq = normsq + *ip_x * *ip_x;
            ip_x = ip_x.offset(stride_n);
        }
        *op_r = normsq.sqrt();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    // Raw-loop tests drive the exact inner-loop calling convention; the
    // view-level behavior is covered in tests/correctness.rs.

    #[test]
    fn test_norm_loop_raw() {
        let nc = Numerics::new();
        let x = [3.0f64, 4.0];
        let mut out = [0.0f64];
        let args = [x.as_ptr() as *mut f64, out.as_mut_ptr()];
        unsafe { norm_loop(&args, &[2], &[1], 0, &nc) };
        assert_eq!(out[0], 5.0);
    }

    #[test]
    fn test_norm_loop_batched_strided() {
        let nc = Numerics::new();
        // Two vectors of length 2, stored column-major: [[3,5],[4,12]]
        let x = [3.0f64, 5.0, 4.0, 12.0];
        let mut out = [0.0f64; 2];
        let args = [x.as_ptr() as *mut f64, out.as_mut_ptr()];
        // one batch axis of size 2: x batch stride 1, out batch stride 1;
        // core vector stride 2
        unsafe { norm_loop(&args, &[2, 2], &[1, 1, 2], 1, &nc) };
        assert_eq!(out, [5.0, 13.0]);
    }

    #[test]
    fn test_matmul_loop_raw_2x2() {
        let nc = Numerics::new();
        let x = [1.0f64, 2.0, 3.0, 4.0];
        let y = [5.0f64, 6.0, 7.0, 8.0];
        let mut z = [0.0f64; 4];
        let args = [x.as_ptr() as *mut f64, y.as_ptr() as *mut f64, z.as_mut_ptr()];
        let dims = [2usize, 2, 2];
        let steps = [2isize, 1, 2, 1, 2, 1];
        unsafe { matmul_loop(&args, &dims, &steps, 0, &nc) };
        assert_eq!(z, [19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_pdist_loop_degenerate_single_point() {
        let nc = Numerics::new();
        let num = [1.0f64, 2.0];
        let den = [3.0f64];
        let mut mn = [0.0f64];
        let mut mx = [1.0f64];
        let args = [
            num.as_ptr() as *mut f64,
            den.as_ptr() as *mut f64,
            mn.as_mut_ptr(),
            mx.as_mut_ptr(),
        ];
        // d=1, m=2, n=1
        let dims = [1usize, 2, 1];
        let steps = [2isize, 1, 1, 1];
        unsafe { pdist_ratio_loop(&args, &dims, &steps, 0, &nc) };
        assert!(mn[0].is_infinite() && mn[0] > 0.0);
        assert_eq!(mx[0], 0.0);
    }
}
