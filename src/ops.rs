//! Safe entry points for the four kernels.
//!
//! These wrappers play the role of the dispatch layer: they check the shape
//! contract the raw loops assume (matching batch shapes across operands,
//! consistent shared core dimensions), assemble the `args`/`dims`/`steps`
//! triple, and call the raw loop. Inputs with any leading batch dimensions
//! are accepted; outputs must carry exactly the batch shape.
//!
//! The `_into` variants write through output views; the plain variants are
//! batch-free conveniences returning the scalars directly.

use crate::kernels;
use crate::view::{StridedView, StridedViewMut};
use crate::{GufuncError, Numerics, Result};

/// Leading batch dimensions of an operand with `core` trailing core dims.
fn batch_dims(dims: &[usize], core: usize) -> Result<&[usize]> {
    if dims.len() < core {
        return Err(GufuncError::RankMismatch(dims.len(), core));
    }
    Ok(&dims[..dims.len() - core])
}

fn ensure_batch_eq(expected: &[usize], found: &[usize]) -> Result<()> {
    if expected != found {
        return Err(GufuncError::ShapeMismatch(
            expected.to_vec(),
            found.to_vec(),
        ));
    }
    Ok(())
}

fn ensure_core_dim(name: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(GufuncError::CoreDimMismatch {
            name,
            expected,
            found,
        });
    }
    Ok(())
}

// ============================================================================
// pdist_ratio
// ============================================================================

/// Min/max ratio of pairwise distances between corresponding pairs of points
/// in two sets, signature `(d,m),(d,n)->(),()`.
///
/// `num` holds the `d` points of the numerator space (one point per row of
/// length `m`), `den` the same `d` points in the denominator space (rows of
/// length `n`). For every unordered pair i < j the squared-distance ratio
/// numerator/denominator is tracked; the outputs receive the square roots of
/// the running minimum and maximum, so the results are distance ratios.
///
/// With fewer than two points there are no pairs and the outputs are the
/// seeded extrema, `+inf` and `0.0`. A zero denominator follows IEEE-754
/// (infinity or NaN; NaN ratios update neither extremum).
pub fn pdist_ratio_into(
    drmin: &mut StridedViewMut<'_, f64>,
    drmax: &mut StridedViewMut<'_, f64>,
    num: &StridedView<'_, f64>,
    den: &StridedView<'_, f64>,
    nc: &Numerics<f64>,
) -> Result<()> {
    let batch = batch_dims(num.dims(), 2)?;
    ensure_batch_eq(batch, batch_dims(den.dims(), 2)?)?;
    ensure_batch_eq(batch, drmin.dims())?;
    ensure_batch_eq(batch, drmax.dims())?;
    let nbatch = batch.len();

    let d = num.dims()[nbatch];
    let m = num.dims()[nbatch + 1];
    let n = den.dims()[nbatch + 1];
    ensure_core_dim("d", d, den.dims()[nbatch])?;

    let mut dims: Vec<usize> = Vec::with_capacity(nbatch + 3);
    dims.extend_from_slice(batch);
    dims.extend([d, m, n]);

    let mut steps: Vec<isize> = Vec::with_capacity(nbatch * 4 + 4);
    for ax in 0..nbatch {
        steps.extend([
            num.stride(ax),
            den.stride(ax),
            drmin.stride(ax),
            drmax.stride(ax),
        ]);
    }
    steps.extend([
        num.stride(nbatch),
        num.stride(nbatch + 1),
        den.stride(nbatch),
        den.stride(nbatch + 1),
    ]);

    let args = [
        num.ptr() as *mut f64,
        den.ptr() as *mut f64,
        drmin.ptr_mut(),
        drmax.ptr_mut(),
    ];
    unsafe { kernels::pdist_ratio_loop(&args, &dims, &steps, nbatch, nc) };
    Ok(())
}

/// Batch-free [`pdist_ratio_into`]: rank-2 inputs, returns `(drmin, drmax)`.
pub fn pdist_ratio(
    num: &StridedView<'_, f64>,
    den: &StridedView<'_, f64>,
    nc: &Numerics<f64>,
) -> Result<(f64, f64)> {
    if num.ndim() != 2 {
        return Err(GufuncError::RankMismatch(num.ndim(), 2));
    }
    let mut mn = [nc.zero];
    let mut mx = [nc.zero];
    {
        let mut vmin = StridedViewMut::new(&mut mn, &[], &[], 0)?;
        let mut vmax = StridedViewMut::new(&mut mx, &[], &[], 0)?;
        pdist_ratio_into(&mut vmin, &mut vmax, num, den, nc)?;
    }
    Ok((mn[0], mx[0]))
}

// ============================================================================
// cdist_ratio
// ============================================================================

/// Min/max ratio of cross-wise distances between two groups of two point
/// sets, signature `(d1,m),(d2,m),(d1,n),(d2,n)->(),()`.
///
/// Distances run from every point of the `from` sets to every point of the
/// `to` sets, the full d1 x d2 product, self-pairs included. When the two
/// sets coincide, the self-pair ratio is 0/0 = NaN, which updates neither
/// extremum. Outputs are the square roots of the running minimum and
/// maximum, as in [`pdist_ratio_into`].
pub fn cdist_ratio_into(
    drmin: &mut StridedViewMut<'_, f64>,
    drmax: &mut StridedViewMut<'_, f64>,
    num_from: &StridedView<'_, f64>,
    num_to: &StridedView<'_, f64>,
    den_from: &StridedView<'_, f64>,
    den_to: &StridedView<'_, f64>,
    nc: &Numerics<f64>,
) -> Result<()> {
    let batch = batch_dims(num_from.dims(), 2)?;
    ensure_batch_eq(batch, batch_dims(num_to.dims(), 2)?)?;
    ensure_batch_eq(batch, batch_dims(den_from.dims(), 2)?)?;
    ensure_batch_eq(batch, batch_dims(den_to.dims(), 2)?)?;
    ensure_batch_eq(batch, drmin.dims())?;
    ensure_batch_eq(batch, drmax.dims())?;
    let nbatch = batch.len();

    let d1 = num_from.dims()[nbatch];
    let m = num_from.dims()[nbatch + 1];
    let d2 = num_to.dims()[nbatch];
    let n = den_from.dims()[nbatch + 1];
    ensure_core_dim("m", m, num_to.dims()[nbatch + 1])?;
    ensure_core_dim("d1", d1, den_from.dims()[nbatch])?;
    ensure_core_dim("d2", d2, den_to.dims()[nbatch])?;
    ensure_core_dim("n", n, den_to.dims()[nbatch + 1])?;

    let mut dims: Vec<usize> = Vec::with_capacity(nbatch + 4);
    dims.extend_from_slice(batch);
    dims.extend([d1, m, d2, n]);

    let mut steps: Vec<isize> = Vec::with_capacity(nbatch * 6 + 8);
    for ax in 0..nbatch {
        steps.extend([
            num_from.stride(ax),
            num_to.stride(ax),
            den_from.stride(ax),
            den_to.stride(ax),
            drmin.stride(ax),
            drmax.stride(ax),
        ]);
    }
    steps.extend([
        num_from.stride(nbatch),
        num_from.stride(nbatch + 1),
        num_to.stride(nbatch),
        num_to.stride(nbatch + 1),
        den_from.stride(nbatch),
        den_from.stride(nbatch + 1),
        den_to.stride(nbatch),
        den_to.stride(nbatch + 1),
    ]);

    let args = [
        num_from.ptr() as *mut f64,
        num_to.ptr() as *mut f64,
        den_from.ptr() as *mut f64,
        den_to.ptr() as *mut f64,
        drmin.ptr_mut(),
        drmax.ptr_mut(),
    ];
    unsafe { kernels::cdist_ratio_loop(&args, &dims, &steps, nbatch, nc) };
    Ok(())
}

/// Batch-free [`cdist_ratio_into`]: rank-2 inputs, returns `(drmin, drmax)`.
pub fn cdist_ratio(
    num_from: &StridedView<'_, f64>,
    num_to: &StridedView<'_, f64>,
    den_from: &StridedView<'_, f64>,
    den_to: &StridedView<'_, f64>,
    nc: &Numerics<f64>,
) -> Result<(f64, f64)> {
    if num_from.ndim() != 2 {
        return Err(GufuncError::RankMismatch(num_from.ndim(), 2));
    }
    let mut mn = [nc.zero];
    let mut mx = [nc.zero];
    {
        let mut vmin = StridedViewMut::new(&mut mn, &[], &[], 0)?;
        let mut vmax = StridedViewMut::new(&mut mx, &[], &[], 0)?;
        cdist_ratio_into(
            &mut vmin, &mut vmax, num_from, num_to, den_from, den_to, nc,
        )?;
    }
    Ok((mn[0], mx[0]))
}

// ============================================================================
// matmul
// ============================================================================

/// Matrix-matrix product, signature `(m,n),(n,p)->(m,p)`.
///
/// `z[m,p] = sum over n of x[m,n] * y[n,p]`, with the accumulation order
/// over n fixed. Operands may be transposed or otherwise strided views; the
/// output must not alias the inputs.
pub fn matmul_into(
    z: &mut StridedViewMut<'_, f64>,
    x: &StridedView<'_, f64>,
    y: &StridedView<'_, f64>,
    nc: &Numerics<f64>,
) -> Result<()> {
    let batch = batch_dims(x.dims(), 2)?;
    ensure_batch_eq(batch, batch_dims(y.dims(), 2)?)?;
    ensure_batch_eq(batch, batch_dims(z.dims(), 2)?)?;
    let nbatch = batch.len();

    let m = x.dims()[nbatch];
    let n = x.dims()[nbatch + 1];
    let p = y.dims()[nbatch + 1];
    ensure_core_dim("n", n, y.dims()[nbatch])?;
    ensure_core_dim("m", m, z.dims()[nbatch])?;
    ensure_core_dim("p", p, z.dims()[nbatch + 1])?;

    let mut dims: Vec<usize> = Vec::with_capacity(nbatch + 3);
    dims.extend_from_slice(batch);
    dims.extend([m, n, p]);

    let mut steps: Vec<isize> = Vec::with_capacity(nbatch * 3 + 6);
    for ax in 0..nbatch {
        steps.extend([x.stride(ax), y.stride(ax), z.stride(ax)]);
    }
    steps.extend([
        x.stride(nbatch),
        x.stride(nbatch + 1),
        y.stride(nbatch),
        y.stride(nbatch + 1),
        z.stride(nbatch),
        z.stride(nbatch + 1),
    ]);

    let args = [x.ptr() as *mut f64, y.ptr() as *mut f64, z.ptr_mut()];
    unsafe { kernels::matmul_loop(&args, &dims, &steps, nbatch, nc) };
    Ok(())
}

// ============================================================================
// norm
// ============================================================================

/// Euclidean norm, signature `(n)->()`.
///
/// Writes `sqrt(sum of squares)` per batch element; an empty vector yields 0.
pub fn norm_into(
    out: &mut StridedViewMut<'_, f64>,
    x: &StridedView<'_, f64>,
    nc: &Numerics<f64>,
) -> Result<()> {
    let batch = batch_dims(x.dims(), 1)?;
    ensure_batch_eq(batch, out.dims())?;
    let nbatch = batch.len();
    let n = x.dims()[nbatch];

    let mut dims: Vec<usize> = Vec::with_capacity(nbatch + 1);
    dims.extend_from_slice(batch);
    dims.push(n);

    let mut steps: Vec<isize> = Vec::with_capacity(nbatch * 2 + 1);
    for ax in 0..nbatch {
        steps.extend([x.stride(ax), out.stride(ax)]);
    }
    steps.push(x.stride(nbatch));

    let args = [x.ptr() as *mut f64, out.ptr_mut()];
    unsafe { kernels::norm_loop(&args, &dims, &steps, nbatch, nc) };
    Ok(())
}

/// Batch-free [`norm_into`]: rank-1 input, returns the norm.
pub fn norm(x: &StridedView<'_, f64>, nc: &Numerics<f64>) -> Result<f64> {
    if x.ndim() != 1 {
        return Err(GufuncError::RankMismatch(x.ndim(), 1));
    }
    let mut out = [nc.zero];
    {
        let mut v = StridedViewMut::new(&mut out, &[], &[], 0)?;
        norm_into(&mut v, x, nc)?;
    }
    Ok(out[0])
}
