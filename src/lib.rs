//! Generalized batched kernels over strided multidimensional views.
//!
//! This crate implements a small "gufunc" layer: numeric kernels with a fixed
//! core dimensionality per operand that are looped over any additional leading
//! batch dimensions, directly on arbitrarily strided f64 buffers (strides may
//! be zero or negative) with no copies into contiguous layout.
//!
//! # Core Types
//!
//! - [`StridedView`] / [`StridedViewMut`]: Zero-copy strided views over existing
//!   data, bounds-validated at construction
//! - [`VectorLayout`] / [`VectorCursor`]: One logical vector embedded in a
//!   strided buffer, with the advance/rewind (back-stride) traversal discipline
//! - [`Numerics`]: The immutable numeric constants (infinity, zero) constructed
//!   once at startup and passed by reference into every kernel invocation
//!
//! # Kernels
//!
//! | name | signature | outputs |
//! |---|---|---|
//! | [`pdist_ratio_into`] | `(d,m),(d,n)->(),()` | min/max pairwise distance ratio |
//! | [`cdist_ratio_into`] | `(d1,m),(d2,m),(d1,n),(d2,n)->(),()` | min/max cross-wise distance ratio |
//! | [`matmul_into`] | `(m,n),(n,p)->(m,p)` | matrix product |
//! | [`norm_into`] | `(n)->()` | Euclidean norm |
//!
//! All kernels follow IEEE-754 semantics: division by zero yields infinity or
//! NaN rather than an error, and no kernel body panics.
//!
//! # Example
//!
//! ```rust
//! use strided_gufuncs::{matmul_into, Numerics, StridedView, StridedViewMut};
//!
//! let nc = Numerics::new();
//! let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3, row-major
//! let y = vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]; // 3x2, row-major
//! let mut z = vec![0.0; 4];
//!
//! {
//!     let xv = StridedView::new(&x, &[2, 3], &[3, 1], 0).unwrap();
//!     let yv = StridedView::new(&y, &[3, 2], &[2, 1], 0).unwrap();
//!     let mut zv = StridedViewMut::new(&mut z, &[2, 2], &[2, 1], 0).unwrap();
//!     matmul_into(&mut zv, &xv, &yv, &nc).unwrap();
//! }
//! assert_eq!(z, [1.0, 2.0, 4.0, 5.0]);
//! ```
//!
//! # Registration table
//!
//! [`descriptors`] exposes the four kernels as data (name, signature string,
//! description, arities) plus a raw loop entry point per kernel, for callers
//! that dispatch by name and element type. See [`KernelDescriptor`].

mod batch;
mod kernels;
mod ops;
mod registry;
mod vector;
mod view;

pub use ops::{
    cdist_ratio, cdist_ratio_into, matmul_into, norm, norm_into, pdist_ratio, pdist_ratio_into,
};
pub use registry::{descriptors, find, ElemType, GufuncLoop, KernelDescriptor};
pub use vector::{VectorCursor, VectorLayout};
pub use view::{row_major_strides, StridedView, StridedViewMut};

use num_traits::Float;

/// Numeric constants used to seed the running extrema in the ratio kernels.
///
/// The original implementation initialized these once at module load; here
/// they are an explicitly constructed immutable value the caller creates at
/// startup and passes by reference into every kernel invocation. Never
/// mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numerics<T = f64> {
    /// Positive infinity; initial value of a running minimum.
    pub inf: T,
    /// Zero; initial value of a running maximum and of accumulators.
    pub zero: T,
}

impl<T: Float> Numerics<T> {
    /// Construct the constants for the element type `T`.
    pub fn new() -> Self {
        Self {
            inf: T::infinity(),
            zero: T::zero(),
        }
    }
}

impl<T: Float> Default for Numerics<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors reported by the safe wrapper layer.
///
/// The raw kernel loops themselves never fail; every variant here originates
/// from view construction or from shape validation before a loop is entered.
#[derive(Debug, thiserror::Error)]
pub enum GufuncError {
    /// Operand rank does not match what the kernel signature requires.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Batch shapes are not identical across operands.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// A shared core dimension disagrees between operands.
    #[error("core dimension {name}: {expected} vs {found}")]
    CoreDimMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Integer overflow while computing a view offset.
    #[error("offset overflow while computing pointer")]
    OffsetOverflow,
}

/// Result type for gufunc operations.
pub type Result<T> = std::result::Result<T, GufuncError>;
