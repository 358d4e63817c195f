//! Dynamic-rank strided views over borrowed slices.
//!
//! Operands enter the kernel layer through these views: a base pointer plus
//! per-dimension sizes and element strides. Strides may be zero (broadcast a
//! scalar along an axis) or negative (reverse traversal). All reachable
//! offsets are validated against the backing slice at construction, so the
//! raw pointer arithmetic inside the kernel loops never leaves the buffer.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::{GufuncError, Result};

/// Validate that all accessed offsets stay within `[0, len)`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: isize) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(GufuncError::StrideLengthMismatch);
    }
    // Empty array - no access needed
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    // Compute min and max offsets
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(GufuncError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(GufuncError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(GufuncError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 {
        return Err(GufuncError::OffsetOverflow);
    }
    if max_offset as usize >= len {
        return Err(GufuncError::OffsetOverflow);
    }
    Ok(())
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

// ============================================================================
// StridedView
// ============================================================================

/// Immutable dynamic-rank strided view.
///
/// A rank-0 view (`dims == []`) addresses a single scalar; this is how the
/// scalar outputs of `pdist_ratio`, `cdist_ratio` and `norm` are passed when
/// there are no batch dimensions.
pub struct StridedView<'a, T> {
    ptr: *const T,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
    _marker: PhantomData<&'a [T]>,
}

unsafe impl<T: Sync> Send for StridedView<'_, T> {}
unsafe impl<T: Sync> Sync for StridedView<'_, T> {}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for StridedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedView")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedView<'a, T> {
    /// Create a new immutable strided view over a borrowed slice.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        let ptr = unsafe { data.as_ptr().offset(offset) };
        Ok(Self {
            ptr,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
            _marker: PhantomData,
        })
    }

    /// Create a view without bounds checking.
    ///
    /// # Safety
    /// The caller must ensure all index combinations stay within bounds.
    pub unsafe fn new_unchecked(
        data: &'a [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Self {
        let ptr = data.as_ptr().offset(offset);
        Self {
            ptr,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Stride of dimension `dim`, in elements.
    #[inline]
    pub fn stride(&self, dim: usize) -> isize {
        self.strides[dim]
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Raw const pointer to the element at the view's base offset.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.ptr
    }

    /// Permute dimensions (zero-copy transpose generalization).
    pub fn permute(&self, perm: &[usize]) -> Result<StridedView<'a, T>> {
        let rank = self.dims.len();
        if perm.len() != rank {
            return Err(GufuncError::RankMismatch(perm.len(), rank));
        }
        let mut seen = vec![false; rank];
        for &p in perm {
            if p >= rank || seen[p] {
                return Err(GufuncError::ShapeMismatch(
                    perm.to_vec(),
                    (0..rank).collect(),
                ));
            }
            seen[p] = true;
        }
        let new_dims: Vec<usize> = perm.iter().map(|&p| self.dims[p]).collect();
        let new_strides: Vec<isize> = perm.iter().map(|&p| self.strides[p]).collect();
        Ok(StridedView {
            ptr: self.ptr,
            dims: Arc::from(new_dims),
            strides: Arc::from(new_strides),
            offset: self.offset,
            _marker: PhantomData,
        })
    }
}

impl<T: Copy> StridedView<'_, T> {
    /// Get an element.
    ///
    /// # Panics
    /// Panics if `indices` has the wrong length or is out of bounds.
    pub fn get(&self, indices: &[usize]) -> T {
        assert_eq!(indices.len(), self.dims.len(), "wrong number of indices");
        let mut idx = 0isize;
        for (i, &index) in indices.iter().enumerate() {
            assert!(
                index < self.dims[i],
                "index {} out of bounds for dim {}",
                index,
                self.dims[i]
            );
            idx += index as isize * self.strides[i];
        }
        unsafe { *self.ptr.offset(idx) }
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Mutable dynamic-rank strided view.
pub struct StridedViewMut<'a, T> {
    ptr: *mut T,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for StridedViewMut<'_, T> {}

impl<T> std::fmt::Debug for StridedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedViewMut")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a new mutable strided view over a borrowed slice.
    ///
    /// Note that overlapping strides (e.g. a zero stride on a dimension of
    /// size > 1) are accepted here; writing through such a view is the
    /// caller's responsibility, just as aliasing output operands is in any
    /// gufunc call.
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        let ptr = unsafe { data.as_mut_ptr().offset(offset) };
        Ok(Self {
            ptr,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
            _marker: PhantomData,
        })
    }

    /// Create a view without bounds checking.
    ///
    /// # Safety
    /// The caller must ensure all index combinations stay within bounds.
    pub unsafe fn new_unchecked(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Self {
        let ptr = data.as_mut_ptr().offset(offset);
        Self {
            ptr,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Stride of dimension `dim`, in elements.
    #[inline]
    pub fn stride(&self, dim: usize) -> isize {
        self.strides[dim]
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Raw mutable pointer to the element at the view's base offset.
    #[inline]
    pub fn ptr_mut(&mut self) -> *mut T {
        self.ptr
    }
}

impl<T: Copy> StridedViewMut<'_, T> {
    /// Get an element.
    ///
    /// # Panics
    /// Panics if `indices` has the wrong length or is out of bounds.
    pub fn get(&self, indices: &[usize]) -> T {
        assert_eq!(indices.len(), self.dims.len(), "wrong number of indices");
        let idx = self.checked_linear_index(indices);
        unsafe { *self.ptr.offset(idx) }
    }

    /// Set an element.
    ///
    /// # Panics
    /// Panics if `indices` has the wrong length or is out of bounds.
    pub fn set(&mut self, indices: &[usize], value: T) {
        assert_eq!(indices.len(), self.dims.len(), "wrong number of indices");
        let idx = self.checked_linear_index(indices);
        unsafe { *self.ptr.offset(idx) = value }
    }

    fn checked_linear_index(&self, indices: &[usize]) -> isize {
        let mut idx = 0isize;
        for (i, &index) in indices.iter().enumerate() {
            assert!(
                index < self.dims[i],
                "index {} out of bounds for dim {}",
                index,
                self.dims[i]
            );
            idx += index as isize * self.strides[i];
        }
        idx
    }
}
