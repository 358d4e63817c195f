//! One logical vector embedded in a strided buffer.
//!
//! `VectorLayout` records how to step through the vector (length, element
//! stride) plus the precomputed back-stride used to return a cursor to its
//! base after one full pass. This is the traversal discipline every kernel
//! body relies on to reuse the same base pointer across repeated passes.

use num_traits::Float;

/// Layout of one logical vector: length, per-element stride, and the span of
/// a full traversal.
///
/// Invariant: `back_stride == len as isize * stride`. The stride may be zero
/// (a broadcast scalar) or negative (reverse traversal). A zero-length
/// vector is legal; its traversal is empty and rewinding is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorLayout {
    /// Number of elements in the vector.
    pub len: usize,
    /// Element offset between consecutive entries.
    pub stride: isize,
    /// Element offset from start to one-past-end of the vector.
    pub back_stride: isize,
}

impl VectorLayout {
    /// Build a layout for a vector of `len` elements `stride` apart.
    #[inline]
    pub fn new(len: usize, stride: isize) -> Self {
        Self {
            len,
            stride,
            back_stride: len as isize * stride,
        }
    }
}

/// Cursor over a [`VectorLayout`] starting at a caller-supplied base pointer.
///
/// Advancing the cursor `len` times and then calling [`reset`](Self::reset)
/// returns it to its original address.
#[derive(Debug, Clone, Copy)]
pub struct VectorCursor<T> {
    ptr: *const T,
    layout: VectorLayout,
}

impl<T> VectorCursor<T> {
    /// Place a cursor at `ptr`, traversing per `layout`.
    #[inline]
    pub fn new(ptr: *const T, layout: VectorLayout) -> Self {
        Self { ptr, layout }
    }

    /// Current address.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.ptr
    }

    /// Advance to the next element.
    ///
    /// # Safety
    /// The cursor must not be advanced more than `layout.len` times between
    /// resets, and the base pointer must address a buffer that contains the
    /// whole traversal.
    #[inline]
    pub unsafe fn step(&mut self) {
        self.ptr = self.ptr.offset(self.layout.stride);
    }

    /// Rewind to the base address after a full pass.
    ///
    /// # Safety
    /// Must only be called after exactly `layout.len` steps (or zero steps on
    /// a zero-length layout, where this is a no-op).
    #[inline]
    pub unsafe fn reset(&mut self) {
        self.ptr = self.ptr.offset(-self.layout.back_stride);
    }
}

/// Sum of squared coordinate differences between two points.
///
/// The two layouts must have equal logical length; that is the caller's
/// contract and is not checked. Both cursors end the pass rewound, so
/// repeated calls with the same base addresses are safe.
///
/// # Safety
/// `x` and `y` must address buffers containing the full traversals described
/// by `xl` and `yl`.
#[inline]
pub(crate) unsafe fn squared_distance<T: Float>(
    x: *const T,
    y: *const T,
    xl: &VectorLayout,
    yl: &VectorLayout,
) -> T {
    let mut cx = VectorCursor::new(x, *xl);
    let mut cy = VectorCursor::new(y, *yl);
    let mut acc = T::zero();
    for _ in 0..xl.len {
        let separation = *cx.ptr() - *cy.ptr();
        acc = acc + separation * separation;
        cx.step();
        cy.step();
    }
    cx.reset();
    cy.reset();
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_stride_invariant() {
        let l = VectorLayout::new(5, 3);
        assert_eq!(l.back_stride, 15);
        let l = VectorLayout::new(4, -2);
        assert_eq!(l.back_stride, -8);
        let l = VectorLayout::new(0, 7);
        assert_eq!(l.back_stride, 0);
    }

    #[test]
    fn test_cursor_full_pass_rewinds() {
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let layout = VectorLayout::new(3, 2);
        let mut c = VectorCursor::new(data.as_ptr(), layout);
        let mut seen = Vec::new();
        unsafe {
            for _ in 0..layout.len {
                seen.push(*c.ptr());
                c.step();
            }
            c.reset();
        }
        assert_eq!(seen, vec![1.0, 3.0, 5.0]);
        assert_eq!(c.ptr(), data.as_ptr());
    }

    #[test]
    fn test_cursor_zero_len_reset_noop() {
        let data = [1.0f64];
        let mut c = VectorCursor::new(data.as_ptr(), VectorLayout::new(0, 5));
        unsafe { c.reset() };
        assert_eq!(c.ptr(), data.as_ptr());
    }

    #[test]
    fn test_squared_distance_contiguous() {
        let a = [0.0f64, 0.0];
        let b = [3.0f64, 4.0];
        let l = VectorLayout::new(2, 1);
        let d = unsafe { squared_distance(a.as_ptr(), b.as_ptr(), &l, &l) };
        assert_eq!(d, 25.0);
    }

    #[test]
    fn test_squared_distance_mixed_strides() {
        // a strided forwards by 2, b traversed in reverse
        let a = [1.0f64, 9.0, 2.0, 9.0, 3.0];
        let b = [6.0f64, 5.0, 4.0];
        let la = VectorLayout::new(3, 2);
        let lb = VectorLayout::new(3, -1);
        let d = unsafe { squared_distance(a.as_ptr(), b.as_ptr().offset(2), &la, &lb) };
        // (1-4)^2 + (2-5)^2 + (3-6)^2
        assert_eq!(d, 27.0);
    }

    #[test]
    fn test_squared_distance_repeat_call_same_bases() {
        let a = [1.0f64, 2.0, 3.0];
        let b = [4.0f64, 6.0, 8.0];
        let l = VectorLayout::new(3, 1);
        let d1 = unsafe { squared_distance(a.as_ptr(), b.as_ptr(), &l, &l) };
        let d2 = unsafe { squared_distance(a.as_ptr(), b.as_ptr(), &l, &l) };
        assert_eq!(d1, d2);
        assert_eq!(d1, 9.0 + 16.0 + 25.0);
    }

    #[test]
    fn test_squared_distance_zero_length() {
        let a = [1.0f64];
        let l = VectorLayout::new(0, 1);
        let d = unsafe { squared_distance(a.as_ptr(), a.as_ptr(), &l, &l) };
        assert_eq!(d, 0.0);
    }
}
