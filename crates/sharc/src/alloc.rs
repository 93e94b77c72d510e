//! Allocator capability consumed by the pointer types.
//!
//! The crate never decides where memory comes from. Pointees and control
//! blocks are obtained through a [`RawAlloc`] implementation chosen at
//! construction time; [`Global`] forwards to the process allocator.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::AllocError;
use crate::metrics;

/// A source of raw memory.
///
/// Implementations are zero-sized marker types: the functions are associated
/// functions so that a control block can remember how to free itself with a
/// plain function pointer.
///
/// # Safety
///
/// `allocate` must return memory valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, that stays valid until
/// it is passed to `deallocate` with the same layout. Zero-sized layouts are
/// never passed to either function.
pub unsafe trait RawAlloc {
    /// Allocate a block of memory for `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the request cannot be satisfied.
    fn allocate(layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block of memory to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` with the same `layout`
    /// and must not have been deallocated already.
    unsafe fn deallocate(ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator (`std::alloc`).
///
/// Memory obtained from `Box` may be released through `Global`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl RawAlloc for Global {
    fn allocate(layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: zero-sized layouts are filtered out by the callers.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    unsafe fn deallocate(ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: the caller guarantees `ptr` came from `allocate(layout)`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
    }
}

/// Allocate storage for `value` through `A` and move it in.
///
/// Zero-sized values get a dangling, well-aligned pointer and never reach
/// the allocator. On failure `value` is dropped.
pub(crate) fn allocate_value<X, A: RawAlloc>(value: X) -> Result<NonNull<X>, AllocError> {
    let layout = Layout::new::<X>();
    let ptr = if layout.size() == 0 {
        NonNull::<X>::dangling()
    } else {
        match A::allocate(layout) {
            Ok(ptr) => ptr.cast::<X>(),
            Err(err) => {
                metrics::record_alloc_failure();
                return Err(err);
            }
        }
    };
    // SAFETY: `ptr` is valid for writes of `X` and properly aligned.
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

/// Drop the value at `ptr` in place and return its storage to `A`.
///
/// # Safety
///
/// `ptr` must point to a live value allocated through `A` (or produced by
/// [`allocate_value`] with `A`), and must not be used afterwards.
pub(crate) unsafe fn destroy_value<X: ?Sized, A: RawAlloc>(ptr: NonNull<X>) {
    // SAFETY: the value is still live here, so its layout can be read.
    let layout = unsafe { Layout::for_value(ptr.as_ref()) };
    // SAFETY: the caller hands over exclusive ownership of the value.
    unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    if layout.size() != 0 {
        // SAFETY: the storage was obtained from `A` with this layout.
        unsafe { A::deallocate(ptr.cast::<u8>(), layout) };
    }
}
