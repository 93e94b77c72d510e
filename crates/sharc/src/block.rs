//! The control block shared by every strong and weak pointer to a pointee.

#![allow(clippy::ptr_as_ptr)]

use std::any::type_name;
use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::alloc::{allocate_value, destroy_value, RawAlloc};
use crate::error::AllocError;
use crate::metrics;
use crate::tracing::internal as trace;
use crate::tracing::BlockId;

// ============================================================================
// `ControlBlock` - Type-erased counters
// ============================================================================

/// Bookkeeping for one managed pointee.
///
/// `weak` includes one implicit reference held on behalf of all strong
/// owners together. It is released when the pointee is disposed, so the
/// block is freed by whichever of the last strong or last weak release
/// happens later.
#[repr(C)]
pub(crate) struct ControlBlock {
    strong: Cell<usize>,
    weak: Cell<usize>,
    /// Whether `weak` still includes the implicit reference. Stays set
    /// while the pointee's destructor runs, after `strong` reached zero.
    implicit_weak: Cell<bool>,
    /// Drops the pointee. Called exactly once, on strong 1 -> 0.
    dispose_fn: unsafe fn(NonNull<ControlBlock>),
    /// Frees the block's own allocation.
    destroy_fn: unsafe fn(NonNull<ControlBlock>),
    id: BlockId,
}

impl ControlBlock {
    /// Allocate a block owning `pointee`, with strong = 1 and weak = 1.
    ///
    /// The block is allocated through `A`, and the pointee will be destroyed
    /// through `A` as well.
    ///
    /// # Safety
    ///
    /// `pointee` must be a live value allocated through `A` that nothing else
    /// owns. On success the block takes ownership of it; on failure ownership
    /// stays with the caller.
    pub(crate) unsafe fn allocate<T: ?Sized, A: RawAlloc>(
        pointee: NonNull<T>,
    ) -> Result<NonNull<Self>, AllocError> {
        let id = trace::next_block_id();
        let block = allocate_value::<BlockBox<T, A>, A>(BlockBox {
            header: Self {
                strong: Cell::new(1),
                weak: Cell::new(1),
                implicit_weak: Cell::new(true),
                dispose_fn: BlockBox::<T, A>::dispose,
                destroy_fn: BlockBox::<T, A>::destroy,
                id,
            },
            pointee: Cell::new(Some(pointee)),
            _alloc: PhantomData,
        })?;

        metrics::record_block_allocated();
        trace::block_created(id, type_name::<T>());

        Ok(block.cast::<Self>())
    }

    /// Number of strong owners.
    #[inline]
    pub(crate) fn strong_count(&self) -> usize {
        self.strong.get()
    }

    /// Number of weak references, including the implicit one while the
    /// pointee is alive.
    #[inline]
    pub(crate) fn weak_count(&self) -> usize {
        self.weak.get()
    }

    /// Number of weak references held by `WeakPtr`s, without the implicit
    /// one.
    #[inline]
    pub(crate) fn observer_count(&self) -> usize {
        self.weak.get() - usize::from(self.implicit_weak.get())
    }

    /// Add a strong owner. The caller must already hold one.
    #[inline]
    pub(crate) fn add_strong(&self) {
        debug_assert!(self.strong.get() > 0, "add_strong on an expired block");
        self.strong.set(self.strong.get() + 1);
    }

    /// Add a strong owner only if the pointee is still alive.
    ///
    /// An expired block stays expired.
    pub(crate) fn add_strong_if_alive(&self) -> bool {
        let strong = self.strong.get();
        if strong == 0 {
            self.record_expired_lock();
            return false;
        }
        self.strong.set(strong + 1);
        metrics::record_lock(true);
        trace::lock_attempt(self.id, true);
        true
    }

    /// Record a promotion attempt that found the pointee already disposed.
    pub(crate) fn record_expired_lock(&self) {
        metrics::record_lock(false);
        trace::lock_attempt(self.id, false);
    }

    /// Add a weak reference.
    #[inline]
    pub(crate) fn add_weak(&self) {
        self.weak.set(self.weak.get() + 1);
    }

    /// Drop one strong owner.
    ///
    /// The last one disposes the pointee and then gives up the implicit
    /// weak reference, which may free the block.
    ///
    /// # Safety
    ///
    /// `this` must be a live block and the caller must own one strong
    /// reference, which is consumed. `this` may dangle on return.
    pub(crate) unsafe fn release_strong(this: NonNull<Self>) {
        // SAFETY: the caller's strong reference keeps the block allocated.
        let block = unsafe { this.as_ref() };
        let strong = block.strong.get();
        debug_assert!(strong > 0, "strong count underflow");
        block.strong.set(strong - 1);

        if strong == 1 {
            metrics::record_pointee_disposed();
            trace::pointee_disposed(block.id);
            let dispose = block.dispose_fn;
            // SAFETY: strong just reached zero, so this is the only disposal.
            // The implicit weak reference keeps the block allocated while
            // the pointee's destructor runs.
            unsafe {
                dispose(this);
                this.as_ref().implicit_weak.set(false);
                Self::release_weak(this);
            }
        }
    }

    /// Drop one weak reference; the last one frees the block.
    ///
    /// # Safety
    ///
    /// `this` must be a live block and the caller must own one weak
    /// reference (or the implicit one), which is consumed. `this` may
    /// dangle on return.
    pub(crate) unsafe fn release_weak(this: NonNull<Self>) {
        let (weak, id, destroy) = {
            // SAFETY: the caller's weak reference keeps the block allocated.
            let block = unsafe { this.as_ref() };
            let weak = block.weak.get();
            debug_assert!(weak > 0, "weak count underflow");
            block.weak.set(weak - 1);
            (weak, block.id, block.destroy_fn)
        };

        if weak == 1 {
            debug_assert_eq!(
                // SAFETY: not freed yet.
                unsafe { this.as_ref() }.strong.get(),
                0,
                "block freed while strong owners remain"
            );
            metrics::record_block_freed();
            trace::block_freed(id);
            // SAFETY: no references of any kind remain.
            unsafe { destroy(this) };
        }
    }
}

// ============================================================================
// `BlockBox` - The allocation behind a `ControlBlock`
// ============================================================================

/// A control block header followed by the typed pointee slot.
///
/// `repr(C)` puts the header at offset zero, so a `NonNull<ControlBlock>`
/// can be cast back to the full allocation by the type-erased functions.
#[repr(C)]
struct BlockBox<T: ?Sized, A: RawAlloc> {
    header: ControlBlock,
    pointee: Cell<Option<NonNull<T>>>,
    _alloc: PhantomData<A>,
}

impl<T: ?Sized, A: RawAlloc> BlockBox<T, A> {
    unsafe fn dispose(block: NonNull<ControlBlock>) {
        let this = block.cast::<Self>();
        // SAFETY: `block` was produced by `ControlBlock::allocate::<T, A>`.
        let pointee = unsafe { (*this.as_ptr()).pointee.take() };
        if let Some(ptr) = pointee {
            // SAFETY: the block owns the pointee, which was allocated with `A`.
            unsafe { destroy_value::<T, A>(ptr) };
        }
    }

    unsafe fn destroy(block: NonNull<ControlBlock>) {
        // SAFETY: the block itself was allocated as a `BlockBox<T, A>` via `A`.
        unsafe { destroy_value::<Self, A>(block.cast::<Self>()) };
    }
}
