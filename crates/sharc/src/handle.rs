//! Counted references to a `ControlBlock`.
//!
//! `StrongHandle` and `WeakHandle` are the only places where the block's
//! counters are acquired and released. Pointer types pair one of them with
//! a typed view and never touch the counters directly.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;

use crate::block::ControlBlock;

// ============================================================================
// `StrongHandle`
// ============================================================================

/// One strong reference to a control block, or none.
pub(crate) struct StrongHandle {
    block: Option<NonNull<ControlBlock>>,
}

impl StrongHandle {
    /// A handle that refers to no block.
    pub(crate) const fn empty() -> Self {
        Self { block: None }
    }

    /// Take over the initial strong reference of a freshly allocated block.
    ///
    /// # Safety
    ///
    /// The caller must own one strong reference to `block` and transfer it.
    pub(crate) const unsafe fn adopt(block: NonNull<ControlBlock>) -> Self {
        Self { block: Some(block) }
    }

    /// Promote a weak handle without checking that the pointee is alive.
    ///
    /// The returned handle refers to the weak handle's block even if the
    /// promotion did not take.
    ///
    /// # Safety
    ///
    /// If the block was already expired the returned handle holds no strong
    /// reference. The caller must check `strong_count() > 0` before trusting
    /// it, and forget it rather than drop it otherwise.
    pub(crate) unsafe fn from_weak_unchecked(weak: &WeakHandle) -> Self {
        if let Some(block) = weak.block {
            // SAFETY: the weak reference keeps the block allocated.
            unsafe { block.as_ref() }.add_strong_if_alive();
        }
        Self { block: weak.block }
    }

    /// Number of strong owners of the block, or 0 for an empty handle.
    pub(crate) fn strong_count(&self) -> usize {
        self.block
            // SAFETY: our strong reference keeps the block allocated.
            .map_or(0, |block| unsafe { block.as_ref() }.strong_count())
    }

    /// Raw weak count of the block, or 0 for an empty handle.
    pub(crate) fn weak_count(&self) -> usize {
        self.block
            // SAFETY: our strong reference keeps the block allocated.
            .map_or(0, |block| unsafe { block.as_ref() }.weak_count())
    }

    /// Weak references held by `WeakPtr`s, or 0 for an empty handle.
    pub(crate) fn observer_count(&self) -> usize {
        self.block
            // SAFETY: our strong reference keeps the block allocated.
            .map_or(0, |block| unsafe { block.as_ref() }.observer_count())
    }

    /// Address of the block, used as the owner identity.
    pub(crate) fn addr(&self) -> *const ControlBlock {
        block_addr(self.block)
    }
}

impl Clone for StrongHandle {
    fn clone(&self) -> Self {
        if let Some(block) = self.block {
            // SAFETY: our strong reference keeps the block allocated.
            unsafe { block.as_ref() }.add_strong();
        }
        Self { block: self.block }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.block == source.block {
            return;
        }
        // Acquire before release: `source` may be owned by our own pointee.
        *self = source.clone();
    }
}

impl Drop for StrongHandle {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            // SAFETY: we own exactly one strong reference and give it up.
            unsafe { ControlBlock::release_strong(block) };
        }
    }
}

impl Default for StrongHandle {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// `WeakHandle`
// ============================================================================

/// One weak reference to a control block, or none.
pub(crate) struct WeakHandle {
    block: Option<NonNull<ControlBlock>>,
}

impl WeakHandle {
    /// A handle that refers to no block.
    pub(crate) const fn empty() -> Self {
        Self { block: None }
    }

    /// Add a weak reference to the block `strong` refers to.
    pub(crate) fn from_strong(strong: &StrongHandle) -> Self {
        if let Some(block) = strong.block {
            // SAFETY: the strong reference keeps the block allocated.
            unsafe { block.as_ref() }.add_weak();
        }
        Self {
            block: strong.block,
        }
    }

    /// Number of strong owners of the block, or 0 for an empty handle.
    pub(crate) fn strong_count(&self) -> usize {
        self.block
            // SAFETY: our weak reference keeps the block allocated.
            .map_or(0, |block| unsafe { block.as_ref() }.strong_count())
    }

    /// Raw weak count of the block, or 0 for an empty handle.
    pub(crate) fn weak_count(&self) -> usize {
        self.block
            // SAFETY: our weak reference keeps the block allocated.
            .map_or(0, |block| unsafe { block.as_ref() }.weak_count())
    }

    /// Weak references held by `WeakPtr`s, or 0 for an empty handle.
    pub(crate) fn observer_count(&self) -> usize {
        self.block
            // SAFETY: our weak reference keeps the block allocated.
            .map_or(0, |block| unsafe { block.as_ref() }.observer_count())
    }

    /// Count a promotion that was refused because the pointee is gone.
    ///
    /// Nothing is recorded for an empty handle.
    pub(crate) fn record_expired_lock(&self) {
        if let Some(block) = self.block {
            // SAFETY: our weak reference keeps the block allocated.
            unsafe { block.as_ref() }.record_expired_lock();
        }
    }

    /// Address of the block, used as the owner identity.
    pub(crate) fn addr(&self) -> *const ControlBlock {
        block_addr(self.block)
    }
}

impl Clone for WeakHandle {
    fn clone(&self) -> Self {
        if let Some(block) = self.block {
            // SAFETY: our weak reference keeps the block allocated.
            unsafe { block.as_ref() }.add_weak();
        }
        Self { block: self.block }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.block == source.block {
            return;
        }
        *self = source.clone();
    }
}

impl Drop for WeakHandle {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            // SAFETY: we own exactly one weak reference and give it up.
            unsafe { ControlBlock::release_weak(block) };
        }
    }
}

impl Default for WeakHandle {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Identity comparisons
// ============================================================================

fn block_addr(block: Option<NonNull<ControlBlock>>) -> *const ControlBlock {
    block.map_or(std::ptr::null(), |block| block.as_ptr().cast_const())
}

macro_rules! impl_identity {
    ($handle:ty) => {
        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                self.addr() == other.addr()
            }
        }

        impl Eq for $handle {}

        impl PartialOrd for $handle {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $handle {
            fn cmp(&self, other: &Self) -> Ordering {
                self.addr().cmp(&other.addr())
            }
        }

        impl Hash for $handle {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.addr().hash(state);
            }
        }

        impl fmt::Debug for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("block", &self.addr())
                    .field("strong", &self.strong_count())
                    .field("weak", &self.weak_count())
                    .finish()
            }
        }
    };
}

impl_identity!(StrongHandle);
impl_identity!(WeakHandle);
