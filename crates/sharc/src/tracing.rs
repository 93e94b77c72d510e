//! Control-block tracing support.
//!
//! When the `tracing` feature is enabled, this module emits structured
//! events for the control-block lifecycle. Without the feature every helper
//! is an empty inline function, so call sites stay unconditional.

#[cfg(feature = "tracing")]
pub mod internal {
    use std::cell::Cell;

    /// Stable identifier for a control block.
    ///
    /// Used to correlate the creation, disposal and release events of a
    /// single block. Identifiers are handed out per thread, starting at 1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockId(pub u64);

    thread_local! {
        static NEXT_BLOCK_ID: Cell<u64> = const { Cell::new(1) };
    }

    /// Generate the next block identifier for this thread.
    pub fn next_block_id() -> BlockId {
        NEXT_BLOCK_ID
            .try_with(|next| {
                let id = next.get();
                next.set(id.wrapping_add(1));
                BlockId(id)
            })
            .unwrap_or(BlockId(0))
    }

    /// A block was created for a freshly adopted pointee.
    pub fn block_created(id: BlockId, pointee: &'static str) {
        tracing::trace!(block_id = id.0, pointee, "block_created");
    }

    /// The last strong reference went away and the pointee was dropped.
    pub fn pointee_disposed(id: BlockId) {
        tracing::debug!(block_id = id.0, "pointee_disposed");
    }

    /// The last weak reference went away and the block was freed.
    pub fn block_freed(id: BlockId) {
        tracing::trace!(block_id = id.0, "block_freed");
    }

    /// A weak reference attempted promotion to a strong one.
    pub fn lock_attempt(id: BlockId, success: bool) {
        if success {
            tracing::trace!(block_id = id.0, "lock");
        } else {
            tracing::debug!(block_id = id.0, "lock_expired");
        }
    }
}

#[cfg(not(feature = "tracing"))]
pub mod internal {
    /// Stub type when tracing is disabled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockId(pub u64);

    /// Stub function when tracing is disabled.
    #[inline(always)]
    pub const fn next_block_id() -> BlockId {
        BlockId(0)
    }

    #[inline(always)]
    pub const fn block_created(_id: BlockId, _pointee: &'static str) {}

    #[inline(always)]
    pub const fn pointee_disposed(_id: BlockId) {}

    #[inline(always)]
    pub const fn block_freed(_id: BlockId) {}

    #[inline(always)]
    pub const fn lock_attempt(_id: BlockId, _success: bool) {}
}

pub use internal::BlockId;
