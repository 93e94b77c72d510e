//! Error types for fallible pointer construction.

use std::alloc::Layout;
use std::fmt;

/// The allocator could not satisfy a request.
///
/// Carries the layout that failed so callers can forward it to
/// [`std::alloc::handle_alloc_error`] if they want fail-fast behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    /// Create an error for a failed request of `layout`.
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// The layout of the request that failed.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory allocation of {} bytes (align {}) failed",
            self.layout.size(),
            self.layout.align()
        )
    }
}

impl std::error::Error for AllocError {}

/// A weak pointer was promoted after its pointee had been disposed.
///
/// Returned by `SharedPtr::try_from(&weak)`. [`WeakPtr::lock`] reports the
/// same condition as a null `SharedPtr` instead.
///
/// [`WeakPtr::lock`]: crate::WeakPtr::lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiredError;

impl fmt::Display for ExpiredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("weak pointer has expired")
    }
}

impl std::error::Error for ExpiredError {}
