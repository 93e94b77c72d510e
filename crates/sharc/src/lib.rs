//! Shared and weak smart pointers with an explicit control block.
//!
//! `sharc` provides `SharedPtr<T>`, `WeakPtr<T>` and `UniquePtr<T, A>` for
//! deterministic, single-threaded shared ownership. Each managed pointee is
//! tracked by a **control block** holding a strong count (owners keeping the
//! pointee alive) and a weak count (observers keeping the block itself
//! alive).
//!
//! # Features
//!
//! - **Deterministic destruction**: the pointee is dropped exactly when the
//!   last strong owner goes away
//! - **Safe observation**: `WeakPtr::lock` never resurrects an expired
//!   pointee
//! - **Aliasing**: a `SharedPtr` can point at a sub-object while sharing
//!   ownership of the whole
//! - **Pluggable allocation**: pointees and blocks can come from any
//!   [`RawAlloc`]
//!
//! # Quick Start
//!
//! ```
//! use sharc::{SharedPtr, WeakPtr};
//!
//! let owner = SharedPtr::new(String::from("hello"));
//! let observer: WeakPtr<String> = owner.downgrade();
//!
//! assert_eq!(owner.use_count(), 1);
//! assert_eq!(owner.weak_count(), 1);
//! assert_eq!(*observer.lock(), "hello");
//!
//! drop(owner);
//! assert!(observer.expired());
//! ```
//!
//! # Aliasing
//!
//! ```
//! use sharc::SharedPtr;
//!
//! struct Config { name: String, retries: u32 }
//!
//! let config = SharedPtr::new(Config { name: "db".into(), retries: 3 });
//! let retries = SharedPtr::map(&config, |c| &c.retries);
//! assert_eq!(config.use_count(), 2);
//!
//! drop(config);
//! assert_eq!(*retries, 3);
//! ```
//!
//! # Thread Safety
//!
//! All pointer types are `!Send` and `!Sync`. Counters are plain cells and
//! must only be touched from the thread that created the block.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod alloc;
mod block;
mod cast;
mod error;
mod handle;
mod metrics;
mod owner;
mod shared;
mod tracing;
mod unique;
mod weak;

// Re-export public API
pub use alloc::{Global, RawAlloc};
pub use cast::{
    const_pointer_cast, dynamic_pointer_cast, reinterpret_pointer_cast, static_pointer_cast,
    Downcast,
};
pub use error::{AllocError, ExpiredError};
pub use metrics::{rc_metrics, reset_rc_metrics, RcMetrics};
pub use owner::{OwnerBased, OwnerKey};
pub use shared::SharedPtr;
pub use unique::UniquePtr;
pub use weak::WeakPtr;

#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod test_util {
    use crate::{SharedPtr, WeakPtr};

    /// Raw `(strong, weak)` counters of the block behind `sp`.
    ///
    /// The weak counter includes the implicit reference held while the
    /// pointee is alive. A pointer without a block reports `(0, 0)`.
    pub fn shared_block_counts<T: ?Sized>(sp: &SharedPtr<T>) -> (usize, usize) {
        let handle = sp.handle();
        (handle.strong_count(), handle.weak_count())
    }

    /// Raw `(strong, weak)` counters of the block behind `wp`.
    pub fn weak_block_counts<T: ?Sized>(wp: &WeakPtr<T>) -> (usize, usize) {
        let handle = wp.handle();
        (handle.strong_count(), handle.weak_count())
    }

    /// Address of the block behind `sp`, or null.
    pub fn block_addr<T: ?Sized>(sp: &SharedPtr<T>) -> *const u8 {
        sp.handle().addr().cast::<u8>()
    }
}
