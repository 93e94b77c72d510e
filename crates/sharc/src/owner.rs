//! Owner-based ordering.
//!
//! Two pointers are ordered by the address of the control block they share
//! ownership through, regardless of their pointee types or stored pointers.
//! An aliasing `SharedPtr` and a `WeakPtr` to the same block compare equal.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::shared::SharedPtr;
use crate::weak::WeakPtr;

mod private {
    pub trait Sealed {}
}

/// Pointers that share ownership through a control block.
///
/// # Examples
///
/// ```
/// use sharc::{OwnerBased, SharedPtr};
///
/// struct Pair { left: i32, right: i32 }
///
/// let pair = SharedPtr::new(Pair { left: 1, right: 2 });
/// let left = SharedPtr::map(&pair, |p| &p.left);
/// let right = SharedPtr::map(&pair, |p| &p.right);
///
/// assert!(left.owner_eq(&right));
/// assert!(!left.owner_before(&right) && !right.owner_before(&left));
/// assert!(right.owner_eq(&pair.downgrade()));
/// ```
pub trait OwnerBased: private::Sealed {
    /// Address of the control block, or null if there is none.
    fn owner_addr(&self) -> *const ();

    /// Strict weak ordering by control block.
    fn owner_before<O: OwnerBased + ?Sized>(&self, other: &O) -> bool {
        self.owner_addr() < other.owner_addr()
    }

    /// Total ordering by control block.
    fn owner_cmp<O: OwnerBased + ?Sized>(&self, other: &O) -> Ordering {
        self.owner_addr().cmp(&other.owner_addr())
    }

    /// Returns `true` if both share the same control block (or both have
    /// none).
    fn owner_eq<O: OwnerBased + ?Sized>(&self, other: &O) -> bool {
        self.owner_addr() == other.owner_addr()
    }
}

impl<T: ?Sized> private::Sealed for SharedPtr<T> {}
impl<T: ?Sized> private::Sealed for WeakPtr<T> {}

impl<T: ?Sized> OwnerBased for SharedPtr<T> {
    fn owner_addr(&self) -> *const () {
        self.handle().addr().cast::<()>()
    }
}

impl<T: ?Sized> OwnerBased for WeakPtr<T> {
    fn owner_addr(&self) -> *const () {
        self.handle().addr().cast::<()>()
    }
}

/// Wraps a pointer so that comparisons and hashing use its owner.
///
/// Useful as a map or set key when the identity of the shared object
/// matters rather than its value or stored pointer. A `WeakPtr` key stays
/// usable after the pointee has expired.
///
/// ```
/// use std::collections::BTreeSet;
/// use sharc::{OwnerKey, SharedPtr};
///
/// let a = SharedPtr::new(1);
/// let mut seen = BTreeSet::new();
/// assert!(seen.insert(OwnerKey(a.downgrade())));
/// assert!(!seen.insert(OwnerKey(a.downgrade())));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OwnerKey<P>(pub P);

impl<P: OwnerBased> PartialEq for OwnerKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner_eq(&other.0)
    }
}

impl<P: OwnerBased> Eq for OwnerKey<P> {}

impl<P: OwnerBased> PartialOrd for OwnerKey<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: OwnerBased> Ord for OwnerKey<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.owner_cmp(&other.0)
    }
}

impl<P: OwnerBased> Hash for OwnerKey<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner_addr().hash(state);
    }
}
