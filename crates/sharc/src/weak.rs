//! The `WeakPtr<T>` non-owning observer.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::handle::WeakHandle;
use crate::shared::SharedPtr;

/// A non-owning observer of a [`SharedPtr`]'s pointee.
///
/// Holding a `WeakPtr` keeps the control block allocated but never the
/// pointee. The pointee can only be reached through [`WeakPtr::lock`], which
/// checks that it is still alive.
///
/// # Examples
///
/// ```
/// use sharc::SharedPtr;
///
/// let strong = SharedPtr::new(5);
/// let weak = strong.downgrade();
/// assert!(!weak.expired());
/// assert_eq!(*weak.lock(), 5);
///
/// drop(strong);
/// assert!(weak.expired());
/// assert!(weak.lock().is_null());
/// ```
pub struct WeakPtr<T: ?Sized> {
    handle: WeakHandle,
    /// The stored pointer of the `SharedPtr` this was created from. Only
    /// dereferenced through a successful `lock`.
    ptr: Option<NonNull<T>>,
    _marker: PhantomData<T>,
}

impl<T: ?Sized> WeakPtr<T> {
    /// A weak pointer that observes nothing; it is always expired.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handle: WeakHandle::empty(),
            ptr: None,
            _marker: PhantomData,
        }
    }

    /// Obtain a strong pointer if the pointee is still alive.
    ///
    /// Returns a null [`SharedPtr`] if it has been disposed. Use
    /// `SharedPtr::try_from(&weak)` to get an error instead.
    #[must_use]
    pub fn lock(&self) -> SharedPtr<T> {
        SharedPtr::try_from(self).unwrap_or_default()
    }

    /// Observe a part of the pointee, sharing this pointer's control block.
    ///
    /// `f` runs on a locked pointer. If the pointee is already gone the
    /// result still observes the block but has no stored pointer.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharc::{SharedPtr, WeakPtr};
    ///
    /// let pair = SharedPtr::new((1u8, String::from("right")));
    /// let right: WeakPtr<String> = WeakPtr::map(&pair.downgrade(), |p| &p.1);
    /// assert_eq!(*right.lock(), "right");
    ///
    /// drop(pair);
    /// assert!(right.expired());
    /// ```
    #[must_use]
    pub fn map<U: ?Sized, F: FnOnce(&T) -> &U>(this: &Self, f: F) -> WeakPtr<U> {
        match SharedPtr::<T>::try_from(this) {
            Ok(locked) => SharedPtr::map(&locked, f).downgrade(),
            Err(_) => WeakPtr {
                handle: this.handle.clone(),
                ptr: None,
                _marker: PhantomData,
            },
        }
    }

    /// Returns `true` if the pointee has been disposed (or was never set).
    #[must_use]
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// Number of strong owners of the observed block.
    #[must_use]
    pub fn use_count(&self) -> usize {
        self.handle.strong_count()
    }

    /// Number of `WeakPtr`s observing the block, this one included.
    #[must_use]
    pub fn weak_count(&self) -> usize {
        self.handle.observer_count()
    }

    /// Returns `true` if both observe the same control block (or neither
    /// observes one).
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.handle == other.handle
    }

    /// Stop observing, leaving this pointer empty.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Exchange the observed blocks of two weak pointers.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub(crate) const fn handle(&self) -> &WeakHandle {
        &self.handle
    }

    pub(crate) const fn cached_ptr(&self) -> Option<NonNull<T>> {
        self.ptr
    }
}

impl<T: ?Sized> From<&SharedPtr<T>> for WeakPtr<T> {
    fn from(shared: &SharedPtr<T>) -> Self {
        Self {
            handle: WeakHandle::from_strong(shared.handle()),
            ptr: shared.as_ptr(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Clone for WeakPtr<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.handle.clone_from(&source.handle);
        self.ptr = source.ptr;
    }
}

impl<T: ?Sized> Default for WeakPtr<T> {
    /// Constructs a `WeakPtr` that observes nothing.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for WeakPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Weak)")
    }
}
