//! The `UniquePtr<T, A>` exclusively-owning pointer.
//!
//! A `UniquePtr` owns at most one pointee allocated through `A`. Unlike
//! `Box`, it can be empty, and it can hand its pointee over to a
//! [`SharedPtr`](crate::SharedPtr) in place, ending up empty itself.

use std::alloc::handle_alloc_error;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::alloc::{allocate_value, destroy_value, Global, RawAlloc};
use crate::error::AllocError;

/// An exclusively-owning, nullable pointer to a `T` allocated through `A`.
///
/// # Examples
///
/// ```
/// use sharc::{SharedPtr, UniquePtr};
///
/// let mut unique = UniquePtr::new(7);
/// let shared = SharedPtr::from_unique(&mut unique).unwrap();
///
/// assert!(unique.is_null());
/// assert_eq!(*shared, 7);
/// assert_eq!(shared.use_count(), 1);
/// ```
pub struct UniquePtr<T: ?Sized, A: RawAlloc = Global> {
    ptr: Option<NonNull<T>>,
    _marker: PhantomData<(Box<T>, A)>,
}

impl<T> UniquePtr<T> {
    /// Allocate `value` with the global allocator.
    ///
    /// Aborts through [`handle_alloc_error`] if the allocation fails.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::try_new_in(value, Global).unwrap_or_else(|err| handle_alloc_error(err.layout()))
    }
}

impl<T, A: RawAlloc> UniquePtr<T, A> {
    /// Allocate `value` through `A`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if `A` refuses the request; `value` is dropped.
    pub fn try_new_in(value: T, _alloc: A) -> Result<Self, AllocError> {
        let ptr = allocate_value::<T, A>(value)?;
        Ok(Self {
            ptr: Some(ptr),
            _marker: PhantomData,
        })
    }
}

impl<T: ?Sized, A: RawAlloc> UniquePtr<T, A> {
    /// A pointer that owns nothing.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            ptr: None,
            _marker: PhantomData,
        }
    }

    /// Take ownership of a raw pointee.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live value allocated through `A` (for example
    /// one returned by [`UniquePtr::into_raw`]) that nothing else owns.
    #[must_use]
    pub const unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        Self {
            ptr: Some(ptr),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if this pointer owns nothing.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// The owned pointee's address, if any.
    #[must_use]
    pub const fn as_ptr(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Borrow the pointee, if any.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: we own the pointee and it lives as long as `self` does.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Mutably borrow the pointee, if any.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: exclusive ownership plus `&mut self` makes this unique.
        self.ptr.map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Give up ownership without destroying the pointee.
    ///
    /// The pointer is left empty. The caller becomes responsible for
    /// destroying the returned pointee through `A`.
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.ptr.take()
    }

    /// Consume the pointer, returning the pointee without destroying it.
    #[must_use]
    pub fn into_raw(mut self) -> Option<NonNull<T>> {
        self.release()
    }

    /// Destroy the owned pointee, if any, leaving the pointer empty.
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: we owned the pointee, which was allocated with `A`.
            unsafe { destroy_value::<T, A>(ptr) };
        }
    }

    /// Exchange the pointees of two pointers.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.ptr, &mut other.ptr);
    }
}

impl<T: ?Sized, A: RawAlloc> Drop for UniquePtr<T, A> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: ?Sized, A: RawAlloc> Default for UniquePtr<T, A> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> From<Box<T>> for UniquePtr<T> {
    fn from(boxed: Box<T>) -> Self {
        // SAFETY: `Box` allocates through the global allocator with
        // `Layout::for_value`, which is what `Global` releases.
        unsafe { Self::from_raw(NonNull::from(Box::leak(boxed))) }
    }
}

impl<T: ?Sized, A: RawAlloc> Deref for UniquePtr<T, A> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced a null UniquePtr"),
        }
    }
}

impl<T: ?Sized, A: RawAlloc> DerefMut for UniquePtr<T, A> {
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => panic!("dereferenced a null UniquePtr"),
        }
    }
}

impl<T: ?Sized + fmt::Debug, A: RawAlloc> fmt::Debug for UniquePtr<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("UniquePtr").field(&value).finish(),
            None => write!(f, "UniquePtr(<null>)"),
        }
    }
}

impl<T: ?Sized, A: RawAlloc> fmt::Pointer for UniquePtr<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = self
            .ptr
            .map_or(std::ptr::null::<()>(), |ptr| ptr.as_ptr().cast_const().cast::<()>());
        fmt::Pointer::fmt(&addr, f)
    }
}
