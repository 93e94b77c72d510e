//! The `SharedPtr<T>` smart pointer implementation.
//!
//! A `SharedPtr` pairs a strong reference to a control block (the lifetime
//! owner) with a typed stored pointer (the view). The two are usually the
//! same object; aliasing construction lets the view address a sub-object or
//! an unrelated value whose lifetime is tied to the owner.

#![allow(clippy::ptr_as_ptr)]

use std::alloc::handle_alloc_error;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

use crate::alloc::{Global, RawAlloc};
use crate::block::ControlBlock;
use crate::error::{AllocError, ExpiredError};
use crate::handle::{StrongHandle, WeakHandle};
use crate::unique::UniquePtr;
use crate::weak::WeakPtr;

/// A shared-ownership pointer with an explicit control block.
///
/// Cloning adds a strong owner; dropping removes one. The pointee is
/// destroyed when the last strong owner goes away, and the control block
/// when the last [`WeakPtr`] goes away as well.
///
/// A `SharedPtr` may be null, and its stored pointer may be null even when
/// it shares ownership of a block (see [`SharedPtr::aliasing`]).
///
/// # Examples
///
/// ```
/// use sharc::SharedPtr;
///
/// let a = SharedPtr::new(5);
/// let b = a.clone();
/// assert_eq!(a.use_count(), 2);
///
/// drop(a);
/// assert_eq!(b.use_count(), 1);
/// assert_eq!(*b, 5);
/// ```
///
/// # Thread Safety
///
/// `SharedPtr<T>` is `!Send` and `!Sync`. Counters are plain cells.
pub struct SharedPtr<T: ?Sized> {
    handle: StrongHandle,
    ptr: Option<NonNull<T>>,
    _marker: PhantomData<T>,
}

impl<T> SharedPtr<T> {
    /// Allocate `value` and its control block with the global allocator.
    ///
    /// Aborts through [`handle_alloc_error`] if either allocation fails.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::try_new_in(value, Global).unwrap_or_else(|err| handle_alloc_error(err.layout()))
    }

    /// Allocate `value` and its control block through `A`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if either allocation fails. `value` is dropped
    /// and nothing stays allocated.
    pub fn try_new_in<A: RawAlloc>(value: T, alloc: A) -> Result<Self, AllocError> {
        let mut unique = UniquePtr::try_new_in(value, alloc)?;
        Self::from_unique(&mut unique)
    }

    /// Replace the current ownership with a freshly allocated `value`.
    pub fn reset_with(&mut self, value: T) {
        *self = Self::new(value);
    }
}

impl<T: ?Sized> SharedPtr<T> {
    /// A pointer that owns nothing and points nowhere.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            handle: StrongHandle::empty(),
            ptr: None,
            _marker: PhantomData,
        }
    }

    /// Take shared ownership of a raw pointee allocated by the global
    /// allocator (for example through `Box::into_raw`).
    ///
    /// Aborts through [`handle_alloc_error`] if the control block cannot be
    /// allocated; the pointee is destroyed first.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live value allocated with the global allocator
    /// that nothing else owns.
    #[must_use]
    pub unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        // SAFETY: forwarded to the caller.
        unsafe { Self::try_from_raw_in(ptr, Global) }
            .unwrap_or_else(|err| handle_alloc_error(err.layout()))
    }

    /// Take shared ownership of a raw pointee allocated through `A`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the control block cannot be allocated. The
    /// pointee has been destroyed by then.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live value allocated through `A` that nothing
    /// else owns.
    pub unsafe fn try_from_raw_in<A: RawAlloc>(
        ptr: NonNull<T>,
        _alloc: A,
    ) -> Result<Self, AllocError> {
        // SAFETY: forwarded to the caller.
        let mut unique = unsafe { UniquePtr::<T, A>::from_raw(ptr) };
        Self::from_unique(&mut unique)
    }

    /// Promote a unique pointer into shared ownership.
    ///
    /// On success `unique` is left empty. If the control block cannot be
    /// allocated, `unique` is left untouched and still owns its pointee. An
    /// empty `unique` yields a null `SharedPtr`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the control block cannot be allocated.
    pub fn from_unique<A: RawAlloc>(unique: &mut UniquePtr<T, A>) -> Result<Self, AllocError> {
        let Some(ptr) = unique.as_ptr() else {
            return Ok(Self::null());
        };

        // SAFETY: `unique` owns `ptr`, allocated through `A`. Ownership moves
        // to the block only once it exists.
        let block = unsafe { ControlBlock::allocate::<T, A>(ptr)? };
        let _ = unique.release();

        Ok(Self {
            // SAFETY: a new block starts with one strong reference, ours.
            handle: unsafe { StrongHandle::adopt(block) },
            ptr: Some(ptr),
            _marker: PhantomData,
        })
    }

    /// Share `owner`'s control block while storing a different pointer.
    ///
    /// The result keeps `owner`'s pointee alive and reports the same
    /// `use_count`. Its own stored pointer is `ptr`, which may be null.
    ///
    /// # Safety
    ///
    /// `ptr`, if non-null, must stay valid for reads for as long as
    /// `owner`'s pointee is alive, typically because it points into it.
    #[must_use]
    pub unsafe fn aliasing<U: ?Sized>(owner: &SharedPtr<U>, ptr: Option<NonNull<T>>) -> Self {
        Self {
            handle: owner.handle.clone(),
            ptr,
            _marker: PhantomData,
        }
    }

    /// Project to a part of the pointee, sharing ownership of the whole.
    ///
    /// A null stored pointer stays null, still sharing ownership.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharc::SharedPtr;
    ///
    /// struct Pair { left: i32, right: i32 }
    ///
    /// let pair = SharedPtr::new(Pair { left: 1, right: 2 });
    /// let right = SharedPtr::map(&pair, |p| &p.right);
    /// drop(pair);
    /// assert_eq!(*right, 2);
    /// ```
    #[must_use]
    pub fn map<U: ?Sized, F: FnOnce(&T) -> &U>(this: &Self, f: F) -> SharedPtr<U> {
        let ptr = this.get().map(|value| NonNull::from(f(value)));
        // SAFETY: `ptr` was borrowed from the pointee (or outlives it).
        unsafe { SharedPtr::aliasing(this, ptr) }
    }

    /// Like [`SharedPtr::map`], but a `None` projection yields a null
    /// pointer that owns nothing.
    #[must_use]
    pub fn try_map<U: ?Sized, F: FnOnce(&T) -> Option<&U>>(this: &Self, f: F) -> SharedPtr<U> {
        match this.get().and_then(f) {
            // SAFETY: `value` was borrowed from the pointee (or outlives it).
            Some(value) => unsafe { SharedPtr::aliasing(this, Some(NonNull::from(value))) },
            None => SharedPtr::null(),
        }
    }

    /// Create a [`WeakPtr`] observing this pointer's block.
    #[must_use]
    pub fn downgrade(&self) -> WeakPtr<T> {
        WeakPtr::from(self)
    }

    /// Borrow the pointee through the stored pointer, if it is non-null.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: the stored pointer is valid while our block keeps the
        // pointee alive, which lasts at least as long as `self`.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Mutably borrow the pointee if no other strong or weak pointer shares
    /// the block.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.handle.strong_count() != 1 || self.handle.weak_count() != 1 {
            return None;
        }
        // SAFETY: we are the only pointer of any kind into this block.
        self.ptr.map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// The stored pointer.
    #[must_use]
    pub const fn as_ptr(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Returns `true` if the stored pointer is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Number of strong owners of the block, or 0 if none is shared.
    #[must_use]
    pub fn use_count(&self) -> usize {
        self.handle.strong_count()
    }

    /// Returns `true` if this is the only strong owner (`use_count() == 1`).
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.use_count() == 1
    }

    /// Number of [`WeakPtr`]s observing the block.
    #[must_use]
    pub fn weak_count(&self) -> usize {
        self.handle.observer_count()
    }

    /// Returns `true` if the two stored pointers have the same address.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.addr() == other.addr()
    }

    /// Release this owner, leaving the pointer null.
    pub fn reset(&mut self) {
        *self = Self::null();
    }

    /// Replace the current ownership with ownership of `ptr`.
    ///
    /// # Safety
    ///
    /// Same contract as [`SharedPtr::from_raw`].
    pub unsafe fn reset_raw(&mut self, ptr: NonNull<T>) {
        // SAFETY: forwarded to the caller.
        *self = unsafe { Self::from_raw(ptr) };
    }

    /// Move the ownership out, leaving this pointer null. Counters are not
    /// touched.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Exchange ownership and stored pointers with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub(crate) const fn handle(&self) -> &StrongHandle {
        &self.handle
    }

    fn addr(&self) -> *const () {
        self.ptr
            .map_or(std::ptr::null(), |ptr| ptr.as_ptr().cast_const() as *const ())
    }
}

impl<T: ?Sized> TryFrom<&WeakPtr<T>> for SharedPtr<T> {
    type Error = ExpiredError;

    /// Promote a weak pointer, failing if its pointee is gone.
    fn try_from(weak: &WeakPtr<T>) -> Result<Self, ExpiredError> {
        let handle: &WeakHandle = weak.handle();
        if handle.strong_count() == 0 {
            handle.record_expired_lock();
            return Err(ExpiredError);
        }

        Ok(Self {
            // SAFETY: the strong count was checked to be positive just above.
            handle: unsafe { StrongHandle::from_weak_unchecked(handle) },
            ptr: weak.cached_ptr(),
            _marker: PhantomData,
        })
    }
}

impl<T: ?Sized> Clone for SharedPtr<T> {
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

impl<T: ?Sized> Default for SharedPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> Deref for SharedPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced a null SharedPtr"),
        }
    }
}

impl<T> From<T> for SharedPtr<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized> From<Box<T>> for SharedPtr<T> {
    fn from(boxed: Box<T>) -> Self {
        Self::from(UniquePtr::from(boxed))
    }
}

impl<T: ?Sized, A: RawAlloc> From<UniquePtr<T, A>> for SharedPtr<T> {
    /// Aborts through [`handle_alloc_error`] if the control block cannot be
    /// allocated.
    fn from(mut unique: UniquePtr<T, A>) -> Self {
        Self::from_unique(&mut unique).unwrap_or_else(|err| handle_alloc_error(err.layout()))
    }
}

impl<T: ?Sized> PartialEq for SharedPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for SharedPtr<T> {}

impl<T: ?Sized> PartialOrd for SharedPtr<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for SharedPtr<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl<T: ?Sized> Hash for SharedPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("SharedPtr").field(&value).finish(),
            None => write!(f, "SharedPtr(<null>)"),
        }
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("<null>"),
        }
    }
}

impl<T: ?Sized> fmt::Pointer for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.addr(), f)
    }
}

// SharedPtr is NOT Send or Sync: the `NonNull` fields already opt it out.
