//! Pointer casts that keep sharing the source's control block.
//!
//! Every cast goes through aliasing construction: the result holds one more
//! strong reference to the same block and stores a recomputed pointer.

use std::any::Any;
use std::ptr::NonNull;

use crate::shared::SharedPtr;

/// Runtime type identification for [`dynamic_pointer_cast`].
///
/// Implemented for every sized `'static` type and for `dyn Any` (also with
/// `Send` and `Sync`). A trait object type opts in by naming `Downcast` as
/// a supertrait:
///
/// ```
/// use sharc::{dynamic_pointer_cast, Downcast, SharedPtr};
///
/// trait Shape: Downcast {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// let square = SharedPtr::new(Square(2.0));
/// let shape: SharedPtr<dyn Shape> = SharedPtr::map(&square, |s| s as &(dyn Shape + 'static));
/// let back = dynamic_pointer_cast::<Square, _>(&shape);
/// assert_eq!(back.area(), 4.0);
/// ```
pub trait Downcast {
    /// View `self` as `dyn Any` for a checked downcast.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> Downcast for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Downcast for dyn Any {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Downcast for dyn Any + Send {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Downcast for dyn Any + Send + Sync {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Cast to a sub-object exposed through `AsRef`.
///
/// This is the counterpart of an upcast to a base class: the result shares
/// ownership of the whole pointee. For arbitrary projections, including
/// coercion to a trait object, use [`SharedPtr::map`].
#[must_use]
pub fn static_pointer_cast<T: ?Sized, U: ?Sized + AsRef<T>>(sp: &SharedPtr<U>) -> SharedPtr<T> {
    SharedPtr::map(sp, <U as AsRef<T>>::as_ref)
}

/// Re-share the same view.
///
/// Rust pointee types carry no `const` qualifier, so there is nothing to
/// strip: the result is a new strong owner with the same stored pointer.
/// Mutable access to a uniquely owned pointee goes through
/// [`SharedPtr::get_mut`].
#[must_use]
pub fn const_pointer_cast<T: ?Sized>(sp: &SharedPtr<T>) -> SharedPtr<T> {
    // SAFETY: the stored pointer is already valid for `sp`'s block.
    unsafe { SharedPtr::aliasing(sp, sp.as_ptr()) }
}

/// Checked downcast of the pointee to the concrete type `T`.
///
/// Returns a null pointer that owns nothing if the pointee is not a `T`
/// or if `sp` is null.
#[must_use]
pub fn dynamic_pointer_cast<T: Any, U: ?Sized + Downcast>(sp: &SharedPtr<U>) -> SharedPtr<T> {
    SharedPtr::try_map(sp, |value| value.as_any().downcast_ref::<T>())
}

/// Reinterpret the stored pointer as pointing to a `T`.
///
/// # Safety
///
/// Dereferencing the result must be valid: the stored pointer has to be
/// suitably aligned and point to an initialized `T` for as long as the
/// block keeps the pointee alive.
#[must_use]
pub unsafe fn reinterpret_pointer_cast<T, U: ?Sized>(sp: &SharedPtr<U>) -> SharedPtr<T> {
    let ptr = sp.as_ptr().map(NonNull::cast::<T>);
    // SAFETY: forwarded to the caller.
    unsafe { SharedPtr::aliasing(sp, ptr) }
}
