//! Tests for `UniquePtr<T, A>` and its promotion into `SharedPtr<T>`.

use std::cell::Cell;
use std::rc::Rc;

use sharc::{Global, SharedPtr, UniquePtr};

struct DropTracker(Rc<Cell<usize>>);

impl Drop for DropTracker {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_unique_basic() {
    let mut u = UniquePtr::new(5);
    assert!(!u.is_null());
    assert_eq!(*u, 5);

    *u += 1;
    assert_eq!(u.get(), Some(&6));
    assert_eq!(format!("{u:?}"), "UniquePtr(6)");
}

#[test]
fn test_unique_drop_destroys_pointee() {
    let drops = Rc::new(Cell::new(0));
    let u = UniquePtr::new(DropTracker(Rc::clone(&drops)));
    drop(u);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_unique_null() {
    let mut u: UniquePtr<String> = UniquePtr::null();
    assert!(u.is_null());
    assert!(u.get().is_none());
    assert!(u.get_mut().is_none());
    assert!(u.release().is_none());
    assert_eq!(format!("{u:?}"), "UniquePtr(<null>)");

    let d: UniquePtr<String> = UniquePtr::default();
    assert!(d.is_null());
}

#[test]
#[should_panic(expected = "dereferenced a null UniquePtr")]
fn test_unique_deref_null_panics() {
    let u: UniquePtr<i32> = UniquePtr::null();
    let _ = *u;
}

#[test]
fn test_unique_reset_and_swap() {
    let drops = Rc::new(Cell::new(0));
    let mut a = UniquePtr::new(DropTracker(Rc::clone(&drops)));
    let mut b = UniquePtr::null();

    a.swap(&mut b);
    assert!(a.is_null());
    assert!(!b.is_null());

    b.reset();
    assert!(b.is_null());
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_unique_release_and_from_raw() {
    let drops = Rc::new(Cell::new(0));
    let mut u = UniquePtr::new(DropTracker(Rc::clone(&drops)));
    let raw = u.release().unwrap();
    assert!(u.is_null());
    drop(u);
    assert_eq!(drops.get(), 0);

    let back: UniquePtr<DropTracker, Global> = unsafe { UniquePtr::from_raw(raw) };
    drop(back);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_unique_from_box() {
    let u = UniquePtr::from(Box::new([1u32, 2, 3]));
    assert_eq!(u.len(), 3);

    let s: UniquePtr<str> = UniquePtr::from(Box::<str>::from("boxed"));
    assert_eq!(&*s, "boxed");
}

#[test]
fn test_from_unique_transfers_ownership() {
    let drops = Rc::new(Cell::new(0));
    let mut u = UniquePtr::new(DropTracker(Rc::clone(&drops)));
    let addr = u.as_ptr();

    let s = SharedPtr::from_unique(&mut u).unwrap();
    assert!(u.is_null());
    assert_eq!(s.as_ptr(), addr);
    assert_eq!(s.use_count(), 1);

    drop(u);
    assert_eq!(drops.get(), 0);
    drop(s);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_from_empty_unique_is_null() {
    let mut u: UniquePtr<i32> = UniquePtr::null();
    let s = SharedPtr::from_unique(&mut u).unwrap();
    assert!(s.is_null());
    assert_eq!(s.use_count(), 0);
}

#[test]
fn test_from_unique_consuming() {
    let s: SharedPtr<Vec<u8>> = SharedPtr::from(UniquePtr::new(vec![1, 2]));
    assert_eq!(s.len(), 2);
    assert_eq!(s.use_count(), 1);

    let empty: SharedPtr<u8> = SharedPtr::from(UniquePtr::<u8>::null());
    assert!(empty.is_null());
}

#[test]
fn test_unique_unsized_into_shared() {
    let mut u: UniquePtr<[i32]> = UniquePtr::from(vec![4, 5, 6].into_boxed_slice());
    let s = SharedPtr::from_unique(&mut u).unwrap();
    assert_eq!(&*s, &[4, 5, 6]);
    assert!(u.is_null());
}

#[test]
fn test_unique_into_raw() {
    let u = UniquePtr::new(11u16);
    let raw = u.into_raw().unwrap();
    let s = unsafe { SharedPtr::from_raw(raw) };
    assert_eq!(*s, 11);
}
