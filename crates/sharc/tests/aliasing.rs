//! Tests for aliasing construction and projections.
//!
//! An aliasing pointer shares the owner's control block but stores its own
//! pointer, typically to a field of the owner's pointee.

use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use sharc::SharedPtr;

struct DropTracker(Rc<Cell<usize>>);

impl Drop for DropTracker {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

struct Record {
    id: u32,
    name: String,
    tags: Vec<&'static str>,
    _drops: DropTracker,
}

fn record(drops: &Rc<Cell<usize>>) -> SharedPtr<Record> {
    SharedPtr::new(Record {
        id: 7,
        name: String::from("seven"),
        tags: vec!["odd", "prime"],
        _drops: DropTracker(Rc::clone(drops)),
    })
}

#[test]
fn test_map_points_at_field() {
    let drops = Rc::new(Cell::new(0));
    let owner = record(&drops);
    let name = SharedPtr::map(&owner, |r| &r.name);

    let field: *const String = &owner.name;
    assert_eq!(name.as_ptr().unwrap().as_ptr().cast_const(), field);
    assert_eq!(name.use_count(), owner.use_count());
    assert_eq!(owner.use_count(), 2);
}

#[test]
fn test_alias_keeps_owner_alive() {
    let drops = Rc::new(Cell::new(0));
    let owner = record(&drops);
    let id = SharedPtr::map(&owner, |r| &r.id);
    let name = SharedPtr::map(&owner, |r| r.name.as_str());

    drop(owner);
    assert_eq!(drops.get(), 0);
    assert_eq!(*id, 7);
    assert_eq!(&*name, "seven");
    assert_eq!(id.use_count(), 2);

    drop(id);
    assert_eq!(drops.get(), 0);
    drop(name);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_map_to_slice_element() {
    let drops = Rc::new(Cell::new(0));
    let owner = record(&drops);
    let tags = SharedPtr::map(&owner, |r| r.tags.as_slice());
    let second = SharedPtr::map(&tags, |t| &t[1]);

    drop(owner);
    drop(tags);
    assert_eq!(*second, "prime");
    assert_eq!(second.use_count(), 1);
}

#[test]
fn test_alias_weak_observes_owner_block() {
    let drops = Rc::new(Cell::new(0));
    let owner = record(&drops);
    let id = SharedPtr::map(&owner, |r| &r.id);
    let weak_id = id.downgrade();

    assert_eq!(owner.weak_count(), 1);
    assert_eq!(*weak_id.lock(), 7);

    drop(owner);
    drop(id);
    assert_eq!(drops.get(), 1);
    assert!(weak_id.expired());
    assert!(weak_id.lock().is_null());
}

#[test]
fn test_aliasing_with_null_view_still_owns() {
    let drops = Rc::new(Cell::new(0));
    let owner = record(&drops);
    let empty_view: SharedPtr<u8> = unsafe { SharedPtr::aliasing(&owner, None) };

    assert!(empty_view.is_null());
    assert_eq!(empty_view.use_count(), 2);

    drop(owner);
    assert_eq!(drops.get(), 0);
    drop(empty_view);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_aliasing_unrelated_static() {
    static GREETING: &str = "hello";

    let owner = SharedPtr::new(0u64);
    let view: SharedPtr<&str> =
        unsafe { SharedPtr::aliasing(&owner, Some(NonNull::from(&GREETING))) };
    drop(owner);

    assert_eq!(*view, "hello");
    assert_eq!(view.use_count(), 1);
}

#[test]
fn test_aliasing_null_owner() {
    let owner: SharedPtr<u32> = SharedPtr::null();
    let value = 3u32;
    let view = unsafe { SharedPtr::aliasing(&owner, Some(NonNull::from(&value))) };

    assert!(!view.is_null());
    assert_eq!(view.use_count(), 0);
    assert_eq!(*view, 3);
}

#[test]
fn test_try_map() {
    let owner = SharedPtr::new(vec![10, 20, 30]);

    let hit = SharedPtr::try_map(&owner, |v| v.get(2));
    assert_eq!(*hit, 30);
    assert_eq!(owner.use_count(), 2);

    let miss = SharedPtr::try_map(&owner, |v| v.get(5));
    assert!(miss.is_null());
    assert_eq!(miss.use_count(), 0);
    assert_eq!(owner.use_count(), 2);
}

#[test]
fn test_map_of_null_stays_null() {
    let owner: SharedPtr<(u8, u8)> = SharedPtr::null();
    let first = SharedPtr::map(&owner, |pair| &pair.0);
    assert!(first.is_null());
    assert_eq!(first.use_count(), 0);
}

#[test]
fn test_map_to_trait_object() {
    let owner = SharedPtr::new(42u8);
    let shown = SharedPtr::map(&owner, |v| v as &(dyn std::fmt::Display + 'static));
    assert_eq!(shown.to_string(), "42");
    assert_eq!(owner.use_count(), 2);
}
