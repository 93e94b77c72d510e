//! Destructors that touch pointers to their own control block.
//!
//! The block must stay allocated while the pointee is being disposed, and
//! promotion attempts from inside the destructor must fail.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sharc::{SharedPtr, WeakPtr};

struct SelfObserver {
    this: RefCell<WeakPtr<SelfObserver>>,
    lock_was_null: Rc<Cell<Option<bool>>>,
}

impl Drop for SelfObserver {
    fn drop(&mut self) {
        let weak = self.this.borrow();
        self.lock_was_null.set(Some(weak.lock().is_null()));
        assert!(weak.expired());
    }
}

#[test]
fn test_lock_during_disposal_fails() {
    let seen = Rc::new(Cell::new(None));
    let sp = SharedPtr::new(SelfObserver {
        this: RefCell::new(WeakPtr::new()),
        lock_was_null: Rc::clone(&seen),
    });
    *sp.this.borrow_mut() = sp.downgrade();

    drop(sp);
    assert_eq!(seen.get(), Some(true));
}

struct CountsObservers {
    this: RefCell<WeakPtr<CountsObservers>>,
    seen: Rc<Cell<Option<(usize, usize)>>>,
}

impl Drop for CountsObservers {
    fn drop(&mut self) {
        let weak = self.this.borrow();
        self.seen.set(Some((weak.weak_count(), weak.use_count())));
    }
}

#[test]
fn test_weak_count_during_disposal() {
    let seen = Rc::new(Cell::new(None));
    let sp = SharedPtr::new(CountsObservers {
        this: RefCell::new(WeakPtr::new()),
        seen: Rc::clone(&seen),
    });
    *sp.this.borrow_mut() = sp.downgrade();
    let outside = sp.downgrade();
    assert_eq!(sp.weak_count(), 2);

    drop(sp);
    assert_eq!(seen.get(), Some((2, 0)));
    assert_eq!(outside.weak_count(), 1);
}

#[test]
fn test_weak_count_during_disposal_single_observer() {
    let seen = Rc::new(Cell::new(None));
    let sp = SharedPtr::new(CountsObservers {
        this: RefCell::new(WeakPtr::new()),
        seen: Rc::clone(&seen),
    });
    *sp.this.borrow_mut() = sp.downgrade();

    drop(sp);
    assert_eq!(seen.get(), Some((1, 0)));
}

struct OwnsLastWeak {
    // The only weak pointer to this pointee's own block.
    this: RefCell<WeakPtr<OwnsLastWeak>>,
}

#[test]
fn test_pointee_holding_last_weak_to_own_block() {
    let sp = SharedPtr::new(OwnsLastWeak {
        this: RefCell::new(WeakPtr::new()),
    });
    *sp.this.borrow_mut() = sp.downgrade();
    assert_eq!(sp.weak_count(), 1);

    // Disposal drops the weak pointer inside the pointee before the block
    // gives up its implicit reference.
    drop(sp);
}

struct Chain {
    next: RefCell<SharedPtr<Chain>>,
    drops: Rc<Cell<usize>>,
}

impl Drop for Chain {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn test_nested_disposal_chain() {
    let drops = Rc::new(Cell::new(0));
    let mut head: SharedPtr<Chain> = SharedPtr::null();
    for _ in 0..100 {
        head = SharedPtr::new(Chain {
            next: RefCell::new(head),
            drops: Rc::clone(&drops),
        });
    }

    drop(head);
    assert_eq!(drops.get(), 100);
}

struct ResetsSibling {
    sibling: RefCell<SharedPtr<String>>,
    observed: WeakPtr<String>,
    expired_after: Rc<Cell<bool>>,
}

impl Drop for ResetsSibling {
    fn drop(&mut self) {
        self.sibling.borrow_mut().reset();
        self.expired_after.set(self.observed.expired());
    }
}

#[test]
fn test_destructor_releases_other_block() {
    let expired = Rc::new(Cell::new(false));
    let sibling = SharedPtr::new(String::from("sibling"));
    let observed = sibling.downgrade();

    let sp = SharedPtr::new(ResetsSibling {
        sibling: RefCell::new(sibling),
        observed,
        expired_after: Rc::clone(&expired),
    });
    drop(sp);
    assert!(expired.get());
}

struct DropsOwnAlias {
    alias: RefCell<SharedPtr<u32>>,
    value: u32,
}

#[test]
fn test_cycle_through_alias_is_broken_by_reset() {
    let sp = SharedPtr::new(DropsOwnAlias {
        alias: RefCell::new(SharedPtr::null()),
        value: 9,
    });
    let alias = SharedPtr::map(&sp, |d| &d.value);
    *sp.alias.borrow_mut() = alias;
    assert_eq!(sp.use_count(), 2);

    let weak = sp.downgrade();
    // Moving the self-reference out and dropping it last releases the block.
    let inner = sp.alias.borrow_mut().take();
    drop(sp);
    assert!(!weak.expired());
    assert_eq!(*inner, 9);
    drop(inner);
    assert!(weak.expired());
}
