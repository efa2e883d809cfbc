#![forbid(unsafe_code)]

//! Shared boolean-and-beyond value cells with change notification.
//!
//! [`Signal<T>`] is the reactive seam the overlay coordinator is built on:
//! a value in shared, reference-counted storage whose watchers are invoked
//! whenever the value actually changes (compared by `PartialEq`).
//!
//! # Invariants
//!
//! 1. Writing a value equal to the current one is a no-op: no watcher runs.
//! 2. Watchers run in registration order.
//! 3. Watchers run with the interior borrow released, so a watcher may
//!    freely read the signal (or other signals) while it executes.
//! 4. Dropping a [`Watch`] guard detaches its callback; the dead slot is
//!    pruned on the next notification cycle.
//!
//! # Failure modes
//!
//! - A watcher that writes back into the signal it is watching re-enters
//!   `set` while the notification loop is mid-flight. The write itself is
//!   safe (no borrow is held), but the resulting cascade is a design smell
//!   in the watcher graph, not something this type arbitrates.
//! - Holding `Watch` guards forever accumulates callbacks; detached ones
//!   cost one `Weak` slot each until the next notification prunes them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type WatcherRc<T> = Rc<dyn Fn(&T)>;
type WatcherWeak<T> = Weak<dyn Fn(&T)>;

struct SignalInner<T> {
    value: T,
    /// Watchers held weakly; the strong side lives in the `Watch` guard.
    watchers: Vec<WatcherWeak<T>>,
}

/// A shared value cell with change notification.
///
/// Cloning a `Signal` produces another handle to the **same** cell: both
/// handles read and write one value and share one watcher list.
pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("value", &inner.value)
            .field("watchers", &inner.watchers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Create a cell holding `value`, with no watchers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value,
                watchers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value by reference, without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Write `value`. Watchers fire only if it differs from the current
    /// value.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
        }
        self.notify();
    }

    /// Write `value` and return the previous one. Watchers fire only on an
    /// actual change; on a no-op write the (equal) old value is still
    /// returned.
    pub fn replace(&self, value: T) -> T {
        let (old, changed) = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.value != value;
            (std::mem::replace(&mut inner.value, value), changed)
        };
        if changed {
            self.notify();
        }
        old
    }

    /// Mutate the value in place. Watchers fire if the closure left the
    /// value different from a pre-call snapshot.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            inner.value != before
        };
        if changed {
            self.notify();
        }
    }

    /// Register a watcher. It is called with a reference to the new value
    /// on every actual change, until the returned [`Watch`] guard drops.
    pub fn watch(&self, watcher: impl Fn(&T) + 'static) -> Watch {
        let strong: WatcherRc<T> = Rc::new(watcher);
        self.inner.borrow_mut().watchers.push(Rc::downgrade(&strong));
        // `Rc<dyn Fn(&T)>` cannot coerce to `Rc<dyn Any>` directly; the
        // box is the type-erased strong holder keeping the Weak alive.
        Watch {
            _keep: Box::new(strong),
        }
    }

    /// Number of registered watcher slots, counting detached ones not yet
    /// pruned.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.inner.borrow().watchers.len()
    }

    fn notify(&self) {
        // Upgrade live watchers and prune dead slots under the borrow,
        // then run the callbacks with the borrow released.
        let live: Vec<WatcherRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.watchers.retain(|w| w.strong_count() > 0);
            inner.watchers.iter().filter_map(|w| w.upgrade()).collect()
        };
        let value = self.inner.borrow().value.clone();
        for watcher in &live {
            watcher(&value);
        }
    }
}

/// RAII guard for a registered watcher.
///
/// Dropping the guard drops the only strong reference to the callback, so
/// the signal's `Weak` slot fails to upgrade from then on.
pub struct Watch {
    _keep: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_and_set() {
        let flag = Signal::new(false);
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
    }

    #[test]
    fn equal_write_does_not_notify() {
        let flag = Signal::new(true);
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = Rc::clone(&fired);
        let _w = flag.watch(move |_| fired_in.set(fired_in.get() + 1));

        flag.set(true);
        assert_eq!(fired.get(), 0);
        flag.set(false);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn watcher_sees_new_value() {
        let sig = Signal::new(0);
        let last = Rc::new(Cell::new(0));
        let last_in = Rc::clone(&last);
        let _w = sig.watch(move |v| last_in.set(*v));

        sig.set(7);
        assert_eq!(last.get(), 7);
        sig.set(11);
        assert_eq!(last.get(), 11);
    }

    #[test]
    fn replace_returns_previous() {
        let sig = Signal::new("a".to_string());
        let old = sig.replace("b".to_string());
        assert_eq!(old, "a");
        assert_eq!(sig.get(), "b");
    }

    #[test]
    fn replace_equal_value_is_silent() {
        let sig = Signal::new(3);
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = Rc::clone(&fired);
        let _w = sig.watch(move |_| fired_in.set(fired_in.get() + 1));

        assert_eq!(sig.replace(3), 3);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn update_in_place() {
        let sig = Signal::new(vec![1, 2]);
        sig.update(|v| v.push(3));
        assert_eq!(sig.get(), vec![1, 2, 3]);
    }

    #[test]
    fn update_without_change_is_silent() {
        let sig = Signal::new(5);
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = Rc::clone(&fired);
        let _w = sig.watch(move |_| fired_in.set(fired_in.get() + 1));

        sig.update(|v| *v = 5);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn drop_guard_detaches_watcher() {
        let sig = Signal::new(0);
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = Rc::clone(&fired);
        let w = sig.watch(move |_| fired_in.set(fired_in.get() + 1));

        sig.set(1);
        assert_eq!(fired.get(), 1);

        drop(w);
        sig.set(2);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn watchers_run_in_registration_order() {
        let sig = Signal::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let _w1 = sig.watch(move |_| o1.borrow_mut().push(1));
        let o2 = Rc::clone(&order);
        let _w2 = sig.watch(move |_| o2.borrow_mut().push(2));
        let o3 = Rc::clone(&order);
        let _w3 = sig.watch(move |_| o3.borrow_mut().push(3));

        sig.set(9);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn clones_share_value_and_watchers() {
        let a = Signal::new(false);
        let b = a.clone();
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = Rc::clone(&fired);
        let _w = a.watch(move |_| fired_in.set(fired_in.get() + 1));

        b.set(true);
        assert!(a.get());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn dead_slots_pruned_on_notify() {
        let sig = Signal::new(0);
        let _keep = sig.watch(|_| {});
        let transient = sig.watch(|_| {});
        assert_eq!(sig.watcher_count(), 2);

        drop(transient);
        assert_eq!(sig.watcher_count(), 2);

        sig.set(1);
        assert_eq!(sig.watcher_count(), 1);
    }

    #[test]
    fn watcher_may_read_signal_reentrantly() {
        let sig = Signal::new(4);
        let seen = Rc::new(Cell::new(0));
        let seen_in = Rc::clone(&seen);
        let handle = sig.clone();
        let _w = sig.watch(move |_| seen_in.set(handle.get()));

        sig.set(8);
        assert_eq!(seen.get(), 8);
    }

    #[test]
    fn with_borrows_without_clone() {
        let sig = Signal::new(String::from("scrim"));
        let len = sig.with(String::len);
        assert_eq!(len, 5);
    }
}
