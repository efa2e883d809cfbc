#![forbid(unsafe_code)]

//! Explicit two-way binding between a component-owned property and a
//! local [`Signal`].
//!
//! A [`ModelLink`] replaces implicit framework two-way binding with an
//! observer/callback pair: local writes go through the signal *and*
//! notify the owning component, while [`ModelLink::sync_from_owner`]
//! applies the owner's side of the link passively, so an owner write
//! never bounces back as a redundant owner notification.
//!
//! # Invariants
//!
//! 1. A local write that changes the value notifies the owner exactly
//!    once.
//! 2. An owner sync never notifies the owner, but still fires ordinary
//!    signal watchers.
//! 3. Equal-value writes from either side are no-ops end to end.

use std::cell::Cell;
use std::rc::Rc;

use crate::signal::{Signal, Watch};

/// Two-way link: a shared [`Signal`] plus an owner-notification callback.
///
/// Clones share the same signal, suppression flag, and owner callback.
#[derive(Clone)]
pub struct ModelLink<T> {
    signal: Signal<T>,
    /// True while an owner sync is applying, to keep the owner watcher
    /// from echoing the write back.
    syncing: Rc<Cell<bool>>,
    /// Keeps the owner-notification watcher registered for the link's
    /// lifetime.
    _owner_watch: Rc<Watch>,
}

impl<T: Clone + PartialEq + 'static> ModelLink<T> {
    /// Build a link starting at `initial`. `notify_owner` is called with
    /// the new value after every local write that changes it.
    pub fn new(initial: T, notify_owner: impl Fn(&T) + 'static) -> Self {
        let signal = Signal::new(initial);
        let syncing = Rc::new(Cell::new(false));
        let syncing_in = Rc::clone(&syncing);
        let owner_watch = signal.watch(move |value| {
            if !syncing_in.get() {
                notify_owner(value);
            }
        });
        Self {
            signal,
            syncing,
            _owner_watch: Rc::new(owner_watch),
        }
    }

    /// The linked signal. Watch it, read it, hand clones of it out.
    #[must_use]
    pub fn signal(&self) -> &Signal<T> {
        &self.signal
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.signal.get()
    }

    /// Local write: updates the signal and, on change, notifies the owner.
    pub fn set(&self, value: T) {
        self.signal.set(value);
    }

    /// Owner write: updates the signal without notifying the owner.
    /// Ordinary watchers still fire on change.
    pub fn sync_from_owner(&self, value: T) {
        self.syncing.set(true);
        self.signal.set(value);
        self.syncing.set(false);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ModelLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLink")
            .field("signal", &self.signal)
            .field("syncing", &self.syncing.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording_link(initial: bool) -> (ModelLink<bool>, Rc<RefCell<Vec<bool>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_in = Rc::clone(&log);
        let link = ModelLink::new(initial, move |v| log_in.borrow_mut().push(*v));
        (link, log)
    }

    #[test]
    fn local_write_notifies_owner() {
        let (link, log) = recording_link(false);
        link.set(true);
        assert_eq!(*log.borrow(), vec![true]);
        assert!(link.get());
    }

    #[test]
    fn equal_local_write_is_silent() {
        let (link, log) = recording_link(false);
        link.set(false);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn owner_sync_does_not_echo() {
        let (link, log) = recording_link(false);
        link.sync_from_owner(true);
        assert!(log.borrow().is_empty());
        assert!(link.get());
    }

    #[test]
    fn owner_sync_still_fires_watchers() {
        let (link, _log) = recording_link(false);
        let seen = Rc::new(Cell::new(false));
        let seen_in = Rc::clone(&seen);
        let _w = link.signal().watch(move |v| seen_in.set(*v));

        link.sync_from_owner(true);
        assert!(seen.get());
    }

    #[test]
    fn write_after_sync_notifies_again() {
        let (link, log) = recording_link(false);
        link.sync_from_owner(true);
        link.set(false);
        assert_eq!(*log.borrow(), vec![false]);
    }

    #[test]
    fn clones_share_the_link() {
        let (link, log) = recording_link(false);
        let other = link.clone();
        other.set(true);
        assert!(link.get());
        assert_eq!(*log.borrow(), vec![true]);
    }
}
