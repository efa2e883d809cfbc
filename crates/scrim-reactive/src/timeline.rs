#![forbid(unsafe_code)]

//! Deterministic delay scheduling on a manually advanced clock.
//!
//! [`Timeline`] is the suspension point of the overlay lifecycle: a close
//! animation "wait" becomes an entry here, and the host pumps
//! [`Timeline::advance`] from its update loop (or a test drives it
//! directly, no wall-clock sleeps involved).
//!
//! # Invariants
//!
//! 1. Entries run in (deadline, scheduling order): an earlier deadline
//!    always runs first; ties run in the order they were scheduled.
//! 2. `advance` runs every entry whose deadline falls inside the window
//!    it crosses, each with the interior borrow released, so an entry may
//!    schedule further entries (which run in the same `advance` if due).
//! 3. There is no cancellation: a scheduled entry always eventually runs
//!    once the clock reaches its deadline.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Deferred = Box<dyn FnOnce()>;

struct Entry {
    due: Duration,
    seq: u64,
    run: Deferred,
}

struct TimelineInner {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry>,
}

/// A shared, manually advanced timeline of deferred callbacks.
///
/// Clones share the same clock and queue.
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timeline")
            .field("now", &inner.now)
            .field("pending", &inner.entries.len())
            .finish()
    }
}

impl Timeline {
    /// An empty timeline at instant zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimelineInner {
                now: Duration::ZERO,
                next_seq: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Current instant.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of entries not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Schedule `run` to execute once the clock has advanced by `delay`.
    /// A zero delay runs on the next `advance`, including `advance(ZERO)`.
    pub fn schedule(&self, delay: Duration, run: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let due = inner.now + delay;
        inner.entries.push(Entry {
            due,
            seq,
            run: Box::new(run),
        });
    }

    /// Advance the clock by `dt`, running every entry whose deadline falls
    /// within the crossed window, in deadline order.
    pub fn advance(&self, dt: Duration) {
        let target = self.inner.borrow().now + dt;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due_idx = inner
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due <= target)
                    .min_by_key(|(_, e)| (e.due, e.seq))
                    .map(|(i, _)| i);
                match due_idx {
                    Some(i) => {
                        let entry = inner.entries.swap_remove(i);
                        // The clock reads as the entry's deadline while it
                        // runs, never earlier than a previous entry's.
                        inner.now = inner.now.max(entry.due);
                        Some(entry.run)
                    }
                    None => None,
                }
            };
            match next {
                Some(run) => run(),
                None => break,
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn runs_when_deadline_crossed() {
        let tl = Timeline::new();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let hits_in = Rc::clone(&hits);
        tl.schedule(ms(100), move || hits_in.borrow_mut().push("a"));

        tl.advance(ms(99));
        assert!(hits.borrow().is_empty());
        tl.advance(ms(1));
        assert_eq!(*hits.borrow(), vec!["a"]);
    }

    #[test]
    fn zero_delay_runs_on_zero_advance() {
        let tl = Timeline::new();
        let ran = Rc::new(RefCell::new(false));
        let ran_in = Rc::clone(&ran);
        tl.schedule(Duration::ZERO, move || *ran_in.borrow_mut() = true);

        tl.advance(Duration::ZERO);
        assert!(*ran.borrow());
    }

    #[test]
    fn deadline_order_beats_scheduling_order() {
        let tl = Timeline::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        tl.schedule(ms(200), move || o1.borrow_mut().push("late"));
        let o2 = Rc::clone(&order);
        tl.schedule(ms(50), move || o2.borrow_mut().push("early"));

        tl.advance(ms(500));
        assert_eq!(*order.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn equal_deadlines_run_in_scheduling_order() {
        let tl = Timeline::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "c"] {
            let o = Rc::clone(&order);
            tl.schedule(ms(10), move || o.borrow_mut().push(label));
        }
        tl.advance(ms(10));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn clock_accumulates_across_advances() {
        let tl = Timeline::new();
        tl.advance(ms(30));
        tl.advance(ms(40));
        assert_eq!(tl.now(), ms(70));
    }

    #[test]
    fn delay_counts_from_schedule_time() {
        let tl = Timeline::new();
        tl.advance(ms(100));
        let ran = Rc::new(RefCell::new(false));
        let ran_in = Rc::clone(&ran);
        tl.schedule(ms(50), move || *ran_in.borrow_mut() = true);

        tl.advance(ms(49));
        assert!(!*ran.borrow());
        tl.advance(ms(1));
        assert!(*ran.borrow());
    }

    #[test]
    fn entry_may_schedule_followup_in_same_advance() {
        let tl = Timeline::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let tl_in = tl.clone();
        tl.schedule(ms(10), move || {
            o1.borrow_mut().push("first");
            let o2 = Rc::clone(&o1);
            tl_in.schedule(ms(10), move || o2.borrow_mut().push("second"));
        });

        tl.advance(ms(20));
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(tl.pending(), 0);
    }

    #[test]
    fn followup_beyond_window_stays_pending() {
        let tl = Timeline::new();
        let tl_in = tl.clone();
        tl.schedule(ms(10), move || tl_in.schedule(ms(100), || {}));

        tl.advance(ms(20));
        assert_eq!(tl.pending(), 1);
        assert_eq!(tl.now(), ms(20));
    }

    #[test]
    fn pending_reflects_queue() {
        let tl = Timeline::new();
        assert_eq!(tl.pending(), 0);
        tl.schedule(ms(5), || {});
        tl.schedule(ms(6), || {});
        assert_eq!(tl.pending(), 2);
        tl.advance(ms(5));
        assert_eq!(tl.pending(), 1);
    }
}
