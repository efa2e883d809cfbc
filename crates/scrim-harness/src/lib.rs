#![forbid(unsafe_code)]

//! Test harness for Scrim: a deterministic host that mounts overlay
//! components the way an imperative overlay layer would.
//!
//! [`Host`] owns the [`Timeline`] and fabricates instances and scopes;
//! [`Host::mount_overlay`] wires the full provider arrangement — a
//! visibility signal, an outcome log, a vanish latch, and a provided
//! record in the child scope's slot — so tests exercise the real
//! resolve-and-coordinate path without a UI framework in the loop.
//!
//! Time never comes from the wall clock: tests drive
//! [`Host::advance_ms`] and assert between steps.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use scrim::{Instance, OverlayMeta, Scope, Signal, Timeline};

/// Millisecond shorthand for test timelines.
#[must_use]
pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// How an overlay interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<P> {
    Cancelled(Option<P>),
    Confirmed(Option<P>),
}

/// A deterministic overlay host.
pub struct Host {
    timeline: Timeline,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeline: Timeline::new(),
        }
    }

    /// The host's delay scheduler.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Advance the host's clock.
    pub fn advance_ms(&self, value: u64) {
        self.timeline.advance(ms(value));
    }

    /// A fresh instance with the given props.
    #[must_use]
    pub fn instance<P: 'static>(&self, props: &[(&str, bool)]) -> Rc<Instance<P>> {
        Instance::with_props(props)
    }

    /// A setup scope for `instance`, slot empty.
    #[must_use]
    pub fn scope_for<P: 'static>(&self, instance: &Rc<Instance<P>>) -> Scope<P> {
        Scope::for_instance(self.timeline.clone(), Rc::clone(instance))
    }

    /// A scope with no live instance, slot empty.
    #[must_use]
    pub fn detached_scope<P: 'static>(&self) -> Scope<P> {
        Scope::detached(self.timeline.clone())
    }

    /// Mount an overlay component imperatively: build its instance,
    /// closed visibility, outcome log and vanish latch, and provide the
    /// record on the component's scope.
    #[must_use]
    pub fn mount_overlay<P: 'static>(&self, props: &[(&str, bool)]) -> MountedOverlay<P> {
        let instance: Rc<Instance<P>> = Instance::with_props(props);
        let visible = Signal::new(false);
        let outcomes: Rc<RefCell<Vec<Outcome<P>>>> = Rc::new(RefCell::new(Vec::new()));
        let vanished = Rc::new(Cell::new(false));

        let cancel_log = Rc::clone(&outcomes);
        let confirm_log = Rc::clone(&outcomes);
        let vanish_latch = Rc::clone(&vanished);
        let meta = OverlayMeta::provided(
            visible.clone(),
            move |payload| cancel_log.borrow_mut().push(Outcome::Cancelled(payload)),
            move |payload| confirm_log.borrow_mut().push(Outcome::Confirmed(payload)),
            move || vanish_latch.set(true),
        );

        let scope = Scope::for_instance(self.timeline.clone(), Rc::clone(&instance));
        scope.provide(meta);

        MountedOverlay {
            instance,
            scope,
            visible,
            outcomes,
            vanished,
        }
    }
}

/// One overlay component mounted by the [`Host`], before its setup ran.
pub struct MountedOverlay<P> {
    instance: Rc<Instance<P>>,
    scope: Scope<P>,
    visible: Signal<bool>,
    outcomes: Rc<RefCell<Vec<Outcome<P>>>>,
    vanished: Rc<Cell<bool>>,
}

impl<P: 'static> MountedOverlay<P> {
    /// The component's instance.
    #[must_use]
    pub fn instance(&self) -> &Rc<Instance<P>> {
        &self.instance
    }

    /// The scope the component's setup code receives.
    #[must_use]
    pub fn scope(&self) -> &Scope<P> {
        &self.scope
    }

    /// The host's view of the visibility signal.
    #[must_use]
    pub fn visible(&self) -> &Signal<bool> {
        &self.visible
    }

    /// Mark the component mounted (first render done).
    pub fn mount(&self) {
        self.instance.mark_mounted();
    }

    /// Whether the host has been asked to tear the component down.
    #[must_use]
    pub fn vanished(&self) -> bool {
        self.vanished.get()
    }

    /// Outcomes reported so far, oldest first.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome<P>>
    where
        P: Clone,
    {
        self.outcomes.borrow().clone()
    }
}
