#![forbid(unsafe_code)]

//! The explicit component model the resolver operates on.
//!
//! Instead of leaning on a host framework's implicit instance lookup and
//! hierarchical provide/inject, Scrim passes context explicitly:
//!
//! - [`Instance`] is one live component: named boolean props, event
//!   emission with an optional payload, mount hooks, and the registry of
//!   two-way model links so host-side prop writes reach bindings without
//!   echoing back.
//! - [`Scope`] is what a component's setup code receives: an optional
//!   instance, a [`Timeline`] handle, and a single slot an ancestor may
//!   have filled with a shared overlay record. Child scopes copy the
//!   slot's current value; the resolver consumes it, so one level of
//!   nesting is all a provided record ever travels.
//!
//! # Invariants
//!
//! 1. Mount hooks run at most once, in registration order, when the host
//!    marks the instance mounted. A hook registered after that point runs
//!    immediately.
//! 2. A host prop write (`set_prop`) syncs the matching model link
//!    passively: watchers fire, the owner is not re-notified.
//! 3. Local writes through a model link mutate the prop map and are
//!    recorded as model updates (the explicit change-notification to the
//!    owner).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use scrim_reactive::{ModelLink, Timeline};
use tracing::trace;

use crate::meta::OverlayMeta;

/// One recorded event emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission<P> {
    /// Event name as configured (uninterpreted).
    pub event: String,
    /// Payload handed to `cancel`/`confirm`, if any.
    pub payload: Option<P>,
}

/// A live component instance.
///
/// The host constructs one per mounted component and keeps it for the
/// component's lifetime; setup code reaches it through the [`Scope`].
pub struct Instance<P> {
    props: RefCell<HashMap<String, bool>>,
    links: RefCell<HashMap<String, ModelLink<bool>>>,
    emissions: RefCell<Vec<Emission<P>>>,
    /// Local model-link writes, as (prop, new value) — the owner-facing
    /// change notifications.
    model_updates: RefCell<Vec<(String, bool)>>,
    mount_hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
    mounted: Cell<bool>,
}

impl<P> std::fmt::Debug for Instance<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("props", &self.props.borrow())
            .field("mounted", &self.mounted.get())
            .field("emissions", &self.emissions.borrow().len())
            .finish()
    }
}

impl<P: 'static> Instance<P> {
    /// An instance with no props set.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::with_props(&[])
    }

    /// An instance whose prop map starts from `props`.
    #[must_use]
    pub fn with_props(props: &[(&str, bool)]) -> Rc<Self> {
        Rc::new(Self {
            props: RefCell::new(
                props
                    .iter()
                    .map(|(name, value)| ((*name).to_string(), *value))
                    .collect(),
            ),
            links: RefCell::new(HashMap::new()),
            emissions: RefCell::new(Vec::new()),
            model_updates: RefCell::new(Vec::new()),
            mount_hooks: RefCell::new(Vec::new()),
            mounted: Cell::new(false),
        })
    }

    /// Current value of a named prop.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<bool> {
        self.props.borrow().get(name).copied()
    }

    /// Host-side prop write. Updates the prop map and passively syncs the
    /// matching model link, if one was bound.
    pub fn set_prop(&self, name: &str, value: bool) {
        self.props.borrow_mut().insert(name.to_string(), value);
        let link = self.links.borrow().get(name).cloned();
        if let Some(link) = link {
            link.sync_from_owner(value);
        }
    }

    /// Record an event emission.
    pub fn emit(&self, event: impl Into<String>, payload: Option<P>) {
        let event = event.into();
        trace!(event = %event, "emission recorded");
        self.emissions.borrow_mut().push(Emission { event, payload });
    }

    /// Take all recorded emissions, oldest first.
    #[must_use]
    pub fn drain_emissions(&self) -> Vec<Emission<P>> {
        self.emissions.borrow_mut().drain(..).collect()
    }

    /// Take all recorded model updates, oldest first.
    #[must_use]
    pub fn drain_model_updates(&self) -> Vec<(String, bool)> {
        self.model_updates.borrow_mut().drain(..).collect()
    }

    /// Run `hook` once the instance is mounted. If it already is, the
    /// hook runs immediately.
    pub fn on_mount(&self, hook: impl FnOnce() + 'static) {
        if self.mounted.get() {
            hook();
        } else {
            self.mount_hooks.borrow_mut().push(Box::new(hook));
        }
    }

    /// Whether the host has marked this instance mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Host-side: the component finished its first render. Runs queued
    /// mount hooks in registration order; later calls are no-ops.
    pub fn mark_mounted(&self) {
        if self.mounted.replace(true) {
            return;
        }
        let hooks: Vec<_> = self.mount_hooks.borrow_mut().drain(..).collect();
        trace!(hooks = hooks.len(), "instance mounted");
        for hook in hooks {
            hook();
        }
    }

    /// The two-way link for a named prop, creating it on first use.
    ///
    /// Local writes through the link mutate the prop map and append a
    /// model update; passive syncs (from [`Instance::set_prop`]) do
    /// neither. Repeated calls for one name return the same link.
    #[must_use]
    pub fn model_link(self: &Rc<Self>, name: &str) -> ModelLink<bool> {
        if let Some(link) = self.links.borrow().get(name) {
            return link.clone();
        }
        let initial = self.prop(name).unwrap_or(false);
        let owner: Weak<Self> = Rc::downgrade(self);
        let prop = name.to_string();
        let link = ModelLink::new(initial, move |value: &bool| {
            if let Some(instance) = owner.upgrade() {
                instance.props.borrow_mut().insert(prop.clone(), *value);
                instance.model_updates.borrow_mut().push((prop.clone(), *value));
            }
        });
        self.links.borrow_mut().insert(name.to_string(), link.clone());
        link
    }
}

/// Explicit setup context: what a component's setup code is handed.
///
/// Replaces hierarchical injection with a single typed slot. An ancestor
/// that wants to share an overlay record calls [`Scope::provide`] on the
/// scope it builds for the child; [`Scope::child`] copies the current
/// slot value one level further; the resolver consumes it.
pub struct Scope<P> {
    instance: Option<Rc<Instance<P>>>,
    timeline: Timeline,
    provided: RefCell<Option<Rc<OverlayMeta<P>>>>,
}

impl<P> std::fmt::Debug for Scope<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("instance", &self.instance.is_some())
            .field("provided", &self.provided.borrow().is_some())
            .finish()
    }
}

impl<P: 'static> Scope<P> {
    /// A scope with no live instance (nothing can be constructed locally
    /// through it).
    #[must_use]
    pub fn detached(timeline: Timeline) -> Self {
        Self {
            instance: None,
            timeline,
            provided: RefCell::new(None),
        }
    }

    /// The setup scope for a live instance.
    #[must_use]
    pub fn for_instance(timeline: Timeline, instance: Rc<Instance<P>>) -> Self {
        Self {
            instance: Some(instance),
            timeline,
            provided: RefCell::new(None),
        }
    }

    /// The live instance, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&Rc<Instance<P>>> {
        self.instance.as_ref()
    }

    /// The delay scheduler this scope's lifecycle work runs on.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Fill the slot with a record for the component resolved through
    /// this scope.
    pub fn provide(&self, meta: Rc<OverlayMeta<P>>) {
        *self.provided.borrow_mut() = Some(meta);
    }

    /// Whether the slot currently holds a record.
    #[must_use]
    pub fn has_provided(&self) -> bool {
        self.provided.borrow().is_some()
    }

    /// Consume the slot. After this, descendants see nothing.
    pub(crate) fn take_provided(&self) -> Option<Rc<OverlayMeta<P>>> {
        self.provided.borrow_mut().take()
    }

    /// A scope one level down, carrying whatever the slot currently
    /// holds (nothing, if the resolver already consumed it).
    #[must_use]
    pub fn child(&self, instance: Option<Rc<Instance<P>>>) -> Self {
        Self {
            instance,
            timeline: self.timeline.clone(),
            provided: RefCell::new(self.provided.borrow().clone()),
        }
    }
}
