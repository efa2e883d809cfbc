#![forbid(unsafe_code)]

//! Overlay meta records and the resolver that produces them.
//!
//! An [`OverlayMeta`] is the uniform handle a dialog/modal/toast component
//! works against: a `visible` signal plus cancel/confirm/vanish callbacks.
//! [`resolve_overlay_meta`] produces one of two kinds:
//!
//! - **Provided** (`is_template == false`): an ancestor — typically an
//!   imperative overlay host — filled the scope's slot with a record whose
//!   `vanish` really tears the component down. The resolver wires the
//!   automatic close watcher and the immediate-open mount hook onto these.
//! - **Template** (`is_template == true`): no ancestor record; the
//!   component owns its own visibility through a two-way link to its
//!   bound prop. `vanish` is a no-op and no automatic behavior is wired —
//!   the owner drives the prop.
//!
//! # Invariants
//!
//! 1. The resolver consumes the scope's slot, so a provided record never
//!    leaks past one nesting level.
//! 2. `cancel`/`confirm` always close `visible` before reporting the
//!    outcome.
//! 3. With `automatic` on, one close transition requests exactly one
//!    vanish, after the configured animation.
//!
//! # Failure modes
//!
//! - A pending vanish is never cancelled: re-opening during the close
//!   animation does not stop it. Hosts keep `vanish` idempotent.
//! - Zero animation vanishes synchronously inside the close notification.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use scrim_reactive::{Signal, Watch};
use tracing::{debug, trace};

use crate::component::Scope;
use crate::error::ContextError;

/// Configuration for [`resolve_overlay_meta`] / [`resolve_template_meta`].
///
/// Every field has a default; chain the builder methods for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Close-animation duration the coordinator waits before requesting
    /// destruction. Zero means vanish immediately on close.
    pub animation: Duration,
    /// Open the overlay on the mount tick (provided records only).
    pub immediate: bool,
    /// Name of the bound visibility prop for locally constructed records.
    pub model: String,
    /// Event emitted by `cancel`.
    pub cancel_event: String,
    /// Event emitted by `confirm`.
    pub confirm_event: String,
    /// Wire the close watcher that requests destruction after the
    /// animation (provided records only).
    pub automatic: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            animation: Duration::ZERO,
            immediate: true,
            model: "visible".to_string(),
            cancel_event: "cancel".to_string(),
            confirm_event: "confirm".to_string(),
            automatic: true,
        }
    }
}

impl OverlayOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the close-animation duration.
    #[must_use]
    pub fn animation(mut self, animation: Duration) -> Self {
        self.animation = animation;
        self
    }

    /// Set whether the overlay opens on the mount tick.
    #[must_use]
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Set the bound prop name.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the cancel event name.
    #[must_use]
    pub fn cancel_event(mut self, event: impl Into<String>) -> Self {
        self.cancel_event = event.into();
        self
    }

    /// Set the confirm event name.
    #[must_use]
    pub fn confirm_event(mut self, event: impl Into<String>) -> Self {
        self.confirm_event = event.into();
        self
    }

    /// Set whether close transitions request destruction automatically.
    #[must_use]
    pub fn automatic(mut self, automatic: bool) -> Self {
        self.automatic = automatic;
        self
    }
}

type OutcomeFn<P> = Rc<dyn Fn(Option<P>)>;
type VanishFn = Rc<dyn Fn()>;

/// The uniform overlay handle: visibility plus lifecycle callbacks.
pub struct OverlayMeta<P> {
    visible: Signal<bool>,
    on_cancel: OutcomeFn<P>,
    on_confirm: OutcomeFn<P>,
    on_vanish: VanishFn,
    is_template: bool,
    /// Keeps the automatic close watcher alive for the record's lifetime.
    auto_close: RefCell<Option<Watch>>,
}

impl<P> std::fmt::Debug for OverlayMeta<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayMeta")
            .field("visible", &self.visible.get())
            .field("is_template", &self.is_template)
            .field("automatic", &self.auto_close.borrow().is_some())
            .finish()
    }
}

impl<P: 'static> OverlayMeta<P> {
    /// A host-provided record: the kind an imperative overlay layer fills
    /// a child scope's slot with before running the component's setup.
    ///
    /// `cancel`/`confirm` close `visible` and then report the outcome to
    /// the host; `vanish` is the host's teardown. The record is not
    /// template-marked, so the resolver wires automatic close and
    /// immediate open onto it.
    pub fn provided(
        visible: Signal<bool>,
        on_cancel: impl Fn(Option<P>) + 'static,
        on_confirm: impl Fn(Option<P>) + 'static,
        on_vanish: impl Fn() + 'static,
    ) -> Rc<Self> {
        let cancel_visible = visible.clone();
        let confirm_visible = visible.clone();
        Rc::new(Self {
            visible,
            on_cancel: Rc::new(move |payload| {
                cancel_visible.set(false);
                on_cancel(payload);
            }),
            on_confirm: Rc::new(move |payload| {
                confirm_visible.set(false);
                on_confirm(payload);
            }),
            on_vanish: Rc::new(on_vanish),
            is_template: false,
            auto_close: RefCell::new(None),
        })
    }

    /// The visibility signal.
    #[must_use]
    pub fn visible(&self) -> &Signal<bool> {
        &self.visible
    }

    /// Whether this record was constructed locally from the component's
    /// own bound prop.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.is_template
    }

    /// Close and report a cancelled outcome.
    pub fn cancel(&self, payload: Option<P>) {
        (self.on_cancel)(payload);
    }

    /// Close and report a confirmed outcome.
    pub fn confirm(&self, payload: Option<P>) {
        (self.on_confirm)(payload);
    }

    /// Request immediate destruction. No-op on template records.
    pub fn vanish(&self) {
        (self.on_vanish)();
    }
}

/// Resolve the overlay meta for the component behind `scope`.
///
/// Takes the ancestor-provided record if the scope's slot holds one,
/// otherwise constructs a template record from the scope's instance (a
/// missing instance is a [`ContextError`]). Provided records get the
/// automatic close watcher and the immediate-open mount hook per
/// `options`; either way the slot is left empty for descendants.
pub fn resolve_overlay_meta<P: 'static>(
    scope: &Scope<P>,
    options: OverlayOptions,
) -> Result<Rc<OverlayMeta<P>>, ContextError> {
    let meta = match scope.take_provided() {
        Some(meta) => {
            debug!(animation = ?options.animation, "overlay meta taken from provider");
            meta
        }
        None => {
            debug!(model = %options.model, "no provider; constructing template meta");
            template_meta(scope, &options.model, &options)?
        }
    };

    if !meta.is_template() {
        if options.automatic {
            let animation = options.animation;
            let timeline = scope.timeline().clone();
            let vanish = Rc::clone(&meta.on_vanish);
            let watch = meta.visible().watch(move |visible| {
                if *visible {
                    return;
                }
                if animation.is_zero() {
                    trace!("close observed; vanishing now");
                    vanish();
                } else {
                    trace!(delay = ?animation, "close observed; vanish scheduled");
                    let vanish = Rc::clone(&vanish);
                    timeline.schedule(animation, move || vanish());
                }
            });
            meta.auto_close.borrow_mut().replace(watch);
        }
        if options.immediate {
            match scope.instance() {
                Some(instance) => {
                    let visible = meta.visible().clone();
                    instance.on_mount(move || visible.set(true));
                }
                // No mount tick to hook onto; the providing host drives
                // visibility itself in this arrangement.
                None => debug!("no live instance; immediate open skipped"),
            }
        }
    }

    Ok(meta)
}

/// Resolve a template record, naming the bound prop explicitly.
///
/// Never reads the scope's slot and never wires automatic or immediate
/// behavior: the owning component drives the prop, and destruction is the
/// owner's business.
pub fn resolve_template_meta<P: 'static>(
    scope: &Scope<P>,
    model: &str,
    options: OverlayOptions,
) -> Result<Rc<OverlayMeta<P>>, ContextError> {
    template_meta(scope, model, &options)
}

fn template_meta<P: 'static>(
    scope: &Scope<P>,
    model: &str,
    options: &OverlayOptions,
) -> Result<Rc<OverlayMeta<P>>, ContextError> {
    let instance = scope.instance().cloned().ok_or(ContextError)?;
    let link = instance.model_link(model);
    let visible = link.signal().clone();

    let cancel_link = link.clone();
    let cancel_instance = Rc::clone(&instance);
    let cancel_event = options.cancel_event.clone();
    let confirm_link = link;
    let confirm_instance = instance;
    let confirm_event = options.confirm_event.clone();

    Ok(Rc::new(OverlayMeta {
        visible,
        on_cancel: Rc::new(move |payload| {
            cancel_link.set(false);
            cancel_instance.emit(cancel_event.clone(), payload);
        }),
        on_confirm: Rc::new(move |payload| {
            confirm_link.set(false);
            confirm_instance.emit(confirm_event.clone(), payload);
        }),
        // Template mode: there is no providing host to tear anything
        // down, so a destruction request has nowhere to go.
        on_vanish: Rc::new(|| {}),
        is_template: true,
        auto_close: RefCell::new(None),
    }))
}
