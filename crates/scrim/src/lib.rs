#![forbid(unsafe_code)]

//! Overlay lifecycle coordination for component UIs.
//!
//! # Role
//! Scrim manages the lifecycle of transient overlay components — dialogs,
//! modals, toasts — behind one uniform handle: a visibility signal plus
//! `cancel`/`confirm`/`vanish` callbacks, with optional auto-destruction
//! once a close animation has run its course. It renders nothing and
//! animates nothing; it coordinates.
//!
//! # Primary responsibilities
//! - **[`resolve_overlay_meta`]**: the consumer-side resolver — takes an
//!   ancestor-provided record from the [`Scope`] or constructs one from
//!   the component's own bound prop, then wires automatic close and
//!   immediate open for provided records.
//! - **[`resolve_template_meta`]**: the owner-side resolver — builds the
//!   record from an explicitly named prop, nothing more.
//! - **[`OverlayMeta`]**: the record itself; [`OverlayMeta::provided`]
//!   builds the host-side kind whose `vanish` actually tears down.
//! - **[`Instance`] / [`Scope`]**: the explicit component model —
//!   props, emissions, mount hooks, and the single provided-record slot
//!   that replaces hierarchical injection.
//!
//! # How it fits together
//! An imperative host mounts an overlay component, provides a record on
//! the child's scope, and pumps the shared [`Timeline`]; the component's
//! setup resolves the record and drives `visible`. A declarative owner
//! instead resolves a template record against its own prop and handles
//! the emitted cancel/confirm events.
//!
//! ```
//! use scrim::{Instance, OverlayOptions, Scope, Timeline, resolve_template_meta};
//!
//! let timeline = Timeline::new();
//! let instance = Instance::<String>::with_props(&[("visible", false)]);
//! let scope = Scope::for_instance(timeline, instance.clone());
//!
//! let meta = resolve_template_meta(&scope, "visible", OverlayOptions::default())?;
//! meta.visible().set(true);
//! meta.confirm(Some("saved".to_string()));
//!
//! assert_eq!(instance.prop("visible"), Some(false));
//! assert_eq!(instance.drain_emissions()[0].event, "confirm");
//! # Ok::<(), scrim::ContextError>(())
//! ```

pub mod component;
pub mod error;
pub mod meta;

pub use component::{Emission, Instance, Scope};
pub use error::ContextError;
pub use meta::{OverlayMeta, OverlayOptions, resolve_overlay_meta, resolve_template_meta};

// The reactive substrate, re-exported so hosts need only one import.
pub use scrim_reactive::{ModelLink, Signal, Timeline, Watch};
