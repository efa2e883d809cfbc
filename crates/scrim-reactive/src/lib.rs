#![forbid(unsafe_code)]

//! Reactive primitives for Scrim.
//!
//! # Role in Scrim
//! `scrim-reactive` is the substrate layer: single-threaded,
//! `Rc`-shared cells and a deterministic delay scheduler that the overlay
//! coordinator (`scrim`) composes. Nothing here knows about overlays.
//!
//! # Primary responsibilities
//! - **[`Signal`]**: change-deduplicated shared value with watcher
//!   callbacks and RAII [`Watch`] guards.
//! - **[`ModelLink`]**: explicit two-way binding — local writes notify
//!   the owning component, owner syncs apply passively.
//! - **[`Timeline`]**: deferred callbacks on a manually advanced clock;
//!   the one suspension point the coordinator uses for close animations.
//!
//! # Concurrency model
//! Strictly single-threaded cooperative scheduling: every read and write
//! happens on the host's update thread. None of these types are `Send`.

pub mod link;
pub mod signal;
pub mod timeline;

pub use link::ModelLink;
pub use signal::{Signal, Watch};
pub use timeline::Timeline;
