//! # Tinsel Engine
//!
//! A frame-stepped object lifecycle scheduler and layered sprite compositor
//! for single-threaded 2D simulations.
//!
//! ## Features
//!
//! - **Four-Phase Frame Step**: delete, admit, think, and update phases with
//!   deterministic ordering for every scheduled object
//! - **Double-Buffered State**: objects read each other's committed state
//!   while planning, never in-progress writes
//! - **Mid-Frame Spawning**: objects created during a frame settle in the
//!   same frame through a bounded re-evaluation wave loop
//! - **Layered Composition**: nestable sprite groups with per-child
//!   transforms, parallax depth, and stable z-ordering
//! - **Time Dilation**: a per-scheduler speed factor, so independently
//!   dilated clock domains can run side by side
//! - **Resource Registry**: typed lookup of flags, numbers, strings, and
//!   opaque image/audio handles fed from a TOML manifest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use tinsel_engine::prelude::*;
//!
//! let resources = Rc::new(ResourceStore::new());
//! let clock = Rc::new(SystemClock::new());
//! let runner = Runner::new(resources, clock);
//!
//! let group = Rc::new(std::cell::RefCell::new(SpriteGroup::new(runner.clone())));
//! runner.add_object(group.clone());
//! runner.start();
//!
//! let mut surface = RecordingSurface::new();
//! loop {
//!     runner.step().expect("entity requested re-evaluation forever");
//!     group.borrow().draw(&mut surface).expect("draw failed");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{
            AudioHandle, ImageHandle, ResourceError, ResourceKind, ResourceManifest,
            ResourceStore,
        },
        foundation::time::{Clock, ManualClock, SystemClock},
        render::{
            DrawError, DrawSurface, RecordingSurface, StyleGuard, SurfaceOp, TransformGuard,
            TransformStack,
        },
        scene::{
            shared, Effect, GameObject, ImageSprite, ObjectId, Placement, Runner, SharedObject,
            Sprite, SpriteGroup, SpriteState, StepError,
        },
    };
}
