//! Drawing seam between the scene graph and a concrete render backend.
//!
//! The engine issues transform and paint operations against the opaque
//! [`DrawSurface`] trait; what a "draw image" actually does is the backend's
//! business. [`RecordingSurface`] is the built-in headless backend, used by
//! the engine's own tests and handy for any embedder that wants to assert on
//! draw output.

pub mod recording;
pub mod surface;
pub mod transform;

pub use recording::{RecordingSurface, SurfaceOp};
pub use surface::{DrawError, DrawSurface, StyleGuard, TransformGuard};
pub use transform::TransformStack;
