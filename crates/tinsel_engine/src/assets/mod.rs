//! Resource registry and manifest loading.
//!
//! The engine core never decodes assets. Images and sounds are registered as
//! opaque handles pointing at their source files; the embedding renderer and
//! audio backend resolve handles to decoded data on their side of the seam.

pub mod manifest;
pub mod resources;

pub use manifest::ResourceManifest;
pub use resources::{
    AudioAsset, AudioHandle, ImageAsset, ImageHandle, ResourceError, ResourceKind, ResourceStore,
};
