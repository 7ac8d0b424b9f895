//! Typed resource registry.
//!
//! A resource is either a value used by game logic (flag, number, string) or
//! a handle to an asset decoded elsewhere (image, audio). Objects are
//! expected to fetch everything they need at construction time; a missing
//! resource is a fatal configuration error, not a recoverable condition, so
//! every getter returns [`ResourceError::NotFound`] naming the resource and
//! its kind.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use slotmap::SlotMap;
use thiserror::Error;

slotmap::new_key_type! {
    /// Opaque handle to a registered image resource.
    pub struct ImageHandle;

    /// Opaque handle to a registered audio resource.
    pub struct AudioHandle;
}

/// Source record behind an [`ImageHandle`]. Decoding is the renderer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Path to the image file, resolved against the manifest base directory.
    pub path: PathBuf,
}

/// Source record behind an [`AudioHandle`]. Playback is the audio backend's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    /// Path to the sound file, resolved against the manifest base directory.
    pub path: PathBuf,
}

/// The kind of a resource, used in lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Boolean flag
    Flag,
    /// Floating-point number
    Number,
    /// Text string
    Text,
    /// Image asset handle
    Image,
    /// Audio asset handle
    Audio,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flag => "flag",
            Self::Number => "number",
            Self::Text => "string",
            Self::Image => "image",
            Self::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// Resource registry errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A lookup named a resource that was never registered.
    #[error("the {kind} resource \"{name}\" was not found")]
    NotFound {
        /// Name the lookup asked for.
        name: String,
        /// Kind of store that was searched.
        kind: ResourceKind,
    },

    /// The manifest file could not be read.
    #[error("failed to read resource manifest {path}")]
    Io {
        /// Manifest path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file was not valid TOML.
    #[error("failed to parse resource manifest {path}")]
    Parse {
        /// Manifest path that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Central registry of game resources.
///
/// Flags, numbers, and strings are stored by value. Images and sounds are
/// stored as opaque handles over their source paths; the embedding backends
/// iterate [`ResourceStore::image_assets`] / [`ResourceStore::audio_assets`]
/// to decode them.
#[derive(Default)]
pub struct ResourceStore {
    flags: HashMap<String, bool>,
    numbers: HashMap<String, f64>,
    strings: HashMap<String, String>,
    images: HashMap<String, ImageHandle>,
    image_sources: SlotMap<ImageHandle, ImageAsset>,
    sounds: HashMap<String, AudioHandle>,
    audio_sources: SlotMap<AudioHandle, AudioAsset>,
}

impl ResourceStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any store holds a resource with this name.
    pub fn has_resource(&self, name: &str) -> bool {
        self.flags.contains_key(name)
            || self.numbers.contains_key(name)
            || self.strings.contains_key(name)
            || self.images.contains_key(name)
            || self.sounds.contains_key(name)
    }

    /// Register a boolean flag, replacing any previous value.
    pub fn add_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Register a number, replacing any previous value.
    pub fn add_number(&mut self, name: impl Into<String>, value: f64) {
        self.numbers.insert(name.into(), value);
    }

    /// Register a string, replacing any previous value.
    pub fn add_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(name.into(), value.into());
    }

    /// Register an image by source path and return its handle.
    ///
    /// Re-registering a name points it at a fresh handle; the old handle
    /// stays valid for anything still holding it.
    pub fn add_image(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> ImageHandle {
        let handle = self.image_sources.insert(ImageAsset { path: path.into() });
        self.images.insert(name.into(), handle);
        handle
    }

    /// Register a sound by source path and return its handle.
    pub fn add_audio(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> AudioHandle {
        let handle = self.audio_sources.insert(AudioAsset { path: path.into() });
        self.sounds.insert(name.into(), handle);
        handle
    }

    /// Look up a flag.
    pub fn flag(&self, name: &str) -> Result<bool, ResourceError> {
        self.flags
            .get(name)
            .copied()
            .ok_or_else(|| Self::not_found(name, ResourceKind::Flag))
    }

    /// Look up a number.
    pub fn number(&self, name: &str) -> Result<f64, ResourceError> {
        self.numbers
            .get(name)
            .copied()
            .ok_or_else(|| Self::not_found(name, ResourceKind::Number))
    }

    /// Look up a number as `f32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn number_f32(&self, name: &str) -> Result<f32, ResourceError> {
        self.number(name).map(|n| n as f32)
    }

    /// Look up a number truncated to `i32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn number_i32(&self, name: &str) -> Result<i32, ResourceError> {
        self.number(name).map(|n| n as i32)
    }

    /// Look up a number truncated to `i64`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn number_i64(&self, name: &str) -> Result<i64, ResourceError> {
        self.number(name).map(|n| n as i64)
    }

    /// Look up a string.
    pub fn text(&self, name: &str) -> Result<&str, ResourceError> {
        self.strings
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Self::not_found(name, ResourceKind::Text))
    }

    /// Look up an image handle.
    pub fn image(&self, name: &str) -> Result<ImageHandle, ResourceError> {
        self.images
            .get(name)
            .copied()
            .ok_or_else(|| Self::not_found(name, ResourceKind::Image))
    }

    /// Look up an audio handle.
    pub fn audio(&self, name: &str) -> Result<AudioHandle, ResourceError> {
        self.sounds
            .get(name)
            .copied()
            .ok_or_else(|| Self::not_found(name, ResourceKind::Audio))
    }

    /// Get the source record behind an image handle.
    pub fn image_asset(&self, handle: ImageHandle) -> Option<&ImageAsset> {
        self.image_sources.get(handle)
    }

    /// Get the source record behind an audio handle.
    pub fn audio_asset(&self, handle: AudioHandle) -> Option<&AudioAsset> {
        self.audio_sources.get(handle)
    }

    /// Iterate every registered image, for backends that decode up front.
    pub fn image_assets(&self) -> impl Iterator<Item = (ImageHandle, &ImageAsset)> {
        self.image_sources.iter()
    }

    /// Iterate every registered sound.
    pub fn audio_assets(&self) -> impl Iterator<Item = (AudioHandle, &AudioAsset)> {
        self.audio_sources.iter()
    }

    fn not_found(name: &str, kind: ResourceKind) -> ResourceError {
        ResourceError::NotFound {
            name: name.to_owned(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_resources_round_trip() {
        let mut store = ResourceStore::new();
        store.add_flag("snow", true);
        store.add_number("gravity", 9.8);
        store.add_string("title", "hello");

        assert!(store.flag("snow").unwrap());
        assert!((store.number("gravity").unwrap() - 9.8).abs() < f64::EPSILON);
        assert_eq!(store.text("title").unwrap(), "hello");
        assert!(store.has_resource("gravity"));
        assert!(!store.has_resource("wind"));
    }

    #[test]
    fn numeric_conversions_truncate() {
        let mut store = ResourceStore::new();
        store.add_number("count", 7.9);
        assert_eq!(store.number_i32("count").unwrap(), 7);
        assert_eq!(store.number_i64("count").unwrap(), 7);
        assert!((store.number_f32("count").unwrap() - 7.9).abs() < 1e-6);
    }

    #[test]
    fn missing_lookup_names_resource_and_kind() {
        let store = ResourceStore::new();
        let err = store.image("sleigh").unwrap_err();
        match err {
            ResourceError::NotFound { name, kind } => {
                assert_eq!(name, "sleigh");
                assert_eq!(kind, ResourceKind::Image);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            store.flag("sleigh").unwrap_err().to_string(),
            "the flag resource \"sleigh\" was not found"
        );
    }

    #[test]
    fn image_handles_resolve_to_sources() {
        let mut store = ResourceStore::new();
        let handle = store.add_image("tree", "sprites/tree.png");
        assert_eq!(store.image("tree").unwrap(), handle);
        assert_eq!(
            store.image_asset(handle).unwrap().path,
            PathBuf::from("sprites/tree.png")
        );
    }

    #[test]
    fn reregistering_keeps_old_handle_valid() {
        let mut store = ResourceStore::new();
        let old = store.add_image("tree", "a.png");
        let new = store.add_image("tree", "b.png");
        assert_ne!(old, new);
        assert_eq!(store.image("tree").unwrap(), new);
        assert_eq!(store.image_asset(old).unwrap().path, PathBuf::from("a.png"));
    }
}
