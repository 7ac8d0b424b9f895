//! TOML resource manifest.
//!
//! A manifest describes every resource a game wants registered, one table
//! per kind:
//!
//! ```toml
//! [flags]
//! snow = true
//!
//! [numbers]
//! gravity = 9.8
//!
//! [strings]
//! title = "Midnight Delivery"
//!
//! [images]
//! tree = "sprites/tree.png"
//!
//! [sounds]
//! bells = "audio/bells.ogg"
//! ```
//!
//! Image and sound paths are resolved against a base directory when the
//! manifest is loaded into a [`ResourceStore`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::resources::{ResourceError, ResourceStore};

/// Deserialized resource manifest. Every table is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceManifest {
    /// Boolean flags by name.
    pub flags: HashMap<String, bool>,

    /// Numbers by name.
    pub numbers: HashMap<String, f64>,

    /// Strings by name.
    pub strings: HashMap<String, String>,

    /// Image source paths by name, relative to the manifest base directory.
    pub images: HashMap<String, PathBuf>,

    /// Sound source paths by name, relative to the manifest base directory.
    pub sounds: HashMap<String, PathBuf>,
}

impl ResourceManifest {
    /// Read and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self, ResourceError> {
        log::info!("Reading resource manifest at {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text that did not come from a file.
    pub fn from_toml_str(text: &str) -> Result<Self, ResourceError> {
        Self::parse(text, Path::new("<inline>"))
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, ResourceError> {
        toml::from_str(text).map_err(|source| ResourceError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Total number of entries across all tables.
    pub fn len(&self) -> usize {
        self.flags.len()
            + self.numbers.len()
            + self.strings.len()
            + self.images.len()
            + self.sounds.len()
    }

    /// Whether the manifest registers nothing at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceStore {
    /// Register every manifest entry, resolving asset paths against `base_dir`.
    pub fn load_manifest(&mut self, manifest: &ResourceManifest, base_dir: &Path) {
        for (name, &value) in &manifest.flags {
            log::debug!("    flag {name}: {value}");
            self.add_flag(name.clone(), value);
        }
        for (name, &value) in &manifest.numbers {
            log::debug!("  number {name}: {value}");
            self.add_number(name.clone(), value);
        }
        for (name, value) in &manifest.strings {
            log::debug!("  string {name}: {value:?}");
            self.add_string(name.clone(), value.clone());
        }
        for (name, path) in &manifest.images {
            let resolved = base_dir.join(path);
            log::debug!("   image {name}: {}", resolved.display());
            self.add_image(name.clone(), resolved);
        }
        for (name, path) in &manifest.sounds {
            let resolved = base_dir.join(path);
            log::debug!("   audio {name}: {}", resolved.display());
            self.add_audio(name.clone(), resolved);
        }
        log::info!("Registered {} resources from manifest", manifest.len());
    }
}
