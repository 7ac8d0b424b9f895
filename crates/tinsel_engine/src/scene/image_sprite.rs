//! A sprite that draws a single resource image.

use crate::assets::ImageHandle;
use crate::render::{DrawError, DrawSurface};

use super::object::{GameObject, SharedObject};
use super::sprite::{Placement, Sprite, SpriteState};

/// A positionable sprite whose content is one image, centered at the
/// origin.
///
/// The image is an opaque resource handle; what pixels it resolves to is
/// the render backend's business. With no explicit size the backend draws
/// the image at its natural dimensions; [`set_size`](Self::set_size)
/// overrides that without touching the placement scale factors.
///
/// Like any positionable sprite, it does not integrate position from its
/// velocity; subclasses of behavior belong in wrapper objects that drive
/// [`state_mut`](Self::state_mut) during their own think.
pub struct ImageSprite {
    state: SpriteState,
    image: Option<ImageHandle>,
    size: Option<(f32, f32)>,
}

impl ImageSprite {
    /// Create a sprite drawing `image` at its natural size.
    pub fn new(image: ImageHandle) -> Self {
        Self {
            state: SpriteState::new(),
            image: Some(image),
            size: None,
        }
    }

    /// Create a sprite with `placement` already committed.
    pub fn with_placement(image: ImageHandle, placement: Placement) -> Self {
        Self {
            state: SpriteState::with_placement(placement),
            image: Some(image),
            size: None,
        }
    }

    /// Create a sprite with no image yet; draws nothing until one is set.
    pub fn empty() -> Self {
        Self {
            state: SpriteState::new(),
            image: None,
            size: None,
        }
    }

    /// The current image, if any.
    pub fn image(&self) -> Option<ImageHandle> {
        self.image
    }

    /// Swap the image and reset any explicit size.
    pub fn set_image(&mut self, image: ImageHandle) {
        self.image = Some(image);
        self.size = None;
    }

    /// Override the drawn dimensions.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Some((width, height));
    }

    /// The double-buffered placement state.
    pub fn state(&self) -> &SpriteState {
        &self.state
    }

    /// Mutable placement state; pending writes commit at `update`.
    pub fn state_mut(&mut self) -> &mut SpriteState {
        &mut self.state
    }
}

impl GameObject for ImageSprite {
    fn start(&mut self, _time: u64) {}

    fn think(&mut self, _now: u64, _elapsed: u64) {}

    fn update(&mut self) -> Vec<SharedObject> {
        self.state.commit();
        Vec::new()
    }

    fn ready_to_delete(&self) -> bool {
        self.state.ready_to_delete()
    }
}

impl Sprite for ImageSprite {
    fn placement(&self) -> Placement {
        self.state.placement()
    }

    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        let Some(image) = self.image else {
            return Ok(());
        };
        match self.size {
            Some((width, height)) => surface.draw_image_sized(image, width, height),
            None => surface.draw_image(image),
        }
    }
}
