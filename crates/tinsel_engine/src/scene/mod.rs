//! Object lifecycle scheduling and layered composition.
//!
//! Everything that participates in the simulation implements [`GameObject`]
//! and is ticked by a [`Runner`] in lockstep phases each frame. Drawable
//! objects additionally implement [`Sprite`] or [`Effect`] and are composed
//! into nestable [`SpriteGroup`]s for rendering.

pub mod group;
pub mod image_sprite;
pub mod object;
pub mod runner;
pub mod sprite;

pub use group::SpriteGroup;
pub use image_sprite::ImageSprite;
pub use object::{shared, GameObject, ObjectId, SharedObject};
pub use runner::{Runner, StepError};
pub use sprite::{Effect, Placement, Sprite, SpriteState};
