//! Double-buffered positionable state and the drawable traits.

use crate::render::{DrawError, DrawSurface};

use super::object::GameObject;

/// The spatial and visual attributes of a positionable drawable.
///
/// Pure data. Velocity is advisory — it exists so other objects can read
/// it for physics-style decisions; nothing here integrates position from
/// it. `depth` is a parallax divisor applied to translation at draw time
/// (1 is at the screen, larger values recede) and is distinct from
/// `layer`, the z-order key (lower layers draw first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub x_scale: f32,
    /// Vertical scale factor.
    pub y_scale: f32,
    /// Advisory horizontal velocity, units per second.
    pub x_velocity: f32,
    /// Advisory vertical velocity, units per second.
    pub y_velocity: f32,
    /// Parallax depth divisor; 1 is at the screen.
    pub depth: f32,
    /// Opacity from 0 (invisible) to 1 (opaque).
    pub alpha: f32,
    /// Whether the drawable is visible at all.
    pub shown: bool,
    /// Z-order key; lower layers draw first.
    pub layer: i32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
            x_velocity: 0.0,
            y_velocity: 0.0,
            depth: 1.0,
            alpha: 1.0,
            shown: true,
            layer: 0,
        }
    }
}

/// Double-buffered [`Placement`] plus the pending-deletion flag.
///
/// Think-phase logic writes the pending half through [`pending_mut`];
/// everything anyone else can observe comes from the committed half, which
/// only changes when [`commit`] shifts pending over it during the update
/// phase. This is what lets many objects read each other freely inside one
/// frame without ever seeing a half-written value.
///
/// [`pending_mut`]: SpriteState::pending_mut
/// [`commit`]: SpriteState::commit
#[derive(Debug, Clone)]
pub struct SpriteState {
    current: Placement,
    next: Placement,
    current_delete: bool,
    next_delete: bool,
}

impl Default for SpriteState {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteState {
    /// Create state with default placement in both buffers.
    pub fn new() -> Self {
        Self::with_placement(Placement::default())
    }

    /// Create state with `placement` already committed.
    pub fn with_placement(placement: Placement) -> Self {
        Self {
            current: placement,
            next: placement,
            current_delete: false,
            next_delete: false,
        }
    }

    /// The committed placement, as a snapshot.
    pub fn placement(&self) -> Placement {
        self.current
    }

    /// Read the pending placement.
    pub fn pending(&self) -> &Placement {
        &self.next
    }

    /// Write the pending placement. Only the owning object should call
    /// this, and only during its own `think`.
    pub fn pending_mut(&mut self) -> &mut Placement {
        &mut self.next
    }

    /// Mark this object for deletion. Takes effect externally after the
    /// next commit.
    pub fn mark_deleted(&mut self) {
        self.next_delete = true;
    }

    /// Whether deletion has been committed and is externally visible.
    pub fn ready_to_delete(&self) -> bool {
        self.current_delete
    }

    /// Shift every pending value into the committed buffer.
    pub fn commit(&mut self) {
        self.current = self.next;
        self.current_delete = self.next_delete;
    }

    /// Committed x position.
    pub fn x(&self) -> f32 {
        self.current.x
    }

    /// Committed y position.
    pub fn y(&self) -> f32 {
        self.current.y
    }

    /// Committed rotation, in radians.
    pub fn rotation(&self) -> f32 {
        self.current.rotation
    }

    /// Committed horizontal scale.
    pub fn x_scale(&self) -> f32 {
        self.current.x_scale
    }

    /// Committed vertical scale.
    pub fn y_scale(&self) -> f32 {
        self.current.y_scale
    }

    /// Committed advisory horizontal velocity.
    pub fn x_velocity(&self) -> f32 {
        self.current.x_velocity
    }

    /// Committed advisory vertical velocity.
    pub fn y_velocity(&self) -> f32 {
        self.current.y_velocity
    }

    /// Committed parallax depth.
    pub fn depth(&self) -> f32 {
        self.current.depth
    }

    /// Committed opacity.
    pub fn alpha(&self) -> f32 {
        self.current.alpha
    }

    /// Committed visibility.
    pub fn is_shown(&self) -> bool {
        self.current.shown
    }

    /// Committed z-order layer.
    pub fn layer(&self) -> i32 {
        self.current.layer
    }
}

/// A positionable drawable.
///
/// A sprite draws its own content at the origin with no transform, tint,
/// or visibility handling applied; the composition group owning it reads
/// the committed [`Placement`] and drives the surface transform.
pub trait Sprite: GameObject {
    /// The committed placement the compositor should draw with.
    fn placement(&self) -> Placement;

    /// Draw this sprite's content at the origin.
    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError>;
}

/// A drawable that handles its own transforms.
///
/// Unlike sprites, effects receive the surface as-is and position
/// themselves. They still carry a layer so groups can z-order them among
/// sprites.
pub trait Effect: GameObject {
    /// Z-order key; lower layers draw first.
    fn layer(&self) -> i32;

    /// Draw the effect.
    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError>;
}
