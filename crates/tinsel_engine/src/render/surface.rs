//! The draw surface trait and scoped state guards.

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::assets::ImageHandle;

/// Draw-time errors surfaced through [`DrawSurface`] operations.
#[derive(Debug, Error)]
pub enum DrawError {
    /// The backend has no asset for this handle.
    #[error("unknown image handle {0:?}")]
    UnknownImage(ImageHandle),

    /// Backend-specific failure.
    #[error("draw surface backend error: {0}")]
    Backend(String),
}

/// An opaque target for transform and paint operations.
///
/// Transform state and style state (tint) are saved and restored as two
/// separate stacks, so a child can be drawn under a scoped transform while
/// style changes stay contained to that child. Sprites draw their own
/// content at the origin with no transform or tint applied; the compositor
/// owns positioning.
pub trait DrawSurface {
    /// Save the current transform on the matrix stack.
    fn push_matrix(&mut self);

    /// Restore the most recently saved transform.
    fn pop_matrix(&mut self);

    /// Save the current style (tint) state.
    fn push_style(&mut self);

    /// Restore the most recently saved style state.
    fn pop_style(&mut self);

    /// Translate subsequent drawing by `(x, y)`.
    fn translate(&mut self, x: f32, y: f32);

    /// Rotate subsequent drawing by `radians`.
    fn rotate(&mut self, radians: f32);

    /// Scale subsequent drawing by `(x, y)`.
    fn scale(&mut self, x: f32, y: f32);

    /// Multiply subsequent drawing by an alpha tint in `0..=1`.
    fn tint_alpha(&mut self, alpha: f32);

    /// Reset the tint to fully opaque.
    fn clear_tint(&mut self);

    /// Draw an image centered at the origin, at its natural size.
    fn draw_image(&mut self, image: ImageHandle) -> Result<(), DrawError>;

    /// Draw an image centered at the origin with explicit dimensions.
    fn draw_image_sized(
        &mut self,
        image: ImageHandle,
        width: f32,
        height: f32,
    ) -> Result<(), DrawError>;
}

/// Scoped style save: pushes style state on creation, pops on drop.
///
/// Restoration happens on every exit path, including early returns from a
/// failed child draw and unwinding panics.
pub struct StyleGuard<'a> {
    surface: &'a mut dyn DrawSurface,
}

impl<'a> StyleGuard<'a> {
    /// Save style state on `surface` until the guard drops.
    pub fn new(surface: &'a mut dyn DrawSurface) -> Self {
        surface.push_style();
        Self { surface }
    }
}

impl Drop for StyleGuard<'_> {
    fn drop(&mut self) {
        self.surface.pop_style();
    }
}

impl<'a> Deref for StyleGuard<'a> {
    type Target = dyn DrawSurface + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.surface
    }
}

impl DerefMut for StyleGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.surface
    }
}

/// Scoped transform + style save: pushes both on creation, pops on drop.
pub struct TransformGuard<'a> {
    surface: &'a mut dyn DrawSurface,
}

impl<'a> TransformGuard<'a> {
    /// Save transform and style state on `surface` until the guard drops.
    pub fn new(surface: &'a mut dyn DrawSurface) -> Self {
        surface.push_matrix();
        surface.push_style();
        Self { surface }
    }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        self.surface.pop_style();
        self.surface.pop_matrix();
    }
}

impl<'a> Deref for TransformGuard<'a> {
    type Target = dyn DrawSurface + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.surface
    }
}

impl DerefMut for TransformGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{RecordingSurface, SurfaceOp};

    #[test]
    fn style_guard_restores_on_drop() {
        let mut surface = RecordingSurface::new();
        {
            let mut guard = StyleGuard::new(&mut surface);
            guard.tint_alpha(0.25);
        }
        assert_eq!(surface.style_depth(), 0);
        assert!((surface.tint() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn transform_guard_restores_both_stacks() {
        let mut surface = RecordingSurface::new();
        {
            let mut guard = TransformGuard::new(&mut surface);
            guard.translate(10.0, 5.0);
            guard.tint_alpha(0.5);
        }
        assert_eq!(surface.matrix_depth(), 0);
        assert_eq!(surface.style_depth(), 0);
        assert_eq!(
            surface.ops(),
            &[
                SurfaceOp::PushMatrix,
                SurfaceOp::PushStyle,
                SurfaceOp::Translate { x: 10.0, y: 5.0 },
                SurfaceOp::Tint { alpha: 0.5 },
                SurfaceOp::PopStyle,
                SurfaceOp::PopMatrix,
            ]
        );
    }
}
