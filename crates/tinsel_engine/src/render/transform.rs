//! Affine transform stack for 2D surface backends.

use nalgebra::{Matrix3, Point2, Vector2};

/// A push/pop stack of homogeneous 2D transforms.
///
/// Each translate/rotate/scale composes onto the current matrix in local
/// coordinates, so operations apply in call order to anything drawn
/// afterwards. Backends can use this directly to implement the matrix half
/// of [`DrawSurface`](crate::render::DrawSurface).
pub struct TransformStack {
    current: Matrix3<f32>,
    saved: Vec<Matrix3<f32>>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    /// Create a stack holding the identity transform.
    pub fn new() -> Self {
        Self {
            current: Matrix3::identity(),
            saved: Vec::new(),
        }
    }

    /// Save the current transform.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved transform.
    ///
    /// Popping an empty stack resets to identity; that is a caller bug, so
    /// it is logged rather than silently ignored.
    pub fn pop(&mut self) {
        if let Some(saved) = self.saved.pop() {
            self.current = saved;
        } else {
            log::warn!("transform stack underflow; resetting to identity");
            self.current = Matrix3::identity();
        }
    }

    /// Compose a translation onto the current transform.
    pub fn translate(&mut self, x: f32, y: f32) {
        self.current *= Matrix3::new_translation(&Vector2::new(x, y));
    }

    /// Compose a rotation (radians) onto the current transform.
    pub fn rotate(&mut self, radians: f32) {
        self.current *= Matrix3::new_rotation(radians);
    }

    /// Compose a non-uniform scale onto the current transform.
    pub fn scale(&mut self, x: f32, y: f32) {
        self.current *= Matrix3::new_nonuniform_scaling(&Vector2::new(x, y));
    }

    /// The composed transform at the top of the stack.
    pub fn current(&self) -> &Matrix3<f32> {
        &self.current
    }

    /// How many transforms are saved below the current one.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Map a point through the current transform.
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let mapped = self.current.transform_point(&Point2::new(x, y));
        (mapped.x, mapped.y)
    }
}
