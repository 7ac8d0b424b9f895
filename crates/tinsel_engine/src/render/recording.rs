//! Headless draw surface that records every operation.

use std::collections::HashSet;

use crate::assets::ImageHandle;

use super::surface::{DrawError, DrawSurface};
use super::transform::TransformStack;

/// One recorded surface operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// Matrix stack save.
    PushMatrix,
    /// Matrix stack restore.
    PopMatrix,
    /// Style stack save.
    PushStyle,
    /// Style stack restore.
    PopStyle,
    /// Translation by `(x, y)`.
    Translate {
        /// X offset.
        x: f32,
        /// Y offset.
        y: f32,
    },
    /// Rotation in radians.
    Rotate {
        /// Angle in radians.
        radians: f32,
    },
    /// Non-uniform scale.
    Scale {
        /// X scale factor.
        x: f32,
        /// Y scale factor.
        y: f32,
    },
    /// Alpha tint.
    Tint {
        /// Alpha in `0..=1`.
        alpha: f32,
    },
    /// Tint reset.
    ClearTint,
    /// Image drawn at natural size.
    Image {
        /// Handle of the drawn image.
        image: ImageHandle,
    },
    /// Image drawn with explicit dimensions.
    ImageSized {
        /// Handle of the drawn image.
        image: ImageHandle,
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

/// A [`DrawSurface`] that renders nothing and remembers everything.
///
/// Tracks a live transform stack and tint so tests can assert both the
/// operation sequence and the state the surface was left in. Individual
/// image handles can be marked as failing to exercise error paths.
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    transforms: TransformStack,
    tint: f32,
    saved_tints: Vec<f32>,
    failing_images: HashSet<ImageHandle>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Create an empty recording surface.
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            transforms: TransformStack::new(),
            tint: 1.0,
            saved_tints: Vec::new(),
            failing_images: HashSet::new(),
        }
    }

    /// Every operation recorded so far, in order.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drain the recorded operations, leaving surface state intact.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Handles of every image drawn so far, in draw order.
    pub fn images_drawn(&self) -> Vec<ImageHandle> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Image { image } | SurfaceOp::ImageSized { image, .. } => Some(*image),
                _ => None,
            })
            .collect()
    }

    /// Make `draw_image` fail for this handle, as a backend missing the
    /// asset would.
    pub fn fail_image(&mut self, image: ImageHandle) {
        self.failing_images.insert(image);
    }

    /// The live transform stack.
    pub fn transforms(&self) -> &TransformStack {
        &self.transforms
    }

    /// Current matrix stack depth.
    pub fn matrix_depth(&self) -> usize {
        self.transforms.depth()
    }

    /// Current style stack depth.
    pub fn style_depth(&self) -> usize {
        self.saved_tints.len()
    }

    /// Current tint alpha.
    pub fn tint(&self) -> f32 {
        self.tint
    }

    fn draw(&mut self, image: ImageHandle, op: SurfaceOp) -> Result<(), DrawError> {
        if self.failing_images.contains(&image) {
            return Err(DrawError::UnknownImage(image));
        }
        self.ops.push(op);
        Ok(())
    }
}

impl DrawSurface for RecordingSurface {
    fn push_matrix(&mut self) {
        self.ops.push(SurfaceOp::PushMatrix);
        self.transforms.push();
    }

    fn pop_matrix(&mut self) {
        self.ops.push(SurfaceOp::PopMatrix);
        self.transforms.pop();
    }

    fn push_style(&mut self) {
        self.ops.push(SurfaceOp::PushStyle);
        self.saved_tints.push(self.tint);
    }

    fn pop_style(&mut self) {
        self.ops.push(SurfaceOp::PopStyle);
        if let Some(tint) = self.saved_tints.pop() {
            self.tint = tint;
        } else {
            log::warn!("style stack underflow; resetting tint");
            self.tint = 1.0;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.ops.push(SurfaceOp::Translate { x, y });
        self.transforms.translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.ops.push(SurfaceOp::Rotate { radians });
        self.transforms.rotate(radians);
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.ops.push(SurfaceOp::Scale { x, y });
        self.transforms.scale(x, y);
    }

    fn tint_alpha(&mut self, alpha: f32) {
        self.ops.push(SurfaceOp::Tint { alpha });
        self.tint = alpha;
    }

    fn clear_tint(&mut self) {
        self.ops.push(SurfaceOp::ClearTint);
        self.tint = 1.0;
    }

    fn draw_image(&mut self, image: ImageHandle) -> Result<(), DrawError> {
        self.draw(image, SurfaceOp::Image { image })
    }

    fn draw_image_sized(
        &mut self,
        image: ImageHandle,
        width: f32,
        height: f32,
    ) -> Result<(), DrawError> {
        self.draw(
            image,
            SurfaceOp::ImageSized {
                image,
                width,
                height,
            },
        )
    }
}
