/// Render target descriptor - what the current frame draws into

use crate::device::{Extent2D, FramebufferHandle, Rect2D, RenderPassHandle, Viewport};

/// Render pass, framebuffer and size of the image acquired for this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDescriptor {
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    pub extent: Extent2D,
    pub image_index: u32,
}

impl RenderTargetDescriptor {
    /// Full-target viewport with a 0..1 depth range
    pub fn viewport(&self) -> Viewport {
        Viewport {
            x: 0.0,
            y: 0.0,
            width: self.extent.width as f32,
            height: self.extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    pub fn scissor(&self) -> Rect2D {
        Rect2D {
            x: 0,
            y: 0,
            extent: self.extent,
        }
    }
}
