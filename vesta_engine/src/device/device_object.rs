//! Scoped ownership of device objects
//!
//! A `DeviceObject` destroys its handle through the device when dropped. Groups
//! of them declared as locals are released in reverse order if construction
//! bails out half way, and as struct fields in declaration order.

use std::fmt;
use std::sync::Arc;

use crate::device::{
    BufferHandle, DeviceContext, FenceHandle, FramebufferHandle, ImageHandle, ImageViewHandle, MemoryHandle,
    RenderPassHandle, SemaphoreHandle, SwapchainHandle,
};

/// Handle kinds that know how to release themselves
pub trait DeviceHandle: Copy + fmt::Debug {
    fn destroy(self, device: &dyn DeviceContext);
}

/// Image plus the memory bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceImage {
    pub image: ImageHandle,
    pub memory: MemoryHandle,
}

impl DeviceHandle for DeviceImage {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_image(self.image, self.memory);
    }
}

/// Buffer plus the memory bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBuffer {
    pub buffer: BufferHandle,
    pub memory: MemoryHandle,
}

impl DeviceHandle for DeviceBuffer {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_buffer(self.buffer, self.memory);
    }
}

impl DeviceHandle for SwapchainHandle {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_swapchain(self);
    }
}

impl DeviceHandle for ImageViewHandle {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_image_view(self);
    }
}

impl DeviceHandle for RenderPassHandle {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_render_pass(self);
    }
}

impl DeviceHandle for FramebufferHandle {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_framebuffer(self);
    }
}

impl DeviceHandle for SemaphoreHandle {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_semaphore(self);
    }
}

impl DeviceHandle for FenceHandle {
    fn destroy(self, device: &dyn DeviceContext) {
        device.destroy_fence(self);
    }
}

/// Owned device object, destroyed on drop
pub struct DeviceObject<H: DeviceHandle> {
    handle: H,
    device: Arc<dyn DeviceContext>,
}

impl<H: DeviceHandle> DeviceObject<H> {
    pub fn new(device: &Arc<dyn DeviceContext>, handle: H) -> Self {
        Self {
            handle,
            device: Arc::clone(device),
        }
    }

    pub fn handle(&self) -> H {
        self.handle
    }
}

impl<H: DeviceHandle> fmt::Debug for DeviceObject<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceObject").field(&self.handle).finish()
    }
}

impl<H: DeviceHandle> Drop for DeviceObject<H> {
    fn drop(&mut self) {
        self.handle.destroy(self.device.as_ref());
    }
}
