//! Opaque device object handles
//!
//! Backends store their native handle as a raw `u64`; zero is the null handle.

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            /// The null handle
            pub const NULL: Self = Self(0);

            pub fn is_null(self) -> bool {
                self.0 == 0
            }

            pub fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

device_handle!(
    /// Presentation engine swapchain
    SwapchainHandle
);
device_handle!(
    /// GPU image (swapchain-owned or device-allocated)
    ImageHandle
);
device_handle!(
    /// View onto an image
    ImageViewHandle
);
device_handle!(
    /// Linear GPU buffer
    BufferHandle
);
device_handle!(
    /// Device memory backing an image or buffer
    MemoryHandle
);
device_handle!(
    /// Render pass layout
    RenderPassHandle
);
device_handle!(
    /// Framebuffer binding attachments to a render pass
    FramebufferHandle
);
device_handle!(
    /// GPU-side signal between queue operations
    SemaphoreHandle
);
device_handle!(
    /// CPU-waitable GPU completion signal
    FenceHandle
);
device_handle!(
    /// Primary command buffer
    CommandBufferHandle
);
