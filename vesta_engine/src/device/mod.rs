/// Device module - backend-neutral GPU and window interfaces
///
/// The swap chain and frame renderer only talk to the GPU through
/// `DeviceContext` and to the window through `PresentableSurface`.

pub mod device_context;
pub mod device_object;
pub mod handles;
pub mod surface;
pub mod types;

#[cfg(test)]
pub mod mock_device;

pub use device_context::DeviceContext;
pub use device_object::{DeviceBuffer, DeviceHandle, DeviceImage, DeviceObject};
pub use handles::{
    BufferHandle, CommandBufferHandle, FenceHandle, FramebufferHandle, ImageHandle,
    ImageViewHandle, MemoryHandle, RenderPassHandle, SemaphoreHandle, SwapchainHandle,
};
pub use surface::PresentableSurface;
pub use types::{
    AccessFlags, AcquireOutcome, AttachmentDesc, BufferDesc, BufferUsage, ClearValue, ColorSpace,
    Extent2D, Format, FormatFeatures, ImageAspect, ImageDesc, ImageLayout, ImageTiling,
    ImageUsage, LoadOp, MemoryLocation, PipelineStages, PresentMode, PresentOutcome, Rect2D,
    RenderPassDesc, StoreOp, SubmitInfo, SubpassDependency, SubpassRef, SurfaceCapabilities,
    SurfaceFormat, SwapchainDesc, SwapchainSupport, Viewport,
};
