/// Device context trait - the GPU services the presentation layer builds on

use crate::device::{
    AcquireOutcome, BufferDesc, BufferHandle, CommandBufferHandle, ClearValue, Extent2D,
    FenceHandle, Format, FormatFeatures, FramebufferHandle, ImageAspect, ImageDesc, ImageHandle,
    ImageLayout, ImageTiling, ImageViewHandle, MemoryHandle, PresentOutcome, Rect2D, RenderPassDesc, RenderPassHandle,
    SemaphoreHandle, SubmitInfo, SwapchainDesc, SwapchainHandle, SwapchainSupport, Viewport,
};
use crate::error::Result;

/// Logical GPU device bound to one presentation surface
///
/// Implemented by each backend. Shared between a swap chain and the frame
/// renderer through `Arc<dyn DeviceContext>`, so it outlives both.
///
/// Every `create_*` call hands back a handle the caller owns and must give
/// back through the matching `destroy_*` call.
pub trait DeviceContext: Send + Sync {
    // ===== SURFACE QUERIES =====

    /// Capabilities, formats and present modes of the bound surface
    fn swapchain_support(&self) -> Result<SwapchainSupport>;

    /// First candidate whose tiling features include `features`
    ///
    /// Errors when no candidate qualifies.
    fn find_supported_format(
        &self,
        candidates: &[Format],
        tiling: ImageTiling,
        features: FormatFeatures,
    ) -> Result<Format>;

    // ===== SWAPCHAIN =====

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle>;

    fn destroy_swapchain(&self, swapchain: SwapchainHandle);

    /// Images owned by the swapchain (count may exceed the requested minimum)
    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>>;

    /// Request the next presentable image, signaling `signal` when it is ready
    ///
    /// A stale surface is reported as `AcquireOutcome::OutOfDate`, never as an error.
    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        signal: SemaphoreHandle,
    ) -> Result<AcquireOutcome>;

    /// Queue `image_index` for presentation after `wait` is signaled
    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait: SemaphoreHandle,
    ) -> Result<PresentOutcome>;

    // ===== IMAGES =====

    /// Create an image and bind freshly allocated device memory to it
    fn create_image(&self, desc: &ImageDesc) -> Result<(ImageHandle, MemoryHandle)>;

    /// Destroy an image, then release its memory
    fn destroy_image(&self, image: ImageHandle, memory: MemoryHandle);

    fn create_image_view(
        &self,
        image: ImageHandle,
        format: Format,
        aspect: ImageAspect,
    ) -> Result<ImageViewHandle>;

    fn destroy_image_view(&self, view: ImageViewHandle);

    // ===== BUFFERS =====

    /// Create a buffer and bind freshly allocated memory from `desc.location` to it
    fn create_buffer(&self, desc: &BufferDesc) -> Result<(BufferHandle, MemoryHandle)>;

    /// Destroy a buffer, then release its memory
    fn destroy_buffer(&self, buffer: BufferHandle, memory: MemoryHandle);

    /// Copy `data` into host-visible `memory` starting at byte `offset`
    ///
    /// Errors when the memory is not host visible or the range does not fit.
    fn write_buffer(&self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Read `len` bytes of host-visible `memory` starting at byte `offset`
    fn read_buffer(&self, memory: MemoryHandle, offset: u64, len: usize) -> Result<Vec<u8>>;

    // ===== RENDER PASSES =====

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle>;

    fn destroy_render_pass(&self, render_pass: RenderPassHandle);

    fn create_framebuffer(
        &self,
        render_pass: RenderPassHandle,
        attachments: &[ImageViewHandle],
        extent: Extent2D,
    ) -> Result<FramebufferHandle>;

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle);

    // ===== SYNCHRONIZATION =====

    fn create_semaphore(&self) -> Result<SemaphoreHandle>;

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle);

    fn create_fence(&self, signaled: bool) -> Result<FenceHandle>;

    fn destroy_fence(&self, fence: FenceHandle);

    /// Block until `fence` is signaled (no timeout)
    fn wait_for_fence(&self, fence: FenceHandle) -> Result<()>;

    fn reset_fence(&self, fence: FenceHandle) -> Result<()>;

    fn queue_submit(&self, submit: &SubmitInfo) -> Result<()>;

    /// Block until all queued GPU work has finished
    fn wait_idle(&self) -> Result<()>;

    // ===== COMMAND BUFFERS =====

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<CommandBufferHandle>>;

    fn free_command_buffers(&self, command_buffers: &[CommandBufferHandle]);

    /// Reset and start recording
    fn begin_command_buffer(&self, command_buffer: CommandBufferHandle) -> Result<()>;

    fn end_command_buffer(&self, command_buffer: CommandBufferHandle) -> Result<()>;

    fn cmd_begin_render_pass(
        &self,
        command_buffer: CommandBufferHandle,
        render_pass: RenderPassHandle,
        framebuffer: FramebufferHandle,
        render_area: Rect2D,
        clear_values: &[ClearValue],
    );

    fn cmd_end_render_pass(&self, command_buffer: CommandBufferHandle);

    fn cmd_set_viewport(&self, command_buffer: CommandBufferHandle, viewport: &Viewport);

    fn cmd_set_scissor(&self, command_buffer: CommandBufferHandle, scissor: &Rect2D);

    /// Copy the first `size` bytes of `src` to the start of `dst`
    fn cmd_copy_buffer(&self, command_buffer: CommandBufferHandle, src: BufferHandle, dst: BufferHandle, size: u64);

    /// Copy tightly packed texels from `buffer` into the color aspect of
    /// `image`, which must be in `ImageLayout::TransferDstOptimal`
    fn cmd_copy_buffer_to_image(
        &self,
        command_buffer: CommandBufferHandle,
        buffer: BufferHandle,
        image: ImageHandle,
        extent: Extent2D,
        layer_count: u32,
    );

    /// Barrier moving every mip level and layer of `image` from `old` to `new`
    fn cmd_transition_image_layout(
        &self,
        command_buffer: CommandBufferHandle,
        image: ImageHandle,
        aspect: ImageAspect,
        old: ImageLayout,
        new: ImageLayout,
    );

    // ===== ONE-TIME SUBMISSION =====

    /// Record with `record` into a temporary command buffer, submit it to the
    /// graphics queue and block until the GPU has executed it
    ///
    /// The command buffer is freed before returning, on error too.
    fn submit_one_time(&self, record: &mut dyn FnMut(CommandBufferHandle)) -> Result<()>;

    /// Blocking buffer to buffer copy
    fn copy_buffer(&self, src: BufferHandle, dst: BufferHandle, size: u64) -> Result<()> {
        self.submit_one_time(&mut |cb| self.cmd_copy_buffer(cb, src, dst, size))
    }

    /// Blocking buffer to image copy (see `cmd_copy_buffer_to_image`)
    fn copy_buffer_to_image(
        &self,
        buffer: BufferHandle,
        image: ImageHandle,
        extent: Extent2D,
        layer_count: u32,
    ) -> Result<()> {
        self.submit_one_time(&mut |cb| self.cmd_copy_buffer_to_image(cb, buffer, image, extent, layer_count))
    }
}
