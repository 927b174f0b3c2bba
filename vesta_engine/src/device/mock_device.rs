/// Mock device context for unit tests (no GPU required)
///
/// Records every call in order, tracks live objects, models fence signal
/// state and lets tests script acquire/present outcomes or make a given
/// object kind fail to create.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::{
    AcquireOutcome, BufferDesc, BufferHandle, ClearValue, ColorSpace, CommandBufferHandle,
    DeviceContext, Extent2D, FenceHandle, Format, FormatFeatures, FramebufferHandle, ImageAspect,
    ImageDesc, ImageHandle, ImageLayout, ImageTiling, ImageViewHandle, MemoryHandle, PresentMode, PresentOutcome, Rect2D,
    RenderPassDesc, RenderPassHandle, SemaphoreHandle, SubmitInfo, SurfaceCapabilities,
    SurfaceFormat, SwapchainDesc, SwapchainHandle, SwapchainSupport, Viewport,
};
use crate::error::{Error, Result};

// ============================================================================
// Recorded calls
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateSwapchain { swapchain: SwapchainHandle, desc: SwapchainDesc },
    DestroySwapchain(SwapchainHandle),
    CreateImage { image: ImageHandle, memory: MemoryHandle, desc: ImageDesc },
    DestroyImage(ImageHandle, MemoryHandle),
    CreateBuffer { buffer: BufferHandle, memory: MemoryHandle, desc: BufferDesc },
    DestroyBuffer(BufferHandle, MemoryHandle),
    WriteBuffer { memory: MemoryHandle, offset: u64, len: usize },
    CreateImageView { view: ImageViewHandle, image: ImageHandle, format: Format, aspect: ImageAspect },
    DestroyImageView(ImageViewHandle),
    CreateRenderPass { render_pass: RenderPassHandle, desc: RenderPassDesc },
    DestroyRenderPass(RenderPassHandle),
    CreateFramebuffer {
        framebuffer: FramebufferHandle,
        render_pass: RenderPassHandle,
        attachments: Vec<ImageViewHandle>,
        extent: Extent2D,
    },
    DestroyFramebuffer(FramebufferHandle),
    CreateSemaphore(SemaphoreHandle),
    DestroySemaphore(SemaphoreHandle),
    CreateFence { fence: FenceHandle, signaled: bool },
    DestroyFence(FenceHandle),
    WaitFence { fence: FenceHandle, was_signaled: bool },
    ResetFence(FenceHandle),
    Acquire { swapchain: SwapchainHandle, signal: SemaphoreHandle },
    Submit(SubmitInfo),
    Present { swapchain: SwapchainHandle, image_index: u32, wait: SemaphoreHandle },
    WaitIdle,
    AllocateCommandBuffers(Vec<CommandBufferHandle>),
    FreeCommandBuffers(Vec<CommandBufferHandle>),
    BeginCommandBuffer(CommandBufferHandle),
    EndCommandBuffer(CommandBufferHandle),
    BeginRenderPass {
        command_buffer: CommandBufferHandle,
        render_pass: RenderPassHandle,
        framebuffer: FramebufferHandle,
        render_area: Rect2D,
        clear_values: Vec<ClearValue>,
    },
    EndRenderPass(CommandBufferHandle),
    SetViewport(CommandBufferHandle, Viewport),
    SetScissor(CommandBufferHandle, Rect2D),
    CopyBuffer { command_buffer: CommandBufferHandle, src: BufferHandle, dst: BufferHandle, size: u64 },
    CopyBufferToImage {
        command_buffer: CommandBufferHandle,
        buffer: BufferHandle,
        image: ImageHandle,
        extent: Extent2D,
        layer_count: u32,
    },
    TransitionImageLayout {
        command_buffer: CommandBufferHandle,
        image: ImageHandle,
        aspect: ImageAspect,
        old: ImageLayout,
        new: ImageLayout,
    },
    /// Temporary command buffer submitted and waited on
    SubmitOneTime(CommandBufferHandle),
}

impl MockCall {
    /// True for every call that destroys or frees a device object
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            MockCall::DestroySwapchain(_)
                | MockCall::DestroyImage(..)
                | MockCall::DestroyBuffer(..)
                | MockCall::DestroyImageView(_)
                | MockCall::DestroyRenderPass(_)
                | MockCall::DestroyFramebuffer(_)
                | MockCall::DestroySemaphore(_)
                | MockCall::DestroyFence(_)
                | MockCall::FreeCommandBuffers(_)
        )
    }
}

// ============================================================================
// Mock state
// ============================================================================

pub struct MockState {
    next_handle: u64,

    /// Reported by `swapchain_support`
    pub support: SwapchainSupport,

    /// Formats usable as optimal-tiling depth attachments
    pub depth_formats: Vec<Format>,

    /// Images handed out beyond the requested minimum
    pub extra_swapchain_images: u32,

    /// Object kind whose next creation fails ("swapchain", "render_pass", ...)
    pub fail_create: Option<&'static str>,

    /// Fail the next one-time submission after recording
    pub fail_one_time_submit: bool,

    /// Signal a submission's fence immediately instead of when the CPU waits on it
    pub gpu_completes_immediately: bool,

    /// Outcomes returned by upcoming acquire calls (round-robin images when empty)
    pub acquire_script: VecDeque<Result<AcquireOutcome>>,

    /// Outcomes returned by upcoming present calls (`Success` when empty)
    pub present_script: VecDeque<Result<PresentOutcome>>,

    pub calls: Vec<MockCall>,

    /// Live objects by raw handle, with their kind
    pub live: HashMap<u64, &'static str>,

    pub fences: HashMap<FenceHandle, bool>,

    swapchain_images: HashMap<SwapchainHandle, Vec<ImageHandle>>,
    next_image: HashMap<SwapchainHandle, u32>,

    /// Buffer contents, keyed by the buffer's memory
    buffer_memory: HashMap<BufferHandle, MemoryHandle>,
    memory_bytes: HashMap<MemoryHandle, (BufferDesc, Vec<u8>)>,
}

impl MockState {
    fn new() -> Self {
        Self {
            next_handle: 1,
            support: MockDevice::default_support(),
            depth_formats: vec![Format::D32_FLOAT],
            extra_swapchain_images: 0,
            fail_create: None,
            fail_one_time_submit: false,
            gpu_completes_immediately: false,
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            calls: Vec::new(),
            live: HashMap::new(),
            fences: HashMap::new(),
            swapchain_images: HashMap::new(),
            next_image: HashMap::new(),
            buffer_memory: HashMap::new(),
            memory_bytes: HashMap::new(),
        }
    }

    fn bytes_of(&mut self, buffer: BufferHandle) -> &mut Vec<u8> {
        let memory = *self
            .buffer_memory
            .get(&buffer)
            .unwrap_or_else(|| panic!("unknown buffer {:?}", buffer));
        &mut self
            .memory_bytes
            .get_mut(&memory)
            .unwrap_or_else(|| panic!("buffer {:?} has no memory", buffer))
            .1
    }

    fn host_bytes(&mut self, memory: MemoryHandle, offset: u64, len: usize) -> Result<&mut [u8]> {
        let (desc, bytes) = self
            .memory_bytes
            .get_mut(&memory)
            .ok_or_else(|| Error::BackendError(format!("unknown buffer memory {:?}", memory)))?;
        if !desc.location.is_host_visible() {
            return Err(Error::BackendError(format!("buffer memory {:?} is not host visible", memory)));
        }
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| Error::BackendError(format!("range {}+{} outside buffer of {} bytes", offset, len, bytes.len())))?;
        Ok(&mut bytes[start..end])
    }

    fn create(&mut self, kind: &'static str) -> Result<u64> {
        if self.fail_create == Some(kind) {
            self.fail_create = None;
            return Err(Error::InitializationFailed(format!("mock {} creation failed", kind)));
        }
        let raw = self.next_handle;
        self.next_handle += 1;
        self.live.insert(raw, kind);
        Ok(raw)
    }

    fn release(&mut self, raw: u64, kind: &'static str) {
        match self.live.remove(&raw) {
            Some(live_kind) => assert_eq!(live_kind, kind, "handle {} released as wrong kind", raw),
            None => panic!("releasing unknown or already released {} {}", kind, raw),
        }
    }
}

// ============================================================================
// Mock device
// ============================================================================

pub struct MockDevice {
    state: Mutex<MockState>,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState::new()),
        })
    }

    /// Window-sized surface: min 2 images, at most 3, BGRA sRGB first, FIFO + mailbox
    pub fn default_support() -> SwapchainSupport {
        SwapchainSupport {
            capabilities: SurfaceCapabilities {
                min_image_count: 2,
                max_image_count: 3,
                current_extent: Extent2D::new(u32::MAX, u32::MAX),
                min_image_extent: Extent2D::new(1, 1),
                max_image_extent: Extent2D::new(4096, 4096),
            },
            formats: vec![
                SurfaceFormat { format: Format::B8G8R8A8_SRGB, color_space: ColorSpace::SrgbNonlinear },
                SurfaceFormat { format: Format::R8G8B8A8_UNORM, color_space: ColorSpace::SrgbNonlinear },
            ],
            present_modes: vec![PresentMode::Fifo, PresentMode::Mailbox],
        }
    }

    pub fn as_device(self: &Arc<Self>) -> Arc<dyn DeviceContext> {
        Arc::clone(self) as Arc<dyn DeviceContext>
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn live_count(&self) -> usize {
        self.state().live.len()
    }

    /// Simulate the GPU finishing the work guarded by `fence`
    pub fn signal_fence(&self, fence: FenceHandle) {
        self.state().fences.insert(fence, true);
    }

    pub fn is_fence_signaled(&self, fence: FenceHandle) -> bool {
        self.state().fences.get(&fence).copied().unwrap_or(false)
    }

    /// Current contents of any buffer, host visible or not
    pub fn buffer_bytes(&self, buffer: BufferHandle) -> Vec<u8> {
        self.state().bytes_of(buffer).clone()
    }
}

impl DeviceContext for MockDevice {
    fn swapchain_support(&self) -> Result<SwapchainSupport> {
        Ok(self.state().support.clone())
    }

    fn find_supported_format(
        &self,
        candidates: &[Format],
        tiling: ImageTiling,
        features: FormatFeatures,
    ) -> Result<Format> {
        let state = self.state();
        let depth_capable = tiling == ImageTiling::Optimal
            && features == FormatFeatures::DEPTH_STENCIL_ATTACHMENT;
        candidates
            .iter()
            .copied()
            .find(|f| depth_capable && state.depth_formats.contains(f))
            .ok_or_else(|| Error::InitializationFailed("failed to find supported format".to_string()))
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle> {
        let mut state = self.state();
        let swapchain = SwapchainHandle(state.create("swapchain")?);
        let count = desc.min_image_count + state.extra_swapchain_images;
        let mut images = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw = state.next_handle;
            state.next_handle += 1;
            images.push(ImageHandle(raw));
        }
        state.swapchain_images.insert(swapchain, images);
        state.calls.push(MockCall::CreateSwapchain { swapchain, desc: *desc });
        Ok(swapchain)
    }

    fn destroy_swapchain(&self, swapchain: SwapchainHandle) {
        let mut state = self.state();
        state.release(swapchain.raw(), "swapchain");
        state.swapchain_images.remove(&swapchain);
        state.calls.push(MockCall::DestroySwapchain(swapchain));
    }

    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        self.state()
            .swapchain_images
            .get(&swapchain)
            .cloned()
            .ok_or_else(|| Error::BackendError("unknown swapchain".to_string()))
    }

    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        signal: SemaphoreHandle,
    ) -> Result<AcquireOutcome> {
        let mut state = self.state();
        state.calls.push(MockCall::Acquire { swapchain, signal });
        if let Some(scripted) = state.acquire_script.pop_front() {
            return scripted;
        }
        let count = state.swapchain_images.get(&swapchain).map_or(0, |i| i.len() as u32);
        let next = state.next_image.entry(swapchain).or_insert(0);
        let image_index = *next % count.max(1);
        *next += 1;
        Ok(AcquireOutcome::Acquired { image_index, suboptimal: false })
    }

    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait: SemaphoreHandle,
    ) -> Result<PresentOutcome> {
        let mut state = self.state();
        state.calls.push(MockCall::Present { swapchain, image_index, wait });
        state.present_script.pop_front().unwrap_or(Ok(PresentOutcome::Success))
    }

    fn create_image(&self, desc: &ImageDesc) -> Result<(ImageHandle, MemoryHandle)> {
        let mut state = self.state();
        let image = ImageHandle(state.create("image")?);
        let memory = MemoryHandle(state.create("memory")?);
        state.calls.push(MockCall::CreateImage { image, memory, desc: *desc });
        Ok((image, memory))
    }

    fn destroy_image(&self, image: ImageHandle, memory: MemoryHandle) {
        let mut state = self.state();
        state.release(image.raw(), "image");
        state.release(memory.raw(), "memory");
        state.calls.push(MockCall::DestroyImage(image, memory));
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<(BufferHandle, MemoryHandle)> {
        let mut state = self.state();
        if desc.size == 0 {
            return Err(Error::BackendError("buffer size must be non-zero".to_string()));
        }
        let buffer = BufferHandle(state.create("buffer")?);
        let memory = MemoryHandle(state.create("memory")?);
        state.buffer_memory.insert(buffer, memory);
        state.memory_bytes.insert(memory, (*desc, vec![0; desc.size as usize]));
        state.calls.push(MockCall::CreateBuffer { buffer, memory, desc: *desc });
        Ok((buffer, memory))
    }

    fn destroy_buffer(&self, buffer: BufferHandle, memory: MemoryHandle) {
        let mut state = self.state();
        state.release(buffer.raw(), "buffer");
        state.release(memory.raw(), "memory");
        state.buffer_memory.remove(&buffer);
        state.memory_bytes.remove(&memory);
        state.calls.push(MockCall::DestroyBuffer(buffer, memory));
    }

    fn write_buffer(&self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        state.host_bytes(memory, offset, data.len())?.copy_from_slice(data);
        state.calls.push(MockCall::WriteBuffer { memory, offset, len: data.len() });
        Ok(())
    }

    fn read_buffer(&self, memory: MemoryHandle, offset: u64, len: usize) -> Result<Vec<u8>> {
        Ok(self.state().host_bytes(memory, offset, len)?.to_vec())
    }

    fn create_image_view(
        &self,
        image: ImageHandle,
        format: Format,
        aspect: ImageAspect,
    ) -> Result<ImageViewHandle> {
        let mut state = self.state();
        let view = ImageViewHandle(state.create("image_view")?);
        state.calls.push(MockCall::CreateImageView { view, image, format, aspect });
        Ok(view)
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        let mut state = self.state();
        state.release(view.raw(), "image_view");
        state.calls.push(MockCall::DestroyImageView(view));
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle> {
        let mut state = self.state();
        let render_pass = RenderPassHandle(state.create("render_pass")?);
        state.calls.push(MockCall::CreateRenderPass { render_pass, desc: *desc });
        Ok(render_pass)
    }

    fn destroy_render_pass(&self, render_pass: RenderPassHandle) {
        let mut state = self.state();
        state.release(render_pass.raw(), "render_pass");
        state.calls.push(MockCall::DestroyRenderPass(render_pass));
    }

    fn create_framebuffer(
        &self,
        render_pass: RenderPassHandle,
        attachments: &[ImageViewHandle],
        extent: Extent2D,
    ) -> Result<FramebufferHandle> {
        let mut state = self.state();
        let framebuffer = FramebufferHandle(state.create("framebuffer")?);
        state.calls.push(MockCall::CreateFramebuffer {
            framebuffer,
            render_pass,
            attachments: attachments.to_vec(),
            extent,
        });
        Ok(framebuffer)
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        let mut state = self.state();
        state.release(framebuffer.raw(), "framebuffer");
        state.calls.push(MockCall::DestroyFramebuffer(framebuffer));
    }

    fn create_semaphore(&self) -> Result<SemaphoreHandle> {
        let mut state = self.state();
        let semaphore = SemaphoreHandle(state.create("semaphore")?);
        state.calls.push(MockCall::CreateSemaphore(semaphore));
        Ok(semaphore)
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        let mut state = self.state();
        state.release(semaphore.raw(), "semaphore");
        state.calls.push(MockCall::DestroySemaphore(semaphore));
    }

    fn create_fence(&self, signaled: bool) -> Result<FenceHandle> {
        let mut state = self.state();
        let fence = FenceHandle(state.create("fence")?);
        state.fences.insert(fence, signaled);
        state.calls.push(MockCall::CreateFence { fence, signaled });
        Ok(fence)
    }

    fn destroy_fence(&self, fence: FenceHandle) {
        let mut state = self.state();
        state.release(fence.raw(), "fence");
        state.fences.remove(&fence);
        state.calls.push(MockCall::DestroyFence(fence));
    }

    fn wait_for_fence(&self, fence: FenceHandle) -> Result<()> {
        let mut state = self.state();
        let was_signaled = *state
            .fences
            .get(&fence)
            .unwrap_or_else(|| panic!("waiting on unknown fence {:?}", fence));
        state.calls.push(MockCall::WaitFence { fence, was_signaled });
        // The GPU catches up while the CPU is blocked.
        state.fences.insert(fence, true);
        Ok(())
    }

    fn reset_fence(&self, fence: FenceHandle) -> Result<()> {
        let mut state = self.state();
        state.fences.insert(fence, false);
        state.calls.push(MockCall::ResetFence(fence));
        Ok(())
    }

    fn queue_submit(&self, submit: &SubmitInfo) -> Result<()> {
        let mut state = self.state();
        if state.gpu_completes_immediately {
            state.fences.insert(submit.fence, true);
        }
        state.calls.push(MockCall::Submit(*submit));
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        let mut state = self.state();
        for signaled in state.fences.values_mut() {
            *signaled = true;
        }
        state.calls.push(MockCall::WaitIdle);
        Ok(())
    }

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<CommandBufferHandle>> {
        let mut state = self.state();
        let mut buffers = Vec::with_capacity(count);
        for _ in 0..count {
            buffers.push(CommandBufferHandle(state.create("command_buffer")?));
        }
        state.calls.push(MockCall::AllocateCommandBuffers(buffers.clone()));
        Ok(buffers)
    }

    fn free_command_buffers(&self, command_buffers: &[CommandBufferHandle]) {
        let mut state = self.state();
        for cb in command_buffers {
            state.release(cb.raw(), "command_buffer");
        }
        state.calls.push(MockCall::FreeCommandBuffers(command_buffers.to_vec()));
    }

    fn begin_command_buffer(&self, command_buffer: CommandBufferHandle) -> Result<()> {
        self.state().calls.push(MockCall::BeginCommandBuffer(command_buffer));
        Ok(())
    }

    fn end_command_buffer(&self, command_buffer: CommandBufferHandle) -> Result<()> {
        self.state().calls.push(MockCall::EndCommandBuffer(command_buffer));
        Ok(())
    }

    fn cmd_begin_render_pass(
        &self,
        command_buffer: CommandBufferHandle,
        render_pass: RenderPassHandle,
        framebuffer: FramebufferHandle,
        render_area: Rect2D,
        clear_values: &[ClearValue],
    ) {
        self.state().calls.push(MockCall::BeginRenderPass {
            command_buffer,
            render_pass,
            framebuffer,
            render_area,
            clear_values: clear_values.to_vec(),
        });
    }

    fn cmd_end_render_pass(&self, command_buffer: CommandBufferHandle) {
        self.state().calls.push(MockCall::EndRenderPass(command_buffer));
    }

    fn cmd_set_viewport(&self, command_buffer: CommandBufferHandle, viewport: &Viewport) {
        self.state().calls.push(MockCall::SetViewport(command_buffer, *viewport));
    }

    fn cmd_set_scissor(&self, command_buffer: CommandBufferHandle, scissor: &Rect2D) {
        self.state().calls.push(MockCall::SetScissor(command_buffer, *scissor));
    }

    /// Copies happen at record time, so the result is visible once recorded
    fn cmd_copy_buffer(&self, command_buffer: CommandBufferHandle, src: BufferHandle, dst: BufferHandle, size: u64) {
        let mut state = self.state();
        state.calls.push(MockCall::CopyBuffer { command_buffer, src, dst, size });
        let len = size as usize;
        let copied = state.bytes_of(src);
        assert!(len <= copied.len(), "copy of {} bytes overruns source buffer of {}", len, copied.len());
        let copied = copied[..len].to_vec();
        let target = state.bytes_of(dst);
        assert!(len <= target.len(), "copy of {} bytes overruns destination buffer of {}", len, target.len());
        target[..len].copy_from_slice(&copied);
    }

    fn cmd_copy_buffer_to_image(
        &self,
        command_buffer: CommandBufferHandle,
        buffer: BufferHandle,
        image: ImageHandle,
        extent: Extent2D,
        layer_count: u32,
    ) {
        self.state().calls.push(MockCall::CopyBufferToImage {
            command_buffer,
            buffer,
            image,
            extent,
            layer_count,
        });
    }

    fn cmd_transition_image_layout(
        &self,
        command_buffer: CommandBufferHandle,
        image: ImageHandle,
        aspect: ImageAspect,
        old: ImageLayout,
        new: ImageLayout,
    ) {
        self.state().calls.push(MockCall::TransitionImageLayout {
            command_buffer,
            image,
            aspect,
            old,
            new,
        });
    }

    fn submit_one_time(&self, record: &mut dyn FnMut(CommandBufferHandle)) -> Result<()> {
        let command_buffer = {
            let mut state = self.state();
            let command_buffer = CommandBufferHandle(state.create("command_buffer")?);
            state.calls.push(MockCall::AllocateCommandBuffers(vec![command_buffer]));
            state.calls.push(MockCall::BeginCommandBuffer(command_buffer));
            command_buffer
        };

        // Unlocked: the recorder calls back into the device.
        record(command_buffer);

        let mut state = self.state();
        state.calls.push(MockCall::EndCommandBuffer(command_buffer));
        let result = if std::mem::take(&mut state.fail_one_time_submit) {
            Err(Error::SubmitFailed("mock one-time submission failed".to_string()))
        } else {
            state.calls.push(MockCall::SubmitOneTime(command_buffer));
            Ok(())
        };
        state.release(command_buffer.raw(), "command_buffer");
        state.calls.push(MockCall::FreeCommandBuffers(vec![command_buffer]));
        result
    }
}

// ============================================================================
// Mock surface
// ============================================================================

/// Window stand-in with scripted sizes
pub struct MockSurface {
    pub extent: Extent2D,
    pub resized: bool,
    /// Extents reported after each successive `wait_events`
    pub pending_extents: VecDeque<Extent2D>,
    pub wait_events_calls: usize,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: Extent2D::new(width, height),
            resized: false,
            pending_extents: VecDeque::new(),
            wait_events_calls: 0,
        }
    }

    /// Simulate the user resizing the window
    pub fn resize(&mut self, width: u32, height: u32) {
        self.extent = Extent2D::new(width, height);
        self.resized = true;
    }
}

impl crate::device::PresentableSurface for MockSurface {
    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn was_resized(&self) -> bool {
        self.resized
    }

    fn reset_resized_flag(&mut self) {
        self.resized = false;
    }

    fn wait_events(&mut self) {
        self.wait_events_calls += 1;
        match self.pending_extents.pop_front() {
            Some(extent) => self.extent = extent,
            None => panic!("MockSurface::wait_events would block forever"),
        }
    }
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
