//! Backend-neutral value types exchanged with a `DeviceContext`

use bitflags::bitflags;

use crate::device::{CommandBufferHandle, FenceHandle, SemaphoreHandle, SwapchainHandle};

// ===== EXTENTS =====

/// Size of a 2D surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (minimized window)
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

// ===== FORMATS =====

/// Pixel formats the presentation layer deals with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Format {
    UNDEFINED,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
    D16_UNORM,
    D32_FLOAT,
    D32_FLOAT_S8_UINT,
    D24_UNORM_S8_UINT,
    /// Backend format without a named variant (raw backend value)
    Other(i32),
}

impl Format {
    pub fn has_depth(&self) -> bool {
        matches!(
            self,
            Format::D16_UNORM | Format::D32_FLOAT | Format::D32_FLOAT_S8_UINT | Format::D24_UNORM_S8_UINT
        )
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self, Format::D32_FLOAT_S8_UINT | Format::D24_UNORM_S8_UINT)
    }
}

/// Color space of presented images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonlinear,
    /// Backend color space without a named variant
    Other(i32),
}

/// Format + color space pair offered by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub format: Format,
    pub color_space: ColorSpace,
}

/// Presentation scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentMode {
    /// No waiting for vertical blank, may tear
    Immediate,
    /// Single-entry queue, newest image replaces the pending one
    Mailbox,
    /// Vertical-blank synchronized queue, always supported
    Fifo,
    /// FIFO that tears when a frame arrives late
    FifoRelaxed,
}

/// Image tiling used when querying format support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTiling {
    Linear,
    Optimal,
}

/// Which part of an image a view covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAspect {
    Color,
    Depth,
}

bitflags! {
    /// Format capabilities required from a candidate format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatFeatures: u32 {
        const SAMPLED_IMAGE = 1 << 0;
        const COLOR_ATTACHMENT = 1 << 1;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 2;
    }

    /// Image usage
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const SAMPLED = 1 << 2;
        const COLOR_ATTACHMENT = 1 << 3;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 4;
    }

    /// Pipeline stages used in dependencies and semaphore waits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const EARLY_FRAGMENT_TESTS = 1 << 1;
        const LATE_FRAGMENT_TESTS = 1 << 2;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 3;
        const BOTTOM_OF_PIPE = 1 << 4;
    }

    /// Buffer usage
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const VERTEX = 1 << 2;
        const INDEX = 1 << 3;
        const UNIFORM = 1 << 4;
    }

    /// Memory access kinds used in dependencies
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const COLOR_ATTACHMENT_READ = 1 << 0;
        const COLOR_ATTACHMENT_WRITE = 1 << 1;
        const DEPTH_STENCIL_ATTACHMENT_READ = 1 << 2;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 3;
    }
}

// ===== SURFACE QUERIES =====

/// Surface limits reported by the presentation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// Zero means no upper bound
    pub max_image_count: u32,
    /// `width == u32::MAX` means the surface takes whatever size the swapchain picks
    pub current_extent: Extent2D,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
}

impl SurfaceCapabilities {
    pub fn has_fixed_extent(&self) -> bool {
        self.current_extent.width != u32::MAX
    }
}

/// Everything needed to size a swapchain for a surface
#[derive(Debug, Clone, PartialEq)]
pub struct SwapchainSupport {
    pub capabilities: SurfaceCapabilities,
    pub formats: Vec<SurfaceFormat>,
    pub present_modes: Vec<PresentMode>,
}

// ===== CREATION DESCRIPTORS =====

/// Parameters for a new swapchain (images are always color attachments)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub min_image_count: u32,
    pub surface_format: SurfaceFormat,
    pub extent: Extent2D,
    pub present_mode: PresentMode,
    /// Swapchain being replaced, or null
    pub old_swapchain: SwapchainHandle,
}

/// Parameters for a device-local 2D image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub extent: Extent2D,
    pub format: Format,
    pub tiling: ImageTiling,
    pub usage: ImageUsage,
}

/// Where an allocation lives and who may touch it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLocation {
    /// Device local, not mapped
    GpuOnly,
    /// Host visible, written by the CPU and read by the GPU (staging, uniforms)
    CpuToGpu,
    /// Host visible, written by the GPU and read back by the CPU
    GpuToCpu,
}

/// Parameters for a linear buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes, non-zero
    pub size: u64,
    pub usage: BufferUsage,
    pub location: MemoryLocation,
}

impl MemoryLocation {
    /// True when the CPU can map the memory for reads and writes
    pub fn is_host_visible(&self) -> bool {
        !matches!(self, MemoryLocation::GpuOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    Undefined,
    ColorAttachmentOptimal,
    DepthStencilAttachmentOptimal,
    TransferDstOptimal,
    ShaderReadOnlyOptimal,
    PresentSrc,
}

/// One render pass attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDesc {
    pub format: Format,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

/// Source of a subpass dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubpassRef {
    /// Work submitted before the render pass
    External,
    Index(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependency {
    pub src_subpass: SubpassRef,
    pub dst_subpass: u32,
    pub src_stages: PipelineStages,
    pub dst_stages: PipelineStages,
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
}

/// Single-subpass render pass: color attachment 0, depth attachment 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPassDesc {
    pub color: AttachmentDesc,
    pub depth: AttachmentDesc,
    pub dependency: SubpassDependency,
}

// ===== RECORDING =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub extent: Extent2D,
}

/// One queue submission of a recorded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitInfo {
    pub command_buffer: CommandBufferHandle,
    pub wait_semaphore: SemaphoreHandle,
    pub wait_stages: PipelineStages,
    pub signal_semaphore: SemaphoreHandle,
    /// Signaled when the GPU finishes this submission
    pub fence: FenceHandle,
}

// ===== OUTCOMES =====

/// Result of asking the presentation engine for the next image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image is ready to render into; `suboptimal` means it still presents,
    /// but the swap chain no longer matches the surface exactly
    Acquired { image_index: u32, suboptimal: bool },
    /// The surface changed and the swap chain must be rebuilt before use
    OutOfDate,
}

/// Result of queueing an image for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Success,
    Suboptimal,
    OutOfDate,
}

impl PresentOutcome {
    /// True when the swap chain should be rebuilt before the next frame
    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, PresentOutcome::Success)
    }
}
