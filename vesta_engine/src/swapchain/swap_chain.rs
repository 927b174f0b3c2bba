/// Swap chain - one generation of presentable images and everything sized to them

use std::sync::Arc;

use crate::config::PresentModePreference;
use crate::device::{
    AcquireOutcome, CommandBufferHandle, DeviceContext, DeviceImage, DeviceObject, Extent2D,
    FenceHandle, Format, FormatFeatures, FramebufferHandle, ImageAspect, ImageDesc, ImageHandle,
    ImageTiling, ImageUsage, ImageViewHandle, PipelineStages, PresentMode, PresentOutcome,
    RenderPassHandle, SubmitInfo, SurfaceFormat, SwapchainDesc, SwapchainHandle,
};
use crate::error::{Error, Result};
use crate::swapchain::frame_sync::FrameSync;
use crate::swapchain::selection::{
    choose_extent, choose_image_count, choose_present_mode, choose_surface_format,
    swap_chain_render_pass_desc, DEPTH_FORMAT_CANDIDATES,
};
use crate::{engine_debug, engine_error, engine_info, engine_warn};

/// Number of frames the CPU may record ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

const SOURCE: &str = "vesta::swapchain";

/// One swap chain generation
///
/// Owns the presentation images' views, one depth image per swap chain image,
/// the render pass, one framebuffer per image and the frame-slot sync objects.
/// All per-image arrays have the same length as the image array.
///
/// Fields release in declaration order on drop, which is the reverse of
/// creation order.
pub struct SwapChain {
    sync: FrameSync,
    framebuffers: Vec<DeviceObject<FramebufferHandle>>,
    depth_image_views: Vec<DeviceObject<ImageViewHandle>>,
    depth_images: Vec<DeviceObject<DeviceImage>>,
    render_pass: DeviceObject<RenderPassHandle>,
    image_views: Vec<DeviceObject<ImageViewHandle>>,
    swapchain: DeviceObject<SwapchainHandle>,

    /// Owned by the presentation engine, released with the swapchain
    images: Vec<ImageHandle>,
    surface_format: SurfaceFormat,
    depth_format: Format,
    present_mode: PresentMode,
    extent: Extent2D,
    device: Arc<dyn DeviceContext>,
}

impl SwapChain {
    /// Build a new generation for a window of `window_extent` pixels
    ///
    /// When `previous` is given, its swapchain is handed over for retirement,
    /// its frame slot position carries over, and the new generation must keep
    /// its color and depth formats. The previous generation is released once
    /// that check passes (or when it fails).
    ///
    /// Creation is all or nothing: on error every object created so far is
    /// released before returning.
    pub fn new(
        device: Arc<dyn DeviceContext>,
        window_extent: Extent2D,
        present_mode_preference: PresentModePreference,
        previous: Option<SwapChain>,
    ) -> Result<Self> {
        let support = device.swapchain_support()?;

        let surface_format = choose_surface_format(&support.formats)?;
        let present_mode = choose_present_mode(&support.present_modes, present_mode_preference);
        let extent = choose_extent(&support.capabilities, window_extent);
        let min_image_count = choose_image_count(&support.capabilities);

        let old_swapchain = previous
            .as_ref()
            .map_or(SwapchainHandle::NULL, |p| p.swapchain.handle());
        let start_slot = previous.as_ref().map_or(0, |p| p.current_slot());

        let swapchain = DeviceObject::new(
            &device,
            device.create_swapchain(&SwapchainDesc {
                min_image_count,
                surface_format,
                extent,
                present_mode,
                old_swapchain,
            })?,
        );

        // The presentation engine may hand out more images than requested.
        let images = device.swapchain_images(swapchain.handle())?;

        let image_views = images
            .iter()
            .map(|&image| {
                device
                    .create_image_view(image, surface_format.format, ImageAspect::Color)
                    .map(|view| DeviceObject::new(&device, view))
            })
            .collect::<Result<Vec<_>>>()?;

        let depth_format = device.find_supported_format(
            &DEPTH_FORMAT_CANDIDATES,
            ImageTiling::Optimal,
            FormatFeatures::DEPTH_STENCIL_ATTACHMENT,
        )?;

        let render_pass = DeviceObject::new(
            &device,
            device.create_render_pass(&swap_chain_render_pass_desc(surface_format.format, depth_format))?,
        );

        let depth_desc = ImageDesc {
            extent,
            format: depth_format,
            tiling: ImageTiling::Optimal,
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
        };
        let mut depth_images = Vec::with_capacity(images.len());
        let mut depth_image_views = Vec::with_capacity(images.len());
        for _ in 0..images.len() {
            let (image, memory) = device.create_image(&depth_desc)?;
            depth_images.push(DeviceObject::new(&device, DeviceImage { image, memory }));
            let view = device.create_image_view(image, depth_format, ImageAspect::Depth)?;
            depth_image_views.push(DeviceObject::new(&device, view));
        }

        let framebuffers = image_views
            .iter()
            .zip(&depth_image_views)
            .map(|(color, depth)| {
                device
                    .create_framebuffer(render_pass.handle(), &[color.handle(), depth.handle()], extent)
                    .map(|fb| DeviceObject::new(&device, fb))
            })
            .collect::<Result<Vec<_>>>()?;

        let sync = FrameSync::new(&device, MAX_FRAMES_IN_FLIGHT, images.len(), start_slot)?;

        let swap_chain = Self {
            sync,
            framebuffers,
            depth_image_views,
            depth_images,
            render_pass,
            image_views,
            swapchain,
            images,
            surface_format,
            depth_format,
            present_mode,
            extent,
            device,
        };

        if let Some(previous) = previous {
            if !previous.compare_swap_formats(&swap_chain) {
                engine_error!(
                    SOURCE,
                    "Swap chain image or depth format has changed ({:?}/{:?} -> {:?}/{:?})",
                    previous.image_format(),
                    previous.depth_format(),
                    swap_chain.image_format(),
                    swap_chain.depth_format()
                );
                return Err(Error::FormatMismatch {
                    previous_color: previous.image_format(),
                    new_color: swap_chain.image_format(),
                    previous_depth: previous.depth_format(),
                    new_depth: swap_chain.depth_format(),
                });
            }
            engine_debug!(SOURCE, "Retiring previous swap chain generation");
            drop(previous);
        }

        engine_info!(
            SOURCE,
            "Swap chain created: {} images, {}x{}, {:?}, depth {:?}, {:?}",
            swap_chain.image_count(),
            extent.width,
            extent.height,
            surface_format.format,
            depth_format,
            present_mode
        );

        Ok(swap_chain)
    }

    // ===== FRAME OPERATIONS =====

    /// Wait for the current frame slot to be free, then request the next image
    ///
    /// Returns `AcquireOutcome::OutOfDate` when the surface changed and this
    /// generation can no longer present.
    pub fn acquire_next_image(&mut self) -> Result<AcquireOutcome> {
        let slot = self.sync.current();
        self.device.wait_for_fence(slot.in_flight())?;

        let outcome = self
            .device
            .acquire_next_image(self.swapchain.handle(), slot.image_available())
            .map_err(|e| match e {
                Error::AcquireFailed(_) => e,
                other => {
                    engine_error!(SOURCE, "Failed to acquire swap chain image: {}", other);
                    Error::AcquireFailed(other.to_string())
                }
            })?;

        if let AcquireOutcome::Acquired { image_index, suboptimal } = outcome {
            if image_index as usize >= self.images.len() {
                engine_error!(SOURCE, "Presentation engine returned image {} of {}", image_index, self.images.len());
                return Err(Error::AcquireFailed(format!(
                    "image index {} out of range",
                    image_index
                )));
            }
            if suboptimal {
                engine_warn!(SOURCE, "Acquired image {} from a suboptimal swap chain", image_index);
            }
        }

        Ok(outcome)
    }

    /// Submit `command_buffer` for `image_index`, queue the image for
    /// presentation and move to the next frame slot
    pub fn submit_and_present(
        &mut self,
        command_buffer: CommandBufferHandle,
        image_index: u32,
    ) -> Result<PresentOutcome> {
        let index = image_index as usize;
        assert!(index < self.images.len(), "image index {} out of range", image_index);

        // A previous frame slot may still be rendering into this image.
        if let Some(fence) = self.sync.image_fence(index) {
            self.device.wait_for_fence(fence)?;
        }
        self.sync.claim_image(index);

        let slot = self.sync.current();
        let submit = SubmitInfo {
            command_buffer,
            wait_semaphore: slot.image_available(),
            wait_stages: PipelineStages::COLOR_ATTACHMENT_OUTPUT,
            signal_semaphore: slot.render_finished(),
            fence: slot.in_flight(),
        };
        let render_finished = slot.render_finished();

        self.device.reset_fence(submit.fence)?;
        self.device.queue_submit(&submit).map_err(|e| match e {
            Error::SubmitFailed(_) => e,
            other => {
                engine_error!(SOURCE, "Failed to submit draw command buffer: {}", other);
                Error::SubmitFailed(other.to_string())
            }
        })?;

        let outcome = self
            .device
            .queue_present(self.swapchain.handle(), image_index, render_finished)
            .map_err(|e| match e {
                Error::SubmitFailed(_) => e,
                other => {
                    engine_error!(SOURCE, "Failed to present swap chain image: {}", other);
                    Error::SubmitFailed(other.to_string())
                }
            })?;

        self.sync.advance();

        Ok(outcome)
    }

    /// True when `other` uses the same color and depth formats
    pub fn compare_swap_formats(&self, other: &SwapChain) -> bool {
        self.depth_format == other.depth_format && self.surface_format.format == other.surface_format.format
    }

    // ===== QUERIES =====

    pub fn framebuffer(&self, index: usize) -> FramebufferHandle {
        self.framebuffers[index].handle()
    }

    pub fn render_pass(&self) -> RenderPassHandle {
        self.render_pass.handle()
    }

    pub fn image_view(&self, index: usize) -> ImageViewHandle {
        self.image_views[index].handle()
    }

    pub fn depth_image_view(&self, index: usize) -> ImageViewHandle {
        self.depth_image_views[index].handle()
    }

    pub fn depth_image(&self, index: usize) -> ImageHandle {
        self.depth_images[index].handle().image
    }

    pub fn image(&self, index: usize) -> ImageHandle {
        self.images[index]
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn handle(&self) -> SwapchainHandle {
        self.swapchain.handle()
    }

    pub fn image_format(&self) -> Format {
        self.surface_format.format
    }

    pub fn surface_format(&self) -> SurfaceFormat {
        self.surface_format
    }

    pub fn depth_format(&self) -> Format {
        self.depth_format
    }

    pub fn present_mode(&self) -> PresentMode {
        self.present_mode
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn width(&self) -> u32 {
        self.extent.width
    }

    pub fn height(&self) -> u32 {
        self.extent.height
    }

    pub fn extent_aspect_ratio(&self) -> f32 {
        self.extent.aspect_ratio()
    }

    /// Frame slot the next acquire/submit pair uses
    pub fn current_slot(&self) -> usize {
        self.sync.current_slot()
    }

    /// Fence of the frame slot that last rendered into `image_index`
    pub fn image_fence(&self, image_index: usize) -> Option<FenceHandle> {
        self.sync.image_fence(image_index)
    }

    /// In-flight fence of frame slot `slot`
    pub fn slot_fence(&self, slot: usize) -> FenceHandle {
        self.sync.slot(slot).in_flight()
    }
}

impl std::fmt::Debug for SwapChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapChain")
            .field("swapchain", &self.swapchain.handle())
            .field("images", &self.images.len())
            .field("extent", &self.extent)
            .field("surface_format", &self.surface_format)
            .field("depth_format", &self.depth_format)
            .field("present_mode", &self.present_mode)
            .finish()
    }
}

#[cfg(test)]
#[path = "swap_chain_tests.rs"]
mod tests;
