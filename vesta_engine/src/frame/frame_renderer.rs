//! Frame renderer - drives the per-frame acquire / record / submit / present cycle
//!
//! Owns the swap chain and one command buffer per frame slot, and rebuilds the
//! swap chain whenever the surface reports it stale, suboptimal or resized.

use std::sync::Arc;

use crate::config::Config;
use crate::device::{
    AcquireOutcome, ClearValue, CommandBufferHandle, DeviceContext, PresentOutcome,
    PresentableSurface, RenderPassHandle,
};
use crate::error::Result;
use crate::frame::RenderTargetDescriptor;
use crate::swapchain::{SwapChain, MAX_FRAMES_IN_FLIGHT};
use crate::{engine_debug, engine_info, engine_warn};

const SOURCE: &str = "vesta::frame";

/// Where the renderer is within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Between frames; `begin_frame` is the only valid frame call
    Idle,
    /// A command buffer is recording for the acquired image
    FrameInProgress,
}

/// Frame loop driver for one presentation surface
///
/// ```text
/// while running {
///     if let Some(cb) = renderer.begin_frame()? {
///         renderer.begin_render_pass(cb);
///         // record draws into cb
///         renderer.end_render_pass(cb);
///         renderer.end_frame()?;
///     }
/// }
/// ```
///
/// Calling frame operations out of order is a programming error and panics.
pub struct FrameRenderer<S: PresentableSurface> {
    device: Arc<dyn DeviceContext>,
    surface: S,
    config: Config,
    /// `None` only if a rebuild failed, which is fatal
    swap_chain: Option<SwapChain>,
    command_buffers: Vec<CommandBufferHandle>,
    current_image_index: u32,
    current_frame_index: usize,
    state: FrameState,
    rebuild_count: u64,
}

impl<S: PresentableSurface> FrameRenderer<S> {
    /// Build the first swap chain and allocate the per-slot command buffers
    ///
    /// Blocks while the surface is minimized.
    pub fn new(device: Arc<dyn DeviceContext>, surface: S, config: Config) -> Result<Self> {
        let mut renderer = Self {
            device,
            surface,
            config,
            swap_chain: None,
            command_buffers: Vec::new(),
            current_image_index: 0,
            current_frame_index: 0,
            state: FrameState::Idle,
            rebuild_count: 0,
        };

        renderer.recreate_swap_chain()?;
        renderer.command_buffers = renderer.device.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT)?;

        engine_info!(
            SOURCE,
            "Frame renderer ready ({} frames in flight)",
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(renderer)
    }

    // ===== FRAME LIFECYCLE =====

    /// Acquire the next image and start recording this slot's command buffer
    ///
    /// Returns `None` when the swap chain was stale and had to be rebuilt; the
    /// caller skips drawing for this tick and tries again next tick.
    pub fn begin_frame(&mut self) -> Result<Option<CommandBufferHandle>> {
        assert!(
            self.state == FrameState::Idle,
            "Can't call begin_frame while already in progress"
        );

        match self.swap_chain_mut().acquire_next_image()? {
            AcquireOutcome::OutOfDate => {
                engine_debug!(SOURCE, "Swap chain out of date on acquire, rebuilding");
                self.recreate_swap_chain()?;
                Ok(None)
            }
            AcquireOutcome::Acquired { image_index, .. } => {
                self.current_image_index = image_index;
                self.state = FrameState::FrameInProgress;

                let command_buffer = self.command_buffers[self.current_frame_index];
                self.device.begin_command_buffer(command_buffer)?;
                Ok(Some(command_buffer))
            }
        }
    }

    /// Finish recording, submit, present and move to the next frame slot
    ///
    /// Rebuilds the swap chain when presentation reports it stale or
    /// suboptimal, or when the surface was resized.
    pub fn end_frame(&mut self) -> Result<()> {
        assert!(
            self.state == FrameState::FrameInProgress,
            "Can't call end_frame while frame is not in progress"
        );

        let command_buffer = self.current_command_buffer();
        let image_index = self.current_image_index;
        self.device.end_command_buffer(command_buffer)?;

        let outcome = self
            .swap_chain_mut()
            .submit_and_present(command_buffer, image_index)?;

        self.state = FrameState::Idle;
        self.current_frame_index = (self.current_frame_index + 1) % MAX_FRAMES_IN_FLIGHT;
        debug_assert_eq!(self.current_frame_index, self.swap_chain().current_slot());

        if outcome.needs_rebuild() || self.surface.was_resized() {
            if outcome != PresentOutcome::Success {
                engine_debug!(SOURCE, "Present reported {:?}, rebuilding", outcome);
            }
            self.surface.reset_resized_flag();
            self.recreate_swap_chain()?;
        }

        Ok(())
    }

    /// Begin the swap chain render pass on `command_buffer`
    ///
    /// Clears color and depth, and sets a viewport and scissor covering the
    /// whole image.
    pub fn begin_render_pass(&mut self, command_buffer: CommandBufferHandle) {
        assert!(
            self.state == FrameState::FrameInProgress,
            "Can't call begin_render_pass if frame is not in progress"
        );
        assert!(
            command_buffer == self.current_command_buffer(),
            "Can't begin render pass on command buffer from a different frame"
        );

        let target = self.render_target();
        let clear_values = [
            ClearValue::Color(self.config.clear_color),
            ClearValue::DepthStencil {
                depth: self.config.clear_depth,
                stencil: self.config.clear_stencil,
            },
        ];

        self.device.cmd_begin_render_pass(
            command_buffer,
            target.render_pass,
            target.framebuffer,
            target.scissor(),
            &clear_values,
        );
        self.device.cmd_set_viewport(command_buffer, &target.viewport());
        self.device.cmd_set_scissor(command_buffer, &target.scissor());
    }

    pub fn end_render_pass(&mut self, command_buffer: CommandBufferHandle) {
        assert!(
            self.state == FrameState::FrameInProgress,
            "Can't call end_render_pass if frame is not in progress"
        );
        assert!(
            command_buffer == self.current_command_buffer(),
            "Can't end render pass on command buffer from a different frame"
        );

        self.device.cmd_end_render_pass(command_buffer);
    }

    // ===== QUERIES =====

    pub fn render_pass(&self) -> RenderPassHandle {
        self.swap_chain().render_pass()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.swap_chain().extent_aspect_ratio()
    }

    pub fn is_frame_in_progress(&self) -> bool {
        self.state == FrameState::FrameInProgress
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn current_command_buffer(&self) -> CommandBufferHandle {
        assert!(
            self.state == FrameState::FrameInProgress,
            "Cannot get command buffer when frame not in progress"
        );
        self.command_buffers[self.current_frame_index]
    }

    /// Frame slot being recorded, in `0..MAX_FRAMES_IN_FLIGHT`
    pub fn frame_index(&self) -> usize {
        assert!(
            self.state == FrameState::FrameInProgress,
            "Cannot get frame index when frame not in progress"
        );
        self.current_frame_index
    }

    /// Swap chain image acquired for the frame in progress
    pub fn image_index(&self) -> u32 {
        assert!(
            self.state == FrameState::FrameInProgress,
            "Cannot get image index when frame not in progress"
        );
        self.current_image_index
    }

    pub fn render_target(&self) -> RenderTargetDescriptor {
        let swap_chain = self.swap_chain();
        let image_index = self.image_index();
        RenderTargetDescriptor {
            render_pass: swap_chain.render_pass(),
            framebuffer: swap_chain.framebuffer(image_index as usize),
            extent: swap_chain.extent(),
            image_index,
        }
    }

    pub fn swap_chain(&self) -> &SwapChain {
        self.swap_chain
            .as_ref()
            .expect("swap chain missing after a failed rebuild")
    }

    fn swap_chain_mut(&mut self) -> &mut SwapChain {
        self.swap_chain
            .as_mut()
            .expect("swap chain missing after a failed rebuild")
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of swap chain generations built after the first one
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    // ===== REBUILD =====

    /// Replace the swap chain with one sized to the current surface
    ///
    /// Waits out a minimized window, then waits for the device to go idle so no
    /// in-flight frame still references the old generation.
    fn recreate_swap_chain(&mut self) -> Result<()> {
        let mut extent = self.surface.extent();
        if extent.is_zero() {
            engine_debug!(SOURCE, "Surface minimized, waiting for a drawable size");
        }
        while extent.is_zero() {
            self.surface.wait_events();
            extent = self.surface.extent();
        }

        self.device.wait_idle()?;

        let previous = self.swap_chain.take();
        let is_rebuild = previous.is_some();
        let swap_chain = SwapChain::new(
            Arc::clone(&self.device),
            extent,
            self.config.present_mode,
            previous,
        )?;

        if is_rebuild {
            self.rebuild_count += 1;
            engine_debug!(
                SOURCE,
                "Swap chain rebuilt ({}x{}, rebuild #{})",
                swap_chain.width(),
                swap_chain.height(),
                self.rebuild_count
            );
        }
        self.swap_chain = Some(swap_chain);

        Ok(())
    }
}

impl<S: PresentableSurface> Drop for FrameRenderer<S> {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            engine_warn!(SOURCE, "wait_idle failed during shutdown: {}", e);
        }
        self.swap_chain = None;
        if !self.command_buffers.is_empty() {
            self.device.free_command_buffers(&self.command_buffers);
            self.command_buffers.clear();
        }
    }
}

#[cfg(test)]
#[path = "frame_renderer_tests.rs"]
mod tests;
