//! Swap chain sizing decisions
//!
//! Pure functions of the surface capabilities, so each rebuild makes the same
//! choices for the same surface.

use crate::config::PresentModePreference;
use crate::device::{
    AccessFlags, AttachmentDesc, ColorSpace, Extent2D, Format, ImageLayout, LoadOp,
    PipelineStages, PresentMode, RenderPassDesc, StoreOp, SubpassDependency, SubpassRef,
    SurfaceCapabilities, SurfaceFormat,
};
use crate::engine_error;
use crate::error::{Error, Result};

/// Depth formats tried in order, all with optimal tiling
pub const DEPTH_FORMAT_CANDIDATES: [Format; 3] = [
    Format::D32_FLOAT,
    Format::D32_FLOAT_S8_UINT,
    Format::D24_UNORM_S8_UINT,
];

/// BGRA sRGB with a nonlinear sRGB color space, else the first format offered
pub fn choose_surface_format(available: &[SurfaceFormat]) -> Result<SurfaceFormat> {
    let preferred = available.iter().find(|f| {
        f.format == Format::B8G8R8A8_SRGB && f.color_space == ColorSpace::SrgbNonlinear
    });

    match preferred.or_else(|| available.first()) {
        Some(format) => Ok(*format),
        None => {
            engine_error!("vesta::swapchain", "Surface reports no supported formats");
            Err(Error::InitializationFailed(
                "surface reports no supported formats".to_string(),
            ))
        }
    }
}

/// Walk the preference's mode list and take the first one available; FIFO otherwise
pub fn choose_present_mode(
    available: &[PresentMode],
    preference: PresentModePreference,
) -> PresentMode {
    let wanted: &[PresentMode] = match preference {
        PresentModePreference::LowLatency => &[PresentMode::Mailbox],
        PresentModePreference::NoVsync => &[PresentMode::Immediate, PresentMode::Mailbox],
        PresentModePreference::Vsync => &[],
    };

    wanted
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .unwrap_or(PresentMode::Fifo)
}

/// The surface's fixed extent when it has one, else the window extent clamped
/// into the supported range
pub fn choose_extent(capabilities: &SurfaceCapabilities, window_extent: Extent2D) -> Extent2D {
    if capabilities.has_fixed_extent() {
        return capabilities.current_extent;
    }

    let min = capabilities.min_image_extent;
    let max = capabilities.max_image_extent;
    Extent2D::new(
        window_extent.width.clamp(min.width, max.width.max(min.width)),
        window_extent.height.clamp(min.height, max.height.max(min.height)),
    )
}

/// One more than the minimum, capped by the maximum (zero means unbounded)
pub fn choose_image_count(capabilities: &SurfaceCapabilities) -> u32 {
    let count = capabilities.min_image_count.saturating_add(1);
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

/// Color + depth, single subpass, cleared each frame, color handed to the presentation engine
pub fn swap_chain_render_pass_desc(color_format: Format, depth_format: Format) -> RenderPassDesc {
    RenderPassDesc {
        color: AttachmentDesc {
            format: color_format,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::PresentSrc,
        },
        depth: AttachmentDesc {
            format: depth_format,
            load_op: LoadOp::Clear,
            store_op: StoreOp::DontCare,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::DepthStencilAttachmentOptimal,
        },
        // Attachment writes wait for the acquired image and the previous depth use.
        dependency: SubpassDependency {
            src_subpass: SubpassRef::External,
            dst_subpass: 0,
            src_stages: PipelineStages::COLOR_ATTACHMENT_OUTPUT
                | PipelineStages::EARLY_FRAGMENT_TESTS,
            dst_stages: PipelineStages::COLOR_ATTACHMENT_OUTPUT
                | PipelineStages::EARLY_FRAGMENT_TESTS,
            src_access: AccessFlags::empty(),
            dst_access: AccessFlags::COLOR_ATTACHMENT_WRITE
                | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        },
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
