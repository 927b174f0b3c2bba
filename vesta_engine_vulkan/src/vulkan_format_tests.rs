//! Unit tests for Vulkan conversion functions
//!
//! Pure mappings, no GPU required.

use ash::vk;
use vesta_engine::vesta::device::{
    AccessFlags, BufferUsage, ClearValue, ColorSpace, Extent2D, Format, FormatFeatures,
    ImageLayout, MemoryLocation, PipelineStages, PresentMode, Rect2D, SubpassRef,
};
use vesta_engine::vesta::swapchain::swap_chain_render_pass_desc;

use crate::vulkan_format::*;

// ============================================================================
// FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_named_formats_map_both_ways() {
    for format in [
        Format::B8G8R8A8_SRGB,
        Format::B8G8R8A8_UNORM,
        Format::R8G8B8A8_SRGB,
        Format::R8G8B8A8_UNORM,
        Format::A2B10G10R10_UNORM,
        Format::D32_FLOAT,
        Format::D32_FLOAT_S8_UINT,
        Format::D24_UNORM_S8_UINT,
    ] {
        assert_eq!(format_from_vk(format_to_vk(format)), format);
    }
}

#[test]
fn test_depth_formats_use_vulkan_names() {
    assert_eq!(format_to_vk(Format::D32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(format_to_vk(Format::D32_FLOAT_S8_UINT), vk::Format::D32_SFLOAT_S8_UINT);
    assert_eq!(format_to_vk(Format::D24_UNORM_S8_UINT), vk::Format::D24_UNORM_S8_UINT);
}

#[test]
fn test_unknown_format_keeps_raw_value() {
    let vk_format = vk::Format::BC7_SRGB_BLOCK;
    let format = format_from_vk(vk_format);
    assert_eq!(format, Format::Other(vk_format.as_raw()));
    assert_eq!(format_to_vk(format), vk_format);
}

#[test]
fn test_color_space_mapping() {
    assert_eq!(color_space_from_vk(vk::ColorSpaceKHR::SRGB_NONLINEAR), ColorSpace::SrgbNonlinear);
    let hdr = vk::ColorSpaceKHR::HDR10_ST2084_EXT;
    assert_eq!(color_space_to_vk(color_space_from_vk(hdr)), hdr);
}

// ============================================================================
// PRESENT MODE TESTS
// ============================================================================

#[test]
fn test_present_mode_mapping() {
    for mode in [PresentMode::Immediate, PresentMode::Mailbox, PresentMode::Fifo, PresentMode::FifoRelaxed] {
        assert_eq!(present_mode_from_vk(present_mode_to_vk(mode)), Some(mode));
    }
    assert_eq!(present_mode_from_vk(vk::PresentModeKHR::SHARED_DEMAND_REFRESH), None);
}

// ============================================================================
// CAPABILITIES + FLAGS
// ============================================================================

#[test]
fn test_capabilities_keep_extent_sentinel() {
    let caps = vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 0,
        current_extent: vk::Extent2D { width: u32::MAX, height: u32::MAX },
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 8192, height: 8192 },
        ..Default::default()
    };
    let converted = capabilities_from_vk(&caps);
    assert!(!converted.has_fixed_extent());
    assert_eq!(converted.max_image_count, 0);
    assert_eq!(converted.max_image_extent, Extent2D::new(8192, 8192));
}

#[test]
fn test_flag_conversions() {
    assert_eq!(
        format_features_to_vk(FormatFeatures::DEPTH_STENCIL_ATTACHMENT),
        vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT
    );
    assert_eq!(
        pipeline_stages_to_vk(PipelineStages::COLOR_ATTACHMENT_OUTPUT | PipelineStages::EARLY_FRAGMENT_TESTS),
        vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
    );
    assert_eq!(access_flags_to_vk(AccessFlags::empty()), vk::AccessFlags::empty());
}

// ============================================================================
// RENDER PASS + RECORDING
// ============================================================================

#[test]
fn test_swap_chain_render_pass_attachments() {
    let desc = swap_chain_render_pass_desc(Format::B8G8R8A8_SRGB, Format::D32_FLOAT);

    let color = attachment_to_vk(&desc.color);
    assert_eq!(color.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(color.load_op, vk::AttachmentLoadOp::CLEAR);
    assert_eq!(color.store_op, vk::AttachmentStoreOp::STORE);
    assert_eq!(color.final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    assert_eq!(color.samples, vk::SampleCountFlags::TYPE_1);

    let depth = attachment_to_vk(&desc.depth);
    assert_eq!(depth.store_op, vk::AttachmentStoreOp::DONT_CARE);
    assert_eq!(depth.final_layout, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    assert_eq!(subpass_ref_to_vk(SubpassRef::External), vk::SUBPASS_EXTERNAL);
    assert_eq!(subpass_ref_to_vk(SubpassRef::Index(0)), 0);
    assert_eq!(image_layout_to_vk(ImageLayout::Undefined), vk::ImageLayout::UNDEFINED);
}

#[test]
fn test_clear_values() {
    let color = clear_value_to_vk(&ClearValue::Color([0.01, 0.01, 0.01, 1.0]));
    let depth = clear_value_to_vk(&ClearValue::DepthStencil { depth: 1.0, stencil: 0 });
    unsafe {
        assert_eq!(color.color.float32, [0.01, 0.01, 0.01, 1.0]);
        assert_eq!(depth.depth_stencil.depth, 1.0);
        assert_eq!(depth.depth_stencil.stencil, 0);
    }
}

#[test]
fn test_rect_conversion() {
    let rect = rect_to_vk(&Rect2D { x: 0, y: 0, extent: Extent2D::new(800, 600) });
    assert_eq!(rect.offset.x, 0);
    assert_eq!(rect.extent.width, 800);
    assert_eq!(rect.extent.height, 600);
}

#[test]
fn test_buffer_usage_and_memory_location() {
    let usage = buffer_usage_to_vk(BufferUsage::TRANSFER_SRC | BufferUsage::VERTEX);
    assert_eq!(usage, vk::BufferUsageFlags::TRANSFER_SRC | vk::BufferUsageFlags::VERTEX_BUFFER);
    assert_eq!(buffer_usage_to_vk(BufferUsage::empty()), vk::BufferUsageFlags::empty());

    assert_eq!(memory_location_to_gpu(MemoryLocation::GpuOnly), gpu_allocator::MemoryLocation::GpuOnly);
    assert_eq!(memory_location_to_gpu(MemoryLocation::CpuToGpu), gpu_allocator::MemoryLocation::CpuToGpu);
    assert_eq!(memory_location_to_gpu(MemoryLocation::GpuToCpu), gpu_allocator::MemoryLocation::GpuToCpu);
}

#[test]
fn test_upload_transition_scopes() {
    assert_eq!(
        image_layout_to_vk(ImageLayout::TransferDstOptimal),
        vk::ImageLayout::TRANSFER_DST_OPTIMAL
    );

    let (src_access, src_stage) = layout_barrier_scope(ImageLayout::Undefined);
    assert!(src_access.is_empty());
    assert_eq!(src_stage, vk::PipelineStageFlags::TOP_OF_PIPE);

    let (dst_access, dst_stage) = layout_barrier_scope(ImageLayout::TransferDstOptimal);
    assert_eq!(dst_access, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(dst_stage, vk::PipelineStageFlags::TRANSFER);

    let (read_access, read_stage) = layout_barrier_scope(ImageLayout::ShaderReadOnlyOptimal);
    assert_eq!(read_access, vk::AccessFlags::SHADER_READ);
    assert_eq!(read_stage, vk::PipelineStageFlags::FRAGMENT_SHADER);
}
