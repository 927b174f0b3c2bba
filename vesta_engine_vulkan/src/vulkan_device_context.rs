/// DeviceContext implementation for VulkanDevice

use ash::vk;
use ash::vk::Handle;
use std::ops::Range;
use vesta_engine::vesta::device::{
    AcquireOutcome, BufferDesc, BufferHandle, ClearValue, CommandBufferHandle, DeviceContext,
    Extent2D, FenceHandle, Format, FormatFeatures, FramebufferHandle, ImageAspect, ImageDesc,
    ImageHandle, ImageLayout, ImageTiling, ImageViewHandle, MemoryHandle, PresentOutcome, Rect2D,
    RenderPassDesc, RenderPassHandle, SemaphoreHandle, SubmitInfo, SwapchainDesc, SwapchainHandle,
    SwapchainSupport, Viewport,
};
use vesta_engine::vesta::{Error, Result};
use vesta_engine::{engine_bail, engine_err, engine_error};

use crate::vulkan_device::{VulkanDevice, SOURCE};
use crate::vulkan_format::*;

// ===== HANDLE CONVERSION =====

fn vk_handle<T: Handle>(raw: u64) -> T {
    T::from_raw(raw)
}

fn swapchain(handle: SwapchainHandle) -> vk::SwapchainKHR {
    vk_handle(handle.raw())
}

fn image(handle: ImageHandle) -> vk::Image {
    vk_handle(handle.raw())
}

fn buffer(handle: BufferHandle) -> vk::Buffer {
    vk_handle(handle.raw())
}

fn image_view(handle: ImageViewHandle) -> vk::ImageView {
    vk_handle(handle.raw())
}

fn render_pass(handle: RenderPassHandle) -> vk::RenderPass {
    vk_handle(handle.raw())
}

fn framebuffer(handle: FramebufferHandle) -> vk::Framebuffer {
    vk_handle(handle.raw())
}

fn semaphore(handle: SemaphoreHandle) -> vk::Semaphore {
    vk_handle(handle.raw())
}

fn fence(handle: FenceHandle) -> vk::Fence {
    vk_handle(handle.raw())
}

fn command_buffer(handle: CommandBufferHandle) -> vk::CommandBuffer {
    vk_handle(handle.raw())
}

/// `offset..offset + len` when it fits in `size` bytes
fn byte_range(offset: u64, len: usize, size: usize) -> Option<Range<usize>> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(len)?;
    (end <= size).then_some(start..end)
}

impl VulkanDevice {
    /// Begin, record, end, submit and wait for one temporary command buffer
    fn record_and_wait(&self, cb: vk::CommandBuffer, record: &mut dyn FnMut(CommandBufferHandle)) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            self.device
                .begin_command_buffer(cb, &begin_info)
                .map_err(|e| engine_err!(SOURCE, "Failed to begin one-time command buffer: {:?}", e))?;
        }

        record(CommandBufferHandle(cb.as_raw()));

        let command_buffers = [cb];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        unsafe {
            self.device
                .end_command_buffer(cb)
                .map_err(|e| engine_err!(SOURCE, "Failed to end one-time command buffer: {:?}", e))?;

            let _queue = self.lock_queue()?;
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| engine_err!(SOURCE, "Failed to submit one-time commands: {:?}", e))?;
            self.device
                .queue_wait_idle(self.graphics_queue)
                .map_err(|e| engine_err!(SOURCE, "Failed to wait for one-time commands: {:?}", e))
        }
    }
}

impl DeviceContext for VulkanDevice {
    // ===== SURFACE QUERIES =====

    fn swapchain_support(&self) -> Result<SwapchainSupport> {
        unsafe {
            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| engine_err!(SOURCE, "Failed to query surface capabilities: {:?}", e))?;
            let formats = self
                .surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| engine_err!(SOURCE, "Failed to query surface formats: {:?}", e))?;
            let present_modes = self
                .surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
                .map_err(|e| engine_err!(SOURCE, "Failed to query present modes: {:?}", e))?;

            Ok(SwapchainSupport {
                capabilities: capabilities_from_vk(&capabilities),
                formats: formats.iter().map(surface_format_from_vk).collect(),
                present_modes: present_modes.into_iter().filter_map(present_mode_from_vk).collect(),
            })
        }
    }

    fn find_supported_format(
        &self,
        candidates: &[Format],
        tiling: ImageTiling,
        features: FormatFeatures,
    ) -> Result<Format> {
        let required = format_features_to_vk(features);
        candidates
            .iter()
            .copied()
            .find(|&candidate| {
                let props = unsafe {
                    self.instance
                        .get_physical_device_format_properties(self.physical_device, format_to_vk(candidate))
                };
                let available = match tiling {
                    ImageTiling::Linear => props.linear_tiling_features,
                    ImageTiling::Optimal => props.optimal_tiling_features,
                };
                available.contains(required)
            })
            .ok_or_else(|| {
                engine_error!(SOURCE, "None of {:?} supports {:?} with {:?} tiling", candidates, features, tiling);
                Error::InitializationFailed("Failed to find supported format".to_string())
            })
    }

    // ===== SWAPCHAIN =====

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle> {
        unsafe {
            // pre_transform must match the surface as it is now
            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| engine_err!(SOURCE, "Failed to query surface capabilities: {:?}", e))?;

            let queue_family_indices = [self.graphics_queue_family, self.present_queue_family];

            let mut create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(desc.min_image_count)
                .image_format(format_to_vk(desc.surface_format.format))
                .image_color_space(color_space_to_vk(desc.surface_format.color_space))
                .image_extent(extent_to_vk(desc.extent))
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode_to_vk(desc.present_mode))
                .clipped(true)
                .old_swapchain(swapchain(desc.old_swapchain));

            create_info = if self.graphics_queue_family != self.present_queue_family {
                create_info
                    .image_sharing_mode(vk::SharingMode::CONCURRENT)
                    .queue_family_indices(&queue_family_indices)
            } else {
                create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            };

            let handle = self.swapchain_loader.create_swapchain(&create_info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create swapchain: {:?}", e);
                Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
            })?;

            Ok(SwapchainHandle(handle.as_raw()))
        }
    }

    fn destroy_swapchain(&self, handle: SwapchainHandle) {
        unsafe {
            self.swapchain_loader.destroy_swapchain(swapchain(handle), None);
        }
    }

    fn swapchain_images(&self, handle: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        unsafe {
            let images = self
                .swapchain_loader
                .get_swapchain_images(swapchain(handle))
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to get swapchain images: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                })?;
            Ok(images.into_iter().map(|image| ImageHandle(image.as_raw())).collect())
        }
    }

    fn acquire_next_image(&self, handle: SwapchainHandle, signal: SemaphoreHandle) -> Result<AcquireOutcome> {
        unsafe {
            match self.swapchain_loader.acquire_next_image(
                swapchain(handle),
                u64::MAX,
                semaphore(signal),
                vk::Fence::null(),
            ) {
                Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired { image_index, suboptimal }),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
                Err(e) => Err(engine_err!(SOURCE, "Failed to acquire next swapchain image: {:?}", e)),
            }
        }
    }

    fn queue_present(&self, handle: SwapchainHandle, image_index: u32, wait: SemaphoreHandle) -> Result<PresentOutcome> {
        let wait_semaphores = [semaphore(wait)];
        let swapchains = [swapchain(handle)];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let _queue = self.lock_queue()?;
        unsafe {
            match self.swapchain_loader.queue_present(self.present_queue, &present_info) {
                Ok(false) => Ok(PresentOutcome::Success),
                Ok(true) => Ok(PresentOutcome::Suboptimal),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
                Err(e) => Err(engine_err!(SOURCE, "Failed to present swapchain image: {:?}", e)),
            }
        }
    }

    // ===== IMAGES =====

    fn create_image(&self, desc: &ImageDesc) -> Result<(ImageHandle, MemoryHandle)> {
        unsafe {
            let tiling = match desc.tiling {
                ImageTiling::Linear => vk::ImageTiling::LINEAR,
                ImageTiling::Optimal => vk::ImageTiling::OPTIMAL,
            };
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .extent(vk::Extent3D {
                    width: desc.extent.width,
                    height: desc.extent.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .format(format_to_vk(desc.format))
                .tiling(tiling)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .usage(image_usage_to_vk(desc.usage))
                .samples(vk::SampleCountFlags::TYPE_1)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let vk_image = self
                .device
                .create_image(&image_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create image: {:?}", e))?;

            let requirements = self.device.get_image_memory_requirements(vk_image);

            let memory = self.allocate_and_bind(
                "image",
                requirements,
                gpu_allocator::MemoryLocation::GpuOnly,
                desc.tiling == ImageTiling::Linear,
                |allocation| {
                    self.device
                        .bind_image_memory(vk_image, allocation.memory(), allocation.offset())
                        .map_err(|e| engine_err!(SOURCE, "Failed to bind image memory: {:?}", e))
                },
            );
            match memory {
                Ok(memory) => Ok((ImageHandle(vk_image.as_raw()), memory)),
                Err(e) => {
                    self.device.destroy_image(vk_image, None);
                    Err(e)
                }
            }
        }
    }

    fn destroy_image(&self, handle: ImageHandle, memory: MemoryHandle) {
        unsafe {
            self.device.destroy_image(image(handle), None);
        }
        self.release_memory(memory);
    }

    fn create_image_view(&self, handle: ImageHandle, format: Format, aspect: ImageAspect) -> Result<ImageViewHandle> {
        unsafe {
            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image(handle))
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format_to_vk(format))
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect_to_vk(aspect),
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = self
                .device
                .create_image_view(&view_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create image view: {:?}", e))?;
            Ok(ImageViewHandle(view.as_raw()))
        }
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        unsafe {
            self.device.destroy_image_view(image_view(view), None);
        }
    }

    // ===== BUFFERS =====

    fn create_buffer(&self, desc: &BufferDesc) -> Result<(BufferHandle, MemoryHandle)> {
        if desc.size == 0 {
            engine_bail!(SOURCE, "Buffer size must be non-zero");
        }

        let create_info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(buffer_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        unsafe {
            let vk_buffer = self
                .device
                .create_buffer(&create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create buffer ({} bytes): {:?}", desc.size, e))?;

            let requirements = self.device.get_buffer_memory_requirements(vk_buffer);

            let memory = self.allocate_and_bind(
                "buffer",
                requirements,
                memory_location_to_gpu(desc.location),
                true,
                |allocation| {
                    self.device
                        .bind_buffer_memory(vk_buffer, allocation.memory(), allocation.offset())
                        .map_err(|e| engine_err!(SOURCE, "Failed to bind buffer memory: {:?}", e))
                },
            );
            match memory {
                Ok(memory) => Ok((BufferHandle(vk_buffer.as_raw()), memory)),
                Err(e) => {
                    self.device.destroy_buffer(vk_buffer, None);
                    Err(e)
                }
            }
        }
    }

    fn destroy_buffer(&self, handle: BufferHandle, memory: MemoryHandle) {
        unsafe {
            self.device.destroy_buffer(buffer(handle), None);
        }
        self.release_memory(memory);
    }

    fn write_buffer(&self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()> {
        self.with_allocation(memory, |allocation| {
            let mapped = allocation
                .mapped_slice_mut()
                .ok_or_else(|| engine_err!(SOURCE, "Memory {:?} is not host visible", memory))?;
            let range = byte_range(offset, data.len(), mapped.len()).ok_or_else(|| {
                engine_err!(SOURCE, "Write of {} bytes at {} overruns {} byte allocation", data.len(), offset, mapped.len())
            })?;
            mapped[range].copy_from_slice(data);
            Ok(())
        })
    }

    fn read_buffer(&self, memory: MemoryHandle, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.with_allocation(memory, |allocation| {
            let mapped = allocation
                .mapped_slice()
                .ok_or_else(|| engine_err!(SOURCE, "Memory {:?} is not host visible", memory))?;
            let range = byte_range(offset, len, mapped.len()).ok_or_else(|| {
                engine_err!(SOURCE, "Read of {} bytes at {} overruns {} byte allocation", len, offset, mapped.len())
            })?;
            Ok(mapped[range].to_vec())
        })
    }

    // ===== RENDER PASSES =====

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle> {
        let attachments = [attachment_to_vk(&desc.color), attachment_to_vk(&desc.depth)];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let depth_ref = vk::AttachmentReference {
            attachment: 1,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };

        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref)];

        let dependencies = [vk::SubpassDependency::default()
            .src_subpass(subpass_ref_to_vk(desc.dependency.src_subpass))
            .dst_subpass(desc.dependency.dst_subpass)
            .src_stage_mask(pipeline_stages_to_vk(desc.dependency.src_stages))
            .dst_stage_mask(pipeline_stages_to_vk(desc.dependency.dst_stages))
            .src_access_mask(access_flags_to_vk(desc.dependency.src_access))
            .dst_access_mask(access_flags_to_vk(desc.dependency.dst_access))];

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe {
            let pass = self.device.create_render_pass(&create_info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create render pass: {:?}", e);
                Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
            })?;
            Ok(RenderPassHandle(pass.as_raw()))
        }
    }

    fn destroy_render_pass(&self, handle: RenderPassHandle) {
        unsafe {
            self.device.destroy_render_pass(render_pass(handle), None);
        }
    }

    fn create_framebuffer(
        &self,
        pass: RenderPassHandle,
        attachments: &[ImageViewHandle],
        extent: Extent2D,
    ) -> Result<FramebufferHandle> {
        let views: Vec<vk::ImageView> = attachments.iter().map(|&view| image_view(view)).collect();

        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass(pass))
            .attachments(&views)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        unsafe {
            let fb = self
                .device
                .create_framebuffer(&create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create framebuffer: {:?}", e))?;
            Ok(FramebufferHandle(fb.as_raw()))
        }
    }

    fn destroy_framebuffer(&self, handle: FramebufferHandle) {
        unsafe {
            self.device.destroy_framebuffer(framebuffer(handle), None);
        }
    }

    // ===== SYNCHRONIZATION =====

    fn create_semaphore(&self) -> Result<SemaphoreHandle> {
        unsafe {
            let sem = self
                .device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create semaphore: {:?}", e))?;
            Ok(SemaphoreHandle(sem.as_raw()))
        }
    }

    fn destroy_semaphore(&self, handle: SemaphoreHandle) {
        unsafe {
            self.device.destroy_semaphore(semaphore(handle), None);
        }
    }

    fn create_fence(&self, signaled: bool) -> Result<FenceHandle> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        unsafe {
            let f = self
                .device
                .create_fence(&vk::FenceCreateInfo::default().flags(flags), None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create fence: {:?}", e))?;
            Ok(FenceHandle(f.as_raw()))
        }
    }

    fn destroy_fence(&self, handle: FenceHandle) {
        unsafe {
            self.device.destroy_fence(fence(handle), None);
        }
    }

    fn wait_for_fence(&self, handle: FenceHandle) -> Result<()> {
        unsafe {
            self.device
                .wait_for_fences(&[fence(handle)], true, u64::MAX)
                .map_err(|e| engine_err!(SOURCE, "Failed to wait for fence: {:?}", e))
        }
    }

    fn reset_fence(&self, handle: FenceHandle) -> Result<()> {
        unsafe {
            self.device
                .reset_fences(&[fence(handle)])
                .map_err(|e| engine_err!(SOURCE, "Failed to reset fence: {:?}", e))
        }
    }

    fn queue_submit(&self, submit: &SubmitInfo) -> Result<()> {
        let wait_semaphores = [semaphore(submit.wait_semaphore)];
        let wait_stages = [pipeline_stages_to_vk(submit.wait_stages)];
        let command_buffers = [command_buffer(submit.command_buffer)];
        let signal_semaphores = [semaphore(submit.signal_semaphore)];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        let _queue = self.lock_queue()?;
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], fence(submit.fence))
                .map_err(|e| engine_err!(SOURCE, "Failed to submit commands to GPU queue: {:?}", e))
        }
    }

    fn wait_idle(&self) -> Result<()> {
        let _queue = self.lock_queue()?;
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| engine_err!(SOURCE, "Failed to wait for device idle: {:?}", e))
        }
    }

    // ===== COMMAND BUFFERS =====

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<CommandBufferHandle>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count as u32);

        unsafe {
            let buffers = self.device.allocate_command_buffers(&alloc_info).map_err(|e| {
                engine_error!(SOURCE, "Failed to allocate command buffers: {:?}", e);
                Error::InitializationFailed(format!("Failed to allocate command buffers: {:?}", e))
            })?;
            Ok(buffers.into_iter().map(|cb| CommandBufferHandle(cb.as_raw())).collect())
        }
    }

    fn free_command_buffers(&self, command_buffers: &[CommandBufferHandle]) {
        if command_buffers.is_empty() {
            return;
        }
        let buffers: Vec<vk::CommandBuffer> = command_buffers.iter().map(|&cb| command_buffer(cb)).collect();
        unsafe {
            self.device.free_command_buffers(self.command_pool, &buffers);
        }
    }

    fn begin_command_buffer(&self, handle: CommandBufferHandle) -> Result<()> {
        let cb = command_buffer(handle);
        unsafe {
            self.device
                .reset_command_buffer(cb, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!(SOURCE, "Failed to reset command buffer: {:?}", e))?;
            self.device
                .begin_command_buffer(cb, &vk::CommandBufferBeginInfo::default())
                .map_err(|e| engine_err!(SOURCE, "Failed to begin command buffer: {:?}", e))
        }
    }

    fn end_command_buffer(&self, handle: CommandBufferHandle) -> Result<()> {
        unsafe {
            self.device
                .end_command_buffer(command_buffer(handle))
                .map_err(|e| engine_err!(SOURCE, "Failed to end command buffer: {:?}", e))
        }
    }

    fn cmd_begin_render_pass(
        &self,
        handle: CommandBufferHandle,
        pass: RenderPassHandle,
        fb: FramebufferHandle,
        render_area: Rect2D,
        clear_values: &[ClearValue],
    ) {
        let clear_values: Vec<vk::ClearValue> = clear_values.iter().map(clear_value_to_vk).collect();

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass(pass))
            .framebuffer(framebuffer(fb))
            .render_area(rect_to_vk(&render_area))
            .clear_values(&clear_values);

        unsafe {
            self.device
                .cmd_begin_render_pass(command_buffer(handle), &begin_info, vk::SubpassContents::INLINE);
        }
    }

    fn cmd_end_render_pass(&self, handle: CommandBufferHandle) {
        unsafe {
            self.device.cmd_end_render_pass(command_buffer(handle));
        }
    }

    fn cmd_set_viewport(&self, handle: CommandBufferHandle, viewport: &Viewport) {
        unsafe {
            self.device
                .cmd_set_viewport(command_buffer(handle), 0, &[viewport_to_vk(viewport)]);
        }
    }

    fn cmd_set_scissor(&self, handle: CommandBufferHandle, scissor: &Rect2D) {
        unsafe {
            self.device
                .cmd_set_scissor(command_buffer(handle), 0, &[rect_to_vk(scissor)]);
        }
    }

    fn cmd_copy_buffer(&self, handle: CommandBufferHandle, src: BufferHandle, dst: BufferHandle, size: u64) {
        let region = vk::BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size,
        };
        unsafe {
            self.device
                .cmd_copy_buffer(command_buffer(handle), buffer(src), buffer(dst), &[region]);
        }
    }

    fn cmd_copy_buffer_to_image(
        &self,
        handle: CommandBufferHandle,
        source: BufferHandle,
        target: ImageHandle,
        extent: Extent2D,
        layer_count: u32,
    ) {
        // Zero row length and image height mean tightly packed
        let region = vk::BufferImageCopy::default()
            .buffer_offset(0)
            .buffer_row_length(0)
            .buffer_image_height(0)
            .image_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: 0,
                base_array_layer: 0,
                layer_count,
            })
            .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
            .image_extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            });

        unsafe {
            self.device.cmd_copy_buffer_to_image(
                command_buffer(handle),
                buffer(source),
                image(target),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
        }
    }

    fn cmd_transition_image_layout(
        &self,
        handle: CommandBufferHandle,
        target: ImageHandle,
        aspect: ImageAspect,
        old: ImageLayout,
        new: ImageLayout,
    ) {
        let (src_access, src_stage) = layout_barrier_scope(old);
        let (dst_access, dst_stage) = layout_barrier_scope(new);

        let barrier = vk::ImageMemoryBarrier::default()
            .old_layout(image_layout_to_vk(old))
            .new_layout(image_layout_to_vk(new))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image(target))
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_to_vk(aspect),
                base_mip_level: 0,
                level_count: vk::REMAINING_MIP_LEVELS,
                base_array_layer: 0,
                layer_count: vk::REMAINING_ARRAY_LAYERS,
            })
            .src_access_mask(src_access)
            .dst_access_mask(dst_access);

        unsafe {
            self.device.cmd_pipeline_barrier(
                command_buffer(handle),
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
    }

    // ===== ONE-TIME SUBMISSION =====

    fn submit_one_time(&self, record: &mut dyn FnMut(CommandBufferHandle)) -> Result<()> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let cb = unsafe { self.device.allocate_command_buffers(&alloc_info) }
            .map_err(|e| engine_err!(SOURCE, "Failed to allocate one-time command buffer: {:?}", e))?
            .first()
            .copied()
            .ok_or_else(|| engine_err!(SOURCE, "Driver returned no one-time command buffer"))?;

        let result = self.record_and_wait(cb, record);

        unsafe {
            self.device.free_command_buffers(self.command_pool, &[cb]);
        }
        result
    }
}
