/*!
# Vesta Engine - Vulkan Backend

Vulkan implementation of the `DeviceContext` interface from `vesta_engine`,
built on Ash for the API bindings and gpu-allocator for image and buffer
memory, plus a winit window implementing `PresentableSurface`.
*/

mod debug;
mod rollback;
mod vulkan_device;
mod vulkan_device_context;
mod vulkan_format;
mod winit_surface;

pub use vulkan_device::VulkanDevice;
pub use winit_surface::WinitSurface;

// Re-export debug utilities
pub use debug::{print_validation_stats_report, validation_stats, ValidationStats};
