/// VulkanDevice - Vulkan implementation of the DeviceContext trait
///
/// Owns the instance, the presentation surface, the logical device, its
/// queues, the command pool command buffers come from and the memory
/// allocator backing images and buffers.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::FxHashMap;
use std::ffi::{CStr, CString};
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use vesta_engine::vesta::device::MemoryHandle;
use vesta_engine::vesta::{Config, Error, Result};
use vesta_engine::{engine_debug, engine_err, engine_error, engine_info, engine_warn};

use crate::rollback::Rollback;

pub(crate) const SOURCE: &str = "vesta::vulkan";

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Queue family pair chosen for a physical device
#[derive(Debug, Clone, Copy)]
struct QueueFamilies {
    graphics: u32,
    present: u32,
}

/// Vulkan logical device bound to one window surface
pub struct VulkanDevice {
    pub(crate) _entry: ash::Entry,
    pub(crate) instance: ash::Instance,
    pub(crate) debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    pub(crate) surface_loader: ash::khr::surface::Instance,
    pub(crate) surface: vk::SurfaceKHR,

    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) device: ash::Device,
    pub(crate) swapchain_loader: ash::khr::swapchain::Device,

    pub(crate) graphics_queue: vk::Queue,
    pub(crate) graphics_queue_family: u32,
    pub(crate) present_queue: vk::Queue,
    pub(crate) present_queue_family: u32,
    /// Queues require external synchronization for submit and present
    pub(crate) queue_lock: Mutex<()>,

    /// Frame and one-time command buffers (RESET_COMMAND_BUFFER so each can be re-recorded)
    pub(crate) command_pool: vk::CommandPool,

    /// Wrapped in ManuallyDrop so it is dropped before the device is destroyed
    pub(crate) allocator: ManuallyDrop<Mutex<Allocator>>,
    /// Live allocations keyed by the raw `MemoryHandle` given out for them
    pub(crate) allocations: Mutex<FxHashMap<u64, Allocation>>,
    pub(crate) next_memory_id: AtomicU64,

    device_name: String,
}

impl VulkanDevice {
    /// Create a Vulkan device presenting into `window`
    ///
    /// # Arguments
    ///
    /// * `window` - Window for surface creation
    /// * `config` - Engine configuration (validation, app identity)
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!(SOURCE, "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let app_name = CString::new(config.app_name.as_str()).map_err(|e| {
                engine_error!(SOURCE, "Invalid application name: {}", e);
                Error::InitializationFailed(format!("Invalid application name: {}", e))
            })?;
            let (major, minor, patch) = config.app_version;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Vesta")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            let display_handle = window.display_handle().map_err(|e| {
                engine_error!(SOURCE, "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            let enable_validation = config.enable_validation && Self::validation_layer_available(&entry);
            if config.enable_validation && !enable_validation {
                engine_warn!(SOURCE, "Validation requested but {:?} is not installed", VALIDATION_LAYER);
            }
            if enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }
            let layer_names = if enable_validation {
                vec![VALIDATION_LAYER.as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            // Unsafe context carries into the teardown closures
            let mut rollback = Rollback::new();
            let owned = instance.clone();
            rollback.push("instance", move || owned.destroy_instance(None));

            let debug_utils = if enable_validation {
                let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);

                crate::debug::init_debug_config(crate::debug::DebugConfig {
                    severity: config.debug_severity,
                    panic_on_error: config.panic_on_validation_error,
                });
                rollback.push("debug config", crate::debug::cleanup_debug_config);

                let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                    .message_severity(crate::debug::severity_flags(config.debug_severity))
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

                let messenger = loader.create_debug_utils_messenger(&debug_info, None).map_err(|e| {
                    engine_error!(SOURCE, "Failed to create debug messenger: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
                })?;
                let owned = loader.clone();
                rollback.push("debug messenger", move || owned.destroy_debug_utils_messenger(messenger, None));

                Some((loader, messenger))
            } else {
                None
            };

            let window_handle = window.window_handle().map_err(|e| {
                engine_error!(SOURCE, "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
            let owned = surface_loader.clone();
            rollback.push("surface", move || owned.destroy_surface(surface, None));

            let (physical_device, families) = Self::pick_physical_device(&instance, &surface_loader, surface)?;

            let properties = instance.get_physical_device_properties(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "Unknown GPU".to_string());
            engine_info!(SOURCE, "Using GPU: {} ({:?})", device_name, properties.device_type);

            let queue_priorities = [1.0];
            let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
                .queue_family_index(families.graphics)
                .queue_priorities(&queue_priorities)];
            if families.present != families.graphics {
                queue_create_infos.push(
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(families.present)
                        .queue_priorities(&queue_priorities),
                );
            }

            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;
            let owned = device.clone();
            rollback.push("device", move || owned.destroy_device(None));

            let graphics_queue = device.get_device_queue(families.graphics, 0);
            let present_queue = device.get_device_queue(families.present, 0);
            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

            // Declared after `rollback`, so on error it is dropped before the device
            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let pool_info = vk::CommandPoolCreateInfo::default()
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
                .queue_family_index(families.graphics);
            let command_pool = device.create_command_pool(&pool_info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
            })?;

            engine_debug!(
                SOURCE,
                "Queue families: graphics={}, present={}",
                families.graphics,
                families.present
            );

            rollback.commit();

            Ok(Self {
                _entry: entry,
                instance,
                debug_utils,
                surface_loader,
                surface,
                physical_device,
                device,
                swapchain_loader,
                graphics_queue,
                graphics_queue_family: families.graphics,
                present_queue,
                present_queue_family: families.present,
                queue_lock: Mutex::new(()),
                command_pool,
                allocator: ManuallyDrop::new(Mutex::new(allocator)),
                allocations: Mutex::new(FxHashMap::default()),
                next_memory_id: AtomicU64::new(1),
                device_name,
            })
        }
    }

    /// Name of the GPU this device runs on
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    fn validation_layer_available(entry: &ash::Entry) -> bool {
        let layers = match unsafe { entry.enumerate_instance_layer_properties() } {
            Ok(layers) => layers,
            Err(_) => return false,
        };
        layers
            .iter()
            .any(|layer| layer.layer_name_as_c_str().map(|name| name == VALIDATION_LAYER).unwrap_or(false))
    }

    /// First suitable physical device, discrete GPUs preferred
    unsafe fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, QueueFamilies)> {
        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            engine_error!(SOURCE, "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        let mut suitable: Vec<(vk::PhysicalDevice, QueueFamilies, bool)> = physical_devices
            .into_iter()
            .filter_map(|physical_device| {
                let families = Self::suitable_queue_families(instance, surface_loader, surface, physical_device)?;
                let discrete = instance.get_physical_device_properties(physical_device).device_type
                    == vk::PhysicalDeviceType::DISCRETE_GPU;
                Some((physical_device, families, discrete))
            })
            .collect();

        // Stable: discrete first, otherwise enumeration order
        suitable.sort_by_key(|&(_, _, discrete)| !discrete);

        suitable
            .into_iter()
            .next()
            .map(|(physical_device, families, _)| (physical_device, families))
            .ok_or_else(|| {
                engine_error!(SOURCE, "No GPU supports graphics and presentation to this surface");
                Error::InitializationFailed("No suitable Vulkan GPU found".to_string())
            })
    }

    /// Queue families when `physical_device` can render and present to `surface`
    unsafe fn suitable_queue_families(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
    ) -> Option<QueueFamilies> {
        let queue_families = instance.get_physical_device_queue_family_properties(physical_device);

        let graphics = queue_families
            .iter()
            .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))? as u32;

        let present = (0..queue_families.len() as u32).find(|&i| {
            surface_loader
                .get_physical_device_surface_support(physical_device, i, surface)
                .unwrap_or(false)
        })?;

        let has_swapchain = instance
            .enumerate_device_extension_properties(physical_device)
            .ok()?
            .iter()
            .any(|ext| ext.extension_name_as_c_str().map(|name| name == ash::khr::swapchain::NAME).unwrap_or(false));
        if !has_swapchain {
            return None;
        }

        let formats = surface_loader
            .get_physical_device_surface_formats(physical_device, surface)
            .ok()?;
        let present_modes = surface_loader
            .get_physical_device_surface_present_modes(physical_device, surface)
            .ok()?;
        if formats.is_empty() || present_modes.is_empty() {
            return None;
        }

        Some(QueueFamilies { graphics, present })
    }

    pub(crate) fn lock_allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| engine_err!(SOURCE, "GPU allocator mutex poisoned"))
    }

    /// Allocate memory matching `requirements`, let `bind` attach it to its
    /// resource, and record it in the allocation table
    ///
    /// The memory is released again if binding fails.
    pub(crate) fn allocate_and_bind(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        location: gpu_allocator::MemoryLocation,
        linear: bool,
        bind: impl FnOnce(&Allocation) -> Result<()>,
    ) -> Result<MemoryHandle> {
        let allocation = self
            .lock_allocator()?
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!(SOURCE, "Out of GPU memory for {} ({:.2} MB, {:?}): {:?}", name, size_mb, location, e);
                Error::OutOfMemory
            })?;

        if let Err(e) = bind(&allocation) {
            if let Ok(mut allocator) = self.lock_allocator() {
                allocator.free(allocation).ok();
            }
            return Err(e);
        }

        let memory_id = self.next_memory_id.fetch_add(1, Ordering::Relaxed);
        self.allocations
            .lock()
            .map_err(|_| engine_err!(SOURCE, "Allocation table mutex poisoned"))?
            .insert(memory_id, allocation);
        Ok(MemoryHandle(memory_id))
    }

    /// Return the allocation behind `memory` to the allocator
    pub(crate) fn release_memory(&self, memory: MemoryHandle) {
        let allocation = self
            .allocations
            .lock()
            .ok()
            .and_then(|mut allocations| allocations.remove(&memory.raw()));
        match (allocation, self.lock_allocator()) {
            (Some(allocation), Ok(mut allocator)) => {
                allocator.free(allocation).ok();
            }
            (None, _) => engine_warn!(SOURCE, "Unknown memory handle {:?} released", memory),
            (Some(_), Err(_)) => {}
        }
    }

    /// Run `f` on the allocation behind `memory` with the table locked
    pub(crate) fn with_allocation<R>(
        &self,
        memory: MemoryHandle,
        f: impl FnOnce(&mut Allocation) -> Result<R>,
    ) -> Result<R> {
        let mut allocations = self
            .allocations
            .lock()
            .map_err(|_| engine_err!(SOURCE, "Allocation table mutex poisoned"))?;
        let allocation = allocations
            .get_mut(&memory.raw())
            .ok_or_else(|| engine_err!(SOURCE, "Unknown memory handle {:?}", memory))?;
        f(allocation)
    }

    pub(crate) fn lock_queue(&self) -> Result<MutexGuard<'_, ()>> {
        self.queue_lock
            .lock()
            .map_err(|_| engine_err!(SOURCE, "Queue mutex poisoned"))
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Release any memory a caller never gave back
            if let (Ok(allocations), Ok(allocator)) = (self.allocations.get_mut(), self.allocator.get_mut()) {
                if !allocations.is_empty() {
                    engine_warn!(SOURCE, "{} allocation(s) still live at device teardown", allocations.len());
                }
                for (_, allocation) in allocations.drain() {
                    allocator.free(allocation).ok();
                }
            }

            // 2. Allocator frees its memory blocks while the device is alive
            ManuallyDrop::drop(&mut self.allocator);

            // 3. Device-level objects, then the device
            self.device.destroy_command_pool(self.command_pool, None);
            self.device.destroy_device(None);

            // 4. Instance-level objects, then the instance
            self.surface_loader.destroy_surface(self.surface, None);
            crate::debug::cleanup_debug_config();
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}
