/*!
# Vesta Engine

Swap chain lifecycle and frame synchronization on top of a backend-neutral
device interface.

## Architecture

- **DeviceContext**: GPU services a backend provides (Vulkan lives in `vesta_engine_vulkan`)
- **PresentableSurface**: the window being presented into
- **SwapChain**: one generation of presentable images, depth buffers,
  render pass, framebuffers and frame-slot sync objects
- **FrameRenderer**: the per-frame begin / render pass / end cycle, rebuilding
  the swap chain when the surface goes stale or changes size
*/

mod config;
mod engine;
mod error;
pub mod device;
pub mod frame;
pub mod log;
pub mod swapchain;

// Main vesta namespace module
pub mod vesta {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{Config, DebugSeverity, PresentModePreference};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device interfaces and value types
    pub mod device {
        pub use crate::device::*;
    }

    // Swap chain
    pub mod swapchain {
        pub use crate::swapchain::*;
    }

    // Frame orchestration
    pub mod frame {
        pub use crate::frame::*;
    }
}
