/// Swap chain module - presentation images, their attachments and frame-slot sync

pub mod frame_sync;
pub mod selection;
pub mod swap_chain;

pub use frame_sync::{FrameSlotSync, FrameSync};
pub use selection::{
    choose_extent, choose_image_count, choose_present_mode, choose_surface_format,
    swap_chain_render_pass_desc, DEPTH_FORMAT_CANDIDATES,
};
pub use swap_chain::{SwapChain, MAX_FRAMES_IN_FLIGHT};
