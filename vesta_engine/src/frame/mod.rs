/// Frame module - per-frame orchestration on top of the swap chain

pub mod frame_renderer;
pub mod render_target;

pub use frame_renderer::{FrameRenderer, FrameState};
pub use render_target::RenderTargetDescriptor;
