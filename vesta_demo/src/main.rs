//! Vesta demo - opens a window and runs the frame loop until it is closed
//!
//! Each frame clears the color and depth attachments through the swap chain
//! render pass. Resizing or minimizing the window exercises swap chain rebuilds.

use std::sync::Arc;
use std::time::Instant;
use vesta_engine::vesta::device::DeviceContext;
use vesta_engine::vesta::frame::FrameRenderer;
use vesta_engine::vesta::{Config, Result};
use vesta_engine::{engine_error, engine_info};
use vesta_engine_vulkan::{print_validation_stats_report, VulkanDevice, WinitSurface};

const SOURCE: &str = "vesta::demo";

fn run() -> Result<()> {
    let config = Config {
        app_name: "Vesta Demo".to_string(),
        ..Config::default()
    };
    let validation = config.enable_validation;

    // Torn down in reverse: renderer, then device (owns the VkSurfaceKHR), then window
    let mut surface = WinitSurface::new("Vesta Demo", 800, 600)?;
    let vulkan = VulkanDevice::new(surface.window(), &config)?;
    engine_info!(SOURCE, "Device ready on {}", vulkan.device_name());
    let device: Arc<dyn DeviceContext> = Arc::new(vulkan);
    let mut renderer = FrameRenderer::new(device, &mut surface, config)?;

    let started = Instant::now();
    let mut frames: u64 = 0;

    loop {
        renderer.surface_mut().poll_events();
        if renderer.surface().should_close() {
            break;
        }

        if let Some(command_buffer) = renderer.begin_frame()? {
            renderer.begin_render_pass(command_buffer);
            renderer.end_render_pass(command_buffer);
            renderer.end_frame()?;
            frames += 1;
        }
    }

    let seconds = started.elapsed().as_secs_f64();
    engine_info!(
        SOURCE,
        "{} frames in {:.1}s ({:.1} fps), {} swap chain rebuild(s)",
        frames,
        seconds,
        frames as f64 / seconds.max(f64::EPSILON),
        renderer.rebuild_count()
    );

    drop(renderer);
    if validation {
        print_validation_stats_report();
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        engine_error!(SOURCE, "Demo failed: {}", e);
        std::process::exit(1);
    }
}
