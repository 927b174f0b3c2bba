/// WinitSurface - a winit window the frame renderer can present into
///
/// Owns its event loop and pumps it on demand instead of handing control to
/// `run_app`, so the render loop stays in the caller's hands.

use std::time::Duration;
use vesta_engine::engine_debug;
use vesta_engine::vesta::device::{Extent2D, PresentableSurface};
use vesta_engine::vesta::{Error, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

const SOURCE: &str = "vesta::surface";

/// Window flags updated from the event loop
#[derive(Debug, Default)]
struct SurfaceState {
    resized: bool,
    close_requested: bool,
}

impl ApplicationHandler for SurfaceState {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                engine_debug!(SOURCE, "Window resized to {}x{}", size.width, size.height);
                self.resized = true;
            }
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            _ => {}
        }
    }
}

/// Window plus the event loop feeding it
pub struct WinitSurface {
    state: SurfaceState,
    window: Window,
    event_loop: EventLoop<()>,
}

impl WinitSurface {
    /// Open a window with the given title and inner size
    #[allow(deprecated)]
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::InitializationFailed(format!("Failed to create event loop: {}", e)))?;
        let window_attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height));
        let window = event_loop
            .create_window(window_attrs)
            .map_err(|e| Error::InitializationFailed(format!("Failed to create window: {}", e)))?;

        Ok(Self {
            state: SurfaceState::default(),
            window,
            event_loop,
        })
    }

    /// Underlying window (for surface creation)
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Process pending window events without blocking
    pub fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    /// True once the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(_) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            self.state.close_requested = true;
        }
    }
}

impl PresentableSurface for WinitSurface {
    fn extent(&self) -> Extent2D {
        let size = self.window.inner_size();
        Extent2D::new(size.width, size.height)
    }

    fn was_resized(&self) -> bool {
        self.state.resized
    }

    fn reset_resized_flag(&mut self) {
        self.state.resized = false;
    }

    fn wait_events(&mut self) {
        self.pump(None);
    }
}
