/// Presentable surface trait - the window side of presentation

use crate::device::Extent2D;

/// Window (or other drawable) the swap chain presents into
pub trait PresentableSurface {
    /// Current drawable size in pixels; zero while minimized
    fn extent(&self) -> Extent2D;

    /// True if the drawable was resized since the flag was last reset
    fn was_resized(&self) -> bool;

    fn reset_resized_flag(&mut self);

    /// Block until at least one window event has been processed
    fn wait_events(&mut self);
}

impl<T: PresentableSurface + ?Sized> PresentableSurface for &mut T {
    fn extent(&self) -> Extent2D {
        (**self).extent()
    }

    fn was_resized(&self) -> bool {
        (**self).was_resized()
    }

    fn reset_resized_flag(&mut self) {
        (**self).reset_resized_flag()
    }

    fn wait_events(&mut self) {
        (**self).wait_events()
    }
}
