//! Per-frame-slot synchronization objects
//!
//! Each frame slot owns an image-available semaphore, a render-finished
//! semaphore and an in-flight fence. `images_in_flight` remembers which slot
//! fence last claimed each swap chain image, so an image is never re-recorded
//! while the GPU still reads it.

use std::sync::Arc;

use crate::device::{DeviceContext, DeviceObject, FenceHandle, SemaphoreHandle};
use crate::error::Result;

/// Sync objects of one frame slot
pub struct FrameSlotSync {
    image_available: DeviceObject<SemaphoreHandle>,
    render_finished: DeviceObject<SemaphoreHandle>,
    in_flight: DeviceObject<FenceHandle>,
}

impl FrameSlotSync {
    fn new(device: &Arc<dyn DeviceContext>) -> Result<Self> {
        let image_available = DeviceObject::new(device, device.create_semaphore()?);
        let render_finished = DeviceObject::new(device, device.create_semaphore()?);
        // Signaled so the first wait on a fresh slot returns at once.
        let in_flight = DeviceObject::new(device, device.create_fence(true)?);
        Ok(Self {
            image_available,
            render_finished,
            in_flight,
        })
    }

    pub fn image_available(&self) -> SemaphoreHandle {
        self.image_available.handle()
    }

    pub fn render_finished(&self) -> SemaphoreHandle {
        self.render_finished.handle()
    }

    pub fn in_flight(&self) -> FenceHandle {
        self.in_flight.handle()
    }
}

/// Rotating set of frame slots plus the image -> fence map
pub struct FrameSync {
    slots: Vec<FrameSlotSync>,
    images_in_flight: Vec<Option<FenceHandle>>,
    current_slot: usize,
}

impl FrameSync {
    /// Create `slot_count` slots for a swap chain with `image_count` images,
    /// starting at `start_slot`
    pub fn new(
        device: &Arc<dyn DeviceContext>,
        slot_count: usize,
        image_count: usize,
        start_slot: usize,
    ) -> Result<Self> {
        let slots = (0..slot_count)
            .map(|_| FrameSlotSync::new(device))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            slots,
            images_in_flight: vec![None; image_count],
            current_slot: start_slot % slot_count.max(1),
        })
    }

    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    pub fn current(&self) -> &FrameSlotSync {
        &self.slots[self.current_slot]
    }

    pub fn slot(&self, slot: usize) -> &FrameSlotSync {
        &self.slots[slot]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Fence of the slot that last submitted work for `image_index`
    pub fn image_fence(&self, image_index: usize) -> Option<FenceHandle> {
        self.images_in_flight[image_index]
    }

    /// Record that the current slot now renders into `image_index`
    pub fn claim_image(&mut self, image_index: usize) {
        let fence = self.current().in_flight();
        self.images_in_flight[image_index] = Some(fence);
    }

    pub fn advance(&mut self) {
        self.current_slot = (self.current_slot + 1) % self.slots.len();
    }
}
