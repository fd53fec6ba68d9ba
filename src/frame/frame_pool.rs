//! Frame-in-flight resource pool and the per-frame protocol
//!
//! The pool owns N slots of frame resources plus a single image-acquire
//! fence shared across slots. A frame runs:
//!
//! 1. `advance` - move to the next slot round-robin, at the top of the
//!    loop before any wait; the first call on a fresh pool yields slot 0
//! 2. `begin_frame` - wait and reset the slot's submit fence, read last
//!    GPU timing, acquire a swapchain image (waiting the acquire fence so
//!    the image is really available), reset the slot's command pool and
//!    begin recording, transitioning the image to the render-target layout
//! 3. application records into `active().command_buffer()`
//! 4. `end_frame` - transition back to the presentable layout, end the
//!    buffer, submit signaling the slot fence and render-complete
//!    semaphore, then present
//!
//! The slot's submit fence is created signaled, so the first pass over
//! each slot never blocks. With N slots, the wait in `begin_frame` of
//! frame M completes the submission of frame M-N.

use crate::device::handles::FenceId;
use crate::device::types::{ImageLayout, SubmitDesc};
use crate::device::GraphicsDevice;
use crate::error::{Error, Result};
use crate::frame::frame_resources::FrameResources;
use crate::{render_info, render_trace};

const FENCE_TIMEOUT_NS: u64 = u64::MAX;

/// Round-robin pool of frame-in-flight resources
pub struct FrameResourcePool {
    slots: Vec<FrameResources>,
    active: usize,
    /// Shared across slots; signaled by acquire, waited and reset within
    /// `begin_frame`
    image_acquire_fence: FenceId,
    last_gpu_time_ns: Option<f64>,
}

impl FrameResourcePool {
    /// Create a pool with `frames_in_flight` slots
    pub fn new(
        device: &dyn GraphicsDevice,
        frames_in_flight: u32,
        enable_gpu_timing: bool,
    ) -> Result<Self> {
        if frames_in_flight == 0 {
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }
        let mut slots = Vec::with_capacity(frames_in_flight as usize);
        for _ in 0..frames_in_flight {
            slots.push(FrameResources::new(device, enable_gpu_timing)?);
        }
        let image_acquire_fence = device.create_fence(false)?;
        render_info!(
            "quasar::frame",
            "Frame resource pool ready: {} slot(s), gpu timing {}",
            frames_in_flight,
            if enable_gpu_timing { "on" } else { "off" }
        );
        // Pre-first-frame state: the first advance() lands on slot 0
        let active = slots.len() - 1;
        Ok(Self {
            slots,
            active,
            image_acquire_fence,
            last_gpu_time_ns: None,
        })
    }

    /// Create a pool sized by the renderer configuration
    pub fn from_config(
        device: &dyn GraphicsDevice,
        config: &crate::config::RendererConfig,
    ) -> Result<Self> {
        Self::new(device, config.frames_in_flight as u32, config.enable_gpu_timing)
    }

    pub fn frame_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Index of the active slot, for modulo descriptor-set selection
    pub fn active_slot(&self) -> u32 {
        self.active as u32
    }

    /// The active slot's resources
    pub fn active(&self) -> &FrameResources {
        &self.slots[self.active]
    }

    /// GPU time of the most recently retired timed frame, in nanoseconds
    pub fn last_gpu_frame_time_ns(&self) -> Option<f64> {
        self.last_gpu_time_ns
    }

    /// Move to the next slot round-robin, returning the new active index.
    ///
    /// Called at the top of the frame loop, before `begin_frame`; on a
    /// fresh pool the first call returns slot 0.
    pub fn advance(&mut self) -> u32 {
        self.active = (self.active + 1) % self.slots.len();
        self.active as u32
    }

    /// One-shot transition of every swapchain image to the presentable
    /// layout. Call once after swapchain creation, before the first frame.
    pub fn initialize_swapchain_images(&mut self, device: &dyn GraphicsDevice) -> Result<()> {
        let slot = &self.slots[self.active];
        device.reset_command_pool(slot.command_pool)?;
        device.begin_command_buffer(slot.command_buffer)?;
        for image_index in 0..device.swapchain_image_count() {
            device.cmd_transition_swapchain_image(
                slot.command_buffer,
                image_index,
                ImageLayout::Undefined,
                ImageLayout::PresentSrc,
            );
        }
        device.end_command_buffer(slot.command_buffer)?;
        device.queue_submit(&SubmitDesc {
            command_buffers: vec![slot.command_buffer],
            wait_semaphores: vec![],
            signal_semaphores: vec![],
            signal_fence: None,
        })?;
        device.queue_wait_idle()?;
        render_info!(
            "quasar::frame",
            "Initialized {} swapchain image(s) to presentable layout",
            device.swapchain_image_count()
        );
        Ok(())
    }

    /// Open the active slot's frame and acquire a swapchain image.
    ///
    /// Returns the acquired image index. On return the slot's command
    /// buffer is recording and the image has been transitioned to the
    /// render-target layout.
    pub fn begin_frame(&mut self, device: &dyn GraphicsDevice) -> Result<u32> {
        let slot = &mut self.slots[self.active];

        device.wait_for_fence(slot.submit_fence, FENCE_TIMEOUT_NS)?;
        device.reset_fence(slot.submit_fence)?;

        // Safe to read now: the fence wait retired this slot's last frame
        if let Some(timer) = slot.gpu_timer.as_mut() {
            if let Some(elapsed) = timer.read(device)? {
                self.last_gpu_time_ns = Some(elapsed);
            }
        }

        let image_index = device.acquire_next_image(
            Some(slot.image_acquire_semaphore),
            Some(self.image_acquire_fence),
        )?;
        device.wait_for_fence(self.image_acquire_fence, FENCE_TIMEOUT_NS)?;
        device.reset_fence(self.image_acquire_fence)?;

        device.reset_command_pool(slot.command_pool)?;
        device.begin_command_buffer(slot.command_buffer)?;

        if let Some(timer) = slot.gpu_timer.as_ref() {
            timer.record_begin(device, slot.command_buffer);
        }
        device.cmd_transition_swapchain_image(
            slot.command_buffer,
            image_index,
            ImageLayout::PresentSrc,
            ImageLayout::ColorAttachment,
        );

        render_trace!(
            "quasar::frame",
            "Frame begun on slot {}, image {}",
            self.active,
            image_index
        );
        Ok(image_index)
    }

    /// Close the active slot's frame: submit and present.
    ///
    /// The submission waits the slot's image-acquire semaphore, signals
    /// its render-complete semaphore and submit fence; presentation waits
    /// the render-complete semaphore.
    pub fn end_frame(&mut self, device: &dyn GraphicsDevice, image_index: u32) -> Result<()> {
        let slot = &mut self.slots[self.active];

        device.cmd_transition_swapchain_image(
            slot.command_buffer,
            image_index,
            ImageLayout::ColorAttachment,
            ImageLayout::PresentSrc,
        );
        if let Some(timer) = slot.gpu_timer.as_mut() {
            timer.record_end(device, slot.command_buffer);
        }
        device.end_command_buffer(slot.command_buffer)?;

        device.queue_submit(&SubmitDesc {
            command_buffers: vec![slot.command_buffer],
            wait_semaphores: vec![slot.image_acquire_semaphore],
            signal_semaphores: vec![slot.render_complete_semaphore],
            signal_fence: Some(slot.submit_fence),
        })?;
        device.present(image_index, &[slot.render_complete_semaphore])?;

        render_trace!(
            "quasar::frame",
            "Frame ended on slot {}, image {}",
            self.active,
            image_index
        );
        Ok(())
    }

    /// Drain the device and release every owned object
    pub fn shutdown(self, device: &dyn GraphicsDevice) -> Result<()> {
        device.device_wait_idle()?;
        device.destroy_fence(self.image_acquire_fence);
        for slot in self.slots {
            slot.destroy(device);
        }
        render_info!("quasar::frame", "Frame resource pool shut down");
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_pool_tests.rs"]
mod tests;
