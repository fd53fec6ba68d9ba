//! Per-slot frame resources

use crate::device::handles::{CommandBufferId, CommandPoolId, FenceId, SemaphoreId};
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::frame::gpu_timing::FrameGpuTimer;

/// GPU objects owned by one frame-in-flight slot
///
/// The submit fence is created signaled so the first wait on a fresh slot
/// returns immediately. The command pool is reset wholesale each time the
/// slot comes around, giving the command buffer one-shot semantics.
pub struct FrameResources {
    pub(crate) command_pool: CommandPoolId,
    pub(crate) command_buffer: CommandBufferId,
    pub(crate) submit_fence: FenceId,
    pub(crate) image_acquire_semaphore: SemaphoreId,
    pub(crate) render_complete_semaphore: SemaphoreId,
    pub(crate) gpu_timer: Option<FrameGpuTimer>,
}

impl FrameResources {
    pub(crate) fn new(device: &dyn GraphicsDevice, enable_gpu_timing: bool) -> Result<Self> {
        let command_pool = device.create_command_pool()?;
        let command_buffer = device.allocate_command_buffer(command_pool)?;
        let submit_fence = device.create_fence(true)?;
        let image_acquire_semaphore = device.create_semaphore()?;
        let render_complete_semaphore = device.create_semaphore()?;
        let gpu_timer = if enable_gpu_timing {
            Some(FrameGpuTimer::new(device)?)
        } else {
            None
        };
        Ok(Self {
            command_pool,
            command_buffer,
            submit_fence,
            image_acquire_semaphore,
            render_complete_semaphore,
            gpu_timer,
        })
    }

    /// Command buffer the application records into for this slot
    pub fn command_buffer(&self) -> CommandBufferId {
        self.command_buffer
    }

    pub(crate) fn destroy(self, device: &dyn GraphicsDevice) {
        if let Some(timer) = self.gpu_timer {
            timer.destroy(device);
        }
        device.destroy_semaphore(self.render_complete_semaphore);
        device.destroy_semaphore(self.image_acquire_semaphore);
        device.destroy_fence(self.submit_fence);
        device.destroy_command_pool(self.command_pool);
    }
}
