//! Per-slot GPU frame timing via timestamp queries
//!
//! Each frame slot carries two timestamps, one at the top of the frame's
//! command buffer and one at the bottom. Readback happens on the next reuse
//! of the slot, after the submit fence wait has guaranteed the results are
//! available; the first use of a slot has nothing to read yet.

use crate::device::handles::{CommandBufferId, QueryPoolId};
use crate::device::GraphicsDevice;
use crate::error::Result;

const QUERY_FRAME_BEGIN: u32 = 0;
const QUERY_FRAME_END: u32 = 1;
const QUERY_COUNT: u32 = 2;

/// Timestamp pair measuring one slot's GPU frame time
pub struct FrameGpuTimer {
    query_pool: QueryPoolId,
    /// A recorded frame has retired and its results can be read
    pending: bool,
}

impl FrameGpuTimer {
    pub fn new(device: &dyn GraphicsDevice) -> Result<Self> {
        let query_pool = device.create_timestamp_query_pool(QUERY_COUNT)?;
        Ok(Self { query_pool, pending: false })
    }

    /// Read the previous frame's GPU time in nanoseconds.
    ///
    /// Returns `None` until the slot has completed a recorded frame. Must
    /// only be called after the slot's submit fence wait.
    pub fn read(&mut self, device: &dyn GraphicsDevice) -> Result<Option<f64>> {
        if !self.pending {
            return Ok(None);
        }
        self.pending = false;
        let results = device.get_query_results(self.query_pool, 0, QUERY_COUNT)?;
        let ticks = results[QUERY_FRAME_END as usize]
            .saturating_sub(results[QUERY_FRAME_BEGIN as usize]);
        Ok(Some(ticks as f64 * device.timestamp_period_ns() as f64))
    }

    /// Record the reset and top-of-frame timestamp
    pub fn record_begin(&self, device: &dyn GraphicsDevice, cmd: CommandBufferId) {
        device.cmd_reset_query_pool(cmd, self.query_pool, 0, QUERY_COUNT);
        device.cmd_write_timestamp(cmd, self.query_pool, QUERY_FRAME_BEGIN, false);
    }

    /// Record the bottom-of-frame timestamp
    pub fn record_end(&mut self, device: &dyn GraphicsDevice, cmd: CommandBufferId) {
        device.cmd_write_timestamp(cmd, self.query_pool, QUERY_FRAME_END, true);
        self.pending = true;
    }

    pub fn destroy(self, device: &dyn GraphicsDevice) {
        device.destroy_query_pool(self.query_pool);
    }
}
