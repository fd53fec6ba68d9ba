//! Mock graphics device for unit tests (no GPU required)
//!
//! Implements the full [`GraphicsDevice`] contract over in-memory arenas and
//! records every synchronization-relevant call in an ordered event log, so
//! tests can assert the fence/semaphore choreography of the frame loop and
//! the allocation behavior of program compilation.
//!
//! The mock models just enough GPU semantics to catch protocol misuse:
//! - waiting on a fence that is neither signaled nor attached to a pending
//!   submission reports a deadlock instead of hanging;
//! - command buffers must be re-begun after a pool reset and ended before
//!   submission;
//! - descriptor pools enforce their `max_sets` capacity;
//! - semaphores must be signaled before they are waited on, and waiting
//!   consumes the signal.

use std::sync::Mutex;
use slotmap::SlotMap;

use crate::device::graphics_device::GraphicsDevice;
use crate::device::handles::*;
use crate::device::types::*;
use crate::error::{Error, Result};

/// One entry in the mock's ordered event log
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    WaitFence {
        fence: FenceId,
        /// Submission sequence number the wait retired, if the fence was
        /// pending on GPU work
        completed_submit: Option<u64>,
    },
    ResetFence { fence: FenceId },
    ResetCommandPool { pool: CommandPoolId },
    BeginCommandBuffer { cmd: CommandBufferId },
    EndCommandBuffer { cmd: CommandBufferId },
    AcquireImage { image_index: u32 },
    TransitionImage {
        image_index: u32,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    },
    BindPipeline { cmd: CommandBufferId, pipeline: PipelineId },
    BindDescriptorSets {
        cmd: CommandBufferId,
        first_set: u32,
        sets: Vec<DescriptorSetId>,
    },
    WriteTimestamp { query: u32, at_end: bool },
    Submit {
        seq: u64,
        fence: Option<FenceId>,
        signal_semaphores: Vec<SemaphoreId>,
    },
    Present {
        image_index: u32,
        wait_semaphores: Vec<SemaphoreId>,
    },
    QueueWaitIdle,
    DeviceWaitIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
    Signaled,
    Unsignaled,
    /// Attached to an in-flight submission
    Pending(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmdPhase {
    Initial,
    Recording,
    Executable,
}

struct CmdBuffer {
    pool: CommandPoolId,
    phase: CmdPhase,
}

struct PoolState {
    remaining_sets: u32,
}

struct SetState {
    #[allow(dead_code)]
    layout: DescriptorSetLayoutId,
    writes: Vec<DescriptorWrite>,
}

#[derive(Default)]
struct MockState {
    events: Vec<DeviceEvent>,
    fences: SlotMap<FenceId, FenceState>,
    semaphores: SlotMap<SemaphoreId, bool>,
    command_pools: SlotMap<CommandPoolId, ()>,
    command_buffers: SlotMap<CommandBufferId, CmdBuffer>,
    query_pools: SlotMap<QueryPoolId, u32>,
    set_layouts: SlotMap<DescriptorSetLayoutId, Vec<LayoutBinding>>,
    descriptor_pools: SlotMap<DescriptorPoolId, PoolState>,
    descriptor_sets: SlotMap<DescriptorSetId, SetState>,
    pipeline_layouts: SlotMap<PipelineLayoutId, Vec<DescriptorSetLayoutId>>,
    pipelines: SlotMap<PipelineId, PipelineBindPoint>,
    shader_modules: SlotMap<ShaderModuleId, Vec<u32>>,
    buffers: SlotMap<BufferId, ()>,
    image_views: SlotMap<ImageViewId, ()>,
    samplers: SlotMap<SamplerId, ()>,
    buffer_views: SlotMap<BufferViewId, ()>,
    next_submit_seq: u64,
    next_image: u32,
    timestamp_clock: u64,
}

/// In-memory implementation of [`GraphicsDevice`]
pub struct MockGraphicsDevice {
    state: Mutex<MockState>,
    image_count: u32,
}

impl MockGraphicsDevice {
    pub fn new(swapchain_image_count: u32) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            image_count: swapchain_image_count,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock device state poisoned")
    }

    // ===== TEST INSPECTION HELPERS (not part of the device contract) =====

    /// Snapshot of the ordered event log
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// Writes applied to a descriptor set via `update_descriptor_sets`
    pub fn writes_for_set(&self, set: DescriptorSetId) -> Vec<DescriptorWrite> {
        self.lock()
            .descriptor_sets
            .get(set)
            .map(|s| s.writes.clone())
            .unwrap_or_default()
    }

    /// Total live objects across all arenas (leak check at shutdown)
    pub fn live_object_count(&self) -> usize {
        let s = self.lock();
        s.fences.len()
            + s.semaphores.len()
            + s.command_pools.len()
            + s.command_buffers.len()
            + s.query_pools.len()
            + s.set_layouts.len()
            + s.descriptor_pools.len()
            + s.descriptor_sets.len()
            + s.pipeline_layouts.len()
            + s.pipelines.len()
            + s.shader_modules.len()
    }

    /// Fabricate a buffer handle for descriptor-write tests
    pub fn make_buffer(&self) -> BufferId {
        self.lock().buffers.insert(())
    }

    pub fn make_image_view(&self) -> ImageViewId {
        self.lock().image_views.insert(())
    }

    pub fn make_sampler(&self) -> SamplerId {
        self.lock().samplers.insert(())
    }

    pub fn make_buffer_view(&self) -> BufferViewId {
        self.lock().buffer_views.insert(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_fence(&self, signaled: bool) -> Result<FenceId> {
        let state = if signaled { FenceState::Signaled } else { FenceState::Unsignaled };
        Ok(self.lock().fences.insert(state))
    }

    fn wait_for_fence(&self, fence: FenceId, _timeout_ns: u64) -> Result<()> {
        let mut s = self.lock();
        let current = *s
            .fences
            .get(fence)
            .ok_or_else(|| Error::Backend("wait on destroyed fence".to_string()))?;
        let completed_submit = match current {
            FenceState::Signaled => None,
            FenceState::Pending(seq) => {
                s.fences[fence] = FenceState::Signaled;
                Some(seq)
            }
            FenceState::Unsignaled => {
                return Err(Error::Backend(
                    "fence wait would deadlock: fence is unsignaled with no pending submission"
                        .to_string(),
                ));
            }
        };
        s.events.push(DeviceEvent::WaitFence { fence, completed_submit });
        Ok(())
    }

    fn reset_fence(&self, fence: FenceId) -> Result<()> {
        let mut s = self.lock();
        match s.fences.get(fence) {
            Some(FenceState::Pending(_)) => Err(Error::Backend(
                "reset of a fence still attached to a pending submission".to_string(),
            )),
            Some(_) => {
                s.fences[fence] = FenceState::Unsignaled;
                s.events.push(DeviceEvent::ResetFence { fence });
                Ok(())
            }
            None => Err(Error::Backend("reset of destroyed fence".to_string())),
        }
    }

    fn destroy_fence(&self, fence: FenceId) {
        self.lock().fences.remove(fence);
    }

    fn create_semaphore(&self) -> Result<SemaphoreId> {
        Ok(self.lock().semaphores.insert(false))
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreId) {
        self.lock().semaphores.remove(semaphore);
    }

    fn create_command_pool(&self) -> Result<CommandPoolId> {
        Ok(self.lock().command_pools.insert(()))
    }

    fn reset_command_pool(&self, pool: CommandPoolId) -> Result<()> {
        let mut s = self.lock();
        if !s.command_pools.contains_key(pool) {
            return Err(Error::Backend("reset of destroyed command pool".to_string()));
        }
        let buffers: Vec<CommandBufferId> = s
            .command_buffers
            .iter()
            .filter(|(_, cb)| cb.pool == pool)
            .map(|(id, _)| id)
            .collect();
        for cmd in buffers {
            s.command_buffers[cmd].phase = CmdPhase::Initial;
        }
        s.events.push(DeviceEvent::ResetCommandPool { pool });
        Ok(())
    }

    fn destroy_command_pool(&self, pool: CommandPoolId) {
        let mut s = self.lock();
        s.command_pools.remove(pool);
        s.command_buffers.retain(|_, cb| cb.pool != pool);
    }

    fn allocate_command_buffer(&self, pool: CommandPoolId) -> Result<CommandBufferId> {
        let mut s = self.lock();
        if !s.command_pools.contains_key(pool) {
            return Err(Error::Backend(
                "command buffer allocation from destroyed pool".to_string(),
            ));
        }
        Ok(s.command_buffers.insert(CmdBuffer { pool, phase: CmdPhase::Initial }))
    }

    fn begin_command_buffer(&self, cmd: CommandBufferId) -> Result<()> {
        let mut s = self.lock();
        match s.command_buffers.get(cmd) {
            Some(cb) if cb.phase == CmdPhase::Initial => {
                s.command_buffers[cmd].phase = CmdPhase::Recording;
                s.events.push(DeviceEvent::BeginCommandBuffer { cmd });
                Ok(())
            }
            Some(_) => Err(Error::Backend(
                "begin on a command buffer that was not reset".to_string(),
            )),
            None => Err(Error::Backend("begin on destroyed command buffer".to_string())),
        }
    }

    fn end_command_buffer(&self, cmd: CommandBufferId) -> Result<()> {
        let mut s = self.lock();
        match s.command_buffers.get(cmd) {
            Some(cb) if cb.phase == CmdPhase::Recording => {
                s.command_buffers[cmd].phase = CmdPhase::Executable;
                s.events.push(DeviceEvent::EndCommandBuffer { cmd });
                Ok(())
            }
            Some(_) => Err(Error::Backend("end on a non-recording command buffer".to_string())),
            None => Err(Error::Backend("end on destroyed command buffer".to_string())),
        }
    }

    fn create_timestamp_query_pool(&self, query_count: u32) -> Result<QueryPoolId> {
        Ok(self.lock().query_pools.insert(query_count))
    }

    fn destroy_query_pool(&self, pool: QueryPoolId) {
        self.lock().query_pools.remove(pool);
    }

    fn cmd_reset_query_pool(&self, _cmd: CommandBufferId, _pool: QueryPoolId, _first: u32, _count: u32) {}

    fn cmd_write_timestamp(&self, _cmd: CommandBufferId, _pool: QueryPoolId, query: u32, at_end: bool) {
        self.lock().events.push(DeviceEvent::WriteTimestamp { query, at_end });
    }

    fn get_query_results(&self, pool: QueryPoolId, first: u32, count: u32) -> Result<Vec<u64>> {
        let mut s = self.lock();
        let pool_count = *s
            .query_pools
            .get(pool)
            .ok_or_else(|| Error::Backend("query readback from destroyed pool".to_string()))?;
        if first + count > pool_count {
            return Err(Error::Backend("query readback out of range".to_string()));
        }
        // Fabricated monotonically increasing timestamps, 1000 ticks apart
        let base = s.timestamp_clock;
        s.timestamp_clock += 1000 * count as u64;
        Ok((0..count as u64).map(|i| base + i * 1000).collect())
    }

    fn timestamp_period_ns(&self) -> f32 {
        1.0
    }

    fn create_descriptor_set_layout(&self, bindings: &[LayoutBinding])
        -> Result<DescriptorSetLayoutId>
    {
        Ok(self.lock().set_layouts.insert(bindings.to_vec()))
    }

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutId) {
        self.lock().set_layouts.remove(layout);
    }

    fn create_descriptor_pool(
        &self,
        max_sets: u32,
        _pool_sizes: &[DescriptorPoolSize],
    ) -> Result<DescriptorPoolId> {
        Ok(self.lock().descriptor_pools.insert(PoolState { remaining_sets: max_sets }))
    }

    fn destroy_descriptor_pool(&self, pool: DescriptorPoolId) {
        let mut s = self.lock();
        s.descriptor_pools.remove(pool);
        // Sets are pool-owned; destroying the pool frees them
        // (the mock has no back-reference, tests destroy pools last)
    }

    fn allocate_descriptor_sets(
        &self,
        pool: DescriptorPoolId,
        layout: DescriptorSetLayoutId,
        count: u32,
    ) -> Result<Vec<DescriptorSetId>> {
        let mut s = self.lock();
        if !s.set_layouts.contains_key(layout) {
            return Err(Error::Backend(
                "descriptor set allocation with destroyed layout".to_string(),
            ));
        }
        let remaining = match s.descriptor_pools.get(pool) {
            Some(p) => p.remaining_sets,
            None => {
                return Err(Error::Backend(
                    "descriptor set allocation from destroyed pool".to_string(),
                ))
            }
        };
        if count > remaining {
            return Err(Error::DescriptorPoolExhausted(format!(
                "requested {} sets, pool has {} remaining",
                count, remaining
            )));
        }
        s.descriptor_pools[pool].remaining_sets = remaining - count;
        let sets = (0..count)
            .map(|_| s.descriptor_sets.insert(SetState { layout, writes: Vec::new() }))
            .collect();
        Ok(sets)
    }

    fn update_descriptor_sets(&self, writes: &[DescriptorWrite]) -> Result<()> {
        let mut s = self.lock();
        for write in writes {
            if !s.descriptor_sets.contains_key(write.dst_set) {
                return Err(Error::Backend(
                    "descriptor write targets destroyed set".to_string(),
                ));
            }
        }
        for write in writes {
            s.descriptor_sets[write.dst_set].writes.push(write.clone());
        }
        Ok(())
    }

    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleId> {
        if code.is_empty() {
            return Err(Error::Backend("empty shader module code".to_string()));
        }
        Ok(self.lock().shader_modules.insert(code.to_vec()))
    }

    fn destroy_shader_module(&self, module: ShaderModuleId) {
        self.lock().shader_modules.remove(module);
    }

    fn create_pipeline_layout(&self, set_layouts: &[DescriptorSetLayoutId])
        -> Result<PipelineLayoutId>
    {
        let mut s = self.lock();
        for layout in set_layouts {
            if !s.set_layouts.contains_key(*layout) {
                return Err(Error::Backend(
                    "pipeline layout references destroyed set layout".to_string(),
                ));
            }
        }
        Ok(s.pipeline_layouts.insert(set_layouts.to_vec()))
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutId) {
        self.lock().pipeline_layouts.remove(layout);
    }

    fn create_compute_pipeline(
        &self,
        layout: PipelineLayoutId,
        stage: &ShaderStageDesc,
    ) -> Result<PipelineId> {
        let mut s = self.lock();
        if !s.pipeline_layouts.contains_key(layout) {
            return Err(Error::Backend("compute pipeline with destroyed layout".to_string()));
        }
        if !s.shader_modules.contains_key(stage.module) {
            return Err(Error::Backend("compute pipeline with destroyed module".to_string()));
        }
        Ok(s.pipelines.insert(PipelineBindPoint::Compute))
    }

    fn create_graphics_pipeline(
        &self,
        layout: PipelineLayoutId,
        stages: &[ShaderStageDesc],
        _state: &GraphicsStateDesc,
    ) -> Result<PipelineId> {
        let mut s = self.lock();
        if !s.pipeline_layouts.contains_key(layout) {
            return Err(Error::Backend("graphics pipeline with destroyed layout".to_string()));
        }
        for stage in stages {
            if !s.shader_modules.contains_key(stage.module) {
                return Err(Error::Backend(
                    "graphics pipeline with destroyed module".to_string(),
                ));
            }
        }
        Ok(s.pipelines.insert(PipelineBindPoint::Graphics))
    }

    fn destroy_pipeline(&self, pipeline: PipelineId) {
        self.lock().pipelines.remove(pipeline);
    }

    fn cmd_bind_pipeline(
        &self,
        cmd: CommandBufferId,
        _bind_point: PipelineBindPoint,
        pipeline: PipelineId,
    ) {
        self.lock().events.push(DeviceEvent::BindPipeline { cmd, pipeline });
    }

    fn cmd_bind_descriptor_sets(
        &self,
        cmd: CommandBufferId,
        _bind_point: PipelineBindPoint,
        _layout: PipelineLayoutId,
        first_set: u32,
        sets: &[DescriptorSetId],
    ) {
        self.lock().events.push(DeviceEvent::BindDescriptorSets {
            cmd,
            first_set,
            sets: sets.to_vec(),
        });
    }

    fn cmd_transition_swapchain_image(
        &self,
        _cmd: CommandBufferId,
        image_index: u32,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    ) {
        self.lock().events.push(DeviceEvent::TransitionImage {
            image_index,
            old_layout,
            new_layout,
        });
    }

    fn queue_submit(&self, submit: &SubmitDesc) -> Result<()> {
        let mut s = self.lock();
        for cmd in &submit.command_buffers {
            match s.command_buffers.get(*cmd) {
                Some(cb) if cb.phase == CmdPhase::Executable => {}
                Some(_) => {
                    return Err(Error::Backend(
                        "submit of a command buffer that was not ended".to_string(),
                    ))
                }
                None => return Err(Error::Backend("submit of destroyed command buffer".to_string())),
            }
        }
        for sem in &submit.wait_semaphores {
            match s.semaphores.get(*sem) {
                Some(true) => s.semaphores[*sem] = false,
                Some(false) => {
                    return Err(Error::Backend(
                        "submit waits on an unsignaled semaphore".to_string(),
                    ))
                }
                None => return Err(Error::Backend("submit waits on destroyed semaphore".to_string())),
            }
        }
        for sem in &submit.signal_semaphores {
            if !s.semaphores.contains_key(*sem) {
                return Err(Error::Backend("submit signals destroyed semaphore".to_string()));
            }
            s.semaphores[*sem] = true;
        }
        let seq = s.next_submit_seq;
        s.next_submit_seq += 1;
        if let Some(fence) = submit.signal_fence {
            match s.fences.get(fence) {
                Some(FenceState::Unsignaled) => s.fences[fence] = FenceState::Pending(seq),
                Some(_) => {
                    return Err(Error::Backend(
                        "submit fence was not reset before reuse".to_string(),
                    ))
                }
                None => return Err(Error::Backend("submit signals destroyed fence".to_string())),
            }
        }
        s.events.push(DeviceEvent::Submit {
            seq,
            fence: submit.signal_fence,
            signal_semaphores: submit.signal_semaphores.clone(),
        });
        Ok(())
    }

    fn acquire_next_image(
        &self,
        signal_semaphore: Option<SemaphoreId>,
        signal_fence: Option<FenceId>,
    ) -> Result<u32> {
        let mut s = self.lock();
        if let Some(sem) = signal_semaphore {
            if !s.semaphores.contains_key(sem) {
                return Err(Error::Backend("acquire signals destroyed semaphore".to_string()));
            }
            s.semaphores[sem] = true;
        }
        if let Some(fence) = signal_fence {
            match s.fences.get(fence) {
                // The presentation engine signals immediately in the mock
                Some(FenceState::Unsignaled) => s.fences[fence] = FenceState::Signaled,
                Some(_) => {
                    return Err(Error::Backend(
                        "acquire fence was not reset before reuse".to_string(),
                    ))
                }
                None => return Err(Error::Backend("acquire signals destroyed fence".to_string())),
            }
        }
        let image_index = s.next_image;
        s.next_image = (s.next_image + 1) % self.image_count;
        s.events.push(DeviceEvent::AcquireImage { image_index });
        Ok(image_index)
    }

    fn present(&self, image_index: u32, wait_semaphores: &[SemaphoreId]) -> Result<()> {
        let mut s = self.lock();
        for sem in wait_semaphores {
            match s.semaphores.get(*sem) {
                Some(true) => s.semaphores[*sem] = false,
                Some(false) => {
                    return Err(Error::Backend(
                        "present waits on an unsignaled semaphore".to_string(),
                    ))
                }
                None => {
                    return Err(Error::Backend("present waits on destroyed semaphore".to_string()))
                }
            }
        }
        s.events.push(DeviceEvent::Present {
            image_index,
            wait_semaphores: wait_semaphores.to_vec(),
        });
        Ok(())
    }

    fn swapchain_image_count(&self) -> u32 {
        self.image_count
    }

    fn queue_wait_idle(&self) -> Result<()> {
        let mut s = self.lock();
        let pending: Vec<FenceId> = s
            .fences
            .iter()
            .filter(|(_, st)| matches!(st, FenceState::Pending(_)))
            .map(|(id, _)| id)
            .collect();
        for fence in pending {
            s.fences[fence] = FenceState::Signaled;
        }
        s.events.push(DeviceEvent::QueueWaitIdle);
        Ok(())
    }

    fn device_wait_idle(&self) -> Result<()> {
        let mut s = self.lock();
        let pending: Vec<FenceId> = s
            .fences
            .iter()
            .filter(|(_, st)| matches!(st, FenceState::Pending(_)))
            .map(|(id, _)| id)
            .collect();
        for fence in pending {
            s.fences[fence] = FenceState::Signaled;
        }
        s.events.push(DeviceEvent::DeviceWaitIdle);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
