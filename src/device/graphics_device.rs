//! GraphicsDevice trait - the backend collaborator contract
//!
//! Everything this crate needs from a graphics backend, expressed over the
//! opaque handle IDs in [`handles`](crate::device::handles). Fallible calls
//! return `Err(Error::Backend(..))` on non-success; the core treats those as
//! fatal and propagates them without retrying.
//!
//! Command-recording calls (`cmd_*`) have no return value: the caller owns
//! the precondition that the command buffer is in the recording state.

use crate::device::handles::*;
use crate::device::types::*;
use crate::error::Result;

/// Graphics backend abstraction
///
/// Implementations own the real API objects in per-kind arenas keyed by the
/// handle IDs and release them in the matching `destroy_*` calls. The core
/// never sees a raw backend handle.
pub trait GraphicsDevice: Send + Sync {
    // ===== SYNCHRONIZATION PRIMITIVES =====

    /// Create a fence, optionally in the signaled state
    fn create_fence(&self, signaled: bool) -> Result<FenceId>;

    /// Block until the fence is signaled or the timeout (nanoseconds) expires
    fn wait_for_fence(&self, fence: FenceId, timeout_ns: u64) -> Result<()>;

    /// Return the fence to the unsignaled state
    fn reset_fence(&self, fence: FenceId) -> Result<()>;

    fn destroy_fence(&self, fence: FenceId);

    fn create_semaphore(&self) -> Result<SemaphoreId>;

    fn destroy_semaphore(&self, semaphore: SemaphoreId);

    // ===== COMMAND RECORDING =====

    fn create_command_pool(&self) -> Result<CommandPoolId>;

    /// Reset the pool, invalidating every command buffer allocated from it
    fn reset_command_pool(&self, pool: CommandPoolId) -> Result<()>;

    fn destroy_command_pool(&self, pool: CommandPoolId);

    /// Allocate a primary command buffer from the pool
    fn allocate_command_buffer(&self, pool: CommandPoolId) -> Result<CommandBufferId>;

    /// Begin recording with one-time-submit semantics
    fn begin_command_buffer(&self, cmd: CommandBufferId) -> Result<()>;

    fn end_command_buffer(&self, cmd: CommandBufferId) -> Result<()>;

    // ===== TIMESTAMP QUERIES =====

    fn create_timestamp_query_pool(&self, query_count: u32) -> Result<QueryPoolId>;

    fn destroy_query_pool(&self, pool: QueryPoolId);

    fn cmd_reset_query_pool(&self, cmd: CommandBufferId, pool: QueryPoolId, first: u32, count: u32);

    /// Write a timestamp; `at_end` selects bottom-of-pipe instead of top
    fn cmd_write_timestamp(&self, cmd: CommandBufferId, pool: QueryPoolId, query: u32, at_end: bool);

    /// Read back `count` 64-bit timestamps starting at `first`, waiting for
    /// availability
    fn get_query_results(&self, pool: QueryPoolId, first: u32, count: u32) -> Result<Vec<u64>>;

    /// Nanoseconds per timestamp tick
    fn timestamp_period_ns(&self) -> f32;

    // ===== DESCRIPTORS =====

    /// Create a set layout from an ordered binding list
    fn create_descriptor_set_layout(&self, bindings: &[LayoutBinding])
        -> Result<DescriptorSetLayoutId>;

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutId);

    fn create_descriptor_pool(
        &self,
        max_sets: u32,
        pool_sizes: &[DescriptorPoolSize],
    ) -> Result<DescriptorPoolId>;

    fn destroy_descriptor_pool(&self, pool: DescriptorPoolId);

    /// Allocate `count` sets of the same layout from the pool.
    ///
    /// Fails with `DescriptorPoolExhausted` when the pool cannot satisfy the
    /// request; no partial allocation is returned.
    fn allocate_descriptor_sets(
        &self,
        pool: DescriptorPoolId,
        layout: DescriptorSetLayoutId,
        count: u32,
    ) -> Result<Vec<DescriptorSetId>>;

    /// Apply descriptor writes
    fn update_descriptor_sets(&self, writes: &[DescriptorWrite]) -> Result<()>;

    // ===== PIPELINES =====

    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleId>;

    fn destroy_shader_module(&self, module: ShaderModuleId);

    /// Create a pipeline layout over set layouts in ascending set order
    fn create_pipeline_layout(&self, set_layouts: &[DescriptorSetLayoutId])
        -> Result<PipelineLayoutId>;

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutId);

    fn create_compute_pipeline(
        &self,
        layout: PipelineLayoutId,
        stage: &ShaderStageDesc,
    ) -> Result<PipelineId>;

    fn create_graphics_pipeline(
        &self,
        layout: PipelineLayoutId,
        stages: &[ShaderStageDesc],
        state: &GraphicsStateDesc,
    ) -> Result<PipelineId>;

    fn destroy_pipeline(&self, pipeline: PipelineId);

    // ===== COMMAND BUFFER BINDING =====

    fn cmd_bind_pipeline(
        &self,
        cmd: CommandBufferId,
        bind_point: PipelineBindPoint,
        pipeline: PipelineId,
    );

    fn cmd_bind_descriptor_sets(
        &self,
        cmd: CommandBufferId,
        bind_point: PipelineBindPoint,
        layout: PipelineLayoutId,
        first_set: u32,
        sets: &[DescriptorSetId],
    );

    /// Record a layout transition barrier on a swapchain image
    fn cmd_transition_swapchain_image(
        &self,
        cmd: CommandBufferId,
        image_index: u32,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    );

    // ===== SUBMISSION & PRESENTATION =====

    /// Submit command buffers to the device queue
    fn queue_submit(&self, submit: &SubmitDesc) -> Result<()>;

    /// Acquire the index of the next presentable swapchain image.
    ///
    /// Blocks until the presentation engine makes an image available; the
    /// given semaphore and/or fence is signaled when the image may actually
    /// be used.
    fn acquire_next_image(
        &self,
        signal_semaphore: Option<SemaphoreId>,
        signal_fence: Option<FenceId>,
    ) -> Result<u32>;

    /// Present a swapchain image, waiting on the given semaphores
    fn present(&self, image_index: u32, wait_semaphores: &[SemaphoreId]) -> Result<()>;

    /// Number of images in the swapchain
    fn swapchain_image_count(&self) -> u32;

    /// Block until the device queue has drained
    fn queue_wait_idle(&self) -> Result<()>;

    /// Block until all outstanding GPU work on the device has completed
    fn device_wait_idle(&self) -> Result<()>;
}
