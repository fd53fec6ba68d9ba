//! Opaque handle types for device-owned resources
//!
//! Every GPU object this crate touches is referenced through a small key
//! rather than a raw backend handle. Backends keep a `SlotMap` arena per
//! resource kind and destroy entries explicitly at shutdown, so ownership
//! and double-free behavior stay visible at the call sites that create and
//! destroy the objects.

use slotmap::new_key_type;

new_key_type! {
    /// GPU->CPU completion signal
    pub struct FenceId;
    /// GPU->GPU / presentation-engine ordering primitive
    pub struct SemaphoreId;
    /// Command allocation arena, reset wholesale each frame
    pub struct CommandPoolId;
    /// Primary command buffer allocated from a pool
    pub struct CommandBufferId;
    /// Timestamp query pool
    pub struct QueryPoolId;
    /// Descriptor set layout
    pub struct DescriptorSetLayoutId;
    /// Descriptor pool descriptor sets are allocated from
    pub struct DescriptorPoolId;
    /// Allocated descriptor set
    pub struct DescriptorSetId;
    /// Pipeline layout
    pub struct PipelineLayoutId;
    /// Compiled pipeline
    pub struct PipelineId;
    /// Shader module
    pub struct ShaderModuleId;
    /// Buffer resource referenced by descriptor writes
    pub struct BufferId;
    /// Image view referenced by descriptor writes
    pub struct ImageViewId;
    /// Sampler referenced by image descriptor writes
    pub struct SamplerId;
    /// Texel buffer view referenced by descriptor writes
    pub struct BufferViewId;
}
