//! Plain data types shared between the core and device backends

use bitflags::bitflags;
use crate::device::handles::{
    BufferId, BufferViewId, CommandBufferId, DescriptorSetId, FenceId, ImageViewId, SamplerId,
    SemaphoreId, ShaderModuleId,
};

/// Sentinel meaning "the rest of the buffer" in a buffer descriptor write
pub const WHOLE_SIZE: u64 = u64::MAX;

bitflags! {
    /// Shader stages that access a binding
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x01;
        const FRAGMENT = 0x02;
        const GEOMETRY = 0x04;
        const COMPUTE = 0x08;
    }
}

/// Type of resource at a descriptor binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    StorageBuffer,
    CombinedImageSampler,
    SampledImage,
    StorageImage,
    Sampler,
    UniformTexelBuffer,
    StorageTexelBuffer,
}

/// Pipeline bind point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineBindPoint {
    Graphics,
    Compute,
}

/// Image layouts the frame protocol transitions between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// Initial layout of freshly created swapchain images
    Undefined,
    /// Presentable layout
    PresentSrc,
    /// Render-target layout
    ColorAttachment,
}

/// One binding slot in a descriptor set layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBinding {
    /// Binding number within the set
    pub binding: u32,
    /// Resource type at this binding
    pub descriptor_type: DescriptorType,
    /// Number of descriptors (>1 for arrays)
    pub descriptor_count: u32,
    /// Stages that access this binding
    pub stage_flags: ShaderStageFlags,
}

/// Buffer region referenced by a descriptor write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWriteInfo {
    pub buffer: BufferId,
    pub offset: u64,
    /// Byte range, or [`WHOLE_SIZE`]
    pub range: u64,
}

/// Image view (plus optional sampler) referenced by a descriptor write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageWriteInfo {
    pub image_view: ImageViewId,
    pub sampler: Option<SamplerId>,
    pub layout: ImageLayout,
}

/// A fully resolved descriptor write handed to the device
///
/// Exactly one of the three info lists is populated, matching the
/// descriptor type of the destination binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorWrite {
    pub dst_set: DescriptorSetId,
    pub dst_binding: u32,
    pub dst_array_element: u32,
    pub buffer_infos: Vec<BufferWriteInfo>,
    pub image_infos: Vec<ImageWriteInfo>,
    pub texel_view_infos: Vec<BufferViewId>,
}

/// Descriptor capacity request for pool creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolSize {
    pub descriptor_type: DescriptorType,
    pub descriptor_count: u32,
}

/// One shader stage of a program
#[derive(Debug, Clone)]
pub struct ShaderStageDesc {
    pub module: ShaderModuleId,
    pub stage: ShaderStageFlags,
    pub entry_point: String,
}

/// Contract-level graphics pipeline state
///
/// The backend maps this onto its own pipeline-state structures; the core
/// only carries it from the caller to `create_graphics_pipeline`.
#[derive(Debug, Clone)]
pub struct GraphicsStateDesc {
    pub topology: PrimitiveTopology,
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub sample_count: u32,
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub min_max_depth: (f32, f32),
    /// Per color attachment: blending enabled
    pub attachment_blend_enable: Vec<bool>,
    /// Color attachment formats, matched against the render targets
    pub color_attachment_formats: Vec<crate::config::SurfaceFormat>,
}

impl Default for GraphicsStateDesc {
    fn default() -> Self {
        Self {
            topology: PrimitiveTopology::TriangleList,
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullMode::Back,
            front_face: FrontFace::Clockwise,
            sample_count: 1,
            depth_test_enable: false,
            depth_write_enable: false,
            depth_compare_op: CompareOp::LessOrEqual,
            min_max_depth: (0.0, 1.0),
            attachment_blend_enable: vec![false],
            color_attachment_formats: vec![crate::config::SurfaceFormat::Bgra8Srgb],
        }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

/// Polygon fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Winding order considered front-facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

/// Depth comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    LessOrEqual,
    Equal,
    Greater,
    GreaterOrEqual,
    Always,
}

/// A queue submission
///
/// Wait semaphores gate execution start; signal primitives fire when all
/// command buffers have retired.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitDesc {
    pub command_buffers: Vec<CommandBufferId>,
    pub wait_semaphores: Vec<SemaphoreId>,
    pub signal_semaphores: Vec<SemaphoreId>,
    /// Fence signaled when the submission completes
    pub signal_fence: Option<FenceId>,
}
