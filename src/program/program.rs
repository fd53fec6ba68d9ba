//! Compiled program: pipeline, layouts and per-frame descriptor sets

use crate::device::handles::{
    CommandBufferId, DescriptorSetId, DescriptorSetLayoutId, PipelineId, PipelineLayoutId,
};
use crate::device::types::PipelineBindPoint;
use crate::device::GraphicsDevice;

/// Descriptor set instances compiled for one logical set slot
#[derive(Debug, Clone)]
pub(crate) struct ProgramSet {
    pub set_index: u32,
    /// Physical instances; instance selection at bind time is
    /// `frame_slot % instances.len()`
    pub instances: Vec<DescriptorSetId>,
}

/// A compiled, bindable program
///
/// Owns its pipeline, pipeline layout, set layouts and allocated descriptor
/// sets. Descriptor sets are freed with their pool; everything else must be
/// released through [`Program::destroy`] once the device is idle.
pub struct Program {
    bind_point: PipelineBindPoint,
    pipeline: PipelineId,
    pipeline_layout: PipelineLayoutId,
    set_layouts: Vec<DescriptorSetLayoutId>,
    sets: Vec<ProgramSet>,
}

impl Program {
    pub(crate) fn new(
        bind_point: PipelineBindPoint,
        pipeline: PipelineId,
        pipeline_layout: PipelineLayoutId,
        set_layouts: Vec<DescriptorSetLayoutId>,
        sets: Vec<ProgramSet>,
    ) -> Self {
        Self { bind_point, pipeline, pipeline_layout, set_layouts, sets }
    }

    pub fn bind_point(&self) -> PipelineBindPoint {
        self.bind_point
    }

    pub fn pipeline(&self) -> PipelineId {
        self.pipeline
    }

    /// Pipeline layout, for binding inherited sets or push-style state from
    /// the application side
    pub fn pipeline_layout(&self) -> PipelineLayoutId {
        self.pipeline_layout
    }

    /// Number of physical instances compiled for a set slot (0 when the
    /// slot is inherited or unused)
    pub fn instance_count(&self, set_index: u32) -> u32 {
        self.sets
            .iter()
            .find(|s| s.set_index == set_index)
            .map(|s| s.instances.len() as u32)
            .unwrap_or(0)
    }

    /// Record the pipeline bind
    pub fn bind(&self, device: &dyn GraphicsDevice, cmd: CommandBufferId) {
        device.cmd_bind_pipeline(cmd, self.bind_point, self.pipeline);
    }

    /// Record descriptor set binds for the given frame slot.
    ///
    /// Each owned set slot binds instance `frame_slot % instance_count`.
    /// Slots the program does not own (inherited or unused) are skipped;
    /// sets are bound individually so set-index gaps are preserved.
    pub fn bind_descriptor_sets(
        &self,
        device: &dyn GraphicsDevice,
        cmd: CommandBufferId,
        frame_slot: u32,
    ) {
        for set in &self.sets {
            let instance = set.instances[frame_slot as usize % set.instances.len()];
            device.cmd_bind_descriptor_sets(
                cmd,
                self.bind_point,
                self.pipeline_layout,
                set.set_index,
                &[instance],
            );
        }
    }

    /// Release the pipeline, pipeline layout and set layouts.
    ///
    /// The caller must guarantee the program is no longer referenced by
    /// in-flight work, typically after `device_wait_idle`.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        device.destroy_pipeline(self.pipeline);
        device.destroy_pipeline_layout(self.pipeline_layout);
        for layout in self.set_layouts {
            device.destroy_descriptor_set_layout(layout);
        }
    }
}
