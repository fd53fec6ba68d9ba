//! Program compiler
//!
//! Registers shader stages, merges their reflection, accepts named resource
//! writes and compiles the result into a bindable [`Program`]. The compiler
//! is reusable: a successful compile consumes the queued writes and clears
//! the written marks, so the next program variant starts from a clean
//! slate while the registered stages and reflection stay in place.

use crate::device::handles::{BufferViewId, DescriptorPoolId, DescriptorSetLayoutId};
use crate::device::types::{
    BufferWriteInfo, DescriptorType, DescriptorWrite, GraphicsStateDesc, ImageWriteInfo,
    PipelineBindPoint, ShaderStageDesc, ShaderStageFlags,
};
use crate::device::GraphicsDevice;
use crate::error::{Error, Result};
use crate::program::layout_registry::{build_set_layouts, CompiledSetLayout};
use crate::program::program::{Program, ProgramSet};
use crate::program::write_queue::{WritePayload, WriteQueues};
use crate::reflection::{BindingReflectionTable, ShaderReflector, MAX_PROGRAM_SET_SLOTS};
use crate::{render_debug, render_warn};

/// One shader stage handed to [`ProgramCompiler::register_shaders`]
pub struct ShaderSource<'a> {
    pub code: &'a [u32],
    pub stage: ShaderStageFlags,
    pub entry_point: &'a str,
}

/// What kind of pipeline to compile
pub enum PipelineDesc {
    Compute,
    Graphics(GraphicsStateDesc),
}

/// Builds [`Program`]s from shader stages and named resource writes
#[derive(Default)]
pub struct ProgramCompiler {
    table: BindingReflectionTable,
    stages: Vec<ShaderStageDesc>,
    queues: WriteQueues,
    inherited_sets: Vec<u32>,
    pool: Option<DescriptorPoolId>,
}

impl ProgramCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stages of the next program, replacing any previous
    /// registration.
    ///
    /// Each stage is reflected and merged into the compiler's binding
    /// table; stages sharing a resource must agree on its declaration.
    /// Previously registered shader modules are destroyed.
    pub fn register_shaders(
        &mut self,
        device: &dyn GraphicsDevice,
        reflector: &dyn ShaderReflector,
        sources: &[ShaderSource<'_>],
    ) -> Result<()> {
        for stage in self.stages.drain(..) {
            device.destroy_shader_module(stage.module);
        }
        self.table.clear();
        self.queues.clear();
        self.inherited_sets.clear();

        for source in sources {
            let bindings = reflector.reflect(source.code, source.stage)?;
            self.table.merge_stage(&bindings)?;
            let module = device.create_shader_module(source.code)?;
            self.stages.push(ShaderStageDesc {
                module,
                stage: source.stage,
                entry_point: source.entry_point.to_string(),
            });
        }
        render_debug!(
            "quasar::program",
            "Registered {} shader stage(s), {} reflected resource(s)",
            self.stages.len(),
            self.table.len()
        );
        Ok(())
    }

    /// Pool that compiled descriptor sets are allocated from
    pub fn set_descriptor_pool(&mut self, pool: DescriptorPoolId) {
        self.pool = Some(pool);
    }

    /// Mark a set slot as bound externally.
    ///
    /// Its layout still participates in the pipeline layout, but the
    /// compiler allocates no sets for it and its resources are exempt from
    /// the completeness check.
    pub fn inherit_descriptor_set(&mut self, set_index: u32) -> Result<()> {
        if set_index >= MAX_PROGRAM_SET_SLOTS {
            return Err(Error::SetIndexOutOfRange {
                name: String::new(),
                set_index,
            });
        }
        if !self.inherited_sets.contains(&set_index) {
            self.inherited_sets.push(set_index);
        }
        Ok(())
    }

    /// Queue a buffer write against a named resource
    pub fn write_buffers(
        &mut self,
        name: &str,
        infos: Vec<BufferWriteInfo>,
        array_element: u32,
    ) -> Result<()> {
        self.queue_write(name, array_element, WritePayload::Buffers(infos), |ty| {
            matches!(ty, DescriptorType::UniformBuffer | DescriptorType::StorageBuffer)
        })
    }

    /// Queue an image (and optional sampler) write against a named resource
    pub fn write_images(
        &mut self,
        name: &str,
        infos: Vec<ImageWriteInfo>,
        array_element: u32,
    ) -> Result<()> {
        self.queue_write(name, array_element, WritePayload::Images(infos), |ty| {
            matches!(
                ty,
                DescriptorType::CombinedImageSampler
                    | DescriptorType::SampledImage
                    | DescriptorType::StorageImage
                    | DescriptorType::Sampler
            )
        })
    }

    /// Queue a texel buffer view write against a named resource
    pub fn write_texel_views(
        &mut self,
        name: &str,
        infos: Vec<BufferViewId>,
        array_element: u32,
    ) -> Result<()> {
        self.queue_write(name, array_element, WritePayload::TexelViews(infos), |ty| {
            matches!(
                ty,
                DescriptorType::UniformTexelBuffer | DescriptorType::StorageTexelBuffer
            )
        })
    }

    fn queue_write(
        &mut self,
        name: &str,
        array_element: u32,
        payload: WritePayload,
        type_fits: impl Fn(DescriptorType) -> bool,
    ) -> Result<()> {
        if payload.is_empty() {
            return Err(crate::render_err!(
                "quasar::program",
                "Descriptor write for '{}' carries no resource infos",
                name
            ));
        }
        let binding = *self.table.resolve(name)?;
        if !type_fits(binding.descriptor_type) {
            return Err(crate::render_err!(
                "quasar::program",
                "Descriptor write for '{}' does not match its reflected type {:?}",
                name,
                binding.descriptor_type
            ));
        }
        self.table.mark_written(name)?;
        self.queues.push(binding.set, binding.binding, array_element, payload);
        Ok(())
    }

    /// True when every reflected resource outside inherited sets has a
    /// queued write
    pub fn all_resources_written(&self) -> bool {
        self.table.all_written(&self.inherited_sets)
    }

    /// Compile the registered stages and queued writes into a program.
    ///
    /// Fails with [`Error::IncompleteBinding`] listing the unwritten names
    /// when the write queue does not cover every non-inherited resource.
    /// On success the queued writes are consumed and the written marks
    /// reset; the registered stages remain for further compiles.
    pub fn compile(
        &mut self,
        device: &dyn GraphicsDevice,
        desc: &PipelineDesc,
    ) -> Result<Program> {
        if self.stages.is_empty() {
            return Err(crate::render_err!(
                "quasar::program",
                "Compile with no registered shader stages"
            ));
        }
        let missing = self.table.missing(&self.inherited_sets);
        if !missing.is_empty() {
            render_warn!(
                "quasar::program",
                "Compile rejected, unwritten resources: {:?}",
                missing
            );
            return Err(Error::IncompleteBinding(missing));
        }

        let layouts = build_set_layouts(device, &self.table)?;
        let layout_ids: Vec<DescriptorSetLayoutId> =
            layouts.iter().map(|l| l.layout).collect();

        let pipeline_layout = match device.create_pipeline_layout(&layout_ids) {
            Ok(layout) => layout,
            Err(err) => {
                destroy_layouts(device, &layouts);
                return Err(err);
            }
        };

        let sets = match self.allocate_and_write_sets(device, &layouts) {
            Ok(sets) => sets,
            Err(err) => {
                device.destroy_pipeline_layout(pipeline_layout);
                destroy_layouts(device, &layouts);
                return Err(err);
            }
        };

        let (bind_point, pipeline_result) = match desc {
            PipelineDesc::Compute => {
                let stage = match self.single_compute_stage() {
                    Ok(stage) => stage,
                    Err(err) => {
                        device.destroy_pipeline_layout(pipeline_layout);
                        destroy_layouts(device, &layouts);
                        return Err(err);
                    }
                };
                (
                    PipelineBindPoint::Compute,
                    device.create_compute_pipeline(pipeline_layout, &stage),
                )
            }
            PipelineDesc::Graphics(state) => (
                PipelineBindPoint::Graphics,
                device.create_graphics_pipeline(pipeline_layout, &self.stages, state),
            ),
        };
        let pipeline = match pipeline_result {
            Ok(pipeline) => pipeline,
            Err(err) => {
                device.destroy_pipeline_layout(pipeline_layout);
                destroy_layouts(device, &layouts);
                return Err(err);
            }
        };

        self.queues.clear();
        self.table.reset_written();

        render_debug!(
            "quasar::program",
            "Compiled {:?} program with {} set layout(s)",
            bind_point,
            layout_ids.len()
        );
        Ok(Program::new(bind_point, pipeline, pipeline_layout, layout_ids, sets))
    }

    /// Destroy registered shader modules and reset all compiler state
    pub fn reset(&mut self, device: &dyn GraphicsDevice) {
        for stage in self.stages.drain(..) {
            device.destroy_shader_module(stage.module);
        }
        self.table.clear();
        self.queues.clear();
        self.inherited_sets.clear();
        self.pool = None;
    }

    fn single_compute_stage(&self) -> Result<ShaderStageDesc> {
        match self.stages.as_slice() {
            [stage] if stage.stage == ShaderStageFlags::COMPUTE => Ok(stage.clone()),
            _ => Err(crate::render_err!(
                "quasar::program",
                "Compute program requires exactly one COMPUTE stage, got {} stage(s)",
                self.stages.len()
            )),
        }
    }

    fn allocate_and_write_sets(
        &self,
        device: &dyn GraphicsDevice,
        layouts: &[CompiledSetLayout],
    ) -> Result<Vec<ProgramSet>> {
        let mut sets = Vec::new();
        for layout in layouts {
            if layout.is_empty() || self.inherited_sets.contains(&layout.set_index) {
                continue;
            }
            let variant_count = self.queues.variant_count(layout.set_index);
            if variant_count == 0 {
                continue;
            }
            let pool = self.pool.ok_or_else(|| {
                crate::render_err!(
                    "quasar::program",
                    "Compile requires a descriptor pool, none was set"
                )
            })?;
            let instances =
                device.allocate_descriptor_sets(pool, layout.layout, variant_count)?;

            let mut writes = Vec::new();
            for (i, instance) in instances.iter().enumerate() {
                for queued in self.queues.writes(layout.set_index) {
                    let mut write = DescriptorWrite {
                        dst_set: *instance,
                        dst_binding: queued.binding,
                        dst_array_element: queued.array_element,
                        buffer_infos: Vec::new(),
                        image_infos: Vec::new(),
                        texel_view_infos: Vec::new(),
                    };
                    match queued.payload.select(i) {
                        WritePayload::Buffers(infos) => write.buffer_infos = infos,
                        WritePayload::Images(infos) => write.image_infos = infos,
                        WritePayload::TexelViews(infos) => write.texel_view_infos = infos,
                    }
                    writes.push(write);
                }
            }
            device.update_descriptor_sets(&writes)?;

            sets.push(ProgramSet {
                set_index: layout.set_index,
                instances,
            });
        }
        Ok(sets)
    }
}

fn destroy_layouts(device: &dyn GraphicsDevice, layouts: &[CompiledSetLayout]) {
    for layout in layouts {
        device.destroy_descriptor_set_layout(layout.layout);
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
