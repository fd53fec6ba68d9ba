//! Descriptor set layout construction from a merged reflection table
//!
//! Bindings are grouped by set index and ordered by binding number, then a
//! layout is created for every set slot from 0 through the highest set in
//! use. Gap sets get an empty layout so the pipeline layout stays
//! contiguous, which is what backends expect.

use std::collections::BTreeMap;

use crate::device::handles::DescriptorSetLayoutId;
use crate::device::types::{DescriptorPoolSize, LayoutBinding};
use crate::device::GraphicsDevice;
use crate::error::{Error, Result};
use crate::reflection::BindingReflectionTable;

/// A created set layout plus the ordered bindings it was built from
#[derive(Debug, Clone)]
pub struct CompiledSetLayout {
    pub set_index: u32,
    pub layout: DescriptorSetLayoutId,
    /// Bindings in ascending binding-number order; empty for gap sets
    pub bindings: Vec<LayoutBinding>,
}

impl CompiledSetLayout {
    /// True for a gap set with no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Create one set layout per set slot 0..=highest used set.
///
/// Two resource names that alias the same `(set, binding)` pair must agree
/// exactly; a disagreement is a [`Error::ReflectionConflict`].
pub fn build_set_layouts(
    device: &dyn GraphicsDevice,
    table: &BindingReflectionTable,
) -> Result<Vec<CompiledSetLayout>> {
    let mut grouped: BTreeMap<u32, BTreeMap<u32, LayoutBinding>> = BTreeMap::new();
    for (name, reflected) in table.bindings() {
        let layout_binding = LayoutBinding {
            binding: reflected.binding,
            descriptor_type: reflected.descriptor_type,
            descriptor_count: reflected.descriptor_count,
            stage_flags: reflected.stage_flags,
        };
        let set = grouped.entry(reflected.set).or_default();
        match set.get(&reflected.binding) {
            Some(existing) if *existing != layout_binding => {
                return Err(Error::ReflectionConflict(format!(
                    "resource '{}' aliases (set={}, binding={}) with a different declaration",
                    name, reflected.set, reflected.binding
                )));
            }
            _ => {
                set.insert(reflected.binding, layout_binding);
            }
        }
    }

    let max_set = match grouped.keys().next_back() {
        Some(max) => *max,
        None => return Ok(Vec::new()),
    };

    let mut layouts: Vec<CompiledSetLayout> = Vec::with_capacity(max_set as usize + 1);
    for set_index in 0..=max_set {
        let bindings: Vec<LayoutBinding> = grouped
            .get(&set_index)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default();
        let layout = match device.create_descriptor_set_layout(&bindings) {
            Ok(layout) => layout,
            Err(err) => {
                for created in &layouts {
                    device.destroy_descriptor_set_layout(created.layout);
                }
                return Err(err);
            }
        };
        layouts.push(CompiledSetLayout { set_index, layout, bindings });
    }
    Ok(layouts)
}

/// Sum the descriptor capacity one instance of each layout needs.
///
/// The caller scales by its physical set instance count when sizing a pool.
pub fn pool_sizes_for(layouts: &[CompiledSetLayout]) -> Vec<DescriptorPoolSize> {
    let mut sizes: Vec<DescriptorPoolSize> = Vec::new();
    for layout in layouts {
        for binding in &layout.bindings {
            match sizes.iter_mut().find(|s| s.descriptor_type == binding.descriptor_type) {
                Some(size) => size.descriptor_count += binding.descriptor_count,
                None => sizes.push(DescriptorPoolSize {
                    descriptor_type: binding.descriptor_type,
                    descriptor_count: binding.descriptor_count,
                }),
            }
        }
    }
    sizes
}

#[cfg(test)]
#[path = "layout_registry_tests.rs"]
mod tests;
