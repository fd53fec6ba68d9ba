//! Shader reflection: the reflector collaborator contract and the merged
//! name -> binding table programs are compiled from

pub mod binding_table;

pub use binding_table::BindingReflectionTable;

use crate::device::types::{DescriptorType, ShaderStageFlags};
use crate::error::Result;

/// Highest descriptor set index a program may use, exclusive
///
/// Set indices 0..=2 cover per-frame, per-pass and per-material data; a
/// reflected binding outside that range is a validation error.
pub const MAX_PROGRAM_SET_SLOTS: u32 = 3;

/// One descriptor binding as reported by shader reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectedBinding {
    /// Descriptor set index (0..[`MAX_PROGRAM_SET_SLOTS`])
    pub set: u32,
    /// Binding number within the set
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    /// Array size (1 for non-arrays)
    pub descriptor_count: u32,
    /// Stages that declared the binding; widened as stages are merged
    pub stage_flags: ShaderStageFlags,
}

/// SPIR-V reflection collaborator
///
/// Extracts the named descriptor bindings a shader stage declares. The
/// implementation owns parsing; this crate only consumes the table.
pub trait ShaderReflector {
    /// Reflect one stage, returning `(resource_name, binding)` pairs
    fn reflect(
        &self,
        code: &[u32],
        stage: ShaderStageFlags,
    ) -> Result<Vec<(String, ReflectedBinding)>>;
}

/// Table-driven reflector for tests: maps the first word of the shader
/// code to a canned binding list
#[cfg(test)]
pub struct StubReflector {
    programs: rustc_hash::FxHashMap<u32, Vec<(String, ReflectedBinding)>>,
}

#[cfg(test)]
impl StubReflector {
    pub fn new() -> Self {
        Self { programs: rustc_hash::FxHashMap::default() }
    }

    pub fn insert(&mut self, key: u32, bindings: Vec<(String, ReflectedBinding)>) {
        self.programs.insert(key, bindings);
    }
}

#[cfg(test)]
impl ShaderReflector for StubReflector {
    fn reflect(
        &self,
        code: &[u32],
        stage: ShaderStageFlags,
    ) -> Result<Vec<(String, ReflectedBinding)>> {
        let key = code.first().copied().ok_or_else(|| {
            crate::error::Error::Backend("empty shader code".to_string())
        })?;
        let bindings = self.programs.get(&key).ok_or_else(|| {
            crate::error::Error::Backend(format!("no reflection entry for key {}", key))
        })?;
        Ok(bindings
            .iter()
            .map(|(name, b)| (name.clone(), ReflectedBinding { stage_flags: stage, ..*b }))
            .collect())
    }
}
