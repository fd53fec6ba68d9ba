//! Merged reflection table
//!
//! Accumulates the bindings of every stage registered into a program into a
//! single name-keyed table. Stages that share a binding must agree on its
//! set, binding number, type and count; their stage flags are unioned. The
//! table also tracks which resources have been written before compilation,
//! so an incomplete program is rejected with the exact missing names.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::reflection::{ReflectedBinding, MAX_PROGRAM_SET_SLOTS};

struct TableEntry {
    binding: ReflectedBinding,
    written: bool,
}

/// Name -> binding table merged across all registered stages
#[derive(Default)]
pub struct BindingReflectionTable {
    entries: FxHashMap<String, TableEntry>,
}

impl BindingReflectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one stage's reflected bindings into the table.
    ///
    /// A name already present must match the existing entry in set, binding
    /// number, type and count; only the stage flags may differ and are
    /// unioned. Any disagreement is a [`Error::ReflectionConflict`], and a
    /// set index at or above [`MAX_PROGRAM_SET_SLOTS`] is a
    /// [`Error::SetIndexOutOfRange`].
    pub fn merge_stage(&mut self, stage_bindings: &[(String, ReflectedBinding)]) -> Result<()> {
        for (name, binding) in stage_bindings {
            if binding.set >= MAX_PROGRAM_SET_SLOTS {
                return Err(Error::SetIndexOutOfRange {
                    name: name.clone(),
                    set_index: binding.set,
                });
            }
            match self.entries.get_mut(name) {
                Some(existing) => {
                    let prev = existing.binding;
                    if prev.set != binding.set
                        || prev.binding != binding.binding
                        || prev.descriptor_type != binding.descriptor_type
                        || prev.descriptor_count != binding.descriptor_count
                    {
                        return Err(Error::ReflectionConflict(format!(
                            "resource '{}' is declared as (set={}, binding={}, type={:?}, count={}) \
                             in one stage and (set={}, binding={}, type={:?}, count={}) in another",
                            name,
                            prev.set,
                            prev.binding,
                            prev.descriptor_type,
                            prev.descriptor_count,
                            binding.set,
                            binding.binding,
                            binding.descriptor_type,
                            binding.descriptor_count,
                        )));
                    }
                    existing.binding.stage_flags |= binding.stage_flags;
                }
                None => {
                    self.entries.insert(
                        name.clone(),
                        TableEntry { binding: *binding, written: false },
                    );
                }
            }
        }
        Ok(())
    }

    /// Look up a resource by name
    pub fn resolve(&self, name: &str) -> Result<&ReflectedBinding> {
        self.entries
            .get(name)
            .map(|e| &e.binding)
            .ok_or_else(|| Error::ResourceNotFound(name.to_string()))
    }

    /// Mark a resource as written; fails if the name is unknown
    pub fn mark_written(&mut self, name: &str) -> Result<()> {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.written = true;
                Ok(())
            }
            None => Err(Error::ResourceNotFound(name.to_string())),
        }
    }

    /// Clear all written marks, keeping the bindings
    pub fn reset_written(&mut self) {
        for entry in self.entries.values_mut() {
            entry.written = false;
        }
    }

    /// Names of resources not yet written, sorted, skipping exempt sets
    pub fn missing(&self, exempt_sets: &[u32]) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.written && !exempt_sets.contains(&e.binding.set))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// True when every non-exempt resource has been written
    pub fn all_written(&self, exempt_sets: &[u32]) -> bool {
        self.missing(exempt_sets).is_empty()
    }

    /// Iterate all `(name, binding)` entries in unspecified order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &ReflectedBinding)> {
        self.entries.iter().map(|(name, e)| (name.as_str(), &e.binding))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything, bindings and written marks alike
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "binding_table_tests.rs"]
mod tests;
