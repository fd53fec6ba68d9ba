//! Error types for the Quasar render core
//!
//! One crate-wide error enum split along the lines that matter to callers:
//! device-level failures (fatal, nothing sensible to do but shut down) and
//! program-compilation validation failures (recoverable, the caller may
//! correct the write set and retry).

use std::fmt;

/// Result type for Quasar render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Quasar render errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Device-level failure reported by the graphics backend
    /// (device loss, out-of-memory, internal misuse)
    Backend(String),

    /// Initialization failed (configuration, device setup)
    InitializationFailed(String),

    /// A named resource does not exist in the reflection table
    ResourceNotFound(String),

    /// A resource resolved to a descriptor set slot outside the
    /// supported range (programs own at most 3 logical set slots)
    SetIndexOutOfRange {
        /// Resource name that resolved out of range
        name: String,
        /// The offending set index
        set_index: u32,
    },

    /// Program compilation was attempted before every reflected binding
    /// was written; carries the sorted names of the missing resources
    IncompleteBinding(Vec<String>),

    /// Two shader stages declared the same resource name with different
    /// binding assignments
    ReflectionConflict(String),

    /// The externally supplied descriptor pool could not satisfy an
    /// allocation; the whole compile is aborted
    DescriptorPoolExhausted(String),
}

impl Error {
    /// True for compile-time validation errors the caller can recover from
    /// by correcting the reflection input or the write set.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ResourceNotFound(_)
                | Error::SetIndexOutOfRange { .. }
                | Error::IncompleteBinding(_)
                | Error::ReflectionConflict(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ResourceNotFound(name) => write!(f, "Resource not found: '{}'", name),
            Error::SetIndexOutOfRange { name, set_index } => write!(
                f,
                "Resource '{}' targets descriptor set {} (program set slots are 0..3)",
                name, set_index
            ),
            Error::IncompleteBinding(missing) => write!(
                f,
                "Program compilation failed: unwritten resources: {}",
                missing.join(", ")
            ),
            Error::ReflectionConflict(msg) => write!(f, "Reflection conflict: {}", msg),
            Error::DescriptorPoolExhausted(msg) => {
                write!(f, "Descriptor pool exhausted: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
