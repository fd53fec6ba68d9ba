/*!
# Quasar Render Core

Frame-in-flight resource management and descriptor-set program compilation
over a pluggable graphics backend.

The crate owns two responsibilities:

- **FrameResourcePool**: N frame slots of command pools, command buffers
  and synchronization primitives cycled round-robin, with the full
  begin/end frame protocol (fence waits, image acquisition, layout
  transitions, submission and presentation)
- **ProgramCompiler**: reflection-driven compilation of shader stages plus
  named resource writes into bindable `Program`s, with per-frame
  descriptor set variants selected by frame slot at bind time

Backend access goes through the `GraphicsDevice` trait; SPIR-V parsing
goes through the `ShaderReflector` trait. Both are supplied by the
application, so the core stays free of any concrete graphics API.
*/

// Internal modules
mod config;
mod error;
pub mod device;
pub mod frame;
pub mod log;
pub mod program;
pub mod reflection;

// Main quasar namespace module
pub mod quasar {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{
        ApiVersion, Extent2d, PresentMode, QueueCapabilities, RendererConfig, SurfaceFormat,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: render_* macros are NOT re-exported here - they are internal only
    }

    // Device abstraction sub-module
    pub mod device {
        pub use crate::device::graphics_device::GraphicsDevice;
        pub use crate::device::handles::*;
        pub use crate::device::types::*;
    }

    // Frame-in-flight sub-module
    pub mod frame {
        pub use crate::frame::*;
    }

    // Program compilation sub-module
    pub mod program {
        pub use crate::program::*;
        pub use crate::reflection::{
            BindingReflectionTable, ReflectedBinding, ShaderReflector, MAX_PROGRAM_SET_SLOTS,
        };
    }
}
