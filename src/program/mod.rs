//! Program compilation: descriptor set layouts, write queues, and the
//! compiler that turns shader stages plus named resource writes into
//! bindable [`Program`]s

pub mod compiler;
pub mod layout_registry;
pub mod program;
pub mod write_queue;

pub use compiler::{PipelineDesc, ProgramCompiler, ShaderSource};
pub use layout_registry::{build_set_layouts, pool_sizes_for, CompiledSetLayout};
pub use program::Program;
pub use write_queue::{QueuedWrite, WritePayload, WriteQueues};
