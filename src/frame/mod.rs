//! Frame-in-flight resources and the per-frame begin/end protocol

pub mod frame_pool;
pub mod frame_resources;
pub mod gpu_timing;

pub use frame_pool::FrameResourcePool;
pub use frame_resources::FrameResources;
pub use gpu_timing::FrameGpuTimer;
