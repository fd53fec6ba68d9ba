//! Device abstraction: opaque handles, shared data types and the
//! [`GraphicsDevice`] backend contract

pub mod graphics_device;
pub mod handles;
pub mod types;

#[cfg(test)]
pub mod mock_graphics_device;

pub use graphics_device::GraphicsDevice;
pub use handles::*;
pub use types::*;
