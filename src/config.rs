//! Renderer configuration
//!
//! Describes everything the backend bootstrap needs (API version, layers,
//! extensions, device selection, swapchain parameters) plus the knobs this
//! core consumes directly: the number of frame-resource slots and the runtime
//! GPU-timing instrumentation flag.
//!
//! The configuration is a plain serde document so it can be persisted as
//! JSON next to the application and loaded at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Error, Result};
use crate::render_info;

/// Queue capabilities the application requires from the device queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueCapabilities {
    pub graphics: bool,
    pub compute: bool,
    pub transfer: bool,
    /// Queue must be able to present to the window surface
    pub present: bool,
}

impl Default for QueueCapabilities {
    fn default() -> Self {
        Self {
            graphics: true,
            compute: true,
            transfer: true,
            present: true,
        }
    }
}

/// Swapchain surface format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceFormat {
    Bgra8Srgb,
    Bgra8Unorm,
    Rgba8Srgb,
    Rgba8Unorm,
}

/// Swapchain presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentMode {
    /// Vsync, always supported
    Fifo,
    /// Vsync unless the frame is late
    FifoRelaxed,
    /// Low-latency vsync with frame replacement
    Mailbox,
    /// No vsync, tearing possible
    Immediate,
}

/// Two-dimensional pixel extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent2d {
    pub width: u32,
    pub height: u32,
}

/// Graphics API version the backend should request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

/// Renderer configuration document
///
/// Loaded from JSON at startup; consumed by the backend bootstrap
/// (a collaborator of this crate) and by [`FrameResourcePool`] creation.
///
/// [`FrameResourcePool`]: crate::frame::FrameResourcePool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Graphics API version to request
    pub api_version: ApiVersion,

    /// Instance layers to enable (e.g. validation)
    pub requested_layers: Vec<String>,

    /// Instance extensions to enable
    pub requested_extensions: Vec<String>,

    /// Index into the enumerated physical-device list
    pub physical_device_index: u32,

    /// Capabilities required from the device queue
    pub queue_capabilities: QueueCapabilities,

    /// Device feature names to enable
    pub device_features: Vec<String>,

    /// Device extensions to enable
    pub device_extensions: Vec<String>,

    /// Swapchain image format
    pub swapchain_format: SurfaceFormat,

    /// Minimum number of swapchain images
    pub swapchain_min_image_count: u32,

    /// Swapchain image extent in pixels
    pub swapchain_extent: Extent2d,

    /// Swapchain presentation mode
    pub swapchain_present_mode: PresentMode,

    /// Number of frame-resource slots cycled by the frame loop.
    /// 1 fully serializes CPU and GPU work; 2-3 allows overlap.
    pub frames_in_flight: usize,

    /// Enable per-frame GPU timestamp instrumentation at runtime
    pub enable_gpu_timing: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion { major: 1, minor: 3 },
            requested_layers: Vec::new(),
            requested_extensions: Vec::new(),
            physical_device_index: 0,
            queue_capabilities: QueueCapabilities::default(),
            device_features: Vec::new(),
            device_extensions: Vec::new(),
            swapchain_format: SurfaceFormat::Bgra8Srgb,
            swapchain_min_image_count: 2,
            swapchain_extent: Extent2d { width: 1280, height: 720 },
            swapchain_present_mode: PresentMode::Fifo,
            frames_in_flight: 2,
            enable_gpu_timing: false,
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RendererConfig = serde_json::from_str(json).map_err(|e| {
            Error::InitializationFailed(format!("Failed to parse renderer config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::InitializationFailed(format!("Failed to serialize renderer config: {}", e))
        })
    }

    /// Load and validate a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::InitializationFailed(format!(
                "Failed to read renderer config '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json_str(&json)?;
        render_info!(
            "quasar::config",
            "Loaded renderer config from '{}' ({} frame slots)",
            path.display(),
            config.frames_in_flight
        );
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on
    pub fn validate(&self) -> Result<()> {
        if self.frames_in_flight == 0 {
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }
        if self.swapchain_min_image_count == 0 {
            return Err(Error::InitializationFailed(
                "swapchain_min_image_count must be at least 1".to_string(),
            ));
        }
        if self.swapchain_extent.width == 0 || self.swapchain_extent.height == 0 {
            return Err(Error::InitializationFailed(
                "swapchain_extent must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
