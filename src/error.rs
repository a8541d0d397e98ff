//! Error types for clickfx.
//!
//! The particle engine itself never fails; these cover GPU initialization,
//! settings files and the overlay host.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface supports no usable configuration for this adapter.
    Unsupported,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter(e) => write!(f, "No compatible GPU adapter found: {}", e),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::Unsupported => write!(f, "The window surface is not supported by the GPU adapter"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::NoAdapter(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::Unsupported => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur reading or writing overlay settings.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the settings file.
    Io(std::io::Error),
    /// The settings file is not valid JSON for [`crate::config::OverlayConfig`].
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access settings file: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid settings: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur when running the overlay or rendering frames.
#[derive(Debug)]
pub enum OverlayError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Settings could not be loaded or saved.
    Config(ConfigError),
    /// Failed to write a rendered frame.
    Image(image::ImageError),
    /// Failed to prepare an output location.
    Io(std::io::Error),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            OverlayError::Window(e) => write!(f, "Failed to create window: {}", e),
            OverlayError::Gpu(e) => write!(f, "GPU error: {}", e),
            OverlayError::Config(e) => write!(f, "Config error: {}", e),
            OverlayError::Image(e) => write!(f, "Failed to write image: {}", e),
            OverlayError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::EventLoop(e) => Some(e),
            OverlayError::Window(e) => Some(e),
            OverlayError::Gpu(e) => Some(e),
            OverlayError::Config(e) => Some(e),
            OverlayError::Image(e) => Some(e),
            OverlayError::Io(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for OverlayError {
    fn from(e: winit::error::EventLoopError) -> Self {
        OverlayError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for OverlayError {
    fn from(e: winit::error::OsError) -> Self {
        OverlayError::Window(e)
    }
}

impl From<GpuError> for OverlayError {
    fn from(e: GpuError) -> Self {
        OverlayError::Gpu(e)
    }
}

impl From<ConfigError> for OverlayError {
    fn from(e: ConfigError) -> Self {
        OverlayError::Config(e)
    }
}

impl From<image::ImageError> for OverlayError {
    fn from(e: image::ImageError) -> Self {
        OverlayError::Image(e)
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(e: std::io::Error) -> Self {
        OverlayError::Io(e)
    }
}
