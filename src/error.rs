//! Error types for stardust.
//!
//! Each concern gets its own enum: GPU initialization, image decoding,
//! configuration, persistence, greeting composition, and the top-level
//! error returned when running the card window.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("Surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors that can occur while decoding a photo or sprite.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Failed to decode the image bytes.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Failed to read the file from disk.
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),
    /// A `data:` URL that is not base64 encoded or is malformed.
    #[error("Malformed data URL")]
    MalformedDataUrl,
    /// The base64 payload of a data URL could not be decoded.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors raised by configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric parameter was negative, NaN or infinite.
    #[error("Invalid value for `{name}`: {value} (must be finite and non-negative)")]
    InvalidValue { name: &'static str, value: f32 },
    /// A probability or rate outside of `[0, 1]`.
    #[error("`{name}` must lie in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },
    /// Failed to read or write the configuration file.
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for [`CardConfig`](crate::config::CardConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by a [`KeyValueStore`](crate::keepsake::KeyValueStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A stored value could not be (de)serialized.
    #[error("Store contents are corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised while composing a greeting.
#[derive(Debug, Error)]
pub enum GreetingError {
    /// The prompt was empty after trimming.
    #[error("Greeting prompt is empty")]
    EmptyPrompt,
    /// The greeting source failed; the caller keeps the previous greeting.
    #[error("Greeting source failed: {0}")]
    Source(String),
}

/// Errors that can occur when running the card window.
#[derive(Debug, Error)]
pub enum CardError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The configuration was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// The persisted keepsake could not be loaded.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
