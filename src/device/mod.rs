//! Device capability seams.
//!
//! The flow never talks to platform APIs directly; it goes through these
//! traits so the same logic runs against real device integrations, the
//! filesystem-backed implementations here, or test fakes.

use async_trait::async_trait;
use thiserror::Error;

pub mod fs;
pub use fs::FsImagePicker;

/// Error type for device capability failures.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Image picker failed: {0}")]
    Picker(String),
    #[error("Could not read the selected file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Audio playback failed: {0}")]
    Audio(String),
}

/// A picker result before validation: where the image lives and what it is
/// called. Size comes separately from [`ImagePicker::byte_size`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    pub uri: String,
    pub file_name: String,
}

/// Media-picker capability, restricted to images.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Show the picker. `Ok(None)` means the user cancelled; no state changes
    /// follow from a cancellation.
    async fn pick(&self) -> Result<Option<PickedImage>, DeviceError>;

    /// Byte size of the resource behind `uri` (file-metadata capability).
    async fn byte_size(&self, uri: &str) -> Result<u64, DeviceError>;

    /// Read the full resource contents for upload.
    async fn read(&self, uri: &str) -> Result<Vec<u8>, DeviceError>;
}

/// Audio-playback capability: load/play/pause/unload one resource at a time.
///
/// Natural end-of-clip is reported by the host environment; it signals the
/// flow via [`crate::CaptureFlow::playback_completed`], not through this
/// trait.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Fetch and prepare the clip at `url`. Implementations must release any
    /// previously loaded resource first.
    async fn load(&mut self, url: &str) -> Result<(), DeviceError>;

    /// Start or resume playback of the loaded clip.
    async fn play(&mut self) -> Result<(), DeviceError>;

    /// Pause playback, keeping the clip loaded.
    async fn pause(&mut self) -> Result<(), DeviceError>;

    /// Stop playback and release the loaded resource. Must be a no-op when
    /// nothing is loaded.
    async fn unload(&mut self) -> Result<(), DeviceError>;
}
