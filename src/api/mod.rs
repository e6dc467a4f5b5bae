use async_trait::async_trait;

pub mod backend;
pub mod types;
pub use backend::BackendClient;
pub use types::*;

/// Trait for the remote captioning service.
///
/// The flow only ever needs one operation: hand over image bytes, get back a
/// caption and (maybe) a narration URL. Keeping it a trait lets tests inject
/// a canned service instead of a live backend.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Upload an image for analysis.
    /// `data` is the raw image bytes; `extension` is the validated,
    /// lowercased file extension (`jpg`, `jpeg`, or `png`).
    async fn analyze(&self, data: Vec<u8>, extension: &str) -> Result<Analysis, ApiError>;

    /// Service name for logging/display.
    fn name(&self) -> &str;
}
