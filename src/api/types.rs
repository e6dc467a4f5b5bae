use serde::Deserialize;

/// What the captioning service returned for one upload.
///
/// `caption` is `None` when the service answered without one; the flow
/// substitutes its placeholder text. `audio_url`, when present, has already
/// been resolved against the configured base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub caption: Option<String>,
    pub audio_url: Option<String>,
}

/// Success body of `POST /analyze/`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    pub caption: Option<String>,
    /// Path relative to the base URL, e.g. `/audio/abc.mp3`.
    pub audio_url: Option<String>,
}

/// Error body of 4xx responses. FastAPI-style `detail` field; may be a plain
/// string or structured field errors.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

/// Error type for captioning service calls.
///
/// Each variant maps to a distinct user-visible message; the `Display` text
/// is what the UI shows.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP 422 — the server rejected the image; message is the
    /// server-provided detail, surfaced verbatim.
    #[error("{0}")]
    Validation(String),
    /// HTTP 5xx.
    #[error("The server failed to process the image. Please try again later.")]
    Server { status: u16 },
    /// Any other non-2xx status.
    #[error("Upload failed with status {status}.")]
    Status { status: u16 },
    /// The request went out but no usable response came back
    /// (connection refused, DNS, timeout).
    #[error("Network error: could not reach the captioning service.")]
    Network(String),
    /// The request could not even be constructed or sent.
    #[error("Could not send the image: {0}")]
    Request(String),
}

impl ApiError {
    /// True for HTTP 422 validation rejections.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}
