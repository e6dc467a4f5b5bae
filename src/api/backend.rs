// backend.rs — reqwest client for the captioning backend.
//
// One POST to `{base}/analyze/` with the image as a multipart part named
// "file". The response taxonomy (422 / 5xx / other / network / unsendable)
// maps onto the `ApiError` variants so the flow can show distinct messages.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::StatusCode;
use url::Url;

use super::{Analysis, AnalyzeBody, ApiError, CaptionService, ErrorBody};

/// Default request timeout; a request still pending after this is treated as
/// a network failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BackendClient {
    base_url: Url,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client with the default 30-second timeout.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::Request(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// `GET {base}/` health probe. The backend answers
    /// `{"message": "Backend is running successfully!"}` when up.
    pub async fn health(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .get(self.base_url.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_send_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl CaptionService for BackendClient {
    async fn analyze(&self, data: Vec<u8>, extension: &str) -> Result<Analysis, ApiError> {
        let url = format!("{}/analyze/", self.base_url.as_str().trim_end_matches('/'));

        let part = multipart::Part::bytes(data)
            .file_name(upload_file_name(extension))
            .mime_str(&format!("image/{}", mime_subtype(extension)))
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        log::info!("Uploading image to {url}");
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let analysis = interpret_response(status, &body, &self.base_url)?;
        log::info!(
            "Caption received ({} chars, narration: {})",
            analysis.caption.as_deref().unwrap_or("").len(),
            analysis.audio_url.is_some()
        );
        Ok(analysis)
    }

    fn name(&self) -> &str {
        "scenevoice-backend"
    }
}

/// Generated upload filename: `image_<epoch-ms>.<ext>`.
fn upload_file_name(extension: &str) -> String {
    let epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("image_{}.{}", epoch_ms, extension)
}

/// MIME subtype for an allowed extension. `jpg` files are sent as
/// `image/jpeg`; everything else maps straight through.
fn mime_subtype(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" => "jpeg".to_string(),
        other => other.to_string(),
    }
}

/// Errors from `send()`: a request that never made it onto the wire is a
/// `Request` failure, anything after that (refused, DNS, timeout) is `Network`.
fn classify_send_error(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::Request(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

/// Map an HTTP status + body to an `Analysis` or the matching `ApiError`.
/// Pure so the taxonomy is unit-testable without a server.
fn interpret_response(status: StatusCode, body: &str, base_url: &Url) -> Result<Analysis, ApiError> {
    if status.is_success() {
        let parsed: AnalyzeBody = serde_json::from_str(body)
            .map_err(|e| ApiError::Request(format!("invalid response body: {e}")))?;
        let audio_url = parsed
            .audio_url
            .and_then(|path| match base_url.join(&path) {
                Ok(absolute) => Some(absolute.to_string()),
                Err(e) => {
                    log::warn!("Unusable audio_url {path:?}: {e}");
                    None
                }
            });
        return Ok(Analysis {
            caption: parsed.caption,
            audio_url,
        });
    }

    let status = status.as_u16();
    if status == 422 {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| "The image was rejected by the server.".to_string());
        Err(ApiError::Validation(detail))
    } else if status >= 500 {
        Err(ApiError::Server { status })
    } else {
        Err(ApiError::Status { status })
    }
}
