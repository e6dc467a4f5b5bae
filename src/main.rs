// main.rs — Headless demo: caption one image against a running backend.
//
//   scenevoice <image-file>
//
// Reads `settings.toml` from the working directory (defaults apply when it
// is absent), uploads the image, prints the caption, and downloads the
// narration clip if one came back.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use scenevoice::api::BackendClient;
use scenevoice::device::{AudioPlayer, DeviceError, FsImagePicker};
use scenevoice::flow::{CaptureFlow, PickOutcome, UploadOutcome};
use scenevoice::settings::Settings;

/// Headless [`AudioPlayer`]: "loading" downloads the narration clip into the
/// system temp directory and "playing" reports where it landed.
struct DownloadPlayer {
    saved: Option<PathBuf>,
}

impl DownloadPlayer {
    fn new() -> Self {
        Self { saved: None }
    }
}

#[async_trait]
impl AudioPlayer for DownloadPlayer {
    async fn load(&mut self, url: &str) -> Result<(), DeviceError> {
        self.saved = None;
        let response = reqwest::get(url)
            .await
            .map_err(|e| DeviceError::Audio(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DeviceError::Audio(format!(
                "narration fetch failed with HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeviceError::Audio(e.to_string()))?;
        let name = url
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("narration.mp3");
        let path = std::env::temp_dir().join(name);
        tokio::fs::write(&path, &bytes).await?;
        self.saved = Some(path);
        Ok(())
    }

    async fn play(&mut self) -> Result<(), DeviceError> {
        if let Some(path) = &self.saved {
            println!("Narration: {}", path.display());
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    async fn unload(&mut self) -> Result<(), DeviceError> {
        if let Some(path) = self.saved.take() {
            let _ = tokio::fs::remove_file(&path).await;
        }
        Ok(())
    }
}

fn print_notice(flow: &CaptureFlow) {
    if let Some(notice) = flow.state().notice {
        eprintln!("{}", notice.message);
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let Some(image_path) = std::env::args().nth(1) else {
        eprintln!("usage: scenevoice <image-file>");
        std::process::exit(2);
    };

    let settings = match Settings::load(Path::new("settings.toml")) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Falling back to default settings: {e}");
            Settings::default()
        }
    };

    let client = match BackendClient::with_timeout(
        &settings.base_url,
        Duration::from_secs(settings.request_timeout_secs),
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Bad base URL {:?}: {e}", settings.base_url);
            std::process::exit(2);
        }
    };
    if let Err(e) = client.health().await {
        log::warn!("Backend health check failed: {e}");
    }

    let flow = CaptureFlow::new(
        Arc::new(client),
        Arc::new(FsImagePicker::new(&image_path)),
        Box::new(DownloadPlayer::new()),
    );

    match flow.pick_image().await {
        PickOutcome::Selected(selection) => {
            log::info!("Uploading {} to {}", selection.file_name, settings.base_url);
        }
        PickOutcome::Cancelled => return,
        PickOutcome::Rejected | PickOutcome::Busy => {
            print_notice(&flow);
            std::process::exit(1);
        }
    }

    match flow.upload().await {
        UploadOutcome::Captioned => {}
        _ => {
            print_notice(&flow);
            if let Some(caption) = flow.state().caption {
                eprintln!("{caption}");
            }
            std::process::exit(1);
        }
    }

    let state = flow.state();
    if let Some(caption) = &state.caption {
        println!("Caption: {caption}");
    }
    if state.audio_url.is_some() {
        // First toggle downloads the clip and "plays" it (prints the path).
        flow.toggle_playback().await;
    }
}
