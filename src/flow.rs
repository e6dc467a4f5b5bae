// flow.rs — Orchestrates pick → validate → upload → caption → narrate.
//
// Single cooperative sequence: each user action runs to completion and
// re-entrant triggers of an in-flight action are ignored. Every failure is
// caught here and converted into a user-facing notice in the published state;
// nothing is retried automatically.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::sync::Mutex as TokioMutex;

use crate::api::{Analysis, ApiError, CaptionService};
use crate::device::{AudioPlayer, ImagePicker};
use crate::playback::{PlaybackController, PlaybackState};
use crate::selection::Selection;

/// Caption shown when the service answered without a `caption` field.
pub const NO_CAPTION_PLACEHOLDER: &str = "No caption generated";
/// Caption shown after any failed upload.
pub const FAILED_CAPTION_PLACEHOLDER: &str = "Failed to generate caption";

/// Broad category of a user-facing notice, so a UI can style validation
/// problems differently from connectivity ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Server,
    Network,
    Generic,
}

/// A user-facing notification produced by a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn generic(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Generic,
            message: message.into(),
        }
    }
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        let kind = match err {
            ApiError::Validation(_) => NoticeKind::Validation,
            ApiError::Server { .. } => NoticeKind::Server,
            ApiError::Network(_) => NoticeKind::Network,
            ApiError::Status { .. } | ApiError::Request(_) => NoticeKind::Generic,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Snapshot of everything a UI renders. Published through a watch channel on
/// every transition; subscribers re-render from the latest snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowState {
    pub selection: Option<Selection>,
    pub caption: Option<String>,
    pub audio_url: Option<String>,
    pub uploading: bool,
    pub playback: PlaybackState,
    pub notice: Option<Notice>,
}

/// Result of a pick action.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Selected(Selection),
    /// User dismissed the picker; no state changed.
    Cancelled,
    /// Validation or picker failure; a notice was published.
    Rejected,
    /// Another pick was already in flight; this trigger was ignored.
    Busy,
}

/// Result of an upload action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Captioned,
    /// The upload failed; the caption placeholder and a notice were published.
    Failed,
    /// The response arrived after a newer selection or reset superseded it
    /// and was discarded.
    Superseded,
    NoSelection,
    /// An upload was already in flight; this trigger was ignored.
    Busy,
}

/// Result of a playback toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled(PlaybackState),
    /// The current result has no narration to play.
    NoAudio,
    /// A playback action was already in flight; ignored.
    Busy,
    /// The audio engine failed; a notice was published.
    Failed,
}

/// Scalar state behind a plain mutex; never held across an await.
#[derive(Default)]
struct Shared {
    selection: Option<Selection>,
    caption: Option<String>,
    audio_url: Option<String>,
    notice: Option<Notice>,
    playback: PlaybackState,
    picking: bool,
    uploading: bool,
    /// Monotonic id for the current selection/upload generation. A response
    /// carrying a stale id is discarded instead of overwriting newer state.
    upload_seq: u64,
}

/// The capture–upload–narrate flow.
///
/// Construct with the three collaborator seams, then drive it with
/// [`pick_image`](Self::pick_image), [`upload`](Self::upload),
/// [`toggle_playback`](Self::toggle_playback) and [`reset`](Self::reset).
/// Observe it through [`subscribe`](Self::subscribe).
pub struct CaptureFlow {
    service: Arc<dyn CaptionService>,
    picker: Arc<dyn ImagePicker>,
    playback: TokioMutex<PlaybackController>,
    shared: Mutex<Shared>,
    state_tx: watch::Sender<FlowState>,
}

impl CaptureFlow {
    pub fn new(
        service: Arc<dyn CaptionService>,
        picker: Arc<dyn ImagePicker>,
        player: Box<dyn AudioPlayer>,
    ) -> Self {
        let (state_tx, _) = watch::channel(FlowState::default());
        Self {
            service,
            picker,
            playback: TokioMutex::new(PlaybackController::new(player)),
            shared: Mutex::new(Shared::default()),
            state_tx,
        }
    }

    /// Subscribe to state snapshots. The receiver immediately holds the
    /// current state and is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> FlowState {
        self.state_tx.borrow().clone()
    }

    /// Open the picker and validate the result.
    ///
    /// On success the new selection replaces any previous one, prior
    /// caption/narration state is cleared, any loaded audio is released, and
    /// an in-flight upload for the old selection is marked stale.
    pub async fn pick_image(&self) -> PickOutcome {
        {
            let mut s = self.shared.lock().unwrap();
            if s.picking {
                log::info!("Pick ignored: picker already open");
                return PickOutcome::Busy;
            }
            s.picking = true;
        }
        let outcome = self.do_pick().await;
        self.shared.lock().unwrap().picking = false;
        if !matches!(outcome, PickOutcome::Cancelled) {
            self.publish();
        }
        outcome
    }

    async fn do_pick(&self) -> PickOutcome {
        let picked = match self.picker.pick().await {
            Ok(Some(p)) => p,
            Ok(None) => {
                log::info!("Picker cancelled");
                return PickOutcome::Cancelled;
            }
            Err(e) => {
                log::error!("Picker failed: {e}");
                self.set_notice(Notice::generic(e.to_string()));
                return PickOutcome::Rejected;
            }
        };

        let byte_size = match self.picker.byte_size(&picked.uri).await {
            Ok(n) => n,
            Err(e) => {
                log::error!("File metadata lookup failed: {e}");
                self.set_notice(Notice::generic(e.to_string()));
                return PickOutcome::Rejected;
            }
        };

        let selection = match Selection::new(picked.uri, picked.file_name, byte_size) {
            Ok(sel) => sel,
            Err(e) => {
                log::warn!("Selection rejected: {e}");
                self.set_notice(Notice {
                    kind: NoticeKind::Validation,
                    message: e.to_string(),
                });
                return PickOutcome::Rejected;
            }
        };

        self.release_audio().await;

        let mut s = self.shared.lock().unwrap();
        s.selection = Some(selection.clone());
        s.caption = None;
        s.audio_url = None;
        s.notice = None;
        s.playback = PlaybackState::Unloaded;
        s.upload_seq += 1;
        log::info!(
            "Selected {} ({} bytes, generation {})",
            selection.file_name,
            selection.byte_size,
            s.upload_seq
        );
        drop(s);
        PickOutcome::Selected(selection)
    }

    /// Upload the current selection to the captioning service.
    ///
    /// Clears prior caption/narration state and releases any loaded audio
    /// before sending. The response is applied only if no newer selection or
    /// reset happened while it was in flight.
    pub async fn upload(&self) -> UploadOutcome {
        let (selection, seq) = {
            let mut s = self.shared.lock().unwrap();
            if s.uploading {
                log::info!("Upload ignored: one already in flight");
                return UploadOutcome::Busy;
            }
            let Some(selection) = s.selection.clone() else {
                return UploadOutcome::NoSelection;
            };
            s.uploading = true;
            s.upload_seq += 1;
            s.caption = None;
            s.audio_url = None;
            s.notice = None;
            (selection, s.upload_seq)
        };
        self.release_audio().await;
        self.publish();

        let result = self.run_upload(&selection).await;

        let outcome = {
            let mut s = self.shared.lock().unwrap();
            s.uploading = false;
            if s.upload_seq != seq {
                // A newer selection or a reset owns the state now.
                log::info!(
                    "Discarding stale response (generation {} superseded by {})",
                    seq,
                    s.upload_seq
                );
                UploadOutcome::Superseded
            } else {
                match result {
                    Ok(analysis) => {
                        s.caption = Some(
                            analysis
                                .caption
                                .unwrap_or_else(|| NO_CAPTION_PLACEHOLDER.to_string()),
                        );
                        s.audio_url = analysis.audio_url;
                        UploadOutcome::Captioned
                    }
                    Err(notice) => {
                        s.caption = Some(FAILED_CAPTION_PLACEHOLDER.to_string());
                        s.audio_url = None;
                        s.notice = Some(notice);
                        UploadOutcome::Failed
                    }
                }
            }
        };
        self.publish();
        outcome
    }

    async fn run_upload(&self, selection: &Selection) -> Result<Analysis, Notice> {
        let data = self.picker.read(&selection.uri).await.map_err(|e| {
            log::error!("Could not read {}: {e}", selection.uri);
            Notice::generic(e.to_string())
        })?;
        self.service
            .analyze(data, &selection.extension)
            .await
            .map_err(|e| {
                log::error!("Analyze failed via {}: {e}", self.service.name());
                Notice::from(&e)
            })
    }

    /// The play/pause button for the narration clip.
    pub async fn toggle_playback(&self) -> ToggleOutcome {
        let Some(audio_url) = self.shared.lock().unwrap().audio_url.clone() else {
            return ToggleOutcome::NoAudio;
        };
        let mut playback = match self.playback.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::info!("Playback toggle ignored: one already in flight");
                return ToggleOutcome::Busy;
            }
        };
        match playback.toggle(&audio_url).await {
            Ok(state) => {
                self.shared.lock().unwrap().playback = state;
                drop(playback);
                self.publish();
                ToggleOutcome::Toggled(state)
            }
            Err(e) => {
                log::error!("Playback failed: {e}");
                let state = playback.state();
                drop(playback);
                {
                    let mut s = self.shared.lock().unwrap();
                    s.playback = state;
                    s.notice = Some(Notice::generic(e.to_string()));
                }
                self.publish();
                ToggleOutcome::Failed
            }
        }
    }

    /// Host callback for natural end-of-clip: the playing flag drops but the
    /// resource stays loaded for replay.
    pub async fn playback_completed(&self) {
        let mut playback = self.playback.lock().await;
        playback.playback_finished();
        self.shared.lock().unwrap().playback = playback.state();
        drop(playback);
        self.publish();
    }

    /// Clear selection, caption, narration URL and notices, and release any
    /// loaded audio. An in-flight upload's eventual response is discarded.
    pub async fn reset(&self) {
        self.release_audio().await;
        {
            let mut s = self.shared.lock().unwrap();
            s.selection = None;
            s.caption = None;
            s.audio_url = None;
            s.notice = None;
            s.playback = PlaybackState::Unloaded;
            s.upload_seq += 1;
        }
        log::info!("Flow reset");
        self.publish();
    }

    /// Unload the audio resource, tolerating engine failures: a clip we can
    /// no longer release must not wedge the rest of the flow.
    async fn release_audio(&self) {
        let mut playback = self.playback.lock().await;
        if let Err(e) = playback.unload().await {
            log::warn!("Audio unload failed: {e}");
        }
        self.shared.lock().unwrap().playback = playback.state();
    }

    fn set_notice(&self, notice: Notice) {
        self.shared.lock().unwrap().notice = Some(notice);
    }

    /// Publish the current snapshot to all subscribers.
    fn publish(&self) {
        let snapshot = {
            let s = self.shared.lock().unwrap();
            FlowState {
                selection: s.selection.clone(),
                caption: s.caption.clone(),
                audio_url: s.audio_url.clone(),
                uploading: s.uploading,
                playback: s.playback,
                notice: s.notice.clone(),
            }
        };
        self.state_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_kind_mirrors_api_error_taxonomy() {
        let cases = [
            (ApiError::Validation("bad image".into()), NoticeKind::Validation),
            (ApiError::Server { status: 503 }, NoticeKind::Server),
            (ApiError::Network("refused".into()), NoticeKind::Network),
            (ApiError::Status { status: 404 }, NoticeKind::Generic),
            (ApiError::Request("oops".into()), NoticeKind::Generic),
        ];
        for (err, kind) in cases {
            assert_eq!(Notice::from(&err).kind, kind, "{err}");
        }
    }

    #[test]
    fn validation_notice_carries_detail_verbatim() {
        let notice = Notice::from(&ApiError::Validation("bad image".into()));
        assert_eq!(notice.message, "bad image");
    }

    #[test]
    fn default_state_is_empty_and_unloaded() {
        let state = FlowState::default();
        assert!(state.selection.is_none());
        assert!(state.caption.is_none());
        assert!(state.audio_url.is_none());
        assert!(!state.uploading);
        assert_eq!(state.playback, PlaybackState::Unloaded);
        assert!(state.notice.is_none());
    }
}
