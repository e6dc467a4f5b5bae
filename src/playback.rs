// playback.rs — Load/play/pause lifecycle for the narration clip.
//
// Three states: nothing loaded, loaded and playing, loaded and paused.
// Natural end-of-clip drops back to paused with the resource still loaded;
// reset or a new selection unloads entirely. At most one clip is ever loaded.

use crate::device::{AudioPlayer, DeviceError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// No audio resource held.
    #[default]
    Unloaded,
    /// Resource loaded, currently playing.
    Playing,
    /// Resource loaded, paused (either by the user or after the clip ended).
    Paused,
}

/// Drives an [`AudioPlayer`] through the playback state machine.
pub struct PlaybackController {
    player: Box<dyn AudioPlayer>,
    state: PlaybackState,
    loaded_url: Option<String>,
}

impl PlaybackController {
    pub fn new(player: Box<dyn AudioPlayer>) -> Self {
        Self {
            player,
            state: PlaybackState::Unloaded,
            loaded_url: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The play/pause button. From `Unloaded` this loads `audio_url` and
    /// starts playback; otherwise it flips between playing and paused.
    /// Returns the state after the transition.
    pub async fn toggle(&mut self, audio_url: &str) -> Result<PlaybackState, DeviceError> {
        match self.state {
            PlaybackState::Unloaded => {
                // One resource at a time: drop anything a previous clip left
                // behind before loading the new one.
                if self.loaded_url.is_some() {
                    self.player.unload().await?;
                    self.loaded_url = None;
                }
                self.player.load(audio_url).await?;
                self.loaded_url = Some(audio_url.to_string());
                self.player.play().await?;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Playing => {
                self.player.pause().await?;
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.player.play().await?;
                self.state = PlaybackState::Playing;
            }
        }
        Ok(self.state)
    }

    /// The clip reached its natural end: clear the playing flag but keep the
    /// resource loaded so the user can replay without a refetch.
    pub fn playback_finished(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Release the loaded resource and return to `Unloaded`. Safe to call
    /// from any state.
    pub async fn unload(&mut self) -> Result<(), DeviceError> {
        if self.loaded_url.take().is_some() {
            self.player.unload().await?;
        }
        self.state = PlaybackState::Unloaded;
        Ok(())
    }
}
