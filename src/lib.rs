//! Capture–upload–narrate client flow.
//!
//! Pick an image through a device picker, upload it to a remote captioning
//! service, expose the returned caption, and toggle playback of the optional
//! spoken narration. Device capabilities are abstracted behind narrow traits
//! ([`device::ImagePicker`], [`device::AudioPlayer`]) so the flow logic runs
//! unchanged against real hardware or test fakes.

pub mod api;
pub mod device;
pub mod flow;
pub mod playback;
pub mod selection;
pub mod settings;

pub use flow::{CaptureFlow, FlowState};
pub use playback::PlaybackState;
pub use selection::Selection;
