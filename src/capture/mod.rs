//! Platform capture implementations
//!
//! This module provides screen and microphone acquisition for each platform.

pub mod audio;
pub mod display;
pub mod traits;

use crate::recorder::RecorderConfig;
use async_trait::async_trait;

pub use audio::{get_audio_input_devices, MicrophoneSource};
pub use display::DisplaySource;
pub use traits::{
    AudioDeviceInfo, CaptureError, CaptureResult, CaptureSource, MediaStream, MediaTrack,
    TrackInput, TrackKind, TrackOrigin,
};

/// The host platform's microphone and display sources
pub struct PlatformCapture {
    microphone: MicrophoneSource,
    display: DisplaySource,
}

impl PlatformCapture {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            microphone: MicrophoneSource::new(config.microphone_device_id.clone()),
            display: DisplaySource::new(config.capture_system_audio),
        }
    }
}

#[async_trait]
impl CaptureSource for PlatformCapture {
    async fn acquire_microphone(&self) -> CaptureResult<MediaStream> {
        self.microphone.acquire().await
    }

    async fn acquire_display(&self) -> CaptureResult<MediaStream> {
        self.display.acquire().await
    }
}
