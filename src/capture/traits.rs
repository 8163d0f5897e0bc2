//! Capture trait definitions
//!
//! Platform-agnostic types for the capture boundary: media tracks, the
//! streams that group them, and the `CaptureSource` that hands them out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while acquiring capture streams
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Unsupported environment: {0}")]
    Unsupported(String),

    #[error("Capture cancelled by user")]
    Cancelled,

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Information about an audio device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,

    /// Whether this is an input device
    pub is_input: bool,

    /// Whether this is the default device
    pub is_default: bool,
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Where a track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackOrigin {
    /// Screen/display capture
    Display,
    /// Audio captured alongside the display
    SystemAudio,
    /// Microphone capture
    Microphone,
}

impl std::fmt::Display for TrackOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackOrigin::Display => write!(f, "display"),
            TrackOrigin::SystemAudio => write!(f, "system-audio"),
            TrackOrigin::Microphone => write!(f, "microphone"),
        }
    }
}

/// How the encoder opens a track's source
///
/// `format` is an FFmpeg input device (`x11grab`, `pulse`, `avfoundation`,
/// `gdigrab`, `dshow`) and `target` the device-specific input name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInput {
    pub format: String,
    pub target: String,
}

impl TrackInput {
    pub fn new(format: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            target: target.into(),
        }
    }
}

/// A live media track handed out by the platform
///
/// Clones share the same liveness flag, so stopping any clone releases the
/// track for all of them.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    origin: TrackOrigin,
    label: String,
    input: TrackInput,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(
        kind: TrackKind,
        origin: TrackOrigin,
        label: impl Into<String>,
        input: TrackInput,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            origin,
            label: label.into(),
            input,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn origin(&self) -> TrackOrigin {
        self.origin
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &TrackInput {
        &self.input
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Release the underlying device. Stopping twice is harmless.
    pub fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            tracing::debug!("Stopped {} track '{}'", self.origin, self.label);
        }
    }
}

/// A set of tracks recorded together
#[derive(Debug, Clone, Default)]
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    /// Merge every display track with the microphone's audio tracks.
    ///
    /// Non-audio tracks from the microphone stream are not recorded and are
    /// released immediately.
    pub fn combine(display: MediaStream, microphone: MediaStream) -> Self {
        let mut tracks = display.tracks;
        for track in microphone.tracks {
            if track.kind() == TrackKind::Audio {
                tracks.push(track);
            } else {
                track.stop();
            }
        }
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Stop every track in the stream
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// Source of capture streams
///
/// Each request either resolves with live tracks or fails with the reason the
/// platform (or the user) refused it. Requests have no timeout.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Acquire a microphone audio stream
    async fn acquire_microphone(&self) -> CaptureResult<MediaStream>;

    /// Acquire a display stream (video plus optional system audio)
    async fn acquire_display(&self) -> CaptureResult<MediaStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(kind: TrackKind, origin: TrackOrigin) -> MediaTrack {
        MediaTrack::new(kind, origin, origin.to_string(), TrackInput::new("lavfi", "null"))
    }

    #[test]
    fn test_combine_keeps_display_tracks_and_mic_audio() {
        let display = MediaStream::new(vec![
            track(TrackKind::Video, TrackOrigin::Display),
            track(TrackKind::Audio, TrackOrigin::SystemAudio),
        ]);
        let stray_video = track(TrackKind::Video, TrackOrigin::Microphone);
        let microphone = MediaStream::new(vec![
            track(TrackKind::Audio, TrackOrigin::Microphone),
            stray_video.clone(),
        ]);

        let combined = MediaStream::combine(display, microphone);

        let origins: Vec<_> = combined.tracks().iter().map(|t| t.origin()).collect();
        assert_eq!(
            origins,
            vec![TrackOrigin::Display, TrackOrigin::SystemAudio, TrackOrigin::Microphone]
        );
        assert_eq!(combined.audio_tracks().count(), 2);
        assert_eq!(combined.video_tracks().count(), 1);
        assert!(!stray_video.is_live());
    }

    #[test]
    fn test_stop_is_shared_between_clones() {
        let original = track(TrackKind::Audio, TrackOrigin::Microphone);
        let stream = MediaStream::new(vec![original.clone()]);

        assert!(original.is_live());
        stream.stop_all();
        assert!(!original.is_live());

        // Second stop is a no-op
        stream.stop_all();
        assert!(!original.is_live());
    }
}
