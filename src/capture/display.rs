//! Display capture through FFmpeg's platform screen grabbers
//!
//! - Linux: `x11grab` on `$DISPLAY`, system audio from the PulseAudio monitor
//! - macOS: `avfoundation` main screen
//! - Windows: `gdigrab` desktop

use crate::capture::traits::{
    CaptureError, CaptureResult, MediaStream, MediaTrack, TrackInput, TrackKind, TrackOrigin,
};
use std::process::Stdio;

/// Display capture source
pub struct DisplaySource {
    capture_system_audio: bool,
}

impl DisplaySource {
    pub fn new(capture_system_audio: bool) -> Self {
        Self { capture_system_audio }
    }

    /// Hand out the screen track (and system audio where the platform has it)
    pub async fn acquire(&self) -> CaptureResult<MediaStream> {
        if !ffmpeg_available().await {
            return Err(CaptureError::Unsupported(
                "FFmpeg not found. Please install FFmpeg.".to_string(),
            ));
        }

        let tracks = platform_display_tracks(self.capture_system_audio)?;
        tracing::info!("Display acquired with {} track(s)", tracks.len());

        Ok(MediaStream::new(tracks))
    }
}

/// Check that the `ffmpeg` binary can be launched
pub async fn ffmpeg_available() -> bool {
    tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[allow(unused_variables)]
fn platform_display_tracks(capture_system_audio: bool) -> CaptureResult<Vec<MediaTrack>> {
    #[cfg(target_os = "linux")]
    {
        let display = std::env::var("DISPLAY").ok();
        x11_display_tracks(display.as_deref(), capture_system_audio)
    }

    #[cfg(target_os = "macos")]
    {
        if capture_system_audio {
            tracing::debug!("System audio is not captured on macOS, recording screen only");
        }
        Ok(vec![MediaTrack::new(
            TrackKind::Video,
            TrackOrigin::Display,
            "Capture screen 0",
            TrackInput::new("avfoundation", "Capture screen 0:none"),
        )])
    }

    #[cfg(target_os = "windows")]
    {
        if capture_system_audio {
            tracing::debug!("System audio is not captured on Windows, recording screen only");
        }
        Ok(vec![MediaTrack::new(
            TrackKind::Video,
            TrackOrigin::Display,
            "Desktop",
            TrackInput::new("gdigrab", "desktop"),
        )])
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Err(CaptureError::Unsupported(
            "Screen capture is not available on this platform".to_string(),
        ))
    }
}

#[cfg(target_os = "linux")]
fn x11_display_tracks(
    display: Option<&str>,
    capture_system_audio: bool,
) -> CaptureResult<Vec<MediaTrack>> {
    let display = display.filter(|d| !d.is_empty()).ok_or_else(|| {
        CaptureError::Unsupported("No X11 display available (DISPLAY is not set)".to_string())
    })?;

    let mut tracks = vec![MediaTrack::new(
        TrackKind::Video,
        TrackOrigin::Display,
        format!("Screen {}", display),
        TrackInput::new("x11grab", display),
    )];

    if capture_system_audio {
        tracks.push(MediaTrack::new(
            TrackKind::Audio,
            TrackOrigin::SystemAudio,
            "System audio",
            TrackInput::new("pulse", "@DEFAULT_MONITOR@"),
        ));
    }

    Ok(tracks)
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_display_is_unsupported() {
        assert!(matches!(
            x11_display_tracks(None, true),
            Err(CaptureError::Unsupported(_))
        ));
        assert!(matches!(
            x11_display_tracks(Some(""), false),
            Err(CaptureError::Unsupported(_))
        ));
    }

    #[test]
    fn test_x11_tracks_with_system_audio() {
        let tracks = x11_display_tracks(Some(":1"), true).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].kind(), TrackKind::Video);
        assert_eq!(tracks[0].input(), &TrackInput::new("x11grab", ":1"));
        assert_eq!(tracks[1].origin(), TrackOrigin::SystemAudio);
    }

    #[test]
    fn test_x11_tracks_without_system_audio() {
        let tracks = x11_display_tracks(Some(":0"), false).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].origin(), TrackOrigin::Display);
    }
}
