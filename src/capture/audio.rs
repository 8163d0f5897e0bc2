//! Cross-platform microphone acquisition using cpal
//!
//! cpal resolves and validates the input device; the encoder then opens the
//! same device through the platform's FFmpeg audio input.

use crate::capture::traits::{
    AudioDeviceInfo, CaptureError, CaptureResult, MediaStream, MediaTrack, TrackInput, TrackKind,
    TrackOrigin,
};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::Device;

/// Get list of available audio input devices
pub fn get_audio_input_devices() -> Vec<AudioDeviceInfo> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    if let Ok(input_devices) = host.input_devices() {
        for device in input_devices {
            if let Ok(name) = device.name() {
                let is_default = default_name.as_ref() == Some(&name);
                devices.push(AudioDeviceInfo {
                    id: name.clone(),
                    name,
                    is_input: true,
                    is_default,
                });
            }
        }
    }

    devices
}

/// Get the default audio input device
pub fn get_default_input_device() -> Option<Device> {
    cpal::default_host().default_input_device()
}

/// Get an audio input device by name
pub fn get_input_device_by_name(name: &str) -> Option<Device> {
    let host = cpal::default_host();
    host.input_devices()
        .ok()?
        .find(|device| device.name().map(|n| n == name).unwrap_or(false))
}

/// Microphone capture source
pub struct MicrophoneSource {
    device_id: Option<String>,
}

impl MicrophoneSource {
    /// Create a source for the named device, or the default input when `None`
    pub fn new(device_id: Option<String>) -> Self {
        Self { device_id }
    }

    /// Resolve the device and hand out a live audio track for it
    pub async fn acquire(&self) -> CaptureResult<MediaStream> {
        let device_id = self.device_id.clone();

        // Device lookup blocks on the audio host
        let resolved =
            tokio::task::spawn_blocking(move || resolve_input_device(device_id.as_deref()))
                .await
                .map_err(|e| {
                    CaptureError::Unsupported(format!("Audio device lookup failed: {}", e))
                })??;

        let input = microphone_input(&resolved)?;
        let track =
            MediaTrack::new(TrackKind::Audio, TrackOrigin::Microphone, resolved.name, input);

        Ok(MediaStream::new(vec![track]))
    }
}

/// An input device cpal resolved and opened
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedDevice {
    name: String,
    is_default: bool,
}

fn resolve_input_device(device_id: Option<&str>) -> CaptureResult<ResolvedDevice> {
    let default_name = get_default_input_device().and_then(|d| d.name().ok());

    let device = match device_id {
        Some(name) => get_input_device_by_name(name).ok_or_else(|| {
            CaptureError::DeviceNotFound(format!("Audio device '{}' not found", name))
        })?,
        None => get_default_input_device().ok_or_else(|| {
            CaptureError::DeviceNotFound("No default audio input device".to_string())
        })?,
    };

    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    // Opening the config fails when the OS refuses microphone access
    let config = device.default_input_config().map_err(|e| {
        CaptureError::PermissionDenied(format!("Cannot open microphone '{}': {}", name, e))
    })?;

    tracing::info!(
        "Microphone acquired: {} ({}Hz, {}ch)",
        name,
        config.sample_rate().0,
        config.channels()
    );

    let is_default = default_name.as_ref() == Some(&name);
    Ok(ResolvedDevice { name, is_default })
}

/// FFmpeg input that records the resolved microphone
///
/// Only Windows can address a named device; elsewhere FFmpeg records the
/// system default input, so any other device is refused.
fn microphone_input(device: &ResolvedDevice) -> CaptureResult<TrackInput> {
    #[cfg(target_os = "windows")]
    {
        Ok(TrackInput::new("dshow", format!("audio={}", device.name)))
    }

    #[cfg(any(target_os = "macos", target_os = "linux"))]
    {
        if !device.is_default {
            return Err(CaptureError::Unsupported(format!(
                "Recording from '{}' is not supported, only the default input can be recorded",
                device.name
            )));
        }

        #[cfg(target_os = "macos")]
        let input = TrackInput::new("avfoundation", ":default");

        // cpal's ALSA names don't map onto PulseAudio sources
        #[cfg(target_os = "linux")]
        let input = TrackInput::new("pulse", "default");

        Ok(input)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = device;
        Err(CaptureError::Unsupported(
            "Microphone capture is not available on this platform".to_string(),
        ))
    }
}
