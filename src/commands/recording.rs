//! Recording commands
//!
//! Handlers behind the recorder's buttons. Each returns `Result<_, String>`
//! so a host shell can forward them over IPC unchanged.

use crate::capture::audio::get_audio_input_devices;
use crate::capture::traits::AudioDeviceInfo;
use crate::recorder::state::{RecorderConfig, UiState};
use crate::recorder::timer::format_elapsed;
use crate::recorder::RecorderController;
use crate::utils::error::{AppError, AppResult, ErrorResponse};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state for recording
pub struct RecorderState {
    pub controller: Arc<Mutex<RecorderController>>,
}

impl RecorderState {
    pub fn new(controller: RecorderController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }

    /// Build the platform recorder from a JSON config file
    pub fn from_config_file(path: &Path) -> AppResult<Self> {
        let config = RecorderConfig::load(path)?;
        Ok(Self::new(RecorderController::from_config(config)))
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::new(RecorderController::from_config(RecorderConfig::default()))
    }
}

/// Snapshot of everything the recorder UI renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderView {
    pub state: UiState,
    /// Elapsed time as `MM:SS`
    pub timer: String,
    pub show_timer: bool,
    pub show_start: bool,
    pub show_stop: bool,
    pub show_download: bool,
    /// Error banner, if any
    pub error: Option<String>,
}

impl RecorderView {
    pub fn from_controller(controller: &RecorderController) -> Self {
        let recording = controller.is_recording();
        Self {
            state: controller.ui_state(),
            timer: format_elapsed(controller.elapsed_seconds()),
            show_timer: recording,
            show_start: !recording,
            show_stop: recording,
            show_download: !recording && controller.artifact().is_some(),
            error: controller.last_error().map(str::to_string),
        }
    }
}

/// Get list of available audio input devices (microphones)
pub async fn get_audio_devices() -> Result<Vec<AudioDeviceInfo>, String> {
    tokio::task::spawn_blocking(get_audio_input_devices)
        .await
        .map_err(|e| e.to_string())
}

/// Start recording. A refused capture shows up in the view's error banner.
///
/// The recorder stays locked until the platform answers the permission
/// request, which has no timeout. Other commands, `get_recorder_view`
/// included, wait behind it and then see the outcome.
pub async fn start_recording(state: &RecorderState) -> Result<RecorderView, String> {
    let mut controller = state.controller.lock().await;
    controller.start().await;
    Ok(RecorderView::from_controller(&controller))
}

/// Stop recording
pub async fn stop_recording(state: &RecorderState) -> Result<RecorderView, String> {
    let mut controller = state.controller.lock().await;
    controller.stop().await;
    Ok(RecorderView::from_controller(&controller))
}

/// Save the recording, returning the file path (`None` when there is nothing to save)
pub async fn download_recording(state: &RecorderState) -> Result<Option<String>, String> {
    let controller = state.controller.lock().await;
    let path = controller.download().map_err(|e| {
        let response = ErrorResponse::from(AppError::from(e));
        format!("{}: {}", response.code, response.message)
    })?;
    Ok(path.map(|p| p.to_string_lossy().to_string()))
}

/// Get the current recorder view
pub async fn get_recorder_view(state: &RecorderState) -> Result<RecorderView, String> {
    let controller = state.controller.lock().await;
    Ok(RecorderView::from_controller(&controller))
}
