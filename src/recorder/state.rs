//! Recording state management
//!
//! Defines the recorder's phases, the state shown to the user and the
//! recorder configuration.

use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Banner shown when a recording could not be started
pub const START_FAILED_MESSAGE: &str =
    "Failed to start recording. Please ensure you have granted necessary permissions.";

/// Lifecycle phase of the recorder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderPhase {
    /// Nothing recorded yet
    #[default]
    Idle,
    /// Currently recording
    Recording,
    /// A recording has finished
    Stopped,
}

/// What the user sees. Exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum UiState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Recording { elapsed_seconds: u64 },
    #[serde(rename_all = "camelCase")]
    Stopped { has_artifact: bool },
    Error { message: String },
}

/// Container format of the saved recording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Webm,
}

impl ContainerFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Webm => "webm",
        }
    }

    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContainerFormat::Webm => "video/webm",
        }
    }
}

/// Configuration for the recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Directory downloads are saved into
    pub output_dir: PathBuf,

    /// Container format of the recording
    pub container: ContainerFormat,

    /// Whether to record system audio along with the display
    pub capture_system_audio: bool,

    /// Microphone device ID (default input when `None`)
    pub microphone_device_id: Option<String>,

    /// Screen capture frame rate
    pub frame_rate: u32,

    /// Largest fragment read from the encoder, in bytes
    pub fragment_size: usize,

    /// Elapsed-time tick period in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("recordings"),
            container: ContainerFormat::Webm,
            capture_system_audio: true,
            microphone_device_id: None,
            frame_rate: 30,
            fragment_size: 64 * 1024,
            tick_interval_ms: 1000,
        }
    }
}

impl RecorderConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecorderConfig = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded recorder config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.frame_rate == 0 {
            return Err(AppError::Config("frameRate must be at least 1".to_string()));
        }
        if self.fragment_size == 0 {
            return Err(AppError::Config("fragmentSize must be at least 1".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config("tickIntervalMs must be at least 1".to_string()));
        }
        Ok(())
    }
}
