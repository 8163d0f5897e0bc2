//! Recording system module
//!
//! This module implements the single-session recorder:
//! - MediaEncoder trait for the platform encoder, with an FFmpeg backend
//! - ChunkBuffer collecting encoder fragments into a RecordingArtifact
//! - ElapsedTimer counting recording seconds
//! - RecorderController driving start/stop/download

pub mod buffer;
pub mod controller;
pub mod encoder;
pub mod ffmpeg;
pub mod state;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::{ChunkBuffer, RecordingArtifact};
pub use controller::{RecorderController, RecorderError, RecorderResult, RecordingEvent};
pub use encoder::{FragmentSink, MediaEncoder};
pub use ffmpeg::FfmpegEncoder;
pub use state::{ContainerFormat, RecorderConfig, RecorderPhase, UiState, START_FAILED_MESSAGE};
pub use timer::{format_elapsed, ElapsedTimer};
