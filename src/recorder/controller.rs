//! Recorder controller
//!
//! Drives the record/stop lifecycle: acquires capture streams, runs the
//! encoder, collects its fragments, counts elapsed time and saves the
//! finished recording on demand.

use crate::capture::traits::{CaptureError, CaptureSource, MediaStream};
use crate::capture::PlatformCapture;
use crate::export::save::{artifact_file_name, DirectorySaver, FileSaver};
use crate::recorder::buffer::{ChunkBuffer, RecordingArtifact};
use crate::recorder::encoder::{collect_fragments, fragment_channel, MediaEncoder};
use crate::recorder::ffmpeg::FfmpegEncoder;
use crate::recorder::state::{RecorderConfig, RecorderPhase, UiState, START_FAILED_MESSAGE};
use crate::recorder::timer::ElapsedTimer;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Errors from recorder operations
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Capture acquisition failed: {0}")]
    CaptureAcquisitionFailed(#[from] CaptureError),

    #[error("Failed to save recording: {0}")]
    Save(#[source] std::io::Error),
}

/// Result type for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Events emitted by the recorder
#[derive(Debug, Clone)]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// Recording stopped
    Stopped { has_artifact: bool },
    /// A recording could not be started
    Error(String),
    /// The recording was saved to a file
    Downloaded(PathBuf),
}

/// Everything that lives only while recording
struct ActiveSession {
    id: Uuid,
    stream: MediaStream,
    timer: ElapsedTimer,
    collector: JoinHandle<ChunkBuffer>,
}

/// Single-session screen recorder
pub struct RecorderController {
    config: RecorderConfig,
    capture: Box<dyn CaptureSource>,
    encoder: Box<dyn MediaEncoder>,
    saver: Box<dyn FileSaver>,
    phase: RecorderPhase,
    session: Option<ActiveSession>,
    artifact: Option<RecordingArtifact>,
    last_error: Option<String>,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecorderController {
    /// Create a controller over explicit capture, encoder and save backends
    pub fn new(
        config: RecorderConfig,
        capture: Box<dyn CaptureSource>,
        encoder: Box<dyn MediaEncoder>,
        saver: Box<dyn FileSaver>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            config,
            capture,
            encoder,
            saver,
            phase: RecorderPhase::Idle,
            session: None,
            artifact: None,
            last_error: None,
            event_tx,
        }
    }

    /// Create a controller using the host platform's capture, FFmpeg and
    /// the configured output directory
    pub fn from_config(config: RecorderConfig) -> Self {
        let capture = Box::new(PlatformCapture::new(&config));
        let encoder = Box::new(FfmpegEncoder::from_config(&config));
        let saver = Box::new(DirectorySaver::new(config.output_dir.clone()));
        Self::new(config, capture, encoder, saver)
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn phase(&self) -> RecorderPhase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Seconds elapsed in the current recording, 0 when not recording
    pub fn elapsed_seconds(&self) -> u64 {
        self.session.as_ref().map(|s| s.timer.elapsed()).unwrap_or(0)
    }

    /// The finished recording, if there is one
    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        self.artifact.as_ref()
    }

    /// Message of the last failed start, cleared by the next successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Subscribe to recorder events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    /// What the user should see right now
    pub fn ui_state(&self) -> UiState {
        match (self.phase, &self.last_error) {
            (RecorderPhase::Recording, _) => UiState::Recording {
                elapsed_seconds: self.elapsed_seconds(),
            },
            (_, Some(message)) => UiState::Error {
                message: message.clone(),
            },
            (RecorderPhase::Idle, None) => UiState::Idle,
            (RecorderPhase::Stopped, None) => UiState::Stopped {
                has_artifact: self.artifact.is_some(),
            },
        }
    }

    /// Start recording.
    ///
    /// Does nothing while already recording. A failure is logged and shown
    /// as the error banner; no tracks are left running and the phase is
    /// unchanged.
    pub async fn start(&mut self) {
        if self.is_recording() {
            tracing::debug!("Start requested while already recording, ignoring");
            return;
        }

        match self.open_session().await {
            Ok(session) => {
                tracing::info!(
                    "Recording {} started with {} track(s)",
                    session.id,
                    session.stream.tracks().len()
                );
                self.session = Some(session);
                self.artifact = None;
                self.last_error = None;
                self.phase = RecorderPhase::Recording;
                let _ = self.event_tx.send(RecordingEvent::Started);
            }
            Err(e) => {
                tracing::error!("Error starting recording: {}", e);
                self.last_error = Some(START_FAILED_MESSAGE.to_string());
                let _ = self
                    .event_tx
                    .send(RecordingEvent::Error(START_FAILED_MESSAGE.to_string()));
            }
        }
    }

    /// Acquire both streams and start the encoder, all or nothing
    async fn open_session(&mut self) -> RecorderResult<ActiveSession> {
        let microphone = self.capture.acquire_microphone().await?;

        let display = match self.capture.acquire_display().await {
            Ok(display) => display,
            Err(e) => {
                microphone.stop_all();
                return Err(e.into());
            }
        };

        let stream = MediaStream::combine(display, microphone);
        let (sink, fragments) = fragment_channel();

        if let Err(e) = self.encoder.start(&stream, sink).await {
            stream.stop_all();
            return Err(e.into());
        }

        Ok(ActiveSession {
            id: Uuid::new_v4(),
            stream,
            timer: ElapsedTimer::start(Duration::from_millis(self.config.tick_interval_ms)),
            collector: tokio::spawn(collect_fragments(fragments)),
        })
    }

    /// Stop recording and assemble the artifact. Does nothing unless recording.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            tracing::debug!("Stop requested while not recording, ignoring");
            return;
        };

        tracing::info!("Stopping recording {} at {}s", session.id, session.timer.elapsed());

        if let Err(e) = self.encoder.stop().await {
            tracing::warn!("Encoder did not stop cleanly: {}", e);
        }

        let ActiveSession {
            id,
            stream,
            timer,
            collector,
        } = session;
        drop(timer);

        let buffer = match collector.await {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::error!("Fragment collector for {} failed: {}", id, e);
                ChunkBuffer::new()
            }
        };

        stream.stop_all();

        self.artifact = buffer.into_artifact(self.encoder.container());
        self.phase = RecorderPhase::Stopped;

        let has_artifact = self.artifact.is_some();
        match &self.artifact {
            Some(artifact) => tracing::info!("Recording {} finished: {} bytes", id, artifact.len()),
            None => tracing::info!("Recording {} finished with no data", id),
        }
        let _ = self.event_tx.send(RecordingEvent::Stopped { has_artifact });
    }

    /// Advance the elapsed-time counter by one second while recording
    pub fn tick(&self) {
        if let Some(session) = &self.session {
            session.timer.tick();
        }
    }

    /// Save the finished recording as `Recording_<timestamp>.<ext>`.
    ///
    /// Returns `Ok(None)` when there is nothing to save. Can be repeated;
    /// every call writes a new file.
    pub fn download(&self) -> RecorderResult<Option<PathBuf>> {
        let Some(artifact) = &self.artifact else {
            tracing::debug!("Download requested with no recording available");
            return Ok(None);
        };

        let file_name = artifact_file_name(Utc::now(), artifact.container());
        let path = self
            .saver
            .save(artifact, &file_name)
            .map_err(RecorderError::Save)?;

        tracing::info!("Recording saved to {:?}", path);
        let _ = self.event_tx.send(RecordingEvent::Downloaded(path.clone()));
        Ok(Some(path))
    }
}

impl Drop for RecorderController {
    fn drop(&mut self) {
        // Timer and collector die with the session; tracks need an explicit stop
        if let Some(session) = self.session.take() {
            tracing::debug!("Recorder dropped while recording {}, releasing tracks", session.id);
            session.stream.stop_all();
            session.collector.abort();
        }
    }
}
