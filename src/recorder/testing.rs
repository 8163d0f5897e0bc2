//! Scripted capture and encoder backends for tests

use crate::capture::traits::{
    CaptureError, CaptureResult, CaptureSource, MediaStream, MediaTrack, TrackInput, TrackKind,
    TrackOrigin,
};
use crate::recorder::encoder::{FragmentSink, MediaEncoder};
use crate::recorder::state::ContainerFormat;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// How a scripted capture request resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Grant,
    Deny,
}

#[derive(Default)]
struct CaptureLog {
    issued: Mutex<Vec<MediaTrack>>,
    microphone_requests: AtomicUsize,
}

/// Capture source whose answers are decided by the test
#[derive(Clone)]
pub struct ScriptedCapture {
    microphone: Arc<Mutex<Outcome>>,
    display: Arc<Mutex<Outcome>>,
    microphone_gate: Arc<Mutex<Option<Arc<Notify>>>>,
    log: Arc<CaptureLog>,
}

impl ScriptedCapture {
    pub fn new(microphone: Outcome, display: Outcome) -> Self {
        Self {
            microphone: Arc::new(Mutex::new(microphone)),
            display: Arc::new(Mutex::new(display)),
            microphone_gate: Arc::new(Mutex::new(None)),
            log: Arc::new(CaptureLog::default()),
        }
    }

    pub fn granting() -> Self {
        Self::new(Outcome::Grant, Outcome::Grant)
    }

    pub fn set_display(&self, outcome: Outcome) {
        *self.display.lock() = outcome;
    }

    /// Keep microphone requests pending, like an unanswered permission
    /// prompt, until the returned handle is notified
    pub fn hold_microphone(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.microphone_gate.lock() = Some(gate.clone());
        gate
    }

    /// Every track handed out so far
    pub fn issued_tracks(&self) -> Vec<MediaTrack> {
        self.log.issued.lock().clone()
    }

    /// Number of microphone requests made
    pub fn acquisitions(&self) -> usize {
        self.log.microphone_requests.load(Ordering::SeqCst)
    }

    fn issue(&self, tracks: Vec<MediaTrack>) -> MediaStream {
        self.log.issued.lock().extend(tracks.iter().cloned());
        MediaStream::new(tracks)
    }
}

#[async_trait]
impl CaptureSource for ScriptedCapture {
    async fn acquire_microphone(&self) -> CaptureResult<MediaStream> {
        self.log.microphone_requests.fetch_add(1, Ordering::SeqCst);
        let gate = self.microphone_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match *self.microphone.lock() {
            Outcome::Grant => Ok(self.issue(vec![MediaTrack::new(
                TrackKind::Audio,
                TrackOrigin::Microphone,
                "Test microphone",
                TrackInput::new("lavfi", "anullsrc"),
            )])),
            Outcome::Deny => Err(CaptureError::PermissionDenied("microphone".to_string())),
        }
    }

    async fn acquire_display(&self) -> CaptureResult<MediaStream> {
        let outcome = *self.display.lock();
        match outcome {
            Outcome::Grant => Ok(self.issue(vec![
                MediaTrack::new(
                    TrackKind::Video,
                    TrackOrigin::Display,
                    "Test screen",
                    TrackInput::new("lavfi", "testsrc"),
                ),
                MediaTrack::new(
                    TrackKind::Audio,
                    TrackOrigin::SystemAudio,
                    "Test system audio",
                    TrackInput::new("lavfi", "anullsrc"),
                ),
            ])),
            Outcome::Deny => Err(CaptureError::Cancelled),
        }
    }
}

/// Pushes fragments into whatever session the scripted encoder is running
#[derive(Clone, Default)]
pub struct EncoderFeed {
    sink: Arc<Mutex<Option<FragmentSink>>>,
}

impl EncoderFeed {
    pub fn push(&self, fragment: Vec<u8>) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.push(fragment);
        }
    }
}

/// Encoder that emits test-provided fragments
pub struct ScriptedEncoder {
    feed: EncoderFeed,
    flush: Vec<Vec<u8>>,
    fail_start: bool,
    fail_stop: bool,
}

impl ScriptedEncoder {
    pub fn new() -> Self {
        Self::with_flush(Vec::new())
    }

    /// Emit `flush` as the final fragments of every session
    pub fn with_flush(flush: Vec<Vec<u8>>) -> Self {
        Self {
            feed: EncoderFeed::default(),
            flush,
            fail_start: false,
            fail_stop: false,
        }
    }

    /// Refuse to start, like a device the platform won't open
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::new()
        }
    }

    /// Flush and release the sink, then report that finalizing failed
    pub fn failing_stop(flush: Vec<Vec<u8>>) -> Self {
        Self {
            fail_stop: true,
            ..Self::with_flush(flush)
        }
    }

    pub fn feed(&self) -> EncoderFeed {
        self.feed.clone()
    }
}

#[async_trait]
impl MediaEncoder for ScriptedEncoder {
    fn container(&self) -> ContainerFormat {
        ContainerFormat::Webm
    }

    async fn start(&mut self, _stream: &MediaStream, sink: FragmentSink) -> CaptureResult<()> {
        if self.fail_start {
            return Err(CaptureError::PermissionDenied(
                "encoder refused the devices".to_string(),
            ));
        }
        *self.feed.sink.lock() = Some(sink);
        Ok(())
    }

    async fn stop(&mut self) -> CaptureResult<()> {
        if let Some(sink) = self.feed.sink.lock().take() {
            for fragment in &self.flush {
                sink.push(fragment.clone());
            }
            sink.finish();
        }
        if self.fail_stop {
            return Err(CaptureError::Encoder("ffmpeg exited with status 1".to_string()));
        }
        Ok(())
    }
}
