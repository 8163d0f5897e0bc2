//! FFmpeg-backed media encoder
//!
//! Opens every live track as an FFmpeg input device, muxes them into WebM
//! (VP8 + Opus) on stdout and forwards stdout reads as fragments.

use crate::capture::traits::{CaptureError, CaptureResult, MediaStream, MediaTrack, TrackKind};
use crate::recorder::encoder::{FragmentSink, MediaEncoder};
use crate::recorder::state::{ContainerFormat, RecorderConfig};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

/// How long FFmpeg gets to open its inputs before we consider it running
const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// How long FFmpeg gets to flush and exit after being asked to stop
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// WebM encoder driving an `ffmpeg` child process
pub struct FfmpegEncoder {
    frame_rate: u32,
    fragment_size: usize,
    process: Option<Child>,
    reader: Option<JoinHandle<()>>,
}

impl FfmpegEncoder {
    pub fn new(frame_rate: u32, fragment_size: usize) -> Self {
        Self {
            frame_rate,
            fragment_size: fragment_size.max(1),
            process: None,
            reader: None,
        }
    }

    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.frame_rate, config.fragment_size)
    }

    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }
}

/// Build the FFmpeg command line recording `tracks` as WebM on stdout
pub fn build_args(tracks: &[MediaTrack], frame_rate: u32) -> Vec<String> {
    let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error"].map(String::from).to_vec();

    for track in tracks {
        args.extend(["-thread_queue_size", "512"].map(String::from));
        if track.kind() == TrackKind::Video {
            args.push("-framerate".to_string());
            args.push(frame_rate.to_string());
        }
        args.push("-f".to_string());
        args.push(track.input().format.clone());
        args.push("-i".to_string());
        args.push(track.input().target.clone());
    }

    // One stream per input, kept as separate tracks
    for index in 0..tracks.len() {
        args.push("-map".to_string());
        args.push(index.to_string());
    }

    if tracks.iter().any(|t| t.kind() == TrackKind::Video) {
        args.extend(
            ["-c:v", "libvpx", "-deadline", "realtime", "-cpu-used", "8", "-b:v", "2M"]
                .map(String::from),
        );
    }
    if tracks.iter().any(|t| t.kind() == TrackKind::Audio) {
        args.extend(["-c:a", "libopus", "-b:a", "128k"].map(String::from));
    }

    args.extend(["-f", "webm", "-"].map(String::from));
    args
}

async fn pump_fragments(mut stdout: ChildStdout, sink: FragmentSink, fragment_size: usize) {
    let mut buf = vec![0u8; fragment_size];
    let mut count: u64 = 0;

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if !sink.push(buf[..n].to_vec()) {
                    tracing::debug!("Fragment collector went away, dropping encoder output");
                    break;
                }
                count += 1;
            }
            Err(e) => {
                tracing::error!("Failed to read encoder output: {}", e);
                break;
            }
        }
    }

    tracing::debug!("Encoder output closed after {} fragments", count);
    sink.finish();
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::warn!("ffmpeg: {}", line);
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    fn container(&self) -> ContainerFormat {
        ContainerFormat::Webm
    }

    async fn start(&mut self, stream: &MediaStream, sink: FragmentSink) -> CaptureResult<()> {
        if self.process.is_some() {
            return Err(CaptureError::Encoder("Encoder is already running".to_string()));
        }

        let tracks: Vec<MediaTrack> = stream
            .tracks()
            .iter()
            .filter(|t| t.is_live())
            .cloned()
            .collect();
        if tracks.is_empty() {
            return Err(CaptureError::Encoder("No live tracks to record".to_string()));
        }

        let args = build_args(&tracks, self.frame_rate);
        tracing::info!("Starting FFmpeg encoder with {} input(s)", tracks.len());
        tracing::debug!("ffmpeg {}", args.join(" "));

        let mut process = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::Encoder(format!("Failed to start FFmpeg: {}", e)))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Encoder("Failed to capture FFmpeg stdout".to_string()))?;
        if let Some(stderr) = process.stderr.take() {
            tokio::spawn(log_stderr(stderr));
        }

        let reader = tokio::spawn(pump_fragments(stdout, sink, self.fragment_size));

        // A refused device shows up as FFmpeg exiting right away
        tokio::time::sleep(STARTUP_GRACE).await;
        if let Some(status) = process.try_wait()? {
            reader.abort();
            return Err(CaptureError::PermissionDenied(format!(
                "FFmpeg could not open the capture devices ({})",
                status
            )));
        }

        self.process = Some(process);
        self.reader = Some(reader);

        tracing::info!("FFmpeg encoder started");
        Ok(())
    }

    async fn stop(&mut self) -> CaptureResult<()> {
        let Some(mut process) = self.process.take() else {
            return Ok(());
        };

        // 'q' asks FFmpeg to finalize the container and exit
        if let Some(mut stdin) = process.stdin.take() {
            if let Err(e) = stdin.write_all(b"q").await {
                tracing::warn!("Failed to signal FFmpeg to stop: {}", e);
            }
        }

        let result = match tokio::time::timeout(STOP_TIMEOUT, process.wait()).await {
            Ok(Ok(status)) => {
                if !status.success() {
                    tracing::warn!("FFmpeg exited with {}", status);
                }
                Ok(())
            }
            Ok(Err(e)) => Err(CaptureError::Io(e)),
            Err(_) => {
                tracing::warn!("FFmpeg did not exit in time, killing it");
                if let Err(e) = process.kill().await {
                    tracing::error!("Failed to kill FFmpeg: {}", e);
                }
                Err(CaptureError::Encoder("FFmpeg did not finish in time".to_string()))
            }
        };

        if let Some(mut reader) = self.reader.take() {
            if tokio::time::timeout(STOP_TIMEOUT, &mut reader).await.is_err() {
                tracing::warn!("Encoder output did not close, abandoning remaining data");
                reader.abort();
            }
        }

        tracing::info!("FFmpeg encoder stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::traits::{TrackInput, TrackOrigin};

    fn track(kind: TrackKind, origin: TrackOrigin, format: &str, target: &str) -> MediaTrack {
        MediaTrack::new(kind, origin, target, TrackInput::new(format, target))
    }

    #[test]
    fn test_args_for_screen_and_microphone() {
        let tracks = vec![
            track(TrackKind::Video, TrackOrigin::Display, "x11grab", ":0"),
            track(TrackKind::Audio, TrackOrigin::Microphone, "pulse", "default"),
        ];

        let args = build_args(&tracks, 30).join(" ");

        assert!(args.contains("-framerate 30 -f x11grab -i :0"));
        assert!(args.contains("-thread_queue_size 512 -f pulse -i default"));
        assert!(args.contains("-map 0 -map 1"));
        assert!(args.contains("-c:v libvpx"));
        assert!(args.contains("-c:a libopus"));
        assert!(args.ends_with("-f webm -"));
    }

    #[test]
    fn test_audio_only_has_no_video_codec() {
        let tracks = vec![track(TrackKind::Audio, TrackOrigin::Microphone, "pulse", "default")];

        let args = build_args(&tracks, 30);

        assert!(!args.iter().any(|a| a == "-c:v"));
        assert!(!args.iter().any(|a| a == "-framerate"));
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut encoder = FfmpegEncoder::new(30, 1024);
        assert!(!encoder.is_running());
        assert!(encoder.stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_start_rejects_stream_without_live_tracks() {
        let mut encoder = FfmpegEncoder::new(30, 1024);
        let display = track(TrackKind::Video, TrackOrigin::Display, "x11grab", ":0");
        display.stop();
        let (sink, _fragments) = crate::recorder::encoder::fragment_channel();

        let result = encoder.start(&MediaStream::new(vec![display]), sink).await;

        assert!(matches!(result, Err(CaptureError::Encoder(_))));
        assert!(!encoder.is_running());
    }
}
