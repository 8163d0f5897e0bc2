//! Media encoder interface
//!
//! The encoder turns a live `MediaStream` into container fragments. It pushes
//! fragments through a `FragmentSink` at boundaries it chooses and finishes
//! the sink once everything has been flushed.

use crate::capture::traits::{CaptureResult, MediaStream};
use crate::recorder::buffer::ChunkBuffer;
use crate::recorder::state::ContainerFormat;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Write end of a session's fragment channel
#[derive(Debug)]
pub struct FragmentSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl FragmentSink {
    /// Deliver a fragment. Returns `false` once nobody is collecting.
    pub fn push(&self, fragment: Vec<u8>) -> bool {
        self.tx.send(fragment).is_ok()
    }

    /// Signal that the final fragment has been delivered
    pub fn finish(self) {
        drop(self);
    }
}

/// Read end of a session's fragment channel
pub type FragmentReceiver = mpsc::UnboundedReceiver<Vec<u8>>;

/// Create the channel fragments flow through for one session
pub fn fragment_channel() -> (FragmentSink, FragmentReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FragmentSink { tx }, rx)
}

/// Drain fragments into a fresh buffer until the sink is finished
pub async fn collect_fragments(mut fragments: FragmentReceiver) -> ChunkBuffer {
    let mut buffer = ChunkBuffer::new();
    while let Some(fragment) = fragments.recv().await {
        buffer.push(fragment);
    }

    tracing::debug!(
        "Collected {} fragments ({} bytes)",
        buffer.len(),
        buffer.total_bytes()
    );
    buffer
}

/// Trait for media encoders
#[async_trait]
pub trait MediaEncoder: Send {
    /// Container format the encoder produces
    fn container(&self) -> ContainerFormat;

    /// Start encoding `stream`, delivering output through `sink`
    async fn start(&mut self, stream: &MediaStream, sink: FragmentSink) -> CaptureResult<()>;

    /// Flush remaining output and finish the sink.
    ///
    /// Implementations must release the sink on every path, including
    /// errors, or the session's collector never completes.
    async fn stop(&mut self) -> CaptureResult<()>;
}
