//! Chunk buffer and recording artifact

use crate::recorder::state::ContainerFormat;
use chrono::{DateTime, Utc};

/// Ordered, append-only store of recorded fragments for one session
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Vec<u8>>,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty fragments carry nothing and are dropped.
    pub fn push(&mut self, fragment: Vec<u8>) {
        if !fragment.is_empty() {
            self.chunks.push(fragment);
        }
    }

    /// Number of stored fragments
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total size of all fragments in bytes
    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Concatenate the fragments in the order they arrived
    pub fn assemble(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    /// Finish the session. Yields nothing when no data was recorded.
    pub fn into_artifact(self, container: ContainerFormat) -> Option<RecordingArtifact> {
        if self.is_empty() {
            return None;
        }

        Some(RecordingArtifact {
            data: self.assemble(),
            container,
            created_at: Utc::now(),
        })
    }
}

/// A finished recording, ready to be saved
#[derive(Debug, Clone)]
pub struct RecordingArtifact {
    data: Vec<u8>,
    container: ContainerFormat,
    created_at: DateTime<Utc>,
}

impl RecordingArtifact {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn container(&self) -> ContainerFormat {
        self.container
    }

    pub fn mime_type(&self) -> &'static str {
        self.container.mime_type()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
