//! File-save boundary
//!
//! A recording is written to a transient file next to its destination, then
//! persisted under the suggested name in one rename. If anything fails along
//! the way the transient file is removed when it goes out of scope.

use crate::recorder::buffer::RecordingArtifact;
use crate::recorder::state::ContainerFormat;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Build `Recording_<timestamp>.<ext>` with ':' and '.' in the ISO-8601
/// timestamp replaced by '-'
pub fn artifact_file_name(now: DateTime<Utc>, container: ContainerFormat) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("Recording_{}.{}", timestamp, container.extension())
}

/// A recording materialized on disk for a single save
pub struct TransientFile {
    file: NamedTempFile,
}

impl TransientFile {
    /// Write `data` to a fresh hidden file in `dir`
    pub fn materialize_in(dir: &Path, data: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(".recording-")
            .suffix(".part")
            .tempfile_in(dir)?;
        file.write_all(data)?;
        file.as_file().sync_all()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Move the file to `target`, consuming the handle
    pub fn persist(self, target: &Path) -> io::Result<PathBuf> {
        self.file.persist(target).map_err(|e| e.error)?;
        Ok(target.to_path_buf())
    }
}

/// Destination for finished recordings
pub trait FileSaver: Send + Sync {
    /// Save `artifact` under `file_name`, returning where it ended up
    fn save(&self, artifact: &RecordingArtifact, file_name: &str) -> io::Result<PathBuf>;
}

/// Saves recordings into a directory, creating it on demand
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, artifact: &RecordingArtifact, file_name: &str) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let transient = TransientFile::materialize_in(&self.dir, artifact.data())?;
        tracing::debug!(
            "Materialized {} bytes of {} at {:?}",
            artifact.len(),
            artifact.mime_type(),
            transient.path()
        );

        transient.persist(&self.dir.join(file_name))
    }
}
