//! Export module
//!
//! Saves finished recordings to disk.

pub mod save;

pub use save::{artifact_file_name, DirectorySaver, FileSaver, TransientFile};
