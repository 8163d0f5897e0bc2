//! Screen Recorder - capture your screen and microphone, save it as WebM.
//!
//! This is the main library crate. It provides the recorder controller,
//! the platform capture/record/save boundaries and the command handlers
//! a host shell binds its buttons to.

pub mod capture;
pub mod commands;
pub mod export;
pub mod recorder;
pub mod utils;

pub use recorder::{RecorderConfig, RecorderController, UiState};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init_logging() {
    let initialized = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screen_recorder_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Starting Screen Recorder v{}", env!("CARGO_PKG_VERSION"));
    }
}
