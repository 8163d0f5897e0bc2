//! Elapsed-time counter for an active recording

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Counts whole seconds while a recording runs.
///
/// The ticker task lives exactly as long as this value: dropping the timer
/// cancels it.
pub struct ElapsedTimer {
    seconds: Arc<AtomicU64>,
    ticker: JoinHandle<()>,
}

impl ElapsedTimer {
    /// Start counting from zero. The first tick lands one `period` from now.
    ///
    /// Must be called from within a tokio runtime. A zero period is raised
    /// to one millisecond.
    pub fn start(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let seconds = Arc::new(AtomicU64::new(0));
        let counter = seconds.clone();

        let ticker = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        Self { seconds, ticker }
    }

    /// Add one second
    pub fn tick(&self) {
        self.seconds.fetch_add(1, Ordering::SeqCst);
    }

    /// Seconds counted so far
    pub fn elapsed(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

/// Format seconds as `MM:SS`. Minutes keep growing past 59.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
