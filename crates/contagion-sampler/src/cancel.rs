use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Batch-level cancellation flag shared between the caller and running trials.
/// Trials that have not started when the flag is raised are skipped; trials
/// already running finish normally.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
