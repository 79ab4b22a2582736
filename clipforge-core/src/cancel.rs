//! Cooperative cancellation primitive.
//!
//! Cancellation is poll-based: the runner checks the token between exit
//! polls, so a request takes effect within one polling interval plus
//! process-termination time, never instantaneously.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag handed to a running job.
///
/// Clones observe the same flag. A token is one-shot; a new run should
/// get a fresh token.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
