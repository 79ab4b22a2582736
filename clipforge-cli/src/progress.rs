//! Terminal progress rendering.
//!
//! Wraps the core progress events in indicatif bars; the queue sink
//! implementation is what the batch loop forwards per-job updates to.

use clipforge_core::{JobId, JobStatus, ProgressEvent, QueueSink};
use indicatif::{ProgressBar, ProgressStyle};

/// A 0-100 bar carrying the core's status message.
pub fn encode_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

pub fn update_bar(bar: &ProgressBar, event: &ProgressEvent) {
    bar.set_position(event.percent as u64);
    bar.set_message(event.message.clone());
}

/// Queue sink rendering one shared bar plus a line per finished job.
pub struct BatchDisplay {
    bar: ProgressBar,
    total: usize,
}

impl BatchDisplay {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            bar: encode_bar(),
            total,
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl QueueSink for BatchDisplay {
    fn job_progress(&self, id: JobId, event: &ProgressEvent) {
        self.bar.set_position(event.percent as u64);
        self.bar
            .set_message(format!("job {id}/{}: {}", self.total, event.message));
    }

    fn job_status(&self, id: JobId, status: JobStatus) {
        if status.is_terminal() {
            self.bar.println(format!("job {id}: {status:?}"));
            self.bar.set_position(0);
        }
    }
}
