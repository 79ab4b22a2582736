//! Sequential batch job queue.
//!
//! Jobs run strictly one at a time in FIFO order; the queue enforces
//! single-flight by construction, not by locking around the encoder.
//! One job failing never stops the loop, and a second start request
//! while a loop is running is a no-op.

use crate::cancel::CancellationToken;
use crate::external::runner::RunStatus;
use crate::processing::JobRunner;
use crate::progress::ProgressEvent;
use crate::spec::EditSpec;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

pub type JobId = u64;

/// Lifecycle of one queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Error,
    Cancelled,
}

impl JobStatus {
    /// Whether the job reached a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }
}

/// One queued edit with its processing state. Created on enqueue,
/// mutated only by the queue's processing loop, retained until
/// explicitly cleared.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub spec: EditSpec,
    pub status: JobStatus,
    /// Last reported completion percentage.
    pub last_progress: f64,
    /// Last reported status line.
    pub message: String,
}

/// Receives per-job updates from the processing loop, keyed by job
/// identity. Implementations are invoked from the worker thread and
/// must be cheap; an absent sink simply drops the updates.
pub trait QueueSink: Send + Sync {
    fn job_progress(&self, id: JobId, event: &ProgressEvent) {
        let _ = (id, event);
    }
    fn job_status(&self, id: JobId, status: JobStatus) {
        let _ = (id, status);
    }
}

/// FIFO queue with at most one job processing at any time.
#[derive(Clone, Default)]
pub struct BatchQueue {
    jobs: Arc<Mutex<Vec<Job>>>,
    next_id: Arc<AtomicU64>,
    processing: Arc<AtomicBool>,
    current_cancel: Arc<Mutex<CancellationToken>>,
}

impl BatchQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a pending job and returns its id.
    pub fn enqueue(&self, spec: EditSpec) -> JobId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().push(Job {
            id,
            spec,
            status: JobStatus::Pending,
            last_progress: 0.0,
            message: String::new(),
        });
        log::debug!("Enqueued job {id}");
        id
    }

    /// Snapshot of the queue contents, in order.
    #[must_use]
    pub fn jobs(&self) -> Vec<Job> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Removes a job unless it is currently processing. Returns whether
    /// anything was removed.
    pub fn remove(&self, id: JobId) -> bool {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|job| job.id != id || job.status == JobStatus::Processing);
        jobs.len() != before
    }

    /// Drops all jobs in terminal states.
    pub fn clear_finished(&self) {
        self.lock().retain(|job| !job.status.is_terminal());
    }

    /// Requests cancellation of the job currently being processed. The
    /// loop marks it Cancelled and moves on to the next job.
    pub fn cancel_current(&self) {
        self.current_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Processes the queue on the calling thread until no pending jobs
    /// remain. Returns immediately if another loop is already running
    /// (idempotent start).
    pub fn process_all(&self, runner: &dyn JobRunner, sink: Option<&dyn QueueSink>) {
        if self.processing.swap(true, Ordering::SeqCst) {
            log::debug!("Batch loop already running, ignoring start request");
            return;
        }

        while let Some((id, spec)) = self.take_next() {
            let token = CancellationToken::new();
            *self
                .current_cancel
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = token.clone();

            self.set_status(id, JobStatus::Processing, sink);

            let mut on_progress = |event: ProgressEvent| {
                {
                    let mut jobs = self.lock();
                    if let Some(job) = jobs.iter_mut().find(|job| job.id == id) {
                        job.last_progress = event.percent;
                        job.message = event.message.clone();
                    }
                }
                if let Some(sink) = sink {
                    sink.job_progress(id, &event);
                }
            };

            let status = match runner.run(&spec, &mut on_progress, &token) {
                Ok(RunStatus::Succeeded) => JobStatus::Done,
                Ok(RunStatus::Cancelled) => JobStatus::Cancelled,
                Ok(RunStatus::Failed { .. }) => JobStatus::Error,
                Err(err) => {
                    // A single job's failure never halts the queue.
                    log::error!("Job {id} failed: {err}");
                    JobStatus::Error
                }
            };
            self.set_status(id, status, sink);
        }

        self.processing.store(false, Ordering::SeqCst);
    }

    /// Spawns the processing loop on a dedicated worker thread so the
    /// caller's thread never blocks on an encode. Returns `None` when a
    /// loop is already running.
    pub fn start(
        &self,
        runner: Arc<dyn JobRunner>,
        sink: Option<Arc<dyn QueueSink>>,
    ) -> Option<JoinHandle<()>> {
        if self.is_processing() {
            return None;
        }
        let queue = self.clone();
        Some(std::thread::spawn(move || {
            queue.process_all(runner.as_ref(), sink.as_deref());
        }))
    }

    fn take_next(&self) -> Option<(JobId, EditSpec)> {
        self.lock()
            .iter()
            .find(|job| job.status == JobStatus::Pending)
            .map(|job| (job.id, job.spec.clone()))
    }

    fn set_status(&self, id: JobId, status: JobStatus, sink: Option<&dyn QueueSink>) {
        {
            let mut jobs = self.lock();
            if let Some(job) = jobs.iter_mut().find(|job| job.id == id) {
                job.status = status;
                if status == JobStatus::Done {
                    job.last_progress = 100.0;
                }
            }
        }
        if let Some(sink) = sink {
            sink.job_status(id, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::error::{CoreError, CoreResult};

    /// Scripted runner: fails for inputs containing "missing", cancels
    /// for inputs containing "cancel", succeeds otherwise.
    struct ScriptedRunner;

    impl JobRunner for ScriptedRunner {
        fn run(
            &self,
            spec: &EditSpec,
            on_progress: &mut dyn FnMut(ProgressEvent),
            _cancel: &CancellationToken,
        ) -> CoreResult<RunStatus> {
            let name = spec.input.to_string_lossy().into_owned();
            if name.contains("missing") {
                return Err(CoreError::InputNotFound(spec.input.clone()));
            }
            if name.contains("cancel") {
                return Ok(RunStatus::Cancelled);
            }
            let mut event = ProgressEvent::starting();
            event.percent = 50.0;
            on_progress(event);
            Ok(RunStatus::Succeeded)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        statuses: Mutex<Vec<(JobId, JobStatus)>>,
        progress: Mutex<Vec<JobId>>,
    }

    impl QueueSink for RecordingSink {
        fn job_progress(&self, id: JobId, _event: &ProgressEvent) {
            self.progress.lock().unwrap().push(id);
        }
        fn job_status(&self, id: JobId, status: JobStatus) {
            self.statuses.lock().unwrap().push((id, status));
        }
    }

    fn statuses(queue: &BatchQueue) -> Vec<JobStatus> {
        queue.jobs().iter().map(|job| job.status).collect()
    }

    #[test]
    fn test_failure_in_the_middle_does_not_stop_the_loop() {
        let queue = BatchQueue::new();
        queue.enqueue(EditSpec::new("a.mp4"));
        queue.enqueue(EditSpec::new("missing.mp4"));
        queue.enqueue(EditSpec::new("c.mp4"));

        queue.process_all(&ScriptedRunner, None);

        assert_eq!(
            statuses(&queue),
            vec![JobStatus::Done, JobStatus::Error, JobStatus::Done]
        );
    }

    #[test]
    fn test_cancelled_job_is_not_an_error() {
        let queue = BatchQueue::new();
        queue.enqueue(EditSpec::new("cancel.mp4"));
        queue.enqueue(EditSpec::new("b.mp4"));
        queue.process_all(&ScriptedRunner, None);
        assert_eq!(
            statuses(&queue),
            vec![JobStatus::Cancelled, JobStatus::Done]
        );
    }

    #[test]
    fn test_fifo_order_preserved() {
        let queue = BatchQueue::new();
        let first = queue.enqueue(EditSpec::new("a.mp4"));
        let second = queue.enqueue(EditSpec::new("b.mp4"));
        assert!(first < second);

        let sink = RecordingSink::default();
        queue.process_all(&ScriptedRunner, Some(&sink));

        let recorded = sink.statuses.lock().unwrap();
        // Processing/terminal pairs arrive in enqueue order.
        assert_eq!(
            *recorded,
            vec![
                (first, JobStatus::Processing),
                (first, JobStatus::Done),
                (second, JobStatus::Processing),
                (second, JobStatus::Done),
            ]
        );
    }

    #[test]
    fn test_progress_forwarded_to_sink_and_job() {
        let queue = BatchQueue::new();
        let id = queue.enqueue(EditSpec::new("a.mp4"));
        let sink = RecordingSink::default();
        queue.process_all(&ScriptedRunner, Some(&sink));

        assert!(sink.progress.lock().unwrap().contains(&id));
        let jobs = queue.jobs();
        assert_eq!(jobs[0].last_progress, 100.0);
    }

    #[test]
    fn test_second_start_is_a_noop() {
        let queue = BatchQueue::new();
        queue.enqueue(EditSpec::new("a.mp4"));

        // Simulate a loop already running; process_all must bail out
        // without touching any job.
        queue.processing.store(true, Ordering::SeqCst);
        queue.process_all(&ScriptedRunner, None);
        assert_eq!(statuses(&queue), vec![JobStatus::Pending]);

        queue.processing.store(false, Ordering::SeqCst);
        queue.process_all(&ScriptedRunner, None);
        assert_eq!(statuses(&queue), vec![JobStatus::Done]);
    }

    #[test]
    fn test_done_jobs_are_skipped_on_reprocess() {
        let queue = BatchQueue::new();
        queue.enqueue(EditSpec::new("a.mp4"));
        queue.process_all(&ScriptedRunner, None);
        queue.enqueue(EditSpec::new("b.mp4"));
        queue.process_all(&ScriptedRunner, None);
        assert_eq!(statuses(&queue), vec![JobStatus::Done, JobStatus::Done]);
    }

    #[test]
    fn test_remove_and_clear_finished() {
        let queue = BatchQueue::new();
        let a = queue.enqueue(EditSpec::new("a.mp4"));
        let b = queue.enqueue(EditSpec::new("missing.mp4"));
        assert!(queue.remove(a));
        assert!(!queue.remove(a));
        assert_eq!(queue.len(), 1);

        queue.process_all(&ScriptedRunner, None);
        queue.clear_finished();
        assert!(queue.is_empty());
        let _ = b;
    }

    #[test]
    fn test_worker_thread_start_joins() {
        let queue = BatchQueue::new();
        queue.enqueue(EditSpec::new("a.mp4"));
        let handle = queue.start(Arc::new(ScriptedRunner), None).unwrap();
        handle.join().unwrap();
        assert_eq!(statuses(&queue), vec![JobStatus::Done]);
        assert!(!queue.is_processing());
    }
}
