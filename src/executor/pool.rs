//! The task pool: queue pair, dispatch cycle, and blocking drain.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use super::task::{CompletedTask, Task};
use super::worker::{Worker, WorkerState};
use crate::config::Config;
use crate::error::Result;
use crate::util::ActivitySignal;

/// Fixed pool of worker threads with explicit dispatch and harvest.
///
/// Submitted tasks queue up in FIFO order and are dispatched to idle
/// workers by [`dispatch_cycle`](TaskPool::dispatch_cycle), which runs on
/// whichever thread calls it (usually via [`poll`](TaskPool::poll)) -
/// there is no dedicated scheduler thread. Tasks dispatch in submission
/// order but complete in whatever order their durations dictate.
pub struct TaskPool {
    workers: Vec<WorkerHandle>,
    pending: Mutex<VecDeque<Task>>,
    completed: Mutex<VecDeque<CompletedTask>>,
    running: AtomicUsize,
    activity: Arc<ActivitySignal>,
    num_threads: usize,
}

struct WorkerHandle {
    worker: Worker,
    thread: Option<JoinHandle<()>>,
}

impl TaskPool {
    /// Validate the config and spawn the worker threads.
    ///
    /// Fails before any thread starts on a bad config, and on spawn failure.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let num_threads = config.worker_threads();
        let activity = Arc::new(ActivitySignal::new());

        let mut workers = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            let worker = Worker::new(id, activity.clone());
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let runner = worker.clone();
            let thread = builder.spawn(move || runner.run_loop())?;

            workers.push(WorkerHandle {
                worker,
                thread: Some(thread),
            });
        }

        tracing::info!(threads = num_threads, "task pool started");

        Ok(Self {
            workers,
            pending: Mutex::new(VecDeque::new()),
            completed: Mutex::new(VecDeque::new()),
            running: AtomicUsize::new(0),
            activity,
            num_threads,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Append a task to the pending queue.
    ///
    /// Never blocks; the task is picked up on the next dispatch cycle.
    pub fn submit(&self, task: Task) {
        tracing::debug!(task = %task.name(), "task queued");
        self.pending.lock().push_back(task);
    }

    /// One pass over all workers: harvest finished results into the
    /// completed queue, then hand queued tasks to idle workers.
    ///
    /// Each worker is examined once, against a single state snapshot; a
    /// worker freed by harvest in this pass receives new work on the next
    /// pass. An `Err` here means a worker state machine was driven through
    /// an invalid transition, which is fatal for the pool.
    pub fn dispatch_cycle(&self) -> Result<()> {
        for handle in &self.workers {
            let worker = &handle.worker;
            match worker.state() {
                WorkerState::ResultReady => {
                    let done = worker.harvest()?;
                    self.running.fetch_sub(1, Ordering::AcqRel);
                    tracing::debug!(
                        worker = worker.id(),
                        task = %done.name(),
                        seconds = done.duration().as_secs_f64(),
                        "task completed"
                    );
                    self.completed.lock().push_back(done);
                }
                WorkerState::Ready => {
                    let next = self.pending.lock().pop_front();
                    if let Some(task) = next {
                        tracing::debug!(worker = worker.id(), task = %task.name(), "task started");
                        worker.assign(task)?;
                        self.running.fetch_add(1, Ordering::AcqRel);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Run a dispatch cycle and report whether results are retrievable.
    ///
    /// Returns `Ok(true)` if the completed queue is non-empty, `Ok(false)`
    /// only at true exhaustion (nothing pending, running, or completed),
    /// and otherwise blocks on the activity signal until a worker finishes,
    /// dispatches again, and returns `Ok(true)`.
    pub fn poll(&self) -> Result<bool> {
        self.dispatch_cycle()?;

        if !self.completed.lock().is_empty() {
            return Ok(true);
        }

        if !self.has_outstanding_work() {
            return Ok(false);
        }

        self.activity.wait();
        self.dispatch_cycle()?;

        Ok(true)
    }

    /// Pop the oldest completed task, if any. Never blocks.
    pub fn take_completed(&self) -> Option<CompletedTask> {
        self.completed.lock().pop_front()
    }

    /// True while any submitted task has not yet been retrieved.
    pub fn has_outstanding_work(&self) -> bool {
        self.running.load(Ordering::Acquire) > 0
            || !self.pending.lock().is_empty()
            || !self.completed.lock().is_empty()
    }

    /// Dispose every worker and join its thread. Idempotent; no worker
    /// thread is alive once this returns. A worker mid-task finishes that
    /// task before observing the exit request.
    pub fn shutdown(&mut self) {
        if self.workers.iter().all(|h| h.thread.is_none()) {
            return;
        }

        for handle in &self.workers {
            handle.worker.dispose();
        }

        for handle in &mut self.workers {
            if let Some(thread) = handle.thread.take() {
                let _ = thread.join();
            }
        }

        tracing::info!("task pool shut down");
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("num_threads", &self.num_threads)
            .field("pending", &self.pending.lock().len())
            .field("running", &self.running.load(Ordering::Acquire))
            .field("completed", &self.completed.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::AtomicUsize;

    fn pool_with(n: usize) -> TaskPool {
        let config = Config::builder().num_threads(n).build().unwrap();
        TaskPool::new(&config).unwrap()
    }

    #[test]
    fn counts_settle_after_drain() {
        let pool = pool_with(2);
        let hits = Arc::new(AtomicUsize::new(0));

        for i in 0..8 {
            let hits = hits.clone();
            pool.submit(Task::new(format!("t{i}"), move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let mut retrieved = 0;
        while pool.poll().unwrap() {
            while pool.take_completed().is_some() {
                retrieved += 1;
            }
        }

        assert_eq!(retrieved, 8);
        assert_eq!(hits.load(Ordering::SeqCst), 8);
        assert_eq!(pool.running.load(Ordering::Acquire), 0);
        assert!(!pool.has_outstanding_work());
    }

    #[test]
    fn freed_worker_is_not_redispatched_in_the_same_pass() {
        let pool = pool_with(1);
        pool.submit(Task::new("first", || {}));
        pool.submit(Task::new("second", || {}));

        // Cycle 1 dispatches "first"; nothing to harvest yet.
        pool.dispatch_cycle().unwrap();
        assert_eq!(pool.pending.lock().len(), 1);

        // Wait for completion, then one cycle harvests "first" but leaves
        // "second" queued for the cycle after.
        pool.activity.wait();
        pool.dispatch_cycle().unwrap();
        assert_eq!(pool.completed.lock().len(), 1);
        assert_eq!(pool.pending.lock().len(), 1);

        pool.dispatch_cycle().unwrap();
        assert!(pool.pending.lock().is_empty());
    }

    #[test]
    fn illegal_harvest_leaves_the_completed_queue_intact() {
        let pool = pool_with(1);

        // Fault injection: harvest the idle worker directly.
        let err = pool.workers[0].worker.harvest().unwrap_err();
        assert!(matches!(err, Error::IllegalState { op: "harvest", .. }));
        assert!(pool.completed.lock().is_empty());

        // The pool still functions afterwards.
        pool.submit(Task::new("after", || {}));
        assert!(pool.poll().unwrap());
        assert_eq!(pool.take_completed().unwrap().name(), "after");
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut pool = pool_with(2);
        pool.shutdown();
        pool.shutdown();
        assert!(pool.workers.iter().all(|h| h.thread.is_none()));
    }
}
