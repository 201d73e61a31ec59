//! Worker threads and their 4-state lifecycle.
//!
//! Each worker owns one OS thread running a blocking loop: wait for an
//! assignment, execute it, park the result for harvest, notify the shared
//! activity signal, repeat. Only the pool's dispatch cycle drives the
//! `assign`/`harvest` transitions.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use super::task::{CompletedTask, Task};
use crate::error::{Error, Result};
use crate::util::ActivitySignal;

pub type WorkerId = usize;

/// Lifecycle state of a worker.
///
/// Legal transitions: `Ready -> Running` (assign), `Running -> ResultReady`
/// (job returned), `ResultReady -> Ready` (harvest), any state `-> Exit`
/// (dispose).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Ready,
    Running,
    ResultReady,
    Exit,
}

struct Slot {
    state: WorkerState,
    task: Option<Task>,
    finished: Option<CompletedTask>,
}

struct Shared {
    slot: Mutex<Slot>,
    assigned: Condvar,
    activity: Arc<ActivitySignal>,
}

#[derive(Clone)]
pub(crate) struct Worker {
    id: WorkerId,
    shared: Arc<Shared>,
}

impl Worker {
    pub fn new(id: WorkerId, activity: Arc<ActivitySignal>) -> Self {
        Self {
            id,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: WorkerState::Ready,
                    task: None,
                    finished: None,
                }),
                assigned: Condvar::new(),
                activity,
            }),
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.shared.slot.lock().state
    }

    /// Hand a task to an idle worker and wake its thread.
    pub fn assign(&self, task: Task) -> Result<()> {
        let mut slot = self.shared.slot.lock();
        match slot.state {
            WorkerState::Ready => {
                slot.task = Some(task);
                slot.state = WorkerState::Running;
                self.shared.assigned.notify_one();
                Ok(())
            }
            actual => {
                tracing::error!(worker = self.id, state = ?actual, "assign on a non-ready worker");
                Err(Error::illegal_state(self.id, "assign", actual))
            }
        }
    }

    /// Detach the finished record from a worker whose job has returned,
    /// freeing it for the next assignment.
    pub fn harvest(&self) -> Result<CompletedTask> {
        let mut slot = self.shared.slot.lock();
        match slot.state {
            WorkerState::ResultReady => match slot.finished.take() {
                Some(done) => {
                    slot.state = WorkerState::Ready;
                    Ok(done)
                }
                None => {
                    tracing::error!(worker = self.id, "result-ready worker has no finished record");
                    Err(Error::illegal_state(self.id, "harvest", WorkerState::ResultReady))
                }
            },
            actual => {
                tracing::error!(worker = self.id, state = ?actual, "harvest on a worker without a result");
                Err(Error::illegal_state(self.id, "harvest", actual))
            }
        }
    }

    /// Request termination. The thread observes `Exit` on its next wake-up;
    /// a job already executing runs to completion first.
    pub fn dispose(&self) {
        let mut slot = self.shared.slot.lock();
        slot.state = WorkerState::Exit;
        self.shared.assigned.notify_one();
    }

    /// Blocking loop executed on the worker's own thread.
    pub fn run_loop(&self) {
        loop {
            let task = {
                let mut slot = self.shared.slot.lock();
                loop {
                    match slot.state {
                        WorkerState::Exit => return,
                        WorkerState::Running => match slot.task.take() {
                            Some(task) => break task,
                            None => self.shared.assigned.wait(&mut slot),
                        },
                        _ => self.shared.assigned.wait(&mut slot),
                    }
                }
            };

            let Task { id, name, job } = task;

            // Run the job with the slot lock released; a panic must not
            // take the worker thread down with it.
            let started = Instant::now();
            let outcome = catch_unwind(AssertUnwindSafe(job));
            let duration = started.elapsed();

            if outcome.is_err() {
                tracing::error!(worker = self.id, task = %name, "task panicked");
            }

            let done = CompletedTask::new(id, name, duration, outcome.is_err());

            {
                let mut slot = self.shared.slot.lock();
                slot.finished = Some(done);
                // dispose() may have fired mid-run; Exit wins.
                if slot.state != WorkerState::Exit {
                    slot.state = WorkerState::ResultReady;
                }
            }

            self.shared.activity.raise();
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
