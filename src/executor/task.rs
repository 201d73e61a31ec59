//! Task representation and the record handed back after execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A named unit of work.
///
/// The pool never interprets what the job does; output and errors travel
/// through whatever the closure captured (a channel, an `Arc<Mutex<_>>`).
/// Ownership is single-owner throughout: submitter, pending queue, one
/// worker, then the completed queue as a [`CompletedTask`].
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) job: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    pub fn new<N, F>(name: N, job: F) -> Self
    where
        N: Into<String>,
        F: FnOnce() + Send + 'static,
    {
        Task {
            id: TaskId::next(),
            name: name.into(),
            job: Box::new(job),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// The post-run identity of a [`Task`], as retrieved by the consumer.
#[derive(Debug, Clone)]
pub struct CompletedTask {
    id: TaskId,
    name: String,
    duration: Duration,
    panicked: bool,
}

impl CompletedTask {
    pub(crate) fn new(id: TaskId, name: String, duration: Duration, panicked: bool) -> Self {
        Self {
            id,
            name,
            duration,
            panicked,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wall-clock time the job spent executing on its worker.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True if the job panicked. Any other failure mode is the task's own
    /// business and invisible here.
    pub fn panicked(&self) -> bool {
        self.panicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_are_unique() {
        let a = Task::new("a", || {});
        let b = Task::new("b", || {});
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn task_exposes_name() {
        let task = Task::new("build-tile", || {});
        assert_eq!(task.name(), "build-tile");
    }
}
