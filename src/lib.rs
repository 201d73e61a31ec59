//! FOREMAN - bounded worker pool with explicit dispatch and harvest.
//!
//! A fixed crew of worker threads accepts named units of work, runs at most
//! one task per worker at a time, and lets a single consumer drain completed
//! results either non-blocking or by waiting for the next completion.
//!
//! # Quick Start
//!
//! ```no_run
//! use foreman::{Config, Task, TaskPool};
//!
//! let config = Config::builder().num_threads(2).build().unwrap();
//! let mut pool = TaskPool::new(&config).unwrap();
//!
//! pool.submit(Task::new("greet", || println!("hello from the pool")));
//!
//! while pool.poll().unwrap() {
//!     while let Some(done) = pool.take_completed() {
//!         println!("{} finished in {:?}", done.name(), done.duration());
//!     }
//! }
//!
//! pool.shutdown();
//! ```
//!
//! # Design
//!
//! - **Single-owner handoff**: a task is moved, never shared - submitter to
//!   pending queue, pending queue to exactly one worker, worker to completed
//!   queue, completed queue to consumer.
//! - **No scheduler thread**: the dispatch cycle runs on whichever thread
//!   calls [`TaskPool::poll`] or [`TaskPool::dispatch_cycle`].
//! - **FIFO dispatch, unordered completion**: tasks reach idle workers in
//!   submission order, but finish in whatever order their durations allow.
//! - **No work stealing, priorities, or cancellation**: once dispatched, a
//!   task runs to completion on its worker.

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod util;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{CompletedTask, Task, TaskId, TaskPool, WorkerState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn smoke_submit_and_drain() {
        let config = Config::builder().num_threads(2).build().unwrap();
        let pool = TaskPool::new(&config).unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        for i in 0..4 {
            let counter = counter.clone();
            pool.submit(Task::new(format!("job-{i}"), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let mut drained = 0;
        while pool.poll().unwrap() {
            while pool.take_completed().is_some() {
                drained += 1;
            }
        }

        assert_eq!(drained, 4);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn smoke_default_config() {
        let pool = TaskPool::new(&Config::default()).unwrap();
        assert!(pool.num_threads() >= 1);
    }
}
