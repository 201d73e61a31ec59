//! Task execution infrastructure.
//!
//! This module provides the core primitives: tasks, worker threads with
//! their state machines, and the pool that owns both queues.

pub mod pool;
pub mod task;
pub mod worker;

pub use pool::TaskPool;
pub use task::{CompletedTask, Task, TaskId};
pub use worker::{WorkerId, WorkerState};
