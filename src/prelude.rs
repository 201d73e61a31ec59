pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{CompletedTask, Task, TaskId, TaskPool, WorkerState};
