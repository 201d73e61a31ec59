use crate::executor::worker::WorkerState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The dispatch cycle drove a worker's state machine through an invalid
    /// transition. This is a contract violation inside the pool, not a
    /// recoverable runtime condition; the worker is left untouched.
    #[error("worker {worker}: {op} called while {actual:?}")]
    IllegalState {
        worker: usize,
        op: &'static str,
        actual: WorkerState,
    },
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn illegal_state(worker: usize, op: &'static str, actual: WorkerState) -> Self {
        Error::IllegalState { worker, op, actual }
    }
}
