//! Auto-reset wake-up primitive.

use parking_lot::{Condvar, Mutex};

/// Level-triggered, auto-resetting event.
///
/// Workers `raise` it when they finish a task; the consumer thread `wait`s
/// on it between dispatch cycles. A raise that lands before the wait is not
/// lost (the flag stays set until consumed), and multiple raises close
/// together may coalesce into one wake-up; the dispatch cycle tolerates
/// that by scanning every worker per pass.
pub struct ActivitySignal {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl ActivitySignal {
    pub fn new() -> Self {
        Self {
            raised: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Set the flag and wake one waiter.
    pub fn raise(&self) {
        let mut raised = self.raised.lock();
        *raised = true;
        self.condvar.notify_one();
    }

    /// Block until the flag is set, then clear it before returning.
    pub fn wait(&self) {
        let mut raised = self.raised.lock();
        while !*raised {
            self.condvar.wait(&mut raised);
        }
        *raised = false;
    }
}

impl Default for ActivitySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActivitySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivitySignal")
            .field("raised", &*self.raised.lock())
            .finish()
    }
}
