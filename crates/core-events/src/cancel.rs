//! Cooperative shutdown token shared across one pipeline's workers.

use std::sync::{Arc, Mutex, PoisonError};

/// Run/stop flag polled by every worker once per loop iteration.
///
/// The token is cloned into each worker at construction; all clones observe
/// the same flag. It is cooperative, not preemptive: a worker blocked inside
/// a capability call sees the change only when that call returns. Within one
/// pipeline run, `stop` is terminal — a worker that has observed `false`
/// must not move further pipeline messages. `start` exists for restart
/// scenarios where a fresh run reuses the token.
#[derive(Clone, Debug)]
pub struct CancelToken {
    running: Arc<Mutex<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            running: Arc::new(Mutex::new(true)),
        }
    }

    pub fn should_run(&self) -> bool {
        *self.lock()
    }

    pub fn stop(&self) {
        *self.lock() = false;
    }

    pub fn start(&self) {
        *self.lock() = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
