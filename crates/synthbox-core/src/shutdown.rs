use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative stop signal shared by the background loops.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

#[derive(Default)]
struct ShutdownInner {
    triggered: Mutex<bool>,
    cond: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        *triggered = true;
        self.inner.cond.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Sleeps for `timeout` unless shutdown fires first. Returns true once shutdown is triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            if self
                .inner
                .cond
                .wait_until(&mut triggered, deadline)
                .timed_out()
            {
                break;
            }
        }
        *triggered
    }
}
