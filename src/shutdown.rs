use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Cloneable stop signal for the sync loop. Every clone observes the same
/// flag; waiters are woken as soon as it is triggered.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (lock, condvar) = &*self.state;
        let mut triggered = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *triggered = true;
        condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        let (lock, _) = &*self.state;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`. Returns `true` if shutdown was triggered
    /// before or during the wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, condvar) = &*self.state;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (triggered, _) = condvar
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
            .unwrap_or_else(PoisonError::into_inner);
        *triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_times_out_when_not_triggered() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.wait_timeout(Duration::from_millis(10)));
        assert!(!shutdown.is_triggered());
    }

    #[test]
    fn test_trigger_wakes_waiter_early() {
        let shutdown = Shutdown::new();
        let remote = shutdown.clone();

        let waiter = thread::spawn(move || {
            let start = Instant::now();
            let triggered = remote.wait_timeout(Duration::from_secs(30));
            (triggered, start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        shutdown.trigger();

        let (triggered, waited) = waiter.join().unwrap();
        assert!(triggered);
        assert!(waited < Duration::from_secs(30));
    }

    #[test]
    fn test_already_triggered_returns_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        assert!(shutdown.wait_timeout(Duration::from_secs(30)));
    }
}
