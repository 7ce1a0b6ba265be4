/*!
Cooperative cancellation and progress of long running work.

A [Monitor] is passed by reference through every analysis.
Analyses call [check_cancel](Monitor::check_cancel) between major iterations (once per candidate variable, clause, or eliminated variable) and propagate the resulting [Cancelled](ErrorKind::Cancelled) with `?`, so no partial result is committed.

Cancellation is requested through a [CancelHandle], which may be held by another thread.
A monitor also provides a terminate callback for a solver, so a cancelled monitor interrupts a solve in progress.

```rust
# use fm_sat::{monitor::Monitor, types::err::ErrorKind};
let mut monitor = Monitor::default();
let handle = monitor.cancel_handle();

assert!(monitor.check_cancel().is_ok());
handle.cancel();
assert_eq!(monitor.check_cancel(), Err(ErrorKind::Cancelled));
```
*/

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use crate::{solver::engine::CallbackTerminate, types::err::ErrorKind};

/// A handle to request cancellation of a monitor.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Progress counts, shared with any observer of a monitor.
#[derive(Debug, Default)]
pub struct Progress {
    pub total: AtomicUsize,
    pub worked: AtomicUsize,
}

#[derive(Clone, Debug, Default)]
pub struct Monitor {
    handle: CancelHandle,
    progress: Arc<Progress>,
    task: Option<String>,
}

impl Monitor {
    /// A monitor which is cancelled through `handle`.
    pub fn with_handle(handle: CancelHandle) -> Self {
        Monitor {
            handle,
            ..Default::default()
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    pub fn progress(&self) -> Arc<Progress> {
        self.progress.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Fails with [Cancelled](ErrorKind::Cancelled) if cancellation has been requested.
    pub fn check_cancel(&self) -> Result<(), ErrorKind> {
        match self.is_cancelled() {
            true => Err(ErrorKind::Cancelled),
            false => Ok(()),
        }
    }

    pub fn task(&self) -> Option<&str> {
        self.task.as_deref()
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.task = Some(task.into());
    }

    /// Sets the total work to `total`, and the work done to zero.
    pub fn set_remaining_work(&self, total: usize) {
        self.progress.total.store(total, Ordering::Relaxed);
        self.progress.worked.store(0, Ordering::Relaxed);
    }

    /// Records a unit of work, and checks for cancellation.
    pub fn step(&self) -> Result<(), ErrorKind> {
        self.progress.worked.fetch_add(1, Ordering::Relaxed);
        self.check_cancel()
    }

    pub fn worked(&self) -> usize {
        self.progress.worked.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.progress.total.load(Ordering::Relaxed)
    }

    /// A terminate callback for a solver, true once cancellation has been requested.
    pub fn terminate_callback(&self) -> Box<CallbackTerminate> {
        let handle = self.handle.clone();
        Box::new(move || handle.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress() {
        let monitor = Monitor::default();
        monitor.set_remaining_work(3);
        monitor.step().unwrap();
        monitor.step().unwrap();
        assert_eq!((monitor.worked(), monitor.total()), (2, 3));
    }

    #[test]
    fn callback_follows_handle() {
        let monitor = Monitor::default();
        let mut callback = monitor.terminate_callback();
        assert!(!callback());
        monitor.cancel_handle().cancel();
        assert!(callback());
        assert_eq!(monitor.step(), Err(ErrorKind::Cancelled));
    }

    #[test]
    fn clones_share_cancellation() {
        let monitor = Monitor::default();
        let clone = monitor.clone();
        clone.cancel();
        assert!(monitor.is_cancelled());
    }
}
