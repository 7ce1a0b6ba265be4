/*!
Long running work on a worker thread.

A [LongRunningJob] runs a closure on a fresh thread with its own [Monitor], and sends the result over a [crossbeam] channel.
The caller may wait for the result (with or without a time limit) or cancel the job, in which case the closure sees [Cancelled](ErrorKind::Cancelled) at its next checkpoint.

```rust
# use fm_sat::job::LongRunningJob;
let job = LongRunningJob::spawn("sum", |monitor| {
    monitor.set_remaining_work(10);
    let mut sum = 0;
    for i in 0..10 {
        monitor.step()?;
        sum += i;
    }
    Ok(sum)
});
assert_eq!(job.join(), Ok(45));
```
*/

use std::{thread, time::Duration};

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError};

use crate::{
    misc::log::targets::{self},
    monitor::{CancelHandle, Monitor},
    types::err::{self, ErrorKind},
};

pub struct LongRunningJob<T> {
    name: String,
    receiver: Receiver<Result<T, ErrorKind>>,
    handle: Option<thread::JoinHandle<()>>,
    cancel: CancelHandle,
    monitor: Monitor,
}

impl<T: Send + 'static> LongRunningJob<T> {
    /// Runs `method` on a worker thread.
    pub fn spawn<F>(name: &str, method: F) -> Self
    where
        F: FnOnce(&mut Monitor) -> Result<T, ErrorKind> + Send + 'static,
    {
        let (transmitter, receiver) = bounded(1);
        let mut monitor = Monitor::default();
        monitor.set_task(name);
        let cancel = monitor.cancel_handle();
        let observer = monitor.clone();

        let job_name = name.to_string();
        let handle = thread::spawn(move || {
            log::debug!(target: targets::JOB, "Started {job_name}");
            let result = method(&mut monitor);
            log::debug!(target: targets::JOB, "Finished {job_name}: ok {}", result.is_ok());
            // The receiver may have been dropped, if the job was abandoned.
            let _ = transmitter.send(result);
        });

        LongRunningJob {
            name: name.to_string(),
            receiver,
            handle: Some(handle),
            cancel,
            monitor: observer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A clone of the monitor of the job, to observe progress.
    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn cancel(&self) {
        log::debug!(target: targets::JOB, "Cancel {}", self.name);
        self.cancel.cancel()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Waits for the result of the job.
    pub fn join(mut self) -> Result<T, ErrorKind> {
        match self.receiver.recv() {
            Ok(result) => {
                self.join_thread();
                result
            }
            Err(_) => Err(self.join_thread()),
        }
    }

    /// Waits at most `timeout` for the result of the job, None if the job is still running.
    pub fn join_timeout(&mut self, timeout: Duration) -> Option<Result<T, ErrorKind>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => {
                self.join_thread();
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.join_thread())),
        }
    }

    /// Joins the worker thread, returning the error to report if no result was sent.
    fn join_thread(&mut self) -> ErrorKind {
        match self.handle.take().map(|handle| handle.join()) {
            Some(Err(_)) => err::JobError::Panicked.into(),
            _ => err::JobError::Disconnected.into(),
        }
    }
}
