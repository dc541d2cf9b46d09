/// Single-task background worker with an observable in-flight flag.
///
/// Wraps one spawned computation and a channel join point. The owner polls
/// `in_flight()` each frame and adopts the result at the next frame boundary
/// via `try_join()` — there is no blocking on the frame path and no way to
/// launch a second overlapping computation through the same worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A background computation producing a single `T`.
pub struct BackgroundWorker<T> {
    receiver: mpsc::Receiver<T>,
    in_flight: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> BackgroundWorker<T> {
    /// Spawn `task` on a new thread.
    ///
    /// The in-flight flag is raised until the task's result is published
    /// to the join channel.
    pub fn spawn<F>(task: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let in_flight = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&in_flight);

        let handle = std::thread::spawn(move || {
            let result = task();
            // Publish before lowering the flag so a lowered flag always
            // means the result is observable.
            let _ = sender.send(result);
            flag.store(false, Ordering::Release);
        });

        Self {
            receiver,
            in_flight,
            handle: Some(handle),
        }
    }

    /// Whether the computation is still running
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Adopt the result if the computation has finished.
    ///
    /// Non-blocking. Returns None while still in flight, and also None if
    /// the worker thread died without producing a result (the death is
    /// absorbed here; the caller simply sees no update).
    pub fn try_join(&mut self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.reap();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.reap();
                self.in_flight.store(false, Ordering::Release);
                None
            }
        }
    }

    /// Block until the computation finishes and adopt its result.
    ///
    /// Returns None if the worker thread died without producing a result.
    pub fn join(mut self) -> Option<T> {
        let result = self.receiver.recv().ok();
        self.reap();
        result
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "background_worker_tests.rs"]
mod tests;
