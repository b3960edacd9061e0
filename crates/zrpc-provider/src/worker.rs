use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use zrpc_common::protocol::sink::panic_message;
use zrpc_common::{Result, RpcError};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads executing submitted closures.
///
/// Jobs are consumed FIFO from a shared queue. A panicking closure does not
/// take its worker down: the panic is caught and surfaced through the
/// [`TaskHandle`], and the worker returns to the queue. On shutdown the
/// queue is closed, every pending job runs to completion and the workers
/// are joined.
pub struct WorkerPool {
    queue: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with `threads` workers; `0` is coerced to one worker.
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let (queue, jobs) = unbounded::<Job>();
        let workers = (0..threads)
            .map(|id| {
                let jobs = jobs.clone();
                thread::spawn(move || worker_loop(id, jobs))
            })
            .collect();
        Self {
            queue: Some(queue),
            workers,
        }
    }

    /// Enqueues a closure, returning a handle to its eventual result.
    ///
    /// Fails with [`RpcError::Resource`] after [`WorkerPool::shutdown`].
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| RpcError::Resource("submit after worker pool shutdown".into()))?;

        let (done, result) = mpsc::channel();
        let job: Job = Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(task));
            // The handle may have been dropped; the job still ran.
            let _ = done.send(outcome);
        });
        queue
            .send(job)
            .map_err(|_| RpcError::Resource("worker queue is closed".into()))?;
        Ok(TaskHandle { result })
    }

    /// Closes the queue, drains all pending jobs and joins every worker.
    pub fn shutdown(&mut self) {
        // Dropping the sender closes the queue; workers keep consuming
        // until it is empty, then exit.
        self.queue.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, jobs: Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        job();
    }
    tracing::trace!(worker = id, "worker exiting");
}

/// Pending result of a submitted closure.
#[derive(Debug)]
pub struct TaskHandle<T> {
    result: mpsc::Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the closure has run, yielding its result.
    ///
    /// A panicked closure yields [`RpcError::Unknown`] carrying the panic
    /// message.
    pub fn wait(self) -> Result<T> {
        match self.result.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(RpcError::Unknown(panic_message(payload.as_ref()))),
            Err(_) => Err(RpcError::Resource("worker dropped the task".into())),
        }
    }

    /// Like [`TaskHandle::wait`] with an upper bound on the wait.
    pub fn wait_timeout(self, timeout: Duration) -> Result<T> {
        match self.result.recv_timeout(timeout) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(RpcError::Unknown(panic_message(payload.as_ref()))),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(RpcError::Timeout(timeout.as_millis() as u64))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(RpcError::Resource("worker dropped the task".into()))
            }
        }
    }
}
