//! Worker pool running codec tasks off the submitting thread.
//!
//! Compression and decompression are blocking, CPU-bound calls, so they run
//! on a pool of plain OS threads fed by a shared channel; the submitting
//! thread is never blocked. Each task claims one worker for its whole
//! duration; there is no mid-operation yielding or hand-off.
//!
//! A submission moves an owned input buffer into the task, and the task
//! produces an independently owned output buffer, so no shared mutable
//! buffer ever crosses the thread boundary. The result travels back through
//! a one-shot channel: settled exactly once, success or failure, and
//! observable as a [`Submission`] future from whatever context the caller
//! runs in.
//!
//! There is no cancellation and no internal timeout: once submitted, a task
//! runs to completion. Dropping the pool only closes the queue; workers are
//! detached and drain what was already submitted, so every issued
//! [`Submission`] still settles.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use futures::channel::oneshot;

use crate::codec::{self, CompressionLevel};
use crate::error::{Error, Result};
use crate::sizing;

/// What a task does to its input buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operation {
    Compress { level: CompressionLevel },
    /// Capacity chosen by the sizing policy (header first, then growth).
    DecompressAuto,
    /// Caller-chosen capacity; no growth, short capacity fails.
    DecompressWithCapacity { capacity: usize },
}

/// One unit of codec work: an owned input, an operation, and the one-shot
/// sender that settles the caller's future. Created pending, runs to
/// completion on exactly one worker, settles exactly once, then is retired.
struct Task {
    input: Vec<u8>,
    op: Operation,
    reply: oneshot::Sender<Result<Vec<u8>>>,
}

/// Pool of worker threads executing codec tasks.
///
/// Distinct submissions are independent: they interleave freely across
/// workers, and the only guarantee is the 1:1 association between a
/// submission and its own [`Submission`] handle.
pub struct WorkerPool {
    submit_tx: Sender<Task>,
    threads: usize,
}

impl WorkerPool {
    /// Spawn a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let (submit_tx, task_rx) = unbounded::<Task>();
        for n in 0..threads {
            let rx = task_rx.clone();
            thread::Builder::new()
                .name(format!("baler-worker-{n}"))
                .spawn(move || {
                    // The queue closing is the shutdown signal.
                    for Task { input, op, reply } in rx.iter() {
                        // The caller may have dropped its handle; the result
                        // simply goes nowhere then.
                        let _ = reply.send(run(&input, op));
                    }
                })
                .expect("spawn codec worker thread");
        }
        Self { submit_tx, threads }
    }

    /// Pool sized to the number of logical CPUs.
    pub fn with_default_size() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Compress `data` on the pool.
    pub fn compress(&self, data: &[u8], level: CompressionLevel) -> Submission {
        self.submit(data.to_vec(), Operation::Compress { level })
    }

    /// Decompress `data` on the pool with automatic output sizing.
    pub fn decompress(&self, data: &[u8]) -> Submission {
        self.submit(data.to_vec(), Operation::DecompressAuto)
    }

    /// Decompress `data` into at most `capacity` bytes. A short capacity
    /// settles the future with [`Error::InsufficientBuffer`].
    pub fn decompress_with_capacity(&self, data: &[u8], capacity: usize) -> Submission {
        self.submit(data.to_vec(), Operation::DecompressWithCapacity { capacity })
    }

    pub(crate) fn submit(&self, input: Vec<u8>, op: Operation) -> Submission {
        let (reply, reply_rx) = oneshot::channel();
        let task = Task { input, op, reply };
        if let Err(refused) = self.submit_tx.send(task) {
            // All workers are gone; settle the future instead of hanging it.
            let Task { reply, .. } = refused.into_inner();
            let _ = reply.send(Err(Error::Pool("worker pool is shut down".into())));
        }
        Submission { reply_rx }
    }
}

fn run(input: &[u8], op: Operation) -> Result<Vec<u8>> {
    match op {
        Operation::Compress { level } => codec::compress(input, level),
        Operation::DecompressAuto => sizing::decompress_auto(input),
        Operation::DecompressWithCapacity { capacity } => codec::decompress(input, capacity),
    }
}

/// One-shot handle to the eventual result of a submitted task.
///
/// Await it from any async context, or call [`Submission::wait`] to block
/// the current thread. Either way it resolves exactly once, with the output
/// bytes or a structured [`Error`], never a partial result.
#[must_use = "a Submission does nothing until awaited or waited on"]
pub struct Submission {
    reply_rx: oneshot::Receiver<Result<Vec<u8>>>,
}

impl Submission {
    /// Block the calling thread until the task settles.
    pub fn wait(self) -> Result<Vec<u8>> {
        futures::executor::block_on(self)
    }
}

impl Future for Submission {
    type Output = Result<Vec<u8>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.reply_rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // The worker dropped the sender without replying.
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(Error::Pool(
                "task was abandoned before settling".into(),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}
