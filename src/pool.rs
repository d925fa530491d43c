//! Worker pool for dispatched continuations and background work.
//!
//! The pool is the injected "submit work" capability: the composition core
//! never owns a hidden process-wide pool. Callers construct a [`WorkerPool`]
//! explicitly, pass [`WorkerPoolHandle`]s into [`Exec::Dispatch`], and shut
//! the pool down when done.
//!
//! # Design
//!
//! - **Capacity**: configurable min/max threads; threads spawn lazily up to
//!   the max and retire after an idle timeout down to the min.
//! - **Queue**: lock-free FIFO ([`crossbeam_queue::SegQueue`]); workers park
//!   on a condvar when the queue is empty.
//! - **Cancellation**: cooperative. [`spawn`](WorkerPool::spawn) checks that
//!   its cell is still pending before running the closure; work already
//!   executing runs to completion and its settlement becomes a no-op.
//! - **Shutdown**: `shutdown()` stops intake (later submissions are
//!   rejected and report it), queued jobs drain, and `shutdown_and_wait`
//!   bounds the wait for workers to exit.
//!
//! [`Exec::Dispatch`]: crate::Exec::Dispatch

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_queue::SegQueue;
use parking_lot::{Condvar, Mutex};

use crate::cell::FutureCell;
use crate::error::catch_failure;
use crate::types::CancelReason;

/// Default idle timeout before retiring excess threads.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Configuration options for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolOptions {
    /// Idle timeout before retiring excess threads.
    pub idle_timeout: Duration,
    /// Thread name prefix.
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolOptions {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            thread_name_prefix: "futurecell".to_string(),
        }
    }
}

/// An explicitly owned pool of worker threads.
///
/// # Example
///
/// ```
/// use futurecell::WorkerPool;
///
/// let pool = WorkerPool::new(1, 4);
/// let cell = pool.spawn(|| 2 + 2);
/// assert_eq!(cell.wait().ok(), Some(4));
/// ```
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

/// A cloneable, shareable handle to a [`WorkerPool`].
#[derive(Clone)]
pub struct WorkerPoolHandle {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    /// Minimum number of threads to keep alive.
    min_threads: usize,
    /// Maximum number of threads allowed.
    max_threads: usize,
    /// Current number of live worker threads.
    active: AtomicUsize,
    /// Monotonic id source for worker thread names.
    next_worker_id: AtomicUsize,
    /// Number of threads currently executing a job.
    busy: AtomicUsize,
    /// Number of queued jobs.
    pending: AtomicUsize,
    /// Work queue.
    queue: SegQueue<Job>,
    /// Intake stops once set.
    shutdown: AtomicBool,
    /// Workers park here when the queue is empty.
    park: Condvar,
    park_lock: Mutex<()>,
    idle_timeout: Duration,
    thread_name_prefix: String,
    /// Join handles for cleanup at shutdown.
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Creates a pool with the given thread limits and default options.
    ///
    /// # Panics
    ///
    /// Panics if `max_threads` is 0.
    #[must_use]
    pub fn new(min_threads: usize, max_threads: usize) -> Self {
        Self::with_options(min_threads, max_threads, WorkerPoolOptions::default())
    }

    /// Creates a pool with custom options.
    ///
    /// `max_threads` is clamped up to `min_threads` when smaller.
    ///
    /// # Panics
    ///
    /// Panics if `max_threads` is 0.
    #[must_use]
    pub fn with_options(
        min_threads: usize,
        max_threads: usize,
        options: WorkerPoolOptions,
    ) -> Self {
        assert!(max_threads > 0, "max_threads must be at least 1");
        let max_threads = max_threads.max(min_threads);

        let inner = Arc::new(PoolInner {
            min_threads,
            max_threads,
            active: AtomicUsize::new(0),
            next_worker_id: AtomicUsize::new(0),
            busy: AtomicUsize::new(0),
            pending: AtomicUsize::new(0),
            queue: SegQueue::new(),
            shutdown: AtomicBool::new(false),
            park: Condvar::new(),
            park_lock: Mutex::new(()),
            idle_timeout: options.idle_timeout,
            thread_name_prefix: options.thread_name_prefix,
            threads: Mutex::new(Vec::with_capacity(max_threads)),
        });

        for _ in 0..min_threads {
            spawn_worker(&inner);
        }

        Self { inner }
    }

    /// Returns a cloneable handle to this pool.
    #[must_use]
    pub fn handle(&self) -> WorkerPoolHandle {
        WorkerPoolHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Submits a raw job, fire-and-forget.
    ///
    /// Returns `false` if the pool has shut down; a rejected job is
    /// dropped without running.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        submit_on(&self.inner, Box::new(job))
    }

    /// Runs a closure on the pool, producing a cell for its result.
    ///
    /// The closure's panic is caught and recorded as a computation failure.
    /// Cancelling the returned cell before a worker picks the job up skips
    /// the work entirely; cancelling later lets the work finish and
    /// discards its result. Spawning after shutdown yields a cell already
    /// cancelled with a shutdown reason.
    pub fn spawn<T, F>(&self, f: F) -> FutureCell<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        spawn_on(&self.inner, f)
    }

    /// Produces a cell that completes after `duration`.
    ///
    /// This is the sleep capability for composing timeouts and simulating
    /// latency; the wait occupies one worker thread.
    pub fn delay(&self, duration: Duration) -> FutureCell<()> {
        spawn_on(&self.inner, move || thread::sleep(duration))
    }

    /// Returns the number of queued jobs.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.inner.pending.load(Ordering::Relaxed)
    }

    /// Returns the number of live worker threads.
    #[must_use]
    pub fn active_threads(&self) -> usize {
        self.inner.active.load(Ordering::Relaxed)
    }

    /// Returns the number of threads currently executing a job.
    #[must_use]
    pub fn busy_threads(&self) -> usize {
        self.inner.busy.load(Ordering::Relaxed)
    }

    /// Returns `true` if the pool has been shut down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Stops intake. Already-queued jobs continue to execute.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        tracing::info!("worker pool shutting down");
        let _guard = self.inner.park_lock.lock();
        self.inner.park.notify_all();
    }

    /// Shuts down and waits for all workers to exit.
    ///
    /// Returns `true` if every worker exited before the timeout.
    pub fn shutdown_and_wait(&self, timeout: Duration) -> bool {
        self.shutdown();

        let deadline = std::time::Instant::now() + timeout;
        while self.inner.active.load(Ordering::Acquire) > 0 {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            {
                let _guard = self.inner.park_lock.lock();
                self.inner.park.notify_all();
            }
            thread::sleep(Duration::from_millis(10).min(remaining));
        }

        let mut threads = self.inner.threads.lock();
        for handle in threads.drain(..) {
            // Workers have already left their loops, join is immediate.
            let _ = handle.join();
        }
        true
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let _ = self.shutdown_and_wait(Duration::from_secs(5));
    }
}

impl WorkerPoolHandle {
    /// Submits a raw job, fire-and-forget.
    ///
    /// Returns `false` if the pool has shut down; a rejected job is
    /// dropped without running.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        submit_on(&self.inner, Box::new(job))
    }

    /// Runs a closure on the pool, producing a cell for its result.
    pub fn spawn<T, F>(&self, f: F) -> FutureCell<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        spawn_on(&self.inner, f)
    }

    /// Produces a cell that completes after `duration`.
    pub fn delay(&self, duration: Duration) -> FutureCell<()> {
        spawn_on(&self.inner, move || thread::sleep(duration))
    }

    /// Returns the number of queued jobs.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.inner.pending.load(Ordering::Relaxed)
    }

    /// Returns `true` if the pool has been shut down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("min_threads", &self.inner.min_threads)
            .field("max_threads", &self.inner.max_threads)
            .field("active", &self.inner.active.load(Ordering::Relaxed))
            .field("pending", &self.inner.pending.load(Ordering::Relaxed))
            .finish()
    }
}

impl std::fmt::Debug for WorkerPoolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPoolHandle")
            .field("active", &self.inner.active.load(Ordering::Relaxed))
            .field("pending", &self.inner.pending.load(Ordering::Relaxed))
            .finish()
    }
}

fn submit_on(inner: &Arc<PoolInner>, job: Job) -> bool {
    if inner.shutdown.load(Ordering::Acquire) {
        tracing::debug!("job rejected: pool is shut down");
        return false;
    }
    inner.queue.push(job);
    inner.pending.fetch_add(1, Ordering::Relaxed);
    maybe_spawn_worker(inner);
    let _guard = inner.park_lock.lock();
    inner.park.notify_one();
    true
}

fn spawn_on<T, F>(inner: &Arc<PoolInner>, f: F) -> FutureCell<T>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let cell = FutureCell::pending();
    let target = cell.clone();
    let accepted = submit_on(
        inner,
        Box::new(move || {
            // Cooperative cancellation: a cell cancelled while the job was
            // queued skips the work entirely.
            if !target.is_pending() {
                return;
            }
            match catch_failure(f) {
                Ok(value) => {
                    target.complete(value);
                }
                Err(failure) => {
                    target.fail(failure);
                }
            }
        }),
    );
    // A submission rejected at shutdown must still settle its cell.
    if !accepted {
        cell.cancel_with(CancelReason::shutdown());
    }
    cell
}

fn spawn_worker(inner: &Arc<PoolInner>) {
    let worker_inner = Arc::clone(inner);
    inner.active.fetch_add(1, Ordering::Relaxed);
    let id = inner.next_worker_id.fetch_add(1, Ordering::Relaxed);
    let name = format!("{}-worker-{}", inner.thread_name_prefix, id);

    let handle = thread::Builder::new()
        .name(name)
        .spawn(move || {
            tracing::debug!("worker thread started");
            worker_loop(&worker_inner);
            worker_inner.active.fetch_sub(1, Ordering::Relaxed);
            tracing::debug!("worker thread exiting");
        })
        .expect("failed to spawn worker thread");

    inner.threads.lock().push(handle);
}

fn maybe_spawn_worker(inner: &Arc<PoolInner>) {
    let active = inner.active.load(Ordering::Relaxed);
    let busy = inner.busy.load(Ordering::Relaxed);
    let pending = inner.pending.load(Ordering::Relaxed);

    // Grow when queued work exceeds idle capacity.
    if active < inner.max_threads && active.saturating_sub(busy) < pending {
        spawn_worker(inner);
    }
}

fn worker_loop(inner: &PoolInner) {
    loop {
        if let Some(job) = inner.queue.pop() {
            inner.pending.fetch_sub(1, Ordering::Relaxed);
            inner.busy.fetch_add(1, Ordering::Relaxed);
            // A panicking raw job must not take the worker down with it.
            if catch_failure(job).is_err() {
                tracing::error!("worker job panicked");
            }
            inner.busy.fetch_sub(1, Ordering::Relaxed);
            continue;
        }

        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }

        if inner.active.load(Ordering::Relaxed) > inner.min_threads {
            let mut guard = inner.park_lock.lock();
            if !inner.queue.is_empty() || inner.shutdown.load(Ordering::Acquire) {
                continue;
            }
            let timed_out = inner
                .park
                .wait_for(&mut guard, inner.idle_timeout)
                .timed_out();
            drop(guard);
            if timed_out
                && inner.queue.is_empty()
                && inner.active.load(Ordering::Relaxed) > inner.min_threads
            {
                // Retire this excess thread.
                break;
            }
        } else {
            let mut guard = inner.park_lock.lock();
            if !inner.queue.is_empty() || inner.shutdown.load(Ordering::Acquire) {
                continue;
            }
            inner.park.wait(&mut guard);
        }
    }
}
