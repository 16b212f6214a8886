//! Background execution for asynchronous refresh and event delivery.
//!
//! # Worker model
//!
//! A [`Refresher`] owns a single background thread draining a bounded job
//! queue. Nodes configured with [`AsyncMode::Async`] submit their recompute
//! or notification work through a cloneable [`RefresherHandle`] instead of
//! running it on the calling thread. The queue is bounded so a stalled
//! worker surfaces as [`RefresherError::QueueFull`] at the submitter rather
//! than as unbounded memory growth; nodes respond to a failed submission by
//! running the work synchronously, which preserves correctness in every
//! mode.
//!
//! Jobs run to completion in submission order. A job that panics stops the
//! worker; later submissions then fail and fall back to the caller's thread.
//!
//! # Shutdown
//!
//! Dropping the `Refresher` signals the worker, runs any jobs it had already
//! accepted, and joins the thread. Nothing accepted is silently dropped.
//! Submissions racing with shutdown fail with [`RefresherError::ShutDown`].
//!
//! # Configuration
//!
//! The queue capacity defaults to [`DEFAULT_QUEUE_CAPACITY`] and can be
//! overridden with the `VELA_LIVE_REFRESH_QUEUE_CAPACITY` environment
//! variable. A blank or `0` value selects the default; an unparsable value
//! fails construction with [`std::io::ErrorKind::InvalidInput`]; oversized
//! values are clamped.

use std::io;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

/// Where a node runs its recompute and its listener notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AsyncMode {
    /// On whichever thread triggered the refresh or observed the change.
    #[default]
    Sync,
    /// On the refresher's worker thread.
    Async,
}

/// Environment variable overriding the worker queue capacity.
pub const REFRESH_QUEUE_CAPACITY_ENV: &str = "VELA_LIVE_REFRESH_QUEUE_CAPACITY";

/// Queue capacity used when the environment does not override it.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

const MAX_QUEUE_CAPACITY: usize = 1_000_000;

type Job = Box<dyn FnOnce() + Send>;

/// Errors from submitting work to a [`Refresher`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RefresherError {
    /// The worker queue is at capacity.
    #[error("refresher queue is full")]
    QueueFull,
    /// The refresher was dropped or its worker stopped.
    #[error("refresher is shut down")]
    ShutDown,
}

/// Owns the worker thread; dropping it shuts the worker down.
pub struct Refresher {
    handle: RefresherHandle,
    stop_tx: Sender<()>,
    worker: Option<thread::JoinHandle<()>>,
}

/// Cloneable submission handle to a [`Refresher`].
///
/// Handles stay valid after the refresher is dropped; submissions then fail
/// with [`RefresherError::ShutDown`].
#[derive(Debug, Clone)]
pub struct RefresherHandle {
    jobs: Sender<Job>,
}

impl Refresher {
    /// Starts a worker with the queue capacity taken from the environment,
    /// falling back to [`DEFAULT_QUEUE_CAPACITY`].
    pub fn new() -> io::Result<Self> {
        let capacity = queue_capacity_from_env(REFRESH_QUEUE_CAPACITY_ENV)?
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);
        Self::with_capacity(capacity)
    }

    /// Starts a worker with an explicit queue capacity.
    pub fn with_capacity(capacity: usize) -> io::Result<Self> {
        // A zero-capacity channel would make every submission rendezvous
        // with the worker, so the floor is one slot.
        let capacity = capacity.clamp(1, MAX_QUEUE_CAPACITY);
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(capacity);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let worker = thread::Builder::new()
            .name("vela-live-refresher".to_owned())
            .spawn(move || run_refresh_loop(&job_rx, &stop_rx))?;
        tracing::debug!(target: "vela.live", capacity, "refresher started");
        Ok(Self {
            handle: RefresherHandle { jobs: job_tx },
            stop_tx,
            worker: Some(worker),
        })
    }

    /// Returns a handle for submitting jobs.
    pub fn handle(&self) -> RefresherHandle {
        self.handle.clone()
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::debug!(target: "vela.live", "refresher worker panicked before shutdown");
            } else {
                tracing::debug!(target: "vela.live", "refresher stopped");
            }
        }
    }
}

impl RefresherHandle {
    /// Queues `job` for the worker without blocking.
    pub fn submit<F>(&self, job: F) -> Result<(), RefresherError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.jobs.try_send(Box::new(job)).map_err(|err| match err {
            TrySendError::Full(_) => RefresherError::QueueFull,
            TrySendError::Disconnected(_) => RefresherError::ShutDown,
        })
    }
}

fn run_refresh_loop(jobs: &Receiver<Job>, stop: &Receiver<()>) {
    loop {
        crossbeam_channel::select! {
            recv(stop) -> _ => break,
            recv(jobs) -> job => match job {
                Ok(job) => job(),
                Err(_) => return,
            },
        }
    }
    // Run whatever was accepted before the stop signal arrived.
    while let Ok(job) = jobs.try_recv() {
        job();
    }
}

/// Reads a queue capacity override from `var`.
///
/// `Ok(None)` means "use the default": the variable is unset, blank, or `0`.
fn queue_capacity_from_env(var: &str) -> io::Result<Option<usize>> {
    match std::env::var(var) {
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{var} is not valid unicode"),
        )),
        Ok(raw) => parse_queue_capacity(&raw, var),
    }
}

fn parse_queue_capacity(raw: &str, var: &str) -> io::Result<Option<usize>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(capacity) => Ok(Some(capacity.min(MAX_QUEUE_CAPACITY))),
        Err(err) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid {var} value {raw:?}: {err}"),
        )),
    }
}
