// ============================================================================
// hlsplit-core/src/context.rs
// ============================================================================
//
// JOB CONTEXT: Cooperative Cancellation and Completion Tracking
//
// A JobContext is shared by everything that works on behalf of one logical
// operation. It combines three things:
// - a cancellation signal that any holder may raise, observable either by
//   polling `is_cancelled` or by selecting on `cancelled()`
// - a counter of outstanding units of work (`add` / `done`)
// - a one-shot "all work drained" signal, created the first time somebody
//   asks for it through `waiting()`
//
// Both signals are crossbeam channels whose sender is dropped when the event
// happens, so every receiver clone wakes up at once and stays readable.
// Cancellation never completes work on its own: units still have to call
// `done` as they unwind.
//
// AI-ASSISTANT-INFO: Cancellation token with a wait-group style counter

// ---- External crate imports ----
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use once_cell::sync::OnceCell;

// ---- Standard library imports ----
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lifecycle of a [`JobContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Active,
    CancelRequested,
    /// Every registered unit finished. Terminal.
    Drained,
}

#[derive(Debug)]
struct Counter {
    outstanding: usize,
    drained: bool,
    cancel_tx: Option<Sender<()>>,
    completion_tx: Option<Sender<()>>,
}

#[derive(Debug)]
struct Inner {
    counter: Mutex<Counter>,
    cancel_rx: Receiver<()>,
    completion_rx: OnceCell<Receiver<()>>,
}

/// Cloneable cancellation and completion handle.
///
/// ```rust
/// use hlsplit_core::JobContext;
///
/// let ctx = JobContext::new();
/// ctx.add(1);
/// let worker = ctx.clone();
/// std::thread::spawn(move || worker.done());
/// ctx.wait();
/// ```
#[derive(Debug, Clone)]
pub struct JobContext {
    inner: Arc<Inner>,
}

impl Default for JobContext {
    fn default() -> Self {
        Self::new()
    }
}

impl JobContext {
    pub fn new() -> Self {
        let (cancel_tx, cancel_rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                counter: Mutex::new(Counter {
                    outstanding: 0,
                    drained: false,
                    cancel_tx: Some(cancel_tx),
                    completion_tx: None,
                }),
                cancel_rx,
                completion_rx: OnceCell::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counter> {
        self.inner
            .counter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `n` more units of outstanding work.
    ///
    /// # Panics
    ///
    /// Panics if the context already drained.
    pub fn add(&self, n: usize) {
        let mut counter = self.lock();
        if counter.drained {
            panic!("JobContext::add called after all tracked work drained");
        }
        counter.outstanding += n;
    }

    /// Marks one unit of work complete.
    ///
    /// # Panics
    ///
    /// Panics if no work is outstanding.
    pub fn done(&self) {
        let mut counter = self.lock();
        if counter.outstanding == 0 {
            panic!("JobContext::done called with no outstanding work");
        }
        counter.outstanding -= 1;
        if counter.outstanding == 0 {
            counter.drained = true;
            counter.completion_tx.take();
            log::trace!("job context drained");
        }
    }

    /// Requests cancellation. Safe to call any number of times from any thread.
    pub fn cancel(&self) {
        if self.lock().cancel_tx.take().is_some() {
            log::debug!("job context cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancel_tx.is_none()
    }

    pub fn state(&self) -> ContextState {
        let counter = self.lock();
        if counter.drained {
            ContextState::Drained
        } else if counter.cancel_tx.is_none() {
            ContextState::CancelRequested
        } else {
            ContextState::Active
        }
    }

    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Receiver that disconnects once cancellation is requested.
    pub fn cancelled(&self) -> Receiver<()> {
        self.inner.cancel_rx.clone()
    }

    /// Receiver that disconnects once all registered work is done.
    ///
    /// The underlying signal is created on first use. If nothing is
    /// outstanding at that moment it is already closed.
    pub fn waiting(&self) -> Receiver<()> {
        self.inner
            .completion_rx
            .get_or_init(|| {
                let (tx, rx) = bounded(0);
                let mut counter = self.lock();
                if counter.outstanding > 0 {
                    counter.completion_tx = Some(tx);
                }
                rx
            })
            .clone()
    }

    /// Blocks until all registered work is done.
    pub fn wait(&self) {
        let _ = self.waiting().recv();
    }

    /// Like [`wait`](Self::wait) with an upper bound. Returns `true` if the
    /// work drained in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        !matches!(
            self.waiting().recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }
}

/// Calls `done` on drop, so a unit registered with `add(1)` is always
/// released even on early return.
pub(crate) struct WorkGuard<'a> {
    ctx: &'a JobContext,
}

impl<'a> WorkGuard<'a> {
    pub(crate) fn register(ctx: &'a JobContext) -> Self {
        ctx.add(1);
        Self { ctx }
    }
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        self.ctx.done();
    }
}
