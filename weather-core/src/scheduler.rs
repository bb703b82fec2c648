//! Where work runs.
//!
//! A [`SchedulerProvider`] exposes a background context for repository
//! calls and a UI context where results are delivered and published.
//! [`WithSchedulers::with_schedulers`] moves a future onto that pair.

use futures::future::{AbortHandle, BoxFuture, abortable};
use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt::Debug,
    future::Future,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::warn;

pub type Task = BoxFuture<'static, ()>;

/// Something that can run a task to completion.
pub trait ExecutionContext: Send + Sync + Debug {
    fn execute(&self, task: Task);
}

pub trait SchedulerProvider: Send + Sync + Debug {
    fn background(&self) -> &dyn ExecutionContext;
    fn ui(&self) -> &dyn ExecutionContext;
}

/// Spawns tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioContext {
    handle: Handle,
}

impl TokioContext {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl ExecutionContext for TokioContext {
    fn execute(&self, task: Task) {
        drop(self.handle.spawn(task));
    }
}

/// Posts tasks to a [`UiLoop`].
#[derive(Debug, Clone)]
pub struct UiContext {
    tx: mpsc::UnboundedSender<Task>,
}

impl ExecutionContext for UiContext {
    fn execute(&self, task: Task) {
        if self.tx.send(task).is_err() {
            warn!("UI loop is gone, dropping delivery");
        }
    }
}

/// Receiving end of the UI context. The host drains it from the one task
/// that owns rendering, so every publish happens there.
#[derive(Debug)]
pub struct UiLoop {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl UiLoop {
    /// Waits for the next posted task and runs it. Returns `false` once every
    /// [`UiContext`] is gone.
    pub async fn turn(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task.await;
                true
            }
            None => false,
        }
    }

    /// Runs tasks until `done` holds or the loop closes.
    pub async fn run_until(&mut self, mut done: impl FnMut() -> bool) {
        while !done() {
            if !self.turn().await {
                break;
            }
        }
    }

    /// Runs whatever is already queued without waiting for more.
    pub async fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task.await;
            ran += 1;
        }
        ran
    }
}

/// Production schedulers: a tokio runtime for work, a [`UiLoop`] for delivery.
#[derive(Debug, Clone)]
pub struct AppSchedulers {
    background: TokioContext,
    ui: UiContext,
}

impl AppSchedulers {
    pub fn new(handle: Handle) -> (Self, UiLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let schedulers = Self { background: TokioContext::new(handle), ui: UiContext { tx } };
        (schedulers, UiLoop { rx })
    }

    /// Uses the runtime the caller is running on.
    pub fn current() -> Result<(Self, UiLoop), tokio::runtime::TryCurrentError> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl SchedulerProvider for AppSchedulers {
    fn background(&self) -> &dyn ExecutionContext {
        &self.background
    }

    fn ui(&self) -> &dyn ExecutionContext {
        &self.ui
    }
}

thread_local! {
    static TRAMPOLINE: RefCell<Option<VecDeque<Task>>> = const { RefCell::new(None) };
}

/// Runs a task to completion on the calling thread. Tasks scheduled while
/// another one is running are queued and run right after it, before
/// `execute` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateContext;

impl ExecutionContext for ImmediateContext {
    fn execute(&self, task: Task) {
        let outermost = TRAMPOLINE.with(|queue| {
            let mut queue = queue.borrow_mut();
            match queue.as_mut() {
                Some(pending) => {
                    pending.push_back(task);
                    None
                }
                None => {
                    *queue = Some(VecDeque::new());
                    Some(task)
                }
            }
        });

        let Some(first) = outermost else {
            return;
        };
        let _reset = TrampolineReset;

        futures::executor::block_on(first);
        while let Some(next) =
            TRAMPOLINE.with(|queue| queue.borrow_mut().as_mut().and_then(VecDeque::pop_front))
        {
            futures::executor::block_on(next);
        }
    }
}

/// Clears the trampoline even if a task panics.
struct TrampolineReset;

impl Drop for TrampolineReset {
    fn drop(&mut self) {
        TRAMPOLINE.with(|queue| *queue.borrow_mut() = None);
    }
}

/// Both contexts immediate. Deterministic, meant for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSchedulers {
    context: ImmediateContext,
}

impl ImmediateSchedulers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulerProvider for ImmediateSchedulers {
    fn background(&self) -> &dyn ExecutionContext {
        &self.context
    }

    fn ui(&self) -> &dyn ExecutionContext {
        &self.context
    }
}

/// Handle to a scheduled piece of work. Disposing it aborts the work and
/// suppresses a delivery that has not run yet.
#[derive(Debug)]
pub struct Subscription {
    handle: AbortHandle,
    finished: Arc<AtomicBool>,
}

impl Subscription {
    /// True once the delivery ran, or was dropped because the work was
    /// aborted or the UI context is gone.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn dispose(&self) {
        self.handle.abort();
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_aborted()
    }
}

/// Owns a set of subscriptions and disposes all of them on `clear` or drop.
#[derive(Debug, Default)]
pub struct Disposables {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl Disposables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `subscription` until it finishes. Finished entries are pruned here.
    pub fn add(&self, subscription: Subscription) {
        let mut subscriptions = self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner);
        subscriptions.push(subscription);
        subscriptions.retain(|s| !s.is_finished());
    }

    pub fn clear(&self) {
        let drained: Vec<_> =
            self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner).drain(..).collect();
        for subscription in drained {
            subscription.dispose();
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Disposables {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Flags its subscription finished when dropped, wherever the task ends.
struct FinishOnDrop(Arc<AtomicBool>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// A future bound to a scheduler pair, waiting for `subscribe`.
pub struct Scheduled<F> {
    work: F,
    schedulers: Arc<dyn SchedulerProvider>,
}

impl<F> Scheduled<F>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    /// Starts the work on the background context and hands its output to
    /// `deliver` on the UI context, unless disposed first.
    pub fn subscribe(self, deliver: impl FnOnce(F::Output) + Send + 'static) -> Subscription {
        let (work, handle) = abortable(self.work);
        let guard = handle.clone();
        let schedulers = Arc::clone(&self.schedulers);
        let finished = Arc::new(AtomicBool::new(false));
        let marker = FinishOnDrop(Arc::clone(&finished));

        self.schedulers.background().execute(Box::pin(async move {
            if let Ok(output) = work.await {
                schedulers.ui().execute(Box::pin(async move {
                    let _marker = marker;
                    if !guard.is_aborted() {
                        deliver(output);
                    }
                }));
            }
        }));

        Subscription { handle, finished }
    }
}

pub trait WithSchedulers: Future + Sized {
    fn with_schedulers(self, schedulers: &Arc<dyn SchedulerProvider>) -> Scheduled<Self> {
        Scheduled { work: self, schedulers: Arc::clone(schedulers) }
    }
}

impl<F: Future> WithSchedulers for F {}
