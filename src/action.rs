//! Deferred, re-runnable units of work.
//!
//! Every endpoint method returns an [`Action`] instead of doing I/O right away.
//! The caller picks how to run it:
//!
//! - [`Action::complete`] blocks the calling thread until the result is ready
//! - [`Action::queue`] runs it on the worker pool and reports through one of
//!   two callbacks
//! - [`Action::suspend`] queues it and awaits the callback from an async task
//! - [`Action::run`] awaits it directly on the current task
//!
//! Each call starts a new execution of the underlying closure; results are
//! never cached.

use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use once_cell::sync::OnceCell;
use tokio::{
    runtime::{Handle, Runtime, RuntimeFlavor},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::{Error, Result};

type Supplier<T> = dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync;

static DEFAULT_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Worker pool used when the caller does not supply one.
///
/// The ambient runtime is used when it is multi-threaded; otherwise a
/// library-owned runtime is started on first use.
pub fn default_handle() -> Result<Handle> {
    if let Ok(handle) = Handle::try_current() {
        if handle.runtime_flavor() == RuntimeFlavor::MultiThread {
            return Ok(handle);
        }
    }

    let runtime = DEFAULT_RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("spotapi-worker")
            .build()
    })?;
    Ok(runtime.handle().clone())
}

/// A unit of work producing `T`.
pub struct Action<T> {
    supplier: Arc<Supplier<T>>,
    runtime: Handle,
}

impl<T> Clone for Action<T> {
    fn clone(&self) -> Self {
        Self {
            supplier: Arc::clone(&self.supplier),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Send + 'static> Action<T> {
    pub fn new<F, Fut>(runtime: Handle, supplier: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            supplier: Arc::new(move || Box::pin(supplier()) as BoxFuture<'static, Result<T>>),
            runtime,
        }
    }

    /// An action that always yields a clone of `value`.
    pub fn ready(runtime: Handle, value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(runtime, move || {
            let value = value.clone();
            async move { Ok(value) }
        })
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Awaits the work on the current task.
    pub async fn run(&self) -> Result<T> {
        (self.supplier)().await
    }

    /// Runs the work on the calling thread and blocks until it finishes.
    ///
    /// Must not be called from inside an async task; use [`Action::run`] or
    /// [`Action::suspend`] there.
    pub fn complete(&self) -> Result<T> {
        self.runtime.block_on((self.supplier)())
    }

    /// Schedules the work on the worker pool.
    ///
    /// Exactly one of the callbacks is invoked, once, on a pool thread. A panic
    /// inside the work is reported as [`Error::Panicked`].
    pub fn queue<E, S>(&self, on_error: E, on_success: S) -> JoinHandle<()>
    where
        E: FnOnce(Error) + Send + 'static,
        S: FnOnce(T) + Send + 'static,
    {
        self.queue_with(CancellationToken::new(), on_error, on_success)
    }

    /// [`Action::queue`] with cancellation. Work cancelled before it starts
    /// reports [`Error::Cancelled`] through `on_error`.
    pub fn queue_with<E, S>(
        &self,
        cancel: CancellationToken,
        on_error: E,
        on_success: S,
    ) -> JoinHandle<()>
    where
        E: FnOnce(Error) + Send + 'static,
        S: FnOnce(T) + Send + 'static,
    {
        self.dispatch(cancel, move |outcome| match outcome {
            Ok(value) => on_success(value),
            Err(e) => on_error(e),
        })
    }

    /// Queues the work and suspends the calling task until a callback fires.
    pub async fn suspend(&self) -> Result<T> {
        self.suspend_with(CancellationToken::new()).await
    }

    /// [`Action::suspend`] that resumes with [`Error::Cancelled`] as soon as
    /// `cancel` fires.
    pub async fn suspend_with(&self, cancel: CancellationToken) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(cancel.clone(), move |outcome| {
            let _ = tx.send(outcome);
        });

        tokio::select! {
            biased;
            received = rx => received.unwrap_or(Err(Error::Interrupted)),
            _ = cancel.cancelled() => Err(Error::Cancelled),
        }
    }

    /// Transforms the result.
    pub fn map<U, F>(&self, f: F) -> Action<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let supplier = Arc::clone(&self.supplier);
        let f = Arc::new(f);
        Action::new(self.runtime.clone(), move || {
            let pending = supplier();
            let f = Arc::clone(&f);
            async move { pending.await.map(|value| f(value)) }
        })
    }

    /// Turns a [`Error::BadRequest`] (400 or 404) into `None`. Every other
    /// error still propagates.
    pub fn catch_bad_request(&self) -> Action<Option<T>> {
        let supplier = Arc::clone(&self.supplier);
        Action::new(self.runtime.clone(), move || {
            let pending = supplier();
            async move {
                match pending.await {
                    Ok(value) => Ok(Some(value)),
                    Err(e) if e.is_bad_request() => Ok(None),
                    Err(e) => Err(e),
                }
            }
        })
    }

    fn dispatch<C>(&self, cancel: CancellationToken, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(Result<T>) + Send + 'static,
    {
        let supplier = Arc::clone(&self.supplier);
        self.runtime.spawn(async move {
            let outcome = if cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                AssertUnwindSafe(async move { supplier().await })
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(&*payload))))
            };

            // callbacks may block, keep them off the async workers
            if let Err(e) = tokio::task::spawn_blocking(move || callback(outcome)).await {
                error!(error = %e, "action callback panicked");
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use super::*;

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_map_and_ready() {
        let rt = runtime();
        let action = Action::ready(rt.handle().clone(), 20).map(|v| v + 1);
        assert_eq!(action.complete().unwrap(), 21);
    }

    #[test]
    fn test_catch_bad_request_only_suppresses_400_and_404() {
        let rt = runtime();
        let handle = rt.handle().clone();

        let not_found = Action::<u32>::new(handle.clone(), || async {
            Err(Error::BadRequest {
                status: StatusCode::NOT_FOUND,
                message: "missing".to_string(),
            })
        });
        assert_eq!(not_found.catch_bad_request().complete().unwrap(), None);

        let forbidden = Action::<u32>::new(handle, || async {
            Err(Error::Forbidden("nope".to_string()))
        });
        assert!(matches!(
            forbidden.catch_bad_request().complete(),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let action = Action::new(rt.handle().clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        });

        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, rx) = std::sync::mpsc::channel();
        let tx_ok = tx.clone();
        action.queue_with(
            cancel,
            move |e| tx.send(matches!(e, Error::Cancelled)).unwrap(),
            move |_| tx_ok.send(false).unwrap(),
        );

        assert!(rx.recv().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
