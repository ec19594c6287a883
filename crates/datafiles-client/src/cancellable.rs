//! Cancellable request handles

use crate::{ClientError, Result};
use futures::future::BoxFuture;
use futures::task::AtomicWaker;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    waker: AtomicWaker,
}

/// Cancels the request it was taken from, from anywhere
#[derive(Clone, Debug)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Request cancellation. The pending I/O is dropped on the next poll,
    /// and a task awaiting the request is woken to observe it.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.waker.wake();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

/// A pending API call that can be cancelled before it resolves.
///
/// Nothing is sent until the request is awaited. Once cancelled, the
/// underlying future (and with it any open connection or upload body) is
/// dropped and the request resolves to [`ClientError::Cancelled`].
#[must_use = "requests do nothing unless awaited"]
pub struct CancellableRequest<T> {
    inner: Option<BoxFuture<'static, Result<T>>>,
    state: Arc<CancelState>,
}

impl<T> CancellableRequest<T> {
    /// Wrap a future as a cancellable request
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: Some(future.boxed()),
            state: Arc::new(CancelState::default()),
        }
    }

    /// A request that resolves immediately to `result`
    pub fn ready(result: Result<T>) -> Self
    where
        T: Send + 'static,
    {
        Self::new(futures::future::ready(result))
    }

    /// Handle that cancels this request
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Cancel and drop the request
    pub fn cancel(self) {
        self.cancel_handle().cancel();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Chain a fallible conversion onto the result, keeping the same cancel handle
    pub fn and_then<U, F>(mut self, f: F) -> CancellableRequest<U>
    where
        T: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let inner = self.inner.take().map(|fut| fut.map(|res| res.and_then(f)).boxed());
        CancellableRequest {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Future for CancellableRequest<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        this.state.waker.register(cx.waker());
        if this.state.cancelled.load(Ordering::SeqCst) {
            this.inner = None;
            return Poll::Ready(Err(ClientError::Cancelled));
        }

        match this.inner.as_mut() {
            Some(fut) => {
                let out = fut.as_mut().poll(cx);
                if out.is_ready() {
                    this.inner = None;
                }
                out
            }
            // Polled again after completion
            None => Poll::Ready(Err(ClientError::Cancelled)),
        }
    }
}

impl<T> std::fmt::Debug for CancellableRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellableRequest")
            .field("pending", &self.inner.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
