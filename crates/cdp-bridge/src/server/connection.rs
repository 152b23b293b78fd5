//! Connection contract for the DevTools protocol
//!
//! The wire encoding and transport live outside this crate. Anything that can
//! perform a command round trip and hand out raw event subscriptions can drive
//! the bridge by implementing [`ConnectionLike`].

use crate::error::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Boxed future returned by [`ConnectionLike`] methods
pub type ConnectionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait defining the interface the bridge needs from a protocol connection
///
/// Implementations are responsible for request id correlation and for
/// multiplexing concurrent outstanding requests.
pub trait ConnectionLike: Send + Sync {
    /// Send a command and await its result payload
    ///
    /// `session_id` routes the command to an attached target; `None` talks to
    /// the browser endpoint itself.
    fn send_message(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> ConnectionFuture<'_, Value>;

    /// Subscribe to raw event params for one event method (e.g. `Page.frameNavigated`)
    fn subscribe(&self, session_id: Option<&str>, event: &str)
    -> ConnectionFuture<'_, Subscription>;
}

type Unsubscribe = Box<dyn FnOnce() + Send>;

/// A push subscription delivering raw event params
///
/// `recv` suspends until the next event is ready and yields `None` once the
/// connection stops delivering. [`Subscription::close`] runs the unsubscribe
/// hook at most once; it also runs on drop.
pub struct Subscription {
    event: String,
    receiver: mpsc::Receiver<Value>,
    unsubscribe: Mutex<Option<Unsubscribe>>,
}

impl Subscription {
    pub fn new(event: impl Into<String>, receiver: mpsc::Receiver<Value>) -> Self {
        Self {
            event: event.into(),
            receiver,
            unsubscribe: Mutex::new(None),
        }
    }

    /// Registers a hook the connection uses to release the subscription
    pub fn on_close(self, hook: impl FnOnce() + Send + 'static) -> Self {
        *self.unsubscribe.lock() = Some(Box::new(hook));
        self
    }

    /// Event method this subscription listens to
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Waits for the next raw event
    pub async fn recv(&mut self) -> Option<Value> {
        self.receiver.recv().await
    }

    /// Releases the underlying subscription; later calls are no-ops
    pub fn close(&self) {
        if let Some(hook) = self.unsubscribe.lock().take() {
            tracing::debug!(event = %self.event, "Closing subscription");
            hook();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .finish()
    }
}
