// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Event stream bridge - push subscription to bounded channel
//
// One background task per read drains the subscription, decodes each raw
// event and forwards it. The output channel holds a single message, so a slow
// consumer stalls the task and with it consumption of the subscription. The
// task owns the subscription and outlives the stream value; dropping the
// receiver stops it.

use crate::error::{Error, Result};
use crate::server::connection::Subscription;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Decodes one raw event; `Ok(None)` drops the event.
pub type Decoder<T> = Arc<dyn Fn(JsonValue) -> Result<Option<T>> + Send + Sync>;

/// Item delivered by [`EventStream::read`]
#[derive(Debug)]
pub enum EventMessage<T> {
    Value(T),
    /// Decoding failed; always the last message of a read.
    Error(Error),
}

impl<T> EventMessage<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            EventMessage::Value(value) => Ok(value),
            EventMessage::Error(err) => Err(err),
        }
    }
}

/// Stream of decoded protocol events
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::events::{EventFilter, EventMessage, navigation_stream};
/// use tokio_util::sync::CancellationToken;
///
/// let stream = navigation_stream(&channel, EventFilter::default()).await?;
/// let cancel = CancellationToken::new();
/// let mut messages = stream.read(&cancel)?;
///
/// while let Some(message) = messages.recv().await {
///     let event = message.into_result()?;
///     println!("navigated to {}", event.url);
/// }
/// ```
pub struct EventStream<T> {
    event: String,
    subscription: Mutex<Option<Subscription>>,
    decoder: Decoder<T>,
    stop: CancellationToken,
    closed: AtomicBool,
}

impl<T: Send + 'static> EventStream<T> {
    pub fn new<F>(subscription: Subscription, decoder: F) -> Self
    where
        F: Fn(JsonValue) -> Result<Option<T>> + Send + Sync + 'static,
    {
        Self {
            event: subscription.event().to_string(),
            subscription: Mutex::new(Some(subscription)),
            decoder: Arc::new(decoder),
            stop: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Event method the stream listens to
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Starts the receive loop and returns its output channel.
    ///
    /// The channel closes when `cancel` fires, when the stream is closed,
    /// when the subscription ends, or right after an error message. The
    /// receive loop keeps running if the stream itself is dropped, so
    /// `navigation_stream(..).await?.read(&cancel)?` is fine; it stops once
    /// the returned receiver is dropped. A stream can be read once.
    pub fn read(&self, cancel: &CancellationToken) -> Result<mpsc::Receiver<EventMessage<T>>> {
        if self.is_closed() {
            return Err(Error::InvalidOperation(format!(
                "event stream '{}' is closed",
                self.event
            )));
        }

        let subscription = self.subscription.lock().take().ok_or_else(|| {
            Error::InvalidOperation(format!("event stream '{}' is already being read", self.event))
        })?;

        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(receive_loop(
            subscription,
            Arc::clone(&self.decoder),
            tx,
            cancel.clone(),
            self.stop.clone(),
        ));

        Ok(rx)
    }

    /// Stops delivery and releases the subscription. Later calls are no-ops.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        tracing::debug!(event = %self.event, "Closing event stream");

        self.stop.cancel();
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.close();
        }

        Ok(())
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("event", &self.event)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

async fn receive_loop<T>(
    mut subscription: Subscription,
    decoder: Decoder<T>,
    tx: mpsc::Sender<EventMessage<T>>,
    cancel: CancellationToken,
    stop: CancellationToken,
) {
    let event = subscription.event().to_string();
    tracing::debug!(event = %event, "Event stream started");

    loop {
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = stop.cancelled() => break,
            _ = tx.closed() => break,
            raw = subscription.recv() => raw,
        };

        let Some(raw) = raw else {
            tracing::debug!(event = %event, "Subscription ended");
            break;
        };

        let message = match decoder(raw) {
            Ok(Some(value)) => EventMessage::Value(value),
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(event = %event, error = %err, "Failed to decode event");
                EventMessage::Error(err)
            }
        };
        let terminal = matches!(message, EventMessage::Error(_));

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = stop.cancelled() => false,
            res = tx.send(message) => res.is_ok(),
        };

        if !sent || terminal {
            break;
        }
    }

    subscription.close();
    tracing::debug!(event = %event, "Event stream stopped");
}
