// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Wait engine - polls a predicate until it yields a value
//
// A predicate result of `Value::None` means "not yet". Any other value,
// including `false`, `0` and the empty string, ends the wait. Predicate
// errors end the wait immediately and are never retried.

use crate::error::{Error, Result};
use crate::eval::{Expression, Runtime, Value};
use crate::{DEFAULT_POLLING_INTERVAL, DEFAULT_WAIT_TIMEOUT};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a wait condition is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaitEvent {
    /// The checked element, class, attribute or style is there (or equal).
    #[default]
    Present,
    /// The checked element, class, attribute or style is gone (or different).
    Absent,
}

impl WaitEvent {
    /// Operator code passed to predicate templates.
    pub fn op(self) -> u8 {
        match self {
            WaitEvent::Present => 0,
            WaitEvent::Absent => 1,
        }
    }
}

/// Options for element and document waits
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::events::WaitOptions;
/// use std::time::Duration;
///
/// let options = WaitOptions::new()
///     .polling_interval(Duration::from_millis(50))
///     .timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub polling_interval: Duration,
    pub timeout: Duration,
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            polling_interval: DEFAULT_POLLING_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

type Predicate = Box<dyn Fn() -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Polling loop over an async predicate
///
/// Polls are strictly sequential. Cancellation is checked before every poll
/// and also interrupts the sleep between polls.
pub struct WaitTask {
    predicate: Predicate,
    polling_interval: Duration,
}

impl WaitTask {
    /// Creates a task polling `predicate` every `polling_interval`.
    ///
    /// A zero interval falls back to [`DEFAULT_POLLING_INTERVAL`].
    pub fn new<F>(predicate: F, polling_interval: Duration) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<Value>> + Send + Sync + 'static,
    {
        let polling_interval = if polling_interval.is_zero() {
            DEFAULT_POLLING_INTERVAL
        } else {
            polling_interval
        };

        Self {
            predicate: Box::new(predicate),
            polling_interval,
        }
    }

    /// Task whose predicate evaluates `expr` by value in `runtime`.
    pub fn eval(runtime: Runtime, expr: Expression, polling_interval: Duration) -> Self {
        Self::new(
            move || {
                let runtime = runtime.clone();
                let expr = expr.clone();
                async move { runtime.eval_value(&expr).await }.boxed()
            },
            polling_interval,
        )
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    /// Polls until the predicate yields a value, fails, or `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<Value> {
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(attempt, "Wait cancelled");
                return Err(Error::Cancelled);
            }

            attempt += 1;
            let out = (self.predicate)().await?;

            if !out.is_none() {
                tracing::trace!(attempt, "Wait condition met");
                return Ok(out);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(attempt, "Wait cancelled while sleeping");
                    return Err(Error::Cancelled);
                }
                _ = tokio::time::sleep(self.polling_interval) => {}
            }
        }
    }

    /// Like [`run`](Self::run), failing with [`Error::Timeout`] once `timeout`
    /// elapses.
    pub async fn run_with_timeout(&self, cancel: &CancellationToken, timeout: Duration) -> Result<Value> {
        match tokio::time::timeout(timeout, self.run(cancel)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "condition not met within {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

impl fmt::Debug for WaitTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitTask")
            .field("polling_interval", &self.polling_interval)
            .finish()
    }
}

/// Waits for a predicate template in `runtime`, bounded by the options'
/// timeout and the runtime's cancellation token.
pub(crate) async fn wait_for(
    runtime: &Runtime,
    expr: Expression,
    options: Option<WaitOptions>,
) -> Result<Value> {
    let options = options.unwrap_or_default();

    tracing::trace!(
        frame_id = %runtime.frame_id(),
        polling_ms = options.polling_interval.as_millis() as u64,
        timeout_ms = options.timeout.as_millis() as u64,
        "Waiting for condition"
    );

    WaitTask::eval(runtime.clone(), expr, options.polling_interval)
        .run_with_timeout(runtime.cancellation(), options.timeout)
        .await
}
