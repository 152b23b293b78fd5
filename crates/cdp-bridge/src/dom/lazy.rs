// Single-flight lazily computed value
//
// The first reader starts the initializer; readers arriving while it runs
// join the same flight and observe its outcome, error included. A failed
// flight is not cached: the next read that starts after it finished runs a
// fresh one.

use crate::error::{Error, Result};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

type Init<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

type Flight<T> = Shared<BoxFuture<'static, std::result::Result<T, Arc<Error>>>>;

pub struct LazyValue<T> {
    cell: OnceCell<T>,
    flight: Mutex<Option<Flight<T>>>,
    init: Init<T>,
}

impl<T: Clone + Send + Sync + 'static> LazyValue<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            flight: Mutex::new(None),
            init: Box::new(init),
        }
    }

    /// A cell that is already resolved.
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceCell::new_with(Some(value.clone())),
            flight: Mutex::new(None),
            init: Box::new(move || {
                let value = value.clone();
                async move { Ok::<T, Error>(value) }.boxed()
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn read(&self) -> Result<T> {
        if let Some(value) = self.cell.get() {
            return Ok(value.clone());
        }

        let flight = self.join_flight();
        let outcome = flight.clone().await;

        if let Ok(value) = &outcome {
            let _ = self.cell.set(value.clone());
        }
        {
            let mut current = self.flight.lock();
            if current.as_ref().is_some_and(|f| f.ptr_eq(&flight)) {
                *current = None;
            }
        }

        outcome.map_err(|err| err.replay())
    }

    fn join_flight(&self) -> Flight<T> {
        let mut current = self.flight.lock();
        if let Some(flight) = current.as_ref() {
            return flight.clone();
        }

        let flight = (self.init)().map(|res| res.map_err(Arc::new)).boxed().shared();
        *current = Some(flight.clone());
        flight
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyValue")
            .field("value", &self.cell.get())
            .finish()
    }
}
