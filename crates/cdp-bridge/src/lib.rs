//! cdp-bridge: remote JavaScript execution over the Chrome DevTools Protocol
//!
//! This crate runs parameterized functions inside a page's execution context,
//! turns the remote results into local values or DOM handles, polls
//! conditions, and bridges protocol event subscriptions into channels.
//!
//! The transport is not part of this crate: anything implementing
//! [`ConnectionLike`](server::connection::ConnectionLike) can drive it.
//!
//! # Examples
//!
//! ## Evaluating an expression
//!
//! ```ignore
//! use cdp_bridge::eval::{Expression, Runtime};
//! use cdp_bridge::server::channel::Channel;
//! use cdp_bridge::server::types::FrameId;
//! use std::sync::Arc;
//!
//! # async fn demo(connection: Arc<dyn cdp_bridge::server::connection::ConnectionLike>) -> cdp_bridge::Result<()> {
//! let channel = Channel::new(connection).with_session("session-1");
//! let runtime = Runtime::create(channel, FrameId::new("main")).await?;
//!
//! let sum = runtime
//!     .eval_value(&Expression::new("(a, b) => a + b").arg(1).arg(2))
//!     .await?;
//! assert_eq!(sum.as_i64(), Some(3));
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with the DOM
//!
//! ```ignore
//! use cdp_bridge::dom::{FrameStore, QuerySelector};
//! use cdp_bridge::events::{WaitEvent, WaitOptions};
//! use std::time::Duration;
//!
//! # async fn demo(channel: cdp_bridge::server::channel::Channel) -> cdp_bridge::Result<()> {
//! let frames = FrameStore::new(channel);
//! let document = frames.load_frame_tree().await?;
//!
//! document.wait_for_dom_ready(None).await?;
//! document
//!     .wait_for_element(
//!         &QuerySelector::css("#login"),
//!         WaitEvent::Present,
//!         Some(WaitOptions::new().timeout(Duration::from_secs(2))),
//!     )
//!     .await?;
//!
//! if let Some(button) = document.query_selector(&QuerySelector::css("#login")).await? {
//!     button.focus().await?;
//!     println!("{}", button.inner_text().await?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming navigations
//!
//! ```ignore
//! use cdp_bridge::events::{EventFilter, navigation_stream};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo(channel: cdp_bridge::server::channel::Channel) -> cdp_bridge::Result<()> {
//! let stream = navigation_stream(&channel, EventFilter::default()).await?;
//! let mut messages = stream.read(&CancellationToken::new())?;
//!
//! while let Some(message) = messages.recv().await {
//!     println!("navigated to {}", message.into_result()?);
//! }
//! # Ok(())
//! # }
//! ```

// Internal modules (exposed for integration tests and transports)
#[doc(hidden)]
pub mod server;

pub mod dom;
mod error;
pub mod eval;
pub mod events;
pub mod templates;

use std::time::Duration;

/// Default interval between two polls of a wait condition.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(200);

/// Default upper bound for element and document waits.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(5000);

// Re-export error types
pub use error::{Error, Result};

// Re-export the evaluation API
pub use eval::{CompiledExpression, Expression, Loader, ReturnMode, Runtime, Value};

// Re-export node handles
pub use dom::{DocumentHandle, ElementHandle, FrameRegistry, FrameStore, Node, QuerySelector};

// Re-export waiting and streaming
pub use events::{EventMessage, EventStream, WaitEvent, WaitOptions, WaitTask};

// Re-export cancellation so callers do not need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
