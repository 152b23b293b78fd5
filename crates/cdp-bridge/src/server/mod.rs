//! Protocol client layer (internal)
//!
//! This module holds the seam to the remote debugging protocol: the
//! [`connection::ConnectionLike`] contract a transport must satisfy, the typed
//! [`channel::Channel`] built on top of it, and the wire types of the commands
//! the bridge issues.
//!
//! **Note**: This module is exposed publicly so transports and integration
//! tests can plug in. The types and APIs in this module are considered internal
//! implementation details and may change without notice.

#[doc(hidden)]
pub mod channel;
#[doc(hidden)]
pub mod connection;
#[doc(hidden)]
pub mod types;
