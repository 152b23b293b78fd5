//! Waiting and event streams
//!
//! - [`WaitTask`]: polls a predicate until it yields a value.
//! - [`EventStream`]: bridges a push subscription into a bounded channel.
//! - Decoders and stream constructors for navigation and network events.

mod navigation;
mod stream;
mod wait;

pub use navigation::{
    EventFilter, FRAME_NAVIGATED_EVENT, NavigationEvent, RESPONSE_RECEIVED_EVENT, Response,
    ResponseEvent, navigation_stream, response_stream,
};
pub use stream::{Decoder, EventMessage, EventStream};
pub use wait::{WaitEvent, WaitOptions, WaitTask};

pub(crate) use wait::wait_for;
