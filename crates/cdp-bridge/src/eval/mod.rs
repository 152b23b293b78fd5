//! Remote execution and value resolution
//!
//! - [`Expression`]: function source plus arguments, built without executing
//! - [`Runtime`]: executes expressions (or [`CompiledExpression`]s) in one
//!   execution context, in one of three return modes
//! - [`Resolver`]: turns raw result descriptors into local [`Value`]s,
//!   delegating DOM nodes to a pluggable [`Loader`]

mod compiled;
mod exception;
mod expression;
mod remote;
mod resolver;
mod runtime;
mod value;

pub use compiled::CompiledExpression;
pub use expression::{Expression, ReturnMode};
pub use remote::{RemoteClassName, RemoteObjectType};
pub use resolver::{Loader, LoaderFn, Resolver};
pub use runtime::{ExecutionContext, Runtime};
pub use value::Value;
