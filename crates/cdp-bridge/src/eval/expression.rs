//! Expression builder
//!
//! An [`Expression`] is a function source plus an ordered argument list that
//! has not been executed yet. Building never talks to the target; argument
//! problems are recorded and reported as [`Error::InvalidArgument`] when the
//! expression is turned into protocol parameters.
//!
//! # Example
//!
//! ```ignore
//! use cdp_bridge::eval::Expression;
//!
//! let expr = Expression::new("(el, name) => el.getAttribute(name)")
//!     .arg_ref(element.remote_id().clone())
//!     .arg("href");
//! let href = runtime.eval_value(&expr).await?;
//! ```

use crate::dom::QuerySelector;
use crate::error::{Error, Result};
use crate::eval::value::Value;
use crate::server::types::{CallArgument, CallFunctionOnParams, ExecutionContextId, RemoteObjectId};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// What the caller wants back from one execution
///
/// Chosen per call by the runtime and applied when the protocol parameters
/// are built, so the same expression can be executed in different modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnMode {
    /// Result is discarded
    #[default]
    Nothing,
    /// Result is returned as a remote reference
    Ref,
    /// Result is serialized by value
    Value,
}

impl fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnMode::Nothing => f.write_str("nothing"),
            ReturnMode::Ref => f.write_str("ref"),
            ReturnMode::Value => f.write_str("value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Argument {
    Literal(JsonValue),
    /// Primitive with no JSON form, passed as its literal text (`NaN`, `-0`, `1n`)
    Unserializable(String),
    Ref(RemoteObjectId),
    Invalid(String),
}

impl Argument {
    fn to_call_argument(&self) -> Result<CallArgument> {
        match self {
            Argument::Literal(value) => Ok(CallArgument {
                value: Some(value.clone()),
                ..Default::default()
            }),
            Argument::Unserializable(raw) => Ok(CallArgument {
                unserializable_value: Some(raw.clone()),
                ..Default::default()
            }),
            Argument::Ref(id) => Ok(CallArgument {
                object_id: Some(id.clone()),
                ..Default::default()
            }),
            Argument::Invalid(reason) => Err(Error::InvalidArgument(reason.clone())),
        }
    }

    fn to_inline_source(&self) -> Result<String> {
        match self {
            Argument::Literal(value) => Ok(value.to_string()),
            Argument::Unserializable(raw) => Ok(raw.clone()),
            Argument::Ref(id) => Err(Error::InvalidArgument(format!(
                "remote reference {} cannot be inlined into a compiled script",
                id
            ))),
            Argument::Invalid(reason) => Err(Error::InvalidArgument(reason.clone())),
        }
    }

    fn from_float(f: f64) -> Self {
        if f.is_nan() {
            Argument::Unserializable("NaN".to_string())
        } else if f.is_infinite() {
            let raw = if f.is_sign_positive() { "Infinity" } else { "-Infinity" };
            Argument::Unserializable(raw.to_string())
        } else if f == 0.0 && f.is_sign_negative() {
            Argument::Unserializable("-0".to_string())
        } else {
            serde_json::Number::from_f64(f)
                .map(|n| Argument::Literal(JsonValue::Number(n)))
                .unwrap_or_else(|| Argument::Invalid(format!("float {} has no JSON form", f)))
        }
    }
}

/// A parameterized, not-yet-executed unit of remote code
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    args: Vec<Argument>,
    owner: Option<RemoteObjectId>,
    is_async: bool,
}

impl Expression {
    /// Creates an expression from a function declaration such as `(el) => el.id`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            args: Vec::new(),
            owner: None,
            is_async: false,
        }
    }

    /// Picks the CSS or XPath template for `selector`.
    ///
    /// Exactly one template is used; the selector text still has to be
    /// passed with [`Expression::arg_selector`].
    pub fn for_selector(selector: &QuerySelector, css: &str, xpath: &str) -> Self {
        if selector.is_css() {
            Self::new(css)
        } else {
            Self::new(xpath)
        }
    }

    /// Appends a literal argument serialized to JSON.
    pub fn arg<T: Serialize>(mut self, value: T) -> Self {
        let arg = match serde_json::to_value(value) {
            Ok(json) => Argument::Literal(json),
            Err(e) => Argument::Invalid(e.to_string()),
        };
        self.args.push(arg);
        self
    }

    /// Appends a resolved local value.
    ///
    /// Nodes are passed as live references; non-finite floats and `-0` as
    /// unserializable primitives.
    pub fn arg_value(mut self, value: &Value) -> Self {
        let arg = match value {
            Value::Node(node) => Argument::Ref(node.remote_id().clone()),
            Value::Float(f) => Argument::from_float(*f),
            other => match other.to_json() {
                Some(json) => Argument::Literal(json),
                None => Argument::Invalid(
                    "nested nodes and non-finite numbers cannot be serialized".to_string(),
                ),
            },
        };
        self.args.push(arg);
        self
    }

    /// Appends a live reference to a remote object.
    pub fn arg_ref(mut self, id: RemoteObjectId) -> Self {
        self.args.push(Argument::Ref(id));
        self
    }

    /// Appends the selector text; its kind was consumed by [`Expression::for_selector`].
    pub fn arg_selector(mut self, selector: &QuerySelector) -> Self {
        self.args
            .push(Argument::Literal(JsonValue::String(selector.value().to_string())));
        self
    }

    /// Runs the function with `this` bound to the given remote object.
    pub fn owner(mut self, id: RemoteObjectId) -> Self {
        self.owner = Some(id);
        self
    }

    /// Marks the function as returning a promise that must be awaited.
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn owner_id(&self) -> Option<&RemoteObjectId> {
        self.owner.as_ref()
    }

    /// Builds `Runtime.callFunctionOn` parameters for one call.
    ///
    /// The execution context is omitted when an owner is set, since the
    /// owner already determines it.
    pub(crate) fn call_params(
        &self,
        context_id: Option<ExecutionContextId>,
        returns: ReturnMode,
    ) -> Result<CallFunctionOnParams> {
        let arguments = self
            .args
            .iter()
            .map(Argument::to_call_argument)
            .collect::<Result<Vec<_>>>()?;

        Ok(CallFunctionOnParams {
            function_declaration: self.source.clone(),
            object_id: self.owner.clone(),
            arguments,
            await_promise: self.is_async,
            return_by_value: returns == ReturnMode::Value,
            execution_context_id: if self.owner.is_some() {
                None
            } else {
                context_id
            },
        })
    }

    /// Renders a self-contained script that applies the function to its
    /// literal arguments, for `Runtime.compileScript`.
    pub(crate) fn compile_source(&self) -> Result<String> {
        if let Some(owner) = &self.owner {
            return Err(Error::InvalidArgument(format!(
                "owner {} cannot be bound in a compiled script",
                owner
            )));
        }

        let args = self
            .args
            .iter()
            .map(Argument::to_inline_source)
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "({}).apply(null, [{}])",
            self.source.trim(),
            args.join(", ")
        ))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
