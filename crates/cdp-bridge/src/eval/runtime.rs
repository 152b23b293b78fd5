// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Expression runtime - executes expressions in one execution context
//
// Every call is a single request/response round trip through the Channel.
// The return mode is chosen by the entry point and applied to the protocol
// parameters right before they are sent.

use crate::dom::ElementHandle;
use crate::error::{Error, Result};
use crate::eval::compiled::CompiledExpression;
use crate::eval::exception;
use crate::eval::expression::{Expression, ReturnMode};
use crate::eval::resolver::{Loader, Resolver};
use crate::eval::value::Value;
use crate::server::channel::Channel;
use crate::server::types::{
    CompileScriptParams, EvaluateResult, ExecutionContextId, FrameId, RemoteObject,
};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// An isolated evaluation scope inside one frame
///
/// `id` is `None` for the frame's default context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionContext {
    frame_id: FrameId,
    id: Option<ExecutionContextId>,
}

impl ExecutionContext {
    pub fn new(frame_id: FrameId, id: ExecutionContextId) -> Self {
        Self {
            frame_id,
            id: Some(id),
        }
    }

    /// The frame's default context.
    pub fn default_for(frame_id: FrameId) -> Self {
        Self { frame_id, id: None }
    }

    pub fn frame_id(&self) -> &FrameId {
        &self.frame_id
    }

    pub fn id(&self) -> Option<ExecutionContextId> {
        self.id
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}#{}", self.frame_id, id),
            None => write!(f, "{}#default", self.frame_id),
        }
    }
}

/// Executes expressions against one execution context
///
/// Cloning is cheap; clones share the resolver's loader slot.
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::eval::{Expression, Runtime};
///
/// let runtime = Runtime::create(channel, frame_id).await?;
/// let two = runtime.eval_value(&Expression::new("() => 1 + 1")).await?;
/// assert_eq!(two.as_i64(), Some(2));
/// ```
#[derive(Clone)]
pub struct Runtime {
    channel: Channel,
    context: ExecutionContext,
    resolver: Resolver,
}

impl Runtime {
    pub fn new(channel: Channel, context: ExecutionContext) -> Self {
        let resolver = Resolver::new(channel.clone(), context.frame_id().clone());

        Self {
            channel,
            context,
            resolver,
        }
    }

    /// Creates an isolated world in `frame_id` and binds a runtime to it.
    pub async fn create(channel: Channel, frame_id: FrameId) -> Result<Self> {
        let context_id = channel
            .create_isolated_world(&frame_id)
            .await
            .map_err(|e| e.context(format!("Failed to create isolated world in {}", frame_id)))?;

        tracing::debug!(frame_id = %frame_id, context_id = %context_id, "Created isolated world");

        Ok(Self::new(channel, ExecutionContext::new(frame_id, context_id)))
    }

    /// Returns a runtime whose calls are cancelled when `token` fires.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let channel = self.channel.clone().with_cancellation(token);

        Self {
            resolver: self.resolver.with_channel(channel.clone()),
            channel,
            context: self.context.clone(),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        self.channel.cancellation()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn frame_id(&self) -> &FrameId {
        self.context.frame_id()
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn set_loader(&self, loader: Arc<dyn Loader>) -> &Self {
        self.resolver.set_loader(loader);
        self
    }

    /// Executes the expression and discards its result.
    pub async fn eval(&self, expr: &Expression) -> Result<()> {
        self.eval_internal(expr, ReturnMode::Nothing).await?;
        Ok(())
    }

    /// Executes the expression and returns the raw result descriptor.
    pub async fn eval_ref(&self, expr: &Expression) -> Result<RemoteObject> {
        self.eval_internal(expr, ReturnMode::Ref).await
    }

    /// Executes the expression and resolves its result by value.
    pub async fn eval_value(&self, expr: &Expression) -> Result<Value> {
        let out = self.eval_internal(expr, ReturnMode::Value).await?;
        self.resolver.to_value(&out).await
    }

    /// Executes the expression and loads the node it returns.
    ///
    /// Returns `None` when the result is not a reference (e.g. `null`).
    pub async fn eval_element(&self, expr: &Expression) -> Result<Option<ElementHandle>> {
        let out = self.eval_ref(expr).await?;
        self.to_element(out).await
    }

    /// Executes the expression and loads every node it returns.
    ///
    /// A single node result is wrapped into a one-element vector.
    pub async fn eval_elements(&self, expr: &Expression) -> Result<Vec<ElementHandle>> {
        let out = self.eval_ref(expr).await?;
        let value = self.resolver.to_value(&out).await?;
        into_elements(value)
    }

    /// Compiles the expression into a script persisted by the target.
    pub async fn compile(&self, expr: Expression) -> Result<CompiledExpression> {
        let script = expr.compile_source()?;

        tracing::trace!(
            context = %self.context,
            arguments = expr.arg_count(),
            script = %script,
            "Compiling expression"
        );

        let reply = self
            .channel
            .compile_script(CompileScriptParams {
                expression: script,
                source_url: String::new(),
                persist_script: true,
                execution_context_id: self.context.id(),
            })
            .await
            .inspect_err(|e| tracing::trace!(error = %e, "Failed compiling expression"))?;

        if let Some(details) = &reply.exception_details {
            let err = Error::Compile(details.description().to_string());
            tracing::trace!(error = %err, "Compilation failed with exception");
            return Err(err);
        }

        let Some(script_id) = reply.script_id else {
            tracing::trace!("Compilation did not return a script id");
            return Err(Error::Compile("no script id returned".to_string()));
        };

        tracing::trace!(script_id = %script_id, "Compiled expression");

        Ok(CompiledExpression::new(script_id, expr))
    }

    /// Runs a compiled script and discards its result.
    pub async fn call(&self, compiled: &CompiledExpression) -> Result<()> {
        self.call_internal(compiled, ReturnMode::Nothing).await?;
        Ok(())
    }

    pub async fn call_ref(&self, compiled: &CompiledExpression) -> Result<RemoteObject> {
        self.call_internal(compiled, ReturnMode::Ref).await
    }

    pub async fn call_value(&self, compiled: &CompiledExpression) -> Result<Value> {
        let out = self.call_internal(compiled, ReturnMode::Value).await?;
        self.resolver.to_value(&out).await
    }

    pub async fn call_element(&self, compiled: &CompiledExpression) -> Result<Option<ElementHandle>> {
        let out = self.call_ref(compiled).await?;
        self.to_element(out).await
    }

    pub async fn call_elements(&self, compiled: &CompiledExpression) -> Result<Vec<ElementHandle>> {
        let out = self.call_ref(compiled).await?;
        let value = self.resolver.to_value(&out).await?;
        into_elements(value)
    }

    async fn to_element(&self, out: RemoteObject) -> Result<Option<ElementHandle>> {
        if out.object_id.is_none() {
            return Ok(None);
        }

        let node = self.resolver.to_element(&out).await?;
        Ok(Some(node.into_element()))
    }

    async fn eval_internal(&self, expr: &Expression, returns: ReturnMode) -> Result<RemoteObject> {
        tracing::trace!(
            context = %self.context,
            expression = %expr,
            %returns,
            is_async = expr.is_async(),
            owner = expr.owner_id().map(|id| id.as_str()).unwrap_or_default(),
            arguments = expr.arg_count(),
            "Executing expression"
        );

        let params = expr.call_params(self.context.id(), returns)?;

        let reply = self
            .channel
            .call_function_on(params)
            .await
            .inspect_err(|e| tracing::trace!(error = %e, "Failed executing expression"))?;

        self.check_reply(reply, "expression")
    }

    async fn call_internal(
        &self,
        compiled: &CompiledExpression,
        returns: ReturnMode,
    ) -> Result<RemoteObject> {
        tracing::trace!(
            context = %self.context,
            script_id = %compiled.script_id(),
            %returns,
            is_async = compiled.source().is_async(),
            "Executing compiled script"
        );

        let params = compiled.run_params(self.context.id(), returns);

        let reply = self
            .channel
            .run_script(params)
            .await
            .inspect_err(|e| tracing::trace!(error = %e, "Failed executing compiled script"))?;

        self.check_reply(reply, "compiled script")
    }

    fn check_reply(&self, reply: EvaluateResult, what: &str) -> Result<RemoteObject> {
        if let Err(err) = exception::check(reply.exception_details.as_ref()) {
            tracing::trace!(error = %err, "{} failed with runtime exception", what);
            return Err(err);
        }

        tracing::trace!(
            returned_type = %reply.result.kind,
            returned_subtype = reply.result.subtype.as_deref().unwrap_or_default(),
            returned_class_name = reply.result.class_name.as_deref().unwrap_or_default(),
            "Succeeded executing {}",
            what
        );

        Ok(reply.result)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("context", &self.context)
            .field("resolver", &self.resolver)
            .finish()
    }
}

fn into_elements(value: Value) -> Result<Vec<ElementHandle>> {
    match value {
        Value::None => Ok(Vec::new()),
        Value::Node(node) => Ok(vec![node.into_element()]),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_none())
            .map(|item| match item {
                Value::Node(node) => Ok(node.into_element()),
                other => Err(Error::InvalidOperation(format!(
                    "expected a node, got {}",
                    other.to_text()
                ))),
            })
            .collect(),
        other => Err(Error::InvalidOperation(format!(
            "expected nodes, got {}",
            other.to_text()
        ))),
    }
}
