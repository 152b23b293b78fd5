// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Channel - typed protocol client over a ConnectionLike
//
// The Channel provides a typed interface for sending protocol commands on
// behalf of one attached target (session) and for the handful of Runtime and
// Page domain commands the bridge is built on.

use crate::error::{Error, Result};
use crate::server::connection::{ConnectionLike, Subscription};
use crate::server::types::{
    CallFunctionOnParams, CompileScriptParams, CompileScriptResult, CreateIsolatedWorldParams,
    CreateIsolatedWorldResult, EvaluateResult, ExecutionContextId, FrameId, FrameTree,
    GetFrameTreeResult, GetPropertiesParams, GetPropertiesResult, RemoteObjectId,
    RunScriptParams,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Channel provides typed RPC communication for one session.
///
/// In Rust, we provide an explicit `send` method that handles:
/// - Serialization of parameters
/// - Sending to the connection with the session id
/// - Racing the round trip against the channel's cancellation token
/// - Deserialization of result
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::server::channel::Channel;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct NavigateResult {
///     #[serde(rename = "frameId")]
///     frame_id: String,
/// }
///
/// async fn example(channel: &Channel) -> Result<(), Box<dyn std::error::Error>> {
///     let result: NavigateResult = channel
///         .send("Page.navigate", serde_json::json!({"url": "https://example.com"}))
///         .await?;
///     println!("Navigated frame: {}", result.frame_id);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Channel {
    session_id: Option<Arc<str>>,
    connection: Arc<dyn ConnectionLike>,
    cancel: CancellationToken,
}

impl Channel {
    /// Creates a new Channel for the browser endpoint (no session).
    pub fn new(connection: Arc<dyn ConnectionLike>) -> Self {
        Self {
            session_id: None,
            connection,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a Channel routed to an attached target session.
    pub fn with_session(mut self, session_id: impl AsRef<str>) -> Self {
        self.session_id = Some(Arc::from(session_id.as_ref()));
        self
    }

    /// Returns a Channel whose calls fail with [`Error::Cancelled`] once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the session id this channel represents.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the cancellation token bound to this channel.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Sends a command to the remote target and awaits the response.
    ///
    /// This method:
    /// 1. Serializes `params` to JSON
    /// 2. Sends the command via the connection
    /// 3. Waits for the response, or for the cancellation token
    /// 4. Deserializes the response to type `R`
    pub async fn send<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let params_value = serde_json::to_value(params)?;

        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(method, "Command cancelled before a response arrived");
                return Err(Error::Cancelled);
            }
            response = self
                .connection
                .send_message(self.session_id(), method, params_value) => response?,
        };

        serde_json::from_value(response)
            .map_err(|e| Error::Protocol(format!("Malformed '{}' response: {}", method, e)))
    }

    /// Subscribes to raw params of one protocol event.
    pub async fn subscribe(&self, event: &str) -> Result<Subscription> {
        self.connection.subscribe(self.session_id(), event).await
    }

    // Runtime domain

    pub async fn call_function_on(&self, params: CallFunctionOnParams) -> Result<EvaluateResult> {
        self.send("Runtime.callFunctionOn", params).await
    }

    pub async fn compile_script(&self, params: CompileScriptParams) -> Result<CompileScriptResult> {
        self.send("Runtime.compileScript", params).await
    }

    pub async fn run_script(&self, params: RunScriptParams) -> Result<EvaluateResult> {
        self.send("Runtime.runScript", params).await
    }

    pub async fn get_properties(
        &self,
        object_id: &RemoteObjectId,
        own_properties: bool,
    ) -> Result<GetPropertiesResult> {
        self.send(
            "Runtime.getProperties",
            GetPropertiesParams {
                object_id: object_id.clone(),
                own_properties,
            },
        )
        .await
    }

    // Page domain

    /// Creates an isolated world for the given frame and returns its context id.
    pub async fn create_isolated_world(&self, frame_id: &FrameId) -> Result<ExecutionContextId> {
        let result: CreateIsolatedWorldResult = self
            .send(
                "Page.createIsolatedWorld",
                CreateIsolatedWorldParams {
                    frame_id: frame_id.clone(),
                    world_name: None,
                    grant_univeral_access: true,
                },
            )
            .await?;

        Ok(result.execution_context_id)
    }

    pub async fn get_frame_tree(&self) -> Result<FrameTree> {
        let result: GetFrameTreeResult = self.send("Page.getFrameTree", Value::Null).await?;
        Ok(result.frame_tree)
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("session_id", &self.session_id)
            .finish()
    }
}
