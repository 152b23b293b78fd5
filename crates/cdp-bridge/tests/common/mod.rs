// Shared helpers for integration tests
//
// MockConnection answers protocol commands from per-method handlers, records
// every call, and lets tests push raw events into open subscriptions.

#![allow(dead_code)]

use cdp_bridge::Error;
use cdp_bridge::dom::{ElementHandle, Node};
use cdp_bridge::eval::{ExecutionContext, LoaderFn, Runtime};
use cdp_bridge::server::channel::Channel;
use cdp_bridge::server::connection::{ConnectionFuture, ConnectionLike, Subscription};
use cdp_bridge::server::types::{ExecutionContextId, FrameId};
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::mpsc;

static INIT: Once = Once::new();

/// Installs a tracing subscriber once per test binary (honours `RUST_LOG`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

type Handler = Arc<dyn Fn(&Value) -> Result<Value, Error> + Send + Sync>;

#[derive(Default)]
pub struct MockConnection {
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<Vec<(String, Value)>>,
    subscribers: Mutex<HashMap<String, mpsc::Sender<Value>>>,
    unsubscribed: Arc<AtomicUsize>,
    latency: Mutex<Option<Duration>>,
}

impl MockConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers `method` with the handler's result.
    pub fn on<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .insert(method.to_string(), Arc::new(handler));
    }

    /// Answers `method` with a fixed payload.
    pub fn reply(&self, method: &str, payload: Value) {
        self.on(method, move |_| Ok(payload.clone()));
    }

    /// Delays every command reply by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == method).count()
    }

    /// Pushes raw event params to the subscriber of `event`.
    pub async fn emit(&self, event: &str, params: Value) -> bool {
        let sender = self.subscribers.lock().get(event).cloned();
        match sender {
            Some(tx) => tx.send(params).await.is_ok(),
            None => false,
        }
    }

    /// Ends the subscription of `event` from the connection side.
    pub fn end_subscription(&self, event: &str) {
        self.subscribers.lock().remove(event);
    }

    /// How many subscriptions were released by their consumer.
    pub fn unsubscribed(&self) -> usize {
        self.unsubscribed.load(Ordering::SeqCst)
    }
}

impl ConnectionLike for MockConnection {
    fn send_message(
        &self,
        _session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> ConnectionFuture<'_, Value> {
        self.calls.lock().push((method.to_string(), params.clone()));
        let handler = self.handlers.lock().get(method).cloned();

        let result = match handler {
            Some(handler) => handler(&params),
            None => Err(Error::Transport(format!("no handler for {}", method))),
        };

        let latency = *self.latency.lock();

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }

    fn subscribe(&self, _session_id: Option<&str>, event: &str) -> ConnectionFuture<'_, Subscription> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.subscribers.lock().insert(event.to_string(), tx);

        let counter = Arc::clone(&self.unsubscribed);
        let subscription = Subscription::new(event, rx).on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        Box::pin(async move { Ok(subscription) })
    }
}

/// Raw events a mock subscription holds before `emit` waits.
pub const SUBSCRIPTION_BUFFER: usize = 16;

pub const FRAME_ID: &str = "F1";

pub const CONTEXT_ID: i64 = 7;

pub fn channel(connection: &Arc<MockConnection>) -> Channel {
    Channel::new(Arc::clone(connection) as Arc<dyn ConnectionLike>)
}

/// Runtime bound to context 7 of frame F1, without a loader.
pub fn runtime(connection: &Arc<MockConnection>) -> Runtime {
    Runtime::new(
        channel(connection),
        ExecutionContext::new(FrameId::new(FRAME_ID), ExecutionContextId(CONTEXT_ID)),
    )
}

/// Runtime whose loader wraps every node into an element of that runtime.
pub fn element_runtime(connection: &Arc<MockConnection>) -> Runtime {
    let runtime = runtime(connection);
    let owner = runtime.clone();

    runtime.set_loader(Arc::new(LoaderFn::new(move |_, _, _, id| {
        let runtime = owner.clone();
        async move { Ok::<_, Error>(Node::Element(ElementHandle::new(runtime, id))) }.boxed()
    })));

    runtime
}

/// Function source of a recorded `Runtime.callFunctionOn` call.
pub fn declaration(params: &Value) -> &str {
    params["functionDeclaration"].as_str().unwrap_or_default()
}

// Remote object descriptors

/// `Runtime.callFunctionOn` reply carrying a by-value result.
pub fn value_reply(value: Value) -> Value {
    let kind = match &value {
        Value::Null => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    };

    let mut result = json!({"type": kind, "value": value});
    if value.is_null() {
        result["subtype"] = json!("null");
    }

    json!({ "result": result })
}

/// Reply carrying `undefined`.
pub fn undefined_reply() -> Value {
    json!({"result": {"type": "undefined"}})
}

pub fn node_object(id: &str, class_name: &str) -> Value {
    json!({
        "type": "object",
        "subtype": "node",
        "className": class_name,
        "description": class_name,
        "objectId": id
    })
}

/// Reply carrying a reference to a DOM node.
pub fn node_reply(id: &str, class_name: &str) -> Value {
    json!({ "result": node_object(id, class_name) })
}

/// Reply carrying a reference to an array.
pub fn array_reply(id: &str) -> Value {
    json!({
        "result": {
            "type": "object",
            "subtype": "array",
            "className": "Array",
            "objectId": id
        }
    })
}

/// Reply reporting a thrown exception.
pub fn exception_reply(description: &str) -> Value {
    json!({
        "result": {"type": "object", "subtype": "error"},
        "exceptionDetails": {
            "exceptionId": 1,
            "text": "Uncaught",
            "lineNumber": 0,
            "columnNumber": 0,
            "exception": {
                "type": "object",
                "subtype": "error",
                "className": "Error",
                "description": description
            }
        }
    })
}

/// `Runtime.getProperties` entry.
pub fn property(name: &str, enumerable: bool, value: Value) -> Value {
    json!({
        "name": name,
        "enumerable": enumerable,
        "configurable": true,
        "isOwn": true,
        "value": value
    })
}

pub fn primitive(value: Value) -> Value {
    value_reply(value)["result"].clone()
}

/// `Page.getFrameTree` reply with one child frame per entry in `children`.
pub fn frame_tree_reply(root: &str, children: &[&str]) -> Value {
    let child_frames: Vec<Value> = children
        .iter()
        .map(|id| {
            json!({
                "frame": {
                    "id": id,
                    "parentId": root,
                    "url": format!("https://example.test/{}", id),
                    "mimeType": "text/html"
                }
            })
        })
        .collect();

    json!({
        "frameTree": {
            "frame": {
                "id": root,
                "url": "https://example.test/",
                "mimeType": "text/html"
            },
            "childFrames": child_frames
        }
    })
}
