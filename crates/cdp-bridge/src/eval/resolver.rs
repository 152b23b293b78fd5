// Value resolver
//
// Turns raw result descriptors into local values. Arrays are resolved
// recursively through `Runtime.getProperties`; DOM nodes are handed to the
// configured Loader, which knows how to build node handles.

use crate::dom::Node;
use crate::error::{Error, Result};
use crate::eval::exception;
use crate::eval::remote::{RemoteClassName, RemoteObjectType};
use crate::eval::value::Value;
use crate::server::channel::Channel;
use crate::server::types::{FrameId, RemoteObject, RemoteObjectId};
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::RwLock;
use std::sync::Arc;

/// Materializes DOM node descriptors into local node handles
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(
        &self,
        frame_id: &FrameId,
        object_type: RemoteObjectType,
        class_name: RemoteClassName,
        id: &RemoteObjectId,
    ) -> Result<Node>;
}

/// Adapts a closure into a [`Loader`]
///
/// ```ignore
/// let loader = LoaderFn::new(|frame_id, _, _, id| {
///     async move { build_node(frame_id, id).await }.boxed()
/// });
/// runtime.set_loader(Arc::new(loader));
/// ```
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(FrameId, RemoteObjectType, RemoteClassName, RemoteObjectId) -> BoxFuture<'static, Result<Node>>
        + Send
        + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(FrameId, RemoteObjectType, RemoteClassName, RemoteObjectId) -> BoxFuture<'static, Result<Node>>
        + Send
        + Sync,
{
    async fn load(
        &self,
        frame_id: &FrameId,
        object_type: RemoteObjectType,
        class_name: RemoteClassName,
        id: &RemoteObjectId,
    ) -> Result<Node> {
        (self.0)(frame_id.clone(), object_type, class_name, id.clone()).await
    }
}

type LoaderSlot = Arc<RwLock<Option<Arc<dyn Loader>>>>;

/// Resolves remote results produced in one frame
///
/// Clones share the loader slot, so a loader installed after construction is
/// visible to every clone.
#[derive(Clone)]
pub struct Resolver {
    channel: Channel,
    frame_id: FrameId,
    loader: LoaderSlot,
}

impl Resolver {
    pub fn new(channel: Channel, frame_id: FrameId) -> Self {
        Self {
            channel,
            frame_id,
            loader: Arc::new(RwLock::new(None)),
        }
    }

    pub(crate) fn with_channel(&self, channel: Channel) -> Self {
        Self {
            channel,
            frame_id: self.frame_id.clone(),
            loader: Arc::clone(&self.loader),
        }
    }

    pub fn frame_id(&self) -> &FrameId {
        &self.frame_id
    }

    pub fn set_loader(&self, loader: Arc<dyn Loader>) -> &Self {
        *self.loader.write() = Some(loader);
        self
    }

    pub fn has_loader(&self) -> bool {
        self.loader.read().is_some()
    }

    /// Resolves a result descriptor into a local value.
    pub async fn to_value(&self, remote: &RemoteObject) -> Result<Value> {
        self.resolve(remote).await
    }

    /// Resolves a descriptor that must reference a remote node.
    pub async fn to_element(&self, remote: &RemoteObject) -> Result<Node> {
        let id = remote
            .object_id
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("ref id".to_string()))?;

        self.load(
            RemoteObjectType::of(remote),
            RemoteClassName::of(remote),
            id,
        )
        .await
    }

    /// Reads one named property of a remote object.
    ///
    /// A missing or valueless property resolves to [`Value::None`].
    pub async fn to_property(&self, id: &RemoteObjectId, name: &str) -> Result<Value> {
        let props = self.channel.get_properties(id, false).await?;
        exception::check(props.exception_details.as_ref())?;

        match props.result.iter().find(|p| p.name == name) {
            Some(prop) => match &prop.value {
                Some(value) => self.resolve(value).await,
                None => Ok(Value::None),
            },
            None => Ok(Value::None),
        }
    }

    /// Reads every property value of a remote object, in enumeration order.
    pub async fn to_properties(&self, id: &RemoteObjectId) -> Result<Vec<Value>> {
        let props = self.channel.get_properties(id, false).await?;
        exception::check(props.exception_details.as_ref())?;

        let mut out = Vec::with_capacity(props.result.len());

        for prop in &props.result {
            if let Some(value) = &prop.value {
                out.push(self.resolve(value).await?);
            }
        }

        Ok(out)
    }

    fn resolve<'a>(&'a self, remote: &'a RemoteObject) -> BoxFuture<'a, Result<Value>> {
        async move {
            // Plain value, not an actual reference
            let Some(id) = &remote.object_id else {
                return Ok(decode_inline(remote));
            };

            match RemoteObjectType::of(remote) {
                RemoteObjectType::Null | RemoteObjectType::Undefined => Ok(Value::None),
                RemoteObjectType::Array => self.resolve_array(id).await,
                object_type @ RemoteObjectType::Node => {
                    let node = self
                        .load(object_type, RemoteClassName::of(remote), id)
                        .await?;
                    Ok(Value::Node(node))
                }
                _ => Ok(decode_inline(remote)),
            }
        }
        .boxed()
    }

    async fn resolve_array(&self, id: &RemoteObjectId) -> Result<Value> {
        let props = self.channel.get_properties(id, true).await?;
        exception::check(props.exception_details.as_ref())?;

        let mut items = Vec::with_capacity(props.result.len());

        for prop in &props.result {
            // `length` and other non-index properties are not enumerable
            if !prop.enumerable {
                continue;
            }

            if let Some(value) = &prop.value {
                items.push(self.resolve(value).await?);
            }
        }

        Ok(Value::Array(items))
    }

    async fn load(
        &self,
        object_type: RemoteObjectType,
        class_name: RemoteClassName,
        id: &RemoteObjectId,
    ) -> Result<Node> {
        let loader = self
            .loader
            .read()
            .clone()
            .ok_or_else(|| Error::NotImplemented("value loader".to_string()))?;

        tracing::trace!(
            frame_id = %self.frame_id,
            object_id = %id,
            object_type = %object_type,
            class_name = class_name.as_str().unwrap_or_default(),
            "Loading node"
        );

        // Loaders may build on another runtime of the frame; the node keeps
        // the caller's cancellation scope
        let node = loader.load(&self.frame_id, object_type, class_name, id).await?;
        Ok(node.with_cancellation(self.channel.cancellation().clone()))
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("frame_id", &self.frame_id)
            .field("has_loader", &self.has_loader())
            .finish()
    }
}

fn decode_inline(remote: &RemoteObject) -> Value {
    if let Some(value) = &remote.value {
        return Value::from_json(value.clone());
    }

    if let Some(raw) = &remote.unserializable_value {
        return Value::from_unserializable(raw);
    }

    Value::None
}
