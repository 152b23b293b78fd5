// Node loader
//
// Turns a remote node reference into a handle. The runtime is looked up
// through the frame registry, so loaders do not keep runtimes alive.

use crate::dom::Node;
use crate::dom::element::ElementHandle;
use crate::dom::frames::FrameRegistry;
use crate::error::{Error, Result};
use crate::eval::{Loader, RemoteClassName, RemoteObjectType};
use crate::server::types::{FrameId, RemoteObjectId};
use async_trait::async_trait;
use std::sync::Weak;

/// [`Loader`] backed by a [`FrameRegistry`]
///
/// Document objects (class name ending in `Document`) load as
/// [`Node::Document`] sharing the frame metadata of the registered document;
/// everything else loads as [`Node::Element`]. Handles are built on the
/// registered document's runtime; the resolver then moves them onto the
/// cancellation token of the runtime that produced the reference.
pub struct NodeLoader {
    registry: Weak<dyn FrameRegistry>,
}

impl NodeLoader {
    pub fn new(registry: Weak<dyn FrameRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Loader for NodeLoader {
    async fn load(
        &self,
        frame_id: &FrameId,
        object_type: RemoteObjectType,
        class_name: RemoteClassName,
        id: &RemoteObjectId,
    ) -> Result<Node> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| Error::Detached(format!("frame registry of {}", frame_id)))?;

        let document = registry
            .resolve_frame(frame_id)
            .await?
            .ok_or_else(|| Error::Detached(format!("frame {} is not registered", frame_id)))?;

        tracing::trace!(
            frame_id = %frame_id,
            object_id = %id,
            object_type = %object_type,
            class_name = class_name.as_str().unwrap_or_default(),
            "Loading node"
        );

        let element = ElementHandle::new(document.runtime().clone(), id.clone());

        if class_name.is_document() {
            if document.remote_id() == id {
                return Ok(Node::Document(document));
            }
            return Ok(Node::Document(document.with_element(element)));
        }

        Ok(Node::Element(element))
    }
}

impl std::fmt::Debug for NodeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeLoader")
            .field("attached", &(self.registry.strong_count() > 0))
            .finish()
    }
}
