// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Frame registry - frame id to DocumentHandle lookup
//
// Documents and node loaders hold the registry weakly. The registry owns the
// documents, the documents own their runtimes, and nothing points back up.

use crate::dom::document::DocumentHandle;
use crate::dom::element::ElementHandle;
use crate::dom::loader::NodeLoader;
use crate::error::{Error, Result};
use crate::eval::Runtime;
use crate::server::channel::Channel;
use crate::server::types::{FrameId, FrameTree};
use crate::templates;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Resolves a frame id to the document currently loaded in that frame
#[async_trait]
pub trait FrameRegistry: Send + Sync {
    /// Returns `None` when the frame is unknown, for example after it
    /// navigated away or was detached.
    async fn resolve_frame(&self, frame_id: &FrameId) -> Result<Option<DocumentHandle>>;
}

/// In-memory [`FrameRegistry`]
///
/// Populated explicitly with [`register`](FrameStore::register) or from the
/// live page with [`load_frame_tree`](FrameStore::load_frame_tree).
pub struct FrameStore {
    channel: Channel,
    frames: RwLock<HashMap<FrameId, DocumentHandle>>,
    this: Weak<FrameStore>,
}

impl FrameStore {
    pub fn new(channel: Channel) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            channel,
            frames: RwLock::new(HashMap::new()),
            this: this.clone(),
        })
    }

    /// Weak handle to hand out to documents and loaders.
    pub fn registry(&self) -> Weak<dyn FrameRegistry> {
        self.this.clone()
    }

    /// Node loader that resolves nodes through this store.
    pub fn loader(&self) -> Arc<NodeLoader> {
        Arc::new(NodeLoader::new(self.registry()))
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Registers `document` under its frame id, replacing any previous one.
    pub fn register(&self, document: DocumentHandle) -> Option<DocumentHandle> {
        tracing::debug!(frame_id = %document.frame_id(), "Registering frame document");
        self.frames
            .write()
            .insert(document.frame_id().clone(), document)
    }

    pub fn remove(&self, frame_id: &FrameId) -> Option<DocumentHandle> {
        self.frames.write().remove(frame_id)
    }

    pub fn clear(&self) {
        self.frames.write().clear();
    }

    pub fn get(&self, frame_id: &FrameId) -> Option<DocumentHandle> {
        self.frames.read().get(frame_id).cloned()
    }

    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.frames.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.read().is_empty()
    }

    /// Loads and registers the document of the frame at the root of `tree`.
    ///
    /// Creates an isolated world for the frame, installs a [`NodeLoader`] on
    /// its runtime and fetches a reference to `document`.
    pub async fn load_document(&self, tree: &FrameTree) -> Result<DocumentHandle> {
        let frame_id = tree.frame.id.clone();

        let runtime = Runtime::create(self.channel.clone(), frame_id.clone()).await?;
        runtime.set_loader(self.loader());

        let out = runtime
            .eval_ref(&templates::get_document())
            .await
            .map_err(|e| e.context(format!("Failed to load document of frame {}", frame_id)))?;

        let id = out
            .object_id
            .ok_or_else(|| Error::Protocol(format!("Document of frame {} has no object id", frame_id)))?;

        let document =
            DocumentHandle::from_frame_tree(ElementHandle::new(runtime, id), tree, self.registry());

        self.register(document.clone());
        Ok(document)
    }

    /// Loads every frame of the page and returns the main frame's document.
    pub async fn load_frame_tree(&self) -> Result<DocumentHandle> {
        let tree = self.channel.get_frame_tree().await?;
        let root = self.load_document(&tree).await?;

        let mut pending: Vec<&FrameTree> = tree.child_frames.iter().collect();
        while let Some(frame) = pending.pop() {
            self.load_document(frame).await?;
            pending.extend(frame.child_frames.iter());
        }

        Ok(root)
    }
}

#[async_trait]
impl FrameRegistry for FrameStore {
    async fn resolve_frame(&self, frame_id: &FrameId) -> Result<Option<DocumentHandle>> {
        Ok(self.get(frame_id))
    }
}

impl std::fmt::Debug for FrameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStore")
            .field("frames", &self.frame_ids())
            .finish()
    }
}
