// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// DocumentHandle - the document node of one frame
//
// Wraps the document's ElementHandle with frame metadata. Parent and child
// documents are never stored; they are looked up through the frame registry
// every time, so a document whose frame navigated away simply stops resolving.

use crate::dom::element::ElementHandle;
use crate::dom::frames::FrameRegistry;
use crate::dom::lazy::LazyValue;
use crate::dom::selector::QuerySelector;
use crate::error::{Error, Result};
use crate::eval::{Runtime, Value};
use crate::events::{WaitEvent, WaitOptions, wait_for};
use crate::server::types::{Frame, FrameId, FrameTree, RemoteObjectId};
use crate::templates;
use futures_util::FutureExt;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;
use url::Url;

/// DOM `nodeType` of a document.
pub const DOCUMENT_NODE: i64 = 9;

/// DOM `nodeName` of a document.
pub const DOCUMENT_NODE_NAME: &str = "#document";

/// Frame metadata captured when the document was loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub id: FrameId,
    pub parent_id: Option<FrameId>,
    pub url: String,
    pub name: Option<String>,
}

impl From<&Frame> for FrameInfo {
    fn from(frame: &Frame) -> Self {
        Self {
            id: frame.id.clone(),
            parent_id: frame.parent_id.clone(),
            url: frame.url.clone(),
            name: frame.name.clone(),
        }
    }
}

/// Handle to a frame's document
///
/// Node type and node name are known without a round trip. Everything else
/// either delegates to the underlying [`ElementHandle`] or evaluates a
/// document template in the frame's runtime.
#[derive(Clone)]
pub struct DocumentHandle {
    inner: Arc<DocumentInner>,
}

struct DocumentInner {
    element: ElementHandle,
    frame: FrameInfo,
    child_frames: Arc<LazyValue<Vec<FrameId>>>,
    registry: Weak<dyn FrameRegistry>,
}

impl DocumentHandle {
    /// Creates a document handle.
    ///
    /// When `child_frames` is `None` the child frame ids are discovered on
    /// first use from `Page.getFrameTree`.
    pub fn new(
        element: ElementHandle,
        frame: FrameInfo,
        child_frames: Option<Vec<FrameId>>,
        registry: Weak<dyn FrameRegistry>,
    ) -> Self {
        let child_frames = match child_frames {
            Some(ids) => LazyValue::ready(ids),
            None => {
                let channel = element.runtime().channel().clone();
                let frame_id = frame.id.clone();
                LazyValue::new(move || {
                    let channel = channel.clone();
                    let frame_id = frame_id.clone();
                    async move {
                        let tree = channel.get_frame_tree().await?;
                        Ok(find_frame(&tree, &frame_id)
                            .map(child_frame_ids)
                            .unwrap_or_default())
                    }
                    .boxed()
                })
            }
        };

        Self {
            inner: Arc::new(DocumentInner {
                element,
                frame,
                child_frames: Arc::new(child_frames),
                registry,
            }),
        }
    }

    /// Creates a handle for the frame at the root of `tree`.
    pub fn from_frame_tree(
        element: ElementHandle,
        tree: &FrameTree,
        registry: Weak<dyn FrameRegistry>,
    ) -> Self {
        Self::new(
            element,
            FrameInfo::from(&tree.frame),
            Some(child_frame_ids(tree)),
            registry,
        )
    }

    /// Another handle to a document of the same frame, for a different
    /// remote reference.
    pub(crate) fn with_element(&self, element: ElementHandle) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                element,
                frame: self.inner.frame.clone(),
                child_frames: Arc::clone(&self.inner.child_frames),
                registry: self.inner.registry.clone(),
            }),
        }
    }

    /// Same document with its calls scoped to `token`.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        self.with_element(self.inner.element.with_cancellation(token))
    }

    pub fn element(&self) -> &ElementHandle {
        &self.inner.element
    }

    pub fn remote_id(&self) -> &RemoteObjectId {
        self.inner.element.remote_id()
    }

    pub fn runtime(&self) -> &Runtime {
        self.inner.element.runtime()
    }

    pub fn frame(&self) -> &FrameInfo {
        &self.inner.frame
    }

    pub fn frame_id(&self) -> &FrameId {
        &self.inner.frame.id
    }

    pub fn parent_frame_id(&self) -> Option<&FrameId> {
        self.inner.frame.parent_id.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.frame.name.as_deref()
    }

    /// URL recorded when the frame was loaded.
    pub fn url(&self) -> &str {
        &self.inner.frame.url
    }

    pub fn node_type(&self) -> i64 {
        DOCUMENT_NODE
    }

    pub fn node_name(&self) -> &'static str {
        DOCUMENT_NODE_NAME
    }

    pub async fn title(&self) -> Result<String> {
        let out = self
            .runtime()
            .eval_value(&templates::get_title())
            .await?;
        Ok(out.to_text())
    }

    /// Current `window.location` of the frame.
    pub async fn live_url(&self) -> Result<Url> {
        let out = self.runtime().eval_value(&templates::get_url()).await?;
        let raw = out.to_text();

        Url::parse(&raw).map_err(|e| Error::Protocol(format!("Invalid document URL '{}': {}", raw, e)))
    }

    pub async fn wait_for_dom_ready(&self, options: Option<WaitOptions>) -> Result<()> {
        wait_for(self.runtime(), templates::dom_ready(), options).await?;
        Ok(())
    }

    fn registry(&self) -> Result<Arc<dyn FrameRegistry>> {
        self.inner
            .registry
            .upgrade()
            .ok_or_else(|| Error::Detached(format!("frame registry of {}", self.frame_id())))
    }

    /// Document of the parent frame, if any and still registered.
    pub async fn parent_document(&self) -> Result<Option<DocumentHandle>> {
        let Some(parent_id) = self.parent_frame_id() else {
            return Ok(None);
        };

        self.registry()?.resolve_frame(parent_id).await
    }

    pub async fn child_frame_ids(&self) -> Result<Vec<FrameId>> {
        self.inner.child_frames.read().await
    }

    /// Documents of the child frames that are currently registered.
    pub async fn child_documents(&self) -> Result<Vec<DocumentHandle>> {
        let ids = self.child_frame_ids().await?;
        let registry = self.registry()?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in &ids {
            match registry.resolve_frame(id).await? {
                Some(document) => documents.push(document),
                None => tracing::debug!(frame_id = %id, "Child frame is not registered"),
            }
        }

        Ok(documents)
    }

    // Element delegates

    pub async fn length(&self) -> Result<usize> {
        self.inner.element.length().await
    }

    pub async fn children(&self) -> Result<Vec<ElementHandle>> {
        self.inner.element.children().await
    }

    pub async fn child(&self, index: usize) -> Result<Option<ElementHandle>> {
        self.inner.element.child(index).await
    }

    pub async fn query_selector(&self, selector: &QuerySelector) -> Result<Option<ElementHandle>> {
        self.inner.element.query_selector(selector).await
    }

    pub async fn query_selector_all(&self, selector: &QuerySelector) -> Result<Vec<ElementHandle>> {
        self.inner.element.query_selector_all(selector).await
    }

    pub async fn count_by_selector(&self, selector: &QuerySelector) -> Result<usize> {
        self.inner.element.count_by_selector(selector).await
    }

    pub async fn exists_by_selector(&self, selector: &QuerySelector) -> Result<bool> {
        self.inner.element.exists_by_selector(selector).await
    }

    pub async fn xpath(&self, expression: &str) -> Result<Value> {
        self.inner.element.xpath(expression).await
    }

    pub async fn inner_text(&self) -> Result<String> {
        self.inner.element.inner_text().await
    }

    pub async fn inner_text_by_selector(&self, selector: &QuerySelector) -> Result<String> {
        self.inner.element.inner_text_by_selector(selector).await
    }

    pub async fn inner_text_by_selector_all(&self, selector: &QuerySelector) -> Result<Vec<String>> {
        self.inner.element.inner_text_by_selector_all(selector).await
    }

    pub async fn inner_html(&self) -> Result<String> {
        self.inner.element.inner_html().await
    }

    pub async fn inner_html_by_selector(&self, selector: &QuerySelector) -> Result<String> {
        self.inner.element.inner_html_by_selector(selector).await
    }

    pub async fn inner_html_by_selector_all(&self, selector: &QuerySelector) -> Result<Vec<String>> {
        self.inner.element.inner_html_by_selector_all(selector).await
    }

    pub async fn focus_by_selector(&self, selector: &QuerySelector) -> Result<()> {
        self.inner.element.focus_by_selector(selector).await
    }

    pub async fn blur_by_selector(&self, selector: &QuerySelector) -> Result<()> {
        self.inner.element.blur_by_selector(selector).await
    }

    pub async fn select_by_selector(
        &self,
        selector: &QuerySelector,
        values: &[String],
    ) -> Result<Vec<String>> {
        self.inner.element.select_by_selector(selector, values).await
    }

    // Document waits

    pub async fn wait_for_element(
        &self,
        selector: &QuerySelector,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_element(selector, when, options)
            .await
    }

    pub async fn wait_for_element_all(
        &self,
        selector: &QuerySelector,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_element_all(selector, when, options)
            .await
    }

    pub async fn wait_for_class_by_selector(
        &self,
        selector: &QuerySelector,
        class: &str,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_class_by_selector(selector, class, when, options)
            .await
    }

    pub async fn wait_for_class_by_selector_all(
        &self,
        selector: &QuerySelector,
        class: &str,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_class_by_selector_all(selector, class, when, options)
            .await
    }

    pub async fn wait_for_attribute_by_selector(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_attribute_by_selector(selector, name, value, when, options)
            .await
    }

    pub async fn wait_for_attribute_by_selector_all(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_attribute_by_selector_all(selector, name, value, when, options)
            .await
    }

    pub async fn wait_for_style_by_selector(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_style_by_selector(selector, name, value, when, options)
            .await
    }

    pub async fn wait_for_style_by_selector_all(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.inner
            .element
            .wait_for_style_by_selector_all(selector, name, value, when, options)
            .await
    }
}

impl PartialEq for DocumentHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.element == other.inner.element
    }
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("id", self.remote_id())
            .field("frame", &self.inner.frame)
            .finish()
    }
}

fn child_frame_ids(tree: &FrameTree) -> Vec<FrameId> {
    tree.child_frames
        .iter()
        .map(|child| child.frame.id.clone())
        .collect()
}

fn find_frame<'a>(tree: &'a FrameTree, frame_id: &FrameId) -> Option<&'a FrameTree> {
    if &tree.frame.id == frame_id {
        return Some(tree);
    }

    tree.child_frames
        .iter()
        .find_map(|child| find_frame(child, frame_id))
}
