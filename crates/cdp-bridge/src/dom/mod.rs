//! Node handles
//!
//! [`ElementHandle`] and [`DocumentHandle`] wrap remote DOM references and
//! expose DOM operations as async methods. Each operation builds a template
//! [`Expression`](crate::eval::Expression) and runs it through the frame's
//! [`Runtime`](crate::eval::Runtime).
//!
//! Handles do not cache structure: parents, children and frames are looked up
//! again on every call.

mod document;
mod element;
mod frames;
mod lazy;
mod loader;
mod selector;

pub use document::{DOCUMENT_NODE, DOCUMENT_NODE_NAME, DocumentHandle, FrameInfo};
pub use element::ElementHandle;
pub use frames::{FrameRegistry, FrameStore};
pub use lazy::LazyValue;
pub use loader::NodeLoader;
pub use selector::{QuerySelector, SelectorKind};

use crate::server::types::RemoteObjectId;
use tokio_util::sync::CancellationToken;

/// A loaded DOM node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementHandle),
    Document(DocumentHandle),
}

impl Node {
    pub fn remote_id(&self) -> &RemoteObjectId {
        match self {
            Node::Element(element) => element.remote_id(),
            Node::Document(document) => document.remote_id(),
        }
    }

    pub fn as_element(&self) -> &ElementHandle {
        match self {
            Node::Element(element) => element,
            Node::Document(document) => document.element(),
        }
    }

    pub fn as_document(&self) -> Option<&DocumentHandle> {
        match self {
            Node::Document(document) => Some(document),
            Node::Element(_) => None,
        }
    }

    /// Element view of the node; a document yields its document element
    /// handle.
    pub fn into_element(self) -> ElementHandle {
        match self {
            Node::Element(element) => element,
            Node::Document(document) => document.element().clone(),
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Node::Document(_))
    }

    /// Rebinds the node to `token`; see [`ElementHandle::with_cancellation`].
    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        match self {
            Node::Element(element) => Node::Element(element.with_cancellation(token)),
            Node::Document(document) => Node::Document(document.with_cancellation(token)),
        }
    }
}

impl From<ElementHandle> for Node {
    fn from(element: ElementHandle) -> Self {
        Node::Element(element)
    }
}

impl From<DocumentHandle> for Node {
    fn from(document: DocumentHandle) -> Self {
        Node::Document(document)
    }
}
