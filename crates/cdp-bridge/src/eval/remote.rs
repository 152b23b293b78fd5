// Classification of remote result descriptors
//
// The protocol reports a declared type, an optional subtype hint and an
// optional class name for every value. The resolver and loaders branch on the
// enums below instead of comparing raw strings.

use crate::server::types::RemoteObject;
use std::fmt;

/// Object subtype hint, with `undefined` folded in as a null-like kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteObjectType {
    /// `subtype: "null"`
    Null,
    /// `type: "undefined"`
    Undefined,
    Array,
    /// A DOM node of any kind (element, document, text, ...)
    Node,
    /// Any other subtype reported by the target (`date`, `map`, `error`, ...)
    Other(String),
    /// No subtype reported
    Unknown,
}

impl RemoteObjectType {
    pub fn of(remote: &RemoteObject) -> Self {
        if remote.kind == "undefined" {
            return RemoteObjectType::Undefined;
        }

        match remote.subtype.as_deref() {
            Some("null") => RemoteObjectType::Null,
            Some("array") => RemoteObjectType::Array,
            Some("node") => RemoteObjectType::Node,
            Some(other) => RemoteObjectType::Other(other.to_string()),
            None => RemoteObjectType::Unknown,
        }
    }

    /// True for `null` and `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, RemoteObjectType::Null | RemoteObjectType::Undefined)
    }
}

impl fmt::Display for RemoteObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteObjectType::Null => f.write_str("null"),
            RemoteObjectType::Undefined => f.write_str("undefined"),
            RemoteObjectType::Array => f.write_str("array"),
            RemoteObjectType::Node => f.write_str("node"),
            RemoteObjectType::Other(s) => f.write_str(s),
            RemoteObjectType::Unknown => f.write_str("unknown"),
        }
    }
}

/// Constructor name of a remote object, e.g. `HTMLDocument` or `HTMLDivElement`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RemoteClassName(Option<String>);

impl RemoteClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    pub fn of(remote: &RemoteObject) -> Self {
        Self(remote.class_name.clone())
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True when the class names a document node (`Document`, `HTMLDocument`, `XMLDocument`).
    pub fn is_document(&self) -> bool {
        self.as_str().is_some_and(|name| name.ends_with("Document"))
    }
}
