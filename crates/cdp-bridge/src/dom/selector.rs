use std::fmt;

/// Kind of a [`QuerySelector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectorKind {
    #[default]
    Css,
    XPath,
}

/// A selector plus its kind
///
/// The kind decides which of two expression templates is used.
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::dom::QuerySelector;
///
/// let heading = QuerySelector::css("h1.title");
/// let rows = QuerySelector::xpath("//table//tr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySelector {
    kind: SelectorKind,
    value: String,
}

impl QuerySelector {
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::XPath, value)
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_css(&self) -> bool {
        self.kind == SelectorKind::Css
    }
}

impl fmt::Display for QuerySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::Css => write!(f, "css={}", self.value),
            SelectorKind::XPath => write!(f, "xpath={}", self.value),
        }
    }
}

impl From<&str> for QuerySelector {
    fn from(value: &str) -> Self {
        Self::css(value)
    }
}
