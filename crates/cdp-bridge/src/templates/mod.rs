//! Expression templates
//!
//! Pure functions that build [`Expression`]s for DOM operations. Every element
//! template takes the element's remote id as its first argument. Selector-aware
//! templates come in a CSS and an XPath flavour; exactly one is picked from the
//! selector kind.
//!
//! Templates that need a single match throw [`NOT_FOUND_MARKER`] when nothing
//! matches, which the runtime reports as [`Error::NotFound`].
//!
//! [`Expression`]: crate::eval::Expression
//! [`NOT_FOUND_MARKER`]: crate::error::NOT_FOUND_MARKER
//! [`Error::NotFound`]: crate::Error::NotFound

mod attributes;
mod children;
mod document;
mod focus;
mod inner_html;
mod inner_text;
mod query;
mod relatives;
mod select;
mod styles;
mod value;
mod wait;

pub use attributes::*;
pub use children::*;
pub use document::*;
pub use focus::*;
pub use inner_html::*;
pub use inner_text::*;
pub use query::*;
pub use relatives::*;
pub use select::*;
pub use styles::*;
pub use value::*;
pub use wait::*;

/// Throws the not-found marker when `found` is nullish.
pub(crate) const NOT_FOUND_FRAGMENT: &str = "
    if (found == null) {
        throw new Error(`element(s) not found`);
    }
";

/// Binds `found` to the first CSS match under `el`.
pub(crate) const CSS_QUERY_FRAGMENT: &str = "const found = el.querySelector(selector);";

/// Binds `found` to an array of CSS matches under `el`.
pub(crate) const CSS_QUERY_ALL_FRAGMENT: &str =
    "const found = Array.from(el.querySelectorAll(selector));";

/// Binds `found` to the first node matched by the XPath `selector`, or null.
pub(crate) const XPATH_QUERY_FRAGMENT: &str = "
    const found = (() => {
        const doc = el.ownerDocument || el;
        const out = doc.evaluate(selector, el, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null);

        return out.singleNodeValue;
    })();
";

/// Binds `found` to an array of nodes matched by the XPath `selector`.
pub(crate) const XPATH_QUERY_ALL_FRAGMENT: &str = "
    const found = (() => {
        const doc = el.ownerDocument || el;
        const out = doc.evaluate(selector, el, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        const items = [];

        for (let i = 0; i < out.snapshotLength; i++) {
            items.push(out.snapshotItem(i));
        }

        return items;
    })();
";

/// Wraps a function body: `(params) => { body }`.
pub(crate) fn function(params: &str, body: &[&str]) -> String {
    let mut out = String::with_capacity(64 + body.iter().map(|s| s.len()).sum::<usize>());
    out.push('(');
    out.push_str(params);
    out.push_str(") => {\n");
    for part in body {
        out.push_str("    ");
        out.push_str(part);
        out.push('\n');
    }
    out.push('}');
    out
}

/// Renders a selector-aware function for both selector kinds.
///
/// `css_query` and `xpath_query` bind `found`; `body` runs afterwards.
pub(crate) fn selector_variants(
    params: &str,
    css_query: &str,
    xpath_query: &str,
    body: &[&str],
) -> (String, String) {
    let css: Vec<&str> = std::iter::once(css_query).chain(body.iter().copied()).collect();
    let xpath: Vec<&str> = std::iter::once(xpath_query)
        .chain(body.iter().copied())
        .collect();

    (function(params, &css), function(params, &xpath))
}
