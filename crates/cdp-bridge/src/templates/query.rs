// Selector queries and XPath evaluation

use super::{
    CSS_QUERY_ALL_FRAGMENT, CSS_QUERY_FRAGMENT, XPATH_QUERY_ALL_FRAGMENT, XPATH_QUERY_FRAGMENT,
    selector_variants,
};
use crate::dom::QuerySelector;
use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

/// Evaluates an arbitrary XPath expression and unwraps its typed result.
const XPATH: &str = "(el, expression) => {
    const doc = el.ownerDocument || el;
    const out = doc.evaluate(expression, el, null, XPathResult.ANY_TYPE, null);

    switch (out.resultType) {
        case XPathResult.NUMBER_TYPE:
            return out.numberValue;
        case XPathResult.STRING_TYPE:
            return out.stringValue;
        case XPathResult.BOOLEAN_TYPE:
            return out.booleanValue;
        case XPathResult.UNORDERED_NODE_ITERATOR_TYPE:
        case XPathResult.ORDERED_NODE_ITERATOR_TYPE: {
            const items = [];
            let node = out.iterateNext();

            while (node) {
                items.push(node);
                node = out.iterateNext();
            }

            return items;
        }
        default:
            return out.singleNodeValue || null;
    }
}";

fn by_selector(id: &RemoteObjectId, selector: &QuerySelector, all: bool, body: &str) -> Expression {
    let (css_query, xpath_query) = if all {
        (CSS_QUERY_ALL_FRAGMENT, XPATH_QUERY_ALL_FRAGMENT)
    } else {
        (CSS_QUERY_FRAGMENT, XPATH_QUERY_FRAGMENT)
    };
    let (css, xpath) = selector_variants("el, selector", css_query, xpath_query, &[body]);

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg_selector(selector)
}

/// First match under the element, or null.
pub fn query_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    by_selector(id, selector, false, "return found;")
}

pub fn query_selector_all(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    by_selector(id, selector, true, "return found;")
}

pub fn count_by_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    by_selector(id, selector, true, "return found.length;")
}

pub fn exists_by_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    by_selector(id, selector, false, "return found != null;")
}

pub fn xpath(id: &RemoteObjectId, expression: &str) -> Expression {
    Expression::new(XPATH).arg_ref(id.clone()).arg(expression)
}
