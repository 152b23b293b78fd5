use super::{CSS_QUERY_FRAGMENT, NOT_FOUND_FRAGMENT, XPATH_QUERY_FRAGMENT, selector_variants};
use crate::dom::QuerySelector;
use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

const FOCUS: &str = "(el) => {
    el.focus();
}";

const BLUR: &str = "(el) => {
    el.blur();
}";

fn by_selector(id: &RemoteObjectId, selector: &QuerySelector, call: &str) -> Expression {
    let (css, xpath) = selector_variants(
        "el, selector",
        CSS_QUERY_FRAGMENT,
        XPATH_QUERY_FRAGMENT,
        &[NOT_FOUND_FRAGMENT, call],
    );

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg_selector(selector)
}

pub fn focus(id: &RemoteObjectId) -> Expression {
    Expression::new(FOCUS).arg_ref(id.clone())
}

pub fn focus_by_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    by_selector(id, selector, "found.focus();")
}

pub fn blur(id: &RemoteObjectId) -> Expression {
    Expression::new(BLUR).arg_ref(id.clone())
}

pub fn blur_by_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    by_selector(id, selector, "found.blur();")
}
