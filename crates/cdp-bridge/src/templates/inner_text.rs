// innerText templates
//
// The property accessors are shared with the innerHTML templates; only the
// property name differs.

use super::{
    CSS_QUERY_ALL_FRAGMENT, CSS_QUERY_FRAGMENT, NOT_FOUND_FRAGMENT, XPATH_QUERY_ALL_FRAGMENT,
    XPATH_QUERY_FRAGMENT, function, selector_variants,
};
use crate::dom::QuerySelector;
use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

const INNER_TEXT: &str = "innerText";

pub(crate) fn get_property(id: &RemoteObjectId, prop: &str) -> Expression {
    // Documents read from their root element
    let body = [
        format!("if (el.nodeType !== 9) {{ return el.{prop}; }}"),
        format!("return el.documentElement.{prop};"),
    ];
    let body: Vec<&str> = body.iter().map(String::as_str).collect();

    Expression::new(function("el", &body)).arg_ref(id.clone())
}

pub(crate) fn set_property(id: &RemoteObjectId, prop: &str, value: &str) -> Expression {
    let body = [
        "const target = el.nodeType !== 9 ? el : el.documentElement;".to_string(),
        format!("target.{prop} = value;"),
    ];
    let body: Vec<&str> = body.iter().map(String::as_str).collect();

    Expression::new(function("el, value", &body))
        .arg_ref(id.clone())
        .arg(value)
}

pub(crate) fn get_property_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    prop: &str,
) -> Expression {
    let read = format!("return found.{prop};");
    let (css, xpath) = selector_variants(
        "el, selector",
        CSS_QUERY_FRAGMENT,
        XPATH_QUERY_FRAGMENT,
        &[NOT_FOUND_FRAGMENT, read.as_str()],
    );

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg_selector(selector)
}

pub(crate) fn set_property_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    prop: &str,
    value: &str,
) -> Expression {
    let write = format!("found.{prop} = value;");
    let (css, xpath) = selector_variants(
        "el, selector, value",
        CSS_QUERY_FRAGMENT,
        XPATH_QUERY_FRAGMENT,
        &[NOT_FOUND_FRAGMENT, write.as_str()],
    );

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg_selector(selector)
        .arg(value)
}

pub(crate) fn get_property_by_selector_all(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    prop: &str,
) -> Expression {
    let read = format!("return found.map((i) => i.{prop});");
    let (css, xpath) = selector_variants(
        "el, selector",
        CSS_QUERY_ALL_FRAGMENT,
        XPATH_QUERY_ALL_FRAGMENT,
        &[NOT_FOUND_FRAGMENT, read.as_str()],
    );

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg_selector(selector)
}

pub fn get_inner_text(id: &RemoteObjectId) -> Expression {
    get_property(id, INNER_TEXT)
}

pub fn set_inner_text(id: &RemoteObjectId, value: &str) -> Expression {
    set_property(id, INNER_TEXT, value)
}

pub fn get_inner_text_by_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    get_property_by_selector(id, selector, INNER_TEXT)
}

pub fn set_inner_text_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    value: &str,
) -> Expression {
    set_property_by_selector(id, selector, INNER_TEXT, value)
}

pub fn get_inner_text_by_selector_all(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    get_property_by_selector_all(id, selector, INNER_TEXT)
}
