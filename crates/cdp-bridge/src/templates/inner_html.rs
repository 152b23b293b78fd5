use super::inner_text::{
    get_property, get_property_by_selector, get_property_by_selector_all, set_property,
    set_property_by_selector,
};
use crate::dom::QuerySelector;
use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

const INNER_HTML: &str = "innerHTML";

pub fn get_inner_html(id: &RemoteObjectId) -> Expression {
    get_property(id, INNER_HTML)
}

pub fn set_inner_html(id: &RemoteObjectId, value: &str) -> Expression {
    set_property(id, INNER_HTML, value)
}

pub fn get_inner_html_by_selector(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    get_property_by_selector(id, selector, INNER_HTML)
}

pub fn set_inner_html_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    value: &str,
) -> Expression {
    set_property_by_selector(id, selector, INNER_HTML, value)
}

pub fn get_inner_html_by_selector_all(id: &RemoteObjectId, selector: &QuerySelector) -> Expression {
    get_property_by_selector_all(id, selector, INNER_HTML)
}
