// Attribute and node identity templates

use super::styles::{GET_STYLES, get_styles};
use crate::eval::Expression;
use crate::server::types::RemoteObjectId;
use std::collections::BTreeMap;

const GET_ATTRIBUTE: &str = "(el, name) => {
    return el.getAttribute(name);
}";

const SET_ATTRIBUTE: &str = "(el, name, value) => {
    el.setAttribute(name, value);
}";

const SET_ATTRIBUTES: &str = "(el, values) => {
    Object.keys(values).forEach((name) => {
        el.setAttribute(name, values[name]);
    });
}";

const REMOVE_ATTRIBUTES: &str = "(el, names) => {
    names.forEach((name) => el.removeAttribute(name));
}";

const GET_NODE_TYPE: &str = "(el) => el.nodeType";

const GET_NODE_NAME: &str = "(el) => el.nodeName";

/// Reads one attribute; `style` is returned as a parsed style map.
pub fn get_attribute(id: &RemoteObjectId, name: &str) -> Expression {
    if name == "style" {
        return get_styles(id);
    }

    Expression::new(GET_ATTRIBUTE).arg_ref(id.clone()).arg(name)
}

/// Reads all attributes into an object keyed by attribute name.
pub fn get_attributes(id: &RemoteObjectId) -> Expression {
    let source = [
        "(element) => {\n    const getStyles = ",
        GET_STYLES,
        ";

    return element.getAttributeNames().reduce((out, name) => {
        out[name] = name !== 'style' ? element.getAttribute(name) : getStyles(element);

        return out;
    }, {});
}",
    ]
    .concat();

    Expression::new(source).arg_ref(id.clone())
}

pub fn set_attribute(id: &RemoteObjectId, name: &str, value: &str) -> Expression {
    Expression::new(SET_ATTRIBUTE)
        .arg_ref(id.clone())
        .arg(name)
        .arg(value)
}

pub fn set_attributes(id: &RemoteObjectId, values: &BTreeMap<String, String>) -> Expression {
    Expression::new(SET_ATTRIBUTES).arg_ref(id.clone()).arg(values)
}

pub fn remove_attribute(id: &RemoteObjectId, name: &str) -> Expression {
    remove_attributes(id, &[name])
}

pub fn remove_attributes(id: &RemoteObjectId, names: &[&str]) -> Expression {
    Expression::new(REMOVE_ATTRIBUTES)
        .arg_ref(id.clone())
        .arg(names)
}

pub fn get_node_type(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_NODE_TYPE).arg_ref(id.clone())
}

pub fn get_node_name(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_NODE_NAME).arg_ref(id.clone())
}
