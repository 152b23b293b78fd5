// Inline style templates

use crate::eval::Expression;
use crate::server::types::RemoteObjectId;
use std::collections::BTreeMap;

/// Collects the inline style declarations of `el` into a plain object.
pub(crate) const GET_STYLES: &str = "(el) => {
    const out = {};
    const styles = el.style;

    for (let i = 0; i < styles.length; i++) {
        const name = styles[i];
        out[name] = styles.getPropertyValue(name);
    }

    return out;
}";

const GET_STYLE: &str = "(el, name) => {
    const value = el.style.getPropertyValue(name);

    return value === '' ? null : value;
}";

const SET_STYLE: &str = "(el, name, value) => {
    el.style.setProperty(name, value);
}";

const SET_STYLES: &str = "(el, values) => {
    Object.keys(values).forEach((name) => {
        el.style.setProperty(name, values[name]);
    });
}";

const REMOVE_STYLES: &str = "(el, names) => {
    names.forEach((name) => el.style.removeProperty(name));
}";

pub fn get_styles(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_STYLES).arg_ref(id.clone())
}

/// Reads one inline style property; an unset property yields null.
pub fn get_style(id: &RemoteObjectId, name: &str) -> Expression {
    Expression::new(GET_STYLE).arg_ref(id.clone()).arg(name)
}

pub fn set_style(id: &RemoteObjectId, name: &str, value: &str) -> Expression {
    Expression::new(SET_STYLE)
        .arg_ref(id.clone())
        .arg(name)
        .arg(value)
}

pub fn set_styles(id: &RemoteObjectId, values: &BTreeMap<String, String>) -> Expression {
    Expression::new(SET_STYLES).arg_ref(id.clone()).arg(values)
}

pub fn remove_styles(id: &RemoteObjectId, names: &[&str]) -> Expression {
    Expression::new(REMOVE_STYLES).arg_ref(id.clone()).arg(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ReturnMode;
    use serde_json::json;

    #[test]
    fn test_set_styles_passes_object() {
        let mut values = BTreeMap::new();
        values.insert("color".to_string(), "red".to_string());
        values.insert("display".to_string(), "none".to_string());

        let expr = set_styles(&RemoteObjectId::new("obj-1"), &values);
        let params = expr.call_params(None, ReturnMode::Nothing).unwrap();

        assert_eq!(
            params.arguments[1].value,
            Some(json!({"color": "red", "display": "none"}))
        );
    }
}
