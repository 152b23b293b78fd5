// <select> option templates

use super::{CSS_QUERY_FRAGMENT, NOT_FOUND_FRAGMENT, XPATH_QUERY_FRAGMENT, function, selector_variants};
use crate::dom::QuerySelector;
use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

/// Selects options of `found` by value and returns the selected values.
const SELECT_FRAGMENT: &str = "
    if (found.nodeName.toLowerCase() !== 'select') {
        throw new Error('element is not a <select> element.');
    }

    const options = Array.from(found.options);

    found.value = undefined;

    for (const option of options) {
        option.selected = values.includes(option.value);

        if (option.selected && !found.multiple) {
            break;
        }
    }

    found.dispatchEvent(new Event('input', { 'bubbles': true }));
    found.dispatchEvent(new Event('change', { 'bubbles': true }));

    return options.filter((option) => option.selected).map((option) => option.value);
";

pub fn select(id: &RemoteObjectId, values: &[String]) -> Expression {
    let source = function("el, values", &["const found = el;", SELECT_FRAGMENT]);

    Expression::new(source).arg_ref(id.clone()).arg(values)
}

pub fn select_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    values: &[String],
) -> Expression {
    let (css, xpath) = selector_variants(
        "el, selector, values",
        CSS_QUERY_FRAGMENT,
        XPATH_QUERY_FRAGMENT,
        &[NOT_FOUND_FRAGMENT, SELECT_FRAGMENT],
    );

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg_selector(selector)
        .arg(values)
}
